//! Config resolution and binding
//!
//! Runs once at page start: applies the embedded config to the marked
//! elements and hands back the [`ResolvedContact`] collaborators share.
//! Each field is resolved independently, so one rejected value never
//! affects its siblings.

pub mod sanitize;

use tracing::{debug, warn};

use crate::config::{PageSettings, RawConfig};
use crate::constants::{attrs, fields, links, markup};
use crate::dom::{Dom, NodeId};
use crate::types::ResolvedContact;
use sanitize::{allowed_messaging_url, encode_uri_component, sanitize_handle, valid_email};

/// Fields with a dedicated binding step; the generic text binder skips them
const RESERVED_FIELDS: [&str; 3] = [
    markup::EMAIL_FIELD,
    markup::SOCIAL_LINK_FIELD,
    markup::MESSAGING_LINK_FIELD,
];

/// Selector for elements bound to `field`
fn bound(field: &str) -> String {
    format!(r#"[{}="{}"]"#, markup::BIND_ATTR, field)
}

/// Short, single-line excerpt of an untrusted value for logs
fn excerpt(raw: &str) -> String {
    let mut out: String = raw.chars().filter(|c| !c.is_control()).take(40).collect();
    if raw.chars().count() > 40 {
        out.push('…');
    }
    out
}

pub struct ConfigResolver<'a> {
    settings: &'a PageSettings,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(settings: &'a PageSettings) -> Self {
        Self { settings }
    }

    /// Bind `config` onto `dom` and return the sanitized contact record
    ///
    /// Re-running with the same config leaves the document unchanged.
    pub fn resolve(&self, dom: &mut impl Dom, config: &RawConfig) -> ResolvedContact {
        self.bind_text(dom, config);
        let address = self.bind_map_link(dom);
        let (social_handle, social_link_url) = self.bind_social(dom, config);
        let messaging_link_url = self.bind_messaging(dom, config);
        let email = self.bind_email(dom, config);
        secure_new_tab_links(dom);

        let contact = ResolvedContact {
            social_handle,
            social_link_url,
            messaging_link_url,
            email,
            address,
        };
        debug!(contact = ?contact, "Resolved contact");
        contact
    }

    /// Generic `data-bind` text fill; only non-empty values overwrite
    fn bind_text(&self, dom: &mut impl Dom, config: &RawConfig) {
        for node in dom.query_all(&format!("[{}]", markup::BIND_ATTR)) {
            let Some(field) = dom.attribute(node, markup::BIND_ATTR) else {
                continue;
            };
            if RESERVED_FIELDS.contains(&field.as_str()) {
                continue;
            }
            if let Some(value) = config.non_empty(&field) {
                dom.set_text(node, value);
            }
        }
    }

    /// Map search link from the rendered address; returns the address
    fn bind_map_link(&self, dom: &mut impl Dom) -> String {
        let address = dom
            .query(&bound(markup::ADDRESS_FIELD))
            .map(|node| dom.text(node).trim().to_string())
            .unwrap_or_default();

        let Some(map_link) = dom.element_by_id(markup::MAP_LINK_ID) else {
            debug!(id = markup::MAP_LINK_ID, "No map link element");
            return address;
        };
        if address.is_empty() {
            dom.remove_attribute(map_link, attrs::HREF);
            dom.set_visible(map_link, false);
        } else {
            let href = format!("{}{}", self.settings.map_search_url, encode_uri_component(&address));
            dom.set_attribute(map_link, attrs::HREF, &href);
            dom.set_visible(map_link, true);
        }
        address
    }

    /// Social profile links and handle displays; returns (handle, link)
    fn bind_social(&self, dom: &mut impl Dom, config: &RawConfig) -> (String, String) {
        let raw = config.non_empty(fields::SOCIAL_HANDLE);
        let handle = raw.and_then(sanitize_handle);
        if let (Some(raw), None) = (raw, &handle) {
            warn!(field = fields::SOCIAL_HANDLE, value = %excerpt(raw), "Social handle rejected, linking to profile root");
        }

        let root = &self.settings.social_root_url;
        let url = match &handle {
            Some(handle) => format!("{root}{handle}"),
            None => root.clone(),
        };

        let link_selector = bound(markup::SOCIAL_LINK_FIELD);
        for node in dom.query_all(&link_selector) {
            dom.set_attribute(node, attrs::HREF, &url);
        }
        if let Some(handle) = &handle {
            let display = format!("@{handle}");
            for node in dom.query_all(&format!(".{}{}", markup::SOCIAL_TEXT_CLASS, link_selector)) {
                dom.set_text(node, &display);
            }
        }

        (handle.unwrap_or_default(), url)
    }

    /// Messaging links: shown with the URL only when it is allow-listed
    fn bind_messaging(&self, dom: &mut impl Dom, config: &RawConfig) -> Option<String> {
        let raw = config.non_empty(fields::MESSAGING_URL);
        let url = raw.and_then(|raw| allowed_messaging_url(raw, &self.settings.messaging_domain));
        if let (Some(raw), None) = (raw, &url) {
            warn!(field = fields::MESSAGING_URL, value = %excerpt(raw), domain = %self.settings.messaging_domain, "Messaging URL rejected, hiding link");
        }

        for node in dom.query_all(&bound(markup::MESSAGING_LINK_FIELD)) {
            match &url {
                Some(url) => {
                    dom.set_attribute(node, attrs::HREF, url);
                    dom.set_visible(node, true);
                }
                None => {
                    dom.remove_attribute(node, attrs::HREF);
                    dom.set_visible(node, false);
                }
            }
        }
        url
    }

    /// Email displays and `mailto:` actions
    fn bind_email(&self, dom: &mut impl Dom, config: &RawConfig) -> Option<String> {
        let raw = config.non_empty(fields::EMAIL);
        let email = raw.and_then(valid_email);
        if let (Some(raw), None) = (raw, &email) {
            warn!(field = fields::EMAIL, value = %excerpt(raw), "Email rejected, showing placeholder");
        }

        let shown = email.as_deref().unwrap_or(&self.settings.email_placeholder);
        for node in dom.query_all(&bound(markup::EMAIL_FIELD)) {
            dom.set_text(node, shown);
        }

        for node in dom.query_all(&format!("[{}]", markup::EMAIL_ACTION_ATTR)) {
            match &email {
                Some(email) => enable_mail_action(dom, node, email),
                None => disable_mail_action(dom, node),
            }
        }
        email
    }
}

fn enable_mail_action(dom: &mut impl Dom, node: NodeId, email: &str) {
    dom.set_attribute(node, attrs::HREF, &format!("{}{email}", links::MAILTO_SCHEME));
    dom.remove_attribute(node, attrs::ARIA_DISABLED);
    if dom.attribute(node, attrs::TABINDEX).as_deref() == Some("-1") {
        dom.remove_attribute(node, attrs::TABINDEX);
    }
    dom.remove_class(node, attrs::DISABLED_CLASS);
    dom.set_visible(node, true);
}

/// Call-to-action variants disappear; primary actions stay in place, inert
fn disable_mail_action(dom: &mut impl Dom, node: NodeId) {
    dom.remove_attribute(node, attrs::HREF);
    let variant = dom.attribute(node, markup::EMAIL_ACTION_ATTR);
    if variant.as_deref() == Some(markup::EMAIL_ACTION_CTA) {
        dom.set_visible(node, false);
    } else {
        dom.set_attribute(node, attrs::ARIA_DISABLED, "true");
        dom.set_attribute(node, attrs::TABINDEX, "-1");
        dom.add_class(node, attrs::DISABLED_CLASS);
        dom.set_visible(node, true);
    }
}

/// Every new-tab link gets `noopener noreferrer`, keeping other rel tokens
pub fn secure_new_tab_links(dom: &mut impl Dom) {
    let selector = format!(r#"a[{}="{}"]"#, attrs::TARGET, attrs::NEW_TAB_TARGET);
    for node in dom.query_all(&selector) {
        let existing = dom.attribute(node, attrs::REL).unwrap_or_default();
        let mut tokens: Vec<&str> = existing.split_whitespace().collect();
        for required in attrs::SAFE_NEW_TAB_REL.split_whitespace() {
            if !tokens.iter().any(|t| t.eq_ignore_ascii_case(required)) {
                tokens.push(required);
            }
        }
        dom.set_attribute(node, attrs::REL, &tokens.join(" "));
    }
}
