//! Collaborators that consume the resolved contact record
//!
//! These only apply attributes and text; all decisions were made by the
//! resolver.

use chrono::Datelike;
use tracing::debug;

use crate::constants::{attrs, markup};
use crate::dom::Dom;
use crate::types::ResolvedContact;

/// Wire `[data-copy]` buttons to the values they copy
///
/// A button whose value is absent stays in place but disabled.
pub fn bind_copy_buttons(dom: &mut impl Dom, contact: &ResolvedContact) {
    for node in dom.query_all(&format!("[{}]", markup::COPY_ATTR)) {
        let field = dom.attribute(node, markup::COPY_ATTR).unwrap_or_default();
        match contact.copyable(&field) {
            Some(value) => {
                dom.set_attribute(node, markup::COPY_TEXT_ATTR, value);
                dom.remove_attribute(node, attrs::DISABLED);
                dom.remove_attribute(node, attrs::ARIA_DISABLED);
            }
            None => {
                debug!(field = %field, "Nothing to copy, disabling button");
                dom.remove_attribute(node, markup::COPY_TEXT_ATTR);
                dom.set_attribute(node, attrs::DISABLED, "");
                dom.set_attribute(node, attrs::ARIA_DISABLED, "true");
            }
        }
    }
}

/// Footer copyright year
pub fn set_footer_year(dom: &mut impl Dom, year: i64) {
    if let Some(node) = dom.element_by_id(markup::YEAR_ID) {
        dom.set_text(node, &year.to_string());
    }
}

/// Current calendar year (UTC)
pub fn current_year() -> i64 {
    i64::from(chrono::Utc::now().year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, MemoryDocument, PageFixture};

    fn page() -> MemoryDocument {
        MemoryDocument::from_fixture(PageFixture {
            viewport_width: 1280.0,
            viewport_height: 800.0,
            scroll_y: 0.0,
            elements: vec![
                ElementSpec::new("button").attr("data-copy", "email"),
                ElementSpec::new("button").attr("data-copy", "addr").attr("disabled", ""),
                ElementSpec::new("span").id("year").text("2000"),
            ],
        })
    }

    #[test]
    fn test_copy_buttons_follow_contact() {
        let mut doc = page();
        let contact = ResolvedContact {
            email: Some("info@example.com".to_string()),
            address: "Tokyo".to_string(),
            ..Default::default()
        };
        bind_copy_buttons(&mut doc, &contact);

        let email = doc.query(r#"[data-copy="email"]"#).unwrap();
        let addr = doc.query(r#"[data-copy="addr"]"#).unwrap();
        assert_eq!(doc.attribute(email, "data-copy-text").as_deref(), Some("info@example.com"));
        assert_eq!(doc.attribute(addr, "data-copy-text").as_deref(), Some("Tokyo"));
        assert_eq!(doc.attribute(addr, "disabled"), None);
    }

    #[test]
    fn test_copy_buttons_disabled_when_absent() {
        let mut doc = page();
        bind_copy_buttons(&mut doc, &ResolvedContact::default());

        for node in doc.query_all("[data-copy]") {
            assert_eq!(doc.attribute(node, "data-copy-text"), None);
            assert_eq!(doc.attribute(node, "disabled").as_deref(), Some(""));
            assert_eq!(doc.attribute(node, "aria-disabled").as_deref(), Some("true"));
        }
    }

    #[test]
    fn test_footer_year() {
        let mut doc = page();
        set_footer_year(&mut doc, 2026);
        let year = doc.element_by_id("year").unwrap();
        assert_eq!(doc.text(year), "2026");
    }

    #[test]
    fn test_current_year_is_plausible() {
        assert!(current_year() >= 2024);
    }
}
