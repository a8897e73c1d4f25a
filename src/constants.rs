//! Application-wide constants
//!
//! Markup hooks, attribute names and fixed link targets shared by the
//! resolver, the tracker and the collaborators.

/// Markup hooks the page author places on elements
pub mod markup {
    /// Generic text binding marker (`data-bind="<field>"`)
    pub const BIND_ATTR: &str = "data-bind";

    /// Bound field holding the postal address
    pub const ADDRESS_FIELD: &str = "addr";

    /// Bound field used by social link anchors
    pub const SOCIAL_LINK_FIELD: &str = "x-link";

    /// Class that marks a social link as a handle display
    pub const SOCIAL_TEXT_CLASS: &str = "x-text";

    /// Bound field used by messaging link anchors
    pub const MESSAGING_LINK_FIELD: &str = "line-link";

    /// Bound field used by email display elements
    pub const EMAIL_FIELD: &str = "email";

    /// Marker for elements that act on the email address (`mailto:`)
    pub const EMAIL_ACTION_ATTR: &str = "data-email-action";

    /// `data-email-action` value for the secondary call-to-action variant
    pub const EMAIL_ACTION_CTA: &str = "cta";

    /// Id of the map-open anchor
    pub const MAP_LINK_ID: &str = "map-open";

    /// Id of the footer year element
    pub const YEAR_ID: &str = "year";

    /// Copy button marker (`data-copy="email" | "addr"`)
    pub const COPY_ATTR: &str = "data-copy";

    /// Attribute holding the text a copy button puts on the clipboard
    pub const COPY_TEXT_ATTR: &str = "data-copy-text";
}

/// Config payload keys
pub mod fields {
    pub const SOCIAL_HANDLE: &str = "x";
    pub const MESSAGING_URL: &str = "line";
    pub const EMAIL: &str = "email";
}

/// Attribute and class names written by this crate
pub mod attrs {
    pub const HREF: &str = "href";
    pub const REL: &str = "rel";
    pub const TARGET: &str = "target";
    pub const TABINDEX: &str = "tabindex";
    pub const DISABLED: &str = "disabled";
    pub const ARIA_DISABLED: &str = "aria-disabled";
    pub const ARIA_HIDDEN: &str = "aria-hidden";
    pub const ARIA_CURRENT: &str = "aria-current";

    /// Relationship that blocks opener and referrer leakage
    pub const SAFE_NEW_TAB_REL: &str = "noopener noreferrer";

    /// Target value that opens a new browsing context
    pub const NEW_TAB_TARGET: &str = "_blank";

    /// Visual active marker on TOC links
    pub const ACTIVE_CLASS: &str = "is-active";

    /// Visual disabled marker on inert email actions
    pub const DISABLED_CLASS: &str = "is-disabled";
}

/// Fixed link construction
pub mod links {
    pub const MAILTO_SCHEME: &str = "mailto:";

    /// The only scheme accepted for messaging links
    pub const SECURE_SCHEME: &str = "https";
}

/// Validation limits for page settings
pub mod validation {
    /// Largest decision-line padding in CSS pixels
    pub const MAX_DECISION_PADDING: f64 = 400.0;
}

/// Settings file location
pub mod config {
    pub const APP_DIR: &str = "club-page";
    pub const FILENAME: &str = "settings.toml";
}
