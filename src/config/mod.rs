//! Configuration for club-page
//!
//! Two layers:
//! - **raw**: the untrusted JSON payload embedded in the page
//! - **settings**: host-side TOML settings (selectors, link bases, allow-list)

pub mod raw;
pub mod settings;

pub use raw::RawConfig;
pub use settings::PageSettings;
