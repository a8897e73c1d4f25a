#![forbid(unsafe_code)]
//! Behaviour layer for a single-page club site
//!
//! At boot the embedded contact config is sanitized and bound onto the
//! page, then a scroll tracker keeps the table of contents in sync with the
//! section being read.

pub mod affordances;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod dom;
pub mod event_handler;
pub mod resolver;
pub mod tracker;
pub mod types;

use tracing::info;

use config::{PageSettings, RawConfig};
use dom::Dom;
use resolver::ConfigResolver;
use tracker::SectionTracker;
use types::ResolvedContact;

/// Everything that survives page start
#[derive(Debug)]
pub struct Page {
    pub contact: ResolvedContact,
    pub tracker: SectionTracker,
    /// Failed self-check descriptions; empty when healthy
    pub failed_checks: Vec<String>,
}

/// Run the page start sequence against `dom`
///
/// Reads the embedded config from the element named in `settings`.
pub fn boot(dom: &mut impl Dom, settings: &PageSettings) -> Page {
    let config = RawConfig::from_document(&*dom, &settings.config_element_id);
    boot_with_config(dom, settings, &config)
}

/// Same as [`boot`] with an explicit config
pub fn boot_with_config(dom: &mut impl Dom, settings: &PageSettings, config: &RawConfig) -> Page {
    info!(keys = config.len(), "Booting page");

    let contact = ConfigResolver::new(settings).resolve(dom, config);
    affordances::bind_copy_buttons(dom, &contact);

    let tracker = SectionTracker::attach(dom, settings);
    affordances::set_footer_year(dom, affordances::current_year());

    let failed_checks = diagnostics::self_check(&*dom, settings);
    info!(
        active = ?tracker.active_id(),
        sections = tracker.sections().len(),
        failed_checks = failed_checks.len(),
        "Page ready"
    );

    Page {
        contact,
        tracker,
        failed_checks,
    }
}
