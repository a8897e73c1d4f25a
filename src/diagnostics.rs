//! Startup self-checks
//!
//! Failures are logged and reported; the page keeps running either way.

use tracing::{debug, warn};

use crate::config::PageSettings;
use crate::constants::attrs;
use crate::dom::Dom;

/// Check required sections exist and the TOC has at most one active link
///
/// Returns one human-readable line per failed check.
pub fn self_check(dom: &impl Dom, settings: &PageSettings) -> Vec<String> {
    let mut failures = Vec::new();

    for id in &settings.required_sections {
        if dom.element_by_id(id).is_none() {
            warn!(section = %id, "Self-check failed: required section missing");
            failures.push(format!("required section #{id} is missing"));
        }
    }

    let links = dom.query_all(&settings.toc_link_selector);
    let active = links
        .iter()
        .filter(|link| dom.has_class(**link, attrs::ACTIVE_CLASS))
        .count();
    if active > 1 {
        warn!(active, "Self-check failed: more than one active TOC link");
        failures.push(format!("{active} TOC links are active, expected at most 1"));
    }

    let out_of_sync = links
        .iter()
        .filter(|link| {
            dom.has_class(**link, attrs::ACTIVE_CLASS)
                != dom.attribute(**link, attrs::ARIA_CURRENT).is_some()
        })
        .count();
    if out_of_sync > 0 {
        warn!(links = out_of_sync, "Self-check failed: active class and aria-current disagree");
        failures.push(format!("{out_of_sync} TOC links have mismatched active markers"));
    }

    if failures.is_empty() {
        debug!(toc_links = links.len(), "Self-checks passed");
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, MemoryDocument, PageFixture};

    fn doc(elements: Vec<ElementSpec>) -> MemoryDocument {
        MemoryDocument::from_fixture(PageFixture {
            viewport_width: 1280.0,
            viewport_height: 800.0,
            scroll_y: 0.0,
            elements,
        })
    }

    #[test]
    fn test_healthy_page_passes() {
        let page = doc(vec![
            ElementSpec::new("nav").class("toc").child(
                ElementSpec::new("a")
                    .attr("href", "#about")
                    .attr("aria-current", "true")
                    .class("is-active"),
            ),
            ElementSpec::new("section").id("about"),
            ElementSpec::new("section").id("qa"),
        ]);
        assert!(self_check(&page, &PageSettings::default()).is_empty());
    }

    #[test]
    fn test_missing_required_sections_reported() {
        let page = doc(vec![ElementSpec::new("section").id("about")]);
        let failures = self_check(&page, &PageSettings::default());
        assert_eq!(failures, vec!["required section #qa is missing".to_string()]);
    }

    #[test]
    fn test_multiple_active_links_reported() {
        let page = doc(vec![
            ElementSpec::new("nav")
                .class("toc")
                .child(ElementSpec::new("a").attr("href", "#about").class("is-active"))
                .child(ElementSpec::new("a").attr("href", "#qa").class("is-active")),
            ElementSpec::new("section").id("about"),
            ElementSpec::new("section").id("qa"),
        ]);
        let failures = self_check(&page, &PageSettings::default());
        assert_eq!(failures.len(), 2);
        assert!(failures[0].starts_with("2 TOC links are active"));
        assert!(failures[1].contains("mismatched"));
    }
}
