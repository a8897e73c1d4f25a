use tracing::trace;

use crate::dom::Dom;
use crate::tracker::{FrameClock, SectionTracker};

/// Host events the page reacts to after boot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageEvent {
    Scroll,
    Resize,
    /// Animation frame booked through the [`FrameClock`]
    Frame,
}

/// Dispatch one host event
///
/// Scroll and resize only book a frame. Returns the newly active section id
/// when a frame changed it.
pub fn handle_event(
    tracker: &mut SectionTracker,
    clock: &mut impl FrameClock,
    dom: &mut impl Dom,
    event: PageEvent,
) -> Option<String> {
    match event {
        PageEvent::Scroll | PageEvent::Resize => {
            let booked = tracker.request_update(clock);
            trace!(event = ?event, booked, "Update requested");
            None
        }
        PageEvent::Frame => tracker.on_frame(dom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageSettings;
    use crate::dom::{ElementSpec, MemoryDocument, PageFixture};
    use crate::tracker::ManualFrameClock;

    fn page() -> MemoryDocument {
        MemoryDocument::from_fixture(PageFixture {
            viewport_width: 1280.0,
            viewport_height: 800.0,
            scroll_y: 0.0,
            elements: vec![
                ElementSpec::new("header").at(0.0, 60.0),
                ElementSpec::new("nav")
                    .class("toc")
                    .child(ElementSpec::new("a").attr("href", "#about"))
                    .child(ElementSpec::new("a").attr("href", "#qa")),
                ElementSpec::new("section").id("about").at(100.0, 900.0),
                ElementSpec::new("section").id("qa").at(1000.0, 900.0),
            ],
        })
    }

    #[test]
    fn test_scroll_books_frame_and_frame_applies() {
        let mut doc = page();
        let mut clock = ManualFrameClock::new();
        let mut tracker = SectionTracker::attach(&mut doc, &PageSettings::default());
        assert_eq!(tracker.active_id(), Some("about"));

        doc.scroll_to(1000.0);
        assert_eq!(handle_event(&mut tracker, &mut clock, &mut doc, PageEvent::Scroll), None);
        assert_eq!(handle_event(&mut tracker, &mut clock, &mut doc, PageEvent::Resize), None);
        assert_eq!(clock.outstanding(), 1);

        assert!(clock.take_frame());
        let changed = handle_event(&mut tracker, &mut clock, &mut doc, PageEvent::Frame);
        assert_eq!(changed.as_deref(), Some("qa"));
    }

    #[test]
    fn test_resize_reevaluates_with_new_header_height() {
        let mut doc = page();
        doc.scroll_to(900.0);
        let mut clock = ManualFrameClock::new();
        let mut tracker = SectionTracker::attach(&mut doc, &PageSettings::default());
        // line 84 → 984 document-space: still about
        assert_eq!(tracker.active_id(), Some("about"));

        // Header wraps to two rows on a narrow viewport
        let header = doc.query("header").unwrap();
        doc.set_height(header, 160.0);
        assert_eq!(handle_event(&mut tracker, &mut clock, &mut doc, PageEvent::Resize), None);
        assert_eq!(tracker.active_id(), Some("about"));

        assert!(clock.take_frame());
        let changed = handle_event(&mut tracker, &mut clock, &mut doc, PageEvent::Frame);
        // line 184 → 1084 document-space: qa
        assert_eq!(changed.as_deref(), Some("qa"));
    }

    #[test]
    fn test_unbooked_frame_is_ignored() {
        let mut doc = page();
        let mut clock = ManualFrameClock::new();
        let mut tracker = SectionTracker::attach(&mut doc, &PageSettings::default());
        let evaluations = tracker.evaluations();

        doc.scroll_to(1000.0);
        assert_eq!(handle_event(&mut tracker, &mut clock, &mut doc, PageEvent::Frame), None);
        assert_eq!(tracker.evaluations(), evaluations);
    }
}
