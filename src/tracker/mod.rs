//! Scroll-driven table-of-contents tracking
//!
//! Keeps at most one TOC link marked active (class plus `aria-current`),
//! pointing at the section under the decision line. Scroll and resize only
//! book a frame; the geometry is read once per frame.

pub mod debounce;

use tracing::{debug, info};

use crate::config::PageSettings;
use crate::constants::attrs;
use crate::dom::{Dom, NodeId};
pub use debounce::{FrameClock, FrameDebouncer, ManualFrameClock};

/// A TOC entry whose anchor resolved to a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedSection {
    pub id: String,
    pub section: NodeId,
    pub link: NodeId,
}

#[derive(Debug)]
pub struct SectionTracker {
    /// TOC document order
    sections: Vec<TrackedSection>,
    /// TOC links whose target is missing; never activated, always cleared
    stray_links: Vec<NodeId>,
    header_selector: String,
    decision_padding: f64,
    active: Option<usize>,
    debouncer: FrameDebouncer,
    evaluations: u64,
}

impl SectionTracker {
    /// Capture TOC links and their sections without touching the document
    pub fn collect(dom: &impl Dom, settings: &PageSettings) -> Self {
        let mut sections: Vec<TrackedSection> = Vec::new();
        let mut stray_links = Vec::new();

        for link in dom.query_all(&settings.toc_link_selector) {
            let target = dom
                .attribute(link, attrs::HREF)
                .and_then(|href| href.strip_prefix('#').map(str::to_string))
                .filter(|id| !id.is_empty());
            let resolved = target.and_then(|id| dom.element_by_id(&id).map(|section| (id, section)));
            match resolved {
                Some((id, _)) if sections.iter().any(|s| s.id == id) => {
                    debug!(section = %id, "Duplicate TOC entry, only the first is tracked");
                    stray_links.push(link);
                }
                Some((id, section)) => sections.push(TrackedSection { id, section, link }),
                None => {
                    debug!(link = ?link, "TOC link target not found, skipping");
                    stray_links.push(link);
                }
            }
        }

        if sections.is_empty() {
            info!("No trackable sections, section tracker idle");
        } else {
            info!(count = sections.len(), "Tracking sections");
        }

        Self {
            sections,
            stray_links,
            header_selector: settings.header_selector.clone(),
            decision_padding: settings.decision_padding,
            active: None,
            debouncer: FrameDebouncer::new(),
            evaluations: 0,
        }
    }

    /// Capture and run the initial evaluation
    pub fn attach(dom: &mut impl Dom, settings: &PageSettings) -> Self {
        let mut tracker = Self::collect(&*dom, settings);
        tracker.evaluate(dom);
        tracker
    }

    pub fn is_idle(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn sections(&self) -> &[TrackedSection] {
        &self.sections
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.map(|i| self.sections[i].id.as_str())
    }

    /// Number of geometry evaluations performed so far
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Scroll/resize handler: book a recomputation for the next frame
    pub fn request_update(&mut self, clock: &mut impl FrameClock) -> bool {
        if self.is_idle() {
            return false;
        }
        self.debouncer.schedule(clock)
    }

    /// Frame callback: recompute if something was booked
    ///
    /// Returns the id of a newly activated section.
    pub fn on_frame(&mut self, dom: &mut impl Dom) -> Option<String> {
        if !self.debouncer.begin_frame() {
            return None;
        }
        self.evaluate(dom)
    }

    /// Header bottom plus padding, in viewport coordinates
    pub fn decision_line(&self, dom: &impl Dom) -> f64 {
        let header_height = dom
            .query(&self.header_selector)
            .map(|header| dom.bounding_rect(header).height)
            .unwrap_or(0.0);
        header_height + self.decision_padding
    }

    /// Index of the current section under the decision line
    ///
    /// The first section straddling the line wins; otherwise the last one
    /// already scrolled past it; otherwise the first section.
    pub fn current_index(&self, dom: &impl Dom) -> Option<usize> {
        if self.sections.is_empty() {
            return None;
        }
        let line = self.decision_line(dom);
        let mut passed = None;
        for (i, tracked) in self.sections.iter().enumerate() {
            let rect = dom.bounding_rect(tracked.section);
            if rect.straddles(line) {
                return Some(i);
            }
            if rect.top() <= line {
                passed = Some(i);
            }
        }
        passed.or(Some(0))
    }

    /// Recompute now and update the links if the winner changed
    pub fn evaluate(&mut self, dom: &mut impl Dom) -> Option<String> {
        if self.is_idle() {
            return None;
        }
        self.evaluations += 1;
        let next = self.current_index(&*dom);
        if next == self.active {
            return None;
        }
        self.activate(dom, next);
        self.active = next;
        let id = self.active_id().map(str::to_string);
        debug!(section = ?id, evaluations = self.evaluations, "Active section changed");
        id
    }

    /// Single pass: the chosen link gains the markers, every other loses them
    fn activate(&self, dom: &mut impl Dom, index: Option<usize>) {
        for link in &self.stray_links {
            clear_active(dom, *link);
        }
        for (i, tracked) in self.sections.iter().enumerate() {
            if Some(i) == index {
                dom.add_class(tracked.link, attrs::ACTIVE_CLASS);
                dom.set_attribute(tracked.link, attrs::ARIA_CURRENT, "true");
            } else {
                clear_active(dom, tracked.link);
            }
        }
    }
}

fn clear_active(dom: &mut impl Dom, link: NodeId) {
    dom.remove_class(link, attrs::ACTIVE_CLASS);
    dom.remove_attribute(link, attrs::ARIA_CURRENT);
}
