//! Document capability interface
//!
//! The resolver and the tracker only ever talk to the page through [`Dom`].
//! Hosts plug in their own implementation; [`MemoryDocument`] is the
//! in-memory one used by the CLI and the tests.

pub mod memory;
pub mod selector;

pub use memory::{ElementSpec, MemoryDocument, PageFixture};
pub use selector::{Selector, SelectorContext};

use serde::{Deserialize, Serialize};

use crate::types::Rect;

/// Opaque handle to an element owned by a [`Dom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Minimal query/mutation surface over a rendered document
///
/// Lookups on missing nodes return empty values; mutations on missing nodes
/// are ignored.
pub trait Dom {
    /// All elements matching `selector`, in document order
    fn query_all(&self, selector: &str) -> Vec<NodeId>;

    /// First element matching `selector`
    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    fn text(&self, node: NodeId) -> String;
    fn set_text(&mut self, node: NodeId, text: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);

    /// Set an inline style property, or clear it with `None`
    fn set_style(&mut self, node: NodeId, property: &str, value: Option<&str>);

    /// Current box of the element relative to the viewport
    fn bounding_rect(&self, node: NodeId) -> Rect;

    /// Hide or reveal an element (inline `display` plus `aria-hidden`)
    ///
    /// Revealing clears the inline `display` property entirely, so any
    /// author-set inline value is dropped and the stylesheet value applies.
    fn set_visible(&mut self, node: NodeId, visible: bool) {
        if visible {
            self.set_style(node, "display", None);
            self.remove_attribute(node, crate::constants::attrs::ARIA_HIDDEN);
        } else {
            self.set_style(node, "display", Some("none"));
            self.set_attribute(node, crate::constants::attrs::ARIA_HIDDEN, "true");
        }
    }
}
