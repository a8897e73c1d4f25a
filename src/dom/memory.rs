//! In-memory document
//!
//! Page fixtures are JSON trees of [`ElementSpec`]s with document-space
//! geometry. The document keeps a scroll offset so bounding boxes move the
//! way a real viewport would.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

use super::selector::{Selector, SelectorContext};
use super::{Dom, NodeId};
use crate::types::Rect;

const CLASS_ATTR: &str = "class";

fn default_viewport_width() -> f64 {
    1280.0
}

fn default_viewport_height() -> f64 {
    800.0
}

/// Serialized page: viewport state plus the element tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFixture {
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
    #[serde(default)]
    pub scroll_y: f64,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
}

/// One element of a page fixture
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Offset from the document top
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn at(mut self, top: f64, height: f64) -> Self {
        self.top = top;
        self.height = height;
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    /// Includes `id` and `class`
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    top: f64,
    height: f64,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed [`Dom`]; node indices follow document order
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    viewport_width: f64,
    viewport_height: f64,
    scroll_y: f64,
    writes: usize,
}

impl MemoryDocument {
    pub fn from_fixture(fixture: PageFixture) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            viewport_width: fixture.viewport_width,
            viewport_height: fixture.viewport_height,
            scroll_y: fixture.scroll_y,
            writes: 0,
        };
        for spec in fixture.elements {
            let id = doc.insert(spec, None);
            doc.roots.push(id);
        }
        doc
    }

    /// Load a JSON page fixture from disk
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .context(format!("Failed to read page fixture {}", path.display()))?;
        let fixture: PageFixture = serde_json::from_str(&contents)
            .context(format!("Failed to parse page fixture {}", path.display()))?;
        Ok(Self::from_fixture(fixture))
    }

    fn insert(&mut self, spec: ElementSpec, parent: Option<NodeId>) -> NodeId {
        let mut attributes = spec.attributes;
        if let Some(id) = spec.id {
            attributes.insert("id".to_string(), id);
        }
        if !spec.classes.is_empty() {
            attributes.insert(CLASS_ATTR.to_string(), spec.classes.join(" "));
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            tag: spec.tag.to_ascii_lowercase(),
            attributes,
            styles: spec.styles,
            text: spec.text,
            top: spec.top,
            height: spec.height,
            parent,
            children: Vec::new(),
        });
        for child in spec.children {
            let child_id = self.insert(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    /// Current state as a fixture (for output and comparisons)
    pub fn snapshot(&self) -> PageFixture {
        PageFixture {
            viewport_width: self.viewport_width,
            viewport_height: self.viewport_height,
            scroll_y: self.scroll_y,
            elements: self.roots.iter().map(|&id| self.spec_of(id)).collect(),
        }
    }

    fn spec_of(&self, id: NodeId) -> ElementSpec {
        let node = &self.nodes[id.0];
        let mut attributes = node.attributes.clone();
        let element_id = attributes.remove("id");
        let classes = attributes
            .remove(CLASS_ATTR)
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        ElementSpec {
            tag: node.tag.clone(),
            id: element_id,
            classes,
            attributes,
            styles: node.styles.clone(),
            text: node.text.clone(),
            top: node.top,
            height: node.height,
            children: node.children.iter().map(|&child| self.spec_of(child)).collect(),
        }
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y.max(0.0);
    }

    /// Change an element's rendered height (responsive layout changes)
    pub fn set_height(&mut self, node: NodeId, height: f64) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.height = height;
        }
    }

    /// Number of mutation calls received so far
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes.get(node.0)?.styles.get(property).map(String::as_str)
    }

    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.style(node, "display") == Some("none")
    }

    fn node_mut(&mut self, node: NodeId) -> Option<&mut Node> {
        self.writes += 1;
        self.nodes.get_mut(node.0)
    }
}

impl SelectorContext for MemoryDocument {
    fn node_tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|n| n.tag.as_str())
    }

    fn node_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(node.0)?.attributes.get(name).map(String::as_str)
    }

    fn node_has_class(&self, node: NodeId, class: &str) -> bool {
        self.node_attribute(node, CLASS_ATTR)
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn node_parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }
}

impl Dom for MemoryDocument {
    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let selector = match Selector::parse(selector) {
            Ok(selector) => selector,
            Err(e) => {
                warn!(selector = %selector, error = %e, "Invalid selector, matching nothing");
                return Vec::new();
            }
        };
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|&id| selector.matches(self, id))
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.nodes
            .iter()
            .position(|n| n.attributes.get("id").is_some_and(|v| v == id))
            .map(NodeId)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.node_attribute(node, name).map(str::to_string)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.node_mut(node) {
            n.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(n) = self.node_mut(node) {
            n.attributes.remove(name);
        }
    }

    /// Own text only; fixtures keep text on leaf elements
    fn text(&self, node: NodeId) -> String {
        self.nodes.get(node.0).map(|n| n.text.clone()).unwrap_or_default()
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(n) = self.node_mut(node) {
            n.text = text.to_string();
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node_has_class(node, class)
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.node_mut(node) {
            let classes = n.attributes.entry(CLASS_ATTR.to_string()).or_default();
            if classes.split_whitespace().any(|c| c == class) {
                return;
            }
            if !classes.is_empty() {
                classes.push(' ');
            }
            classes.push_str(class);
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.node_mut(node) {
            let Some(classes) = n.attributes.get(CLASS_ATTR) else {
                return;
            };
            let kept = classes
                .split_whitespace()
                .filter(|c| *c != class)
                .collect::<Vec<_>>()
                .join(" ");
            if kept.is_empty() {
                n.attributes.remove(CLASS_ATTR);
            } else {
                n.attributes.insert(CLASS_ATTR.to_string(), kept);
            }
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: Option<&str>) {
        if let Some(n) = self.node_mut(node) {
            match value {
                Some(value) => {
                    n.styles.insert(property.to_string(), value.to_string());
                }
                None => {
                    n.styles.remove(property);
                }
            }
        }
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        match self.nodes.get(node.0) {
            Some(n) => Rect::new(0.0, n.top - self.scroll_y, self.viewport_width, n.height),
            None => Rect::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryDocument {
        MemoryDocument::from_fixture(PageFixture {
            viewport_width: 1024.0,
            viewport_height: 700.0,
            scroll_y: 0.0,
            elements: vec![
                ElementSpec::new("header").at(0.0, 64.0),
                ElementSpec::new("main").child(
                    ElementSpec::new("section")
                        .id("about")
                        .class("card")
                        .at(600.0, 400.0)
                        .child(ElementSpec::new("span").attr("data-bind", "addr").text("Tokyo")),
                ),
            ],
        })
    }

    #[test]
    fn test_nodes_follow_document_order() {
        let doc = sample();
        assert_eq!(doc.query_all("*"), vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3)]);
        assert_eq!(doc.element_by_id("about"), Some(NodeId(2)));
        assert_eq!(doc.query("main span"), Some(NodeId(3)));
    }

    #[test]
    fn test_bounding_rect_tracks_scroll() {
        let mut doc = sample();
        let about = doc.element_by_id("about").unwrap();
        assert_eq!(doc.bounding_rect(about).top(), 600.0);

        doc.scroll_to(250.0);
        assert_eq!(doc.bounding_rect(about).top(), 350.0);
        assert_eq!(doc.bounding_rect(about).bottom(), 750.0);

        doc.scroll_to(-40.0);
        assert_eq!(doc.scroll_y(), 0.0);
    }

    #[test]
    fn test_class_mutations() {
        let mut doc = sample();
        let about = doc.element_by_id("about").unwrap();

        doc.add_class(about, "is-active");
        doc.add_class(about, "is-active");
        assert_eq!(doc.attribute(about, "class").as_deref(), Some("card is-active"));

        doc.remove_class(about, "card");
        doc.remove_class(about, "is-active");
        assert_eq!(doc.attribute(about, "class"), None);
    }

    #[test]
    fn test_reveal_drops_inline_display() {
        let mut doc = sample();
        let about = doc.element_by_id("about").unwrap();
        doc.set_style(about, "display", Some("flex"));

        doc.set_visible(about, false);
        assert!(doc.is_hidden(about));
        assert_eq!(doc.attribute(about, "aria-hidden").as_deref(), Some("true"));

        doc.set_visible(about, true);
        assert_eq!(doc.style(about, "display"), None);
        assert_eq!(doc.attribute(about, "aria-hidden"), None);
    }

    #[test]
    fn test_snapshot_round_trips_fixture() {
        let doc = sample();
        let again = MemoryDocument::from_fixture(doc.snapshot());
        assert_eq!(doc.snapshot(), again.snapshot());
        assert_eq!(doc.snapshot().elements[1].children[0].id.as_deref(), Some("about"));
    }

    #[test]
    fn test_missing_nodes_are_ignored() {
        let mut doc = sample();
        let ghost = NodeId(99);
        doc.set_text(ghost, "boo");
        doc.set_attribute(ghost, "href", "#");
        assert_eq!(doc.text(ghost), "");
        assert_eq!(doc.attribute(ghost, "href"), None);
        assert_eq!(doc.bounding_rect(ghost), Rect::default());
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let doc = sample();
        assert!(doc.query_all("a[href").is_empty());
    }
}
