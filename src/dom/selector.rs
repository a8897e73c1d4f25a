//! Small CSS selector subset
//!
//! Supports what the page markup needs: type, `#id`, `.class`, attribute
//! tests (`[a]`, `[a=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]`), descendant and
//! child combinators, and `,` lists.

use anyhow::{bail, Result};

use super::NodeId;

/// Read access a selector needs to test an element
pub trait SelectorContext {
    fn node_tag(&self, node: NodeId) -> Option<&str>;
    fn node_attribute(&self, node: NodeId, name: &str) -> Option<&str>;
    fn node_has_class(&self, node: NodeId, class: &str) -> bool;
    fn node_parent(&self, node: NodeId) -> Option<NodeId>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

#[derive(Debug, Clone, PartialEq)]
struct Complex {
    /// Compounds left to right; the combinator links each one to its predecessor
    parts: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttrTest>,
}

#[derive(Debug, Clone, PartialEq)]
struct AttrTest {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, PartialEq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = Parser {
            chars: input.chars().collect(),
            pos: 0,
        };
        let mut alternatives = Vec::new();
        loop {
            alternatives.push(parser.complex()?);
            parser.skip_ws();
            match parser.next() {
                None => break,
                Some(',') => continue,
                Some(c) => bail!("unexpected '{c}' in selector '{input}'"),
            }
        }
        Ok(Self { alternatives })
    }

    pub fn matches(&self, ctx: &impl SelectorContext, node: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex.matches_at(ctx, complex.parts.len() - 1, node))
    }
}

impl Complex {
    fn matches_at(&self, ctx: &impl SelectorContext, idx: usize, node: NodeId) -> bool {
        let (combinator, compound) = &self.parts[idx];
        if !compound.matches(ctx, node) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => ctx
                .node_parent(node)
                .is_some_and(|parent| self.matches_at(ctx, idx - 1, parent)),
            Combinator::Descendant => {
                let mut ancestor = ctx.node_parent(node);
                while let Some(candidate) = ancestor {
                    if self.matches_at(ctx, idx - 1, candidate) {
                        return true;
                    }
                    ancestor = ctx.node_parent(candidate);
                }
                false
            }
        }
    }
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attributes.is_empty()
    }

    fn matches(&self, ctx: &impl SelectorContext, node: NodeId) -> bool {
        let Some(tag) = ctx.node_tag(node) else {
            return false;
        };
        if let Some(want) = &self.tag {
            if !want.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(want) = &self.id {
            if ctx.node_attribute(node, "id") != Some(want.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| ctx.node_has_class(node, class)) {
            return false;
        }
        self.attributes.iter().all(|test| {
            let Some(value) = ctx.node_attribute(node, &test.name) else {
                return false;
            };
            match &test.op {
                AttrOp::Exists => true,
                AttrOp::Equals(want) => value == want,
                AttrOp::Prefix(want) => !want.is_empty() && value.starts_with(want.as_str()),
                AttrOp::Suffix(want) => !want.is_empty() && value.ends_with(want.as_str()),
                AttrOp::Contains(want) => !want.is_empty() && value.contains(want.as_str()),
            }
        })
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Skip whitespace; returns whether any was consumed
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn expect(&mut self, want: char) -> Result<()> {
        match self.next() {
            Some(c) if c == want => Ok(()),
            Some(c) => bail!("expected '{want}', found '{c}'"),
            None => bail!("expected '{want}', found end of selector"),
        }
    }

    fn ident(&mut self) -> Result<String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            self.pos += 1;
        }
        if self.pos == start {
            bail!("expected identifier at offset {start}");
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn complex(&mut self) -> Result<Complex> {
        self.skip_ws();
        let mut parts = vec![(Combinator::Descendant, self.compound()?)];
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    Combinator::Child
                }
                Some(_) if had_ws => Combinator::Descendant,
                Some(c) => bail!("unexpected '{c}' at offset {}", self.pos),
            };
            parts.push((combinator, self.compound()?));
        }
        Ok(Complex { parts })
    }

    fn compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        let mut universal = false;
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                universal = true;
            }
            Some(c) if c.is_alphabetic() => compound.tag = Some(self.ident()?.to_ascii_lowercase()),
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attributes.push(self.attribute()?);
                }
                _ => break,
            }
        }
        if compound.is_empty() && !universal {
            match self.peek() {
                Some(c) => bail!("unexpected '{c}' at offset {}", self.pos),
                None => bail!("empty selector"),
            }
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<AttrTest> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();
        let op = match self.next() {
            Some(']') => return Ok(AttrTest { name, op: AttrOp::Exists }),
            Some('=') => AttrOp::Equals(String::new()),
            Some(c @ ('^' | '$' | '*')) => {
                self.expect('=')?;
                match c {
                    '^' => AttrOp::Prefix(String::new()),
                    '$' => AttrOp::Suffix(String::new()),
                    _ => AttrOp::Contains(String::new()),
                }
            }
            Some(c) => bail!("unexpected '{c}' in attribute selector"),
            None => bail!("unterminated attribute selector"),
        };
        self.skip_ws();
        let value = self.value()?;
        self.skip_ws();
        self.expect(']')?;
        let op = match op {
            AttrOp::Equals(_) => AttrOp::Equals(value),
            AttrOp::Prefix(_) => AttrOp::Prefix(value),
            AttrOp::Suffix(_) => AttrOp::Suffix(value),
            _ => AttrOp::Contains(value),
        };
        Ok(AttrTest { name, op })
    }

    fn value(&mut self) -> Result<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                let value = self.chars[start..self.pos].iter().collect();
                self.expect(quote)?;
                Ok(value)
            }
            _ => self.ident(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Flat element table: (tag, parent, attributes)
    struct Table(Vec<(&'static str, Option<usize>, HashMap<&'static str, &'static str>)>);

    impl SelectorContext for Table {
        fn node_tag(&self, node: NodeId) -> Option<&str> {
            self.0.get(node.0).map(|(tag, _, _)| *tag)
        }

        fn node_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
            self.0.get(node.0).and_then(|(_, _, attrs)| attrs.get(name).copied())
        }

        fn node_has_class(&self, node: NodeId, class: &str) -> bool {
            self.node_attribute(node, "class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
        }

        fn node_parent(&self, node: NodeId) -> Option<NodeId> {
            self.0.get(node.0).and_then(|(_, parent, _)| parent.map(NodeId))
        }
    }

    fn toc_table() -> Table {
        Table(vec![
            ("nav", None, HashMap::from([("class", "toc main")])),
            ("ul", Some(0), HashMap::new()),
            ("a", Some(1), HashMap::from([("href", "#about")])),
            ("a", Some(1), HashMap::from([("href", "https://x.com/"), ("target", "_blank")])),
            ("a", None, HashMap::from([("href", "#qa")])),
        ])
    }

    fn matching(selector: &str, table: &Table) -> Vec<usize> {
        let selector = Selector::parse(selector).unwrap();
        (0..table.0.len())
            .filter(|&i| selector.matches(table, NodeId(i)))
            .collect()
    }

    #[test]
    fn test_descendant_with_prefix_attribute() {
        let table = toc_table();
        assert_eq!(matching(r##"nav.toc a[href^="#"]"##, &table), vec![2]);
    }

    #[test]
    fn test_child_combinator_requires_direct_parent() {
        let table = toc_table();
        assert!(matching("nav > a", &table).is_empty());
        assert_eq!(matching("nav > ul", &table), vec![1]);
    }

    #[test]
    fn test_attribute_equality_and_list() {
        let table = toc_table();
        assert_eq!(matching(r#"a[target="_blank"]"#, &table), vec![3]);
        assert_eq!(matching("ul, a[target]", &table), vec![1, 3]);
        assert_eq!(matching("[href$=qa]", &table), vec![4]);
    }

    #[test]
    fn test_universal_and_class_only() {
        let table = toc_table();
        assert_eq!(matching("*", &table).len(), 5);
        assert_eq!(matching(".main", &table), vec![0]);
    }

    #[test]
    fn test_empty_prefix_never_matches() {
        let table = toc_table();
        assert!(matching(r#"a[href^=""]"#, &table).is_empty());
    }

    #[test]
    fn test_invalid_selectors_rejected() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("a[href").is_err());
        assert!(Selector::parse("a[href~=x]").is_err());
        assert!(Selector::parse("nav >").is_err());
        assert!(Selector::parse("a,").is_err());
    }
}
