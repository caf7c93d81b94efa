//! Allow-list tree filter
//!
//! Starting at a root element, every attribute whose name is not allowed is
//! removed, every child element whose tag is not allowed is dropped together
//! with its whole subtree, and every child that is neither an element nor
//! text is dropped. The root itself always survives.

use std::ops::AddAssign;

use tracing::debug;

use crate::allowlist::Allowlist;
use crate::error::Result;
use crate::xml::model::{Element, Node};

/// Switches that change what the filter touches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    /// Delete spaces, tabs and newlines from surviving text nodes
    pub strip_whitespace: bool,
    /// Apply the attribute allow-list to the root element as well
    pub filter_root_attributes: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            strip_whitespace: true,
            filter_root_attributes: true,
        }
    }
}

/// What a sanitization pass removed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Rejected elements; descendants of a rejected element are not counted
    pub elements_removed: usize,
    pub attributes_removed: usize,
    /// Comments, CDATA sections, processing instructions and doctypes
    pub other_nodes_removed: usize,
    /// Text nodes that lost at least one whitespace character
    pub text_nodes_stripped: usize,
}

impl Stats {
    /// True when the pass removed nothing
    pub const fn is_clean(&self) -> bool {
        self.elements_removed == 0
            && self.attributes_removed == 0
            && self.other_nodes_removed == 0
            && self.text_nodes_stripped == 0
    }
}

impl AddAssign for Stats {
    fn add_assign(&mut self, rhs: Self) {
        self.elements_removed += rhs.elements_removed;
        self.attributes_removed += rhs.attributes_removed;
        self.other_nodes_removed += rhs.other_nodes_removed;
        self.text_nodes_stripped += rhs.text_nodes_stripped;
    }
}

/// Allow-list filter over element trees
#[derive(Clone, Debug)]
pub struct Sanitizer {
    allowlist: Allowlist,
    options: Options,
}

impl Sanitizer {
    /// Create a sanitizer, rejecting unusable allow-lists up front
    pub fn new(allowlist: Allowlist) -> Result<Self> {
        allowlist.validate()?;
        Ok(Self {
            allowlist,
            options: Options::default(),
        })
    }

    /// Replace the default options
    pub const fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Names this sanitizer keeps
    pub const fn allowlist(&self) -> &Allowlist {
        &self.allowlist
    }

    /// Current options
    pub const fn options(&self) -> Options {
        self.options
    }

    /// Sanitize `root` and hand it back
    pub fn sanitize(&self, mut root: Element) -> Element {
        self.sanitize_in_place(&mut root);
        root
    }

    /// Sanitize `root` in place and report what was removed
    pub fn sanitize_in_place(&self, root: &mut Element) -> Stats {
        let mut stats = Stats::default();
        if self.options.filter_root_attributes {
            self.filter_attributes(root, &mut stats);
        }
        self.filter_children(root, &mut stats);
        debug!(
            root = %root.name,
            elements_removed = stats.elements_removed,
            attributes_removed = stats.attributes_removed,
            other_nodes_removed = stats.other_nodes_removed,
            text_nodes_stripped = stats.text_nodes_stripped,
            "sanitized element tree"
        );
        stats
    }

    fn filter_attributes(&self, element: &mut Element, stats: &mut Stats) {
        let before = element.attributes.len();
        element
            .attributes
            .retain(|name, _| self.allowlist.allows_attribute(name));
        stats.attributes_removed += before - element.attributes.len();
    }

    fn filter_children(&self, element: &mut Element, stats: &mut Stats) {
        let children = std::mem::take(&mut element.children);
        element.children = children
            .into_iter()
            .filter_map(|node| self.filter_node(node, stats))
            .collect();
    }

    fn filter_node(&self, node: Node, stats: &mut Stats) -> Option<Node> {
        match node {
            Node::Element(mut child) => {
                if !self.allowlist.allows_element(&child.name) {
                    stats.elements_removed += 1;
                    return None;
                }
                self.filter_attributes(&mut child, stats);
                self.filter_children(&mut child, stats);
                Some(Node::Element(child))
            }
            Node::Text(mut text) => {
                if self.options.strip_whitespace && strip_text(&mut text) {
                    stats.text_nodes_stripped += 1;
                }
                Some(Node::Text(text))
            }
            Node::Comment(_)
            | Node::CData(_)
            | Node::ProcessingInstruction { .. }
            | Node::Doctype(_) => {
                stats.other_nodes_removed += 1;
                None
            }
        }
    }
}

/// One-shot form of [`Sanitizer`]: validate the two name sets, then filter `root`.
pub fn sanitize<E, A>(
    root: Element,
    allowed_elements: E,
    allowed_attributes: A,
    strip_whitespace: bool,
) -> Result<Element>
where
    E: IntoIterator,
    E::Item: Into<String>,
    A: IntoIterator,
    A::Item: Into<String>,
{
    let allowlist = Allowlist::new(allowed_elements, allowed_attributes)?;
    let sanitizer = Sanitizer::new(allowlist)?.with_options(Options {
        strip_whitespace,
        ..Options::default()
    });
    Ok(sanitizer.sanitize(root))
}

/// Delete whitespace from every text node under `element` without removing
/// any node. Returns the number of text nodes that changed.
pub fn strip_whitespace(element: &mut Element) -> usize {
    element
        .children
        .iter_mut()
        .map(|node| match node {
            Node::Element(child) => strip_whitespace(child),
            Node::Text(text) => usize::from(strip_text(text)),
            _ => 0,
        })
        .sum()
}

/// Remove spaces, tabs and newlines; reports whether anything was removed
fn strip_text(text: &mut String) -> bool {
    let before = text.len();
    text.retain(|c| !matches!(c, ' ' | '\t' | '\n'));
    text.len() != before
}
