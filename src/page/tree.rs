//! Read/write capability over a host document.
//!
//! Extraction and badge logic only talk to these traits, so they run the same
//! against a live page bridge or the in-memory [`MemoryDocument`](super::memory::MemoryDocument).

/// Handle to a node inside one document. Only meaningful for the document
/// that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

/// One attribute condition of a [`Selector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrMatch {
    /// `[name="value"]`
    Equals(&'static str, &'static str),
    /// `[name$="suffix"]`
    EndsWith(&'static str, &'static str),
    /// `.class`
    HasClass(&'static str),
}

/// A compound selector: optional tag name plus attribute conditions, all of
/// which must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    tag: Option<&'static str>,
    attrs: &'static [AttrMatch],
}

impl Selector {
    pub const fn new(tag: Option<&'static str>, attrs: &'static [AttrMatch]) -> Self {
        Self { tag, attrs }
    }

    pub const fn tag(tag: &'static str) -> Self {
        Self::new(Some(tag), &[])
    }

    pub fn matches_element<'a, F>(&self, tag: &str, attribute: F) -> bool
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        if let Some(expected) = self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        self.attrs.iter().all(|condition| match *condition {
            AttrMatch::Equals(name, value) => attribute(name) == Some(value),
            AttrMatch::EndsWith(name, suffix) => {
                attribute(name).is_some_and(|actual| actual.ends_with(suffix))
            }
            AttrMatch::HasClass(class) => attribute("class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class)),
        })
    }
}

pub trait DocumentTree {
    /// The document node itself.
    fn root(&self) -> NodeId;

    /// Element descendants of `scope` in document order, `scope` excluded.
    fn descendants(&self, scope: NodeId) -> Box<dyn Iterator<Item = NodeId> + '_>;

    fn matches(&self, node: NodeId, selector: Selector) -> bool;

    /// Concatenated text of the node and its descendants. Empty when the node
    /// has no text or no longer exists.
    fn text_content(&self, node: NodeId) -> String;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Lazily yields matches so callers can stop early.
    fn select(&self, scope: NodeId, selector: Selector) -> Box<dyn Iterator<Item = NodeId> + '_> {
        Box::new(
            self.descendants(scope)
                .filter(move |node| self.matches(*node, selector)),
        )
    }

    fn select_first(&self, scope: NodeId, selector: Selector) -> Option<NodeId> {
        self.select(scope, selector).next()
    }

    fn select_all(&self, scope: NodeId, selector: Selector) -> Vec<NodeId> {
        self.select(scope, selector).collect()
    }
}

pub trait DocumentTreeMut: DocumentTree {
    /// Creates a detached element.
    fn create_element(&mut self, tag: &str) -> NodeId;

    fn append_child(&mut self, parent: NodeId, child: NodeId);

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    /// Replaces all children of `node` with a single text node.
    fn set_text(&mut self, node: NodeId, text: &str);
}
