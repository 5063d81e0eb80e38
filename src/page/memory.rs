use std::{collections::BTreeMap, sync::Arc};

use parking_lot::Mutex;
use serde::Deserialize;

use super::{
    tree::{DocumentTree, DocumentTreeMut, NodeId, Selector},
    watcher::{MutationSink, MutationWatcher, subscription},
};

/// Document shared between the host that renders it and the page context
/// that reads and annotates it.
pub type SharedDocument = Arc<Mutex<MemoryDocument>>;

/// Serialized page snapshot: elements are objects, text nodes bare strings.
///
/// ```json
/// { "tag": "div", "attrs": { "data-testid": "User-Name" }, "children": [
///     { "tag": "span", "children": ["Jane Doe"] }
/// ] }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SnapshotNode {
    Text(String),
    Element {
        tag: String,
        #[serde(default)]
        attrs: BTreeMap<String, String>,
        #[serde(default)]
        children: Vec<SnapshotNode>,
    },
}

#[derive(Debug)]
enum NodeData {
    Document,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document tree. Nodes are never freed; detached nodes simply
/// become unreachable from the root.
#[derive(Debug)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    watchers: Vec<MutationSink>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    const ROOT: NodeId = NodeId(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
            watchers: Vec::new(),
        }
    }

    /// Builds a document whose root holds `snapshot`. No insertions are
    /// reported for the initial content.
    pub fn from_snapshot(snapshot: &SnapshotNode) -> Self {
        let mut doc = Self::new();
        let top = doc.build(snapshot);
        doc.link(Self::ROOT, top);
        doc
    }

    pub fn into_shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    /// Renders `snapshot` under `parent`, reporting it like any other insertion.
    pub fn insert_snapshot(&mut self, parent: NodeId, snapshot: &SnapshotNode) -> NodeId {
        let node = self.build(snapshot);
        self.append_child(parent, node);
        node
    }

    /// Registers a new insertion watcher.
    pub fn watch(&mut self) -> MutationWatcher {
        let (sink, watcher) = subscription();
        self.watchers.retain(|existing| !existing.is_closed());
        self.watchers.push(sink);
        watcher
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.is_inclusive_ancestor(Self::ROOT, node)
    }

    /// Whether `ancestor` is `node` or lies on its parent chain.
    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id.0).and_then(|n| n.parent);
        }
        false
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn build(&mut self, snapshot: &SnapshotNode) -> NodeId {
        match snapshot {
            SnapshotNode::Text(text) => self.push(NodeData::Text(text.clone())),
            SnapshotNode::Element {
                tag,
                attrs,
                children,
            } => {
                let id = self.push(NodeData::Element {
                    tag: tag.to_ascii_lowercase(),
                    attrs: attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                });
                for child in children {
                    let child_id = self.build(child);
                    self.link(id, child_id);
                }
                id
            }
        }
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn notify(&mut self, batch: Vec<NodeId>) {
        self.watchers.retain(|sink| sink.publish(batch.clone()));
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].data {
            NodeData::Text(text) => out.push_str(text),
            _ => {
                for child in &self.nodes[node.0].children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }
}

struct Descendants<'a> {
    doc: &'a MemoryDocument,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some(id) = self.stack.pop() {
            let node = &self.doc.nodes[id.0];
            self.stack.extend(node.children.iter().rev().copied());
            if matches!(node.data, NodeData::Element { .. }) {
                return Some(id);
            }
        }
        None
    }
}

impl DocumentTree for MemoryDocument {
    fn root(&self) -> NodeId {
        Self::ROOT
    }

    fn descendants(&self, scope: NodeId) -> Box<dyn Iterator<Item = NodeId> + '_> {
        let stack = if self.contains(scope) {
            self.nodes[scope.0].children.iter().rev().copied().collect()
        } else {
            Vec::new()
        };
        Box::new(Descendants { doc: self, stack })
    }

    fn matches(&self, node: NodeId, selector: Selector) -> bool {
        match self.nodes.get(node.0).map(|n| &n.data) {
            Some(NodeData::Element { tag, attrs }) => selector.matches_element(tag, |name| {
                attrs
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| value.as_str())
            }),
            _ => false,
        }
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        if self.contains(node) {
            self.collect_text(node, &mut out);
        }
        out
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone()),
            _ => None,
        }
    }
}

impl DocumentTreeMut for MemoryDocument {
    fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    /// Moving a node under itself or its own subtree is ignored, as is any
    /// attempt to move the document node.
    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.contains(parent)
            || !self.contains(child)
            || child == Self::ROOT
            || self.is_inclusive_ancestor(child, parent)
        {
            tracing::debug!(target: "page", ?parent, ?child, "rejected append");
            return;
        }
        self.link(parent, child);
        if self.is_connected(parent) {
            self.notify(vec![child]);
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(Node {
            data: NodeData::Element { attrs, .. },
            ..
        }) = self.nodes.get_mut(node.0)
        else {
            return;
        };
        match attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if !self.contains(node) {
            return;
        }
        // A lone text child is rewritten in place so relabelling does not grow the arena.
        if let [only] = self.nodes[node.0].children[..] {
            if let NodeData::Text(existing) = &mut self.nodes[only.0].data {
                existing.clear();
                existing.push_str(text);
                return;
            }
        }
        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
        }
        let text_node = self.push(NodeData::Text(text.to_string()));
        self.link(node, text_node);
    }
}
