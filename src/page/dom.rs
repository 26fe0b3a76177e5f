//! PageDom: arena snapshot of the page's element/text tree
//!
//! The content script serializes the subtree it watches into a `NodeSnapshot`
//! and ships it across the WASM boundary; the core never holds live DOM
//! references. The arena supports the node surgery the highlight engine
//! needs: splice-replacing a text node with a marker sequence, unwrapping
//! markers, and merging adjacent text nodes back together.
//!
//! Nodes are never removed from the arena; detached nodes keep their slot
//! with `parent = None` for the lifetime of the snapshot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Types
// =============================================================================

/// Index into the arena. Stable for the lifetime of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

fn default_extent() -> f64 {
    1.0
}

/// Element state the eligibility filter needs, captured at snapshot time.
///
/// `display_none` and `content_editable` are checked along the ancestor
/// chain; `visibility_hidden` and the rendered box only on the nearest
/// element, matching computed-style semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementData {
    pub tag: String,
    #[serde(default)]
    pub content_editable: bool,
    #[serde(default)]
    pub display_none: bool,
    #[serde(default)]
    pub visibility_hidden: bool,
    #[serde(default = "default_extent")]
    pub width: f64,
    #[serde(default = "default_extent")]
    pub height: f64,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            content_editable: false,
            display_none: false,
            visibility_hidden: false,
            width: default_extent(),
            height: default_extent(),
            attrs: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Wire shape for a snapshotted subtree: a node is a text run or an element
/// with children.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSnapshot {
    Text {
        text: String,
    },
    Element {
        tag: String,
        #[serde(default)]
        content_editable: bool,
        #[serde(default)]
        display_none: bool,
        #[serde(default)]
        visibility_hidden: bool,
        #[serde(default = "default_extent")]
        width: f64,
        #[serde(default = "default_extent")]
        height: f64,
        #[serde(default)]
        attrs: BTreeMap<String, String>,
        #[serde(default)]
        children: Vec<NodeSnapshot>,
    },
}

// =============================================================================
// PageDom
// =============================================================================

#[derive(Debug, Clone)]
pub struct PageDom {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for PageDom {
    fn default() -> Self {
        Self::new()
    }
}

impl PageDom {
    /// Empty document with a `<body>` root.
    pub fn new() -> Self {
        Self::with_root(ElementData::new("body"))
    }

    pub fn with_root(data: ElementData) -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Element(data),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// Rebuild from a wire snapshot. A bare text root is wrapped in a body.
    pub fn from_snapshot(snapshot: &NodeSnapshot) -> Self {
        match snapshot {
            NodeSnapshot::Text { text } => {
                let mut dom = Self::new();
                dom.append_text(dom.root(), text);
                dom
            }
            NodeSnapshot::Element {
                tag,
                content_editable,
                display_none,
                visibility_hidden,
                width,
                height,
                attrs,
                children,
            } => {
                let mut dom = Self::with_root(ElementData {
                    tag: tag.clone(),
                    content_editable: *content_editable,
                    display_none: *display_none,
                    visibility_hidden: *visibility_hidden,
                    width: *width,
                    height: *height,
                    attrs: attrs.clone(),
                });
                for child in children {
                    dom.append_snapshot(dom.root(), child);
                }
                dom
            }
        }
    }

    fn append_snapshot(&mut self, parent: NodeId, snapshot: &NodeSnapshot) {
        match snapshot {
            NodeSnapshot::Text { text } => {
                self.append_text(parent, text);
            }
            NodeSnapshot::Element {
                tag,
                content_editable,
                display_none,
                visibility_hidden,
                width,
                height,
                attrs,
                children,
            } => {
                let id = self.append_element(
                    parent,
                    ElementData {
                        tag: tag.clone(),
                        content_editable: *content_editable,
                        display_none: *display_none,
                        visibility_hidden: *visibility_hidden,
                        width: *width,
                        height: *height,
                        attrs: attrs.clone(),
                    },
                );
                for child in children {
                    self.append_snapshot(id, child);
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Detached text node, to be attached via `replace_node`.
    pub fn new_text(&mut self, content: &str) -> NodeId {
        self.push(Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Text(content.to_string()),
        })
    }

    /// Detached element node, to be attached via `replace_node`.
    pub fn new_element(&mut self, data: ElementData) -> NodeId {
        self.push(Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Element(data),
        })
    }

    pub fn append_text(&mut self, parent: NodeId, content: &str) -> NodeId {
        let id = self.new_text(content);
        self.attach(parent, id);
        id
    }

    pub fn append_element(&mut self, parent: NodeId, data: ElementData) -> NodeId {
        let id = self.new_element(data);
        self.attach(parent, id);
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.is_element(parent), "children attach to elements");
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.get(id).map(|n| &n.kind), Some(NodeKind::Element(_)))
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.get(id).map(|n| &n.kind), Some(NodeKind::Text(_)))
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.get(id).map(|n| &n.kind) {
            Some(NodeKind::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.get(id).map(|n| &n.kind) {
            Some(NodeKind::Element(data)) => Some(data),
            _ => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attrs.get(name)).map(String::as_str)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(NodeKind::Element(data)) = self.nodes.get_mut(id.0).map(|n| &mut n.kind) {
            data.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Nearest element: the node itself for elements, the parent for text.
    pub fn nearest_element(&self, id: NodeId) -> Option<NodeId> {
        if self.is_element(id) {
            Some(id)
        } else {
            self.parent(id)
        }
    }

    /// Ancestor chain starting at `id` itself (for elements) or its parent
    /// (for text nodes), ending at the root.
    pub fn ancestor_elements(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.nearest_element(id);
        while let Some(el) = current {
            chain.push(el);
            current = self.parent(el);
        }
        chain
    }

    // -------------------------------------------------------------------------
    // Traversal
    // -------------------------------------------------------------------------

    fn walk(&self, from: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(node) = self.get(id) {
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        order
    }

    /// All text nodes in document order (depth-first pre-order).
    pub fn text_nodes(&self) -> Vec<NodeId> {
        self.walk(self.root)
            .into_iter()
            .filter(|&id| self.is_text(id))
            .collect()
    }

    /// All element nodes in document order.
    pub fn elements_in_order(&self) -> Vec<NodeId> {
        self.walk(self.root)
            .into_iter()
            .filter(|&id| self.is_element(id))
            .collect()
    }

    /// Concatenated text of the whole document, in document order.
    pub fn text_content(&self) -> String {
        self.subtree_text(self.root)
    }

    /// Concatenated text of one subtree.
    pub fn subtree_text(&self, from: NodeId) -> String {
        let mut out = String::new();
        for id in self.walk(from) {
            if let Some(text) = self.text(id) {
                out.push_str(text);
            }
        }
        out
    }

    // -------------------------------------------------------------------------
    // Surgery
    // -------------------------------------------------------------------------

    /// Replace an attached node with a sequence of (detached) nodes, splicing
    /// them into the parent's child list at the same position. The old node
    /// is detached but keeps its arena slot. Returns false when the target
    /// has no parent or the replacement nodes are unknown.
    pub fn replace_node(&mut self, target: NodeId, replacements: &[NodeId]) -> bool {
        let Some(parent) = self.parent(target) else {
            return false;
        };
        if replacements.iter().any(|r| self.get(*r).is_none()) {
            return false;
        }
        let Some(pos) = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == target)
        else {
            return false;
        };

        self.nodes[target.0].parent = None;
        for &r in replacements {
            self.nodes[r.0].parent = Some(parent);
        }
        self.nodes[parent.0]
            .children
            .splice(pos..=pos, replacements.iter().copied());
        true
    }

    /// Merge adjacent text-node siblings and drop empty text nodes, as
    /// `Node.normalize()` does after markers are unwrapped.
    pub fn normalize(&mut self) {
        for el in self.elements_in_order() {
            let children = self.nodes[el.0].children.clone();
            let mut merged: Vec<NodeId> = Vec::with_capacity(children.len());

            for child in children {
                let text = match &self.nodes[child.0].kind {
                    NodeKind::Text(s) => Some(s.clone()),
                    NodeKind::Element(_) => None,
                };
                match text {
                    Some(content) if content.is_empty() => {
                        self.nodes[child.0].parent = None;
                    }
                    Some(content) => {
                        let merged_into_prev = match merged.last() {
                            Some(&prev) => {
                                if let NodeKind::Text(s) =
                                    &mut self.nodes[prev.0].kind
                                {
                                    s.push_str(&content);
                                    true
                                } else {
                                    false
                                }
                            }
                            None => false,
                        };
                        if merged_into_prev {
                            self.nodes[child.0].parent = None;
                        } else {
                            merged.push(child);
                        }
                    }
                    None => merged.push(child),
                }
            }

            self.nodes[el.0].children = merged;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
