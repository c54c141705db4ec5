use std::fmt;

use linky::LinkKind;

use crate::surface::{Element, Surface};

/// Index of a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    /// `None` for the root.
    element: Option<Element>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

/// An in-memory surface. Nodes detached by `replace` or `remove` are freed
/// along with their subtrees and their slots reused by later `create` calls,
/// so a handle to a detached node must not be used again.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
}

/// How a [`Tree`] is painted to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintOptions {
    /// Spaces per unfold level.
    pub indent: usize,
    /// Append `^id` to links that can still be activated.
    pub show_ids: bool,
}

impl Default for PaintOptions {
    fn default() -> Self {
        PaintOptions {
            indent: 2,
            show_ids: false,
        }
    }
}

impl Tree {
    pub fn new() -> Self {
        Tree {
            nodes: vec![Node {
                element: None,
                children: Vec::new(),
                parent: None,
            }],
            free: Vec::new(),
        }
    }

    /// Nodes currently allocated, attached or not, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.0)?.element.as_ref()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    /// Children of `id` carrying a given element kind.
    pub fn children_where(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.element(c).is_some_and(&pred))
            .collect()
    }

    /// Concatenated text of a node's inline content, as painted.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.paint_inline(id, &PaintOptions::default(), &mut out);
        out
    }

    pub fn paint(&self, options: &PaintOptions) -> String {
        let mut out = String::new();
        self.paint_block(self.root(), 0, options, &mut out);
        out
    }

    fn paint_block(&self, id: NodeId, depth: usize, options: &PaintOptions, out: &mut String) {
        let pad = " ".repeat(depth * options.indent);
        for &child in self.children(id) {
            match self.element(child) {
                Some(Element::UnfoldContainer) => self.paint_block(child, depth, options, out),
                Some(Element::Unfolded) => self.paint_block(child, depth + 1, options, out),
                _ => {
                    // Paragraphs, and stray inline content at block level.
                    let mut line = String::new();
                    self.paint_inline(child, options, &mut line);
                    for text in line.split('\n') {
                        if !text.is_empty() {
                            out.push_str(&pad);
                        }
                        out.push_str(text);
                        out.push('\n');
                    }
                }
            }
        }
    }

    fn paint_inline(&self, id: NodeId, options: &PaintOptions, out: &mut String) {
        match self.element(id) {
            Some(Element::Text(s)) => out.push_str(s),
            Some(Element::Link {
                id: link,
                kind,
                label,
                consumed,
            }) => {
                match (kind, consumed) {
                    (LinkKind::Fold, false) => out.push_str(&format!("[{}]", label)),
                    (LinkKind::Fold, true) => out.push_str(label),
                    (LinkKind::Inline, _) => out.push_str(&format!("<{}>", label)),
                }
                if options.show_ids && !consumed {
                    out.push_str(&format!("^{}", link));
                }
            }
            _ => {
                for &child in self.children(id) {
                    self.paint_inline(child, options, out);
                }
            }
        }
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Return a detached subtree's slots to the free list.
    fn release(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let node = &mut self.nodes[current.0];
            // Already freed.
            if node.element.is_none() {
                continue;
            }
            node.element = None;
            node.parent = None;
            pending.append(&mut node.children);
            self.free.push(current);
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}

impl Surface for Tree {
    type Handle = NodeId;

    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn create(&mut self, element: Element) -> NodeId {
        let node = Node {
            element: Some(element),
            children: Vec::new(),
            parent: None,
        };
        if let Some(id) = self.free.pop() {
            self.nodes[id.0] = node;
            return id;
        }
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn replace(&mut self, old: NodeId, new: NodeId) {
        let Some(parent) = self.nodes[old.0].parent else {
            return;
        };
        self.detach(new);
        let Some(pos) = self.nodes[parent.0].children.iter().position(|&c| c == old) else {
            return;
        };
        self.nodes[parent.0].children[pos] = new;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
        self.release(old);
    }

    fn remove(&mut self, node: NodeId) {
        if node == self.root() {
            return;
        }
        self.detach(node);
        self.release(node);
    }

    fn clear(&mut self, container: NodeId) {
        if container == self.root() {
            self.nodes.truncate(1);
            self.nodes[0].children.clear();
            self.free.clear();
            return;
        }
        for child in std::mem::take(&mut self.nodes[container.0].children) {
            self.nodes[child.0].parent = None;
            self.release(child);
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.paint(&PaintOptions::default()))
    }
}
