use tracing::debug;

use super::node::{Node, NodeId, NodeType};

/// The conversion lattice: word nodes spanning a reading, indexed by
/// their begin and end positions.
///
/// The lattice owns its nodes in an arena; `NodeId`s stay valid until
/// `reset`. BOS and EOS sentinels are created on construction: BOS ends
/// at position 0, EOS begins at `key_len`. Edges are implicit, two nodes
/// are adjacent when one ends where the other begins.
///
/// This core treats the lattice as an input. Construction here is the
/// arena API only; dictionary-driven population belongs to the caller.
pub struct Lattice {
    nodes: Vec<Node>,
    /// begin_nodes[pos] = nodes starting at byte position pos.
    begin_nodes: Vec<Vec<NodeId>>,
    /// end_nodes[pos] = nodes ending at byte position pos.
    end_nodes: Vec<Vec<NodeId>>,
    key: String,
    bos: NodeId,
    eos: NodeId,
}

impl Lattice {
    /// Create a lattice spanning `key`, containing only BOS and EOS.
    pub fn new(key: &str) -> Self {
        let len = key.len();
        let mut lattice = Self {
            nodes: Vec::new(),
            begin_nodes: vec![Vec::new(); len + 1],
            end_nodes: vec![Vec::new(); len + 1],
            key: key.to_string(),
            bos: NodeId(0),
            eos: NodeId(1),
        };
        lattice.bos = lattice.insert(Node::bos());
        lattice.eos = lattice.insert(Node::eos(len));
        lattice
    }

    /// Drop all nodes and re-span `key`. Arena capacity is kept.
    pub fn reset(&mut self, key: &str) {
        let len = key.len();
        self.nodes.clear();
        self.begin_nodes.clear();
        self.begin_nodes.resize(len + 1, Vec::new());
        self.end_nodes.clear();
        self.end_nodes.resize(len + 1, Vec::new());
        self.key.clear();
        self.key.push_str(key);
        self.bos = self.insert(Node::bos());
        self.eos = self.insert(Node::eos(len));
    }

    /// Add a word node. Panics if the span falls outside the reading.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        assert!(node.begin_pos < node.end_pos, "empty node span");
        assert!(node.end_pos <= self.key.len(), "node span out of range");
        assert_eq!(node.node_type, NodeType::Normal);
        let id = self.insert(node);
        debug!(node = id.0, total = self.nodes.len(), "lattice node added");
        id
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.begin_nodes[node.begin_pos].push(id);
        self.end_nodes[node.end_pos].push(id);
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Nodes starting at byte position `pos`, in insertion order.
    pub fn begin_nodes(&self, pos: usize) -> &[NodeId] {
        &self.begin_nodes[pos]
    }

    /// Nodes ending at byte position `pos`, in insertion order.
    pub fn end_nodes(&self, pos: usize) -> &[NodeId] {
        &self.end_nodes[pos]
    }

    pub fn bos(&self) -> NodeId {
        self.bos
    }

    pub fn eos(&self) -> NodeId {
        self.eos
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Byte length of the spanned reading.
    pub fn key_len(&self) -> usize {
        self.key.len()
    }

    /// True when no word node was added.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 2
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
