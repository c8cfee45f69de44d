use crate::converter::connector::INVALID_COST;

/// Index of a node in its lattice's arena.
///
/// Nodes reference each other (`prev` links) through these indices rather
/// than owning links, so the whole node forest stays acyclic and `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Normal,
    Bos,
    Eos,
}

/// A word node in the conversion lattice.
///
/// `key` and `value` are owned `String`s, cloned from dictionary results.
/// `content_key`/`content_value` hold the stemmable prefix; for a plain
/// content word they equal `key`/`value`.
#[derive(Debug, Clone)]
pub struct Node {
    /// Start position in the reading (byte offset, inclusive).
    pub begin_pos: usize,
    /// End position in the reading (byte offset, exclusive).
    pub end_pos: usize,
    /// Reading of this node.
    pub key: String,
    /// Surface form.
    pub value: String,
    /// Stem part of the reading.
    pub content_key: String,
    /// Stem part of the surface.
    pub content_value: String,
    /// Left morpheme ID.
    pub lid: u16,
    /// Right morpheme ID.
    pub rid: u16,
    /// Word cost.
    pub wcost: i32,
    /// Accumulated best-path cost from BOS, populated by the Viterbi pass.
    pub cost: i32,
    /// Best predecessor on the Viterbi path. Forms a forest rooted at BOS.
    pub prev: Option<NodeId>,
    /// Attribute bitmask, see the associated constants.
    pub attributes: u32,
    pub node_type: NodeType,
}

impl Node {
    /// Tokens came from the user dictionary.
    pub const USER_DICTIONARY: u32 = 1 << 0;
    /// "Did you mean" entry.
    pub const SPELLING_CORRECTION: u32 = 1 << 1;
    /// Joining across this node is allowed but penalized.
    pub const WEAK_CONNECTED: u32 = 1 << 2;
    /// The surface must not be modified by rewriters.
    pub const NO_MODIFICATION: u32 = 1 << 3;
    /// Skip full/half-width variant expansion.
    pub const NO_VARIANTS_EXPANSION: u32 = 1 << 4;

    /// A normal dictionary word spanning `[begin_pos, end_pos)`.
    pub fn new(begin_pos: usize, end_pos: usize, key: &str, value: &str) -> Self {
        Self {
            begin_pos,
            end_pos,
            key: key.to_string(),
            value: value.to_string(),
            content_key: key.to_string(),
            content_value: value.to_string(),
            lid: 0,
            rid: 0,
            wcost: 0,
            cost: 0,
            prev: None,
            attributes: 0,
            node_type: NodeType::Normal,
        }
    }

    pub(crate) fn bos() -> Self {
        let mut node = Node::new(0, 0, "", "");
        node.node_type = NodeType::Bos;
        node
    }

    pub(crate) fn eos(pos: usize) -> Self {
        let mut node = Node::new(pos, pos, "", "");
        node.node_type = NodeType::Eos;
        // Unreachable until the Viterbi pass connects it.
        node.cost = INVALID_COST;
        node
    }

    pub fn is_bos(&self) -> bool {
        self.node_type == NodeType::Bos
    }

    pub fn is_eos(&self) -> bool {
        self.node_type == NodeType::Eos
    }
}
