use crate::dict::PosMatcher;

use super::node::Node;

/// Decides whether two adjacent nodes belong to different user-visible
/// segments.
pub trait Segmenter: Send + Sync {
    /// True when a segmentation boundary lies between `lnode` and `rnode`.
    fn is_boundary(&self, lnode: &Node, rnode: &Node) -> bool;

    /// True when the pair may be joined only with a penalty.
    fn is_weak_connected(&self, _lnode: &Node, rnode: &Node) -> bool {
        rnode.attributes & Node::WEAK_CONNECTED != 0
    }
}

/// Default segmenter: a segment starts at every content word.
///
/// Functional words (particles, auxiliaries) attach to the segment on
/// their left, so a boundary exists exactly before content-word nodes.
pub struct PosSegmenter {
    pos_matcher: PosMatcher,
}

impl PosSegmenter {
    pub fn new(pos_matcher: PosMatcher) -> Self {
        Self { pos_matcher }
    }
}

impl Segmenter for PosSegmenter {
    fn is_boundary(&self, _lnode: &Node, rnode: &Node) -> bool {
        self.pos_matcher.is_content_word(rnode.lid)
    }
}
