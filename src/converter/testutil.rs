#![cfg(test)]

use std::collections::HashSet;

use crate::converter::connector::Connector;
use crate::converter::node::{Node, NodeId};
use crate::converter::segmenter::Segmenter;
use crate::converter::{BoundaryCheckMode, Lattice, NBestGenerator};
use crate::dict::{PosMatcher, SuggestionFilter, SuppressionDictionary};
use crate::request::ConversionRequest;
use crate::segments::Candidate;

/// Run a full enumeration with empty suppression/suggestion sets.
#[allow(clippy::too_many_arguments)]
pub fn enumerate(
    lattice: &Lattice,
    connector: &Connector,
    segmenter: &dyn Segmenter,
    pos_matcher: &PosMatcher,
    begin: NodeId,
    end: NodeId,
    mode: BoundaryCheckMode,
    request: &ConversionRequest,
    original_key: &str,
    expand_size: usize,
) -> Vec<Candidate> {
    let suppression = SuppressionDictionary::new();
    let suggestion = SuggestionFilter::new();
    let mut generator = NBestGenerator::new(
        &suppression,
        segmenter,
        connector,
        pos_matcher,
        lattice,
        &suggestion,
    );
    generator.reset(begin, end, mode);
    let mut out = Vec::new();
    while out.len() < expand_size {
        match generator.next(request, original_key) {
            Some(candidate) => out.push(candidate),
            None => break,
        }
    }
    out
}

/// All-zero connection matrix.
pub fn zero_connector(num_ids: u16) -> Connector {
    Connector::from_costs(num_ids, vec![0; num_ids as usize * num_ids as usize])
}

/// A word node spanning `[begin, end)` with uniform left/right id.
pub fn word(begin: usize, end: usize, key: &str, value: &str, id: u16, wcost: i32) -> Node {
    let mut node = Node::new(begin, end, key, value);
    node.lid = id;
    node.rid = id;
    node.wcost = wcost;
    node
}

/// Segmenter driven by explicit (left rid, right lid) tables.
pub struct TableSegmenter {
    all_boundaries: bool,
    boundaries: HashSet<(u16, u16)>,
    weak: HashSet<(u16, u16)>,
}

impl TableSegmenter {
    /// No pair is a boundary.
    pub fn none() -> Self {
        Self {
            all_boundaries: false,
            boundaries: HashSet::new(),
            weak: HashSet::new(),
        }
    }

    /// Every pair is a boundary.
    pub fn all() -> Self {
        Self {
            all_boundaries: true,
            boundaries: HashSet::new(),
            weak: HashSet::new(),
        }
    }

    pub fn with_boundaries(pairs: &[(u16, u16)]) -> Self {
        Self {
            all_boundaries: false,
            boundaries: pairs.iter().copied().collect(),
            weak: HashSet::new(),
        }
    }

    pub fn weak_pairs(mut self, pairs: &[(u16, u16)]) -> Self {
        self.weak = pairs.iter().copied().collect();
        self
    }
}

impl Segmenter for TableSegmenter {
    fn is_boundary(&self, lnode: &Node, rnode: &Node) -> bool {
        self.all_boundaries || self.boundaries.contains(&(lnode.rid, rnode.lid))
    }

    fn is_weak_connected(&self, lnode: &Node, rnode: &Node) -> bool {
        self.weak.contains(&(lnode.rid, rnode.lid))
    }
}
