use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::{debug, debug_span, warn};

use crate::dict::{PosMatcher, SuggestionFilter, SuppressionDictionary};
use crate::request::ConversionRequest;
use crate::segments::{Candidate, Segment};
use crate::settings::settings;

use super::candidate_filter::{CandidateFilter, FilterResult};
use super::connector::{saturating_cost_add, Connector, INVALID_COST};
use super::lattice::Lattice;
use super::node::{Node, NodeId};
use super::segmenter::Segmenter;

/// How segmentation boundaries are enforced along an enumerated path.
///
/// For the case like;
///   Candidate edge:      |  candidate  |
///   Nodes:        |Node A|Node B|Node C|Node D|
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCheckMode {
    /// For normal conversion. Candidate boundary is strictly the same as
    /// the inner boundary.
    /// A-B: should be the boundary
    /// B-C: should not be the boundary
    /// C-D: should be the boundary
    Strict,
    /// For resegmented segments. Check mid points only.
    /// A-B: don't care
    /// B-C: should not be the boundary
    /// C-D: don't care
    OnlyMid,
    /// For realtime conversion. Check only the candidate edges.
    /// A-B: should be the boundary
    /// B-C: don't care
    /// C-D: should be the boundary
    OnlyEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundaryCheckResult {
    Valid,
    /// Valid but should get a penalty.
    ValidWeakConnected,
    Invalid,
}

/// Index into the search-state pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StateId(u32);

/// One A* search state: a node plus the path from it to the end boundary.
///
/// `fx = gx + node.cost`: `gx` is the accumulated backward cost and the
/// node's forward Viterbi cost is the exact heuristic. `structure_gx`
/// excludes the transitions at the candidate edges; `w_gx` is the
/// word-cost-only share. After the search, `gx` of the goal state is the
/// candidate's cost.
#[derive(Debug, Clone, Copy)]
struct QueueElement {
    node: NodeId,
    /// Link toward the end boundary; `None` for the initial state.
    next: Option<StateId>,
    fx: i32,
    gx: i32,
    structure_gx: i32,
    w_gx: i32,
    /// A weak connection was crossed somewhere along the path.
    weak_connected: bool,
}

/// Append-only arena of search states, cleared between enumerations.
///
/// Popped states must stay alive until the candidate for their path is
/// materialized, so nothing is ever freed individually.
#[derive(Default)]
struct StatePool {
    elements: Vec<QueueElement>,
}

impl StatePool {
    fn create(&mut self, element: QueueElement) -> StateId {
        let id = StateId(self.elements.len() as u32);
        self.elements.push(element);
        id
    }

    fn get(&self, id: StateId) -> QueueElement {
        self.elements[id.0 as usize]
    }

    fn clear(&mut self) {
        self.elements.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AgendaEntry {
    fx: i32,
    seq: u64,
    state: StateId,
}

impl Ord for AgendaEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the smallest
        // (fx, seq) on top. Ties resolve to insertion order.
        other
            .fx
            .cmp(&self.fx)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for AgendaEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of search states keyed by `fx`, stable across equal keys.
#[derive(Default)]
struct Agenda {
    heap: BinaryHeap<AgendaEntry>,
    seq: u64,
}

impl Agenda {
    fn push(&mut self, state: StateId, fx: i32) {
        self.seq += 1;
        self.heap.push(AgendaEntry {
            fx,
            seq: self.seq,
            state,
        });
    }

    fn pop(&mut self) -> Option<StateId> {
        self.heap.pop().map(|e| e.state)
    }

    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn clear(&mut self) {
        self.heap.clear();
        self.seq = 0;
    }

    fn reserve(&mut self, n: usize) {
        self.heap.reserve(n);
    }
}

enum TopInsertion {
    Emitted(Candidate),
    Rejected,
    Abort,
}

/// Enumerates the N best paths between two boundary nodes of a lattice.
///
/// `begin_node` and `end_node` are the context nodes surrounding the
/// span (BOS / the last node of the preceding segment on the left, EOS /
/// the first following node on the right); candidate paths consist of
/// the nodes strictly between them.
///
/// Precondition: a forward Viterbi pass has populated `cost` and `prev`
/// on every reachable node. The A* runs backward from `end_node` and
/// uses `cost` as its heuristic, so pops come out in non-decreasing
/// total-cost order.
pub struct NBestGenerator<'a> {
    segmenter: &'a dyn Segmenter,
    connector: &'a Connector,
    pos_matcher: &'a PosMatcher,
    lattice: &'a Lattice,

    begin_node: Option<NodeId>,
    end_node: Option<NodeId>,

    agenda: Agenda,
    pool: StatePool,
    filter: CandidateFilter<'a>,
    viterbi_result_checked: bool,
    check_mode: BoundaryCheckMode,
}

impl<'a> NBestGenerator<'a> {
    pub fn new(
        suppression_dictionary: &'a SuppressionDictionary,
        segmenter: &'a dyn Segmenter,
        connector: &'a Connector,
        pos_matcher: &'a PosMatcher,
        lattice: &'a Lattice,
        suggestion_filter: &'a SuggestionFilter,
    ) -> Self {
        Self {
            segmenter,
            connector,
            pos_matcher,
            lattice,
            begin_node: None,
            end_node: None,
            agenda: Agenda::default(),
            pool: StatePool::default(),
            filter: CandidateFilter::new(suppression_dictionary, suggestion_filter, pos_matcher),
            viterbi_result_checked: false,
            check_mode: BoundaryCheckMode::Strict,
        }
    }

    /// Restart the enumeration between `begin_node` and `end_node`.
    pub fn reset(&mut self, begin_node: NodeId, end_node: NodeId, mode: BoundaryCheckMode) {
        self.agenda.clear();
        self.pool.clear();
        self.filter.reset();
        self.agenda.reserve(settings().nbest.agenda_reserve);

        self.begin_node = Some(begin_node);
        self.end_node = Some(end_node);
        self.check_mode = mode;
        self.viterbi_result_checked = false;

        let end = self.lattice.node(end_node);
        let initial = QueueElement {
            node: end_node,
            next: None,
            fx: end.cost,
            gx: 0,
            structure_gx: 0,
            w_gx: 0,
            weak_connected: false,
        };
        let id = self.pool.create(initial);
        self.agenda.push(id, initial.fx);
    }

    /// Append up to `expand_size` candidates to `segment`.
    pub fn set_candidates(
        &mut self,
        request: &ConversionRequest,
        original_key: &str,
        expand_size: usize,
        segment: &mut Segment,
    ) {
        let _span = debug_span!("set_candidates", expand_size).entered();
        while segment.candidates_size() < expand_size {
            match self.next(request, original_key) {
                Some(candidate) => {
                    let at = segment.candidates_size();
                    segment.insert_candidate_value(at, candidate);
                }
                None => break,
            }
        }
        debug!(candidates = segment.candidates_size());
    }

    /// Produce the next best candidate, or `None` when the enumeration is
    /// exhausted (empty agenda, filter stop, trial bound, or a broken
    /// Viterbi precondition).
    pub fn next(
        &mut self,
        request: &ConversionRequest,
        original_key: &str,
    ) -> Option<Candidate> {
        let begin = self.begin_node?;
        let end = self.end_node?;

        if !self.viterbi_result_checked {
            self.viterbi_result_checked = true;
            match self.insert_top_result(request, original_key, begin, end) {
                TopInsertion::Emitted(candidate) => return Some(candidate),
                TopInsertion::Abort => return None,
                TopInsertion::Rejected => {}
            }
        }

        if self.agenda.is_empty() {
            return None;
        }

        let begin_end_pos = self.lattice.node(begin).end_pos;
        let max_trials = settings().nbest.max_trials;
        let mut trials = 0;

        while let Some(state_id) = self.agenda.pop() {
            trials += 1;
            if trials > max_trials {
                debug!(trials, "too many trials");
                return None;
            }

            let elem = self.pool.get(state_id);
            if elem.node == begin {
                // Reached the begin node: the chain from here spells a
                // full path. Skip the boundary element itself and the
                // end-boundary element at the tail.
                let mut nodes = Vec::new();
                let mut cur = elem.next;
                while let Some(sid) = cur {
                    let e = self.pool.get(sid);
                    if e.next.is_none() {
                        break;
                    }
                    nodes.push(e.node);
                    cur = e.next;
                }
                if nodes.is_empty() {
                    continue;
                }

                let candidate = self.make_candidate(
                    elem.gx,
                    elem.structure_gx,
                    elem.w_gx,
                    elem.weak_connected,
                    &nodes,
                );
                match self.filter.filter_candidate(
                    request,
                    original_key,
                    &candidate,
                    nodes.len(),
                    self.check_mode,
                ) {
                    FilterResult::Good => return Some(candidate),
                    FilterResult::Bad => continue,
                    FilterResult::Stop => return None,
                }
            }

            self.expand(state_id, &elem, begin, end, begin_end_pos);
        }
        None
    }

    /// Push the predecessors of `elem.node` onto the agenda.
    fn expand(
        &mut self,
        state_id: StateId,
        elem: &QueueElement,
        begin: NodeId,
        end: NodeId,
        begin_end_pos: usize,
    ) {
        let rnode_id = elem.node;
        let is_end = rnode_id == end;
        let rnode_begin_pos = self.lattice.node(rnode_id).begin_pos;

        for &lnode_id in self.lattice.end_nodes(rnode_begin_pos) {
            let lnode = self.lattice.node(lnode_id);
            let rnode = self.lattice.node(rnode_id);
            let at_begin = lnode_id == begin;

            // The goal is the begin node itself, not its position:
            // distinct nodes may share an end position. A predecessor
            // that is not the begin node but ends at or before its end
            // position can never reach it (spans are non-empty, so
            // positions only decrease), so it is a dead end.
            if !at_begin && lnode.end_pos <= begin_end_pos {
                continue;
            }

            let is_edge = is_end || at_begin;
            let bcheck = self.boundary_check(lnode, rnode, is_edge);
            if bcheck == BoundaryCheckResult::Invalid {
                continue;
            }

            let transition = self.connector.transition_cost(lnode.rid, rnode.lid);
            if transition >= INVALID_COST {
                continue;
            }

            // The right node's word cost is charged on entry, so the
            // exclusive end boundary contributes its transition only.
            let (mut dg, mut dstructure, mut dw) = if is_end {
                (transition, 0, 0)
            } else {
                (
                    saturating_cost_add(transition, rnode.wcost),
                    if at_begin { 0 } else { transition },
                    rnode.wcost,
                )
            };

            let mut weak_connected = elem.weak_connected;
            if bcheck == BoundaryCheckResult::ValidWeakConnected {
                let penalty = settings().nbest.weak_connected_penalty;
                dg = saturating_cost_add(dg, penalty);
                dstructure += penalty / 2;
                dw += penalty / 2;
                weak_connected = true;
            }

            let gx = saturating_cost_add(elem.gx, dg);
            let fx = saturating_cost_add(gx, lnode.cost);
            if fx >= INVALID_COST {
                continue;
            }

            let element = QueueElement {
                node: lnode_id,
                next: Some(state_id),
                fx,
                gx,
                structure_gx: elem.structure_gx + dstructure,
                w_gx: elem.w_gx + dw,
                weak_connected,
            };
            let id = self.pool.create(element);
            self.agenda.push(id, element.fx);
        }
    }

    /// Emit the Viterbi 1-best before the A* starts, by walking the
    /// `prev` chain from the end boundary back to the begin boundary.
    fn insert_top_result(
        &mut self,
        request: &ConversionRequest,
        original_key: &str,
        begin: NodeId,
        end: NodeId,
    ) -> TopInsertion {
        let mut nodes = Vec::new();
        let mut cur = self.lattice.node(end).prev;
        let mut reached_begin = false;
        while let Some(id) = cur {
            if id == begin {
                reached_begin = true;
                break;
            }
            nodes.push(id);
            cur = self.lattice.node(id).prev;
        }
        if !reached_begin || nodes.is_empty() {
            warn!("viterbi path does not connect the enumeration endpoints");
            return TopInsertion::Abort;
        }
        nodes.reverse();

        let end_node = self.lattice.node(end);
        let begin_node = self.lattice.node(begin);
        let cost = end_node.cost - end_node.wcost - begin_node.cost;
        let mut wcost = 0;
        let mut structure_cost = 0;
        for (i, &id) in nodes.iter().enumerate() {
            let node = self.lattice.node(id);
            wcost += node.wcost;
            if i > 0 {
                let prev = self.lattice.node(nodes[i - 1]);
                structure_cost += self.connector.transition_cost(prev.rid, node.lid);
            }
        }

        let mut candidate = self.make_candidate(cost, structure_cost, wcost, false, &nodes);
        candidate.attributes |= Candidate::BEST_CANDIDATE;
        match self.filter.filter_candidate(
            request,
            original_key,
            &candidate,
            nodes.len(),
            self.check_mode,
        ) {
            FilterResult::Good => TopInsertion::Emitted(candidate),
            FilterResult::Bad => TopInsertion::Rejected,
            FilterResult::Stop => TopInsertion::Abort,
        }
    }

    /// Turn a path (in begin-to-end order) into a segment candidate.
    fn make_candidate(
        &self,
        cost: i32,
        structure_cost: i32,
        wcost: i32,
        weak_connected: bool,
        nodes: &[NodeId],
    ) -> Candidate {
        let mut candidate = Candidate::new();
        candidate.cost = cost;
        candidate.structure_cost = structure_cost;
        candidate.wcost = wcost;
        candidate.lid = self.lattice.node(nodes[0]).lid;
        candidate.rid = self.lattice.node(*nodes.last().unwrap()).rid;

        // The first node carries the stem; following nodes extend the
        // content until the first functional word.
        let mut functional_seen = false;
        for (i, &id) in nodes.iter().enumerate() {
            let node = self.lattice.node(id);
            candidate.key.push_str(&node.key);
            candidate.value.push_str(&node.value);

            if i == 0 {
                candidate.content_key.push_str(&node.content_key);
                candidate.content_value.push_str(&node.content_value);
            } else if !functional_seen {
                if self.pos_matcher.is_functional(node.lid) {
                    functional_seen = true;
                } else {
                    candidate.content_key.push_str(&node.key);
                    candidate.content_value.push_str(&node.value);
                }
            }

            if node.attributes & Node::SPELLING_CORRECTION != 0 {
                candidate.attributes |= Candidate::SPELLING_CORRECTION;
            }
            if node.attributes & Node::NO_VARIANTS_EXPANSION != 0 {
                candidate.attributes |= Candidate::NO_VARIANTS_EXPANSION;
            }
            if node.attributes & Node::USER_DICTIONARY != 0 {
                candidate.attributes |= Candidate::USER_DICTIONARY;
                if node.attributes & Node::NO_MODIFICATION != 0 {
                    candidate.attributes |=
                        Candidate::NO_VARIANTS_EXPANSION | Candidate::NO_EXTRA_DESCRIPTION;
                }
            }
        }

        if weak_connected {
            candidate.attributes |= Candidate::SPELLING_CORRECTION;
        }

        if self.check_mode == BoundaryCheckMode::OnlyEdge && nodes.len() > 1 {
            candidate.attributes |= Candidate::REALTIME_CONVERSION;
            let mut ok = true;
            for &id in nodes {
                let node = self.lattice.node(id);
                if !candidate.push_back_inner_segment_boundary(
                    node.key.len(),
                    node.value.len(),
                    node.content_key.len(),
                    node.content_value.len(),
                ) {
                    ok = false;
                    break;
                }
            }
            if !ok {
                // Downstream degrades to whole-candidate display.
                warn!(key = %candidate.key, "inner segment length overflow");
                candidate.inner_segment_boundary.clear();
            }
        }

        candidate
    }

    fn boundary_check(
        &self,
        lnode: &Node,
        rnode: &Node,
        is_edge: bool,
    ) -> BoundaryCheckResult {
        // The lattice ends are segment boundaries by definition.
        let is_boundary =
            lnode.is_bos() || rnode.is_eos() || self.segmenter.is_boundary(lnode, rnode);

        let violated = match self.check_mode {
            BoundaryCheckMode::Strict => is_edge != is_boundary,
            BoundaryCheckMode::OnlyMid => !is_edge && is_boundary,
            BoundaryCheckMode::OnlyEdge => is_edge && !is_boundary,
        };
        if violated {
            return BoundaryCheckResult::Invalid;
        }
        if !is_edge && self.segmenter.is_weak_connected(lnode, rnode) {
            return BoundaryCheckResult::ValidWeakConnected;
        }
        BoundaryCheckResult::Valid
    }
}
