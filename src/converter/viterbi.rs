use tracing::{debug, debug_span, warn};

use super::connector::{saturating_cost_add, Connector, INVALID_COST};
use super::lattice::Lattice;
use super::node::NodeId;

/// Forward Viterbi pass: populate every node's `cost` with the best-path
/// cost from BOS and link `prev` to the best predecessor.
///
/// This establishes the precondition of the N-best enumerator, which uses
/// `cost` as the exact heuristic of its backward A* search. Returns false
/// when EOS is unreachable (disconnected lattice); node costs for the
/// reachable prefix remain valid.
pub fn viterbi(lattice: &mut Lattice, connector: &Connector) -> bool {
    let _span = debug_span!("viterbi", key_len = lattice.key_len()).entered();

    for pos in 0..=lattice.key_len() {
        for i in 0..lattice.begin_nodes(pos).len() {
            let rnode_id = lattice.begin_nodes(pos)[i];
            if lattice.node(rnode_id).is_bos() {
                continue;
            }

            let mut best: Option<(i32, NodeId)> = None;
            for &lnode_id in lattice.end_nodes(pos) {
                let lnode = lattice.node(lnode_id);
                if lnode.cost >= INVALID_COST {
                    continue;
                }
                let transition =
                    connector.transition_cost(lnode.rid, lattice.node(rnode_id).lid);
                if transition >= INVALID_COST {
                    continue;
                }
                let cost = saturating_cost_add(lnode.cost, transition);
                if best.map_or(true, |(c, _)| cost < c) {
                    best = Some((cost, lnode_id));
                }
            }

            let rnode = lattice.node_mut(rnode_id);
            match best {
                Some((cost, prev)) => {
                    rnode.cost = saturating_cost_add(cost, rnode.wcost);
                    rnode.prev = Some(prev);
                }
                None => {
                    rnode.cost = INVALID_COST;
                    rnode.prev = None;
                }
            }
        }
    }

    let eos_cost = lattice.node(lattice.eos()).cost;
    if eos_cost >= INVALID_COST {
        warn!("EOS unreachable, lattice is disconnected");
        return false;
    }
    debug!(eos_cost, "viterbi finished");
    true
}
