//! Placement search: choosing which physical qubit hosts each circuit line.
//!
//! Small devices are searched exhaustively. Every injective layout is
//! scored by its estimated routing overhead; those within a configurable
//! slack of the best estimate are routed and cleaned up for real, and the
//! one with the fewest gates wins. Larger devices use a greedy heuristic
//! that grows the layout one line at a time.

use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use qxmap_ir::{Circuit, QubitId};

use crate::cleanup::remove_duplicates;
use crate::config::EngineConfig;
use crate::error::RouteResult;
use crate::layout::{Histogram, Layout};
use crate::router::{RoutedCircuit, Router};

/// How a layout was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Every injective layout was scored.
    Exhaustive,
    /// Layout grown greedily from the heaviest interaction.
    Greedy,
}

/// The chosen layout and the routed circuit it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    /// Logical-to-physical map.
    pub layout: Layout,
    /// Estimated overhead from the cost table.
    pub estimate: u64,
    /// Routed and cleaned-up circuit.
    pub routed: RoutedCircuit,
    /// Number of candidates routed.
    pub candidates: usize,
    /// Search strategy used.
    pub strategy: Strategy,
}

/// Result of a placement search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum PlacementOutcome {
    /// A layout was found.
    Placed(Placement),
    /// The search did not run; the circuit is returned unchanged.
    Skipped {
        /// The input circuit.
        circuit: Circuit,
        /// Why the search was skipped.
        reason: String,
    },
}

impl PlacementOutcome {
    /// The output circuit: routed when placed, the input when skipped.
    pub fn circuit(&self) -> &Circuit {
        match self {
            PlacementOutcome::Placed(p) => &p.routed.circuit,
            PlacementOutcome::Skipped { circuit, .. } => circuit,
        }
    }

    /// The placement, if one was found.
    pub fn placement(&self) -> Option<&Placement> {
        match self {
            PlacementOutcome::Placed(p) => Some(p),
            PlacementOutcome::Skipped { .. } => None,
        }
    }
}

/// Find the layout of `circuit` that routes to the fewest gates on
/// `router`'s device.
///
/// A circuit with more lines than the device is not searched: the outcome
/// is [`PlacementOutcome::Skipped`] carrying the input.
#[instrument(skip_all, fields(circuit = circuit.name(), lines = circuit.num_lines()))]
pub fn search_placement<R: Router + ?Sized>(
    circuit: &Circuit,
    router: &R,
    config: &EngineConfig,
) -> RouteResult<PlacementOutcome> {
    let logical = circuit.num_lines() as usize;
    let physical = router.num_qubits();
    if logical > physical {
        let reason = format!(
            "circuit has {logical} lines but the device has only {physical} qubits; placement skipped"
        );
        warn!("{reason}");
        return Ok(PlacementOutcome::Skipped {
            circuit: circuit.clone(),
            reason,
        });
    }

    let histogram = Histogram::from_circuit(circuit);
    let (strategy, candidates) = if physical <= config.exhaustive_limit {
        (
            Strategy::Exhaustive,
            exhaustive_candidates(&histogram, router, logical, config.placement_slack),
        )
    } else {
        let layout = greedy_layout(&histogram, router, logical);
        let estimate = layout.estimate(&histogram, router);
        (Strategy::Greedy, vec![(layout, estimate)])
    };
    debug!("{} candidates to route ({strategy:?})", candidates.len());

    let count = candidates.len();
    let mut best: Option<Placement> = None;
    for (layout, estimate) in candidates {
        let mapped = layout.apply(circuit, physical)?;
        let routed = router.route(&mapped)?;
        let cleaned = RoutedCircuit::new(remove_duplicates(&routed.circuit)?);
        let better = best.as_ref().is_none_or(|b| {
            (cleaned.gate_count, estimate) < (b.routed.gate_count, b.estimate)
        });
        if better {
            best = Some(Placement {
                layout,
                estimate,
                routed: cleaned,
                candidates: count,
                strategy,
            });
        }
    }

    match best {
        Some(placement) => {
            info!(
                "Placed {} with {} gates (estimate {})",
                placement.layout, placement.routed.gate_count, placement.estimate
            );
            Ok(PlacementOutcome::Placed(placement))
        }
        None => Ok(PlacementOutcome::Skipped {
            circuit: circuit.clone(),
            reason: "no candidate layout".into(),
        }),
    }
}

/// Every injective layout of `logical` lines on the router's device, in
/// enumeration order (physical subsets, then their orderings), keeping
/// those whose estimate is within `slack` of the best.
pub fn exhaustive_candidates<R: Router + ?Sized>(
    histogram: &Histogram,
    router: &R,
    logical: usize,
    slack: u64,
) -> Vec<(Layout, u64)> {
    let mut scored = Vec::new();
    for subset in (0..router.num_qubits()).map(QubitId::from).combinations(logical) {
        for order in subset.into_iter().permutations(logical) {
            let layout = Layout::from_unchecked(order);
            let estimate = layout.estimate(histogram, router);
            scored.push((layout, estimate));
        }
    }
    let Some(best) = scored.iter().map(|(_, e)| *e).min() else {
        return scored;
    };
    let bound = best.saturating_add(slack);
    scored.retain(|(_, e)| *e <= bound);
    scored
}

/// Grow a layout greedily.
///
/// The heaviest-interacting line pair goes on the cheapest physical pair.
/// Then, repeatedly, the unplaced line with the most CNOTs to placed lines
/// goes on the free physical qubit adding the least estimated cost.
pub fn greedy_layout<R: Router + ?Sized>(
    histogram: &Histogram,
    router: &R,
    logical: usize,
) -> Layout {
    let physical = router.num_qubits();
    let cost = |c: QubitId, t: QubitId| u64::from(router.pair_cost(c, t).unwrap_or(u32::MAX));
    let lines: Vec<QubitId> = (0..logical).map(QubitId::from).collect();
    let qubits: Vec<QubitId> = (0..physical).map(QubitId::from).collect();

    let mut placed: Vec<Option<QubitId>> = vec![None; logical];
    let mut used = vec![false; physical];

    let heaviest = lines
        .iter()
        .tuple_combinations()
        .map(|(&a, &b)| (histogram.weight(a, b), a, b))
        .filter(|(w, _, _)| *w > 0)
        .fold(None, |best: Option<(u32, QubitId, QubitId)>, cand| match best {
            Some(b) if b.0 >= cand.0 => Some(b),
            _ => Some(cand),
        });

    if let Some((_, a, b)) = heaviest {
        let pair_cost = |pa: QubitId, pb: QubitId| {
            u64::from(histogram.count(a, b)) * cost(pa, pb)
                + u64::from(histogram.count(b, a)) * cost(pb, pa)
        };
        let chosen = qubits
            .iter()
            .cartesian_product(qubits.iter())
            .filter(|(pa, pb)| pa != pb)
            .min_by_key(|(pa, pb)| pair_cost(**pa, **pb));
        if let Some((&pa, &pb)) = chosen {
            placed[a.index()] = Some(pa);
            placed[b.index()] = Some(pb);
            used[pa.index()] = true;
            used[pb.index()] = true;
        }
    }

    loop {
        let Some(next) = heaviest_unplaced(histogram, &lines, &placed) else {
            break;
        };
        let increment = |x: QubitId| -> u64 {
            lines
                .iter()
                .filter_map(|&k| placed[k.index()].map(|pk| (k, pk)))
                .map(|(k, pk)| {
                    u64::from(histogram.count(next, k)).saturating_mul(cost(x, pk))
                        + u64::from(histogram.count(k, next)).saturating_mul(cost(pk, x))
                })
                .fold(0u64, u64::saturating_add)
        };
        let Some(&spot) = qubits
            .iter()
            .filter(|p| !used[p.index()])
            .min_by_key(|&&p| increment(p))
        else {
            break;
        };
        placed[next.index()] = Some(spot);
        used[spot.index()] = true;
    }

    Layout::from_unchecked(placed.into_iter().flatten().collect())
}

/// The unplaced line with the most CNOTs to placed lines, lowest index on
/// ties.
fn heaviest_unplaced(
    histogram: &Histogram,
    lines: &[QubitId],
    placed: &[Option<QubitId>],
) -> Option<QubitId> {
    let mut best: Option<(u32, QubitId)> = None;
    for &l in lines.iter().filter(|l| placed[l.index()].is_none()) {
        let weight: u32 = lines
            .iter()
            .filter(|k| placed[k.index()].is_some())
            .map(|&k| histogram.weight(l, k))
            .sum();
        if best.is_none_or(|(w, _)| weight > w) {
            best = Some((weight, l));
        }
    }
    best.map(|(_, l)| l)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed5::{FixedRouter, MethodMatrix, Variant};
    use crate::graph::{Architecture, ConnectivityGraph};
    use crate::table::RoutingTable;
    use qxmap_ir::equivalent;

    fn q(i: u32) -> QubitId {
        QubitId(i)
    }

    fn chain() -> Circuit {
        let mut c = Circuit::with_lines("chain", 3);
        c.cx(q(0), q(1)).unwrap().cx(q(1), q(2)).unwrap();
        c
    }

    #[test]
    fn test_candidates_cover_all_injective_maps() {
        let table = RoutingTable::build(&Architecture::QX4.graph()).unwrap();
        let hist = Histogram::from_circuit(&chain());
        let all = exhaustive_candidates(&hist, &table, 3, u64::MAX);
        assert_eq!(all.len(), 60);
        let best = all.iter().map(|(_, e)| *e).min().unwrap();
        assert_eq!(best, 0);
    }

    #[test]
    fn test_chain_on_qx4_reaches_native_layout() {
        let table = RoutingTable::build(&Architecture::QX4.graph()).unwrap();
        let outcome = search_placement(&chain(), &table, &EngineConfig::default()).unwrap();
        let placement = outcome.placement().unwrap();
        assert_eq!(placement.strategy, Strategy::Exhaustive);
        assert_eq!(placement.routed.gate_count, 2);
        assert_eq!(placement.estimate, 0);
    }

    #[test]
    fn test_placed_circuit_matches_layout() {
        let table = RoutingTable::build(&Architecture::QX2.graph()).unwrap();
        let mut circuit = Circuit::with_lines("c", 4);
        circuit
            .cx(q(0), q(3))
            .unwrap()
            .cx(q(3), q(1))
            .unwrap()
            .h(q(2))
            .unwrap()
            .cx(q(2), q(0))
            .unwrap();
        let outcome = search_placement(&circuit, &table, &EngineConfig::default()).unwrap();
        let placement = outcome.placement().unwrap();
        let mapped = placement.layout.apply(&circuit, 5).unwrap();
        assert!(equivalent(&placement.routed.circuit, &mapped).unwrap());
    }

    #[test]
    fn test_too_many_lines_is_skipped() {
        let table = RoutingTable::build(&Architecture::QX2.graph()).unwrap();
        let circuit = Circuit::with_lines("wide", 6);
        let outcome = search_placement(&circuit, &table, &EngineConfig::default()).unwrap();
        match outcome {
            PlacementOutcome::Skipped { circuit: c, reason } => {
                assert_eq!(c, circuit);
                assert!(reason.contains("6 lines"));
            }
            PlacementOutcome::Placed(_) => panic!("expected skip"),
        }
    }

    #[test]
    fn test_fixed_router_placement() {
        let router = FixedRouter::new(MethodMatrix::qx4(), Variant::Template);
        let outcome = search_placement(&chain(), &router, &EngineConfig::default()).unwrap();
        assert_eq!(outcome.placement().unwrap().routed.gate_count, 2);
    }

    #[test]
    fn test_greedy_on_large_device() {
        let graph = Architecture::QX5.graph();
        let table = RoutingTable::build_with_limit(&graph, Some(8)).unwrap();
        let mut circuit = Circuit::with_lines("ring", 4);
        circuit
            .cx(q(0), q(1))
            .unwrap()
            .cx(q(1), q(2))
            .unwrap()
            .cx(q(2), q(3))
            .unwrap()
            .cx(q(0), q(1))
            .unwrap();
        let outcome = search_placement(&circuit, &table, &EngineConfig::default()).unwrap();
        let placement = outcome.placement().unwrap();
        assert_eq!(placement.strategy, Strategy::Greedy);
        assert_eq!(placement.layout.len(), 4);
        assert!(Layout::new(placement.layout.iter().map(|(_, p)| p).collect(), 16).is_ok());
        // The heaviest pair lands on a native edge.
        let p0 = placement.layout.physical(q(0)).unwrap();
        let p1 = placement.layout.physical(q(1)).unwrap();
        assert!(graph.adjacent(p0, p1));
    }

    #[test]
    fn test_greedy_without_interactions_is_trivial() {
        let graph = ConnectivityGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let table = RoutingTable::build(&graph).unwrap();
        let hist = Histogram::from_circuit(&Circuit::with_lines("idle", 2));
        assert_eq!(greedy_layout(&hist, &table, 2), Layout::trivial(2));
    }
}
