//! End-to-end routing scenarios on small graphs and the built-in devices.

use itertools::Itertools;
use qxmap_compile::placement::exhaustive_candidates;
use qxmap_compile::{
    Architecture, ConnectivityGraph, EngineConfig, Histogram, Layout, MethodMatrix,
    PlacementOutcome, RelayMethod, RoutingEngine, RoutingEntry, RoutingTable, Variant, expand,
    remove_duplicates, search_placement, transform_fixed5,
};
use qxmap_ir::{Circuit, Gate, QubitId, equivalent};

fn q(i: u32) -> QubitId {
    QubitId(i)
}

fn chain_circuit() -> Circuit {
    let mut circuit = Circuit::with_lines("chain", 3);
    circuit.cx(q(0), q(1)).unwrap().cx(q(1), q(2)).unwrap();
    circuit
}

fn triangle_circuit() -> Circuit {
    let mut circuit = Circuit::with_lines("triangle", 3);
    circuit
        .cx(q(0), q(1))
        .unwrap()
        .cx(q(1), q(2))
        .unwrap()
        .cx(q(2), q(0))
        .unwrap();
    circuit
}

fn star_circuit() -> Circuit {
    let mut circuit = Circuit::with_lines("star", 4);
    circuit
        .cx(q(0), q(1))
        .unwrap()
        .cx(q(0), q(2))
        .unwrap()
        .cx(q(3), q(0))
        .unwrap()
        .cx(q(1), q(2))
        .unwrap()
        .cx(q(0), q(1))
        .unwrap();
    circuit
}

/// Gate count after routing `circuit` under `layout` and removing
/// duplicates.
fn routed_gates(circuit: &Circuit, layout: &Layout, table: &RoutingTable) -> usize {
    let mapped = layout.apply(circuit, table.size()).unwrap();
    let routed = expand(&mapped, table).unwrap();
    remove_duplicates(&routed.circuit).unwrap().gate_count()
}

/// Fewest gates over every injective map of `circuit` onto the device.
fn exhaustive_minimum(circuit: &Circuit, table: &RoutingTable) -> (usize, usize) {
    let lines = circuit.num_lines() as usize;
    let mut minimum = usize::MAX;
    let mut maps = 0;
    for image in (0..table.size()).map(QubitId::from).permutations(lines) {
        let layout = Layout::new(image, table.size()).unwrap();
        minimum = minimum.min(routed_gates(circuit, &layout, table));
        maps += 1;
    }
    (minimum, maps)
}

#[test]
fn test_reversed_edge_is_flipped() {
    let graph = ConnectivityGraph::parse("2\n0 1\n0 0\n").unwrap();
    let table = RoutingTable::build(&graph).unwrap();
    assert_eq!(table.cost(q(1), q(0)), Some(4));

    let mut circuit = Circuit::with_lines("rev", 2);
    circuit.cx(q(1), q(0)).unwrap();
    let routed = expand(&circuit, &table).unwrap();
    assert_eq!(
        routed.circuit.gates(),
        &[
            Gate::hadamard(q(1)),
            Gate::hadamard(q(0)),
            Gate::cnot(q(0), q(1)),
            Gate::hadamard(q(1)),
            Gate::hadamard(q(0)),
        ]
    );
    assert!(equivalent(&routed.circuit, &circuit).unwrap());
}

#[test]
fn test_qx2_forward_backward_variants() {
    let methods = MethodMatrix::qx2();
    assert_eq!(methods.method(q(0), q(3)).map(RelayMethod::code), Some(4));

    let mut circuit = Circuit::with_lines("relay", 5);
    circuit.cx(q(0), q(3)).unwrap();
    let swap = transform_fixed5(&circuit, &methods, Variant::Swap).unwrap();
    let template = transform_fixed5(&circuit, &methods, Variant::Template).unwrap();
    assert_ne!(swap.gate_count, template.gate_count);
    assert!(equivalent(&swap.circuit, &circuit).unwrap());
    assert!(equivalent(&template.circuit, &circuit).unwrap());
}

#[test]
fn test_chain_placement_matches_exhaustive_minimum() {
    let table = RoutingTable::build(&Architecture::QX4.graph()).unwrap();
    let circuit = chain_circuit();

    let (minimum, maps) = exhaustive_minimum(&circuit, &table);
    assert_eq!(maps, 60);

    let outcome = search_placement(&circuit, &table, &EngineConfig::default()).unwrap();
    let placement = outcome.placement().unwrap();
    assert_eq!(placement.routed.gate_count, minimum);
    assert_eq!(minimum, 2);
}

#[test]
fn test_triangle_placement_needs_routing() {
    // qx4 has no directed cycle, so one CNOT of the triangle is always routed.
    let table = RoutingTable::build(&Architecture::QX4.graph()).unwrap();
    let circuit = triangle_circuit();

    let (minimum, maps) = exhaustive_minimum(&circuit, &table);
    assert_eq!(maps, 60);
    assert!(minimum > circuit.gate_count(), "minimum {minimum}");

    let outcome = search_placement(&circuit, &table, &EngineConfig::default()).unwrap();
    let placement = outcome.placement().unwrap();
    assert_eq!(placement.routed.gate_count, minimum);
    assert!(placement.candidates > 1);

    let mapped = placement.layout.apply(&circuit, 5).unwrap();
    assert!(equivalent(&placement.routed.circuit, &mapped).unwrap());
}

#[test]
fn test_lowest_estimate_within_slack_of_best_candidate() {
    let slack = EngineConfig::default().placement_slack;
    let circuit = star_circuit();
    let histogram = Histogram::from_circuit(&circuit);

    for arch in [Architecture::QX2, Architecture::QX4] {
        let table = RoutingTable::build(&arch.graph()).unwrap();
        let candidates = exhaustive_candidates(&histogram, &table, 4, slack);
        assert!(!candidates.is_empty());

        let gates: Vec<usize> = candidates
            .iter()
            .map(|(layout, _)| routed_gates(&circuit, layout, &table))
            .collect();
        let best = gates.iter().copied().min().unwrap();
        let (lowest, _) = candidates
            .iter()
            .enumerate()
            .min_by_key(|(_, (_, estimate))| *estimate)
            .unwrap();
        assert!(
            gates[lowest] as u64 <= best as u64 + slack,
            "{}: lowest estimate routes to {} gates, best {best}",
            arch.name,
            gates[lowest]
        );
    }
}

#[test]
fn test_tables_complete_for_builtin_devices() {
    for arch in Architecture::ALL {
        let graph = arch.graph();
        let table = RoutingTable::build(&graph).unwrap();
        for v in (0..arch.num_qubits).map(QubitId::from) {
            for w in (0..arch.num_qubits).map(QubitId::from) {
                let entry = table.entry(v, w);
                if v == w {
                    assert!(entry.is_none());
                    continue;
                }
                let entry = entry.unwrap();
                assert!(!entry.path.is_empty(), "{} {v} {w}", arch.name);
                assert_eq!(entry.cost == 0, graph.adjacent(v, w), "{} {v} {w}", arch.name);
            }
        }
    }
}

#[test]
fn test_native_edges_emit_one_cnot() {
    let graph = Architecture::QX4.graph();
    let table = RoutingTable::build(&graph).unwrap();
    for (c, t) in graph.edges() {
        let mut circuit = Circuit::with_lines("native", 5);
        circuit.cx(c, t).unwrap();
        let routed = expand(&circuit, &table).unwrap();
        assert_eq!(routed.circuit.gates(), &[Gate::cnot(c, t)]);
    }
}

#[test]
fn test_qx4_program_is_preserved() {
    let mut engine = RoutingEngine::default();
    engine.load_architecture("qx4").unwrap();
    engine.build().unwrap();

    let mut circuit = Circuit::with_lines("mixed", 5);
    circuit
        .h(q(0))
        .unwrap()
        .cx(q(0), q(4))
        .unwrap()
        .t(q(4))
        .unwrap()
        .cx(q(3), q(1))
        .unwrap()
        .not(q(2))
        .unwrap()
        .cx(q(1), q(3))
        .unwrap();
    let routed = engine.expand(&circuit).unwrap();
    assert!(equivalent(&routed.circuit, &circuit).unwrap());

    let cleaned = remove_duplicates(&routed.circuit).unwrap();
    assert!(cleaned.gate_count() <= routed.gate_count);
    assert!(equivalent(&cleaned, &circuit).unwrap());
}

#[test]
fn test_larger_slack_never_worsens_placement() {
    let table = RoutingTable::build(&Architecture::QX2.graph()).unwrap();
    let circuit = star_circuit();

    let mut previous = usize::MAX;
    for slack in [0, 5, 10, 40, 200] {
        let config = EngineConfig {
            placement_slack: slack,
            ..EngineConfig::default()
        };
        let outcome = search_placement(&circuit, &table, &config).unwrap();
        let placement = outcome.placement().unwrap();
        assert!(placement.routed.gate_count <= previous, "slack {slack}");
        previous = placement.routed.gate_count;
    }
}

#[test]
fn test_placed_circuit_realizes_input_under_layout() {
    let table = RoutingTable::build(&Architecture::QX2.graph()).unwrap();
    let circuit = chain_circuit();
    let outcome = search_placement(&circuit, &table, &EngineConfig::default()).unwrap();
    let placement = outcome.placement().unwrap();

    let mapped = placement.layout.apply(&circuit, 5).unwrap();
    assert!(equivalent(&placement.routed.circuit, &mapped).unwrap());
}

#[test]
fn test_fixed_transform_and_table_agree_on_semantics() {
    let table = RoutingTable::build(&Architecture::QX2.graph()).unwrap();
    let methods = MethodMatrix::qx2();
    for (c, t) in (0..5).map(QubitId).tuple_combinations() {
        for (c, t) in [(c, t), (t, c)] {
            let mut circuit = Circuit::with_lines("pair", 5);
            circuit.cx(c, t).unwrap();
            let routed = expand(&circuit, &table).unwrap();
            let fixed = transform_fixed5(&circuit, &methods, Variant::Template).unwrap();
            assert!(equivalent(&routed.circuit, &fixed.circuit).unwrap(), "{c} {t}");
        }
    }
}

#[test]
fn test_entries_and_placements_serialize_to_json() {
    let table = RoutingTable::build(&Architecture::QX4.graph()).unwrap();
    let entry = table.entry(q(0), q(3)).unwrap();
    let json = serde_json::to_string(entry).unwrap();
    let back: RoutingEntry = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, entry);

    let outcome = search_placement(&chain_circuit(), &table, &EngineConfig::default()).unwrap();
    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["outcome"], "placed");
    assert_eq!(value["strategy"], "exhaustive");
    assert_eq!(value["routed"]["gate_count"], 2);
    assert!(value["routed"].get("skipped").is_none());

    let wide = Circuit::with_lines("wide", 6);
    let skipped = search_placement(&wide, &table, &EngineConfig::default()).unwrap();
    assert!(matches!(skipped, PlacementOutcome::Skipped { .. }));
    let value = serde_json::to_value(&skipped).unwrap();
    assert_eq!(value["outcome"], "skipped");
    assert!(value["reason"].as_str().unwrap().contains("6 lines"));
}
