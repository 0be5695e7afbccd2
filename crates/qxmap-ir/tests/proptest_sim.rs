//! Property-based tests for the circuit model and the simulator.

use proptest::prelude::*;
use qxmap_ir::{Circuit, Control, Gate, PauliAxis, QubitId, equivalent};

/// Generate a random gate on `num_lines` lines (at least 2).
fn arb_gate(num_lines: u32) -> impl Strategy<Value = Gate> {
    let pair = (0..num_lines, 0..num_lines)
        .prop_filter("Control and target must differ", |(c, t)| c != t);
    prop_oneof![
        (0..num_lines).prop_map(|t| Gate::not(QubitId(t))),
        (0..num_lines).prop_map(|t| Gate::hadamard(QubitId(t))),
        (0..num_lines, 1_u32..=4, any::<bool>())
            .prop_map(|(t, root, adj)| Gate::pauli(PauliAxis::Z, root, adj, QubitId(t))),
        pair.clone().prop_map(|(c, t)| Gate::cnot(QubitId(c), QubitId(t))),
        (pair.clone(), any::<bool>()).prop_map(|((c, t), polarity)| {
            let control = if polarity {
                Control::positive(QubitId(c))
            } else {
                Control::negative(QubitId(c))
            };
            Gate::toffoli([control], QubitId(t))
        }),
        (pair, any::<bool>()).prop_map(|((c, t), adj)| Gate::v(QubitId(c), QubitId(t), adj)),
    ]
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (2_u32..=4).prop_flat_map(|n| {
        prop::collection::vec(arb_gate(n), 0..=12).prop_map(move |gates| {
            let mut circuit = Circuit::with_lines("random", n);
            circuit.extend(gates).unwrap();
            circuit
        })
    })
}

proptest! {
    #[test]
    fn circuit_then_inverse_is_identity(circuit in arb_circuit()) {
        let mut both = circuit.clone();
        both.extend(circuit.iter().rev().map(Gate::inverse)).unwrap();
        let empty = circuit.empty_like();
        prop_assert!(equivalent(&both, &empty).unwrap());
    }

    #[test]
    fn depth_bounded_by_gate_count(circuit in arb_circuit()) {
        prop_assert!(circuit.depth() <= circuit.gate_count());
        prop_assert_eq!(circuit.depth() == 0, circuit.is_empty());
    }

    #[test]
    fn renaming_lines_twice_restores(circuit in arb_circuit()) {
        let n = circuit.num_lines();
        let reversed = circuit.map_lines(n, |q| QubitId(n - 1 - q.0)).unwrap();
        let back = reversed.map_lines(n, |q| QubitId(n - 1 - q.0)).unwrap();
        prop_assert_eq!(back, circuit);
    }

    #[test]
    fn json_preserves_circuit(circuit in arb_circuit()) {
        let json = serde_json::to_string(&circuit).unwrap();
        let back: Circuit = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, circuit);
    }
}
