//! Duplicate removal after routing.
//!
//! Routing templates placed back to back leave Hadamard pairs and repeated
//! CNOTs that annihilate. This pass removes them.

use tracing::debug;

use qxmap_ir::{Circuit, Gate, GateKind, IrResult};

/// Whether `next` undoes `prev` when the two are adjacent on every line.
fn cancels(prev: &Gate, next: &Gate) -> bool {
    match next.kind {
        GateKind::V { .. } => *prev == next.inverse(),
        GateKind::Toffoli | GateKind::Hadamard => prev == next,
        GateKind::Pauli { .. } => prev == next && next.is_self_inverse(),
    }
}

/// Remove pairs of adjacent gates that cancel, until none are left.
///
/// Two gates are adjacent when no gate between them touches any of their
/// lines. Self-inverse gates (NOT/CNOT/Toffoli with equal controls and
/// polarity, Hadamard, plain Paulis) cancel with an identical copy; V
/// cancels with V† on the same control and target.
///
/// Cancelled pairs expose their neighbours to each other, so the pass keeps
/// a per-line stack of surviving gates and reaches the fixed point in one
/// sweep.
pub fn remove_duplicates(circuit: &Circuit) -> IrResult<Circuit> {
    let mut kept: Vec<Option<Gate>> = Vec::with_capacity(circuit.gate_count());
    let mut wires: Vec<Vec<usize>> = vec![Vec::new(); circuit.num_lines() as usize];

    for gate in circuit {
        let lines: Vec<usize> = gate.lines().map(|q| q.index()).collect();
        let previous = lines
            .first()
            .and_then(|&l| wires.get(l).and_then(|w| w.last().copied()));

        let adjacent = previous.filter(|&p| {
            lines
                .iter()
                .all(|&l| wires.get(l).and_then(|w| w.last()) == Some(&p))
                && kept[p].as_ref().is_some_and(|prev| cancels(prev, gate))
        });

        if let Some(p) = adjacent {
            kept[p] = None;
            for &l in &lines {
                wires[l].pop();
            }
            continue;
        }

        let index = kept.len();
        kept.push(Some(gate.clone()));
        for &l in &lines {
            if let Some(wire) = wires.get_mut(l) {
                wire.push(index);
            }
        }
    }

    let mut out = circuit.empty_like();
    out.extend(kept.into_iter().flatten())?;
    debug!("Removed {} gates", circuit.gate_count() - out.gate_count());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qxmap_ir::{Control, QubitId, equivalent};

    fn q(i: u32) -> QubitId {
        QubitId(i)
    }

    #[test]
    fn test_removes_hadamard_pair() {
        let mut c = Circuit::with_lines("hh", 1);
        c.h(q(0)).unwrap().h(q(0)).unwrap();
        assert!(remove_duplicates(&c).unwrap().is_empty());
    }

    #[test]
    fn test_nested_cancellation_reaches_fixed_point() {
        // H 0, CX(0,1), CX(0,1), H 0 collapses completely.
        let mut c = Circuit::with_lines("nested", 2);
        c.h(q(0))
            .unwrap()
            .cx(q(0), q(1))
            .unwrap()
            .cx(q(0), q(1))
            .unwrap()
            .h(q(0))
            .unwrap();
        assert!(remove_duplicates(&c).unwrap().is_empty());
    }

    #[test]
    fn test_blocked_by_intervening_gate() {
        let mut c = Circuit::with_lines("blocked", 2);
        c.cx(q(0), q(1))
            .unwrap()
            .h(q(1))
            .unwrap()
            .cx(q(0), q(1))
            .unwrap();
        assert_eq!(remove_duplicates(&c).unwrap().gate_count(), 3);
    }

    #[test]
    fn test_unrelated_gates_do_not_block() {
        let mut c = Circuit::with_lines("parallel", 3);
        c.cx(q(0), q(1))
            .unwrap()
            .h(q(2))
            .unwrap()
            .cx(q(0), q(1))
            .unwrap();
        let out = remove_duplicates(&c).unwrap();
        assert_eq!(out.gates(), &[Gate::hadamard(q(2))]);
    }

    #[test]
    fn test_reversed_cnot_is_kept() {
        let mut c = Circuit::with_lines("rev", 2);
        c.cx(q(0), q(1)).unwrap().cx(q(1), q(0)).unwrap();
        assert_eq!(remove_duplicates(&c).unwrap().gate_count(), 2);
    }

    #[test]
    fn test_polarity_must_match() {
        let mut c = Circuit::with_lines("pol", 2);
        c.toffoli([Control::negative(q(0))], q(1))
            .unwrap()
            .cx(q(0), q(1))
            .unwrap();
        assert_eq!(remove_duplicates(&c).unwrap().gate_count(), 2);
    }

    #[test]
    fn test_v_pairs() {
        let mut c = Circuit::with_lines("vv", 2);
        c.v(q(0), q(1)).unwrap().vdg(q(0), q(1)).unwrap();
        assert!(remove_duplicates(&c).unwrap().is_empty());

        let mut c = Circuit::with_lines("vv", 2);
        c.v(q(0), q(1)).unwrap().v(q(0), q(1)).unwrap();
        assert_eq!(remove_duplicates(&c).unwrap().gate_count(), 2);
    }

    #[test]
    fn test_t_gates_kept() {
        let mut c = Circuit::with_lines("tt", 1);
        c.t(q(0)).unwrap().t(q(0)).unwrap();
        assert_eq!(remove_duplicates(&c).unwrap().gate_count(), 2);
    }

    #[test]
    fn test_preserves_semantics() {
        let mut c = Circuit::with_lines("mixed", 3);
        c.h(q(0))
            .unwrap()
            .h(q(1))
            .unwrap()
            .cx(q(1), q(2))
            .unwrap()
            .h(q(1))
            .unwrap()
            .h(q(1))
            .unwrap()
            .cx(q(1), q(2))
            .unwrap()
            .h(q(0))
            .unwrap();
        let out = remove_duplicates(&c).unwrap();
        assert!(out.gate_count() < c.gate_count());
        assert!(equivalent(&out, &c).unwrap());
    }
}
