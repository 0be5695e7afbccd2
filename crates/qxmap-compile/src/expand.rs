//! Circuit expansion against a routing table.

use tracing::{debug, instrument};

use qxmap_ir::{Circuit, Gate, QubitId};

use crate::error::{RouteError, RouteResult};
use crate::path::RoutingPath;
use crate::primitive::Move;
use crate::router::{RoutedCircuit, Router};
use crate::table::RoutingTable;

/// Rewrite every non-native CNOT of `circuit` using `table`.
///
/// Gates other than one-control Toffolis are copied unchanged, as are
/// CNOTs on native pairs. A routed CNOT with a negative control is wrapped
/// in NOT gates on the control. Toffolis with several controls are
/// rejected.
///
/// The result has as many lines as the device, since relays may pass
/// through qubits the circuit leaves idle. A circuit with more lines than
/// the device is returned unchanged with [`RoutedCircuit::skipped`] set.
#[instrument(skip_all, fields(circuit = circuit.name(), gates = circuit.gate_count()))]
pub fn expand(circuit: &Circuit, table: &RoutingTable) -> RouteResult<RoutedCircuit> {
    let size = table.size();
    if let Some(skipped) = RoutedCircuit::oversized(circuit, size) {
        return Ok(skipped);
    }
    let graph = table.graph();
    let num_lines = u32::try_from(size).unwrap_or(u32::MAX);
    let mut out = Circuit::with_lines(circuit.name(), num_lines);
    let mut routed = 0usize;

    for gate in circuit {
        if !gate.is_toffoli() || gate.controls.is_empty() {
            out.apply(gate.clone())?;
            continue;
        }
        let Some(control) = gate.control() else {
            return Err(RouteError::UnsupportedGate {
                gate: gate.to_string(),
                reason: format!("{} controls, at most one is supported", gate.controls.len()),
            });
        };
        let target = gate.target();
        for q in [control.line, target] {
            if q.index() >= size {
                return Err(RouteError::QubitOutOfRange { qubit: q, size });
            }
        }

        if graph.adjacent(control.line, target) {
            out.apply(gate.clone())?;
            continue;
        }

        let entry = table
            .entry(control.line, target)
            .ok_or(RouteError::Unreachable {
                control: control.line,
                target,
            })?;
        let mut gates = Vec::new();
        if !control.polarity {
            gates.push(Gate::not(control.line));
        }
        emit_path(&entry.path, &mut gates);
        if !control.polarity {
            gates.push(Gate::not(control.line));
        }
        out.extend(gates)?;
        routed += 1;
    }

    debug!("Routed {routed} CNOTs, {} gates out", out.gate_count());
    Ok(RoutedCircuit::new(out))
}

/// Append the Hadamard/CNOT pattern of every step of `path` to `out`.
///
/// A run of consecutive `cnot3` steps nests: the first emits the four-CNOT
/// window `CX(a,b) CX(b,c) CX(a,b) CX(b,c)`, each later one replaces the
/// current window `W` by `CX(a,b) W CX(a,b) W`.
pub fn emit_path(path: &RoutingPath, out: &mut Vec<Gate>) {
    let mut window: Option<usize> = None;
    for step in path {
        match (*step, window) {
            (Move::Cnot3(a, b, _), Some(start)) => {
                let inner = out.split_off(start);
                out.push(Gate::cnot(a, b));
                out.extend_from_slice(&inner);
                out.push(Gate::cnot(a, b));
                out.extend(inner);
            }
            (Move::Cnot3(a, b, c), None) => {
                window = Some(out.len());
                out.extend([
                    Gate::cnot(a, b),
                    Gate::cnot(b, c),
                    Gate::cnot(a, b),
                    Gate::cnot(b, c),
                ]);
            }
            (other, _) => {
                window = None;
                emit_step(other, out);
            }
        }
    }
}

fn hh(out: &mut Vec<Gate>, a: QubitId, b: QubitId) {
    out.push(Gate::hadamard(a));
    out.push(Gate::hadamard(b));
}

/// Pattern of one non-`cnot3` primitive.
fn emit_step(step: Move, out: &mut Vec<Gate>) {
    match step {
        Move::Nop(a, b) => out.push(Gate::cnot(a, b)),
        Move::Flip(a, b) => {
            hh(out, a, b);
            out.push(Gate::cnot(b, a));
            hh(out, a, b);
        }
        // Hadamards first, then the bare CNOT.
        Move::Cab(a, b) | Move::TabI(a, b) => {
            hh(out, a, b);
            out.push(Gate::cnot(a, b));
            hh(out, a, b);
            out.push(Gate::cnot(a, b));
        }
        Move::CbaI(a, b) | Move::Tba(a, b) => {
            hh(out, a, b);
            out.push(Gate::cnot(b, a));
            hh(out, a, b);
            out.push(Gate::cnot(b, a));
        }
        // Bare CNOT first, then the Hadamard-conjugated one.
        Move::CabI(a, b) | Move::Tab(a, b) => {
            out.push(Gate::cnot(a, b));
            hh(out, a, b);
            out.push(Gate::cnot(a, b));
            hh(out, a, b);
        }
        Move::Cba(a, b) | Move::TbaI(a, b) => {
            out.push(Gate::cnot(b, a));
            hh(out, a, b);
            out.push(Gate::cnot(b, a));
            hh(out, a, b);
        }
        Move::Cnot3(a, b, c) => {
            out.extend([
                Gate::cnot(a, b),
                Gate::cnot(b, c),
                Gate::cnot(a, b),
                Gate::cnot(b, c),
            ]);
        }
    }
}

impl Router for RoutingTable {
    fn num_qubits(&self) -> usize {
        self.size()
    }

    fn pair_cost(&self, control: QubitId, target: QubitId) -> Option<u32> {
        self.cost(control, target)
    }

    fn route(&self, circuit: &Circuit) -> RouteResult<RoutedCircuit> {
        expand(circuit, self)
    }
}
