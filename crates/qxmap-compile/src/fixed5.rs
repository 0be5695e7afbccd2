//! Fixed-template routing for the 5-qubit IBM devices.
//!
//! Both QX2 and QX4 are stars around qubit 2 with a few extra edges, so
//! every non-adjacent pair can be served by relaying through that hub. A
//! [`MethodMatrix`] records, per ordered pair, which of six rewrite methods
//! realizes the CNOT; no graph search is involved.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};

use qxmap_ir::{Circuit, Gate, GateKind, PauliAxis, QubitId};

use crate::error::{RouteError, RouteResult};
use crate::graph::ConnectivityGraph;
use crate::router::{RoutedCircuit, Router};

/// Number of qubits on the devices this transform targets.
pub const FIXED5_QUBITS: usize = 5;

/// The relay line every non-adjacent pair passes through.
pub const ANCILLA: QubitId = QubitId(2);

/// How CNOT(c, t) is realized. The relay methods name the direction of the
/// native edges between control and ancilla `a`, then ancilla and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayMethod {
    /// `c -> t` is native.
    Direct,
    /// `t -> c` is native; conjugate with Hadamards.
    Flipped,
    /// `c -> a` and `a -> t`.
    ForwardForward,
    /// `c -> a` and `t -> a`.
    ForwardBackward,
    /// `a -> c` and `a -> t`.
    BackwardForward,
    /// `a -> c` and `t -> a`.
    BackwardBackward,
}

impl RelayMethod {
    /// Numeric method code, 1 to 6.
    pub fn code(self) -> u8 {
        match self {
            RelayMethod::Direct => 1,
            RelayMethod::Flipped => 2,
            RelayMethod::ForwardForward => 3,
            RelayMethod::ForwardBackward => 4,
            RelayMethod::BackwardForward => 5,
            RelayMethod::BackwardBackward => 6,
        }
    }

    /// Whether the CNOT needs the ancilla.
    pub fn is_relay(self) -> bool {
        !matches!(self, RelayMethod::Direct | RelayMethod::Flipped)
    }

    /// Gates added on top of the requested CNOT.
    pub fn cost(self, variant: Variant) -> u32 {
        match (self, variant) {
            (RelayMethod::Direct, _) => 0,
            (RelayMethod::Flipped, _) => 4,
            (RelayMethod::ForwardForward, Variant::Template) => 3,
            (_, Variant::Template) => 9,
            (RelayMethod::BackwardBackward, Variant::Swap) => 18,
            (_, Variant::Swap) => 14,
        }
    }
}

impl fmt::Display for RelayMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Style of relay rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Swap the moving qubit onto the ancilla, interact, swap back.
    Swap,
    /// Relay identity `CX(c,a) CX(a,t) CX(c,a) CX(a,t)` with adjacent
    /// Hadamards cancelled.
    #[default]
    Template,
}

impl std::str::FromStr for Variant {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "swap" => Ok(Variant::Swap),
            "template" => Ok(Variant::Template),
            other => Err(RouteError::InvalidConfiguration(format!(
                "unknown fixed-5 variant '{other}' (expected swap or template)"
            ))),
        }
    }
}

type Methods = [[Option<RelayMethod>; FIXED5_QUBITS]; FIXED5_QUBITS];

const D: Option<RelayMethod> = Some(RelayMethod::Direct);
const F: Option<RelayMethod> = Some(RelayMethod::Flipped);
const FF: Option<RelayMethod> = Some(RelayMethod::ForwardForward);
const FB: Option<RelayMethod> = Some(RelayMethod::ForwardBackward);
const BF: Option<RelayMethod> = Some(RelayMethod::BackwardForward);
const BB: Option<RelayMethod> = Some(RelayMethod::BackwardBackward);

/// Rewrite method for every ordered pair of a 5-qubit device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMatrix {
    name: String,
    methods: Methods,
}

impl MethodMatrix {
    /// IBM QX2: `0->1 0->2 1->2 3->2 3->4 4->2`.
    pub fn qx2() -> Self {
        Self {
            name: "qx2".into(),
            methods: [
                [None, D, D, FB, FB],
                [F, None, D, FB, FB],
                [F, F, None, F, F],
                [FB, FB, D, None, D],
                [FB, FB, D, F, None],
            ],
        }
    }

    /// IBM QX4: `1->0 2->0 2->1 3->2 3->4 2->4`.
    pub fn qx4() -> Self {
        Self {
            name: "qx4".into(),
            methods: [
                [None, F, F, BB, BF],
                [D, None, F, BB, BF],
                [D, D, None, F, D],
                [FF, FF, D, None, D],
                [BF, BF, F, F, None],
            ],
        }
    }

    /// Built-in matrix by device name.
    pub fn by_name(name: &str) -> RouteResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "qx2" => Ok(Self::qx2()),
            "qx4" => Ok(Self::qx4()),
            _ => Err(RouteError::UnknownArchitecture(name.to_string())),
        }
    }

    /// Classify every pair of a 5-qubit graph, relaying through
    /// [`ANCILLA`].
    pub fn from_graph(name: impl Into<String>, graph: &ConnectivityGraph) -> RouteResult<Self> {
        if graph.size() != FIXED5_QUBITS {
            return Err(RouteError::InvalidGraph(format!(
                "fixed-template routing needs {FIXED5_QUBITS} qubits, graph has {}",
                graph.size()
            )));
        }
        let a = ANCILLA;
        let mut methods: Methods = [[None; FIXED5_QUBITS]; FIXED5_QUBITS];
        for (ci, row) in methods.iter_mut().enumerate() {
            for (ti, slot) in row.iter_mut().enumerate() {
                if ci == ti {
                    continue;
                }
                let (c, t) = (QubitId::from(ci), QubitId::from(ti));
                let method = if graph.adjacent(c, t) {
                    RelayMethod::Direct
                } else if graph.adjacent(t, c) {
                    RelayMethod::Flipped
                } else {
                    let forward_in = graph.adjacent(c, a);
                    let backward_in = graph.adjacent(a, c);
                    let forward_out = graph.adjacent(a, t);
                    let backward_out = graph.adjacent(t, a);
                    match (forward_in, backward_in, forward_out, backward_out) {
                        (true, _, true, _) => RelayMethod::ForwardForward,
                        (true, _, _, true) => RelayMethod::ForwardBackward,
                        (_, true, true, _) => RelayMethod::BackwardForward,
                        (_, true, _, true) => RelayMethod::BackwardBackward,
                        _ => {
                            return Err(RouteError::Unreachable {
                                control: c,
                                target: t,
                            });
                        }
                    }
                };
                *slot = Some(method);
            }
        }
        Ok(Self {
            name: name.into(),
            methods,
        })
    }

    /// Device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Method for CNOT(`control`, `target`).
    pub fn method(&self, control: QubitId, target: QubitId) -> Option<RelayMethod> {
        self.methods
            .get(control.index())
            .and_then(|row| row.get(target.index()))
            .copied()
            .flatten()
    }

    fn native(&self, control: QubitId, target: QubitId) -> bool {
        self.method(control, target) == Some(RelayMethod::Direct)
    }

    fn method_or_err(&self, control: QubitId, target: QubitId) -> RouteResult<RelayMethod> {
        self.method(control, target)
            .ok_or(RouteError::Unreachable { control, target })
    }

    /// Emit CNOT(`c`, `t`) with the pair's method.
    fn emit_cnot(
        &self,
        c: QubitId,
        t: QubitId,
        variant: Variant,
        out: &mut Vec<Gate>,
    ) -> RouteResult<()> {
        let method = self.method_or_err(c, t)?;
        let a = ANCILLA;
        match (method, variant) {
            (RelayMethod::Direct, _) => out.push(Gate::cnot(c, t)),
            (RelayMethod::Flipped, _) => {
                out.extend([Gate::hadamard(c), Gate::hadamard(t), Gate::cnot(t, c)]);
                out.extend([Gate::hadamard(c), Gate::hadamard(t)]);
            }
            (RelayMethod::ForwardForward, Variant::Template) => out.extend([
                Gate::cnot(c, a),
                Gate::cnot(a, t),
                Gate::cnot(c, a),
                Gate::cnot(a, t),
            ]),
            (RelayMethod::ForwardBackward, Variant::Template) => out.extend([
                Gate::cnot(c, a),
                Gate::hadamard(a),
                Gate::hadamard(t),
                Gate::cnot(t, a),
                Gate::hadamard(a),
                Gate::cnot(c, a),
                Gate::hadamard(a),
                Gate::cnot(t, a),
                Gate::hadamard(a),
                Gate::hadamard(t),
            ]),
            (RelayMethod::BackwardForward, Variant::Template) => out.extend([
                Gate::hadamard(c),
                Gate::hadamard(a),
                Gate::cnot(a, c),
                Gate::hadamard(a),
                Gate::cnot(a, t),
                Gate::hadamard(a),
                Gate::cnot(a, c),
                Gate::hadamard(c),
                Gate::hadamard(a),
                Gate::cnot(a, t),
            ]),
            (RelayMethod::BackwardBackward, Variant::Template) => out.extend([
                Gate::hadamard(c),
                Gate::hadamard(a),
                Gate::hadamard(t),
                Gate::cnot(a, c),
                Gate::cnot(t, a),
                Gate::cnot(a, c),
                Gate::cnot(t, a),
                Gate::hadamard(c),
                Gate::hadamard(a),
                Gate::hadamard(t),
            ]),
            (relay, Variant::Swap) => {
                // Swap one endpoint onto the ancilla so the remaining pair
                // shares an edge, preferring the endpoint that leaves it
                // native.
                let moving = match relay {
                    RelayMethod::ForwardBackward => t,
                    _ => c,
                };
                self.emit_swap(moving, out);
                let (nc, nt) = if moving == c { (a, t) } else { (c, a) };
                self.emit_cnot(nc, nt, variant, out)?;
                self.emit_swap(moving, out);
            }
        }
        Ok(())
    }

    /// SWAP(`q`, ancilla) as three CNOTs over the native edge, the middle
    /// one reversed with Hadamards.
    fn emit_swap(&self, q: QubitId, out: &mut Vec<Gate>) {
        let (from, to) = if self.native(q, ANCILLA) {
            (q, ANCILLA)
        } else {
            (ANCILLA, q)
        };
        out.extend([
            Gate::cnot(from, to),
            Gate::hadamard(from),
            Gate::hadamard(to),
            Gate::cnot(from, to),
            Gate::hadamard(from),
            Gate::hadamard(to),
            Gate::cnot(from, to),
        ]);
    }

    /// Controlled-V as `H t, CS(x, y), H t` with the controlled-S
    /// decomposed into T gates and two CNOTs on the cheaper orientation.
    fn emit_controlled_v(
        &self,
        c: QubitId,
        t: QubitId,
        adjoint: bool,
        variant: Variant,
        out: &mut Vec<Gate>,
    ) -> RouteResult<()> {
        let forward = self.method_or_err(c, t)?.cost(variant);
        let backward = self.method_or_err(t, c)?.cost(variant);
        let (x, y) = if forward <= backward { (c, t) } else { (t, c) };

        let quarter = |q, adjoint| Gate::pauli(PauliAxis::Z, 4, adjoint, q);
        out.push(Gate::hadamard(t));
        out.push(quarter(x, adjoint));
        out.push(quarter(y, adjoint));
        self.emit_cnot(x, y, variant, out)?;
        out.push(quarter(y, !adjoint));
        self.emit_cnot(x, y, variant, out)?;
        out.push(Gate::hadamard(t));
        Ok(())
    }
}

/// Rewrite `circuit` for a 5-qubit device using fixed templates.
///
/// CNOTs and controlled-V gates on pairs without a native edge are
/// replaced according to `methods`; other gates are copied. Negative
/// controls are wrapped in NOT gates. A circuit wider than five lines is
/// returned unchanged with [`RoutedCircuit::skipped`] set.
#[instrument(skip_all, fields(device = methods.name(), circuit = circuit.name(), variant = ?variant))]
pub fn transform_fixed5(
    circuit: &Circuit,
    methods: &MethodMatrix,
    variant: Variant,
) -> RouteResult<RoutedCircuit> {
    if let Some(skipped) = RoutedCircuit::oversized(circuit, FIXED5_QUBITS) {
        return Ok(skipped);
    }
    let mut out = Circuit::with_lines(circuit.name(), FIXED5_QUBITS as u32);

    for gate in circuit {
        for q in gate.lines() {
            if q.index() >= FIXED5_QUBITS {
                return Err(RouteError::QubitOutOfRange {
                    qubit: q,
                    size: FIXED5_QUBITS,
                });
            }
        }
        let two_line = matches!(gate.kind, GateKind::Toffoli | GateKind::V { .. });
        if !two_line || gate.controls.is_empty() {
            out.apply(gate.clone())?;
            continue;
        }
        let Some(control) = gate.control() else {
            return Err(RouteError::UnsupportedGate {
                gate: gate.to_string(),
                reason: format!("{} controls, at most one is supported", gate.controls.len()),
            });
        };
        let (c, t) = (control.line, gate.target());

        let mut gates = Vec::new();
        if !control.polarity {
            gates.push(Gate::not(c));
        }
        match gate.kind {
            GateKind::V { adjoint } => {
                methods.emit_controlled_v(c, t, adjoint, variant, &mut gates)?;
            }
            _ if methods.native(c, t) => gates.push(Gate::cnot(c, t)),
            _ => methods.emit_cnot(c, t, variant, &mut gates)?,
        }
        if !control.polarity {
            gates.push(Gate::not(c));
        }
        out.extend(gates)?;
    }

    let routed = RoutedCircuit::new(out);
    debug!("{} gates, depth {}", routed.gate_count, routed.depth);
    Ok(routed)
}

/// [`Router`] over a fixed method matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRouter {
    /// Pair classification.
    pub methods: MethodMatrix,
    /// Rewrite style.
    pub variant: Variant,
}

impl FixedRouter {
    /// Create a router for `methods` using `variant`.
    pub fn new(methods: MethodMatrix, variant: Variant) -> Self {
        Self { methods, variant }
    }
}

impl Router for FixedRouter {
    fn num_qubits(&self) -> usize {
        FIXED5_QUBITS
    }

    fn pair_cost(&self, control: QubitId, target: QubitId) -> Option<u32> {
        self.methods
            .method(control, target)
            .map(|m| m.cost(self.variant))
    }

    fn route(&self, circuit: &Circuit) -> RouteResult<RoutedCircuit> {
        transform_fixed5(circuit, &self.methods, self.variant)
    }
}
