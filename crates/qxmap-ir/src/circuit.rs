//! High-level circuit builder API.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, GateKind, PauliAxis};
use crate::qubit::{Control, QubitId};

/// A reversible/quantum circuit: a fixed number of lines and a gate list.
///
/// Gates are stored in application order. Every gate appended through
/// [`Circuit::apply`] is checked against the line count, so a circuit
/// never references a line it does not have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    #[serde(default = "default_name")]
    name: String,
    /// Number of lines (qubits).
    num_lines: u32,
    /// Gates in application order.
    #[serde(default)]
    gates: Vec<Gate>,
}

fn default_name() -> String {
    "circuit".into()
}

impl Circuit {
    /// Create a new empty circuit without lines.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            num_lines: 0,
            gates: vec![],
        }
    }

    /// Create a circuit with a given number of lines.
    pub fn with_lines(name: impl Into<String>, num_lines: u32) -> Self {
        Self {
            name: name.into(),
            num_lines,
            gates: vec![],
        }
    }

    /// Create an empty circuit with the same name and line count.
    pub fn empty_like(&self) -> Self {
        Self::with_lines(self.name.clone(), self.num_lines)
    }

    /// Add a single line to the circuit.
    pub fn add_line(&mut self) -> QubitId {
        let id = QubitId(self.num_lines);
        self.num_lines += 1;
        id
    }

    /// Append a gate after validating its lines.
    pub fn apply(&mut self, gate: Gate) -> IrResult<&mut Self> {
        self.validate(&gate)?;
        self.gates.push(gate);
        Ok(self)
    }

    /// Append every gate of `gates`, validating each.
    pub fn extend(&mut self, gates: impl IntoIterator<Item = Gate>) -> IrResult<&mut Self> {
        for gate in gates {
            self.apply(gate)?;
        }
        Ok(self)
    }

    fn validate(&self, gate: &Gate) -> IrResult<()> {
        if gate.targets.is_empty() {
            return Err(IrError::MissingTarget(gate.name().to_string()));
        }
        let mut seen: Vec<QubitId> = Vec::with_capacity(gate.controls.len() + gate.targets.len());
        for line in gate.lines() {
            if line.0 >= self.num_lines {
                return Err(IrError::QubitNotFound {
                    qubit: line,
                    num_lines: self.num_lines,
                    gate_name: Some(gate.name().to_string()),
                });
            }
            if seen.contains(&line) {
                return Err(IrError::DuplicateQubit {
                    qubit: line,
                    gate_name: Some(gate.name().to_string()),
                });
            }
            seen.push(line);
        }
        Ok(())
    }

    // =========================================================================
    // Gate builders
    // =========================================================================

    /// Apply NOT gate.
    pub fn not(&mut self, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Gate::not(target))
    }

    /// Apply CNOT gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Gate::cnot(control, target))
    }

    /// Apply a Toffoli gate with arbitrary controls.
    pub fn toffoli(
        &mut self,
        controls: impl IntoIterator<Item = Control>,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.apply(Gate::toffoli(controls, target))
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Gate::hadamard(target))
    }

    /// Apply a Pauli root rotation.
    pub fn pauli(
        &mut self,
        axis: PauliAxis,
        root: u32,
        adjoint: bool,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.apply(Gate::pauli(axis, root, adjoint, target))
    }

    /// Apply T gate.
    pub fn t(&mut self, target: QubitId) -> IrResult<&mut Self> {
        self.pauli(PauliAxis::Z, 4, false, target)
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, target: QubitId) -> IrResult<&mut Self> {
        self.pauli(PauliAxis::Z, 4, true, target)
    }

    /// Apply controlled-V gate.
    pub fn v(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Gate::v(control, target, false))
    }

    /// Apply controlled-V-dagger gate.
    pub fn vdg(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Gate::v(control, target, true))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the circuit.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Get the number of lines.
    pub fn num_lines(&self) -> u32 {
        self.num_lines
    }

    /// Get the gates in application order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Iterate over the gates.
    pub fn iter(&self) -> std::slice::Iter<'_, Gate> {
        self.gates.iter()
    }

    /// Consume the circuit and return its gates.
    pub fn into_gates(self) -> Vec<Gate> {
        self.gates
    }

    /// Number of gates.
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Check if the circuit has no gates.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Number of one-control Toffoli gates.
    pub fn cnot_count(&self) -> usize {
        self.gates.iter().filter(|g| g.is_cnot()).count()
    }

    /// Number of gates of the given kind.
    pub fn count_kind(&self, kind: GateKind) -> usize {
        self.gates.iter().filter(|g| g.kind == kind).count()
    }

    /// Circuit depth: the number of levels when every gate is scheduled as
    /// early as the gates sharing a line with it allow.
    pub fn depth(&self) -> usize {
        let mut level = vec![0usize; self.num_lines as usize];
        let mut depth = 0;
        for gate in &self.gates {
            let next = gate.lines().map(|q| level[q.index()]).max().unwrap_or(0) + 1;
            for q in gate.lines() {
                level[q.index()] = next;
            }
            depth = depth.max(next);
        }
        depth
    }

    /// Copy of this circuit with every line renamed through `map`, placed in
    /// a circuit with `num_lines` lines.
    pub fn map_lines(
        &self,
        num_lines: u32,
        mut map: impl FnMut(QubitId) -> QubitId,
    ) -> IrResult<Circuit> {
        let mut out = Circuit::with_lines(self.name.clone(), num_lines);
        for gate in &self.gates {
            out.apply(gate.map_lines(&mut map))?;
        }
        Ok(out)
    }
}

impl<'a> IntoIterator for &'a Circuit {
    type Item = &'a Gate;
    type IntoIter = std::slice::Iter<'a, Gate>;

    fn into_iter(self) -> Self::IntoIter {
        self.gates.iter()
    }
}
