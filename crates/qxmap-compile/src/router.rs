//! The routing seam shared by the graph table and the fixed 5-qubit
//! transform, so placement can search over either.

use serde::Serialize;
use tracing::warn;

use qxmap_ir::{Circuit, QubitId};

use crate::error::RouteResult;

/// A rewritten circuit together with its statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedCircuit {
    /// The rewritten circuit.
    pub circuit: Circuit,
    /// Number of gates in `circuit`.
    pub gate_count: usize,
    /// Number of levels in `circuit`.
    pub depth: usize,
    /// Set when routing did not run and `circuit` is the unchanged input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

impl RoutedCircuit {
    /// Wrap a circuit, computing its statistics.
    pub fn new(circuit: Circuit) -> Self {
        Self {
            gate_count: circuit.gate_count(),
            depth: circuit.depth(),
            circuit,
            skipped: None,
        }
    }

    /// Return `circuit` untouched when it has more lines than the device
    /// has qubits. Logged at `warn`.
    pub(crate) fn oversized(circuit: &Circuit, device_size: usize) -> Option<Self> {
        let lines = circuit.num_lines() as usize;
        if lines <= device_size {
            return None;
        }
        let reason = format!(
            "circuit has {lines} lines but the device has only {device_size} qubits; routing skipped"
        );
        warn!("{reason}");
        Some(Self {
            skipped: Some(reason),
            ..Self::new(circuit.clone())
        })
    }

    /// Whether routing was skipped.
    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

/// Rewrites circuits so every CNOT respects a device's connectivity.
pub trait Router {
    /// Number of physical qubits on the device.
    fn num_qubits(&self) -> usize;

    /// Estimated gate overhead of CNOT(`control`, `target`), `None` for the
    /// diagonal or qubits outside the device.
    fn pair_cost(&self, control: QubitId, target: QubitId) -> Option<u32>;

    /// Rewrite `circuit`, whose lines are physical qubits.
    fn route(&self, circuit: &Circuit) -> RouteResult<RoutedCircuit>;
}
