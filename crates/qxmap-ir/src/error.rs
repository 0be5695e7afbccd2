//! Error types for the IR crate.

use crate::qubit::QubitId;
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Line outside the circuit.
    #[error("Qubit {qubit} not found in circuit with {num_lines} lines{}", format_gate_context(.gate_name))]
    QubitNotFound {
        /// The offending line.
        qubit: QubitId,
        /// Number of lines of the circuit.
        num_lines: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Same line used twice by one gate.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate line.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Gate without a target line.
    #[error("Gate '{0}' has no target")]
    MissingTarget(String),

    /// Simulation would need more amplitudes than supported.
    #[error("Cannot simulate {0} qubits")]
    TooManyQubits(u32),
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
