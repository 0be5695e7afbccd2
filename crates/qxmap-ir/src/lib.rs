//! qxmap Circuit Intermediate Representation
//!
//! This crate provides the circuit model consumed and produced by the qxmap
//! routing engine: lines addressed by [`QubitId`], gates from the
//! reversible/quantum gate library (Toffoli family, Hadamard, Pauli roots and
//! controlled-V), and an owned, ordered [`Circuit`].
//!
//! # Example: Building a small circuit
//!
//! ```rust
//! use qxmap_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_lines("bell", 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! assert_eq!(circuit.gate_count(), 2);
//! assert_eq!(circuit.depth(), 2);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Lines | Description |
//! |------|-------|-------------|
//! | `Toffoli` | 1+ | NOT with zero or more controls (NOT, CNOT, Toffoli) |
//! | `Hadamard` | 1 | Hadamard gate |
//! | `Pauli` | 1 | `P^(1/root)` for `P ∈ {X, Y, Z}`, optionally adjoint |
//! | `V` | 2 | Controlled square root of NOT, optionally adjoint |
//!
//! The [`sim`] module holds a small state-vector simulator and the
//! [`sim::equivalent`] check used to validate rewrites.

pub mod circuit;
pub mod error;
pub mod gate;
pub mod qubit;
pub mod sim;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{Gate, GateKind, PauliAxis};
pub use qubit::{Control, QubitId};
pub use sim::{Statevector, equivalent};
