//! Move primitives: the relay steps a routing path is built from.
//!
//! A routed CNOT(v, w) is emitted as `moves; terminal; inverse moves`.
//! Control moves (`cab`, `cba`) carry the control value to a neighbouring
//! qubit, target moves (`tab`, `tba`) carry the target's bit-flip position,
//! and the terminal (`nop`, `flip`, or a run of `cnot3` relays) performs the
//! actual interaction once both ends are adjacent.
//!
//! | primitive | operands | native edge | cost |
//! |-----------|----------|-------------|------|
//! | `cab`, `cabi` | a, b | a → b | 6 |
//! | `cba`, `cbai` | a, b | b → a | 6 |
//! | `tab`, `tabi` | a, b | a → b | 6 |
//! | `tba`, `tbai` | a, b | b → a | 6 |
//! | `nop` | a, b | a → b | 0 |
//! | `flip` | a, b | b → a | 4 |
//! | `cnot3` | a, b, c | a → b, b → c | 3 |
//!
//! Costs count the gates a step adds on top of the single CNOT the circuit
//! asked for.

use serde::{Deserialize, Serialize};
use std::fmt;

use qxmap_ir::QubitId;

/// Gates added by one relay move.
pub const RELAY_COST: u32 = 6;
/// Gates added by a Hadamard-conjugated CNOT.
pub const FLIP_COST: u32 = 4;
/// Gates added by a single three-qubit relay (four CNOTs instead of one).
pub const CNOT3_COST: u32 = 3;

/// One relay step of a routing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    /// Move the control from `a` to `b` along the edge `a → b`.
    Cab(QubitId, QubitId),
    /// Move the control from `a` to `b` along the edge `b → a`.
    Cba(QubitId, QubitId),
    /// Move the target from `a` to `b` along the edge `a → b`.
    Tab(QubitId, QubitId),
    /// Move the target from `a` to `b` along the edge `b → a`.
    Tba(QubitId, QubitId),
    /// Undo [`Move::Cab`].
    CabI(QubitId, QubitId),
    /// Undo [`Move::Cba`].
    CbaI(QubitId, QubitId),
    /// Undo [`Move::Tab`].
    TabI(QubitId, QubitId),
    /// Undo [`Move::Tba`].
    TbaI(QubitId, QubitId),
    /// Native CNOT(a, b).
    Nop(QubitId, QubitId),
    /// CNOT(a, b) over the reversed edge `b → a`.
    Flip(QubitId, QubitId),
    /// CNOT(a, c) relayed through `b`.
    Cnot3(QubitId, QubitId, QubitId),
}

impl Move {
    /// Token naming this primitive in cache files.
    pub fn name(&self) -> &'static str {
        match self {
            Move::Cab(..) => "cab",
            Move::Cba(..) => "cba",
            Move::Tab(..) => "tab",
            Move::Tba(..) => "tba",
            Move::CabI(..) => "cabi",
            Move::CbaI(..) => "cbai",
            Move::TabI(..) => "tabi",
            Move::TbaI(..) => "tbai",
            Move::Nop(..) => "nop",
            Move::Flip(..) => "flip",
            Move::Cnot3(..) => "cnot3",
        }
    }

    /// Number of operands a primitive with this name takes.
    pub fn arity(name: &str) -> Option<usize> {
        match name {
            "cab" | "cba" | "tab" | "tba" | "cabi" | "cbai" | "tabi" | "tbai" | "nop" | "flip" => {
                Some(2)
            }
            "cnot3" => Some(3),
            _ => None,
        }
    }

    /// Build a primitive from its token and operands.
    pub fn from_parts(name: &str, operands: &[QubitId]) -> Option<Move> {
        let m = match (name, operands) {
            ("cab", &[a, b]) => Move::Cab(a, b),
            ("cba", &[a, b]) => Move::Cba(a, b),
            ("tab", &[a, b]) => Move::Tab(a, b),
            ("tba", &[a, b]) => Move::Tba(a, b),
            ("cabi", &[a, b]) => Move::CabI(a, b),
            ("cbai", &[a, b]) => Move::CbaI(a, b),
            ("tabi", &[a, b]) => Move::TabI(a, b),
            ("tbai", &[a, b]) => Move::TbaI(a, b),
            ("nop", &[a, b]) => Move::Nop(a, b),
            ("flip", &[a, b]) => Move::Flip(a, b),
            ("cnot3", &[a, b, c]) => Move::Cnot3(a, b, c),
            _ => return None,
        };
        Some(m)
    }

    /// Standalone gate cost of this step.
    pub fn cost(&self) -> u32 {
        match self {
            Move::Cab(..)
            | Move::Cba(..)
            | Move::Tab(..)
            | Move::Tba(..)
            | Move::CabI(..)
            | Move::CbaI(..)
            | Move::TabI(..)
            | Move::TbaI(..) => RELAY_COST,
            Move::Nop(..) => 0,
            Move::Flip(..) => FLIP_COST,
            Move::Cnot3(..) => CNOT3_COST,
        }
    }

    /// The step undoing this one. Terminal steps are their own inverse.
    #[must_use]
    pub fn inverse(&self) -> Move {
        match *self {
            Move::Cab(a, b) => Move::CabI(a, b),
            Move::Cba(a, b) => Move::CbaI(a, b),
            Move::Tab(a, b) => Move::TabI(a, b),
            Move::Tba(a, b) => Move::TbaI(a, b),
            Move::CabI(a, b) => Move::Cab(a, b),
            Move::CbaI(a, b) => Move::Cba(a, b),
            Move::TabI(a, b) => Move::Tab(a, b),
            Move::TbaI(a, b) => Move::Tba(a, b),
            m @ (Move::Nop(..) | Move::Flip(..) | Move::Cnot3(..)) => m,
        }
    }

    /// Whether this step performs the interaction itself rather than
    /// relocating one of its ends.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Move::Nop(..) | Move::Flip(..) | Move::Cnot3(..))
    }

    /// Operands in order.
    pub fn qubits(&self) -> Vec<QubitId> {
        match *self {
            Move::Cab(a, b)
            | Move::Cba(a, b)
            | Move::Tab(a, b)
            | Move::Tba(a, b)
            | Move::CabI(a, b)
            | Move::CbaI(a, b)
            | Move::TabI(a, b)
            | Move::TbaI(a, b)
            | Move::Nop(a, b)
            | Move::Flip(a, b) => vec![a, b],
            Move::Cnot3(a, b, c) => vec![a, b, c],
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        for q in self.qubits() {
            write!(f, " {}", q.0)?;
        }
        Ok(())
    }
}
