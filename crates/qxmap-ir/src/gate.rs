//! Gate types of the reversible/quantum circuit model.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::qubit::{Control, QubitId};

/// Axis of a Pauli rotation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PauliAxis {
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl PauliAxis {
    /// Lowercase axis letter.
    pub fn letter(self) -> char {
        match self {
            PauliAxis::X => 'x',
            PauliAxis::Y => 'y',
            PauliAxis::Z => 'z',
        }
    }
}

/// The kind tag of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GateKind {
    /// Multiple-controlled Toffoli. No controls is a NOT, one control a CNOT.
    Toffoli,
    /// Hadamard gate.
    Hadamard,
    /// Root of a Pauli operator, `P^(1/root)`, or its adjoint.
    ///
    /// `root = 1` is the Pauli itself, `Z` with `root = 2` is S and with
    /// `root = 4` is T.
    Pauli {
        /// Rotation axis.
        axis: PauliAxis,
        /// Root degree, at least 1.
        root: u32,
        /// Adjoint flag.
        #[serde(default)]
        adjoint: bool,
    },
    /// Square root of NOT (`V`), or `V†` when `adjoint` is set.
    V {
        /// Adjoint flag.
        #[serde(default)]
        adjoint: bool,
    },
}

impl GateKind {
    /// Short name of this gate kind.
    pub fn name(&self) -> &'static str {
        match self {
            GateKind::Toffoli => "t",
            GateKind::Hadamard => "h",
            GateKind::Pauli { .. } => "p",
            GateKind::V { adjoint: false } => "v",
            GateKind::V { adjoint: true } => "v+",
        }
    }

    /// The kind whose action undoes this one.
    pub fn inverse(&self) -> GateKind {
        match *self {
            GateKind::Toffoli => GateKind::Toffoli,
            GateKind::Hadamard => GateKind::Hadamard,
            GateKind::Pauli {
                axis,
                root,
                adjoint,
            } => {
                // Plain Paulis are Hermitian.
                let adjoint = if root == 1 { adjoint } else { !adjoint };
                GateKind::Pauli {
                    axis,
                    root,
                    adjoint,
                }
            }
            GateKind::V { adjoint } => GateKind::V { adjoint: !adjoint },
        }
    }
}

/// A gate: a kind tag applied to target lines, optionally controlled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: GateKind,
    /// Control lines with polarity.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<Control>,
    /// Target lines.
    pub targets: Vec<QubitId>,
}

impl Gate {
    /// Create a gate from its parts.
    pub fn new(
        kind: GateKind,
        controls: impl IntoIterator<Item = Control>,
        targets: impl IntoIterator<Item = QubitId>,
    ) -> Self {
        Self {
            kind,
            controls: controls.into_iter().collect(),
            targets: targets.into_iter().collect(),
        }
    }

    /// NOT on `target`.
    pub fn not(target: QubitId) -> Self {
        Self::new(GateKind::Toffoli, [], [target])
    }

    /// CNOT with a positive control.
    pub fn cnot(control: QubitId, target: QubitId) -> Self {
        Self::new(GateKind::Toffoli, [Control::positive(control)], [target])
    }

    /// Toffoli gate with arbitrary controls.
    pub fn toffoli(controls: impl IntoIterator<Item = Control>, target: QubitId) -> Self {
        Self::new(GateKind::Toffoli, controls, [target])
    }

    /// Hadamard on `target`.
    pub fn hadamard(target: QubitId) -> Self {
        Self::new(GateKind::Hadamard, [], [target])
    }

    /// Pauli root rotation on `target`.
    pub fn pauli(axis: PauliAxis, root: u32, adjoint: bool, target: QubitId) -> Self {
        Self::new(
            GateKind::Pauli {
                axis,
                root,
                adjoint,
            },
            [],
            [target],
        )
    }

    /// Controlled-V (or controlled-V† when `adjoint`).
    pub fn v(control: QubitId, target: QubitId, adjoint: bool) -> Self {
        Self::new(
            GateKind::V { adjoint },
            [Control::positive(control)],
            [target],
        )
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Check if this is a Toffoli-family gate (NOT, CNOT, Toffoli).
    #[inline]
    pub fn is_toffoli(&self) -> bool {
        matches!(self.kind, GateKind::Toffoli)
    }

    /// Check if this is a Toffoli with exactly one control.
    #[inline]
    pub fn is_cnot(&self) -> bool {
        self.is_toffoli() && self.controls.len() == 1
    }

    /// The first target line.
    ///
    /// # Panics
    ///
    /// Panics if the gate has no targets, which the builders never produce.
    #[inline]
    pub fn target(&self) -> QubitId {
        self.targets[0]
    }

    /// The single control of a one-control gate.
    pub fn control(&self) -> Option<Control> {
        match self.controls.as_slice() {
            [c] => Some(*c),
            _ => None,
        }
    }

    /// All lines touched by this gate, controls first.
    pub fn lines(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.controls
            .iter()
            .map(|c| c.line)
            .chain(self.targets.iter().copied())
    }

    /// Gate undoing this one.
    #[must_use]
    pub fn inverse(&self) -> Gate {
        Gate {
            kind: self.kind.inverse(),
            controls: self.controls.clone(),
            targets: self.targets.clone(),
        }
    }

    /// Whether this gate is its own inverse.
    pub fn is_self_inverse(&self) -> bool {
        self.kind.inverse() == self.kind
    }

    /// Same gate with every line renamed through `f`.
    #[must_use]
    pub fn map_lines(&self, mut f: impl FnMut(QubitId) -> QubitId) -> Gate {
        Gate {
            kind: self.kind,
            controls: self
                .controls
                .iter()
                .map(|c| Control {
                    line: f(c.line),
                    polarity: c.polarity,
                })
                .collect(),
            targets: self.targets.iter().map(|&t| f(t)).collect(),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            GateKind::Pauli {
                axis,
                root,
                adjoint,
            } => write!(
                f,
                "{}{}{}",
                axis.letter(),
                if root == 1 { String::new() } else { format!("^1/{root}") },
                if adjoint { "+" } else { "" }
            )?,
            _ => write!(f, "{}{}", self.name(), self.controls.len() + self.targets.len())?,
        }
        for c in &self.controls {
            write!(f, " {c}")?;
        }
        for t in &self.targets {
            write!(f, " {t}")?;
        }
        Ok(())
    }
}
