//! Qubit (circuit line) identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a qubit (circuit line).
///
/// The same type addresses logical lines of an input circuit and physical
/// qubits of a device; which one is meant follows from context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QubitId(pub u32);

impl QubitId {
    /// Index of this qubit as a `usize`, for table lookups.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

impl From<usize> for QubitId {
    fn from(id: usize) -> Self {
        QubitId(u32::try_from(id).expect("QubitId overflow: exceeds u32::MAX"))
    }
}

/// A control line of a gate together with its polarity.
///
/// A positive control fires on `|1⟩`, a negative one on `|0⟩`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Control {
    /// The controlling line.
    pub line: QubitId,
    /// `true` for a positive control.
    #[serde(default = "positive")]
    pub polarity: bool,
}

fn positive() -> bool {
    true
}

impl Control {
    /// A positive control on `line`.
    pub fn positive(line: QubitId) -> Self {
        Self {
            line,
            polarity: true,
        }
    }

    /// A negative control on `line`.
    pub fn negative(line: QubitId) -> Self {
        Self {
            line,
            polarity: false,
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.polarity {
            write!(f, "{}", self.line)
        } else {
            write!(f, "-{}", self.line)
        }
    }
}
