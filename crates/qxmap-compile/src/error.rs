//! Error types for the routing crate.

use qxmap_ir::QubitId;
use thiserror::Error;

/// Errors that can occur while loading architectures or routing circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RouteError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] qxmap_ir::IrError),

    /// Architecture or cache file could not be read or written.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// File involved.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed architecture or cache description.
    #[error("Parse error at line {line}: {reason}")]
    Parse {
        /// One-based line where parsing failed.
        line: usize,
        /// What was wrong.
        reason: String,
    },

    /// Declared size does not match the data that follows.
    #[error("Architecture declares {declared} qubits but row {row} has {found} entries")]
    SizeMismatch {
        /// Declared qubit count.
        declared: usize,
        /// Offending row.
        row: usize,
        /// Number of entries found in that row.
        found: usize,
    },

    /// Adjacency data describes something that is not a device graph.
    #[error("Invalid connectivity graph: {0}")]
    InvalidGraph(String),

    /// No routing path exists between two qubits.
    #[error("Routing failed: no path from {control} to {target}")]
    Unreachable {
        /// Control qubit of the requested CNOT.
        control: QubitId,
        /// Target qubit of the requested CNOT.
        target: QubitId,
    },

    /// A gate shape the engine does not handle reached it.
    #[error("Unsupported gate '{gate}': {reason}")]
    UnsupportedGate {
        /// Gate as text.
        gate: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A circuit line lies outside the device.
    #[error("Qubit {qubit} outside device with {size} qubits")]
    QubitOutOfRange {
        /// Offending line.
        qubit: QubitId,
        /// Device size.
        size: usize,
    },

    /// No connectivity graph has been loaded.
    #[error("No connectivity graph loaded")]
    GraphNotLoaded,

    /// The routing table has not been built.
    #[error("Routing table not built")]
    TableNotBuilt,

    /// Routing table was built for a device of a different size.
    #[error("Routing table covers {table} qubits but the graph has {graph}")]
    TableMismatch {
        /// Table size.
        table: usize,
        /// Graph size.
        graph: usize,
    },

    /// A layout is not an injective map into the device.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Unknown built-in architecture name.
    #[error("Unknown architecture '{0}'")]
    UnknownArchitecture(String),

    /// Invalid engine configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl RouteError {
    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> Self {
        RouteError::Parse {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        RouteError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// Result type for routing operations.
pub type RouteResult<T> = Result<T, RouteError>;
