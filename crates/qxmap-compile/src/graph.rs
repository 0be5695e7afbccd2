//! Device connectivity: which directed CNOTs the hardware supports.

use ndarray::Array2;
use petgraph::algo::connected_components;
use petgraph::graph::DiGraph;
use std::collections::VecDeque;
use std::fmt;
use std::path::Path;
use tracing::debug;

use qxmap_ir::QubitId;

use crate::error::{RouteError, RouteResult};

/// Directed adjacency over the physical qubits of a device.
///
/// `adjacent(v, w)` holds when CNOT with control `v` and target `w` is a
/// native operation. A graph is immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityGraph {
    adjacency: Array2<bool>,
}

impl ConnectivityGraph {
    /// Create a graph with `num_qubits` qubits and no edges.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            adjacency: Array2::from_elem((num_qubits, num_qubits), false),
        }
    }

    /// Create a graph from a list of directed `(control, target)` edges.
    pub fn from_edges(num_qubits: usize, edges: &[(u32, u32)]) -> RouteResult<Self> {
        let mut graph = Self::new(num_qubits);
        for &(c, t) in edges {
            for q in [c, t] {
                if q as usize >= num_qubits {
                    return Err(RouteError::QubitOutOfRange {
                        qubit: QubitId(q),
                        size: num_qubits,
                    });
                }
            }
            if c == t {
                return Err(RouteError::InvalidGraph(format!("self-loop on qubit {c}")));
            }
            graph.adjacency[[c as usize, t as usize]] = true;
        }
        Ok(graph)
    }

    /// Parse the text description: the qubit count `N` on its own line,
    /// then `N` rows of `N` tokens, each `0` or `1`.
    pub fn parse(text: &str) -> RouteResult<Self> {
        let mut reader = RowReader::new(text);
        let graph = Self::read(&mut reader)?;
        reader.finish()?;
        Ok(graph)
    }

    /// Load a graph from a file in the text description format.
    pub fn load(path: impl AsRef<Path>) -> RouteResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| RouteError::io(path, e))?;
        let graph = Self::parse(&text)?;
        debug!(
            "Loaded {} qubit graph with {} edges from {}",
            graph.size(),
            graph.edge_count(),
            path.display()
        );
        Ok(graph)
    }

    /// Read the graph section of a text description, leaving anything that
    /// follows it in `reader`.
    pub(crate) fn read(reader: &mut RowReader<'_>) -> RouteResult<Self> {
        let (line, header) = reader.expect_row("qubit count")?;
        let [token] = header.as_slice() else {
            return Err(RouteError::parse(line, "expected a single qubit count"));
        };
        let n: usize = token
            .parse()
            .map_err(|_| RouteError::parse(line, format!("invalid qubit count '{token}'")))?;

        let mut adjacency = Array2::from_elem((n, n), false);
        for row in 0..n {
            let (line, tokens) = reader.expect_row("adjacency row")?;
            if tokens.len() != n {
                return Err(RouteError::SizeMismatch {
                    declared: n,
                    row,
                    found: tokens.len(),
                });
            }
            for (col, token) in tokens.iter().enumerate() {
                let edge = match *token {
                    "0" => false,
                    "1" => true,
                    other => {
                        return Err(RouteError::parse(
                            line,
                            format!("expected 0 or 1, found '{other}'"),
                        ));
                    }
                };
                if edge && row == col {
                    return Err(RouteError::InvalidGraph(format!("self-loop on qubit {row}")));
                }
                adjacency[[row, col]] = edge;
            }
        }
        Ok(Self { adjacency })
    }

    /// Number of qubits.
    pub fn size(&self) -> usize {
        self.adjacency.nrows()
    }

    /// Whether CNOT(`control`, `target`) is native. Lines outside the
    /// device are never adjacent.
    #[inline]
    pub fn adjacent(&self, control: QubitId, target: QubitId) -> bool {
        self.adjacency
            .get([control.index(), target.index()])
            .copied()
            .unwrap_or(false)
    }

    /// Whether the two qubits share an edge in either direction.
    pub fn coupled(&self, a: QubitId, b: QubitId) -> bool {
        self.adjacent(a, b) || self.adjacent(b, a)
    }

    /// The raw adjacency matrix.
    pub fn adjacency(&self) -> &Array2<bool> {
        &self.adjacency
    }

    /// Directed edges in row-major order.
    pub fn edges(&self) -> impl Iterator<Item = (QubitId, QubitId)> + '_ {
        self.adjacency
            .indexed_iter()
            .filter(|(_, edge)| **edge)
            .map(|((c, t), _)| (QubitId::from(c), QubitId::from(t)))
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().filter(|e| **e).count()
    }

    /// Number of edges on a shortest path from `from` to `to`, ignoring
    /// edge direction.
    pub fn distance(&self, from: QubitId, to: QubitId) -> Option<usize> {
        let n = self.size();
        if from.index() >= n || to.index() >= n {
            return None;
        }
        if from == to {
            return Some(0);
        }
        let mut seen = vec![false; n];
        let mut queue = VecDeque::new();
        seen[from.index()] = true;
        queue.push_back((from, 0usize));

        while let Some((current, dist)) = queue.pop_front() {
            for neighbor in (0..n).map(QubitId::from) {
                if seen[neighbor.index()] || !self.coupled(current, neighbor) {
                    continue;
                }
                if neighbor == to {
                    return Some(dist + 1);
                }
                seen[neighbor.index()] = true;
                queue.push_back((neighbor, dist + 1));
            }
        }
        None
    }

    /// Whether every qubit is reachable from every other when edge
    /// direction is ignored.
    pub fn is_weakly_connected(&self) -> bool {
        if self.size() <= 1 {
            return true;
        }
        let mut graph: DiGraph<(), ()> = DiGraph::with_capacity(self.size(), self.edge_count());
        let nodes: Vec<_> = (0..self.size()).map(|_| graph.add_node(())).collect();
        for (c, t) in self.edges() {
            graph.add_edge(nodes[c.index()], nodes[t.index()], ());
        }
        connected_components(&graph) == 1
    }
}

impl fmt::Display for ConnectivityGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.size())?;
        for row in self.adjacency.rows() {
            let tokens: Vec<&str> = row.iter().map(|&e| if e { "1" } else { "0" }).collect();
            writeln!(f, "{}", tokens.join(" "))?;
        }
        Ok(())
    }
}

/// Line-oriented tokenizer shared by the graph and cache formats.
///
/// Blank lines and lines starting with `#` are skipped.
pub(crate) struct RowReader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    line: usize,
}

impl<'a> RowReader<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            line: 0,
        }
    }

    /// Next non-blank row as its one-based line number and tokens.
    pub(crate) fn next_row(&mut self) -> Option<(usize, Vec<&'a str>)> {
        for (index, text) in self.lines.by_ref() {
            self.line = index + 1;
            let text = text.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            return Some((self.line, text.split_whitespace().collect()));
        }
        None
    }

    pub(crate) fn expect_row(&mut self, what: &str) -> RouteResult<(usize, Vec<&'a str>)> {
        self.next_row().ok_or_else(|| {
            RouteError::parse(self.line + 1, format!("unexpected end of input, expected {what}"))
        })
    }

    /// Fail if any non-blank row is left.
    pub(crate) fn finish(&mut self) -> RouteResult<()> {
        match self.next_row() {
            Some((line, _)) => Err(RouteError::parse(line, "unexpected trailing data")),
            None => Ok(()),
        }
    }
}

/// A built-in device topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Architecture {
    /// Short name used on the command line.
    pub name: &'static str,
    /// Human-readable device name.
    pub description: &'static str,
    /// Number of physical qubits.
    pub num_qubits: u32,
    /// Directed `(control, target)` edges.
    pub edges: &'static [(u32, u32)],
    /// Every listed edge is native in both directions.
    pub bidirectional: bool,
}

impl Architecture {
    /// IBM QX2 (Yorktown), 5 qubits.
    pub const QX2: Architecture = Architecture {
        name: "qx2",
        description: "IBM QX2 (5 qubits)",
        num_qubits: 5,
        edges: &[(0, 1), (0, 2), (1, 2), (3, 2), (3, 4), (4, 2)],
        bidirectional: false,
    };

    /// IBM QX4 (Tenerife), 5 qubits.
    pub const QX4: Architecture = Architecture {
        name: "qx4",
        description: "IBM QX4 (5 qubits)",
        num_qubits: 5,
        edges: &[(1, 0), (2, 0), (2, 1), (3, 2), (3, 4), (2, 4)],
        bidirectional: false,
    };

    /// IBM QX3, 16 qubits.
    pub const QX3: Architecture = Architecture {
        name: "qx3",
        description: "IBM QX3 (16 qubits)",
        num_qubits: 16,
        edges: &[
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 14),
            (4, 3),
            (4, 5),
            (6, 7),
            (6, 11),
            (6, 5),
            (7, 10),
            (8, 7),
            (9, 8),
            (9, 10),
            (11, 10),
            (12, 5),
            (12, 11),
            (12, 13),
            (13, 4),
            (13, 14),
            (15, 0),
            (15, 14),
        ],
        bidirectional: false,
    };

    /// IBM QX5 (Rueschlikon), 16 qubits.
    pub const QX5: Architecture = Architecture {
        name: "qx5",
        description: "IBM QX5 (16 qubits)",
        num_qubits: 16,
        edges: &[
            (1, 0),
            (1, 2),
            (2, 3),
            (3, 4),
            (3, 14),
            (5, 4),
            (6, 5),
            (6, 7),
            (6, 11),
            (7, 10),
            (8, 7),
            (9, 8),
            (9, 10),
            (11, 10),
            (12, 5),
            (12, 11),
            (12, 13),
            (13, 4),
            (13, 14),
            (15, 0),
            (15, 2),
            (15, 14),
        ],
        bidirectional: false,
    };

    /// IBM Q20 (Tokyo), 20 qubits with symmetric coupling.
    pub const QX20: Architecture = Architecture {
        name: "qx20",
        description: "IBM Q20 Tokyo (20 qubits, bidirectional)",
        num_qubits: 20,
        edges: &[
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 4),
            (0, 5),
            (1, 6),
            (1, 7),
            (2, 6),
            (2, 7),
            (3, 8),
            (3, 9),
            (4, 8),
            (4, 9),
            (5, 6),
            (6, 7),
            (7, 8),
            (8, 9),
            (5, 10),
            (5, 11),
            (6, 10),
            (6, 11),
            (7, 12),
            (7, 13),
            (8, 12),
            (8, 13),
            (9, 14),
            (10, 11),
            (11, 12),
            (12, 13),
            (13, 14),
            (10, 15),
            (11, 16),
            (11, 17),
            (12, 16),
            (12, 17),
            (13, 18),
            (13, 19),
            (14, 18),
            (14, 19),
            (15, 16),
            (16, 17),
            (17, 18),
            (18, 19),
        ],
        bidirectional: true,
    };

    /// Every built-in architecture.
    pub const ALL: [Architecture; 5] = [
        Architecture::QX2,
        Architecture::QX4,
        Architecture::QX3,
        Architecture::QX5,
        Architecture::QX20,
    ];

    /// Look up a built-in architecture by name (case-insensitive).
    pub fn by_name(name: &str) -> RouteResult<Architecture> {
        Self::ALL
            .into_iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| RouteError::UnknownArchitecture(name.to_string()))
    }

    /// The connectivity graph of this device.
    pub fn graph(&self) -> ConnectivityGraph {
        let n = self.num_qubits as usize;
        let mut adjacency = Array2::from_elem((n, n), false);
        for &(c, t) in self.edges {
            adjacency[[c as usize, t as usize]] = true;
            if self.bidirectional {
                adjacency[[t as usize, c as usize]] = true;
            }
        }
        ConnectivityGraph { adjacency }
    }
}
