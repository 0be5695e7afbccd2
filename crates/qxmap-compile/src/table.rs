//! All-pairs routing table: the cheapest routing path for every ordered
//! qubit pair of a device.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use qxmap_ir::QubitId;

use crate::enumerate::{PathEnumerator, PathVisitor};
use crate::error::{RouteError, RouteResult};
use crate::graph::{ConnectivityGraph, RowReader};
use crate::path::RoutingPath;
use crate::primitive::{CNOT3_COST, FLIP_COST, Move, RELAY_COST};

/// First token of every path line in a cache file.
const PATH_MARKER: &str = "cost";

/// Cost and complete path (relays, terminal, undo) for one ordered pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingEntry {
    /// Gates added on top of the requested CNOT.
    pub cost: u32,
    /// Primitive sequence to emit.
    pub path: RoutingPath,
}

/// Routing table for one connectivity graph.
///
/// Every off-diagonal entry is populated once built; the diagonal is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingTable {
    graph: ConnectivityGraph,
    entries: Array2<Option<RoutingEntry>>,
}

/// Keeps the cheapest candidate seen and prunes states that cannot beat it.
#[derive(Debug, Default)]
struct CheapestPath {
    best: Option<(u32, RoutingPath)>,
    /// Cost some path is known to reach; states that must exceed it are cut
    /// before any candidate is found.
    ceiling: Option<u32>,
}

impl CheapestPath {
    fn with_ceiling(ceiling: Option<u32>) -> Self {
        Self {
            best: None,
            ceiling,
        }
    }

    fn offer(&mut self, path: RoutingPath) {
        let cost = path.cost_round_trip();
        if self.best.as_ref().is_none_or(|(best, _)| cost < *best) {
            self.best = Some((cost, path));
        }
    }
}

/// Smallest round-trip cost any completion of `relays` can reach.
///
/// Only the trailing run of `cab` moves may still merge into nested
/// relays, at 3 for one move and 15 for two; from three on the unmerged
/// moves are cheaper. Everything before the run is paid in full.
fn lower_bound(relays: &[Move]) -> u32 {
    let run = relays
        .iter()
        .rev()
        .take_while(|m| matches!(m, Move::Cab(..)))
        .count();
    let full = 2 * RELAY_COST;
    let paid = (relays.len() - run) as u32 * full;
    let merged = match run {
        0 => 0,
        1 => CNOT3_COST,
        2 => 15,
        k => k as u32 * full,
    };
    paid + merged
}

/// Round-trip cost of walking the control along a shortest undirected path
/// to a neighbour of the target, then paying at most a flip.
fn walking_cost(graph: &ConnectivityGraph, control: QubitId, target: QubitId) -> Option<u32> {
    let hops = graph.distance(control, target)?;
    let relays = u32::try_from(hops.checked_sub(1)?).ok()?;
    Some(relays * 2 * RELAY_COST + FLIP_COST)
}

impl PathVisitor for CheapestPath {
    fn enter(&mut self, relays: &[Move]) -> bool {
        let bound = lower_bound(relays);
        match (&self.best, self.ceiling) {
            (Some((best, _)), _) => bound < *best,
            (None, Some(ceiling)) => bound <= ceiling,
            (None, None) => true,
        }
    }

    fn complete(&mut self, path: &RoutingPath) {
        self.offer(path.clone());
        if let Some(merged) = path.merge_relays() {
            self.offer(merged);
        }
    }
}

impl RoutingTable {
    /// Build the table for `graph` with an unbounded path search.
    pub fn build(graph: &ConnectivityGraph) -> RouteResult<Self> {
        Self::build_with_limit(graph, None)
    }

    /// Build the table, bounding the relay moves per candidate path.
    #[instrument(skip(graph), fields(qubits = graph.size()))]
    pub fn build_with_limit(
        graph: &ConnectivityGraph,
        max_relay_moves: Option<usize>,
    ) -> RouteResult<Self> {
        let n = graph.size();
        if !graph.is_weakly_connected() {
            warn!("Connectivity graph is not weakly connected; some pairs will be unreachable");
        }

        let enumerator = PathEnumerator::new(graph).with_max_relay_moves(max_relay_moves);
        let mut entries = Array2::from_elem((n, n), None);
        for v in (0..n).map(QubitId::from) {
            for w in (0..n).map(QubitId::from) {
                if v == w {
                    continue;
                }
                let entry = if graph.adjacent(v, w) {
                    RoutingEntry {
                        cost: 0,
                        path: RoutingPath::from_steps(vec![Move::Nop(v, w)]),
                    }
                } else {
                    // The walking bound is only reachable when the limit
                    // admits that many relays.
                    let ceiling = walking_cost(graph, v, w).filter(|_| {
                        max_relay_moves.is_none_or(|limit| {
                            graph.distance(v, w).is_some_and(|d| d - 1 <= limit)
                        })
                    });
                    let mut search = CheapestPath::with_ceiling(ceiling);
                    enumerator.visit(v, w, &mut search);
                    let (cost, mut path) = search.best.ok_or(RouteError::Unreachable {
                        control: v,
                        target: w,
                    })?;
                    path.append_inverse();
                    debug!("{v} -> {w}: cost {cost}, {path}");
                    RoutingEntry { cost, path }
                };
                entries[[v.index(), w.index()]] = Some(entry);
            }
        }

        info!("Built routing table for {n} qubits");
        Ok(Self {
            graph: graph.clone(),
            entries,
        })
    }

    /// Number of qubits covered.
    pub fn size(&self) -> usize {
        self.entries.nrows()
    }

    /// The graph this table was built for.
    pub fn graph(&self) -> &ConnectivityGraph {
        &self.graph
    }

    /// Entry for CNOT(`control`, `target`); `None` on the diagonal or
    /// outside the device.
    pub fn entry(&self, control: QubitId, target: QubitId) -> Option<&RoutingEntry> {
        self.entries
            .get([control.index(), target.index()])
            .and_then(Option::as_ref)
    }

    /// Cost of CNOT(`control`, `target`).
    pub fn cost(&self, control: QubitId, target: QubitId) -> Option<u32> {
        self.entry(control, target).map(|e| e.cost)
    }

    /// The cost matrix, zero on the diagonal.
    pub fn cost_matrix(&self) -> Array2<u32> {
        self.entries
            .map(|entry| entry.as_ref().map_or(0, |e| e.cost))
    }

    /// Serialize to the cache text format: the graph description, the cost
    /// matrix, then one line per off-diagonal pair in row-major order: the
    /// literal `cost` followed by the path's primitives with their operands.
    pub fn to_cache_string(&self) -> String {
        let mut out = self.graph.to_string();
        for row in self.cost_matrix().rows() {
            let tokens: Vec<String> = row.iter().map(u32::to_string).collect();
            out.push_str(&tokens.join(" "));
            out.push('\n');
        }
        for ((v, w), entry) in self.entries.indexed_iter() {
            if v == w {
                continue;
            }
            if let Some(entry) = entry {
                out.push_str(PATH_MARKER);
                for step in &entry.path {
                    let _ = write!(out, " {step}");
                }
                out.push('\n');
            }
        }
        out
    }

    /// Parse a table from the cache text format.
    pub fn from_cache_str(text: &str) -> RouteResult<Self> {
        let mut reader = RowReader::new(text);
        let graph = ConnectivityGraph::read(&mut reader)?;
        let n = graph.size();

        let mut costs = Array2::<u32>::zeros((n, n));
        for row in 0..n {
            let (line, tokens) = reader.expect_row("cost row")?;
            if tokens.len() != n {
                return Err(RouteError::SizeMismatch {
                    declared: n,
                    row,
                    found: tokens.len(),
                });
            }
            for (col, token) in tokens.iter().enumerate() {
                costs[[row, col]] = parse_number(token, line)?;
            }
        }

        let mut entries = Array2::from_elem((n, n), None);
        for v in 0..n {
            for w in 0..n {
                if v == w {
                    continue;
                }
                let (line, tokens) = reader.expect_row("routing path")?;
                let path = parse_path(&tokens, line, n)?;
                entries[[v, w]] = Some(RoutingEntry {
                    cost: costs[[v, w]],
                    path,
                });
            }
        }
        reader.finish()?;

        Ok(Self { graph, entries })
    }

    /// Write the table to a cache file.
    pub fn write_cache(&self, path: impl AsRef<Path>) -> RouteResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_cache_string()).map_err(|e| RouteError::io(path, e))?;
        debug!("Wrote routing table cache to {}", path.display());
        Ok(())
    }

    /// Read a table from a cache file.
    pub fn read_cache(path: impl AsRef<Path>) -> RouteResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| RouteError::io(path, e))?;
        let table = Self::from_cache_str(&text)?;
        debug!(
            "Read routing table for {} qubits from {}",
            table.size(),
            path.display()
        );
        Ok(table)
    }
}

fn parse_number<T: std::str::FromStr>(token: &str, line: usize) -> RouteResult<T> {
    token
        .parse()
        .map_err(|_| RouteError::parse(line, format!("invalid number '{token}'")))
}

fn parse_path(tokens: &[&str], line: usize, size: usize) -> RouteResult<RoutingPath> {
    let mut rest = match tokens.split_first() {
        Some((&PATH_MARKER, rest)) => rest,
        Some((other, _)) => {
            return Err(RouteError::parse(
                line,
                format!("expected '{PATH_MARKER}', found '{other}'"),
            ));
        }
        None => return Err(RouteError::parse(line, "empty routing path")),
    };

    let mut path = RoutingPath::new();
    while let Some((name, tail)) = rest.split_first() {
        let arity = Move::arity(name)
            .ok_or_else(|| RouteError::parse(line, format!("unknown primitive '{name}'")))?;
        if tail.len() < arity {
            return Err(RouteError::parse(
                line,
                format!("primitive '{name}' needs {arity} operands"),
            ));
        }
        let mut operands = Vec::with_capacity(arity);
        for token in &tail[..arity] {
            let q: u32 = parse_number(token, line)?;
            if q as usize >= size {
                return Err(RouteError::QubitOutOfRange {
                    qubit: QubitId(q),
                    size,
                });
            }
            operands.push(QubitId(q));
        }
        let step = Move::from_parts(name, &operands)
            .ok_or_else(|| RouteError::parse(line, format!("malformed primitive '{name}'")))?;
        path.push(step);
        rest = &tail[arity..];
    }
    if path.is_empty() {
        return Err(RouteError::parse(line, "empty routing path"));
    }
    Ok(path)
}

impl fmt::Display for RoutingTable {
    /// Aligned cost matrix with qubit headers; `-` on the diagonal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.size();
        let width = self
            .cost_matrix()
            .iter()
            .map(|c| c.to_string().len())
            .chain(std::iter::once(n.to_string().len()))
            .max()
            .unwrap_or(1)
            + 1;

        write!(f, "{:>width$}", "")?;
        for col in 0..n {
            write!(f, "{col:>width$}")?;
        }
        writeln!(f)?;
        for row in 0..n {
            write!(f, "{row:>width$}")?;
            for col in 0..n {
                match &self.entries[[row, col]] {
                    Some(entry) => write!(f, "{:>width$}", entry.cost)?,
                    None => write!(f, "{:>width$}", "-")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
