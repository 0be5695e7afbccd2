//! Backtracking search over relay-move sequences.
//!
//! From the current (control, target) location pair the search stops with
//! `nop` when the pair is a native edge, or with `flip` when the reversed
//! edge is native. Otherwise it tries, for every qubit not yet visited in
//! ascending order, moving the control along an outgoing edge (`cab`) or an
//! incoming edge (`cba`), then the target along an outgoing edge (`tab`) or
//! an incoming edge (`tba`). A qubit entered by a move stays visited on that
//! branch, so every path is simple.

use qxmap_ir::QubitId;

use crate::graph::ConnectivityGraph;
use crate::path::RoutingPath;
use crate::primitive::Move;

/// Receives the states reached by a [`PathEnumerator`].
pub trait PathVisitor {
    /// Called with the relay moves leading to a state before the state is
    /// expanded. Returning `false` skips the state and everything below it.
    fn enter(&mut self, relays: &[Move]) -> bool {
        let _ = relays;
        true
    }

    /// Called for every completed path, relays followed by the terminal.
    fn complete(&mut self, path: &RoutingPath);
}

/// Collects every completed path.
#[derive(Debug, Default)]
pub struct CollectPaths {
    /// Paths in discovery order.
    pub paths: Vec<RoutingPath>,
}

impl PathVisitor for CollectPaths {
    fn complete(&mut self, path: &RoutingPath) {
        self.paths.push(path.clone());
    }
}

/// Depth-first enumerator of simple routing paths on one graph.
#[derive(Debug, Clone, Copy)]
pub struct PathEnumerator<'g> {
    graph: &'g ConnectivityGraph,
    max_relay_moves: Option<usize>,
}

impl<'g> PathEnumerator<'g> {
    /// Create an unbounded enumerator.
    pub fn new(graph: &'g ConnectivityGraph) -> Self {
        Self {
            graph,
            max_relay_moves: None,
        }
    }

    /// Bound the number of relay moves per path.
    #[must_use]
    pub fn with_max_relay_moves(mut self, limit: Option<usize>) -> Self {
        self.max_relay_moves = limit;
        self
    }

    /// Every simple path realizing CNOT(`control`, `target`), in discovery
    /// order.
    pub fn enumerate(&self, control: QubitId, target: QubitId) -> Vec<RoutingPath> {
        let mut collect = CollectPaths::default();
        self.visit(control, target, &mut collect);
        collect.paths
    }

    /// Run the search, reporting to `visitor`.
    pub fn visit(&self, control: QubitId, target: QubitId, visitor: &mut impl PathVisitor) {
        let n = self.graph.size();
        if control == target || control.index() >= n || target.index() >= n {
            return;
        }
        let mut visited = vec![false; n];
        visited[control.index()] = true;
        visited[target.index()] = true;
        let mut path = RoutingPath::new();
        self.step(control, target, &mut visited, &mut path, visitor);
    }

    fn step(
        &self,
        control: QubitId,
        target: QubitId,
        visited: &mut [bool],
        path: &mut RoutingPath,
        visitor: &mut impl PathVisitor,
    ) {
        if !visitor.enter(path.steps()) {
            return;
        }

        let graph = self.graph;
        if graph.adjacent(control, target) {
            self.finish(path, Move::Nop(control, target), visitor);
            return;
        }
        if graph.adjacent(target, control) {
            self.finish(path, Move::Flip(control, target), visitor);
            return;
        }
        if self.max_relay_moves.is_some_and(|limit| path.len() >= limit) {
            return;
        }

        for x in (0..visited.len()).map(QubitId::from) {
            if visited[x.index()] {
                continue;
            }
            let candidates = [
                (graph.adjacent(control, x), Move::Cab(control, x), x, target),
                (graph.adjacent(x, control), Move::Cba(control, x), x, target),
                (graph.adjacent(target, x), Move::Tab(target, x), control, x),
                (graph.adjacent(x, target), Move::Tba(target, x), control, x),
            ];
            for (native, relay, next_control, next_target) in candidates {
                if !native {
                    continue;
                }
                visited[x.index()] = true;
                path.push(relay);
                self.step(next_control, next_target, visited, path, visitor);
                path.pop();
                visited[x.index()] = false;
            }
        }
    }

    fn finish(&self, path: &mut RoutingPath, terminal: Move, visitor: &mut impl PathVisitor) {
        path.push(terminal);
        visitor.complete(path);
        path.pop();
    }
}

/// Every simple routing path realizing CNOT(`control`, `target`) on `graph`.
pub fn enumerate_paths(
    graph: &ConnectivityGraph,
    control: QubitId,
    target: QubitId,
) -> Vec<RoutingPath> {
    PathEnumerator::new(graph).enumerate(control, target)
}
