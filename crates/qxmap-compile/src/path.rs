//! Routing paths: the primitive sequence realizing one simulated CNOT.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::primitive::{CNOT3_COST, Move};

/// Ordered sequence of move primitives.
///
/// During the search a path holds the relay moves followed by one terminal
/// step. Once a path is chosen for the table, [`RoutingPath::append_inverse`]
/// completes it with the undo sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingPath {
    steps: Vec<Move>,
}

impl RoutingPath {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a path from its steps.
    pub fn from_steps(steps: Vec<Move>) -> Self {
        Self { steps }
    }

    /// Append one step.
    pub fn push(&mut self, step: Move) {
        self.steps.push(step);
    }

    /// Remove and return the last step.
    pub fn pop(&mut self) -> Option<Move> {
        self.steps.pop()
    }

    /// Steps in order.
    pub fn steps(&self) -> &[Move] {
        &self.steps
    }

    /// Iterate over the steps.
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.steps.iter()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the path has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The last step, normally the terminal.
    pub fn last(&self) -> Option<&Move> {
        self.steps.last()
    }

    /// Gate overhead of emitting this path.
    ///
    /// Consecutive `cnot3` steps nest: the first one emits a four-CNOT
    /// window, and each further one wraps the previous window `W` as
    /// `CX W CX W`, so it adds the old window size plus two.
    pub fn cost(&self) -> u32 {
        let mut total = 0;
        let mut window: Option<u32> = None;
        for step in &self.steps {
            match (step, window) {
                (Move::Cnot3(..), None) => {
                    total += CNOT3_COST;
                    window = Some(CNOT3_COST + 1);
                }
                (Move::Cnot3(..), Some(w)) => {
                    total += w + 2;
                    window = Some(2 * w + 2);
                }
                _ => {
                    total += step.cost();
                    window = None;
                }
            }
        }
        total
    }

    /// Estimated overhead once the relay moves are undone: the moves are
    /// paid twice and the terminal once.
    ///
    /// Exact when the path holds at most one `cnot3`; a nested run is
    /// over-counted because its window growth is paid twice.
    pub fn cost_round_trip(&self) -> u32 {
        let last = self.steps.last().map_or(0, Move::cost);
        (2 * self.cost()).saturating_sub(last)
    }

    /// Append the inverse of every relay move in reverse order.
    pub fn append_inverse(&mut self) {
        let undo: Vec<Move> = self
            .steps
            .iter()
            .rev()
            .filter(|m| !m.is_terminal())
            .map(Move::inverse)
            .collect();
        self.steps.extend(undo);
    }

    /// Collapse the trailing run of `cab` moves feeding a `nop` terminal
    /// into nested `cnot3` relays.
    ///
    /// `cab(x0,x1) cab(x1,x2) nop(x2,t)` becomes
    /// `cnot3(x1,x2,t) cnot3(x0,x1,t)`, innermost relay first. Returns
    /// `None` when the path does not end in such a run.
    pub fn merge_relays(&self) -> Option<RoutingPath> {
        let (last, moves) = self.steps.split_last()?;
        let Move::Nop(mut hop, target) = *last else {
            return None;
        };

        // Walking backwards meets the innermost relay first.
        let mut relays = Vec::new();
        let mut split = moves.len();
        for step in moves.iter().rev() {
            match *step {
                Move::Cab(a, b) if b == hop => {
                    relays.push(Move::Cnot3(a, b, target));
                    hop = a;
                    split -= 1;
                }
                _ => break,
            }
        }
        if relays.is_empty() {
            return None;
        }

        let mut steps = moves[..split].to_vec();
        steps.extend(relays);
        Some(RoutingPath { steps })
    }
}

impl FromIterator<Move> for RoutingPath {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RoutingPath {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl fmt::Display for RoutingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}
