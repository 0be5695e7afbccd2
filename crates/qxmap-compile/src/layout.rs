//! Logical-to-physical qubit layouts and CNOT interaction counts.

use ndarray::Array2;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use qxmap_ir::{Circuit, QubitId};

use crate::error::{RouteError, RouteResult};
use crate::router::Router;

/// Injective map from circuit lines to device qubits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    /// Physical qubit of each logical line, indexed by logical line.
    logical_to_physical: Vec<QubitId>,
}

impl Layout {
    /// Create a layout on a device of `device_size` qubits, checking that
    /// every image is on the device and no two lines share one.
    pub fn new(logical_to_physical: Vec<QubitId>, device_size: usize) -> RouteResult<Self> {
        let mut seen: FxHashSet<QubitId> = FxHashSet::default();
        for (logical, &physical) in logical_to_physical.iter().enumerate() {
            if physical.index() >= device_size {
                return Err(RouteError::InvalidLayout(format!(
                    "line {logical} mapped to {physical}, device has {device_size} qubits"
                )));
            }
            if !seen.insert(physical) {
                return Err(RouteError::InvalidLayout(format!(
                    "{physical} assigned to more than one line"
                )));
            }
        }
        Ok(Self {
            logical_to_physical,
        })
    }

    /// Create a trivial layout (logical line i -> physical qubit i).
    pub fn trivial(num_lines: u32) -> Self {
        Self {
            logical_to_physical: (0..num_lines).map(QubitId).collect(),
        }
    }

    /// Layout from an already-validated placement.
    pub(crate) fn from_unchecked(logical_to_physical: Vec<QubitId>) -> Self {
        Self {
            logical_to_physical,
        }
    }

    /// Physical qubit of a logical line.
    pub fn physical(&self, logical: QubitId) -> Option<QubitId> {
        self.logical_to_physical.get(logical.index()).copied()
    }

    /// Logical line placed on a physical qubit.
    pub fn logical(&self, physical: QubitId) -> Option<QubitId> {
        self.logical_to_physical
            .iter()
            .position(|&p| p == physical)
            .map(QubitId::from)
    }

    /// Number of mapped lines.
    pub fn len(&self) -> usize {
        self.logical_to_physical.len()
    }

    /// Check if the layout is empty.
    pub fn is_empty(&self) -> bool {
        self.logical_to_physical.is_empty()
    }

    /// Iterate over (logical, physical) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (QubitId, QubitId)> + '_ {
        self.logical_to_physical
            .iter()
            .enumerate()
            .map(|(l, &p)| (QubitId::from(l), p))
    }

    /// Rewrite `circuit` onto the device, which has `device_size` qubits.
    pub fn apply(&self, circuit: &Circuit, device_size: usize) -> RouteResult<Circuit> {
        if self.len() < circuit.num_lines() as usize {
            return Err(RouteError::InvalidLayout(format!(
                "layout covers {} lines, circuit has {}",
                self.len(),
                circuit.num_lines()
            )));
        }
        let lines = u32::try_from(device_size)
            .map_err(|_| RouteError::InvalidLayout(format!("device size {device_size}")))?;
        let map = &self.logical_to_physical;
        Ok(circuit.map_lines(lines, |q| map[q.index()])?)
    }

    /// Estimated overhead of routing a circuit with interaction counts
    /// `histogram` under this layout.
    pub fn estimate<R: Router + ?Sized>(&self, histogram: &Histogram, router: &R) -> u64 {
        histogram
            .interactions()
            .map(|(c, t, count)| {
                let cost = match (self.physical(c), self.physical(t)) {
                    (Some(pc), Some(pt)) => router.pair_cost(pc, pt).unwrap_or(u32::MAX),
                    _ => u32::MAX,
                };
                u64::from(count) * u64::from(cost)
            })
            .fold(0u64, u64::saturating_add)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (l, p)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}->{}", l.0, p.0)?;
        }
        Ok(())
    }
}

/// Number of CNOTs per ordered (control, target) line pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: Array2<u32>,
}

impl Histogram {
    /// Count the one-control Toffolis of `circuit`.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let n = circuit.num_lines() as usize;
        let mut counts = Array2::zeros((n, n));
        for gate in circuit.iter().filter(|g| g.is_cnot()) {
            if let Some(control) = gate.control() {
                counts[[control.line.index(), gate.target().index()]] += 1;
            }
        }
        Self { counts }
    }

    /// Number of lines covered.
    pub fn num_lines(&self) -> usize {
        self.counts.nrows()
    }

    /// CNOTs with `control` and `target`.
    pub fn count(&self, control: QubitId, target: QubitId) -> u32 {
        self.counts
            .get([control.index(), target.index()])
            .copied()
            .unwrap_or(0)
    }

    /// CNOTs between `a` and `b` in either direction.
    pub fn weight(&self, a: QubitId, b: QubitId) -> u32 {
        self.count(a, b) + self.count(b, a)
    }

    /// Total number of CNOTs.
    pub fn total(&self) -> u32 {
        self.counts.sum()
    }

    /// Non-zero entries as (control, target, count), row-major.
    pub fn interactions(&self) -> impl Iterator<Item = (QubitId, QubitId, u32)> + '_ {
        self.counts
            .indexed_iter()
            .filter(|(_, count)| **count > 0)
            .map(|((c, t), &count)| (QubitId::from(c), QubitId::from(t), count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Architecture;
    use crate::table::RoutingTable;
    use qxmap_ir::Gate;

    fn q(i: u32) -> QubitId {
        QubitId(i)
    }

    #[test]
    fn test_new_validates() {
        assert!(Layout::new(vec![q(0), q(4)], 5).is_ok());
        assert!(matches!(
            Layout::new(vec![q(0), q(5)], 5),
            Err(RouteError::InvalidLayout(_))
        ));
        assert!(matches!(
            Layout::new(vec![q(1), q(1)], 5),
            Err(RouteError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_lookup() {
        let layout = Layout::new(vec![q(3), q(0)], 5).unwrap();
        assert_eq!(layout.physical(q(0)), Some(q(3)));
        assert_eq!(layout.logical(q(0)), Some(q(1)));
        assert_eq!(layout.logical(q(2)), None);
        assert_eq!(layout.to_string(), "0->3 1->0");
    }

    #[test]
    fn test_apply() {
        let mut circuit = Circuit::with_lines("c", 2);
        circuit.cx(q(0), q(1)).unwrap();
        let layout = Layout::new(vec![q(4), q(2)], 5).unwrap();
        let mapped = layout.apply(&circuit, 5).unwrap();
        assert_eq!(mapped.num_lines(), 5);
        assert_eq!(mapped.gates(), &[Gate::cnot(q(4), q(2))]);

        assert!(Layout::trivial(1).apply(&circuit, 5).is_err());
    }

    #[test]
    fn test_histogram() {
        let mut circuit = Circuit::with_lines("c", 3);
        circuit
            .cx(q(0), q(1))
            .unwrap()
            .cx(q(0), q(1))
            .unwrap()
            .cx(q(2), q(1))
            .unwrap()
            .h(q(2))
            .unwrap()
            .not(q(0))
            .unwrap();
        let hist = Histogram::from_circuit(&circuit);
        assert_eq!(hist.count(q(0), q(1)), 2);
        assert_eq!(hist.weight(q(1), q(2)), 1);
        assert_eq!(hist.total(), 3);
        assert_eq!(
            hist.interactions().collect::<Vec<_>>(),
            vec![(q(0), q(1), 2), (q(2), q(1), 1)]
        );
    }

    #[test]
    fn test_estimate() {
        let table = RoutingTable::build(&Architecture::QX4.graph()).unwrap();
        let mut circuit = Circuit::with_lines("c", 2);
        circuit.cx(q(0), q(1)).unwrap().cx(q(0), q(1)).unwrap();
        let hist = Histogram::from_circuit(&circuit);

        let native = Layout::new(vec![q(1), q(0)], 5).unwrap();
        assert_eq!(native.estimate(&hist, &table), 0);
        let flipped = Layout::new(vec![q(0), q(1)], 5).unwrap();
        assert_eq!(flipped.estimate(&hist, &table), 8);
    }
}
