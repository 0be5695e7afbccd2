//! State-vector simulation and circuit equivalence checking.
//!
//! This is the reference oracle used to check that a rewritten circuit
//! still realizes the operation of the original: both circuits are run on
//! every computational basis state and the resulting states are compared up
//! to one global phase.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::gate::{Gate, GateKind, PauliAxis};
use crate::qubit::Control;

/// Largest register a state vector may hold.
const MAX_STATE_QUBITS: u32 = 24;

/// Largest register checked by [`equivalent`], which simulates `2^n` inputs.
pub const MAX_EQUIVALENCE_QUBITS: u32 = 12;

/// Tolerance for amplitude comparisons.
const EPSILON: f64 = 1e-9;

type Matrix2 = [Complex64; 4];

/// A statevector representing a quantum state.
#[derive(Debug, Clone)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: u32,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: u32) -> IrResult<Self> {
        Self::basis(num_qubits, 0)
    }

    /// Create the computational basis state `|index⟩`; bit `i` of `index`
    /// is the value of line `i`.
    pub fn basis(num_qubits: u32, index: usize) -> IrResult<Self> {
        if num_qubits > MAX_STATE_QUBITS {
            return Err(IrError::TooManyQubits(num_qubits));
        }
        let size = 1usize << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[index % size] = Complex64::new(1.0, 0.0);
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Get the amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Apply every gate of `circuit`.
    pub fn run(&mut self, circuit: &Circuit) {
        for gate in circuit {
            self.apply(gate);
        }
    }

    /// Apply a gate to the statevector.
    pub fn apply(&mut self, gate: &Gate) {
        let matrix = gate_matrix(gate.kind);
        for &target in &gate.targets {
            self.apply_controlled(&matrix, &gate.controls, target.index());
        }
    }

    fn apply_controlled(&mut self, m: &Matrix2, controls: &[Control], target: usize) {
        let mask = 1usize << target;
        for i in 0..self.amplitudes.len() {
            if i & mask != 0 || !controls_satisfied(i, controls) {
                continue;
            }
            let j = i | mask;
            let a = self.amplitudes[i];
            let b = self.amplitudes[j];
            self.amplitudes[i] = m[0] * a + m[1] * b;
            self.amplitudes[j] = m[2] * a + m[3] * b;
        }
    }

    /// Inner product `⟨self|other⟩`.
    pub fn inner(&self, other: &Statevector) -> Complex64 {
        self.amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum()
    }
}

fn controls_satisfied(index: usize, controls: &[Control]) -> bool {
    controls
        .iter()
        .all(|c| (index >> c.line.index()) & 1 == usize::from(c.polarity))
}

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

fn pauli_matrix(axis: PauliAxis) -> Matrix2 {
    match axis {
        PauliAxis::X => [c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)],
        PauliAxis::Y => [c(0.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(0.0, 0.0)],
        PauliAxis::Z => [c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(-1.0, 0.0)],
    }
}

/// `P^(1/root)` as `(I + P)/2 + e^(iπ/root) (I - P)/2`.
fn pauli_root(axis: PauliAxis, root: u32, adjoint: bool) -> Matrix2 {
    let p = pauli_matrix(axis);
    let sign = if adjoint { -1.0 } else { 1.0 };
    let phase = Complex64::from_polar(1.0, sign * PI / f64::from(root.max(1)));
    let id = [c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(1.0, 0.0)];
    let mut out = [c(0.0, 0.0); 4];
    for k in 0..4 {
        out[k] = (id[k] + p[k]) * 0.5 + phase * (id[k] - p[k]) * 0.5;
    }
    out
}

fn gate_matrix(kind: GateKind) -> Matrix2 {
    match kind {
        GateKind::Toffoli => pauli_matrix(PauliAxis::X),
        GateKind::Hadamard => {
            let s = 1.0 / 2.0_f64.sqrt();
            [c(s, 0.0), c(s, 0.0), c(s, 0.0), c(-s, 0.0)]
        }
        GateKind::Pauli {
            axis,
            root,
            adjoint,
        } => pauli_root(axis, root, adjoint),
        GateKind::V { adjoint } => pauli_root(PauliAxis::X, 2, adjoint),
    }
}

/// Check whether two circuits realize the same operation up to a global
/// phase.
///
/// Both circuits are simulated on the larger of their two line counts.
pub fn equivalent(a: &Circuit, b: &Circuit) -> IrResult<bool> {
    let n = a.num_lines().max(b.num_lines());
    if n > MAX_EQUIVALENCE_QUBITS {
        return Err(IrError::TooManyQubits(n));
    }

    let mut phase: Option<Complex64> = None;
    for index in 0..(1usize << n) {
        let mut sa = Statevector::basis(n, index)?;
        let mut sb = Statevector::basis(n, index)?;
        sa.run(a);
        sb.run(b);

        let overlap = sa.inner(&sb);
        if (overlap.norm() - 1.0).abs() > EPSILON {
            return Ok(false);
        }
        match phase {
            None => phase = Some(overlap),
            Some(p) if (p - overlap).norm() > EPSILON => return Ok(false),
            Some(_) => {}
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qubit::QubitId;

    #[test]
    fn test_not_flips_basis_state() {
        let mut sv = Statevector::new(2).unwrap();
        sv.apply(&Gate::not(QubitId(1)));
        assert!((sv.amplitudes()[0b10].re - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_negative_control() {
        let mut sv = Statevector::new(2).unwrap();
        sv.apply(&Gate::toffoli([Control::negative(QubitId(0))], QubitId(1)));
        assert!((sv.amplitudes()[0b10].re - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_v_squared_is_not() {
        let mut vv = Circuit::with_lines("vv", 2);
        vv.v(QubitId(0), QubitId(1)).unwrap();
        vv.v(QubitId(0), QubitId(1)).unwrap();
        let mut cx = Circuit::with_lines("cx", 2);
        cx.cx(QubitId(0), QubitId(1)).unwrap();
        assert!(equivalent(&vv, &cx).unwrap());
    }

    #[test]
    fn test_hadamard_conjugation_reverses_cnot() {
        let mut flipped = Circuit::with_lines("flip", 2);
        flipped
            .h(QubitId(0))
            .unwrap()
            .h(QubitId(1))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .h(QubitId(0))
            .unwrap()
            .h(QubitId(1))
            .unwrap();
        let mut reversed = Circuit::with_lines("rev", 2);
        reversed.cx(QubitId(1), QubitId(0)).unwrap();
        assert!(equivalent(&flipped, &reversed).unwrap());
    }

    #[test]
    fn test_t_fourth_power_is_z() {
        let mut tttt = Circuit::with_lines("t4", 1);
        for _ in 0..4 {
            tttt.t(QubitId(0)).unwrap();
        }
        let mut z = Circuit::with_lines("z", 1);
        z.pauli(PauliAxis::Z, 1, false, QubitId(0)).unwrap();
        assert!(equivalent(&tttt, &z).unwrap());
    }

    #[test]
    fn test_detects_difference() {
        let mut a = Circuit::with_lines("a", 2);
        a.cx(QubitId(0), QubitId(1)).unwrap();
        let mut b = Circuit::with_lines("b", 2);
        b.cx(QubitId(1), QubitId(0)).unwrap();
        assert!(!equivalent(&a, &b).unwrap());
    }

    #[test]
    fn test_too_many_qubits() {
        let a = Circuit::with_lines("big", MAX_EQUIVALENCE_QUBITS + 1);
        assert!(matches!(
            equivalent(&a, &a),
            Err(IrError::TooManyQubits(_))
        ));
    }
}
