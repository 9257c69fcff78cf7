//! Generalized eigenproblem solution and mode selection
//!
//! The buckling condition is K0·x = λ·ΔK·x over the dense matrix pair from
//! stiffness extraction. With K0 nonsingular this is equivalent to the
//! standard problem A·x = μ·x with A = K0⁻¹·ΔK and μ = 1/λ, so the full
//! spectrum is obtained from the real Schur form of A. ΔK is not symmetric
//! in general, so eigenvalues may come out complex; retention and reporting
//! use the real part only.
//!
//! Only eigenvalues with positive real part are physically meaningful
//! critical load multipliers; they are returned sorted ascending, the
//! smallest being the governing mode. Eigenvectors for the retained modes
//! are recovered by shifted inverse iteration, the same shift-invert device
//! used by sparse modal solvers; the recovered pair is accepted only when
//! it actually solves the standard problem, so an eigenvalue without a real
//! eigenvector (a complex-conjugate pair) is skipped with a warning rather
//! than realized from a meaningless vector. Eigenvector scale is arbitrary
//! and is never normalized across modes.

use nalgebra::{Complex, DMatrix, DVector};

use crate::error::{BucklingError, BucklingResult, ExtractionPass};

/// Free-DOF count above which the dense eigen solve gets slow enough to
/// warrant a heads-up
const LARGE_PROBLEM_DOFS: usize = 1800;

/// |μ| floor below which 1/μ is treated as degenerate (λ → ∞)
const DEGENERATE_MU: f64 = 1e-12;

const INVERSE_ITERATIONS: usize = 12;

/// Relative shift offsets tried when the shifted system is exactly singular
const SHIFT_OFFSETS: [f64; 3] = [1e-8, 1e-5, 1e-3];

/// Relative acceptance tolerance on the recovered eigenpair: the Rayleigh
/// quotient must land on the target eigenvalue and the eigen residual must
/// vanish at this scale
const RESIDUAL_TOL: f64 = 1e-6;

/// One retained buckling mode: critical load factor and eigenvector over
/// the extraction DofMap
#[derive(Debug, Clone)]
pub struct ModeCandidate {
    /// 1-based position in the ascending positive spectrum; stays attached
    /// to the eigenvalue even when lower-ranked modes are skipped
    pub rank: usize,
    /// Critical load factor λ (real part)
    pub lambda: f64,
    /// Eigenvector, arbitrary scale
    pub shape: DVector<f64>,
}

/// Solve K0·x = λ·ΔK·x and return up to `nmodes` candidates with positive
/// λ, sorted ascending.
///
/// Fails with [`BucklingError::NoPositiveEigenvalues`] when no eigenvalue
/// survives filtering; emits a warning and returns fewer candidates when
/// the spectrum cannot supply the requested count.
pub fn solve_buckling_modes(
    k0: &DMatrix<f64>,
    delta_k: &DMatrix<f64>,
    nmodes: usize,
) -> BucklingResult<Vec<ModeCandidate>> {
    let n = k0.nrows();
    if n > LARGE_PROBLEM_DOFS {
        log::warn!(
            "Free-DOF count is {n}; the dense eigenvalue solve may take a while"
        );
    }

    let k0_lu = k0.clone().lu();
    let a = k0_lu
        .solve(delta_k)
        .ok_or_else(|| BucklingError::ModelExtraction {
            pass: ExtractionPass::Reference,
            detail: "reference stiffness is singular".into(),
        })?;

    log::info!("Solving the {n}x{n} eigenvalue problem");
    let mu_spectrum = a.complex_eigenvalues();

    // λ = 1/μ; Re(λ) and Re(μ) share their sign, so filtering on μ is
    // equivalent as long as degenerate μ ≈ 0 entries are excluded
    let mut retained: Vec<(f64, Complex<f64>)> = mu_spectrum
        .iter()
        .filter(|mu| mu.norm() > DEGENERATE_MU && mu.re > 0.0)
        .map(|mu| (mu.re / mu.norm_sqr(), *mu))
        .collect();
    retained.sort_by(|a, b| a.0.total_cmp(&b.0));

    if retained.is_empty() {
        return Err(BucklingError::NoPositiveEigenvalues);
    }
    if retained.len() < nmodes {
        log::warn!(
            "Only {} positive eigenvalue(s) available, reducing the mode count from {nmodes}",
            retained.len()
        );
    }

    let target = nmodes.min(retained.len());
    let mut candidates = Vec::with_capacity(target);
    for (idx, (lambda, mu)) in retained.into_iter().enumerate() {
        if candidates.len() == target {
            break;
        }
        let rank = idx + 1;
        match eigenvector_for(&a, mu.re) {
            Some(shape) => candidates.push(ModeCandidate {
                rank,
                lambda,
                shape,
            }),
            None => log::warn!(
                "No real eigenvector for the rank-{rank} eigenvalue {lambda:.6}; skipping it"
            ),
        }
    }

    Ok(candidates)
}

/// Recover the eigenvector of `a` for the eigenvalue `mu` by shifted
/// inverse iteration, or `None` when no real eigenvector exists for it.
///
/// The shift is offset slightly from the eigenvalue so the factored system
/// stays regular; progressively larger offsets are tried if the LU
/// factorization still degenerates.
fn eigenvector_for(a: &DMatrix<f64>, mu: f64) -> Option<DVector<f64>> {
    for offset in SHIFT_OFFSETS {
        let shift = mu * (1.0 + offset) + offset * offset;
        if let Some(shape) = inverse_iteration(a, shift, mu) {
            return Some(shape);
        }
    }
    None
}

fn inverse_iteration(a: &DMatrix<f64>, shift: f64, mu: f64) -> Option<DVector<f64>> {
    let n = a.nrows();
    let mut shifted = a.clone();
    for i in 0..n {
        shifted[(i, i)] -= shift;
    }
    let lu = shifted.lu();

    let mut x = DVector::from_element(n, 1.0 / (n as f64).sqrt());
    for _ in 0..INVERSE_ITERATIONS {
        let y = lu.solve(&x)?;
        let norm = y.norm();
        if !norm.is_finite() || norm < f64::MIN_POSITIVE {
            return None;
        }
        x = y / norm;
    }

    // The iteration never converges onto a complex-conjugate pair, and a
    // shift landing nearer a neighboring eigenvalue pulls the vector to the
    // wrong mode; accept only a vector that actually solves A·x = μ·x
    let scale = mu.abs().max(1.0);
    let rayleigh = x.dot(&(a * &x));
    let residual = (a * &x - rayleigh * &x).norm();
    log::debug!("Inverse iteration at shift {shift:.6e}: residual {residual:.3e}");
    if (rayleigh - mu).abs() > RESIDUAL_TOL * scale || residual > RESIDUAL_TOL * scale {
        return None;
    }
    Some(x)
}
