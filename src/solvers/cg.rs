use core::mem;

use tracing::{debug, trace};

use crate::error::NumResult;
use crate::traits::{FloatScalar, LinearOperator};
use crate::vector::{scale_add, scale_subtract};
use crate::Vector;

use super::{check_system, clamp_denominator, LinearReport, Termination};

/// Settings for the conjugate gradient solver.
#[derive(Debug, Clone, Copy)]
pub struct CgSettings<T> {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Stop once `‖r‖² / N` falls below this.
    pub tol: T,
    /// Smallest magnitude allowed for `pᵀAp`.
    pub denominator_floor: T,
}

impl Default for CgSettings<f64> {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tol: 1e-20,
            denominator_floor: 1e-16,
        }
    }
}

impl Default for CgSettings<f32> {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tol: 1e-10,
            denominator_floor: 1e-16,
        }
    }
}

/// Solve `A x = b` for symmetric positive-definite `A` by unpreconditioned
/// conjugate gradient.
///
/// `x` holds the initial guess on entry and the solution on return. Fails
/// only if `A` is not square or `b`, `x` do not match its dimension.
///
/// # Example
///
/// ```
/// use numcore::{SparseMatrix, Vector};
/// use numcore::solvers::{solve_cg, CgSettings, Termination};
///
/// let a = SparseMatrix::from_triplets(2, 2, &[(0, 0, 4.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 3.0)]).unwrap();
/// let b = Vector::from_slice(&[1.0, 2.0]);
/// let mut x = Vector::<f64>::zeros(2);
/// let report = solve_cg(&a, &b, &mut x, &CgSettings::default()).unwrap();
/// assert_eq!(report.termination, Termination::Converged);
/// assert!((x[0] - 1.0 / 11.0).abs() < 1e-9);
/// assert!((x[1] - 7.0 / 11.0).abs() < 1e-9);
/// ```
pub fn solve_cg<T: FloatScalar, A: LinearOperator<T>>(
    a: &A,
    b: &Vector<T>,
    x: &mut Vector<T>,
    settings: &CgSettings<T>,
) -> NumResult<LinearReport<T>> {
    solve_cg_with_monitor(a, b, x, settings, |_, _| true)
}

/// [`solve_cg`] with a per-iteration monitor.
///
/// `monitor(k, ‖r‖²/N)` runs after iteration `k` updates `x`; returning
/// `false` stops with [`Termination::Cancelled`].
pub fn solve_cg_with_monitor<T: FloatScalar, A: LinearOperator<T>>(
    a: &A,
    b: &Vector<T>,
    x: &mut Vector<T>,
    settings: &CgSettings<T>,
    mut monitor: impl FnMut(usize, T) -> bool,
) -> NumResult<LinearReport<T>> {
    check_system("solve_cg", a, b, x)?;
    let n = b.len();
    let scale = n.max(1) as f64;
    let tol = settings.tol.to_wide();
    let floor = settings.denominator_floor.to_wide();
    debug!("CG: n={n}, tol={tol:.2e}, max_iter={}", settings.max_iter);

    let mut ap = Vector::zeros(n);
    let mut r = Vector::zeros(n);
    let mut r_next = Vector::zeros(n);

    // r = b - A x, p = r
    a.apply_into(x, &mut ap)?;
    scale_subtract(&mut r, b, T::one(), &ap)?;
    let mut p = r.clone();
    let mut delta = r.length_sqr_wide();

    if delta / scale < tol {
        debug!("CG: initial guess within tolerance");
        return Ok(LinearReport::from_wide(0, delta / scale, Termination::Converged));
    }

    for k in 0..settings.max_iter {
        a.apply_into(&p, &mut ap)?;
        let p_ap = clamp_denominator(p.dot_wide(&ap)?, floor, "CG p.Ap");
        let alpha = T::from_wide(delta / p_ap);

        x.add_scaled(alpha, &p)?;
        scale_subtract(&mut r_next, &r, alpha, &ap)?;

        let delta_next = r_next.length_sqr_wide();
        let res = delta_next / scale;
        trace!("CG iter {k}: |r|^2/N = {res:.6e}");

        if !monitor(k, T::from_wide(res)) {
            debug!("CG: cancelled at iteration {k}");
            return Ok(LinearReport::from_wide(k + 1, res, Termination::Cancelled));
        }
        if res < tol || delta_next == 0.0 {
            debug!("CG converged at iteration {k}: |r|^2/N = {res:.6e}");
            return Ok(LinearReport::from_wide(k + 1, res, Termination::Converged));
        }

        // p = r' + beta p, built in the spare buffer then swapped in
        let beta = T::from_wide(delta_next / delta);
        scale_add(&mut ap, &r_next, beta, &p)?;
        mem::swap(&mut p, &mut ap);
        mem::swap(&mut r, &mut r_next);
        delta = delta_next;
    }

    let res = delta / scale;
    debug!("CG: no convergence after {} iterations, |r|^2/N = {res:.6e}", settings.max_iter);
    Ok(LinearReport::from_wide(settings.max_iter, res, Termination::MaxIterations))
}
