use core::mem;

use tracing::{debug, trace};

use crate::error::NumResult;
use crate::traits::{FloatScalar, LinearOperator};
use crate::vector::{scale_add2, scale_subtract};
use crate::Vector;

use super::{check_system, clamp_denominator, LinearReport, Termination};

/// Settings for the BiCGStab solver.
#[derive(Debug, Clone, Copy)]
pub struct BiCgStabSettings<T> {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Stop once the true `‖b - Ax‖² / N` falls below this.
    pub tol: T,
    /// Smallest magnitude allowed for `r̃·v`, `t·t` and `ω`. Also scales the
    /// half-step shortcut: stop early when `‖s‖₁ < N * denominator_floor`.
    pub denominator_floor: T,
}

impl Default for BiCgStabSettings<f64> {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tol: 1e-20,
            denominator_floor: 1e-16,
        }
    }
}

impl Default for BiCgStabSettings<f32> {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tol: 1e-10,
            denominator_floor: 1e-16,
        }
    }
}

/// Solve `A x = b` for general square `A` with BiCGStab.
///
/// The shadow residual `r̃` is the initial residual and stays fixed.
/// Convergence is judged on the true residual `b - Ax`, recomputed every
/// iteration at the cost of one extra product, rather than on the
/// recurrence residual, which drifts under rounding.
///
/// `x` holds the initial guess on entry and the solution on return.
///
/// # Example
///
/// ```
/// use numcore::{DenseMatrix, Vector};
/// use numcore::solvers::{solve_bicgstab, BiCgStabSettings};
///
/// let a = DenseMatrix::from_rows(2, 2, &[3.0, 1.0, -1.0, 2.0]).unwrap();
/// let b = Vector::from_slice(&[5.0, 0.0]);
/// let mut x = Vector::<f64>::zeros(2);
/// solve_bicgstab(&a, &b, &mut x, &BiCgStabSettings::default()).unwrap();
/// assert!((x[0] - 10.0 / 7.0).abs() < 1e-9);
/// assert!((x[1] - 5.0 / 7.0).abs() < 1e-9);
/// ```
pub fn solve_bicgstab<T: FloatScalar, A: LinearOperator<T>>(
    a: &A,
    b: &Vector<T>,
    x: &mut Vector<T>,
    settings: &BiCgStabSettings<T>,
) -> NumResult<LinearReport<T>> {
    solve_bicgstab_with_monitor(a, b, x, settings, |_, _| true)
}

/// [`solve_bicgstab`] with a per-iteration monitor receiving
/// `(k, ‖b - Ax‖²/N)`.
pub fn solve_bicgstab_with_monitor<T: FloatScalar, A: LinearOperator<T>>(
    a: &A,
    b: &Vector<T>,
    x: &mut Vector<T>,
    settings: &BiCgStabSettings<T>,
    mut monitor: impl FnMut(usize, T) -> bool,
) -> NumResult<LinearReport<T>> {
    check_system("solve_bicgstab", a, b, x)?;
    let n = b.len();
    let scale = n.max(1) as f64;
    let tol = settings.tol.to_wide();
    let floor = settings.denominator_floor.to_wide();
    debug!("BiCGStab: n={n}, tol={tol:.2e}, max_iter={}", settings.max_iter);

    let mut tmp = Vector::zeros(n);
    let mut r = Vector::zeros(n);
    a.apply_into(x, &mut tmp)?;
    scale_subtract(&mut r, b, T::one(), &tmp)?;

    let mut res = r.length_sqr_wide() / scale;
    if res < tol {
        debug!("BiCGStab: initial guess within tolerance");
        return Ok(LinearReport::from_wide(0, res, Termination::Converged));
    }

    let r_hat = r.clone();
    let mut p = Vector::zeros(n);
    let mut v = Vector::zeros(n);
    let mut s = Vector::zeros(n);
    let mut t = Vector::zeros(n);
    let (mut rho_prev, mut alpha, mut omega) = (1.0_f64, 1.0_f64, 1.0_f64);

    for k in 0..settings.max_iter {
        let rho = r_hat.dot_wide(&r)?;
        let beta = (rho / clamp_denominator(rho_prev, floor, "BiCGStab rho"))
            * (alpha / clamp_denominator(omega, floor, "BiCGStab omega"));

        // p = r + beta (p - omega v)
        scale_add2(
            &mut tmp,
            &r,
            T::from_wide(beta),
            &p,
            T::from_wide(-beta * omega),
            &v,
        )?;
        mem::swap(&mut p, &mut tmp);

        a.apply_into(&p, &mut v)?;
        alpha = rho / clamp_denominator(r_hat.dot_wide(&v)?, floor, "BiCGStab r~.v");
        scale_subtract(&mut s, &r, T::from_wide(alpha), &v)?;

        if s.length_l1().to_wide() < scale * floor {
            x.add_scaled(T::from_wide(alpha), &p)?;
            res = true_residual(a, b, x, &mut tmp, &mut r)? / scale;
            if !monitor(k, T::from_wide(res)) {
                debug!("BiCGStab: cancelled at iteration {k}");
                return Ok(LinearReport::from_wide(k + 1, res, Termination::Cancelled));
            }
            debug!("BiCGStab: half-step exit at iteration {k}: |r|^2/N = {res:.6e}");
            return Ok(LinearReport::from_wide(k + 1, res, Termination::Converged));
        }

        a.apply_into(&s, &mut t)?;
        omega = t.dot_wide(&s)? / clamp_denominator(t.length_sqr_wide(), floor, "BiCGStab t.t");

        x.add_scaled(T::from_wide(alpha), &p)?;
        x.add_scaled(T::from_wide(omega), &s)?;
        scale_subtract(&mut r, &s, T::from_wide(omega), &t)?;
        rho_prev = rho;

        // The recurrence keeps `r`; the check uses the true residual in `s`.
        res = true_residual(a, b, x, &mut tmp, &mut s)? / scale;
        trace!("BiCGStab iter {k}: |b - Ax|^2/N = {res:.6e}");

        if !monitor(k, T::from_wide(res)) {
            debug!("BiCGStab: cancelled at iteration {k}");
            return Ok(LinearReport::from_wide(k + 1, res, Termination::Cancelled));
        }
        if res < tol {
            debug!("BiCGStab converged at iteration {k}: |b - Ax|^2/N = {res:.6e}");
            return Ok(LinearReport::from_wide(k + 1, res, Termination::Converged));
        }
    }

    debug!(
        "BiCGStab: no convergence after {} iterations, |b - Ax|^2/N = {res:.6e}",
        settings.max_iter
    );
    Ok(LinearReport::from_wide(settings.max_iter, res, Termination::MaxIterations))
}

/// `‖b - Ax‖²`, using `ax` and `out` as scratch.
fn true_residual<T: FloatScalar, A: LinearOperator<T>>(
    a: &A,
    b: &Vector<T>,
    x: &Vector<T>,
    ax: &mut Vector<T>,
    out: &mut Vector<T>,
) -> NumResult<f64> {
    a.apply_into(x, ax)?;
    scale_subtract(out, b, T::one(), ax)?;
    Ok(out.length_sqr_wide())
}
