use alloc::vec::Vec;

use tracing::{debug, trace};

use crate::error::NumResult;
use crate::traits::FloatScalar;
use crate::Vector;

use super::{
    solve_bicgstab, BiCgStabSettings, Linearization, NonlinearReport, SparseProblem, StepRecord,
    Termination,
};

/// Settings for Levenberg-Marquardt least-squares optimization.
#[derive(Debug, Clone, Copy)]
pub struct LmSettings<T> {
    /// Maximum number of outer iterations. Rejected steps do not count.
    pub max_iter: usize,
    /// Stop once `‖Jᵀe‖∞` falls to this.
    pub grad_tol: T,
    /// Stop once `‖δ‖ <= step_tol * (‖p‖ + step_tol)`.
    pub step_tol: T,
    /// Initial damping is `tau * max(diag(JᵀJ))`.
    pub tau: T,
    /// Inner solver for the damped normal equations.
    pub linear: BiCgStabSettings<T>,
}

impl Default for LmSettings<f64> {
    fn default() -> Self {
        Self {
            max_iter: 200,
            grad_tol: 1e-10,
            step_tol: 1e-12,
            tau: 1e-3,
            linear: BiCgStabSettings::default(),
        }
    }
}

impl Default for LmSettings<f32> {
    fn default() -> Self {
        Self {
            max_iter: 200,
            grad_tol: 1e-5,
            step_tol: 1e-6,
            tau: 1e-3,
            linear: BiCgStabSettings::default(),
        }
    }
}

/// Minimise `‖e(p)‖²` with Levenberg-Marquardt.
///
/// Each outer iteration solves `(JᵀJ + μI) δ = Jᵀe` with BiCGStab and
/// accepts the step when the gain ratio
/// `ρ = (‖e‖² - ‖e(p + δ)‖²) / δ·(μδ + Jᵀe)` is positive. Accepted steps
/// shrink the damping by `max(1/3, 1 - (2ρ - 1)³)`; rejected steps multiply
/// it by `ν` and double `ν`, then retry without advancing the iteration
/// count.
///
/// `p` holds the initial guess on entry and the estimate on return. Fails
/// only when the problem returns a residual or Jacobian of inconsistent
/// shape.
pub fn levenberg_marquardt<T: FloatScalar, P: SparseProblem<T>>(
    problem: &mut P,
    p: &mut Vector<T>,
    settings: &LmSettings<T>,
) -> NumResult<NonlinearReport<T>> {
    levenberg_marquardt_with_monitor(problem, p, settings, |_, _| true)
}

/// [`levenberg_marquardt`] with a monitor receiving `(iteration, cost)`.
pub fn levenberg_marquardt_with_monitor<T: FloatScalar, P: SparseProblem<T>>(
    problem: &mut P,
    p: &mut Vector<T>,
    settings: &LmSettings<T>,
    mut monitor: impl FnMut(usize, T) -> bool,
) -> NumResult<NonlinearReport<T>> {
    const OP: &str = "levenberg_marquardt";
    problem.reset();

    let e = problem.residual(p);
    let mut lin = Linearization::at(problem, p, e, OP)?;
    let mut history = Vec::new();

    let one = T::one();
    let two = one + one;
    let third = one / (two + one);
    let mut mu = settings.tau * lin.a.diagonal_values().max().unwrap_or_else(T::zero);
    let mut nu = two;
    debug!(
        "LM: n={}, m={}, cost={:.6e}, mu={:.3e}",
        p.len(),
        lin.j.nrows(),
        lin.cost.to_wide(),
        mu.to_wide()
    );

    let finish = |iterations, lin: &Linearization<T>, termination, history| {
        let report = NonlinearReport {
            iterations,
            cost: lin.cost,
            gradient_inf_norm: lin.g.length_inf(),
            termination,
            history,
        };
        debug!(
            "LM: {:?} after {iterations} iterations, cost={:.6e}",
            report.termination,
            report.cost.to_wide()
        );
        report
    };

    if lin.g.length_inf() <= settings.grad_tol {
        return Ok(finish(0, &lin, Termination::GradientTolerance, history));
    }

    let mut delta = Vector::zeros(p.len());
    for k in 1..=settings.max_iter {
        // Cancelled before iteration k took any step.
        if !monitor(k, lin.cost) {
            return Ok(finish(k - 1, &lin, Termination::Cancelled, history));
        }

        loop {
            let mut damped = lin.a.clone();
            damped.add_diagonal(mu);
            delta.set(T::zero());
            solve_bicgstab(&damped, &lin.g, &mut delta, &settings.linear)?;

            let step_norm = delta.length();
            let limit = settings.step_tol * (p.length() + settings.step_tol);
            // Also catches a NaN step once the damping overflows.
            if !(step_norm > limit) {
                return Ok(finish(k, &lin, Termination::StepTolerance, history));
            }

            let p_new = &*p + &delta;
            let e_new = problem.residual(&p_new);
            let cost_new = e_new.length_sqr();

            // δ·(μδ + g)
            let predicted = mu * delta.length_sqr() + delta.dot(&lin.g)?;
            let rho = (lin.cost - cost_new) / predicted;
            let accepted = rho > T::zero();
            trace!(
                "LM iter {k}: |d|={:.3e}, cost={:.6e}, rho={:.3e}, mu={:.3e}, accepted={accepted}",
                step_norm.to_wide(),
                cost_new.to_wide(),
                rho.to_wide(),
                mu.to_wide()
            );
            history.push(StepRecord {
                iteration: k,
                cost: cost_new,
                step_norm,
                radius: mu,
                accepted,
                gain_ratio: rho,
            });

            if accepted {
                *p = p_new;
                lin = Linearization::at(problem, p, e_new, OP)?;
                let c = one - (two * rho - one).powi(3);
                mu = mu * c.max(third);
                nu = two;
                if lin.g.length_inf() <= settings.grad_tol {
                    return Ok(finish(k, &lin, Termination::GradientTolerance, history));
                }
                break;
            }

            mu = mu * nu;
            nu = nu * two;
            if !monitor(k, lin.cost) {
                return Ok(finish(k, &lin, Termination::Cancelled, history));
            }
        }
    }

    Ok(finish(settings.max_iter, &lin, Termination::MaxIterations, history))
}
