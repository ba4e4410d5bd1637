use alloc::vec::Vec;

use tracing::{debug, trace};

use crate::error::NumResult;
use crate::traits::FloatScalar;
use crate::Vector;

use super::{
    clamp_denominator, solve_bicgstab, BiCgStabSettings, Linearization, NonlinearReport,
    SparseProblem, StepRecord, Termination,
};

/// Settings for the dog-leg trust-region solver.
#[derive(Debug, Clone, Copy)]
pub struct DogLegSettings<T> {
    /// Maximum number of outer iterations. Rejected steps do not count.
    pub max_iter: usize,
    /// Stop once `‖Jᵀe‖∞` falls to this.
    pub grad_tol: T,
    /// Stop once the trust radius `Δ <= step_tol * (‖p‖ + step_tol)`.
    pub step_tol: T,
    /// Starting trust radius.
    pub initial_radius: T,
    /// Shrink the radius when the gain ratio falls below this.
    pub shrink_below: T,
    /// Grow the radius when the gain ratio exceeds this.
    pub grow_above: T,
    /// Radius multiplier on a poor step.
    pub shrink_factor: T,
    /// Radius multiplier on a good step.
    pub grow_factor: T,
    /// Smallest magnitude allowed for `‖Jg‖²` in the steepest-descent step.
    pub denominator_floor: T,
    /// Inner solver for the Gauss-Newton step.
    pub linear: BiCgStabSettings<T>,
}

impl Default for DogLegSettings<f64> {
    fn default() -> Self {
        Self {
            max_iter: 200,
            grad_tol: 1e-10,
            step_tol: 1e-12,
            initial_radius: 1.0,
            shrink_below: 0.25,
            grow_above: 0.75,
            shrink_factor: 0.1,
            grow_factor: 2.0,
            denominator_floor: 1e-16,
            linear: BiCgStabSettings::default(),
        }
    }
}

impl Default for DogLegSettings<f32> {
    fn default() -> Self {
        Self {
            max_iter: 200,
            grad_tol: 1e-5,
            step_tol: 1e-6,
            initial_radius: 1.0,
            shrink_below: 0.25,
            grow_above: 0.75,
            shrink_factor: 0.1,
            grow_factor: 2.0,
            denominator_floor: 1e-16,
            linear: BiCgStabSettings::default(),
        }
    }
}

/// Minimise `‖e(p)‖²` with Powell's dog-leg trust-region method.
///
/// Each outer iteration takes the steepest-descent step
/// `δ_sd = (‖g‖² / ‖Jg‖²) g` and, only if needed, the Gauss-Newton step
/// solving `JᵀJ δ_gn = g` with BiCGStab (at most once per iteration):
///
/// - `‖δ_sd‖ >= Δ`: steepest descent scaled to the boundary
/// - `‖δ_gn‖ <= Δ`: the full Gauss-Newton step
/// - otherwise the point where the segment `δ_sd → δ_gn` crosses the
///   boundary
///
/// The gain ratio is measured against the model reduction
/// `2gᵀδ - δᵀJᵀJδ`. Far from the optimum steps are clipped to `Δ`; near it
/// the Gauss-Newton step fits inside the region and convergence is fast.
pub fn dog_leg<T: FloatScalar, P: SparseProblem<T>>(
    problem: &mut P,
    p: &mut Vector<T>,
    settings: &DogLegSettings<T>,
) -> NumResult<NonlinearReport<T>> {
    dog_leg_with_monitor(problem, p, settings, |_, _| true)
}

/// [`dog_leg`] with a monitor receiving `(iteration, cost)`.
pub fn dog_leg_with_monitor<T: FloatScalar, P: SparseProblem<T>>(
    problem: &mut P,
    p: &mut Vector<T>,
    settings: &DogLegSettings<T>,
    mut monitor: impl FnMut(usize, T) -> bool,
) -> NumResult<NonlinearReport<T>> {
    const OP: &str = "dog_leg";
    problem.reset();

    let e = problem.residual(p);
    let mut lin = Linearization::at(problem, p, e, OP)?;
    let mut history = Vec::new();
    let mut radius = settings.initial_radius;
    let floor = settings.denominator_floor.to_wide();
    debug!(
        "dog-leg: n={}, cost={:.6e}, radius={:.3e}",
        p.len(),
        lin.cost.to_wide(),
        radius.to_wide()
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
            "dog-leg: {:?} after {iterations} iterations, cost={:.6e}",
            report.termination,
            report.cost.to_wide()
        );
        report
    };

    if lin.g.length_inf() <= settings.grad_tol {
        return Ok(finish(0, &lin, Termination::GradientTolerance, history));
    }

    for k in 1..=settings.max_iter {
        // Cancelled before iteration k took any step.
        if !monitor(k, lin.cost) {
            return Ok(finish(k - 1, &lin, Termination::Cancelled, history));
        }

        // Cauchy point along g
        let jg = lin.j.try_mul_vec(&lin.g)?;
        let alpha = lin.g.length_sqr_wide() / clamp_denominator(jg.length_sqr_wide(), floor, "dog-leg |Jg|^2");
        let sd = &lin.g * T::from_wide(alpha);
        let sd_norm = sd.length();
        let mut gn: Option<Vector<T>> = None;

        loop {
            if radius <= settings.step_tol * (p.length() + settings.step_tol) {
                return Ok(finish(k, &lin, Termination::StepTolerance, history));
            }

            let delta = if sd_norm >= radius {
                &sd * (radius / sd_norm)
            } else {
                let gn_step = match gn.take() {
                    Some(v) => v,
                    None => gauss_newton(&lin, settings)?,
                };
                let step = if gn_step.length() <= radius {
                    gn_step.clone()
                } else {
                    blend(&sd, &gn_step, radius)?
                };
                gn = Some(gn_step);
                step
            };
            let step_norm = delta.length();

            let p_new = &*p + &delta;
            let e_new = problem.residual(&p_new);
            let cost_new = e_new.length_sqr();

            // 2gᵀδ - δᵀAδ
            let a_delta = lin.a.try_mul_vec(&delta)?;
            let model = T::from_wide(2.0 * delta.dot_wide(&lin.g)? - delta.dot_wide(&a_delta)?);
            let rho = (lin.cost - cost_new) / model;
            let accepted = rho > T::zero();
            trace!(
                "dog-leg iter {k}: |d|={:.3e}, cost={:.6e}, rho={:.3e}, radius={:.3e}, accepted={accepted}",
                step_norm.to_wide(),
                cost_new.to_wide(),
                rho.to_wide(),
                radius.to_wide()
            );
            history.push(StepRecord {
                iteration: k,
                cost: cost_new,
                step_norm,
                radius,
                accepted,
                gain_ratio: rho,
            });

            // NaN compares false both ways and lands in the shrink branch.
            if !(rho >= settings.shrink_below) {
                radius = radius * settings.shrink_factor;
            } else if rho > settings.grow_above {
                radius = radius * settings.grow_factor;
            }

            if accepted {
                *p = p_new;
                lin = Linearization::at(problem, p, e_new, OP)?;
                if lin.g.length_inf() <= settings.grad_tol {
                    return Ok(finish(k, &lin, Termination::GradientTolerance, history));
                }
                break;
            }

            if !monitor(k, lin.cost) {
                return Ok(finish(k, &lin, Termination::Cancelled, history));
            }
        }
    }

    Ok(finish(settings.max_iter, &lin, Termination::MaxIterations, history))
}

/// Gauss-Newton step: solve `JᵀJ δ = g` from zero.
fn gauss_newton<T: FloatScalar>(lin: &Linearization<T>, settings: &DogLegSettings<T>) -> NumResult<Vector<T>> {
    let mut v = Vector::zeros(lin.g.len());
    solve_bicgstab(&lin.a, &lin.g, &mut v, &settings.linear)?;
    Ok(v)
}

/// Point where the segment `a → b` leaves the ball of the given radius.
///
/// Requires `‖a‖ < radius < ‖b‖`. Solves `‖a + β(b - a)‖ = radius` for
/// `β ∈ (0, 1)`, picking the form of the quadratic root that avoids
/// cancellation.
fn blend<T: FloatScalar>(a: &Vector<T>, b: &Vector<T>, radius: T) -> NumResult<Vector<T>> {
    let d = b.try_sub(a)?;
    let dd = d.length_sqr_wide();
    let c = a.dot_wide(&d)?;
    let aa = a.length_sqr_wide();
    let r2 = radius.to_wide() * radius.to_wide();
    let root = (c * c + dd * (r2 - aa)).sqrt();
    let beta = if c <= 0.0 {
        (root - c) / dd
    } else {
        (r2 - aa) / (c + root)
    };
    let mut out = a.clone();
    out.add_scaled(T::from_wide(beta), &d)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_lands_on_boundary() {
        let a = Vector::from_slice(&[0.5_f64, 0.0]);
        let b = Vector::from_slice(&[3.0, 4.0]);
        let d = b.try_sub(&a).unwrap();
        for radius in [1.0, 2.5, 4.9] {
            let x = blend(&a, &b, radius).unwrap();
            assert!((x.length() - radius).abs() < 1e-12);
            // x - a is parallel to b - a
            let xa = x.try_sub(&a).unwrap();
            assert!((xa[0] * d[1] - xa[1] * d[0]).abs() < 1e-12);
        }
    }

    #[test]
    fn blend_negative_projection() {
        // a·(b - a) < 0 exercises the other root form.
        let a = Vector::from_slice(&[0.9_f64, 0.0]);
        let b = Vector::from_slice(&[-1.0, 2.0]);
        let x = blend(&a, &b, 1.0).unwrap();
        assert!((x.length() - 1.0).abs() < 1e-12);
    }
}
