use crate::{SparseMatrix, Vector};

/// A nonlinear least-squares problem with a sparse Jacobian.
///
/// The solvers minimise `‖e(p)‖²` where `e` is the residual. Sign
/// convention:
///
/// - [`residual`](Self::residual) returns `target - f(p)`, one entry per
///   observation (length `M`)
/// - [`differentiate`](Self::differentiate) returns `∂f/∂p`, the `M x N`
///   Jacobian of the model (not of the residual)
///
/// With that convention the solvers step `p ← p + δ` with `δ` solving the
/// (damped) normal equations `JᵀJ δ = Jᵀe`.
///
/// # Example
///
/// ```
/// use numcore::{SparseMatrix, Vector};
/// use numcore::solvers::SparseProblem;
///
/// /// Fit `y = m * x` through the origin.
/// struct Line {
///     x: Vec<f64>,
///     y: Vec<f64>,
/// }
///
/// impl SparseProblem<f64> for Line {
///     fn residual(&mut self, p: &Vector<f64>) -> Vector<f64> {
///         self.x.iter().zip(&self.y).map(|(x, y)| y - p[0] * x).collect()
///     }
///
///     fn differentiate(&mut self, _p: &Vector<f64>) -> SparseMatrix<f64> {
///         let mut j = SparseMatrix::new(self.x.len(), 1);
///         for (i, &x) in self.x.iter().enumerate() {
///             j.set(i, 0, x).unwrap();
///         }
///         j
///     }
/// }
///
/// let mut line = Line { x: vec![1.0, 2.0], y: vec![2.0, 4.0] };
/// let e = line.residual(&Vector::from_slice(&[1.5]));
/// assert_eq!(e.as_slice(), &[0.5, 1.0]);
/// ```
pub trait SparseProblem<T> {
    /// Residual `target - f(p)`.
    fn residual(&mut self, p: &Vector<T>) -> Vector<T>;

    /// Model Jacobian `∂f/∂p` at `p`.
    fn differentiate(&mut self, p: &Vector<T>) -> SparseMatrix<T>;

    /// Clear cached state. Called once at the start of every solve.
    fn reset(&mut self) {}
}
