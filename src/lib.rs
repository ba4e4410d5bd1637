//! # numcore
//!
//! Generic dense and sparse vectors and matrices with iterative solvers for
//! linear systems and nonlinear least squares.
//!
//! ## Quick start
//!
//! ```
//! use numcore::{SparseMatrix, Vector};
//! use numcore::solvers::{solve_cg, CgSettings};
//!
//! // Solve a symmetric positive-definite system Ax = b
//! let mut a = SparseMatrix::new(2, 2);
//! a.set(0, 0, 4.0).unwrap();
//! a.set(0, 1, 1.0).unwrap();
//! a.set(1, 0, 1.0).unwrap();
//! a.set(1, 1, 3.0).unwrap();
//! let b = Vector::from_slice(&[1.0, 2.0]);
//! let mut x = Vector::zeros(2);
//! solve_cg(&a, &b, &mut x, &CgSettings::default()).unwrap(); // x = [1/11, 7/11]
//! ```
//!
//! ## Modules
//!
//! - [`elementwise`]: Apply a function across equal-length slices, in
//!   parallel above [`elementwise::PARALLEL_THRESHOLD`] with the `parallel`
//!   feature. Every vector operator and per-row sparse loop runs through it.
//!
//! - [`vector`]: Heap-allocated [`Vector<T>`] with elementwise arithmetic,
//!   order statistics, norms, and allocation-free fused updates
//!   ([`vector::scale_add`] and friends) for solver inner loops.
//!
//! - [`dense`]: Row-major [`DenseMatrix<T>`] with bounds-checked access,
//!   transpose, and matrix/vector products.
//!
//! - [`sparse`]: [`SparseMatrix<T>`], one ordered `column -> value` map per
//!   row. Absent entries read as zero.
//!
//! - [`solvers`]: Conjugate gradient and BiCGStab over any
//!   [`LinearOperator`]; Levenberg-Marquardt and dog-leg over a
//!   [`SparseProblem`](solvers::SparseProblem).
//!
//! - [`traits`]: Element traits:
//!   - [`Scalar`]: all elements (`f32`, `f64`, `i32`, `i64`), with an `f64`
//!     accumulator used by every summing reduction
//!   - [`FloatScalar`]: real floats (`Scalar + Float`), used by the solvers
//!   - [`LinearOperator`]: `y = A x` into a caller-owned buffer
//!
//! ## Errors
//!
//! Fallible operations return [`NumResult`]. Shape errors are
//! [`NumError::DimensionMismatch`] and bad indices are
//! [`NumError::IndexOutOfRange`]; both are detected before anything is
//! written. The `std::ops` operators panic with the same message.
//!
//! ## Cargo features
//!
//! | Feature    | Default | Description |
//! |------------|---------|-------------|
//! | `parallel` | yes     | rayon-backed elementwise engine |
//! | `serde`    | yes     | `Serialize` / `Deserialize` for vectors and matrices |

extern crate alloc;

pub mod dense;
pub mod elementwise;
pub mod error;
#[cfg(feature = "serde")]
mod persist;
pub mod solvers;
pub mod sparse;
pub mod traits;
pub mod vector;

pub use dense::DenseMatrix;
pub use error::{NumError, NumResult, Shape};
pub use sparse::SparseMatrix;
pub use traits::{FloatScalar, LinearOperator, Scalar};
pub use vector::Vector;
