//! Error types for container and solver operations.
//!
//! Every fallible operation returns [`NumResult<T>`]. Shape and index checks
//! run before any element is touched, so a failed call never leaves its
//! output half-written.

use core::fmt;

use thiserror::Error;

/// Shape of a vector or matrix, carried by errors for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A vector of the given length.
    Vector(usize),
    /// A `rows x cols` matrix.
    Matrix(usize, usize),
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Vector(n) => write!(f, "[{n}]"),
            Shape::Matrix(r, c) => write!(f, "{r}x{c}"),
        }
    }
}

/// Errors from container operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NumError {
    /// Two operands have incompatible shapes for `op`.
    #[error("dimension mismatch in {op}: {lhs} vs {rhs}")]
    DimensionMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// An accessor was called with an index outside the container.
    #[error("index ({}, {}) out of range for {shape}", index.0, index.1)]
    IndexOutOfRange { index: (usize, usize), shape: Shape },
}

/// Convenience alias for `Result<T, NumError>`.
pub type NumResult<T> = Result<T, NumError>;

/// Fail with `DimensionMismatch` unless two vector lengths agree.
#[inline]
pub(crate) fn check_len(op: &'static str, lhs: usize, rhs: usize) -> NumResult<()> {
    if lhs != rhs {
        return Err(NumError::DimensionMismatch {
            op,
            lhs: Shape::Vector(lhs),
            rhs: Shape::Vector(rhs),
        });
    }
    Ok(())
}

/// Unwrap for `std::ops` impls, which cannot return `Result`.
#[inline]
#[track_caller]
pub(crate) fn or_panic<T>(r: NumResult<T>) -> T {
    match r {
        Ok(v) => v,
        Err(e) => panic!("{e}"),
    }
}
