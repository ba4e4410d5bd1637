use core::fmt::Debug;
use num_traits::{Float, Num, NumCast};

/// Trait for types that can be used as vector and matrix elements.
///
/// Besides field-like arithmetic and ordering, every element converts to and
/// from a wide `f64` accumulator. Summing reductions (`dot`, norms, `mean`,
/// matrix-vector row sums) accumulate through [`Scalar::to_wide`] so that
/// `f32` containers keep double-precision partial sums.
///
/// Implemented for `f32`, `f64`, `i32` and `i64`.
pub trait Scalar: Copy + PartialOrd + Debug + Num + NumCast + Send + Sync + 'static {
    /// Absolute value.
    fn magnitude(self) -> Self;

    /// Widen into the `f64` accumulator.
    fn to_wide(self) -> f64;

    /// Narrow an accumulated `f64` back into `Self`.
    fn from_wide(w: f64) -> Self;
}

macro_rules! impl_scalar_float {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                #[inline] fn magnitude(self) -> $t { Float::abs(self) }
                #[inline] fn to_wide(self) -> f64 { self as f64 }
                #[inline] fn from_wide(w: f64) -> $t { w as $t }
            }
        )*
    };
}

macro_rules! impl_scalar_int {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                #[inline] fn magnitude(self) -> $t { <$t>::abs(self) }
                #[inline] fn to_wide(self) -> f64 { self as f64 }
                #[inline] fn from_wide(w: f64) -> $t { w as $t }
            }
        )*
    };
}

impl_scalar_float!(f32, f64);
impl_scalar_int!(i32, i64);

/// Trait for floating-point elements.
///
/// Required by the solvers and by anything that needs `sqrt`.
pub trait FloatScalar: Scalar + Float {}

impl<T: Scalar + Float> FloatScalar for T {}

/// Square linear operator `y = A x`.
///
/// Lets the Krylov solvers run against any matrix representation that can
/// write a matrix-vector product into a caller-owned buffer.
pub trait LinearOperator<T> {
    /// Number of rows.
    fn nrows(&self) -> usize;

    /// Number of columns.
    fn ncols(&self) -> usize;

    /// Write `A x` into `out`.
    ///
    /// Fails with `DimensionMismatch` if `x.len() != ncols` or
    /// `out.len() != nrows`.
    fn apply_into(
        &self,
        x: &crate::Vector<T>,
        out: &mut crate::Vector<T>,
    ) -> crate::NumResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_roundtrip() {
        assert_eq!(f32::from_wide(1.5f32.to_wide()), 1.5);
        assert_eq!(i64::from_wide((-7i64).to_wide()), -7);
    }

    #[test]
    fn magnitude_for_all_impls() {
        assert_eq!(Scalar::magnitude(-2.0_f64), 2.0);
        assert_eq!(Scalar::magnitude(-2.0_f32), 2.0);
        assert_eq!(Scalar::magnitude(-3_i32), 3);
    }

    #[test]
    fn f32_accumulates_wide() {
        // 1 + 1e-8 is lost in f32 but survives the f64 accumulator.
        let wide = 1.0f32.to_wide() + 1e-8f32.to_wide();
        assert!(wide > 1.0);
    }
}
