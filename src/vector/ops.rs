use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::elementwise::{for_each_mut, transform1, transform2};
use crate::error::{check_len, or_panic, NumResult};
use crate::traits::Scalar;

use super::Vector;

// ── Checked elementwise arithmetic ──────────────────────────────────

impl<T: Scalar> Vector<T> {
    fn zip_with(&self, rhs: &Self, op: &'static str, f: impl Fn(T, T) -> T + Sync + Send) -> NumResult<Self> {
        check_len(op, self.len(), rhs.len())?;
        let mut out = Self::zeros(self.len());
        transform2(&mut out.data, &self.data, &rhs.data, f)?;
        Ok(out)
    }

    fn zip_assign(&mut self, rhs: &Self, op: &'static str, f: impl Fn(T, T) -> T + Sync + Send) -> NumResult<()> {
        check_len(op, self.len(), rhs.len())?;
        let r = &rhs.data;
        for_each_mut(&mut self.data, |i, a| *a = f(*a, r[i]));
        Ok(())
    }

    /// Elementwise sum. Fails with `DimensionMismatch` on unequal lengths.
    ///
    /// ```
    /// use numcore::Vector;
    /// let a = Vector::from_slice(&[1.0, 2.0]);
    /// let b = Vector::from_slice(&[3.0, 4.0, 5.0]);
    /// assert!(a.try_add(&b).is_err());
    /// ```
    pub fn try_add(&self, rhs: &Self) -> NumResult<Self> {
        self.zip_with(rhs, "add", |a, b| a + b)
    }

    /// Elementwise difference.
    pub fn try_sub(&self, rhs: &Self) -> NumResult<Self> {
        self.zip_with(rhs, "sub", |a, b| a - b)
    }

    /// Elementwise product.
    pub fn try_mul(&self, rhs: &Self) -> NumResult<Self> {
        self.zip_with(rhs, "mul", |a, b| a * b)
    }

    /// Elementwise quotient.
    pub fn try_div(&self, rhs: &Self) -> NumResult<Self> {
        self.zip_with(rhs, "div", |a, b| a / b)
    }

    /// In-place elementwise sum.
    pub fn try_add_assign(&mut self, rhs: &Self) -> NumResult<()> {
        self.zip_assign(rhs, "add_assign", |a, b| a + b)
    }

    /// In-place elementwise difference.
    pub fn try_sub_assign(&mut self, rhs: &Self) -> NumResult<()> {
        self.zip_assign(rhs, "sub_assign", |a, b| a - b)
    }

    /// In-place elementwise product.
    pub fn try_mul_assign(&mut self, rhs: &Self) -> NumResult<()> {
        self.zip_assign(rhs, "mul_assign", |a, b| a * b)
    }

    /// In-place elementwise quotient.
    pub fn try_div_assign(&mut self, rhs: &Self) -> NumResult<()> {
        self.zip_assign(rhs, "div_assign", |a, b| a / b)
    }

    /// Apply `f` to every element, producing a new vector.
    pub fn map(&self, f: impl Fn(T) -> T + Sync + Send) -> Self {
        let mut out = Self::zeros(self.len());
        or_panic(transform1(&mut out.data, &self.data, f));
        out
    }

    fn map_assign(&mut self, f: impl Fn(T) -> T + Sync + Send) {
        for_each_mut(&mut self.data, |_, a| *a = f(*a));
    }
}

// ── Vector ⊕ Vector (elementwise) ───────────────────────────────────

macro_rules! impl_vector_binop {
    ($Op:ident, $op:ident, $OpAssign:ident, $op_assign:ident, $try_op:ident, $try_assign:ident) => {
        impl<T: Scalar> $Op<&Vector<T>> for &Vector<T> {
            type Output = Vector<T>;
            fn $op(self, rhs: &Vector<T>) -> Vector<T> {
                or_panic(self.$try_op(rhs))
            }
        }

        impl<T: Scalar> $Op<&Vector<T>> for Vector<T> {
            type Output = Vector<T>;
            fn $op(mut self, rhs: &Vector<T>) -> Vector<T> {
                or_panic(self.$try_assign(rhs));
                self
            }
        }

        impl<T: Scalar> $Op<Vector<T>> for Vector<T> {
            type Output = Vector<T>;
            fn $op(mut self, rhs: Vector<T>) -> Vector<T> {
                or_panic(self.$try_assign(&rhs));
                self
            }
        }

        impl<T: Scalar> $Op<Vector<T>> for &Vector<T> {
            type Output = Vector<T>;
            fn $op(self, rhs: Vector<T>) -> Vector<T> {
                or_panic(self.$try_op(&rhs))
            }
        }

        impl<T: Scalar> $OpAssign<&Vector<T>> for Vector<T> {
            fn $op_assign(&mut self, rhs: &Vector<T>) {
                or_panic(self.$try_assign(rhs));
            }
        }

        impl<T: Scalar> $OpAssign for Vector<T> {
            fn $op_assign(&mut self, rhs: Vector<T>) {
                or_panic(self.$try_assign(&rhs));
            }
        }
    };
}

impl_vector_binop!(Add, add, AddAssign, add_assign, try_add, try_add_assign);
impl_vector_binop!(Sub, sub, SubAssign, sub_assign, try_sub, try_sub_assign);
impl_vector_binop!(Mul, mul, MulAssign, mul_assign, try_mul, try_mul_assign);
impl_vector_binop!(Div, div, DivAssign, div_assign, try_div, try_div_assign);

// ── Vector ⊕ scalar ─────────────────────────────────────────────────

macro_rules! impl_vector_scalar_op {
    ($Op:ident, $op:ident, $OpAssign:ident, $op_assign:ident, $sym:tt) => {
        impl<T: Scalar> $Op<T> for &Vector<T> {
            type Output = Vector<T>;
            fn $op(self, rhs: T) -> Vector<T> {
                self.map(move |a| a $sym rhs)
            }
        }

        impl<T: Scalar> $Op<T> for Vector<T> {
            type Output = Vector<T>;
            fn $op(mut self, rhs: T) -> Vector<T> {
                self.map_assign(move |a| a $sym rhs);
                self
            }
        }

        impl<T: Scalar> $OpAssign<T> for Vector<T> {
            fn $op_assign(&mut self, rhs: T) {
                self.map_assign(move |a| a $sym rhs);
            }
        }
    };
}

impl_vector_scalar_op!(Add, add, AddAssign, add_assign, +);
impl_vector_scalar_op!(Sub, sub, SubAssign, sub_assign, -);
impl_vector_scalar_op!(Mul, mul, MulAssign, mul_assign, *);
impl_vector_scalar_op!(Div, div, DivAssign, div_assign, /);

// ── scalar * vector (concrete impls) ────────────────────────────────

macro_rules! impl_scalar_mul_vector {
    ($($t:ty),*) => {
        $(
            impl Mul<Vector<$t>> for $t {
                type Output = Vector<$t>;
                fn mul(self, rhs: Vector<$t>) -> Vector<$t> {
                    rhs * self
                }
            }

            impl Mul<&Vector<$t>> for $t {
                type Output = Vector<$t>;
                fn mul(self, rhs: &Vector<$t>) -> Vector<$t> {
                    rhs * self
                }
            }
        )*
    };
}

impl_scalar_mul_vector!(f32, f64, i32, i64);

// ── Negation ────────────────────────────────────────────────────────

impl<T: Scalar> Neg for Vector<T> {
    type Output = Self;

    fn neg(mut self) -> Self {
        self.map_assign(|a| T::zero() - a);
        self
    }
}

impl<T: Scalar> Neg for &Vector<T> {
    type Output = Vector<T>;

    fn neg(self) -> Vector<T> {
        self.map(|a| T::zero() - a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub_roundtrip() {
        let a = Vector::from_slice(&[1.5_f64, -2.0, 3.25]);
        let b = Vector::from_slice(&[0.1_f64, 7.0, -1.0]);
        let c = &(&a + &b) - &b;
        for i in 0..3 {
            assert!((c[i] - a[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn scalar_mul_div_roundtrip() {
        let a = Vector::from_slice(&[1.0_f64, -4.0, 9.5]);
        let s = 3.7;
        let b = (&a * s) / s;
        for i in 0..3 {
            assert!((b[i] - a[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn elementwise_mul_div() {
        let a = Vector::from_slice(&[2.0, 4.0]);
        let b = Vector::from_slice(&[4.0, 8.0]);
        assert_eq!((&a * &b).as_slice(), &[8.0, 32.0]);
        assert_eq!((&b / &a).as_slice(), &[2.0, 2.0]);
    }

    #[test]
    fn compound_assign() {
        let mut a = Vector::from_slice(&[1.0, 2.0]);
        a += &Vector::from_slice(&[1.0, 1.0]);
        a *= 2.0;
        a -= 1.0;
        assert_eq!(a.as_slice(), &[3.0, 5.0]);
    }

    #[test]
    fn scalar_on_left() {
        let a = Vector::from_slice(&[1.0_f32, 2.0]);
        assert_eq!((2.0 * &a).as_slice(), &[2.0, 4.0]);
    }

    #[test]
    fn negation() {
        let a = Vector::from_slice(&[1, -2]);
        assert_eq!((-a).as_slice(), &[-1, 2]);
    }

    #[test]
    fn map_fills_every_element() {
        let n = crate::elementwise::PARALLEL_THRESHOLD + 3;
        let a: Vector<f64> = (0..n).map(|i| i as f64).collect();
        let b = a.map(|x| 2.0 * x + 1.0);
        assert_eq!(b.len(), n);
        assert!(b.iter().enumerate().all(|(i, &x)| x == 2.0 * i as f64 + 1.0));
        assert!(Vector::<f64>::zeros(0).map(|x| x + 1.0).is_empty());
    }

    #[test]
    fn try_add_mismatch() {
        let a = Vector::<f64>::zeros(2);
        let b = Vector::<f64>::zeros(3);
        assert!(a.try_add(&b).is_err());
        let mut c = a.clone();
        assert!(c.try_mul_assign(&b).is_err());
        assert_eq!(c, a);
    }

    #[test]
    #[should_panic(expected = "dimension mismatch in add")]
    fn operator_mismatch_panics() {
        let a = Vector::<f64>::zeros(2);
        let b = Vector::<f64>::zeros(3);
        let _ = &a + &b;
    }
}
