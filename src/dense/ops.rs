use alloc::vec::Vec;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::error::{or_panic, NumError, NumResult};
use crate::traits::{LinearOperator, Scalar};
use crate::Vector;

use super::DenseMatrix;

// ── Checked matrix arithmetic ───────────────────────────────────────

impl<T: Scalar> DenseMatrix<T> {
    fn check_same_shape(&self, rhs: &Self, op: &'static str) -> NumResult<()> {
        if (self.nrows, self.ncols) != (rhs.nrows, rhs.ncols) {
            return Err(NumError::DimensionMismatch {
                op,
                lhs: self.shape(),
                rhs: rhs.shape(),
            });
        }
        Ok(())
    }

    /// Elementwise sum.
    pub fn try_add(&self, rhs: &Self) -> NumResult<Self> {
        self.check_same_shape(rhs, "add")?;
        let rows = self
            .rows
            .iter()
            .zip(&rhs.rows)
            .map(|(a, b)| a.try_add(b))
            .collect::<NumResult<Vec<_>>>()?;
        Ok(Self {
            rows,
            nrows: self.nrows,
            ncols: self.ncols,
        })
    }

    /// Elementwise difference.
    pub fn try_sub(&self, rhs: &Self) -> NumResult<Self> {
        self.check_same_shape(rhs, "sub")?;
        let rows = self
            .rows
            .iter()
            .zip(&rhs.rows)
            .map(|(a, b)| a.try_sub(b))
            .collect::<NumResult<Vec<_>>>()?;
        Ok(Self {
            rows,
            nrows: self.nrows,
            ncols: self.ncols,
        })
    }

    /// Matrix product: (M×N) * (N×P) → (M×P).
    ///
    /// Fails with `DimensionMismatch` when the inner dimensions differ.
    ///
    /// ```
    /// use numcore::DenseMatrix;
    /// let a = DenseMatrix::from_rows(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    /// let b = DenseMatrix::from_rows(2, 2, &[5.0, 6.0, 7.0, 8.0]).unwrap();
    /// let c = a.try_mul(&b).unwrap();
    /// assert_eq!(c[(0, 0)], 19.0);
    /// assert_eq!(c[(1, 1)], 50.0);
    /// ```
    pub fn try_mul(&self, rhs: &Self) -> NumResult<Self> {
        if self.ncols != rhs.nrows {
            return Err(NumError::DimensionMismatch {
                op: "mul",
                lhs: self.shape(),
                rhs: rhs.shape(),
            });
        }
        let p = rhs.ncols;
        let mut out = Self::zero(self.nrows, p);
        for (out_row, a_row) in out.rows.iter_mut().zip(&self.rows) {
            for (k, &a_ik) in a_row.iter().enumerate() {
                out_row.add_scaled(a_ik, &rhs.rows[k])?;
            }
        }
        Ok(out)
    }

    /// Matrix-vector product `A x`.
    pub fn try_mul_vec(&self, x: &Vector<T>) -> NumResult<Vector<T>> {
        let mut out = Vector::zeros(self.nrows);
        self.mul_vec_into(x, &mut out)?;
        Ok(out)
    }

    /// Write `A x` into `out` without allocating.
    pub fn mul_vec_into(&self, x: &Vector<T>, out: &mut Vector<T>) -> NumResult<()> {
        if x.len() != self.ncols {
            return Err(NumError::DimensionMismatch {
                op: "mul_vec",
                lhs: self.shape(),
                rhs: x.shape(),
            });
        }
        if out.len() != self.nrows {
            return Err(NumError::DimensionMismatch {
                op: "mul_vec",
                lhs: self.shape(),
                rhs: out.shape(),
            });
        }
        for (o, row) in out.data.iter_mut().zip(&self.rows) {
            *o = T::from_wide(row.dot_wide(x)?);
        }
        Ok(())
    }

    /// Scale row `i` by `d[i]`.
    ///
    /// This is what `&d * &m` computes: the vector acts as a diagonal matrix
    /// on the left, not as a row vector.
    pub fn try_scale_rows(&self, d: &Vector<T>) -> NumResult<Self> {
        if d.len() != self.nrows {
            return Err(NumError::DimensionMismatch {
                op: "scale_rows",
                lhs: d.shape(),
                rhs: self.shape(),
            });
        }
        Ok(Self {
            rows: self.rows.iter().zip(d.iter()).map(|(r, &s)| r * s).collect(),
            nrows: self.nrows,
            ncols: self.ncols,
        })
    }

    fn map_rows(&self, f: impl Fn(&Vector<T>) -> Vector<T>) -> Self {
        Self {
            rows: self.rows.iter().map(f).collect(),
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

impl<T: Scalar> LinearOperator<T> for DenseMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }

    fn ncols(&self) -> usize {
        self.ncols
    }

    fn apply_into(&self, x: &Vector<T>, out: &mut Vector<T>) -> NumResult<()> {
        self.mul_vec_into(x, out)
    }
}

// ── Matrix ⊕ Matrix ─────────────────────────────────────────────────

impl<T: Scalar> Add<&DenseMatrix<T>> for &DenseMatrix<T> {
    type Output = DenseMatrix<T>;
    fn add(self, rhs: &DenseMatrix<T>) -> DenseMatrix<T> {
        or_panic(self.try_add(rhs))
    }
}

impl<T: Scalar> Add for DenseMatrix<T> {
    type Output = DenseMatrix<T>;
    fn add(self, rhs: DenseMatrix<T>) -> DenseMatrix<T> {
        &self + &rhs
    }
}

impl<T: Scalar> AddAssign<&DenseMatrix<T>> for DenseMatrix<T> {
    fn add_assign(&mut self, rhs: &DenseMatrix<T>) {
        *self = &*self + rhs;
    }
}

impl<T: Scalar> Sub<&DenseMatrix<T>> for &DenseMatrix<T> {
    type Output = DenseMatrix<T>;
    fn sub(self, rhs: &DenseMatrix<T>) -> DenseMatrix<T> {
        or_panic(self.try_sub(rhs))
    }
}

impl<T: Scalar> Sub for DenseMatrix<T> {
    type Output = DenseMatrix<T>;
    fn sub(self, rhs: DenseMatrix<T>) -> DenseMatrix<T> {
        &self - &rhs
    }
}

impl<T: Scalar> SubAssign<&DenseMatrix<T>> for DenseMatrix<T> {
    fn sub_assign(&mut self, rhs: &DenseMatrix<T>) {
        *self = &*self - rhs;
    }
}

impl<T: Scalar> Mul<&DenseMatrix<T>> for &DenseMatrix<T> {
    type Output = DenseMatrix<T>;
    fn mul(self, rhs: &DenseMatrix<T>) -> DenseMatrix<T> {
        or_panic(self.try_mul(rhs))
    }
}

impl<T: Scalar> Mul for DenseMatrix<T> {
    type Output = DenseMatrix<T>;
    fn mul(self, rhs: DenseMatrix<T>) -> DenseMatrix<T> {
        &self * &rhs
    }
}

// ── Matrix * Vector, Vector * Matrix ────────────────────────────────

impl<T: Scalar> Mul<&Vector<T>> for &DenseMatrix<T> {
    type Output = Vector<T>;
    fn mul(self, rhs: &Vector<T>) -> Vector<T> {
        or_panic(self.try_mul_vec(rhs))
    }
}

impl<T: Scalar> Mul<&DenseMatrix<T>> for &Vector<T> {
    type Output = DenseMatrix<T>;
    fn mul(self, rhs: &DenseMatrix<T>) -> DenseMatrix<T> {
        or_panic(rhs.try_scale_rows(self))
    }
}

// ── Matrix ⊕ scalar ─────────────────────────────────────────────────

macro_rules! impl_dense_scalar_op {
    ($Op:ident, $op:ident, $OpAssign:ident, $op_assign:ident, $sym:tt) => {
        impl<T: Scalar> $Op<T> for &DenseMatrix<T> {
            type Output = DenseMatrix<T>;
            fn $op(self, rhs: T) -> DenseMatrix<T> {
                self.map_rows(|r| r $sym rhs)
            }
        }

        impl<T: Scalar> $Op<T> for DenseMatrix<T> {
            type Output = DenseMatrix<T>;
            fn $op(mut self, rhs: T) -> DenseMatrix<T> {
                $OpAssign::$op_assign(&mut self, rhs);
                self
            }
        }

        impl<T: Scalar> $OpAssign<T> for DenseMatrix<T> {
            fn $op_assign(&mut self, rhs: T) {
                for r in self.rows.iter_mut() {
                    $OpAssign::$op_assign(r, rhs);
                }
            }
        }
    };
}

impl_dense_scalar_op!(Add, add, AddAssign, add_assign, +);
impl_dense_scalar_op!(Sub, sub, SubAssign, sub_assign, -);
impl_dense_scalar_op!(Mul, mul, MulAssign, mul_assign, *);
impl_dense_scalar_op!(Div, div, DivAssign, div_assign, /);

impl<T: Scalar> Neg for &DenseMatrix<T> {
    type Output = DenseMatrix<T>;
    fn neg(self) -> DenseMatrix<T> {
        self.map_rows(|r| -r)
    }
}

impl<T: Scalar> Neg for DenseMatrix<T> {
    type Output = DenseMatrix<T>;
    fn neg(self) -> DenseMatrix<T> {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Shape;

    fn m(r: usize, c: usize, data: &[f64]) -> DenseMatrix<f64> {
        DenseMatrix::from_rows(r, c, data).unwrap()
    }

    #[test]
    fn add_sub() {
        let a = m(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let b = m(2, 2, &[5.0, 6.0, 7.0, 8.0]);
        let c = &a + &b;
        assert_eq!(c[(0, 0)], 6.0);
        assert_eq!(c[(1, 1)], 12.0);
        let d = &b - &a;
        assert_eq!(d, DenseMatrix::filled(2, 2, 4.0));
    }

    #[test]
    fn add_shape_mismatch() {
        let a = m(2, 2, &[0.0; 4]);
        let b = m(2, 3, &[0.0; 6]);
        assert_eq!(
            a.try_add(&b),
            Err(NumError::DimensionMismatch {
                op: "add",
                lhs: Shape::Matrix(2, 2),
                rhs: Shape::Matrix(2, 3),
            })
        );
    }

    #[test]
    fn matrix_multiply_non_square() {
        let a = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = m(3, 2, &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        let c = &a * &b;
        assert_eq!((c.nrows(), c.ncols()), (2, 2));
        assert_eq!(c[(0, 0)], 58.0);
        assert_eq!(c[(0, 1)], 64.0);
        assert_eq!(c[(1, 0)], 139.0);
        assert_eq!(c[(1, 1)], 154.0);
    }

    #[test]
    fn try_mul_outer_product() {
        let col = m(3, 1, &[1.0, 2.0, 3.0]);
        let row = m(1, 2, &[4.0, 5.0]);
        let c = col.try_mul(&row).unwrap();
        assert_eq!(c, m(3, 2, &[4.0, 5.0, 8.0, 10.0, 12.0, 15.0]));
        assert!(row.try_mul(&row).is_err());
    }

    #[test]
    #[should_panic(expected = "dimension mismatch in mul: 2x3 vs 2x2")]
    fn multiply_dim_mismatch() {
        let a = m(2, 3, &[0.0; 6]);
        let b = m(2, 2, &[0.0; 4]);
        let _ = &a * &b;
    }

    #[test]
    fn identity_multiply() {
        let a = m(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let id = DenseMatrix::identity(2);
        assert_eq!(&a * &id, a);
        assert_eq!(&id * &a, a);
    }

    #[test]
    fn matrix_vector() {
        let a = m(2, 3, &[1.0, 0.0, 2.0, 0.0, 1.0, -1.0]);
        let x = Vector::from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!((&a * &x).as_slice(), &[7.0, -1.0]);
        assert!(a.try_mul_vec(&Vector::zeros(2)).is_err());
    }

    #[test]
    fn vector_scales_rows() {
        let a = m(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let d = Vector::from_slice(&[10.0, -1.0]);
        let s = &d * &a;
        assert_eq!(s, m(2, 2, &[10.0, 20.0, -3.0, -4.0]));
        assert!(a.try_scale_rows(&Vector::zeros(3)).is_err());
    }

    #[test]
    fn scalar_ops() {
        let a = m(1, 2, &[2.0, 4.0]);
        assert_eq!(&a * 2.0, m(1, 2, &[4.0, 8.0]));
        assert_eq!(&a / 2.0, m(1, 2, &[1.0, 2.0]));
        assert_eq!(&a + 1.0, m(1, 2, &[3.0, 5.0]));
        assert_eq!(a.clone() - 1.0, m(1, 2, &[1.0, 3.0]));
        assert_eq!(-a, m(1, 2, &[-2.0, -4.0]));
    }

    #[test]
    fn linear_operator_impl() {
        let a = m(2, 2, &[2.0, 0.0, 0.0, 3.0]);
        let mut out = Vector::zeros(2);
        a.apply_into(&Vector::from_slice(&[1.0, 1.0]), &mut out).unwrap();
        assert_eq!(out.as_slice(), &[2.0, 3.0]);
    }
}
