use alloc::collections::BTreeMap;
use alloc::vec;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::elementwise::for_each_mut;
use crate::error::{or_panic, NumError, NumResult};
use crate::traits::{LinearOperator, Scalar};
use crate::Vector;

use super::SparseMatrix;

// ── Matrix ⊕ Matrix ─────────────────────────────────────────────────

impl<T: Scalar> SparseMatrix<T> {
    fn mismatch(&self, rhs: &Self, op: &'static str) -> NumError {
        NumError::DimensionMismatch {
            op,
            lhs: self.shape(),
            rhs: rhs.shape(),
        }
    }

    fn combine(&self, rhs: &Self, op: &'static str, f: impl Fn(T, T) -> T + Sync + Send) -> NumResult<Self> {
        if (self.nrows, self.ncols) != (rhs.nrows, rhs.ncols) {
            return Err(self.mismatch(rhs, op));
        }
        let mut out = self.clone();
        for_each_mut(&mut out.rows, |i, row| {
            for (&j, &b) in &rhs.rows[i] {
                let e = row.entry(j).or_insert_with(T::zero);
                *e = f(*e, b);
            }
        });
        Ok(out)
    }

    /// Sum of two matrices of equal shape. The result holds the union of
    /// both sparsity patterns.
    pub fn try_add(&self, rhs: &Self) -> NumResult<Self> {
        self.combine(rhs, "add", |a, b| a + b)
    }

    /// Difference of two matrices of equal shape.
    pub fn try_sub(&self, rhs: &Self) -> NumResult<Self> {
        self.combine(rhs, "sub", |a, b| a - b)
    }

    /// Sparse product: (M×N) * (N×P) → (M×P).
    ///
    /// Only products of materialised entries are formed, so the cost follows
    /// the nonzero structure rather than the dimensions.
    ///
    /// ```
    /// use numcore::SparseMatrix;
    /// let a = SparseMatrix::from_triplets(2, 2, &[(0, 0, 2.0), (1, 0, 1.0), (1, 1, 3.0)]).unwrap();
    /// let c = a.try_mul(&a).unwrap();
    /// assert_eq!(c.get(0, 0).unwrap(), 4.0);
    /// assert_eq!(c.get(1, 0).unwrap(), 5.0);
    /// assert_eq!(c.get(1, 1).unwrap(), 9.0);
    /// assert_eq!(c.get(0, 1).unwrap(), 0.0);
    /// ```
    pub fn try_mul(&self, rhs: &Self) -> NumResult<Self> {
        if self.ncols != rhs.nrows {
            return Err(self.mismatch(rhs, "mul"));
        }
        let mut out = Self::new(self.nrows, rhs.ncols);
        for_each_mut(&mut out.rows, |i, row| {
            for (&k, &a) in &self.rows[i] {
                for (&j, &b) in &rhs.rows[k] {
                    let e = row.entry(j).or_insert_with(T::zero);
                    *e = *e + a * b;
                }
            }
        });
        Ok(out)
    }

    /// `A^T A`, the Gram matrix of the columns.
    pub fn gram(&self) -> Self {
        // Shapes always agree.
        or_panic(self.transpose().try_mul(self))
    }
}

// ── Matrix * Vector ─────────────────────────────────────────────────

impl<T: Scalar> SparseMatrix<T> {
    /// Matrix-vector product `A x`.
    pub fn try_mul_vec(&self, x: &Vector<T>) -> NumResult<Vector<T>> {
        let mut out = Vector::zeros(self.nrows);
        self.mul_vec_into(x, &mut out)?;
        Ok(out)
    }

    /// Write `A x` into `out` without allocating. Row sums accumulate in
    /// `f64`.
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
        let xs = x.as_slice();
        for_each_mut(&mut out.data, |i, o| {
            let s: f64 = self.rows[i]
                .iter()
                .map(|(&j, &a)| a.to_wide() * xs[j].to_wide())
                .sum();
            *o = T::from_wide(s);
        });
        Ok(())
    }

    /// `A^T x` without forming the transpose.
    pub fn transpose_mul_vec(&self, x: &Vector<T>) -> NumResult<Vector<T>> {
        if x.len() != self.nrows {
            return Err(NumError::DimensionMismatch {
                op: "transpose_mul_vec",
                lhs: self.shape(),
                rhs: x.shape(),
            });
        }
        let mut acc = vec![0.0_f64; self.ncols];
        for (row, &xi) in self.rows.iter().zip(x.iter()) {
            let xi = xi.to_wide();
            for (&j, &a) in row {
                acc[j] += a.to_wide() * xi;
            }
        }
        Ok(acc.into_iter().map(T::from_wide).collect())
    }

    /// Scale row `i` by `d[i]`, i.e. `diag(d) * A`.
    pub fn try_scale_rows(&self, d: &Vector<T>) -> NumResult<Self> {
        if d.len() != self.nrows {
            return Err(NumError::DimensionMismatch {
                op: "scale_rows",
                lhs: d.shape(),
                rhs: self.shape(),
            });
        }
        let mut out = self.clone();
        let ds = d.as_slice();
        for_each_mut(&mut out.rows, |i, row| scale_row(row, ds[i]));
        Ok(out)
    }
}

fn scale_row<T: Scalar>(row: &mut BTreeMap<usize, T>, s: T) {
    for v in row.values_mut() {
        *v = *v * s;
    }
}

impl<T: Scalar> LinearOperator<T> for SparseMatrix<T> {
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

// ── Operators ───────────────────────────────────────────────────────

macro_rules! impl_sparse_matrix_op {
    ($Op:ident, $op:ident, $try_op:ident) => {
        impl<T: Scalar> $Op<&SparseMatrix<T>> for &SparseMatrix<T> {
            type Output = SparseMatrix<T>;
            fn $op(self, rhs: &SparseMatrix<T>) -> SparseMatrix<T> {
                or_panic(self.$try_op(rhs))
            }
        }

        impl<T: Scalar> $Op<SparseMatrix<T>> for SparseMatrix<T> {
            type Output = SparseMatrix<T>;
            fn $op(self, rhs: SparseMatrix<T>) -> SparseMatrix<T> {
                or_panic(self.$try_op(&rhs))
            }
        }

        impl<T: Scalar> $Op<&SparseMatrix<T>> for SparseMatrix<T> {
            type Output = SparseMatrix<T>;
            fn $op(self, rhs: &SparseMatrix<T>) -> SparseMatrix<T> {
                or_panic(self.$try_op(rhs))
            }
        }
    };
}

impl_sparse_matrix_op!(Add, add, try_add);
impl_sparse_matrix_op!(Sub, sub, try_sub);
impl_sparse_matrix_op!(Mul, mul, try_mul);

impl<T: Scalar> Mul<&Vector<T>> for &SparseMatrix<T> {
    type Output = Vector<T>;
    fn mul(self, rhs: &Vector<T>) -> Vector<T> {
        or_panic(self.try_mul_vec(rhs))
    }
}

impl<T: Scalar> Mul<&SparseMatrix<T>> for &Vector<T> {
    type Output = SparseMatrix<T>;
    fn mul(self, rhs: &SparseMatrix<T>) -> SparseMatrix<T> {
        or_panic(rhs.try_scale_rows(self))
    }
}

// Scalars act on stored entries only; absent entries stay absent and the
// sparsity pattern never changes.
macro_rules! impl_sparse_scalar_op {
    ($Op:ident, $op:ident, $OpAssign:ident, $op_assign:ident, $sym:tt) => {
        impl<T: Scalar> $OpAssign<T> for SparseMatrix<T> {
            fn $op_assign(&mut self, rhs: T) {
                for_each_mut(&mut self.rows, |_, row| {
                    for v in row.values_mut() {
                        *v = *v $sym rhs;
                    }
                });
            }
        }

        impl<T: Scalar> $Op<T> for &SparseMatrix<T> {
            type Output = SparseMatrix<T>;
            fn $op(self, rhs: T) -> SparseMatrix<T> {
                let mut out = self.clone();
                $OpAssign::$op_assign(&mut out, rhs);
                out
            }
        }

        impl<T: Scalar> $Op<T> for SparseMatrix<T> {
            type Output = SparseMatrix<T>;
            fn $op(mut self, rhs: T) -> SparseMatrix<T> {
                $OpAssign::$op_assign(&mut self, rhs);
                self
            }
        }
    };
}

impl_sparse_scalar_op!(Add, add, AddAssign, add_assign, +);
impl_sparse_scalar_op!(Sub, sub, SubAssign, sub_assign, -);
impl_sparse_scalar_op!(Mul, mul, MulAssign, mul_assign, *);
impl_sparse_scalar_op!(Div, div, DivAssign, div_assign, /);

impl<T: Scalar> Neg for &SparseMatrix<T> {
    type Output = SparseMatrix<T>;
    fn neg(self) -> SparseMatrix<T> {
        self * (T::zero() - T::one())
    }
}

impl<T: Scalar> Neg for SparseMatrix<T> {
    type Output = SparseMatrix<T>;
    fn neg(self) -> SparseMatrix<T> {
        self * (T::zero() - T::one())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Shape;

    fn sp(r: usize, c: usize, t: &[(usize, usize, f64)]) -> SparseMatrix<f64> {
        SparseMatrix::from_triplets(r, c, t).unwrap()
    }

    #[test]
    fn add_unions_patterns() {
        let a = sp(2, 2, &[(0, 0, 1.0)]);
        let b = sp(2, 2, &[(0, 0, 2.0), (1, 1, 5.0)]);
        let c = &a + &b;
        assert_eq!(c.get(0, 0).unwrap(), 3.0);
        assert_eq!(c.get(1, 1).unwrap(), 5.0);
        assert_eq!(c.size(), 2);

        let d = &c - &b;
        assert_eq!(d.get(0, 0).unwrap(), 1.0);
        assert_eq!(d.get(1, 1).unwrap(), 0.0);
    }

    #[test]
    fn add_mismatch_reports_both_shapes() {
        let a = sp(2, 2, &[]);
        let b = sp(3, 2, &[]);
        assert_eq!(
            a.try_add(&b),
            Err(NumError::DimensionMismatch {
                op: "add",
                lhs: Shape::Matrix(2, 2),
                rhs: Shape::Matrix(3, 2),
            })
        );
    }

    #[test]
    fn multiply_matches_dense() {
        let a = sp(2, 3, &[(0, 0, 1.0), (0, 2, 2.0), (1, 1, -1.0)]);
        let b = sp(3, 2, &[(0, 1, 3.0), (1, 0, 4.0), (2, 0, 1.0), (2, 1, 1.0)]);
        let c = &a * &b;
        let expected = &a.to_dense() * &b.to_dense();
        assert_eq!(c.to_dense(), expected);
    }

    #[test]
    #[should_panic(expected = "dimension mismatch in mul: 2x3 vs 2x3")]
    fn multiply_mismatch_panics() {
        let a = sp(2, 3, &[]);
        let _ = &a * &a;
    }

    #[test]
    fn matrix_vector_products() {
        let a = sp(2, 3, &[(0, 0, 1.0), (0, 2, 2.0), (1, 1, -1.0)]);
        let x = Vector::from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!((&a * &x).as_slice(), &[7.0, -2.0]);

        let y = Vector::from_slice(&[1.0, 1.0]);
        let aty = a.transpose_mul_vec(&y).unwrap();
        assert_eq!(aty, a.transpose().try_mul_vec(&y).unwrap());
        assert!(a.try_mul_vec(&y).is_err());
        assert!(a.transpose_mul_vec(&x).is_err());
    }

    #[test]
    fn mul_vec_into_checks_output() {
        let a = sp(2, 2, &[(0, 0, 1.0)]);
        let mut out = Vector::zeros(3);
        assert!(a.mul_vec_into(&Vector::zeros(2), &mut out).is_err());
    }

    #[test]
    fn vector_scales_rows() {
        let a = sp(2, 2, &[(0, 0, 1.0), (0, 1, 2.0), (1, 1, 3.0)]);
        let d = Vector::from_slice(&[2.0, -1.0]);
        let s = &d * &a;
        assert_eq!(s.get(0, 1).unwrap(), 4.0);
        assert_eq!(s.get(1, 1).unwrap(), -3.0);
        assert_eq!(s.size(), 3);
    }

    #[test]
    fn scalar_ops_touch_stored_entries() {
        let mut a = sp(2, 2, &[(0, 1, 4.0)]);
        a *= 0.5;
        assert_eq!(a.get(0, 1).unwrap(), 2.0);
        let b = &a / 2.0;
        assert_eq!(b.get(0, 1).unwrap(), 1.0);
        assert_eq!(b.size(), 1);
        assert_eq!((-&b).get(0, 1).unwrap(), -1.0);
    }

    #[test]
    fn scalar_add_sub_keep_pattern() {
        let a = sp(3, 3, &[(0, 0, 1.0), (1, 2, -2.0), (2, 1, 0.0)]);
        let b = &a + 10.0;
        assert_eq!(b.size(), a.size());
        assert_eq!(b.get(0, 0).unwrap(), 11.0);
        assert_eq!(b.get(1, 2).unwrap(), 8.0);
        // Explicit zeros are stored, so they move too.
        assert_eq!(b.get(2, 1).unwrap(), 10.0);
        // Absent entries stay absent and read as zero.
        assert_eq!(b.get(0, 1).unwrap(), 0.0);
        assert!(!b.rows[0].contains_key(&1));

        let mut c = b - 10.0;
        assert_eq!(c, a);
        c += 1.0;
        c -= 3.0;
        assert_eq!(c.size(), 3);
        assert_eq!(c.get(0, 0).unwrap(), -1.0);
        assert_eq!(c.get(1, 1).unwrap(), 0.0);
    }

    #[test]
    fn scalar_add_on_empty_matrix_is_empty() {
        let a = SparseMatrix::<f64>::new(4, 4);
        let b = a + 5.0;
        assert_eq!(b.size(), 0);
        assert_eq!(b.get(3, 3).unwrap(), 0.0);
    }

    #[test]
    fn owned_operands() {
        let a = sp(2, 2, &[(0, 0, 1.0), (1, 1, 2.0)]);
        let b = sp(2, 2, &[(0, 1, 3.0)]);
        assert_eq!(a.clone() + b.clone(), &a + &b);
        assert_eq!(a.clone() - &b, &a - &b);
        assert_eq!(a.clone() * b.clone(), &a * &b);
        let n = -a.clone();
        assert_eq!(n, -&a);
        assert_eq!(n.get(1, 1).unwrap(), -2.0);
        assert_eq!(n.size(), 2);
    }

    #[test]
    fn gram_is_symmetric() {
        let j = sp(3, 2, &[(0, 0, 1.0), (1, 0, 2.0), (1, 1, 1.0), (2, 1, 3.0)]);
        let g = j.gram();
        assert_eq!((g.nrows(), g.ncols()), (2, 2));
        assert_eq!(g.get(0, 0).unwrap(), 5.0);
        assert_eq!(g.get(0, 1).unwrap(), 2.0);
        assert_eq!(g.get(1, 0).unwrap(), 2.0);
        assert_eq!(g.get(1, 1).unwrap(), 10.0);
    }

    #[test]
    fn large_parallel_product_matches_sequential() {
        let n = crate::elementwise::PARALLEL_THRESHOLD + 10;
        let mut a = SparseMatrix::new(n, n);
        for i in 0..n {
            a.set(i, i, 2.0).unwrap();
            if i + 1 < n {
                a.set(i, i + 1, -1.0).unwrap();
            }
        }
        let x = Vector::new(n, 1.0);
        let y = &a * &x;
        assert_eq!(y[0], 1.0);
        assert_eq!(y[n - 1], 2.0);
    }
}
