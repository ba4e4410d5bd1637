mod ops;

use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use crate::error::{or_panic, NumError, NumResult, Shape};
use crate::traits::Scalar;
use crate::Vector;

/// Heap-allocated dense matrix with runtime dimensions.
///
/// Row-major: stored as `nrows` independent row [`Vector`]s of length
/// `ncols`. Every row always has exactly `ncols` elements.
///
/// Element access through [`get`](Self::get) / [`set`](Self::set) returns
/// `IndexOutOfRange` on a bad index; `m[(i, j)]` panics with the same
/// message.
///
/// # Examples
///
/// ```
/// use numcore::{DenseMatrix, Vector};
///
/// let a = DenseMatrix::from_rows(2, 2, &[4.0, 1.0, 1.0, 3.0]).unwrap();
/// let x = Vector::from_slice(&[1.0, 2.0]);
/// let y = a.try_mul_vec(&x).unwrap();
/// assert_eq!(y.as_slice(), &[6.0, 7.0]);
/// assert_eq!(a[(0, 1)], 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<T> {
    pub(crate) rows: Vec<Vector<T>>,
    pub(crate) nrows: usize,
    pub(crate) ncols: usize,
}

// ── Constructors ────────────────────────────────────────────────────

impl<T: Scalar> DenseMatrix<T> {
    /// Create an `nrows x ncols` matrix filled with `value`.
    pub fn filled(nrows: usize, ncols: usize, value: T) -> Self {
        Self {
            rows: (0..nrows).map(|_| Vector::new(ncols, value)).collect(),
            nrows,
            ncols,
        }
    }

    /// Create an `nrows x ncols` zero matrix.
    ///
    /// ```
    /// use numcore::DenseMatrix;
    /// let m = DenseMatrix::<f64>::zero(2, 3);
    /// assert_eq!(m.nrows(), 2);
    /// assert_eq!(m.ncols(), 3);
    /// assert_eq!(m[(1, 2)], 0.0);
    /// ```
    pub fn zero(nrows: usize, ncols: usize) -> Self {
        Self::filled(nrows, ncols, T::zero())
    }

    /// Create an `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zero(n, n);
        for i in 0..n {
            m.rows[i].data[i] = T::one();
        }
        m
    }

    /// Square matrix with `d` on the diagonal.
    pub fn diagonal(d: &Vector<T>) -> Self {
        let n = d.len();
        let mut m = Self::zero(n, n);
        for i in 0..n {
            m.rows[i].data[i] = d.data[i];
        }
        m
    }

    /// `n x 1` matrix holding `v` as its only column.
    pub fn column_vector(v: &Vector<T>) -> Self {
        Self {
            rows: v.iter().map(|&x| Vector::new(1, x)).collect(),
            nrows: v.len(),
            ncols: 1,
        }
    }

    /// `1 x n` matrix holding `v` as its only row.
    pub fn row_vector(v: &Vector<T>) -> Self {
        Self {
            rows: alloc::vec![v.clone()],
            nrows: 1,
            ncols: v.len(),
        }
    }

    /// Create a matrix from a flat slice in row-major order.
    ///
    /// Fails with `DimensionMismatch` if `data.len() != nrows * ncols`.
    pub fn from_rows(nrows: usize, ncols: usize, data: &[T]) -> NumResult<Self> {
        if data.len() != nrows * ncols {
            return Err(NumError::DimensionMismatch {
                op: "from_rows",
                lhs: Shape::Matrix(nrows, ncols),
                rhs: Shape::Vector(data.len()),
            });
        }
        let rows = (0..nrows)
            .map(|i| Vector::from_slice(&data[i * ncols..(i + 1) * ncols]))
            .collect();
        Ok(Self { rows, nrows, ncols })
    }

    /// Create a matrix by calling `f(row, col)` for each element.
    pub fn from_fn(nrows: usize, ncols: usize, f: impl Fn(usize, usize) -> T) -> Self {
        Self {
            rows: (0..nrows)
                .map(|i| (0..ncols).map(|j| f(i, j)).collect())
                .collect(),
            nrows,
            ncols,
        }
    }

    /// Change the dimensions.
    ///
    /// A resize to the current shape is a no-op and keeps the data. Any other
    /// shape reallocates and zero-fills.
    pub fn resize(&mut self, nrows: usize, ncols: usize) {
        if nrows == self.nrows && ncols == self.ncols {
            return;
        }
        *self = Self::zero(nrows, ncols);
    }
}

// ── Access ──────────────────────────────────────────────────────────

impl<T> DenseMatrix<T> {
    /// Number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Whether the matrix is square.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    /// `Shape::Matrix(nrows, ncols)`.
    #[inline]
    pub fn shape(&self) -> Shape {
        Shape::Matrix(self.nrows, self.ncols)
    }

    fn check_index(&self, i: usize, j: usize) -> NumResult<()> {
        if i >= self.nrows || j >= self.ncols {
            return Err(NumError::IndexOutOfRange {
                index: (i, j),
                shape: self.shape(),
            });
        }
        Ok(())
    }

    fn check_row(&self, i: usize) -> NumResult<()> {
        if i >= self.nrows {
            return Err(NumError::IndexOutOfRange {
                index: (i, 0),
                shape: self.shape(),
            });
        }
        Ok(())
    }

    /// Borrow row `i`.
    pub fn row(&self, i: usize) -> NumResult<&Vector<T>> {
        self.check_row(i)?;
        Ok(&self.rows[i])
    }

    /// Iterate over the rows.
    pub fn row_iter(&self) -> core::slice::Iter<'_, Vector<T>> {
        self.rows.iter()
    }
}

impl<T: Scalar> DenseMatrix<T> {
    /// Bounds-checked read.
    pub fn get(&self, i: usize, j: usize) -> NumResult<T> {
        self.check_index(i, j)?;
        Ok(self.rows[i].data[j])
    }

    /// Bounds-checked write.
    ///
    /// ```
    /// use numcore::DenseMatrix;
    /// let mut m = DenseMatrix::<f64>::zero(2, 2);
    /// m.set(1, 0, 5.0).unwrap();
    /// assert_eq!(m.get(1, 0).unwrap(), 5.0);
    /// assert!(m.set(2, 0, 1.0).is_err());
    /// ```
    pub fn set(&mut self, i: usize, j: usize, value: T) -> NumResult<()> {
        self.check_index(i, j)?;
        self.rows[i].data[j] = value;
        Ok(())
    }

    /// Copy of row `i`.
    pub fn get_row(&self, i: usize) -> NumResult<Vector<T>> {
        self.row(i).cloned()
    }

    /// Copy of column `j`.
    pub fn get_column(&self, j: usize) -> NumResult<Vector<T>> {
        if j >= self.ncols {
            return Err(NumError::IndexOutOfRange {
                index: (0, j),
                shape: self.shape(),
            });
        }
        Ok(self.rows.iter().map(|r| r.data[j]).collect())
    }

    /// Overwrite row `i`. Fails if `v.len() != ncols`.
    pub fn set_row(&mut self, i: usize, v: &Vector<T>) -> NumResult<()> {
        self.check_row(i)?;
        self.rows[i].assign(v)
    }

    /// Transpose: (M×N) → (N×M).
    ///
    /// ```
    /// use numcore::DenseMatrix;
    /// let a = DenseMatrix::from_rows(2, 3, &[1, 2, 3, 4, 5, 6]).unwrap();
    /// let t = a.transpose();
    /// assert_eq!((t.nrows(), t.ncols()), (3, 2));
    /// assert_eq!(t[(2, 1)], 6);
    /// ```
    pub fn transpose(&self) -> Self {
        Self::from_fn(self.ncols, self.nrows, |i, j| self.rows[j].data[i])
    }

    /// Sum of the diagonal.
    pub fn trace(&self) -> T {
        let n = self.nrows.min(self.ncols);
        T::from_wide((0..n).map(|i| self.rows[i].data[i].to_wide()).sum())
    }
}

// ── Index ───────────────────────────────────────────────────────────

impl<T: Scalar> Index<(usize, usize)> for DenseMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        or_panic(self.check_index(i, j));
        &self.rows[i].data[j]
    }
}

impl<T: Scalar> IndexMut<(usize, usize)> for DenseMatrix<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        or_panic(self.check_index(i, j));
        &mut self.rows[i].data[j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factories() {
        let id = DenseMatrix::<f64>::identity(3);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(id[(i, j)], if i == j { 1.0 } else { 0.0 });
            }
        }

        let d = DenseMatrix::diagonal(&Vector::from_slice(&[2.0, 3.0]));
        assert_eq!(d[(1, 1)], 3.0);
        assert_eq!(d[(0, 1)], 0.0);

        let c = DenseMatrix::column_vector(&Vector::from_slice(&[1.0, 2.0, 3.0]));
        assert_eq!((c.nrows(), c.ncols()), (3, 1));
        assert_eq!(c[(2, 0)], 3.0);

        let r = DenseMatrix::row_vector(&Vector::from_slice(&[1.0, 2.0, 3.0]));
        assert_eq!((r.nrows(), r.ncols()), (1, 3));
        assert_eq!(r[(0, 2)], 3.0);
    }

    #[test]
    fn from_rows_wrong_length() {
        assert!(DenseMatrix::from_rows(2, 2, &[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn resize_same_shape_keeps_data() {
        let mut m = DenseMatrix::from_rows(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        m.resize(2, 2);
        assert_eq!(m[(1, 1)], 4.0);
        m.resize(3, 1);
        assert_eq!((m.nrows(), m.ncols()), (3, 1));
        assert_eq!(m[(0, 0)], 0.0);
    }

    #[test]
    fn get_out_of_range() {
        let m = DenseMatrix::<f64>::zero(2, 3);
        assert_eq!(
            m.get(0, 3),
            Err(NumError::IndexOutOfRange {
                index: (0, 3),
                shape: Shape::Matrix(2, 3),
            })
        );
    }

    #[test]
    #[should_panic(expected = "index (2, 0) out of range for 2x3")]
    fn index_out_of_range_panics() {
        let m = DenseMatrix::<f64>::zero(2, 3);
        let _ = m[(2, 0)];
    }

    #[test]
    fn rows_and_columns() {
        let m = DenseMatrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m.get_row(1).unwrap().as_slice(), &[4.0, 5.0, 6.0]);
        assert_eq!(m.get_column(2).unwrap().as_slice(), &[3.0, 6.0]);
        assert!(m.get_column(3).is_err());
        assert!(m.get_row(2).is_err());
    }

    #[test]
    fn set_row_checks_length() {
        let mut m = DenseMatrix::<f64>::zero(2, 2);
        m.set_row(0, &Vector::from_slice(&[1.0, 2.0])).unwrap();
        assert_eq!(m[(0, 1)], 2.0);
        assert!(m.set_row(1, &Vector::zeros(3)).is_err());
    }

    #[test]
    fn transpose_twice_is_identity() {
        let m = DenseMatrix::from_fn(3, 5, |i, j| (i * 7 + j * 3) as f64 - 4.5);
        assert_eq!(m.transpose().transpose(), m);
    }

    #[test]
    fn trace_of_rectangular() {
        let m = DenseMatrix::from_rows(2, 3, &[1.0, 0.0, 0.0, 0.0, 5.0, 0.0]).unwrap();
        assert_eq!(m.trace(), 6.0);
    }
}
