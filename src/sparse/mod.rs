mod ops;

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::elementwise::for_each_mut;
use crate::error::{NumError, NumResult, Shape};
use crate::traits::Scalar;
use crate::{DenseMatrix, Vector};

/// Row-indexed sparse matrix.
///
/// Each row is an ordered `column -> value` map, so entries iterate in
/// ascending column order. Reading an entry that was never written yields
/// zero; writing always materialises the entry, even when the value is zero.
/// Row and column indices are still bounds-checked.
///
/// # Examples
///
/// ```
/// use numcore::{SparseMatrix, Vector};
///
/// let mut a = SparseMatrix::new(2, 2);
/// a.set(0, 0, 4.0).unwrap();
/// a.set(0, 1, 1.0).unwrap();
/// a.set(1, 1, 3.0).unwrap();
/// assert_eq!(a.get(1, 0).unwrap(), 0.0);
/// assert_eq!(a.size(), 3);
///
/// let y = a.try_mul_vec(&Vector::from_slice(&[1.0, 1.0])).unwrap();
/// assert_eq!(y.as_slice(), &[5.0, 3.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix<T> {
    pub(crate) rows: Vec<BTreeMap<usize, T>>,
    pub(crate) nrows: usize,
    pub(crate) ncols: usize,
}

// ── Constructors ────────────────────────────────────────────────────

impl<T: Scalar> SparseMatrix<T> {
    /// Empty `nrows x ncols` matrix with no materialised entries.
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            rows: (0..nrows).map(|_| BTreeMap::new()).collect(),
            nrows,
            ncols,
        }
    }

    /// `n x n` identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::new(n, n);
        for (i, row) in m.rows.iter_mut().enumerate() {
            row.insert(i, T::one());
        }
        m
    }

    /// Square matrix with `d` on the diagonal. Every diagonal entry is
    /// materialised, including zeros.
    pub fn diagonal(d: &Vector<T>) -> Self {
        let mut m = Self::new(d.len(), d.len());
        for (i, (row, &x)) in m.rows.iter_mut().zip(d.iter()).enumerate() {
            row.insert(i, x);
        }
        m
    }

    /// Build from `(row, col, value)` triplets. Repeated coordinates are
    /// summed.
    ///
    /// ```
    /// use numcore::SparseMatrix;
    /// let m = SparseMatrix::from_triplets(2, 3, &[(0, 2, 1.0), (1, 0, 2.0), (0, 2, 0.5)]).unwrap();
    /// assert_eq!(m.get(0, 2).unwrap(), 1.5);
    /// assert_eq!(m.size(), 2);
    /// ```
    pub fn from_triplets(nrows: usize, ncols: usize, triplets: &[(usize, usize, T)]) -> NumResult<Self> {
        let mut m = Self::new(nrows, ncols);
        for &(i, j, v) in triplets {
            m.add_to(i, j, v)?;
        }
        Ok(m)
    }

    /// Change the dimensions. Same shape is a no-op; otherwise every entry
    /// is dropped.
    pub fn resize(&mut self, nrows: usize, ncols: usize) {
        if nrows == self.nrows && ncols == self.ncols {
            return;
        }
        *self = Self::new(nrows, ncols);
    }
}

// ── Access ──────────────────────────────────────────────────────────

impl<T> SparseMatrix<T> {
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

    /// `Shape::Matrix(nrows, ncols)`.
    #[inline]
    pub fn shape(&self) -> Shape {
        Shape::Matrix(self.nrows, self.ncols)
    }

    /// Total number of materialised entries across all rows.
    pub fn size(&self) -> usize {
        self.rows.iter().map(BTreeMap::len).sum()
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
}

impl<T: Scalar> SparseMatrix<T> {
    /// Entry `(i, j)`, or zero if it was never written.
    pub fn get(&self, i: usize, j: usize) -> NumResult<T> {
        self.check_index(i, j)?;
        Ok(self.rows[i].get(&j).copied().unwrap_or_else(T::zero))
    }

    /// Write entry `(i, j)`, materialising it if absent.
    pub fn set(&mut self, i: usize, j: usize, value: T) -> NumResult<()> {
        self.check_index(i, j)?;
        self.rows[i].insert(j, value);
        Ok(())
    }

    /// `self[(i, j)] += value`, materialising the entry if absent.
    pub fn add_to(&mut self, i: usize, j: usize, value: T) -> NumResult<()> {
        self.check_index(i, j)?;
        let e = self.rows[i].entry(j).or_insert_with(T::zero);
        *e = *e + value;
        Ok(())
    }

    /// Materialised `(column, value)` pairs of row `i` in ascending column
    /// order.
    pub fn row(&self, i: usize) -> NumResult<impl Iterator<Item = (usize, T)> + '_> {
        if i >= self.nrows {
            return Err(NumError::IndexOutOfRange {
                index: (i, 0),
                shape: self.shape(),
            });
        }
        Ok(self.rows[i].iter().map(|(&j, &v)| (j, v)))
    }

    /// Transpose, built by re-inserting every entry at swapped coordinates.
    ///
    /// ```
    /// use numcore::SparseMatrix;
    /// let a = SparseMatrix::from_triplets(2, 3, &[(0, 2, 7.0)]).unwrap();
    /// let t = a.transpose();
    /// assert_eq!((t.nrows(), t.ncols()), (3, 2));
    /// assert_eq!(t.get(2, 0).unwrap(), 7.0);
    /// ```
    pub fn transpose(&self) -> Self {
        let mut t = Self::new(self.ncols, self.nrows);
        for (i, row) in self.rows.iter().enumerate() {
            for (&j, &v) in row {
                t.rows[j].insert(i, v);
            }
        }
        t
    }

    /// Diagonal entries as a vector of length `min(nrows, ncols)`; absent
    /// entries read as zero.
    pub fn diagonal_values(&self) -> Vector<T> {
        let n = self.nrows.min(self.ncols);
        (0..n)
            .map(|i| self.rows[i].get(&i).copied().unwrap_or_else(T::zero))
            .collect()
    }

    /// Add `s` to every diagonal entry, materialising absent ones.
    pub fn add_diagonal(&mut self, s: T) {
        let ncols = self.ncols;
        for_each_mut(&mut self.rows, |i, row| {
            if i < ncols {
                let e = row.entry(i).or_insert_with(T::zero);
                *e = *e + s;
            }
        });
    }

    /// Drop materialised entries with `|value| <= eps`.
    pub fn prune(&mut self, eps: T) {
        for_each_mut(&mut self.rows, |_, row| row.retain(|_, v| v.magnitude() > eps));
    }

    /// Dense copy.
    pub fn to_dense(&self) -> DenseMatrix<T> {
        let mut d = DenseMatrix::zero(self.nrows, self.ncols);
        for (drow, srow) in d.rows.iter_mut().zip(&self.rows) {
            for (&j, &v) in srow {
                drow.data[j] = v;
            }
        }
        d
    }
}

impl<T: Scalar> DenseMatrix<T> {
    /// Sparse copy holding only the nonzero entries.
    pub fn to_sparse(&self) -> SparseMatrix<T> {
        let mut s = SparseMatrix::new(self.nrows, self.ncols);
        for (srow, drow) in s.rows.iter_mut().zip(&self.rows) {
            for (j, &v) in drow.iter().enumerate() {
                if v != T::zero() {
                    srow.insert(j, v);
                }
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_reads_zero() {
        let mut m = SparseMatrix::<f64>::new(3, 3);
        assert_eq!(m.get(1, 2).unwrap(), 0.0);
        m.set(1, 2, -4.5).unwrap();
        assert_eq!(m.get(1, 2).unwrap(), -4.5);
        assert_eq!(m.size(), 1);
    }

    #[test]
    fn out_of_range() {
        let mut m = SparseMatrix::<f64>::new(2, 3);
        assert_eq!(
            m.get(0, 3),
            Err(NumError::IndexOutOfRange {
                index: (0, 3),
                shape: Shape::Matrix(2, 3),
            })
        );
        assert!(m.set(2, 0, 1.0).is_err());
        assert!(m.row(2).is_err());
        assert_eq!(m.size(), 0);
    }

    #[test]
    fn explicit_zero_is_materialised() {
        let mut m = SparseMatrix::<f64>::new(2, 2);
        m.set(0, 0, 0.0).unwrap();
        assert_eq!(m.size(), 1);
        m.prune(0.0);
        assert_eq!(m.size(), 0);
    }

    #[test]
    fn row_iterates_in_column_order() {
        let m = SparseMatrix::from_triplets(1, 5, &[(0, 4, 1.0), (0, 0, 2.0), (0, 2, 3.0)]).unwrap();
        let cols: Vec<usize> = m.row(0).unwrap().map(|(j, _)| j).collect();
        assert_eq!(cols, [0, 2, 4]);
    }

    #[test]
    fn identity_and_diagonal() {
        let id = SparseMatrix::<f32>::identity(3);
        assert_eq!(id.size(), 3);
        assert_eq!(id.get(2, 2).unwrap(), 1.0);
        assert_eq!(id.get(0, 2).unwrap(), 0.0);

        let d = SparseMatrix::diagonal(&Vector::from_slice(&[1.0, 0.0, 3.0]));
        assert_eq!(d.size(), 3);
        assert_eq!(d.diagonal_values().as_slice(), &[1.0, 0.0, 3.0]);
    }

    #[test]
    fn transpose_twice() {
        let m = SparseMatrix::from_triplets(2, 4, &[(0, 3, 1.0), (1, 1, 2.0), (1, 0, -1.0)]).unwrap();
        let t = m.transpose();
        assert_eq!(t.get(3, 0).unwrap(), 1.0);
        assert_eq!(t.get(0, 1).unwrap(), -1.0);
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn add_diagonal_materialises() {
        let mut m = SparseMatrix::from_triplets(2, 2, &[(0, 1, 1.0)]).unwrap();
        m.add_diagonal(0.5);
        assert_eq!(m.get(0, 0).unwrap(), 0.5);
        assert_eq!(m.get(1, 1).unwrap(), 0.5);
        assert_eq!(m.size(), 3);
    }

    #[test]
    fn dense_roundtrip_drops_zeros() {
        let d = DenseMatrix::from_rows(2, 2, &[1.0, 0.0, 0.0, 2.0]).unwrap();
        let s = d.to_sparse();
        assert_eq!(s.size(), 2);
        assert_eq!(s.to_dense(), d);
    }

    #[test]
    fn resize_same_shape_keeps_entries() {
        let mut m = SparseMatrix::from_triplets(2, 2, &[(1, 1, 9.0)]).unwrap();
        m.resize(2, 2);
        assert_eq!(m.get(1, 1).unwrap(), 9.0);
        m.resize(3, 3);
        assert_eq!(m.size(), 0);
    }
}
