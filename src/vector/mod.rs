mod fused;
mod norm;
mod ops;
mod stats;

pub use fused::{scale_add, scale_add2, scale_subtract, scale_subtract2};

use alloc::vec;
use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use crate::error::{or_panic, NumError, NumResult, Shape};
use crate::traits::Scalar;

/// Heap-allocated numeric vector with runtime length.
///
/// The length only changes through [`Vector::resize`]. Elementwise binary
/// operations require equal lengths: the `try_*` methods return
/// `DimensionMismatch`, the `std::ops` operators panic with the same message.
///
/// # Examples
///
/// ```
/// use numcore::Vector;
///
/// let a = Vector::from_slice(&[1.0_f64, 2.0, 3.0]);
/// let b = Vector::new(3, 2.0);
/// let c = &a * &b;
/// assert_eq!(c.as_slice(), &[2.0, 4.0, 6.0]);
/// assert_eq!(a.dot(&b).unwrap(), 12.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vector<T> {
    pub(crate) data: Vec<T>,
}

// ── Constructors ────────────────────────────────────────────────────

impl<T: Scalar> Vector<T> {
    /// Create a vector of length `n` filled with `value`.
    pub fn new(n: usize, value: T) -> Self {
        Self {
            data: vec![value; n],
        }
    }

    /// Create a zero vector of length `n`.
    ///
    /// ```
    /// use numcore::Vector;
    /// let v = Vector::<f64>::zeros(4);
    /// assert_eq!(v.len(), 4);
    /// assert_eq!(v[3], 0.0);
    /// ```
    pub fn zeros(n: usize) -> Self {
        Self::new(n, T::zero())
    }

    /// Create a vector from a slice.
    pub fn from_slice(data: &[T]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Resize to `n` elements, filling new slots with `value`.
    ///
    /// Existing elements below `n` are kept.
    pub fn resize(&mut self, n: usize, value: T) {
        self.data.resize(n, value);
    }

    /// Overwrite every element with `value`.
    ///
    /// ```
    /// use numcore::Vector;
    /// let mut v = Vector::from_slice(&[1, 2, 3]);
    /// v.set(7);
    /// assert_eq!(v.as_slice(), &[7, 7, 7]);
    /// ```
    pub fn set(&mut self, value: T) {
        crate::elementwise::for_each_mut(&mut self.data, |_, x| *x = value);
    }

    /// Bounds-checked read.
    pub fn get(&self, i: usize) -> NumResult<T> {
        self.data.get(i).copied().ok_or(NumError::IndexOutOfRange {
            index: (i, 0),
            shape: Shape::Vector(self.len()),
        })
    }

    /// Bounds-checked write.
    pub fn set_at(&mut self, i: usize, value: T) -> NumResult<()> {
        let shape = Shape::Vector(self.len());
        match self.data.get_mut(i) {
            Some(x) => {
                *x = value;
                Ok(())
            }
            None => Err(NumError::IndexOutOfRange {
                index: (i, 0),
                shape,
            }),
        }
    }
}

impl<T> Vector<T> {
    /// Create a vector that takes ownership of `data`.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the vector is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// View the elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// View the elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Iterate over the elements.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Consume the vector, returning its storage.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub(crate) fn shape(&self) -> Shape {
        Shape::Vector(self.data.len())
    }
}

// ── Index ───────────────────────────────────────────────────────────

impl<T> Index<usize> for Vector<T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        let n = self.data.len();
        match self.data.get(i) {
            Some(x) => x,
            None => or_panic(Err(NumError::IndexOutOfRange {
                index: (i, 0),
                shape: Shape::Vector(n),
            })),
        }
    }
}

impl<T> IndexMut<usize> for Vector<T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        let n = self.data.len();
        match self.data.get_mut(i) {
            Some(x) => x,
            None => or_panic(Err(NumError::IndexOutOfRange {
                index: (i, 0),
                shape: Shape::Vector(n),
            })),
        }
    }
}

impl<T> From<Vec<T>> for Vector<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
