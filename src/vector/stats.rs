use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::elementwise::sum_wide;
use crate::traits::Scalar;

use super::Vector;

// ── Order statistics ────────────────────────────────────────────────

impl<T: Scalar> Vector<T> {
    /// Smallest element, or `None` if empty.
    pub fn min(&self) -> Option<T> {
        self.range().map(|(lo, _)| lo)
    }

    /// Largest element, or `None` if empty.
    pub fn max(&self) -> Option<T> {
        self.range().map(|(_, hi)| hi)
    }

    /// `(min, max)` in one pass, or `None` if empty.
    ///
    /// ```
    /// use numcore::Vector;
    /// let v = Vector::from_slice(&[3.0, -1.0, 7.0]);
    /// assert_eq!(v.range(), Some((-1.0, 7.0)));
    /// ```
    pub fn range(&self) -> Option<(T, T)> {
        let mut it = self.data.iter().copied();
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), x| {
            (if x < lo { x } else { lo }, if x > hi { x } else { hi })
        }))
    }

    /// Median of the elements, or `None` if empty.
    ///
    /// Sorts a private copy. For even lengths the two central elements are
    /// averaged.
    ///
    /// ```
    /// use numcore::Vector;
    /// let v = Vector::from_slice(&[4.0, 1.0, 3.0, 2.0]);
    /// assert_eq!(v.median(), Some(2.5));
    /// ```
    pub fn median(&self) -> Option<T> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        let mut sorted: Vec<T> = self.data.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        if n % 2 == 1 {
            Some(sorted[n / 2])
        } else {
            let lo = sorted[n / 2 - 1].to_wide();
            let hi = sorted[n / 2].to_wide();
            Some(T::from_wide(0.5 * (lo + hi)))
        }
    }
}

// ── Moments ─────────────────────────────────────────────────────────

impl<T: Scalar> Vector<T> {
    fn mean_wide(&self) -> f64 {
        let n = self.len();
        if n == 0 {
            return 0.0;
        }
        sum_wide(n, |i| self.data[i].to_wide()) / n as f64
    }

    /// Arithmetic mean; zero for an empty vector.
    pub fn mean(&self) -> T {
        T::from_wide(self.mean_wide())
    }

    /// Sample standard deviation with an `n - 1` denominator.
    ///
    /// Returns zero when there are fewer than two elements.
    ///
    /// ```
    /// use numcore::Vector;
    /// let v = Vector::from_slice(&[2.0_f64, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
    /// assert!((v.std_dev() - 2.138089935299395).abs() < 1e-12);
    /// ```
    pub fn std_dev(&self) -> T {
        let n = self.len();
        if n < 2 {
            return T::zero();
        }
        let mean = self.mean_wide();
        let ss = sum_wide(n, |i| {
            let d = self.data[i].to_wide() - mean;
            d * d
        });
        T::from_wide((ss / (n - 1) as f64).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_max() {
        let v = Vector::from_slice(&[2, -5, 9, 0]);
        assert_eq!(v.min(), Some(-5));
        assert_eq!(v.max(), Some(9));
        assert_eq!(Vector::<f64>::zeros(0).min(), None);
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(Vector::from_slice(&[5.0, 1.0, 3.0]).median(), Some(3.0));
        assert_eq!(Vector::from_slice(&[5.0, 1.0]).median(), Some(3.0));
        assert_eq!(Vector::<f32>::zeros(0).median(), None);
    }

    #[test]
    fn median_does_not_reorder() {
        let v = Vector::from_slice(&[3.0, 1.0, 2.0]);
        let _ = v.median();
        assert_eq!(v.as_slice(), &[3.0, 1.0, 2.0]);
    }

    #[test]
    fn mean_values() {
        assert_eq!(Vector::from_slice(&[1.0, 2.0, 3.0, 6.0]).mean(), 3.0);
        assert_eq!(Vector::<f64>::zeros(0).mean(), 0.0);
    }

    #[test]
    fn std_dev_constant_is_zero() {
        let v = Vector::new(10, 3.25_f64);
        assert_eq!(v.std_dev(), 0.0);
    }

    #[test]
    fn std_dev_short_is_zero() {
        assert_eq!(Vector::from_slice(&[42.0_f32]).std_dev(), 0.0);
        assert_eq!(Vector::<f32>::zeros(0).std_dev(), 0.0);
    }

    #[test]
    fn f32_mean_uses_wide_accumulator() {
        // Sum of many small f32 values drifts when accumulated in f32.
        let v = Vector::new(1_000_000, 0.1_f32);
        assert!((v.mean() - 0.1).abs() < 1e-7);
    }
}
