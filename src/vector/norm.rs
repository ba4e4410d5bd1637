use crate::elementwise::sum_wide;
use crate::error::{check_len, NumResult};
use crate::traits::{FloatScalar, Scalar};

use super::Vector;

// ── Inner products and norms ────────────────────────────────────────
//
// Every sum goes through the f64 accumulator; CG and BiCGStab compare
// these against small tolerances.

impl<T: Scalar> Vector<T> {
    pub(crate) fn dot_wide(&self, rhs: &Self) -> NumResult<f64> {
        check_len("dot", self.len(), rhs.len())?;
        let (a, b) = (&self.data, &rhs.data);
        Ok(sum_wide(a.len(), |i| a[i].to_wide() * b[i].to_wide()))
    }

    pub(crate) fn length_sqr_wide(&self) -> f64 {
        let a = &self.data;
        sum_wide(a.len(), |i| {
            let x = a[i].to_wide();
            x * x
        })
    }

    /// Dot product. Fails with `DimensionMismatch` on unequal lengths.
    ///
    /// ```
    /// use numcore::Vector;
    /// let a = Vector::from_slice(&[1.0, 2.0, 3.0]);
    /// let b = Vector::from_slice(&[4.0, 5.0, 6.0]);
    /// assert_eq!(a.dot(&b).unwrap(), 32.0);
    /// ```
    pub fn dot(&self, rhs: &Self) -> NumResult<T> {
        self.dot_wide(rhs).map(T::from_wide)
    }

    /// Squared Euclidean norm.
    pub fn length_sqr(&self) -> T {
        T::from_wide(self.length_sqr_wide())
    }

    /// Euclidean norm, `sqrt(sum a_i^2)` taken in `f64`.
    ///
    /// ```
    /// use numcore::Vector;
    /// let v = Vector::from_slice(&[3.0_f32, 4.0]);
    /// assert_eq!(v.length(), 5.0);
    /// ```
    pub fn length(&self) -> T {
        T::from_wide(self.length_sqr_wide().sqrt())
    }

    /// Sum of absolute values.
    pub fn length_l1(&self) -> T {
        let a = &self.data;
        T::from_wide(sum_wide(a.len(), |i| a[i].magnitude().to_wide()))
    }

    /// Largest absolute value; zero for an empty vector.
    pub fn length_inf(&self) -> T {
        self.data.iter().fold(T::zero(), |m, &x| {
            let x = x.magnitude();
            if x > m {
                x
            } else {
                m
            }
        })
    }
}

impl<T: FloatScalar> Vector<T> {
    /// Unit vector in the same direction. A zero vector is returned unchanged.
    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len == T::zero() {
            return self.clone();
        }
        self / len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn norms() {
        let v = Vector::from_slice(&[1.0_f64, -2.0, 2.0]);
        assert_eq!(v.length_sqr(), 9.0);
        assert_eq!(v.length(), 3.0);
        assert_eq!(v.length_l1(), 5.0);
        assert_eq!(v.length_inf(), 2.0);
    }

    #[test]
    fn dot_mismatch() {
        let a = Vector::<f64>::zeros(2);
        let b = Vector::<f64>::zeros(4);
        assert!(a.dot(&b).is_err());
    }

    #[test]
    fn f32_length_keeps_precision() {
        // Squares below f32 epsilon relative to the running sum still count.
        let mut v = Vector::new(10_001, 1e-4_f32);
        v[0] = 1.0;
        let exact = (1.0_f64 + 10_000.0 * (1e-4_f32 as f64).powi(2)).sqrt();
        assert!((v.length() as f64 - exact).abs() < 1e-7);
    }

    #[test]
    fn normalized_unit() {
        let v = Vector::from_slice(&[3.0_f64, 4.0]).normalized();
        assert!((v.length() - 1.0).abs() < 1e-12);
        let z = Vector::<f64>::zeros(2).normalized();
        assert_eq!(z.length(), 0.0);
    }
}
