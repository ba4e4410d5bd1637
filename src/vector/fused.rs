//! Fused update kernels for solver hot loops.
//!
//! Each kernel writes into a caller-owned output buffer, so an iteration of
//! CG or BiCGStab allocates nothing. The output must already have the
//! operand length; it is never resized.

use crate::elementwise::{for_each_mut, transform2, transform3};
use crate::error::{check_len, NumResult};
use crate::traits::Scalar;

use super::Vector;

/// `out = a + s * b`.
///
/// ```
/// use numcore::Vector;
/// use numcore::vector::scale_add;
/// let a = Vector::from_slice(&[1.0, 1.0]);
/// let b = Vector::from_slice(&[2.0, 3.0]);
/// let mut out = Vector::zeros(2);
/// scale_add(&mut out, &a, 0.5, &b).unwrap();
/// assert_eq!(out.as_slice(), &[2.0, 2.5]);
/// ```
pub fn scale_add<T: Scalar>(out: &mut Vector<T>, a: &Vector<T>, s: T, b: &Vector<T>) -> NumResult<()> {
    check_len("scale_add", a.len(), b.len())?;
    check_len("scale_add", out.len(), a.len())?;
    transform2(&mut out.data, &a.data, &b.data, move |x, y| x + s * y)
}

/// `out = a - s * b`.
pub fn scale_subtract<T: Scalar>(
    out: &mut Vector<T>,
    a: &Vector<T>,
    s: T,
    b: &Vector<T>,
) -> NumResult<()> {
    check_len("scale_subtract", a.len(), b.len())?;
    check_len("scale_subtract", out.len(), a.len())?;
    transform2(&mut out.data, &a.data, &b.data, move |x, y| x - s * y)
}

/// `out = a + s1 * b + s2 * c`.
pub fn scale_add2<T: Scalar>(
    out: &mut Vector<T>,
    a: &Vector<T>,
    s1: T,
    b: &Vector<T>,
    s2: T,
    c: &Vector<T>,
) -> NumResult<()> {
    check_len("scale_add2", a.len(), b.len())?;
    check_len("scale_add2", a.len(), c.len())?;
    check_len("scale_add2", out.len(), a.len())?;
    transform3(&mut out.data, &a.data, &b.data, &c.data, move |x, y, z| {
        x + s1 * y + s2 * z
    })
}

/// `out = a - s1 * b - s2 * c`.
pub fn scale_subtract2<T: Scalar>(
    out: &mut Vector<T>,
    a: &Vector<T>,
    s1: T,
    b: &Vector<T>,
    s2: T,
    c: &Vector<T>,
) -> NumResult<()> {
    check_len("scale_subtract2", a.len(), b.len())?;
    check_len("scale_subtract2", a.len(), c.len())?;
    check_len("scale_subtract2", out.len(), a.len())?;
    transform3(&mut out.data, &a.data, &b.data, &c.data, move |x, y, z| {
        x - s1 * y - s2 * z
    })
}

impl<T: Scalar> Vector<T> {
    /// In place `self += s * b`.
    pub fn add_scaled(&mut self, s: T, b: &Vector<T>) -> NumResult<()> {
        check_len("add_scaled", self.len(), b.len())?;
        let b = &b.data;
        for_each_mut(&mut self.data, |i, x| *x = *x + s * b[i]);
        Ok(())
    }

    /// In place `self -= s * b`.
    pub fn sub_scaled(&mut self, s: T, b: &Vector<T>) -> NumResult<()> {
        check_len("sub_scaled", self.len(), b.len())?;
        let b = &b.data;
        for_each_mut(&mut self.data, |i, x| *x = *x - s * b[i]);
        Ok(())
    }

    /// Copy `src` into `self` without reallocating.
    pub fn assign(&mut self, src: &Vector<T>) -> NumResult<()> {
        check_len("assign", self.len(), src.len())?;
        self.data.copy_from_slice(&src.data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_operand_variants() {
        let a = Vector::from_slice(&[1.0, 2.0]);
        let b = Vector::from_slice(&[1.0, 1.0]);
        let c = Vector::from_slice(&[2.0, 0.0]);
        let mut out = Vector::zeros(2);

        scale_add2(&mut out, &a, 2.0, &b, 0.5, &c).unwrap();
        assert_eq!(out.as_slice(), &[4.0, 4.0]);

        scale_subtract2(&mut out, &a, 2.0, &b, 0.5, &c).unwrap();
        assert_eq!(out.as_slice(), &[-2.0, 0.0]);

        scale_subtract(&mut out, &a, 1.0, &b).unwrap();
        assert_eq!(out.as_slice(), &[0.0, 1.0]);
    }

    #[test]
    fn output_length_must_match() {
        let a = Vector::from_slice(&[1.0, 2.0]);
        let mut out = Vector::zeros(3);
        assert!(scale_add(&mut out, &a, 1.0, &a).is_err());
        assert_eq!(out.as_slice(), &[0.0; 3]);
    }

    #[test]
    fn in_place_scaled() {
        let mut x = Vector::from_slice(&[1.0_f32, 1.0]);
        x.add_scaled(2.0, &Vector::from_slice(&[1.0, -1.0])).unwrap();
        assert_eq!(x.as_slice(), &[3.0, -1.0]);
        x.sub_scaled(1.0, &Vector::from_slice(&[3.0, -1.0])).unwrap();
        assert_eq!(x.as_slice(), &[0.0, 0.0]);
        assert!(x.add_scaled(1.0, &Vector::zeros(1)).is_err());
    }
}
