//! Elementwise execution engine.
//!
//! Applies a function across one or more equal-length slices. Every arithmetic
//! operator on [`Vector`](crate::Vector) and every per-row loop inside
//! [`SparseMatrix`](crate::SparseMatrix) goes through these primitives.
//!
//! With the `parallel` feature, slices of at least [`PARALLEL_THRESHOLD`]
//! elements are split across the rayon thread pool. Iterations never observe
//! each other's output and the visiting order is unspecified, so closures
//! must not rely on it for side effects. Reductions go through
//! [`sum_wide`], which adds `f64` partials associatively.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{check_len, NumResult};

/// Minimum slice length before work is handed to the thread pool.
pub const PARALLEL_THRESHOLD: usize = 4096;

#[cfg(feature = "parallel")]
#[inline]
fn go_parallel(n: usize) -> bool {
    n >= PARALLEL_THRESHOLD
}

/// Call `f(i, &mut out[i])` for every element.
///
/// ```
/// use numcore::elementwise::for_each_mut;
/// let mut v = vec![0usize; 4];
/// for_each_mut(&mut v, |i, x| *x = i * i);
/// assert_eq!(v, [0, 1, 4, 9]);
/// ```
pub fn for_each_mut<O, F>(out: &mut [O], f: F)
where
    O: Send,
    F: Fn(usize, &mut O) + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        if go_parallel(out.len()) {
            out.par_iter_mut().enumerate().for_each(|(i, o)| f(i, o));
            return;
        }
    }
    for (i, o) in out.iter_mut().enumerate() {
        f(i, o);
    }
}

/// `out[i] = f(a[i])`.
///
/// Fails with `DimensionMismatch` if the lengths differ.
pub fn transform1<A, O, F>(out: &mut [O], a: &[A], f: F) -> NumResult<()>
where
    A: Copy + Sync,
    O: Send,
    F: Fn(A) -> O + Sync + Send,
{
    check_len("transform1", out.len(), a.len())?;
    #[cfg(feature = "parallel")]
    {
        if go_parallel(out.len()) {
            out.par_iter_mut()
                .zip(a.par_iter())
                .for_each(|(o, &x)| *o = f(x));
            return Ok(());
        }
    }
    for (o, &x) in out.iter_mut().zip(a) {
        *o = f(x);
    }
    Ok(())
}

/// `out[i] = f(a[i], b[i])`.
///
/// Fails with `DimensionMismatch` naming the first pair of lengths that differ.
///
/// ```
/// use numcore::elementwise::transform2;
/// let mut out = [0.0; 3];
/// transform2(&mut out, &[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], |a, b| a * b).unwrap();
/// assert_eq!(out, [4.0, 10.0, 18.0]);
/// ```
pub fn transform2<A, B, O, F>(out: &mut [O], a: &[A], b: &[B], f: F) -> NumResult<()>
where
    A: Copy + Sync,
    B: Copy + Sync,
    O: Send,
    F: Fn(A, B) -> O + Sync + Send,
{
    check_len("transform2", a.len(), b.len())?;
    check_len("transform2", out.len(), a.len())?;
    #[cfg(feature = "parallel")]
    {
        if go_parallel(out.len()) {
            out.par_iter_mut()
                .zip(a.par_iter().zip(b.par_iter()))
                .for_each(|(o, (&x, &y))| *o = f(x, y));
            return Ok(());
        }
    }
    for (o, (&x, &y)) in out.iter_mut().zip(a.iter().zip(b)) {
        *o = f(x, y);
    }
    Ok(())
}

/// `out[i] = f(a[i], b[i], c[i])`.
pub fn transform3<A, B, C, O, F>(out: &mut [O], a: &[A], b: &[B], c: &[C], f: F) -> NumResult<()>
where
    A: Copy + Sync,
    B: Copy + Sync,
    C: Copy + Sync,
    O: Send,
    F: Fn(A, B, C) -> O + Sync + Send,
{
    check_len("transform3", a.len(), b.len())?;
    check_len("transform3", a.len(), c.len())?;
    check_len("transform3", out.len(), a.len())?;
    #[cfg(feature = "parallel")]
    {
        if go_parallel(out.len()) {
            out.par_iter_mut()
                .zip(a.par_iter().zip(b.par_iter().zip(c.par_iter())))
                .for_each(|(o, (&x, (&y, &z)))| *o = f(x, y, z));
            return Ok(());
        }
    }
    for (o, (&x, (&y, &z))) in out.iter_mut().zip(a.iter().zip(b.iter().zip(c))) {
        *o = f(x, y, z);
    }
    Ok(())
}

/// `out[i] = f(a[i], b[i], c[i], d[i])`.
///
/// ```
/// use numcore::elementwise::transform4;
/// let mut out = [0.0; 2];
/// transform4(&mut out, &[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0], &[7.0, 8.0], |a, b, c, d| a * b + c * d)
///     .unwrap();
/// assert_eq!(out, [38.0, 56.0]);
/// ```
pub fn transform4<A, B, C, D, O, F>(out: &mut [O], a: &[A], b: &[B], c: &[C], d: &[D], f: F) -> NumResult<()>
where
    A: Copy + Sync,
    B: Copy + Sync,
    C: Copy + Sync,
    D: Copy + Sync,
    O: Send,
    F: Fn(A, B, C, D) -> O + Sync + Send,
{
    check_len("transform4", a.len(), b.len())?;
    check_len("transform4", a.len(), c.len())?;
    check_len("transform4", a.len(), d.len())?;
    check_len("transform4", out.len(), a.len())?;
    #[cfg(feature = "parallel")]
    {
        if go_parallel(out.len()) {
            out.par_iter_mut()
                .enumerate()
                .for_each(|(i, o)| *o = f(a[i], b[i], c[i], d[i]));
            return Ok(());
        }
    }
    for (i, o) in out.iter_mut().enumerate() {
        *o = f(a[i], b[i], c[i], d[i]);
    }
    Ok(())
}

/// Order-independent sum of `f(i)` for `i in 0..n`, accumulated in `f64`.
///
/// ```
/// use numcore::elementwise::sum_wide;
/// let s = sum_wide(4, |i| i as f64);
/// assert_eq!(s, 6.0);
/// ```
pub fn sum_wide<F>(n: usize, f: F) -> f64
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        if go_parallel(n) {
            return (0..n).into_par_iter().map(f).sum();
        }
    }
    (0..n).map(f).sum()
}
