use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use numcore::solvers::{solve_bicgstab, solve_cg, BiCgStabSettings, CgSettings};
use numcore::{SparseMatrix, Vector};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// 1-D Poisson matrix, tridiag(-1, 2, -1).
fn laplacian(n: usize) -> SparseMatrix<f64> {
    let mut a = SparseMatrix::new(n, n);
    for i in 0..n {
        a.set(i, i, 2.0).unwrap();
        if i > 0 {
            a.set(i, i - 1, -1.0).unwrap();
        }
        if i + 1 < n {
            a.set(i, i + 1, -1.0).unwrap();
        }
    }
    a
}

/// Upwinded convection-diffusion, tridiag(-1.3, 2.5, -0.7). Not symmetric.
fn convection(n: usize) -> SparseMatrix<f64> {
    let mut a = SparseMatrix::new(n, n);
    for i in 0..n {
        a.set(i, i, 2.5).unwrap();
        if i > 0 {
            a.set(i, i - 1, -1.3).unwrap();
        }
        if i + 1 < n {
            a.set(i, i + 1, -0.7).unwrap();
        }
    }
    a
}

// ---------------------------------------------------------------------------
// Sparse matrix-vector product
// ---------------------------------------------------------------------------

fn sparse_mul_vec(c: &mut Criterion) {
    let mut g = c.benchmark_group("sparse_mul_vec");
    for n in [1_000, 10_000, 100_000] {
        let a = laplacian(n);
        let x = Vector::new(n, 1.0);
        let mut y = Vector::zeros(n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| a.mul_vec_into(black_box(&x), &mut y).unwrap())
        });
    }
    g.finish();
}

// ---------------------------------------------------------------------------
// Linear solvers
// ---------------------------------------------------------------------------

fn cg_laplacian(c: &mut Criterion) {
    let mut g = c.benchmark_group("cg_laplacian");
    g.sample_size(20);
    for n in [100, 1_000] {
        let a = laplacian(n);
        let rhs = Vector::new(n, 1.0);
        let settings = CgSettings {
            max_iter: 10 * n,
            ..CgSettings::default()
        };
        g.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut x = Vector::zeros(n);
                solve_cg(&a, black_box(&rhs), &mut x, &settings).unwrap()
            })
        });
    }
    g.finish();
}

fn bicgstab_convection(c: &mut Criterion) {
    let mut g = c.benchmark_group("bicgstab_convection");
    g.sample_size(20);
    for n in [100, 1_000] {
        let a = convection(n);
        let rhs = Vector::new(n, 1.0);
        let settings = BiCgStabSettings {
            max_iter: 10 * n,
            ..BiCgStabSettings::default()
        };
        g.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut x = Vector::zeros(n);
                solve_bicgstab(&a, black_box(&rhs), &mut x, &settings).unwrap()
            })
        });
    }
    g.finish();
}

criterion_group!(benches, sparse_mul_vec, cg_laplacian, bicgstab_convection);
criterion_main!(benches);
