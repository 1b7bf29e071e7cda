//! Benchmarks for the IDP subcell limiter.
//!
//! Run with: `cargo bench --bench subcell_limiter`
//!
//! Measures the residual cost of limiting with linear bounds only and with
//! the Newton-bisection for nonlinear bounds, plus a full SSPRK3 step.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dgsem::boundary::BoundaryConditions;
use dgsem::equations::{CompressibleEuler, Pressure, SpecificEntropy};
use dgsem::flux::{FluxLaxFriedrichs, FluxRanocha};
use dgsem::mesh::TreeMesh;
use dgsem::solver::{DgConfig, DgSemidiscretization, OneSidedBound, Solution, SubcellLimiterIdp};
use dgsem::time::{IntegratorWorkspace, SSPRK3, StageHooks, TimeIntegrator};

type Euler2D = CompressibleEuler<2>;
type Semi = DgSemidiscretization<Euler2D, FluxLaxFriedrichs, FluxRanocha, 4, 2>;

fn setup_problem(cells: usize, limiter: SubcellLimiterIdp<Euler2D, 4>) -> (Semi, Solution<4>) {
    let mesh = TreeMesh::new([cells, cells], [-2.0, -2.0], [2.0, 2.0], [true, true]).unwrap();
    let config = DgConfig::new(3, FluxLaxFriedrichs, FluxRanocha).with_subcell_limiting(limiter);
    let semi = DgSemidiscretization::new(mesh, Euler2D::new(1.4), config, BoundaryConditions::periodic()).unwrap();
    let u = semi.compute_coefficients(|x, t| semi.equations().initial_condition_weak_blast_wave(x, t), 0.0);
    (semi, u)
}

fn linear_bounds() -> SubcellLimiterIdp<Euler2D, 4> {
    SubcellLimiterIdp::new().with_local_twosided_cons(&[0])
}

fn nonlinear_bounds() -> SubcellLimiterIdp<Euler2D, 4> {
    linear_bounds()
        .with_positivity_nonlinear(Pressure)
        .with_local_onesided_nonlinear(SpecificEntropy, OneSidedBound::Min)
}

/// Benchmark the limited residual.
fn bench_limited_rhs(c: &mut Criterion) {
    let mut group = c.benchmark_group("subcell_limited_rhs");
    group.sample_size(30);

    let cases: [(&str, fn() -> SubcellLimiterIdp<Euler2D, 4>); 2] =
        [("linear", linear_bounds), ("nonlinear", nonlinear_bounds)];
    for cells in [8, 16] {
        for (name, make) in cases {
            let (mut semi, u) = setup_problem(cells, make());
            let dt = semi.max_dt(&u, 0.1).unwrap();
            let mut du = semi.allocate_solution();
            group.bench_with_input(BenchmarkId::new(name, cells * cells), &dt, |b, &dt| {
                b.iter(|| semi.rhs(black_box(&mut du), black_box(&u), 0.0, dt));
            });
        }
    }

    group.finish();
}

/// Benchmark one SSPRK3 step with the limiter active in every stage.
fn bench_limited_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("subcell_limited_step");
    group.sample_size(20);

    let (mut semi, u0) = setup_problem(16, nonlinear_bounds());
    let dt = semi.max_dt(&u0, 0.1).unwrap();
    let mut u = u0.clone();
    let mut workspace = IntegratorWorkspace::new(&u);
    group.bench_function("ssprk3", |b| {
        b.iter(|| {
            u.clone_from(&u0);
            let mut hooks = StageHooks::none();
            SSPRK3.step(&mut semi, black_box(&mut u), &mut workspace, 0.0, dt, &mut hooks)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_limited_rhs, bench_limited_step);
criterion_main!(benches);
