//! Benchmarks for the Gauss preliminary orbit (single-threaded)
//!
//! Examples:
//!   cargo bench --bench gauss_prelim_orbit
//!   cargo bench gauss_prelim_orbit -- gauss_prelim_orbit/single_call
//!   cargo bench gauss_prelim_orbit -- gauss_prelim_orbit/noisy_batch_100

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use gauss_orbit::initial_orbit_determination::gauss::GaussObs;
use gauss_orbit::initial_orbit_determination::{determine_orbit, IODParams, RootBracket};

/// Deterministic GaussObs fixture: (2) Pallas, times in days, Sun positions in AU.
fn make_fixture_gaussobs() -> GaussObs {
    GaussObs::from_hours_degrees(
        [6370.57744, 6378.56789, 6390.65113],
        [6.38029, 6.40793, 6.38762],
        [-24.25104, -26.48060, -29.48400],
        [
            [-0.7735829, -0.5704494, -0.2473703],
            [-0.6780640, -0.6624821, -0.2872733],
            [-0.5091536, -0.7766740, -0.3367798],
        ],
    )
    .expect("GaussObs fixture")
}

/// Perturb the angles of a triplet by a uniform noise of half-width `sigma` radians.
fn noisy_copy(gauss: &GaussObs, sigma: f64, rng: &mut StdRng) -> GaussObs {
    let mut jitter = || Vector3::from_fn(|_, _| rng.random_range(-sigma..sigma));
    let ra = gauss.ra() + jitter();
    let dec = gauss.dec() + jitter();
    GaussObs::with_observer_position(ra, dec, *gauss.time(), *gauss.observer_position())
        .expect("noisy GaussObs")
}

fn bench_prelim_orbit(c: &mut Criterion) {
    let mut group = c.benchmark_group("gauss_prelim_orbit");

    let gauss = make_fixture_gaussobs();
    let bracket = RootBracket::new(2.0, 3.0, 2.3).expect("bracket");
    let params = IODParams::default();

    // 1) Single call
    group.bench_function("single_call", |b| {
        b.iter(|| {
            let res = determine_orbit(black_box(&gauss), &bracket, &params);
            if let Err(e) = res {
                panic!("determine_orbit failed: {e:?}");
            }
        })
    });

    // 2) Geometry and root only
    group.bench_function("distance_equation", |b| {
        b.iter(|| {
            let geometry = gauss.geometry(&params).expect("geometry");
            black_box(geometry.solve_octic(&bracket, &params).ok());
        })
    });

    // 3) Root enumeration
    group.bench_function("candidate_roots", |b| {
        let geometry = gauss.geometry(&params).expect("geometry");
        b.iter(|| black_box(geometry.candidate_roots(&params).ok()))
    });

    // 4) Noisy batch 100: 100 perturbed triplets, failures included
    group.bench_function("noisy_batch_100", |b| {
        b.iter_batched(
            || {
                // 0.3" ≈ 1.454e-6 rad
                let sigma_rad = 1.5e-6_f64;
                let mut rng = StdRng::seed_from_u64(42);
                (0..100)
                    .map(|_| noisy_copy(&gauss, sigma_rad, &mut rng))
                    .collect::<Vec<_>>()
            },
            |noisy| {
                for g in noisy {
                    let res = determine_orbit(&g, &bracket, &params);
                    black_box(&res);
                }
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(gauss_benches, bench_prelim_orbit);
criterion_main!(gauss_benches);
