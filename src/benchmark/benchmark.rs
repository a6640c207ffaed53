use std::time::Instant;

use crate::simulation::forces::{Acceleration, NewtonianGravity};
use crate::simulation::integrator::{Integrator, Scheme};
use crate::simulation::params::SimulationConfig;
use crate::simulation::states::{Body, NVec3};

/// Deterministic body cloud of size `n`, no rand needed
pub fn make_bodies(n: usize) -> Vec<Body> {
    (0..n)
        .filter_map(|i| {
            let i_f = i as f64;
            let x = NVec3::new(
                (i_f * 0.37).sin() * 5.0,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
            );
            Body::at_rest(x, 1.0).ok()
        })
        .collect()
}

/// Shared settings for every benchmark
fn make_config() -> SimulationConfig {
    let mut cfg = SimulationConfig::default();
    cfg.set_g(0.1).expect("fixed benchmark constants");
    cfg.set_softening(0.01).expect("fixed benchmark constants");
    cfg
}

/// Time a single force pass for growing n
pub fn bench_gravity() {
    let ns = [100, 200, 400, 800, 1600, 3200];
    let cfg = make_config();
    let field = NewtonianGravity::from_config(&cfg);

    for n in ns {
        let bodies = make_bodies(n);
        let mut out = vec![NVec3::zeros(); n];

        // Warm up
        field.acceleration(&bodies, &mut out);

        let t0 = Instant::now();
        field.acceleration(&bodies, &mut out);
        let dt_direct = t0.elapsed().as_secs_f64();

        println!("N = {n:5}, force pass = {dt_direct:8.6} s");
    }
}

/// Per-step time of leapfrog vs rk4
pub fn bench_leapfrog() {
    let ns = [100, 200, 400, 800, 1600];
    let steps = 3;
    let cfg = make_config();

    for n in ns {
        let template = make_bodies(n);

        let mut per_step = [0.0; 2];
        for (slot, scheme) in [Scheme::Leapfrog, Scheme::Rk4].into_iter().enumerate() {
            let mut bodies = template.clone();
            let mut integrator = Integrator::new(scheme);

            // Warm-up
            integrator.step_bodies(&mut bodies, &cfg, 0.001);

            let t0 = Instant::now();
            for _ in 0..steps {
                integrator.step_bodies(&mut bodies, &cfg, 0.001);
            }
            per_step[slot] = t0.elapsed().as_secs_f64() / steps as f64;
        }

        println!(
            "N = {:5}, leapfrog step = {:8.6} s,   rk4 step = {:8.6} s",
            n, per_step[0], per_step[1]
        );
    }
}

/// Leapfrog step time for a range of n, as CSV
/// Paste output directly into a spreadsheet to graph
pub fn bench_leapfrog_curve() {
    println!("N,leapfrog_ms");
    let cfg = make_config();

    for n in (100..=2000).step_by(100) {
        // Small n: average over a few steps to smooth noise
        let steps = if n <= 800 { 5 } else { 1 };

        let mut bodies = make_bodies(n);
        let mut integrator = Integrator::new(Scheme::Leapfrog);

        let t0 = Instant::now();
        for _ in 0..steps {
            integrator.step_bodies(&mut bodies, &cfg, 0.001);
        }
        let ms = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        println!("{},{:.6}", n, ms);
    }
}
