//! Gravitational acceleration fields for the n-body engine
//!
//! Defines the `Acceleration` trait used by the leapfrog scheme, the
//! direct O(n^2) Newtonian sum, an optional rayon-parallel variant, and the
//! per-body post-Newtonian evaluator used by the rk4 scheme

use crate::simulation::params::SimulationConfig;
use crate::simulation::stabilizers::clamp_scalar;
use crate::simulation::states::{Body, NVec3};

/// Trait for acceleration sources operating on a slice of bodies
///
/// Implementations must zero `out` and then write the net acceleration of
/// every body into `out[i]`. `out.len()` must equal `bodies.len()`.
pub trait Acceleration {
    fn acceleration(&self, bodies: &[Body], out: &mut [NVec3]);
}

/// Newtonian gravity with additive softening and per-pair clamping
/// (direct n^2 sum over unordered pairs)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonianGravity {
    pub g: f64,                // gravitational constant
    pub eps2: f64,             // softening squared
    pub max_acceleration: f64, // clamp applied to each pair term
}

impl NewtonianGravity {
    pub fn from_config(cfg: &SimulationConfig) -> Self {
        Self {
            g: cfg.g(),
            eps2: cfg.softening() * cfg.softening(),
            max_acceleration: cfg.max_acceleration(),
        }
    }

    /// Unit direction of `r` and the softened geometric factor |r| / |r_soft|^3
    ///
    /// `None` for coincident bodies, where no direction is defined
    #[inline]
    fn pair_geometry(&self, r: NVec3) -> Option<(NVec3, f64)> {
        let dist = r.norm();
        if dist == 0.0 {
            return None;
        }
        // d2 = |r|^2 + eps^2, softening enters squared so the potential stays smooth
        let d2 = dist * dist + self.eps2;
        // at tiny separations this saturates to inf, never to NaN
        Some((r / dist, dist / d2 / d2.sqrt()))
    }

    /// Pull of a body of mass `m` along `dir`, magnitude clamped before scaling
    #[inline]
    fn pair_term(&self, dir: NVec3, geometry: f64, m: f64) -> NVec3 {
        let gm = self.g * m;
        if gm == 0.0 {
            return NVec3::zeros();
        }
        dir * clamp_scalar(gm * geometry, self.max_acceleration)
    }
}

impl Acceleration for NewtonianGravity {
    fn acceleration(&self, bodies: &[Body], out: &mut [NVec3]) {
        debug_assert_eq!(out.len(), bodies.len(), "acceleration buffer out of sync with bodies");

        // Zero buffer
        for a in out.iter_mut() {
            *a = NVec3::zeros();
        }

        let n = bodies.len();
        if n < 2 {
            return;
        }

        // Loop over each unordered pair (i, j) with i < j
        for i in 0..n {
            let xi = bodies[i].x;
            let mi = bodies[i].mass();

            for j in (i + 1)..n {
                let xj = bodies[j].x;
                let mj = bodies[j].mass();

                // r points from i to j: i is pulled along +r, j along -r
                let Some((dir, geometry)) = self.pair_geometry(xj - xi) else {
                    continue;
                };

                // a_i +=  G * m_j * r / |r_soft|^3
                // a_j += -G * m_i * r / |r_soft|^3
                // each term clamped on its own so a near-collision cannot blow up the sum
                out[i] += self.pair_term(dir, geometry, mj);
                out[j] -= self.pair_term(dir, geometry, mi);
            }
        }
    }
}

/// Same field as [`NewtonianGravity`], with one rayon task per body row
///
/// Each body sums its own clamped pair terms, so no two tasks write the same
/// slot. Pair work is done twice, in exchange for no synchronisation.
#[cfg(feature = "parallel")]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonianGravityPar(pub NewtonianGravity);

#[cfg(feature = "parallel")]
impl Acceleration for NewtonianGravityPar {
    fn acceleration(&self, bodies: &[Body], out: &mut [NVec3]) {
        use rayon::prelude::*;

        debug_assert_eq!(out.len(), bodies.len(), "acceleration buffer out of sync with bodies");
        let field = &self.0;

        out.par_iter_mut().enumerate().for_each(|(i, ai)| {
            let xi = bodies[i].x;
            let mut acc = NVec3::zeros();
            for (j, bj) in bodies.iter().enumerate() {
                if i == j {
                    continue;
                }
                if let Some((dir, geometry)) = field.pair_geometry(bj.x - xi) {
                    acc += field.pair_term(dir, geometry, bj.mass());
                }
            }
            *ai = acc;
        });
    }
}

/// Per-body gravity evaluator for the rk4 scheme
///
/// Computes the pull on one body at a trial position/velocity from every
/// other body at its start-of-step position, optionally scaled by the
/// post-Newtonian factor `1 + 3 L^2 / (c^2 d^4)` with `L = r x v_trial`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostNewtonianGravity {
    pub g: f64,
    pub eps2: f64,
    pub max_acceleration: f64,
    pub c2: Option<f64>,      // speed of light squared, None disables the correction
    pub min_separation: f64, // closer pairs are ignored
}

impl PostNewtonianGravity {
    pub fn from_config(cfg: &SimulationConfig) -> Self {
        Self {
            g: cfg.g(),
            eps2: cfg.softening() * cfg.softening(),
            max_acceleration: cfg.max_acceleration(),
            c2: cfg.speed_of_light().map(|c| c * c),
            min_separation: cfg.min_separation(),
        }
    }

    /// Net acceleration on body `index` at trial state (`x`, `v`)
    ///
    /// `positions` and `masses` describe every body at the start of the step;
    /// the entry at `index` is skipped
    pub fn acceleration_at(
        &self,
        index: usize,
        x: NVec3,
        v: NVec3,
        positions: &[NVec3],
        masses: &[f64],
    ) -> NVec3 {
        let mut total = NVec3::zeros();

        for (j, (xj, mj)) in positions.iter().zip(masses.iter()).enumerate() {
            if j == index {
                continue;
            }

            let r = xj - x;
            let dist = r.norm();
            if dist < self.min_separation || dist == 0.0 {
                continue;
            }

            let gm = self.g * mj;
            if gm == 0.0 {
                continue;
            }

            // Newtonian magnitude G m / d^2 on the softened distance
            let d2 = dist * dist + self.eps2;
            let mut magnitude = gm / d2;

            if let Some(c2) = self.c2 {
                let l2 = r.cross(&v).norm_squared();
                if l2 > 0.0 {
                    magnitude *= 1.0 + 3.0 * l2 / (c2 * d2 * d2);
                }
            }

            total += (r / dist) * clamp_scalar(magnitude, self.max_acceleration);
        }

        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(dist: f64, m1: f64, m2: f64) -> Vec<Body> {
        vec![
            Body::at_rest(NVec3::new(-dist / 2.0, 0.0, 0.0), m1).unwrap(),
            Body::at_rest(NVec3::new(dist / 2.0, 0.0, 0.0), m2).unwrap(),
        ]
    }

    fn plain(g: f64) -> NewtonianGravity {
        NewtonianGravity {
            g,
            eps2: 0.0,
            max_acceleration: f64::INFINITY,
        }
    }

    #[test]
    fn stale_buffer_is_zeroed_for_single_body() {
        let bodies = vec![Body::at_rest(NVec3::zeros(), 1.0).unwrap()];
        let mut out = vec![NVec3::new(9.0, 9.0, 9.0)];
        plain(1.0).acceleration(&bodies, &mut out);
        assert_eq!(out[0], NVec3::zeros());
    }

    #[test]
    fn coincident_bodies_without_softening_stay_finite() {
        let bodies = pair(0.0, 1.0, 1.0);
        let mut out = vec![NVec3::zeros(); 2];
        plain(1.0).acceleration(&bodies, &mut out);
        assert!(out.iter().all(|a| a.iter().all(|c| c.is_finite())));
    }

    #[test]
    fn near_coincident_pair_without_softening_hits_the_cap() {
        let bodies = vec![
            Body::at_rest(NVec3::zeros(), 1.0).unwrap(),
            Body::at_rest(NVec3::new(1e-110, 0.0, 0.0), 1.0).unwrap(),
        ];
        let field = NewtonianGravity {
            g: 1.0,
            eps2: 0.0,
            max_acceleration: 1000.0,
        };
        let mut out = vec![NVec3::zeros(); 2];
        field.acceleration(&bodies, &mut out);

        assert!((out[0] - NVec3::new(1000.0, 0.0, 0.0)).norm() < 1e-9);
        assert!((out[1] - NVec3::new(-1000.0, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn post_newtonian_near_coincident_pair_hits_the_cap() {
        let positions = vec![NVec3::zeros(), NVec3::new(1e-110, 0.0, 0.0)];
        let masses = vec![1.0, 1.0];
        let field = PostNewtonianGravity {
            g: 1.0,
            eps2: 0.0,
            max_acceleration: 1000.0,
            c2: Some(1.0),
            min_separation: 0.0,
        };

        for v in [NVec3::zeros(), NVec3::new(0.0, 1.0, 0.0)] {
            let a = field.acceleration_at(0, positions[0], v, &positions, &masses);
            assert!((a - NVec3::new(1000.0, 0.0, 0.0)).norm() < 1e-9, "{a:?}");
        }
    }

    #[test]
    fn repulsive_constant_is_clamped_too() {
        let bodies = pair(1e-3, 1.0, 1.0);
        let field = NewtonianGravity {
            g: -1.0,
            eps2: 0.0,
            max_acceleration: 5.0,
        };
        let mut out = vec![NVec3::zeros(); 2];
        field.acceleration(&bodies, &mut out);

        assert!((out[0] - NVec3::new(-5.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((out[1] - NVec3::new(5.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn pair_terms_are_clamped_separately() {
        // heavy body j, light body i: only i's term exceeds the cap
        let bodies = pair(1.0, 1.0, 100.0);
        let field = NewtonianGravity {
            g: 1.0,
            eps2: 0.0,
            max_acceleration: 10.0,
        };
        let mut out = vec![NVec3::zeros(); 2];
        field.acceleration(&bodies, &mut out);

        assert!((out[0].norm() - 10.0).abs() < 1e-12);
        assert!((out[1].norm() - 1.0).abs() < 1e-12);
        assert!(out[0].x > 0.0 && out[1].x < 0.0);
    }

    #[test]
    fn post_newtonian_factor_strengthens_pull() {
        let positions = vec![NVec3::zeros(), NVec3::new(1.0, 0.0, 0.0)];
        let masses = vec![1.0, 1.0];
        let v = NVec3::new(0.0, 1.0, 0.0);

        let newton = PostNewtonianGravity {
            g: 1.0,
            eps2: 0.0,
            max_acceleration: f64::INFINITY,
            c2: None,
            min_separation: 0.0,
        };
        let pn = PostNewtonianGravity { c2: Some(4.0), ..newton };

        let a_n = newton.acceleration_at(0, positions[0], v, &positions, &masses);
        let a_pn = pn.acceleration_at(0, positions[0], v, &positions, &masses);

        assert!((a_n.x - 1.0).abs() < 1e-12);
        // L^2 = 1, c^2 = 4, d = 1 -> factor 1.75
        assert!((a_pn.x - 1.75).abs() < 1e-12);
    }

    #[test]
    fn post_newtonian_skips_close_pairs() {
        let positions = vec![NVec3::zeros(), NVec3::new(0.001, 0.0, 0.0)];
        let masses = vec![1.0, 1.0];
        let field = PostNewtonianGravity {
            g: 1.0,
            eps2: 0.0,
            max_acceleration: f64::INFINITY,
            c2: None,
            min_separation: 0.01,
        };
        let a = field.acceleration_at(0, positions[0], NVec3::zeros(), &positions, &masses);
        assert_eq!(a, NVec3::zeros());
    }
}

#[cfg(all(test, feature = "parallel"))]
mod parallel_tests {
    use super::*;
    use crate::benchmark::benchmark::make_bodies;
    use approx::assert_relative_eq;

    #[test]
    fn row_parallel_field_matches_serial_sum() {
        let bodies = make_bodies(50);

        // 1e9 leaves every pair unclamped, 0.5 clamps the close ones
        for max_acceleration in [1e9, 0.5] {
            let serial = NewtonianGravity {
                g: 1.0,
                eps2: 0.01,
                max_acceleration,
            };
            let mut expected = vec![NVec3::zeros(); bodies.len()];
            let mut got = vec![NVec3::new(7.0, 7.0, 7.0); bodies.len()];
            serial.acceleration(&bodies, &mut expected);
            NewtonianGravityPar(serial).acceleration(&bodies, &mut got);

            for (e, g) in expected.iter().zip(got.iter()) {
                for k in 0..3 {
                    assert_relative_eq!(e[k], g[k], epsilon = 1e-12, max_relative = 1e-9);
                }
            }
        }
    }
}
