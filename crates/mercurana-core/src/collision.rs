// ─────────────────────────────────────────────────────────────────────
// Mercurana N-Body Core — Collision
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Collision hand-off.
//!
//! The drift predictor records physically overlapping pairs into a
//! growable buffer; at the end of every predictor pass the buffer is
//! submitted in one batch to the external resolver. Any change in the
//! particle count is a structural invalidation: the core remaps its
//! residency bookkeeping and re-runs the predictor at the same shell.

use mercurana_math::roots::cbrt_newton;
use mercurana_types::state::Particle;

/// A detected overlap between particles `p1` and `p2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub p1: usize,
    pub p2: usize,
}

/// External collision resolver.
///
/// Implementations may mutate surviving particles in place and return the
/// indices of particles to delete. The core performs the deletion and
/// remaps all shell residency state, so resolvers must not reorder or
/// remove particles themselves.
pub trait CollisionResolver {
    fn resolve(&mut self, particles: &mut [Particle], pairs: &[CollisionPair]) -> Vec<usize>;
}

/// Momentum-conserving perfect-merger resolver.
///
/// The lower-indexed body of every pair absorbs the higher-indexed one:
/// summed mass, centre-of-mass position/velocity, volume-additive radius.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeResolver;

impl CollisionResolver for MergeResolver {
    fn resolve(&mut self, particles: &mut [Particle], pairs: &[CollisionPair]) -> Vec<usize> {
        let mut removed = Vec::new();
        for pair in pairs {
            let (keep, gone) = if pair.p1 < pair.p2 {
                (pair.p1, pair.p2)
            } else {
                (pair.p2, pair.p1)
            };
            if removed.contains(&gone) || removed.contains(&keep) {
                continue; // already consumed by an earlier merger this batch
            }
            let a = particles[keep];
            let b = particles[gone];
            let m = a.m + b.m;
            if m <= 0.0 {
                continue;
            }
            let inv_m = 1.0 / m;
            let merged = Particle {
                x: (a.m * a.x + b.m * b.x) * inv_m,
                y: (a.m * a.y + b.m * b.y) * inv_m,
                z: (a.m * a.z + b.m * b.z) * inv_m,
                vx: (a.m * a.vx + b.m * b.vx) * inv_m,
                vy: (a.m * a.vy + b.m * b.vy) * inv_m,
                vz: (a.m * a.vz + b.m * b.vz) * inv_m,
                ax: a.ax,
                ay: a.ay,
                az: a.az,
                m,
                r: cbrt_newton(a.r * a.r * a.r + b.r * b.r * b.r),
            };
            particles[keep] = merged;
            removed.push(gone);
        }
        removed
    }
}
