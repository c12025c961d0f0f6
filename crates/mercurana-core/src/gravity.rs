// ─────────────────────────────────────────────────────────────────────
// Mercurana N-Body Core — Gravity
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Acceleration and force-gradient evaluation.
//!
//! `Basic` is a plain softened direct sum over all pairs. The shell-aware
//! mode evaluates only the pairs of the currently published shell and
//! weights every contribution with a partition-of-unity window built from
//! the switching function, so that summing the kicks of all shells a pair
//! passes through recovers exactly the full Newtonian force.

use mercurana_math::switching;
use mercurana_types::state::Particle;

use crate::integrator::Mercurana;
use crate::simulation::Simulation;

/// Active gravity evaluator. The shell integrator publishes
/// [`GravityMode::Mercurana`] for the duration of a kick and forces the
/// mode back to `None` afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GravityMode {
    #[default]
    None,
    Basic,
    Mercurana,
}

/// Evaluate accelerations for the active gravity mode.
pub(crate) fn update_acceleration(sim: &mut Simulation) {
    match sim.gravity {
        GravityMode::None => {}
        GravityMode::Basic => basic_accelerations(sim),
        GravityMode::Mercurana => shell_accelerations(sim),
    }
}

/// Evaluate and apply the force-gradient (jerk) impulse scaled by `v`.
pub(crate) fn apply_jerk(sim: &mut Simulation, v: f64) {
    match sim.gravity {
        GravityMode::None => {}
        GravityMode::Basic => basic_jerk(sim, v),
        GravityMode::Mercurana => shell_jerk(sim, v),
    }
}

fn basic_accelerations(sim: &mut Simulation) {
    let soft2 = sim.softening * sim.softening;
    let g = sim.g;
    let particles = &mut sim.particles;
    for p in particles.iter_mut() {
        p.ax = 0.0;
        p.ay = 0.0;
        p.az = 0.0;
    }
    for i in 0..particles.len() {
        for j in (i + 1)..particles.len() {
            accumulate_pair(particles, i, j, g, soft2, 1.0);
        }
    }
}

/// Add the mutual attraction of pair `(i, j)` weighted by `w`.
fn accumulate_pair(particles: &mut [Particle], i: usize, j: usize, g: f64, soft2: f64, w: f64) {
    if w == 0.0 {
        return;
    }
    let dx = particles[i].x - particles[j].x;
    let dy = particles[i].y - particles[j].y;
    let dz = particles[i].z - particles[j].z;
    let d2 = dx * dx + dy * dy + dz * dz + soft2;
    let inv_r = d2.sqrt().recip();
    let coef = g * w * inv_r * inv_r * inv_r;
    let mi = particles[i].m;
    let mj = particles[j].m;
    particles[i].ax -= coef * mj * dx;
    particles[i].ay -= coef * mj * dy;
    particles[i].az -= coef * mj * dz;
    particles[j].ax += coef * mi * dx;
    particles[j].ay += coef * mi * dy;
    particles[j].az += coef * mi * dz;
}

/// Add the force-gradient impulse of pair `(i, j)` weighted by `w`.
///
/// The impulse on `i` is `v · 2 G m_j (Δa/r³ − 3 (Δa·r) r/r⁵)` with
/// `Δa = a_i − a_j`, the derivative of the squared-force correction of the
/// modified-potential kick; `j` receives the opposite-signed share.
fn accumulate_pair_jerk(particles: &mut [Particle], i: usize, j: usize, g: f64, v: f64, w: f64) {
    if w == 0.0 {
        return;
    }
    let dx = particles[i].x - particles[j].x;
    let dy = particles[i].y - particles[j].y;
    let dz = particles[i].z - particles[j].z;
    let dax = particles[i].ax - particles[j].ax;
    let day = particles[i].ay - particles[j].ay;
    let daz = particles[i].az - particles[j].az;
    let r2 = dx * dx + dy * dy + dz * dz;
    if r2 == 0.0 {
        return;
    }
    let r = r2.sqrt();
    let alphasum = dax * dx + day * dy + daz * dz;
    let prefact2 = 2.0 * v * g * w / (r2 * r);
    let prefact1 = 3.0 * alphasum * prefact2 / r2;
    let mi = particles[i].m;
    let mj = particles[j].m;
    particles[i].vx += mj * (prefact2 * dax - prefact1 * dx);
    particles[i].vy += mj * (prefact2 * day - prefact1 * dy);
    particles[i].vz += mj * (prefact2 * daz - prefact1 * dz);
    particles[j].vx -= mi * (prefact2 * dax - prefact1 * dx);
    particles[j].vy -= mi * (prefact2 * day - prefact1 * dy);
    particles[j].vz -= mi * (prefact2 * daz - prefact1 * dz);
}

fn basic_jerk(sim: &mut Simulation, v: f64) {
    let g = sim.g;
    let particles = &mut sim.particles;
    for i in 0..particles.len() {
        for j in (i + 1)..particles.len() {
            accumulate_pair_jerk(particles, i, j, g, v, 1.0);
        }
    }
}

/// Fraction of the pair force owned by shell `s` at separation `d`.
///
/// `Λ_s` opens between the critical-radius sums of shells `s` and `s−1`;
/// the windows `Λ_{s+1} − Λ_s` telescope to one over all shells, so every
/// pair force is assigned exactly once.
fn shell_weight(rim: &Mercurana, s: usize, d: f64, i: usize, j: usize) -> f64 {
    let l = rim.switching.unwrap_or(switching::l_infinity);
    let lambda_inner = if s + 1 < rim.config.nmaxshells {
        l(
            d,
            rim.dcrit[[s + 1, i]] + rim.dcrit[[s + 1, j]],
            rim.dcrit[[s, i]] + rim.dcrit[[s, j]],
        )
    } else {
        1.0
    };
    let lambda_outer = if s > 0 {
        l(
            d,
            rim.dcrit[[s, i]] + rim.dcrit[[s, j]],
            rim.dcrit[[s - 1, i]] + rim.dcrit[[s - 1, j]],
        )
    } else {
        0.0
    };
    lambda_inner - lambda_outer
}

fn zero_residents(rim: &Mercurana, particles: &mut [Particle], s: usize) {
    for k in 0..rim.shelln_dominant[s] {
        let i = rim.map_dominant[[s, k]];
        particles[i].ax = 0.0;
        particles[i].ay = 0.0;
        particles[i].az = 0.0;
    }
    for k in 0..rim.shelln_subdominant[s] {
        let i = rim.map_subdominant[[s, k]];
        particles[i].ax = 0.0;
        particles[i].ay = 0.0;
        particles[i].az = 0.0;
    }
    for k in 0..rim.shelln_encounter[s] {
        let i = rim.map_encounter[[s, k]];
        particles[i].ax = 0.0;
        particles[i].ay = 0.0;
        particles[i].az = 0.0;
    }
}

/// Pair sweeps of the published shell: dominant × dominant, dominant ×
/// subdominant, encounter × encounter. Subdominant–subdominant forces
/// never cross a shell boundary (the predictor never promotes such a
/// pair), so at shell 0 they are covered by the encounter sweep and at
/// deeper shells they do not arise.
fn shell_accelerations(sim: &mut Simulation) {
    let rim = &sim.mercurana;
    let particles = &mut sim.particles;
    let s = rim.current_shell;
    let g = sim.g;
    let soft2 = sim.softening * sim.softening;

    zero_residents(rim, particles, s);

    for ki in 0..rim.shelln_dominant[s] {
        let i = rim.map_dominant[[s, ki]];
        for kj in (ki + 1)..rim.shelln_dominant[s] {
            let j = rim.map_dominant[[s, kj]];
            let d = particles[i].separation_squared(&particles[j]).sqrt();
            let w = shell_weight(rim, s, d, i, j);
            accumulate_pair(particles, i, j, g, soft2, w);
        }
    }
    for ki in 0..rim.shelln_dominant[s] {
        let i = rim.map_dominant[[s, ki]];
        for kj in 0..rim.shelln_subdominant[s] {
            let j = rim.map_subdominant[[s, kj]];
            let d = particles[i].separation_squared(&particles[j]).sqrt();
            let w = shell_weight(rim, s, d, i, j);
            accumulate_pair(particles, i, j, g, soft2, w);
        }
    }
    for ki in 0..rim.shelln_encounter[s] {
        let i = rim.map_encounter[[s, ki]];
        for kj in (ki + 1)..rim.shelln_encounter[s] {
            let j = rim.map_encounter[[s, kj]];
            let d = particles[i].separation_squared(&particles[j]).sqrt();
            let w = shell_weight(rim, s, d, i, j);
            accumulate_pair(particles, i, j, g, soft2, w);
        }
    }
}

fn shell_jerk(sim: &mut Simulation, v: f64) {
    let rim = &sim.mercurana;
    let particles = &mut sim.particles;
    let s = rim.current_shell;
    let g = sim.g;

    for ki in 0..rim.shelln_dominant[s] {
        let i = rim.map_dominant[[s, ki]];
        for kj in (ki + 1)..rim.shelln_dominant[s] {
            let j = rim.map_dominant[[s, kj]];
            let d = particles[i].separation_squared(&particles[j]).sqrt();
            let w = shell_weight(rim, s, d, i, j);
            accumulate_pair_jerk(particles, i, j, g, v, w);
        }
    }
    for ki in 0..rim.shelln_dominant[s] {
        let i = rim.map_dominant[[s, ki]];
        for kj in 0..rim.shelln_subdominant[s] {
            let j = rim.map_subdominant[[s, kj]];
            let d = particles[i].separation_squared(&particles[j]).sqrt();
            let w = shell_weight(rim, s, d, i, j);
            accumulate_pair_jerk(particles, i, j, g, v, w);
        }
    }
    for ki in 0..rim.shelln_encounter[s] {
        let i = rim.map_encounter[[s, ki]];
        for kj in (ki + 1)..rim.shelln_encounter[s] {
            let j = rim.map_encounter[[s, kj]];
            let d = particles[i].separation_squared(&particles[j]).sqrt();
            let w = shell_weight(rim, s, d, i, j);
            accumulate_pair_jerk(particles, i, j, g, v, w);
        }
    }
}
