// ─────────────────────────────────────────────────────────────────────
// Mercurana N-Body Core — Encounter Predictor
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-shell close-encounter prediction.
//!
//! Before every drift the predictor estimates, under linear motion, the
//! closest approach of each candidate pair over the upcoming interval.
//! Pairs that would come within the sum of their critical radii are
//! promoted into the next shell before the drift executes; pairs that
//! stay clear instead tighten each member's maxdrift budget, the distance
//! it may drift before its neighbour relationships must be re-examined.
//! The predictor never evaluates accelerations.

use mercurana_types::constants::MAXDRIFT_UNBOUNDED;
use mercurana_types::state::Particle;
use ndarray::Array2;

use crate::collision::CollisionPair;
use crate::integrator;
use crate::simulation::Simulation;

/// Minimum squared separation of two bodies over a drift of length `dt`
/// under linear motion: the smaller endpoint value, refined by the
/// interior closest approach when it falls inside the interval.
pub(crate) fn predict_rmin2(p1: &Particle, p2: &Particle, dt: f64) -> f64 {
    let dts = dt.signum();
    let dt = dt.abs();
    let dx1 = p1.x - p2.x;
    let dy1 = p1.y - p2.y;
    let dz1 = p1.z - p2.z;
    let r1 = dx1 * dx1 + dy1 * dy1 + dz1 * dz1;
    let dvx = dts * (p1.vx - p2.vx);
    let dvy = dts * (p1.vy - p2.vy);
    let dvz = dts * (p1.vz - p2.vz);
    let dx2 = dx1 + dt * dvx;
    let dy2 = dy1 + dt * dvy;
    let dz2 = dz1 + dt * dvz;
    let r2 = dx2 * dx2 + dy2 * dy2 + dz2 * dz2;

    let mut rmin2 = r1.min(r2);
    let dv2 = dvx * dvx + dvy * dvy + dvz * dvz;
    if dv2 > 0.0 {
        let t_closest = -(dx1 * dvx + dy1 * dvy + dz1 * dvz) / dv2;
        if (0.0..=dt).contains(&t_closest) {
            let dx3 = dx1 + t_closest * dvx;
            let dy3 = dy1 + t_closest * dvy;
            let dz3 = dz1 + t_closest * dvz;
            rmin2 = rmin2.min(dx3 * dx3 + dy3 * dy3 + dz3 * dz3);
        }
    }
    rmin2
}

/// [`predict_rmin2`] with `p2` first advanced linearly by `p2_drift`,
/// aligning a pair whose accumulated drift times differ.
pub(crate) fn predict_rmin2_drifted(
    p1: &Particle,
    p2: &Particle,
    dt: f64,
    p2_drift: f64,
) -> f64 {
    let p2_aligned = p2.drifted(p2_drift);
    predict_rmin2(p1, &p2_aligned, dt)
}

/// Seed the outermost shell: dominants are the leading indices,
/// everything else starts as subdominant and encounter; depths and drift
/// budgets are fresh. Also run by `prepare` so that a processed scheme's
/// leading kick finds a populated shell before the first drift.
pub(crate) fn seed_outermost(rim: &mut integrator::Mercurana, n: usize) {
    let nd = rim.config.n_dominant;
    rim.shelln_dominant[0] = nd;
    rim.shelln_subdominant[0] = n - nd;
    rim.shelln_encounter[0] = n - nd;
    for i in 0..nd {
        rim.map_dominant[[0, i]] = i;
    }
    for i in 0..(n - nd) {
        rim.map_subdominant[[0, i]] = nd + i;
        rim.map_encounter[[0, i]] = nd + i;
    }
    for i in 0..n {
        rim.maxdrift_dominant[i] = MAXDRIFT_UNBOUNDED;
        rim.maxdrift_encounter[i] = MAXDRIFT_UNBOUNDED;
        rim.inshell_dominant[i] = 0;
        rim.inshell_subdominant[i] = 0;
        rim.inshell_encounter[i] = 0;
    }
}

fn promote(
    inshell: &mut [usize],
    map: &mut Array2<usize>,
    shelln: &mut [usize],
    shell: usize,
    idx: usize,
) {
    if inshell[idx] == shell {
        inshell[idx] = shell + 1;
        let count = shelln[shell + 1];
        map[[shell + 1, count]] = idx;
        shelln[shell + 1] = count + 1;
    }
}

/// Check for close encounters and physical collisions among the
/// residents of `shell` for an upcoming drift of length `dt`, promoting
/// pairs into the next shell where needed.
pub(crate) fn encounter_predict(sim: &mut Simulation, dt: f64, shell: usize) {
    let n = sim.particles.len();
    let direct_collisions =
        sim.mercurana.config.collision == mercurana_types::config::CollisionMode::Direct;

    {
        let rim = &mut sim.mercurana;
        let particles = &mut sim.particles;

        if shell + 1 >= rim.config.nmaxshells {
            // Truncated at maximum depth; integration continues at the
            // coarser resolution.
            tracing::debug!(shell, "no deeper shell available for promotion");
            return;
        }

        rim.collisions.clear();
        rim.shelln_dominant[shell + 1] = 0;
        rim.shelln_subdominant[shell + 1] = 0;
        rim.shelln_encounter[shell + 1] = 0;

        let nd_s;
        let nsub_s;
        let nenc_s;
        if shell == 0 {
            seed_outermost(rim, n);
            let nd = rim.config.n_dominant;
            nd_s = nd;
            nsub_s = n - nd;
            nenc_s = n - nd;
        } else {
            nd_s = rim.shelln_dominant[shell];
            nsub_s = rim.shelln_subdominant[shell];
            nenc_s = rim.shelln_encounter[shell];

            // Depth is monotone within a drift interval: residents that
            // already live below this shell must reappear in the rebuilt
            // sub-shell row, or later sub-steps would strand them.
            for k in 0..nd_s {
                let mi = rim.map_dominant[[shell, k]];
                if rim.inshell_dominant[mi] > shell {
                    let count = rim.shelln_dominant[shell + 1];
                    rim.map_dominant[[shell + 1, count]] = mi;
                    rim.shelln_dominant[shell + 1] = count + 1;
                }
            }
            for k in 0..nsub_s {
                let mi = rim.map_subdominant[[shell, k]];
                if rim.inshell_subdominant[mi] > shell {
                    let count = rim.shelln_subdominant[shell + 1];
                    rim.map_subdominant[[shell + 1, count]] = mi;
                    rim.shelln_subdominant[shell + 1] = count + 1;
                }
            }
            for k in 0..nenc_s {
                let mi = rim.map_encounter[[shell, k]];
                if rim.inshell_encounter[mi] > shell {
                    let count = rim.shelln_encounter[shell + 1];
                    rim.map_encounter[[shell + 1, count]] = mi;
                    rim.shelln_encounter[shell + 1] = count + 1;
                }
            }

            // Maxdrift violations: a resident that moved further than its
            // budget since the step began may have invalidated rmin
            // estimates against shallower particles; re-examine those and
            // pull violating partners into this shell.
            // TODO: extend the re-examination to dominant residents using
            // their maxdrift_dominant budget.
            for k in 0..nenc_s {
                let mi = rim.map_encounter[[shell, k]];
                let dx = particles[mi].x - rim.p0[mi].x;
                let dy = particles[mi].y - rim.p0[mi].y;
                let dz = particles[mi].z - rim.p0[mi].z;
                let drift_distance = (dx * dx + dy * dy + dz * dz).sqrt();
                if drift_distance <= rim.maxdrift_encounter[mi] {
                    continue;
                }
                for k0 in 0..rim.shelln_encounter[0] {
                    let mj = rim.map_encounter[[0, k0]];
                    if rim.inshell_encounter[mj] >= shell {
                        continue;
                    }
                    let dt_offset = rim.t_drifted[mi] - rim.t_drifted[mj];
                    let rmin2 =
                        predict_rmin2_drifted(&particles[mi], &particles[mj], dt, dt_offset);
                    let dcritsum = rim.dcrit[[shell, mi]] + rim.dcrit[[shell, mj]];
                    if rmin2 < dcritsum * dcritsum {
                        // Pull the laggard into every shell down to this
                        // one, apply its pending drift so it catches up,
                        // and void its remaining budget.
                        let from = rim.inshell_encounter[mj];
                        rim.inshell_encounter[mj] = shell;
                        for s in (from + 1)..=shell {
                            let count = rim.shelln_encounter[s];
                            rim.map_encounter[[s, count]] = mj;
                            rim.shelln_encounter[s] = count + 1;
                        }
                        particles[mj].x += dt_offset * particles[mj].vx;
                        particles[mj].y += dt_offset * particles[mj].vy;
                        particles[mj].z += dt_offset * particles[mj].vz;
                        rim.t_drifted[mj] += dt_offset;
                        rim.maxdrift_encounter[mj] = 0.0;
                    } else {
                        let maxdrift = (rmin2.sqrt() - dcritsum) / 2.0;
                        rim.maxdrift_encounter[mi] = rim.maxdrift_encounter[mi].min(maxdrift);
                    }
                }
            }
        }

        // (1) Dominant and dominant.
        for ki in 0..nd_s {
            let mi = rim.map_dominant[[shell, ki]];
            for kj in (ki + 1)..nd_s {
                let mj = rim.map_dominant[[shell, kj]];
                let rmin2 = predict_rmin2(&particles[mi], &particles[mj], dt);
                let rsum = particles[mi].r + particles[mj].r;
                if rmin2 < rsum * rsum && direct_collisions {
                    rim.collisions.push(CollisionPair { p1: mi, p2: mj });
                }
                let dcritsum = rim.dcrit[[shell, mi]] + rim.dcrit[[shell, mj]];
                if rmin2 < dcritsum * dcritsum {
                    promote(
                        &mut rim.inshell_dominant,
                        &mut rim.map_dominant,
                        &mut rim.shelln_dominant,
                        shell,
                        mi,
                    );
                    promote(
                        &mut rim.inshell_dominant,
                        &mut rim.map_dominant,
                        &mut rim.shelln_dominant,
                        shell,
                        mj,
                    );
                } else {
                    let maxdrift = (rmin2.sqrt() - dcritsum) / 2.0;
                    rim.maxdrift_dominant[mi] = rim.maxdrift_dominant[mi].min(maxdrift);
                    rim.maxdrift_dominant[mj] = rim.maxdrift_dominant[mj].min(maxdrift);
                }
            }
        }

        // (2) Dominant and subdominant.
        for ki in 0..nd_s {
            let mi = rim.map_dominant[[shell, ki]];
            for kj in 0..nsub_s {
                let mj = rim.map_subdominant[[shell, kj]];
                let rmin2 = predict_rmin2(&particles[mi], &particles[mj], dt);
                let rsum = particles[mi].r + particles[mj].r;
                if rmin2 < rsum * rsum && direct_collisions {
                    rim.collisions.push(CollisionPair { p1: mi, p2: mj });
                }
                let dcritsum = rim.dcrit[[shell, mi]] + rim.dcrit[[shell, mj]];
                if rmin2 < dcritsum * dcritsum {
                    promote(
                        &mut rim.inshell_dominant,
                        &mut rim.map_dominant,
                        &mut rim.shelln_dominant,
                        shell,
                        mi,
                    );
                    promote(
                        &mut rim.inshell_subdominant,
                        &mut rim.map_subdominant,
                        &mut rim.shelln_subdominant,
                        shell,
                        mj,
                    );
                } else {
                    let maxdrift = (rmin2.sqrt() - dcritsum) / 2.0;
                    rim.maxdrift_dominant[mi] = rim.maxdrift_dominant[mi].min(maxdrift);
                    rim.maxdrift_dominant[mj] = rim.maxdrift_dominant[mj].min(maxdrift);
                }
            }
        }

        // (3) Encounter and encounter. Subdominant–subdominant pairs
        // never promote on their own; at shell 0 the encounter sweep is
        // exactly that sweep, deeper down the assumption is structural.
        for ki in 0..nenc_s {
            let mi = rim.map_encounter[[shell, ki]];
            for kj in (ki + 1)..nenc_s {
                let mj = rim.map_encounter[[shell, kj]];
                let rmin2 = predict_rmin2(&particles[mi], &particles[mj], dt);
                let rsum = particles[mi].r + particles[mj].r;
                if rmin2 < rsum * rsum && direct_collisions {
                    rim.collisions.push(CollisionPair { p1: mi, p2: mj });
                }
                let dcritsum = rim.dcrit[[shell, mi]] + rim.dcrit[[shell, mj]];
                if rmin2 < dcritsum * dcritsum {
                    promote(
                        &mut rim.inshell_encounter,
                        &mut rim.map_encounter,
                        &mut rim.shelln_encounter,
                        shell,
                        mi,
                    );
                    promote(
                        &mut rim.inshell_encounter,
                        &mut rim.map_encounter,
                        &mut rim.shelln_encounter,
                        shell,
                        mj,
                    );
                } else {
                    let maxdrift = (rmin2.sqrt() - dcritsum) / 2.0;
                    rim.maxdrift_encounter[mi] = rim.maxdrift_encounter[mi].min(maxdrift);
                    rim.maxdrift_encounter[mj] = rim.maxdrift_encounter[mj].min(maxdrift);
                }
            }
        }
    }

    if resolve_collisions(sim) {
        // The particle set changed shape; promotions must be redone.
        encounter_predict(sim, dt, shell);
    }
}

/// Hand the collision buffer to the resolver. Returns whether the
/// particle count changed (a structural invalidation).
fn resolve_collisions(sim: &mut Simulation) -> bool {
    if sim.mercurana.collisions.is_empty() {
        return false;
    }
    let Some(mut resolver) = sim.resolver.take() else {
        // No resolver installed: leave the buffer for host inspection;
        // the next predictor pass clears it.
        return false;
    };
    let pairs = std::mem::take(&mut sim.mercurana.collisions);
    let removed = resolver.resolve(&mut sim.particles, &pairs);
    sim.resolver = Some(resolver);
    if removed.is_empty() {
        return false;
    }
    integrator::remove_particles(sim, removed);
    true
}
