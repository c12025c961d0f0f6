// ─────────────────────────────────────────────────────────────────────
// Mercurana N-Body Core — Shell Kernels
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Shell-local drift and kick operators.
//!
//! The drift advances the positions of the particles resident at its
//! shell and recurses into the next shell's composition when the
//! predictor promoted anybody. The kick publishes the shell to the
//! gravity evaluator and applies the acceleration (and optional
//! force-gradient) impulses to the shell's residents.

use mercurana_math::eos::{self, OperatorKernel};

use crate::gravity::{self, GravityMode};
use crate::predict;
use crate::simulation::Simulation;

/// Adapter handing the shell kernels to the composition library as its
/// drift/kick callbacks. Monomorphic; no dynamic dispatch.
pub(crate) struct ShellOps<'a>(pub &'a mut Simulation);

impl OperatorKernel for ShellOps<'_> {
    fn drift(&mut self, dt: f64, shell: usize) {
        drift_step(self.0, dt, shell);
    }

    fn kick(&mut self, y: f64, v: f64, shell: usize) {
        interaction_step(self.0, y, v, shell);
    }
}

/// Drift operator: predict encounters, advance resident positions by
/// `a`, recurse into the sub-shell composition if anything was promoted.
pub(crate) fn drift_step(sim: &mut Simulation, a: f64, shell: usize) {
    if sim.halted() {
        // Cooperative cancellation point: return without touching state.
        return;
    }

    predict::encounter_predict(sim, a, shell);

    {
        let rim = &mut sim.mercurana;
        let particles = &mut sim.particles;

        for k in 0..rim.shelln_dominant[shell] {
            let mi = rim.map_dominant[[shell, k]];
            if rim.inshell_dominant[mi] == shell {
                particles[mi].x += a * particles[mi].vx;
                particles[mi].y += a * particles[mi].vy;
                particles[mi].z += a * particles[mi].vz;
                rim.t_drifted[mi] += a;
            }
        }
        for k in 0..rim.shelln_subdominant[shell] {
            let mi = rim.map_subdominant[[shell, k]];
            // A subdominant body that is also an encounter body deeper
            // down drifts in that deeper shell instead.
            if rim.inshell_subdominant[mi] == shell && rim.inshell_encounter[mi] <= shell {
                particles[mi].x += a * particles[mi].vx;
                particles[mi].y += a * particles[mi].vy;
                particles[mi].z += a * particles[mi].vz;
                rim.t_drifted[mi] += a;
            }
        }
        for k in 0..rim.shelln_encounter[shell] {
            let mi = rim.map_encounter[[shell, k]];
            // Members drifted by the subdominant loop are excluded here.
            if rim.inshell_subdominant[mi] < shell && rim.inshell_encounter[mi] == shell {
                particles[mi].x += a * particles[mi].vx;
                particles[mi].y += a * particles[mi].vy;
                particles[mi].z += a * particles[mi].vz;
                rim.t_drifted[mi] += a;
            }
        }
    }

    let rim = &sim.mercurana;
    let has_subshell = shell + 1 < rim.config.nmaxshells;
    if has_subshell
        && (rim.shelln_encounter[shell + 1] > 0 || rim.shelln_dominant[shell + 1] > 0)
    {
        sim.mercurana.nmaxshells_used = sim.mercurana.nmaxshells_used.max(shell + 2);
        let cfg = &sim.mercurana.config;
        let n = if shell > 0 && cfg.n1 > 0 { cfg.n1 } else { cfg.n0 };
        let phi = cfg.phi1;
        let a_s = a / f64::from(n);
        let mut ops = ShellOps(sim);
        eos::pre_processor(&mut ops, a_s, shell + 1, phi);
        for _ in 0..n {
            eos::step(&mut ops, a_s, 1.0, 1.0, shell + 1, phi);
        }
        eos::post_processor(&mut ops, a_s, shell + 1, phi);
    } else {
        // Nothing below: this drift is where the global clock moves.
        sim.t += a;
    }
}

/// Kick operator: evaluate shell-local accelerations (plus the
/// force-gradient term when `v != 0`) and update resident velocities.
pub(crate) fn interaction_step(sim: &mut Simulation, y: f64, v: f64, shell: usize) {
    sim.gravity = GravityMode::Mercurana;
    sim.mercurana.current_shell = shell;
    gravity::update_acceleration(sim);
    if v != 0.0 {
        gravity::apply_jerk(sim, v);
    }

    {
        let rim = &sim.mercurana;
        let particles = &mut sim.particles;

        for k in 0..rim.shelln_dominant[shell] {
            let mi = rim.map_dominant[[shell, k]];
            particles[mi].vx += y * particles[mi].ax;
            particles[mi].vy += y * particles[mi].ay;
            particles[mi].vz += y * particles[mi].az;
        }
        for k in 0..rim.shelln_encounter[shell] {
            let mi = rim.map_encounter[[shell, k]];
            particles[mi].vx += y * particles[mi].ax;
            particles[mi].vy += y * particles[mi].ay;
            particles[mi].vz += y * particles[mi].az;
        }
        if shell > 0 {
            // At shell 0 every subdominant body is an encounter body and
            // was kicked above; deeper down, only those not promoted as
            // encounters at this shell still need their share.
            for k in 0..rim.shelln_subdominant[shell] {
                let mi = rim.map_subdominant[[shell, k]];
                if rim.inshell_encounter[mi] < shell {
                    particles[mi].vx += y * particles[mi].ax;
                    particles[mi].vy += y * particles[mi].ay;
                    particles[mi].vz += y * particles[mi].az;
                }
            }
        }
    }

    sim.gravity = GravityMode::None;
}
