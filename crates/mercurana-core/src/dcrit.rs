// ─────────────────────────────────────────────────────────────────────
// Mercurana N-Body Core — Critical Radii
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-shell, per-particle critical encounter radii.
//!
//! A pair approaching within the sum of its critical radii is promoted
//! into the next shell. The base radius follows from requiring the
//! velocity change accumulated from particle `i` over one outer timestep
//! to stay below the error target `kappa`; each deeper shell shrinks it
//! by the shell's timestep ratio raised to `alpha`.

use mercurana_math::eos;
use mercurana_math::roots::cbrt_newton;

use crate::simulation::Simulation;

/// Rebuild the critical-radius table for the current timestep.
pub(crate) fn recompute(sim: &mut Simulation) {
    let rim = &mut sim.mercurana;
    let cfg = &rim.config;
    let n = sim.particles.len();
    let dt0 = sim.dt;
    let mut dt_shell = dt0;

    for s in 0..cfg.nmaxshells {
        let ratio = dt_shell / dt0;
        for i in 0..n {
            let mi = sim.particles[i].m;
            let mut dgrav = cbrt_newton(sim.g * dt0 * dt0 * mi / cfg.kappa);
            if cfg.gm0r0 > 0.0 {
                // Relativistic floor: precession near the central mass
                // limits the usable radius before the error target does.
                let dgrav_rel =
                    (sim.g * sim.g * dt0 * dt0 * mi * mi / (cfg.gm0r0 * cfg.kappa))
                        .sqrt()
                        .sqrt();
                dgrav = dgrav.max(dgrav_rel);
            }
            rim.dcrit[[s, i]] = if cfg.alpha != 0.5 {
                ratio.powf(cfg.alpha) * dgrav
            } else {
                // sqrt is exactly rounded on every platform; powf is not.
                ratio.sqrt() * dgrav
            };
        }

        if s + 1 < cfg.nmaxshells {
            let phi = if s == 0 { cfg.phi0 } else { cfg.phi1 };
            let n_sub = if s > 0 && cfg.n1 > 0 { cfg.n1 } else { cfg.n0 };
            // A shell's effective drift length is its longest drift
            // sub-step divided by the sub-step count; capped at 1 so the
            // table stays monotone non-increasing in depth.
            let factor = (eos::longest_drift_substep(phi) / f64::from(n_sub)).min(1.0);
            dt_shell *= factor;
        }
    }
}
