// ─────────────────────────────────────────────────────────────────────
// Mercurana N-Body Core — Simulation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Simulation container: the particle store, the global clock, the active
//! gravity mode and the integrator state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mercurana_types::config::IntegratorConfig;
use mercurana_types::constants::DEFAULT_GRAVITATIONAL_CONSTANT;
use mercurana_types::error::MercuranaResult;
use mercurana_types::state::Particle;

use crate::collision::CollisionResolver;
use crate::gravity::GravityMode;
use crate::integrator::{self, Mercurana};

/// A gravitational N-body simulation advanced by the adaptive shell
/// integrator.
///
/// Positions are mutated by the drift kernels and velocities by the kick
/// kernels; the host serializes all calls. The only concession to the
/// outside world is the cooperative halt flag, which a signal handler may
/// set to make the drift operator return without touching state.
pub struct Simulation {
    pub particles: Vec<Particle>,
    /// Global simulation time.
    pub t: f64,
    /// Global timestep of the next `step` call.
    pub dt: f64,
    /// Timestep completed by the most recent `step` call.
    pub dt_last_done: f64,
    /// Gravitational constant.
    pub g: f64,
    /// Plummer-style softening length applied by the gravity evaluators.
    pub softening: f64,
    /// Active gravity evaluator. Forced to `None` outside a kick.
    pub gravity: GravityMode,
    /// Adaptive integrator state and configuration.
    pub mercurana: Mercurana,
    /// External collision resolver; overlapping pairs detected by the
    /// predictor are handed to it in one batch per pass.
    pub resolver: Option<Box<dyn CollisionResolver>>,
    halt: Arc<AtomicBool>,
}

impl Simulation {
    /// Create an empty simulation with the given integrator configuration.
    pub fn new(config: IntegratorConfig) -> Self {
        Simulation {
            particles: Vec::new(),
            t: 0.0,
            dt: 0.01,
            dt_last_done: 0.0,
            g: DEFAULT_GRAVITATIONAL_CONSTANT,
            softening: 0.0,
            gravity: GravityMode::None,
            mercurana: Mercurana::new(config),
            resolver: None,
            halt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Append a body to the particle store.
    pub fn add(&mut self, p: Particle) {
        self.particles.push(p);
    }

    /// Handle to the cooperative cancellation flag. Setting it makes the
    /// drift operator return early without mutating positions; it is safe
    /// to set from a signal handler.
    pub fn halt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.halt)
    }

    pub(crate) fn halted(&self) -> bool {
        self.halt.load(Ordering::Relaxed)
    }

    /// Allocate/validate integrator state for the current particle set.
    pub fn prepare(&mut self) -> MercuranaResult<()> {
        integrator::prepare(self)
    }

    /// Perform one global timestep of length `self.dt`.
    pub fn step(&mut self) -> MercuranaResult<()> {
        integrator::step(self)
    }

    /// Advance until the clock passes `t_end` (the final step overshoots
    /// rather than shortens, keeping the splitting coefficients fixed).
    pub fn integrate(&mut self, t_end: f64) -> MercuranaResult<()> {
        while (self.dt > 0.0 && self.t < t_end) || (self.dt < 0.0 && self.t > t_end) {
            self.step()?;
            if self.halted() {
                break;
            }
        }
        Ok(())
    }

    /// Apply the outermost post-processor if the state is unsynchronized.
    /// Idempotent.
    pub fn synchronize(&mut self) {
        integrator::synchronize(self);
    }

    /// Free all integrator buffers and restore default configuration.
    pub fn reset(&mut self) {
        integrator::reset(self);
    }

    /// Total mechanical energy: kinetic plus pairwise potential.
    pub fn total_energy(&self) -> f64 {
        let mut e: f64 = self.particles.iter().map(Particle::kinetic_energy).sum();
        for i in 0..self.particles.len() {
            for j in (i + 1)..self.particles.len() {
                let r2 = self.particles[i].separation_squared(&self.particles[j]);
                e -= self.g * self.particles[i].m * self.particles[j].m / r2.sqrt();
            }
        }
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_body_energy_is_kinetic_minus_potential() {
        let mut sim = Simulation::new(IntegratorConfig::default());
        sim.add(Particle::at_rest(0.0, 0.0, 0.0, 1.0, 0.0));
        sim.add(Particle::new(2.0, 0.0, 0.0, 0.0, 0.5, 0.0, 1.0, 0.0));
        // E = ½·1·0.25 − 1·1·1/2
        assert!((sim.total_energy() - (0.125 - 0.5)).abs() < 1e-15);
    }

    #[test]
    fn test_halt_flag_roundtrip() {
        let sim = Simulation::new(IntegratorConfig::default());
        assert!(!sim.halted());
        sim.halt_handle().store(true, Ordering::Relaxed);
        assert!(sim.halted());
    }
}
