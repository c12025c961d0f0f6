// ─────────────────────────────────────────────────────────────────────
// Mercurana N-Body Core — Integrator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Integrator state and the host-facing operations.
//!
//! `prepare` allocates and validates, `step` performs one global
//! timestep, `synchronize` lazily applies the outermost post-processor,
//! `reset` frees everything and restores defaults.

use ndarray::Array2;

use mercurana_math::eos;
use mercurana_math::switching::{self, Switching};
use mercurana_types::config::IntegratorConfig;
use mercurana_types::constants::{COLLISION_BUFFER_INITIAL, MAXDRIFT_UNBOUNDED};
use mercurana_types::error::{MercuranaError, MercuranaResult};
use mercurana_types::state::Particle;

use crate::collision::CollisionPair;
use crate::dcrit;
use crate::gravity::GravityMode;
use crate::kernels::ShellOps;
use crate::simulation::Simulation;

/// State of the adaptive shell integrator.
///
/// Per-shell tables are flat `S×N` buffers. The three residency
/// partitions (dominant, subdominant, encounter) each consist of a map
/// table listing the members of every shell, a per-shell member count and
/// a per-particle depth. A particle promoted to depth `d` appears exactly
/// once in the map rows `0..=d` of its class; its depth only ever
/// increases within a global step.
#[derive(Debug, Clone)]
pub struct Mercurana {
    pub config: IntegratorConfig,
    pub(crate) allocated_n: usize,
    pub(crate) dcrit: Array2<f64>,
    pub(crate) map_dominant: Array2<usize>,
    pub(crate) map_subdominant: Array2<usize>,
    pub(crate) map_encounter: Array2<usize>,
    pub(crate) shelln_dominant: Vec<usize>,
    pub(crate) shelln_subdominant: Vec<usize>,
    pub(crate) shelln_encounter: Vec<usize>,
    pub(crate) inshell_dominant: Vec<usize>,
    pub(crate) inshell_subdominant: Vec<usize>,
    pub(crate) inshell_encounter: Vec<usize>,
    /// Snapshot of every particle at the start of the global step.
    pub(crate) p0: Vec<Particle>,
    /// Drift time accumulated by each particle since the step started.
    pub(crate) t_drifted: Vec<f64>,
    pub(crate) maxdrift_dominant: Vec<f64>,
    pub(crate) maxdrift_encounter: Vec<f64>,
    pub(crate) collisions: Vec<CollisionPair>,
    pub(crate) current_shell: usize,
    pub(crate) nmaxshells_used: usize,
    pub(crate) is_synchronized: bool,
    pub(crate) recalculate_dcrit: bool,
    pub(crate) switching: Option<Switching>,
    pub(crate) switching_derivative: Option<Switching>,
}

impl Mercurana {
    pub fn new(config: IntegratorConfig) -> Self {
        Mercurana {
            config,
            allocated_n: 0,
            dcrit: Array2::zeros((0, 0)),
            map_dominant: Array2::zeros((0, 0)),
            map_subdominant: Array2::zeros((0, 0)),
            map_encounter: Array2::zeros((0, 0)),
            shelln_dominant: Vec::new(),
            shelln_subdominant: Vec::new(),
            shelln_encounter: Vec::new(),
            inshell_dominant: Vec::new(),
            inshell_subdominant: Vec::new(),
            inshell_encounter: Vec::new(),
            p0: Vec::new(),
            t_drifted: Vec::new(),
            maxdrift_dominant: Vec::new(),
            maxdrift_encounter: Vec::new(),
            collisions: Vec::with_capacity(COLLISION_BUFFER_INITIAL),
            current_shell: 0,
            nmaxshells_used: 1,
            is_synchronized: true,
            recalculate_dcrit: false,
            switching: None,
            switching_derivative: None,
        }
    }

    /// Deepest shell count touched by any global step so far.
    pub fn nmaxshells_used(&self) -> usize {
        self.nmaxshells_used
    }

    pub fn is_synchronized(&self) -> bool {
        self.is_synchronized
    }

    /// Particle capacity of the allocated per-shell buffers.
    pub fn allocated_n(&self) -> usize {
        self.allocated_n
    }

    /// Force the critical-radius table to be rebuilt on the next `prepare`.
    pub fn request_dcrit_recalculation(&mut self) {
        self.recalculate_dcrit = true;
    }

    /// Install an alternative switching function and its derivative.
    pub fn set_switching(&mut self, l: Switching, dldr: Switching) {
        self.switching = Some(l);
        self.switching_derivative = Some(dldr);
    }

    /// Deepest shell particle `i` has been promoted into as an encounter
    /// particle this global step. Valid after `prepare`.
    pub fn encounter_depth(&self, i: usize) -> usize {
        self.inshell_encounter[i]
    }

    pub fn dominant_depth(&self, i: usize) -> usize {
        self.inshell_dominant[i]
    }

    pub fn subdominant_depth(&self, i: usize) -> usize {
        self.inshell_subdominant[i]
    }

    /// Critical encounter radius of particle `i` at the given shell.
    pub fn critical_radius(&self, shell: usize, i: usize) -> f64 {
        self.dcrit[[shell, i]]
    }

    /// Particle indices resident at `shell` in the dominant class.
    pub fn residents_dominant(&self, shell: usize) -> Vec<usize> {
        (0..self.shelln_dominant[shell])
            .map(|k| self.map_dominant[[shell, k]])
            .collect()
    }

    pub fn residents_subdominant(&self, shell: usize) -> Vec<usize> {
        (0..self.shelln_subdominant[shell])
            .map(|k| self.map_subdominant[[shell, k]])
            .collect()
    }

    pub fn residents_encounter(&self, shell: usize) -> Vec<usize> {
        (0..self.shelln_encounter[shell])
            .map(|k| self.map_encounter[[shell, k]])
            .collect()
    }

    /// Overlapping pairs recorded by the most recent predictor pass and
    /// not yet consumed by a resolver. Cleared at the start of the next
    /// pass.
    pub fn collision_pairs(&self) -> &[CollisionPair] {
        &self.collisions
    }
}

pub(crate) fn resize_state(rim: &mut Mercurana, n: usize) {
    let shells = rim.config.nmaxshells;
    rim.dcrit = Array2::zeros((shells, n));
    rim.map_dominant = Array2::zeros((shells, n));
    rim.map_subdominant = Array2::zeros((shells, n));
    rim.map_encounter = Array2::zeros((shells, n));
    rim.shelln_dominant = vec![0; shells];
    rim.shelln_subdominant = vec![0; shells];
    rim.shelln_encounter = vec![0; shells];
    rim.inshell_dominant = vec![0; n];
    rim.inshell_subdominant = vec![0; n];
    rim.inshell_encounter = vec![0; n];
    rim.p0 = vec![Particle::default(); n];
    rim.t_drifted = vec![0.0; n];
    rim.maxdrift_dominant = vec![MAXDRIFT_UNBOUNDED; n];
    rim.maxdrift_encounter = vec![MAXDRIFT_UNBOUNDED; n];
    rim.allocated_n = n;
    rim.recalculate_dcrit = true;
}

/// Allocate/resize integrator state and validate the configuration.
///
/// Nothing is mutated when validation fails, so a subsequent `step` on an
/// invalid configuration fails the same way without side effects.
pub fn prepare(sim: &mut Simulation) -> MercuranaResult<()> {
    sim.mercurana.config.validate()?;
    let n = sim.particles.len();
    if sim.mercurana.config.n_dominant > n {
        return Err(MercuranaError::ConfigError(format!(
            "n_dominant = {} exceeds particle count {}",
            sim.mercurana.config.n_dominant, n
        )));
    }

    let shells = sim.mercurana.config.nmaxshells;
    if sim.mercurana.allocated_n < n || sim.mercurana.dcrit.nrows() != shells {
        resize_state(&mut sim.mercurana, n);
    }

    if sim.mercurana.recalculate_dcrit {
        sim.mercurana.recalculate_dcrit = false;
        if !sim.mercurana.is_synchronized {
            synchronize(sim);
            tracing::warn!(
                "recalculating critical radii but positions/velocities were not synchronized"
            );
        }
        dcrit::recompute(sim);
    }

    // The shell kernels install their own gravity evaluation while a kick
    // is in flight; outside of one the backend stays disabled.
    sim.gravity = GravityMode::None;

    // Processed schemes open with a kick; give it a populated outermost
    // shell even before the first predictor pass has run.
    crate::predict::seed_outermost(&mut sim.mercurana, n);

    if sim.mercurana.switching.is_none() {
        sim.mercurana.switching = Some(switching::l_infinity);
        sim.mercurana.switching_derivative = Some(switching::dldr_infinity);
    }
    Ok(())
}

/// Perform one global timestep of length `sim.dt`.
pub fn step(sim: &mut Simulation) -> MercuranaResult<()> {
    prepare(sim)?;

    let n = sim.particles.len();
    for i in 0..n {
        sim.mercurana.t_drifted[i] = 0.0;
        sim.mercurana.p0[i] = sim.particles[i];
    }

    let dt = sim.dt;
    let phi0 = sim.mercurana.config.phi0;
    if sim.mercurana.is_synchronized {
        eos::pre_processor(&mut ShellOps(&mut *sim), dt, 0, phi0);
    }
    eos::step(&mut ShellOps(&mut *sim), dt, 1.0, 1.0, 0, phi0);
    sim.mercurana.is_synchronized = false;
    if sim.mercurana.config.safe_mode {
        synchronize(sim);
    }
    sim.dt_last_done = dt;
    Ok(())
}

/// Apply the outermost post-processor unless already synchronized.
pub fn synchronize(sim: &mut Simulation) {
    if sim.mercurana.is_synchronized {
        return;
    }
    if sim.mercurana.switching.is_none() {
        sim.mercurana.switching = Some(switching::l_infinity);
        sim.mercurana.switching_derivative = Some(switching::dldr_infinity);
    }
    let dt = sim.dt;
    let phi0 = sim.mercurana.config.phi0;
    eos::post_processor(&mut ShellOps(&mut *sim), dt, 0, phi0);
    sim.mercurana.is_synchronized = true;
}

/// Free all integrator buffers and restore default configuration.
pub fn reset(sim: &mut Simulation) {
    sim.mercurana = Mercurana::new(IntegratorConfig::default());
}

/// Delete the given particles and remap all residency bookkeeping.
///
/// Called after a collision resolver shrank the particle set; surviving
/// indices shift down, map rows are compacted and per-particle state is
/// carried along, so the predictor can be re-run at the same shell.
pub(crate) fn remove_particles(sim: &mut Simulation, mut removed: Vec<usize>) {
    if removed.is_empty() {
        return;
    }
    removed.sort_unstable();
    removed.dedup();

    let old_n = sim.particles.len();
    let mut remap = vec![usize::MAX; old_n];
    {
        let mut skip = removed.iter().peekable();
        let mut next = 0usize;
        for (i, slot) in remap.iter_mut().enumerate() {
            if skip.peek() == Some(&&i) {
                skip.next();
                continue;
            }
            *slot = next;
            next += 1;
        }
    }

    for &r in removed.iter().rev() {
        sim.particles.remove(r);
        sim.mercurana.p0.remove(r);
        sim.mercurana.t_drifted.remove(r);
        sim.mercurana.maxdrift_dominant.remove(r);
        sim.mercurana.maxdrift_encounter.remove(r);
        sim.mercurana.inshell_dominant.remove(r);
        sim.mercurana.inshell_subdominant.remove(r);
        sim.mercurana.inshell_encounter.remove(r);
        if r < sim.mercurana.config.n_dominant {
            sim.mercurana.config.n_dominant -= 1;
        }
    }

    let rim = &mut sim.mercurana;
    let shells = rim.dcrit.nrows();
    for s in 0..shells {
        for i in 0..old_n {
            let ni = remap[i];
            if ni != usize::MAX && ni != i {
                let v = rim.dcrit[[s, i]];
                rim.dcrit[[s, ni]] = v;
            }
        }
        compact_map_row(&mut rim.map_dominant, &mut rim.shelln_dominant, s, &remap);
        compact_map_row(
            &mut rim.map_subdominant,
            &mut rim.shelln_subdominant,
            s,
            &remap,
        );
        compact_map_row(&mut rim.map_encounter, &mut rim.shelln_encounter, s, &remap);
    }
    rim.allocated_n = sim.particles.len();
}

fn compact_map_row(map: &mut Array2<usize>, counts: &mut [usize], s: usize, remap: &[usize]) {
    let mut write = 0usize;
    for k in 0..counts[s] {
        let ni = remap[map[[s, k]]];
        if ni != usize::MAX {
            map[[s, write]] = ni;
            write += 1;
        }
    }
    counts[s] = write;
}
