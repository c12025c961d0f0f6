// ─────────────────────────────────────────────────────────────────────
// Mercurana N-Body Core — Encounter Integration Tests
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Close-encounter scenarios: shell promotion on an eccentric orbit,
//! physical collisions with and without a resolver, and the residency
//! invariants that must survive all of it.

use mercurana_core::collision::MergeResolver;
use mercurana_core::simulation::Simulation;
use mercurana_types::config::{CollisionMode, IntegratorConfig};
use mercurana_types::state::Particle;

/// Every residency invariant that must hold between global steps:
/// depths bounded by the shell count, every map row listing exactly the
/// class members at that depth or deeper (once each), and the critical
/// radii monotone in depth.
fn assert_residency_invariants(sim: &Simulation) {
    let rim = &sim.mercurana;
    let n = sim.particles.len();
    let shells = rim.config.nmaxshells;
    let nd = rim.config.n_dominant;

    for i in 0..n {
        assert!(rim.dominant_depth(i) < shells);
        assert!(rim.subdominant_depth(i) < shells);
        assert!(rim.encounter_depth(i) < shells);
    }

    fn check_class(
        name: &str,
        shell: usize,
        n: usize,
        residents: &[usize],
        belongs: impl Fn(usize) -> bool,
    ) {
        let mut seen = vec![0usize; n];
        for &i in residents {
            assert!(i < n, "{name} shell {shell}: stale index {i}");
            seen[i] += 1;
        }
        for (i, &count) in seen.iter().enumerate() {
            let expected = usize::from(belongs(i));
            assert_eq!(
                count, expected,
                "{name} shell {shell}: particle {i} listed {count} times, expected {expected}"
            );
        }
    }

    // Rows below the deepest shell touched by the last predictor chain
    // are dead: nothing reads them until a pass rebuilds them.
    let mut dmax = 0;
    for i in 0..n {
        dmax = dmax
            .max(rim.dominant_depth(i))
            .max(rim.subdominant_depth(i))
            .max(rim.encounter_depth(i));
    }
    let live_shells = shells.min(dmax + 2);

    for s in 0..live_shells {
        check_class("dominant", s, n, &rim.residents_dominant(s), |i| {
            i < nd && rim.dominant_depth(i) >= s
        });
        check_class("subdominant", s, n, &rim.residents_subdominant(s), |i| {
            i >= nd && rim.subdominant_depth(i) >= s
        });
        check_class("encounter", s, n, &rim.residents_encounter(s), |i| {
            i >= nd && rim.encounter_depth(i) >= s
        });
    }

    for s in 0..shells.saturating_sub(1) {
        for i in 0..n {
            assert!(rim.critical_radius(s + 1, i) <= rim.critical_radius(s, i));
        }
    }
}

/// Star and planet on an eccentric orbit, G = 1. The planet starts at
/// aphelion; perihelion (a(1−e) = 0.8) dips well inside the summed
/// critical radii, so the encounter machinery must engage.
fn eccentric_binary() -> Simulation {
    let mut sim = Simulation::new(IntegratorConfig {
        nmaxshells: 4,
        kappa: 1e-3,
        ..Default::default()
    });
    sim.dt = 0.1;
    let a = 10.0;
    let e = 0.92;
    let gm: f64 = 1.0 + 1e-3;
    let r_aph = a * (1.0 + e);
    let v_aph = (gm * (2.0 / r_aph - 1.0 / a)).sqrt();
    sim.add(Particle::at_rest(0.0, 0.0, 0.0, 1.0, 0.0));
    sim.add(Particle::new(r_aph, 0.0, 0.0, 0.0, v_aph, 0.0, 1e-3, 0.0));
    sim
}

#[test]
fn test_deep_encounter_promotes_to_second_shell() {
    let mut sim = eccentric_binary();
    let e0 = sim.total_energy();

    // Half an orbit is ~99 time units; 1200 steps cover the perihelion
    // passage with margin.
    let mut max_depth = 0;
    for _ in 0..1200 {
        sim.step().unwrap();
        max_depth = max_depth.max(sim.mercurana.encounter_depth(1));
        assert!(sim.mercurana.collision_pairs().is_empty());
    }

    assert!(
        max_depth >= 2,
        "planet only reached encounter depth {max_depth}"
    );
    assert!(sim.mercurana.nmaxshells_used() >= 3);

    let drift = ((sim.total_energy() - e0) / e0).abs();
    assert!(
        drift < 1e-4,
        "energy drift {drift} through the deep encounter"
    );
    assert_residency_invariants(&sim);
}

#[test]
fn test_no_encounter_means_single_shell() {
    // Mirror of the deep-encounter run on a near-circular orbit: no
    // separation ever approaches the critical radii.
    let mut sim = Simulation::new(IntegratorConfig {
        nmaxshells: 4,
        ..Default::default()
    });
    sim.dt = 0.1;
    sim.add(Particle::at_rest(0.0, 0.0, 0.0, 1.0, 0.0));
    let gm: f64 = 1.0 + 1e-3;
    sim.add(Particle::new(
        10.0,
        0.0,
        0.0,
        0.0,
        (gm / 10.0).sqrt(),
        0.0,
        1e-3,
        0.0,
    ));
    for _ in 0..500 {
        sim.step().unwrap();
    }
    assert_eq!(sim.mercurana.nmaxshells_used(), 1);
    assert_residency_invariants(&sim);
}

/// Two equal planets on crossing paths with radii large enough to
/// overlap around step 10, plus a distant bystander.
fn crossing_planets(collision: CollisionMode) -> Simulation {
    let mut sim = Simulation::new(IntegratorConfig {
        nmaxshells: 4,
        collision,
        ..Default::default()
    });
    sim.dt = 0.1;
    sim.add(Particle::new(-1.0, 0.0, 0.0, 0.5, 0.0, 0.0, 1e-3, 0.5));
    sim.add(Particle::new(1.0, 0.0, 0.0, -0.5, 0.0, 0.0, 1e-3, 0.5));
    sim.add(Particle::new(100.0, 0.0, 0.0, 0.0, 0.05, 0.0, 1e-3, 0.0));
    sim
}

#[test]
fn test_collision_buffer_records_overlapping_pair() {
    let mut sim = crossing_planets(CollisionMode::Direct);
    let mut recorded = None;
    for step in 0..30 {
        sim.step().unwrap();
        if let Some(pair) = sim.mercurana.collision_pairs().first() {
            recorded = Some((step, *pair));
            break;
        }
    }
    let (step, pair) = recorded.expect("overlap was never recorded");
    let mut ids = [pair.p1, pair.p2];
    ids.sort_unstable();
    assert_eq!(ids, [0, 1]);
    // Closing speed 1, initial gap 2, radii sum 1: overlap predicted
    // once the pair is about a drift away from touching.
    assert!((5..=12).contains(&step), "recorded at step {step}");
}

#[test]
fn test_collisions_ignored_without_direct_mode() {
    let mut sim = crossing_planets(CollisionMode::None);
    for _ in 0..30 {
        sim.step().unwrap();
        assert!(sim.mercurana.collision_pairs().is_empty());
    }
    assert_eq!(sim.particles.len(), 3);
}

#[test]
fn test_resolver_merges_and_bookkeeping_survives() {
    let mut sim = crossing_planets(CollisionMode::Direct);
    sim.resolver = Some(Box::new(MergeResolver));

    let m_before: f64 = sim.particles.iter().map(|p| p.m).sum();
    let mut merged_at = None;
    for step in 0..30 {
        sim.step().unwrap();
        // Consumed by the resolver, never left behind.
        assert!(sim.mercurana.collision_pairs().is_empty());
        if sim.particles.len() == 2 {
            merged_at = Some(step);
            break;
        }
    }
    let step = merged_at.expect("planets never merged");
    assert!((5..=12).contains(&step), "merged at step {step}");

    let m_after: f64 = sim.particles.iter().map(|p| p.m).sum();
    assert!((m_after - m_before).abs() < 1e-15);
    // The merged body carries the pair's momentum: the halves cancel up
    // to the common-mode pull of the distant bystander.
    assert!(sim.particles[0].vx.abs() < 1e-6);

    assert_residency_invariants(&sim);

    // The shrunken system keeps stepping cleanly.
    for _ in 0..10 {
        sim.step().unwrap();
    }
    assert_residency_invariants(&sim);
}
