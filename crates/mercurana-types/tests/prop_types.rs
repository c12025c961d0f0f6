// ─────────────────────────────────────────────────────────────────────
// Mercurana N-Body Core — Property-Based Tests (proptest) for mercurana-types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for mercurana-types using proptest.
//!
//! Covers: particle drift algebra, configuration validation and JSON
//! round-trips.

use mercurana_types::config::{CollisionMode, IntegratorConfig, Splitting};
use mercurana_types::state::Particle;
use proptest::prelude::*;

fn scheme_strategy() -> impl Strategy<Value = Splitting> {
    prop_oneof![
        Just(Splitting::Lf),
        Just(Splitting::Lf4),
        Just(Splitting::Lf42),
        Just(Splitting::Lf6),
        Just(Splitting::Lf8),
        Just(Splitting::Lf864),
        Just(Splitting::Plf764),
        Just(Splitting::Pmlf4),
        Just(Splitting::Pmlf6),
    ]
}

proptest! {
    /// Drifting by dt then by -dt returns the starting position to within
    /// floating-point round-off.
    #[test]
    fn drift_roundtrip(
        x in -1e3f64..1e3, y in -1e3f64..1e3, z in -1e3f64..1e3,
        vx in -1e2f64..1e2, vy in -1e2f64..1e2, vz in -1e2f64..1e2,
        dt in -1e1f64..1e1,
    ) {
        let p = Particle::new(x, y, z, vx, vy, vz, 1.0, 0.0);
        let q = p.drifted(dt).drifted(-dt);
        prop_assert!((q.x - p.x).abs() <= 1e-9 * (1.0 + x.abs()));
        prop_assert!((q.y - p.y).abs() <= 1e-9 * (1.0 + y.abs()));
        prop_assert!((q.z - p.z).abs() <= 1e-9 * (1.0 + z.abs()));
    }

    /// Drifting twice by dt equals drifting once by 2 dt under linear motion.
    #[test]
    fn drift_composes_linearly(
        x in -1e3f64..1e3, vx in -1e2f64..1e2, dt in -1e1f64..1e1,
    ) {
        let p = Particle::new(x, 0.0, 0.0, vx, 0.0, 0.0, 1.0, 0.0);
        let twice = p.drifted(dt).drifted(dt);
        let once = p.drifted(2.0 * dt);
        prop_assert!((twice.x - once.x).abs() <= 1e-9 * (1.0 + once.x.abs()));
    }

    /// Separation is symmetric and non-negative.
    #[test]
    fn separation_symmetric(
        ax in -1e3f64..1e3, ay in -1e3f64..1e3,
        bx in -1e3f64..1e3, by in -1e3f64..1e3,
    ) {
        let a = Particle::at_rest(ax, ay, 0.0, 1.0, 0.0);
        let b = Particle::at_rest(bx, by, 0.0, 1.0, 0.0);
        prop_assert_eq!(a.separation_squared(&b), b.separation_squared(&a));
        prop_assert!(a.separation_squared(&b) >= 0.0);
    }

    /// Any configuration with enough shells, positive kappa and at least
    /// one outer sub-step passes validation.
    #[test]
    fn well_formed_configs_validate(
        nmaxshells in 3usize..16,
        n0 in 1u32..8,
        n1 in 0u32..8,
        kappa in 1e-6f64..1e-1,
        phi0 in scheme_strategy(),
        phi1 in scheme_strategy(),
    ) {
        let cfg = IntegratorConfig {
            nmaxshells,
            n0,
            n1,
            kappa,
            phi0,
            phi1,
            ..Default::default()
        };
        prop_assert!(cfg.validate().is_ok());
    }

    /// Configurations survive a JSON round-trip unchanged.
    #[test]
    fn config_json_roundtrip(
        nmaxshells in 1usize..16,
        n0 in 0u32..8,
        n1 in 0u32..8,
        kappa in 1e-6f64..1e-1,
        alpha in 0.1f64..1.0,
        n_dominant in 0usize..4,
        phi0 in scheme_strategy(),
        phi1 in scheme_strategy(),
        safe_mode in any::<bool>(),
        direct in any::<bool>(),
    ) {
        let cfg = IntegratorConfig {
            nmaxshells,
            n0,
            n1,
            kappa,
            alpha,
            gm0r0: 0.0,
            phi0,
            phi1,
            safe_mode,
            n_dominant,
            collision: if direct { CollisionMode::Direct } else { CollisionMode::None },
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: IntegratorConfig = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.nmaxshells, cfg.nmaxshells);
        prop_assert_eq!(back.n0, cfg.n0);
        prop_assert_eq!(back.n1, cfg.n1);
        prop_assert!((back.kappa - cfg.kappa).abs() < 1e-18);
        prop_assert!((back.alpha - cfg.alpha).abs() < 1e-18);
        prop_assert_eq!(back.phi0, cfg.phi0);
        prop_assert_eq!(back.phi1, cfg.phi1);
        prop_assert_eq!(back.safe_mode, cfg.safe_mode);
        prop_assert_eq!(back.n_dominant, cfg.n_dominant);
        prop_assert_eq!(back.collision, cfg.collision);
    }
}
