// ─────────────────────────────────────────────────────────────────────
// Mercurana N-Body Core — Property-Based Tests (proptest) for mercurana-math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for mercurana-math using proptest.
//!
//! Covers: Newton cube root, switching-function partition properties,
//! composition-scheme drift consistency.

use mercurana_math::eos::{self, OperatorKernel, ALL_SCHEMES};
use mercurana_math::roots::cbrt_newton;
use mercurana_math::switching::{dldr_infinity, l_infinity};
use proptest::prelude::*;

struct FreeParticle {
    q: f64,
    p: f64,
}

impl OperatorKernel for FreeParticle {
    fn drift(&mut self, dt: f64, _shell: usize) {
        self.q += dt * self.p;
    }
    fn kick(&mut self, _y: f64, _v: f64, _shell: usize) {}
}

proptest! {
    /// cbrt_newton(a)³ reconstructs a across ten orders of magnitude.
    #[test]
    fn cbrt_reconstructs(a in 1e-5f64..1e5) {
        let c = cbrt_newton(a);
        let rel = (c * c * c - a).abs() / a;
        prop_assert!(rel < 1e-12, "residual {rel} for a = {a}");
    }

    /// The cube root is monotone.
    #[test]
    fn cbrt_monotone(a in 1e-5f64..1e5, factor in 1.001f64..10.0) {
        prop_assert!(cbrt_newton(a * factor) > cbrt_newton(a));
    }

    /// L stays in [0, 1] and respects its plateaus for any valid window.
    #[test]
    fn switching_bounded(
        ri in 0.1f64..5.0,
        width in 0.1f64..5.0,
        frac in -0.5f64..1.5,
    ) {
        let ro = ri + width;
        let d = ri + frac * width;
        let l = l_infinity(d, ri, ro);
        prop_assert!((0.0..=1.0).contains(&l));
        if frac < 0.0 {
            prop_assert_eq!(l, 0.0);
        }
        if frac > 1.0 {
            prop_assert_eq!(l, 1.0);
        }
    }

    /// L(d) + L(mirror of d) = 1: the two shells split the force exactly.
    #[test]
    fn switching_partition_of_unity(
        ri in 0.1f64..5.0,
        width in 0.1f64..5.0,
        frac in 0.01f64..0.99,
    ) {
        let ro = ri + width;
        let d = ri + frac * width;
        let mirrored = ri + (1.0 - frac) * width;
        let sum = l_infinity(d, ri, ro) + l_infinity(mirrored, ri, ro);
        prop_assert!((sum - 1.0).abs() < 1e-12);
    }

    /// The derivative is non-negative everywhere (L is non-decreasing).
    #[test]
    fn switching_derivative_nonnegative(
        ri in 0.1f64..5.0,
        width in 0.1f64..5.0,
        frac in -0.5f64..1.5,
    ) {
        let ro = ri + width;
        let d = ri + frac * width;
        prop_assert!(dldr_infinity(d, ri, ro) >= 0.0);
    }

    /// Every composition scheme advances a free particle by exactly
    /// n·dt·p once processed, for arbitrary step sizes and counts.
    #[test]
    fn schemes_drift_free_particles_exactly(
        scheme_idx in 0usize..9,
        dt in -0.5f64..0.5,
        steps in 1usize..8,
        p in -3.0f64..3.0,
    ) {
        prop_assume!(dt.abs() > 1e-4);
        let phi = ALL_SCHEMES[scheme_idx];
        let mut free = FreeParticle { q: 0.0, p };
        eos::pre_processor(&mut free, dt, 0, phi);
        for _ in 0..steps {
            eos::step(&mut free, dt, 1.0, 1.0, 0, phi);
        }
        eos::post_processor(&mut free, dt, 0, phi);
        let expected = (steps as f64) * dt * p;
        prop_assert!(
            (free.q - expected).abs() < 1e-10 * (1.0 + expected.abs()),
            "{:?}: got {}, expected {}", phi, free.q, expected
        );
    }
}
