// ─────────────────────────────────────────────────────────────────────
// Mercurana N-Body Core — Switching
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Infinitely differentiable switching function.
//!
//! `l_infinity(d, ri, ro)` partitions a pair force smoothly between two
//! adjacent shells: 0 inside `ri`, 1 outside `ro`, C-infinity in between.
//! Hosts may install an alternative pair via [`Switching`]; the defaults
//! below are installed when they do not.

/// Signature of a switching function (or its radial derivative).
pub type Switching = fn(d: f64, ri: f64, ro: f64) -> f64;

fn bump(x: f64) -> f64 {
    if x <= 0.0 {
        0.0
    } else {
        (-1.0 / x).exp()
    }
}

fn bump_derivative(x: f64) -> f64 {
    if x <= 0.0 {
        0.0
    } else {
        (-1.0 / x).exp() / (x * x)
    }
}

/// Smooth 0→1 partition of unity on `[ri, ro]`.
pub fn l_infinity(d: f64, ri: f64, ro: f64) -> f64 {
    let y = (d - ri) / (ro - ri);
    if y < 0.0 {
        0.0
    } else if y > 1.0 {
        1.0
    } else {
        bump(y) / (bump(y) + bump(1.0 - y))
    }
}

/// Radial derivative of [`l_infinity`]. Zero on both plateaus.
pub fn dldr_infinity(d: f64, ri: f64, ro: f64) -> f64 {
    let y = (d - ri) / (ro - ri);
    let dydr = 1.0 / (ro - ri);
    if !(0.0..=1.0).contains(&y) {
        0.0
    } else {
        let fy = bump(y);
        let fc = bump(1.0 - y);
        let s = fy + fc;
        dydr * (bump_derivative(y) / s - fy / (s * s) * (bump_derivative(y) - bump_derivative(1.0 - y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plateaus() {
        assert_eq!(l_infinity(0.5, 1.0, 2.0), 0.0);
        assert_eq!(l_infinity(1.0, 1.0, 2.0), 0.0);
        assert_eq!(l_infinity(2.0, 1.0, 2.0), 1.0);
        assert_eq!(l_infinity(5.0, 1.0, 2.0), 1.0);
    }

    #[test]
    fn test_midpoint_symmetry() {
        // f(y)/(f(y)+f(1-y)) is antisymmetric about y = 1/2.
        let l = l_infinity(1.5, 1.0, 2.0);
        assert!((l - 0.5).abs() < 1e-15);
        let a = l_infinity(1.2, 1.0, 2.0);
        let b = l_infinity(1.8, 1.0, 2.0);
        assert!((a + b - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_monotone_in_interior() {
        let mut prev = 0.0;
        for k in 1..100 {
            let d = 1.0 + (k as f64) / 100.0;
            let l = l_infinity(d, 1.0, 2.0);
            assert!(l >= prev, "L must be non-decreasing, broke at d = {d}");
            assert!((0.0..=1.0).contains(&l));
            prev = l;
        }
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let (ri, ro) = (0.4, 1.3);
        let h = 1e-6;
        for k in 1..20 {
            let d = ri + (ro - ri) * (k as f64) / 20.0;
            let numeric = (l_infinity(d + h, ri, ro) - l_infinity(d - h, ri, ro)) / (2.0 * h);
            let analytic = dldr_infinity(d, ri, ro);
            assert!(
                (numeric - analytic).abs() < 1e-5 * (1.0 + analytic.abs()),
                "dL/dr mismatch at d = {d}: numeric {numeric}, analytic {analytic}"
            );
        }
    }

    #[test]
    fn test_derivative_zero_on_plateaus() {
        assert_eq!(dldr_infinity(0.2, 1.0, 2.0), 0.0);
        assert_eq!(dldr_infinity(3.0, 1.0, 2.0), 0.0);
    }

    #[test]
    fn test_derivative_vanishes_toward_boundaries() {
        // C-infinity matching: all derivatives flatten out at the edges.
        let near_inner = dldr_infinity(1.0 + 1e-4, 1.0, 2.0);
        let near_outer = dldr_infinity(2.0 - 1e-4, 1.0, 2.0);
        assert!(near_inner.abs() < 1e-10);
        assert!(near_outer.abs() < 1e-10);
    }
}
