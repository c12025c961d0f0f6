// ─────────────────────────────────────────────────────────────────────
// Mercurana N-Body Core — Roots
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Machine-independent root finding.

use mercurana_types::constants::CBRT_NEWTON_ITERATIONS;

/// Cube root of `a >= 0` via a fixed-count Newton iteration on `x³ = a`.
///
/// `libm`'s `pow(a, 1/3)` is not guaranteed to produce identical bits on
/// every platform; the critical-radius table feeds binary reproducibility
/// requirements, so it uses this iteration instead. Speed is irrelevant
/// here — the table is recomputed rarely.
pub fn cbrt_newton(a: f64) -> f64 {
    let mut x = 1.0_f64;
    for _ in 0..CBRT_NEWTON_ITERATIONS {
        let x2 = x * x;
        x += (a / x2 - x) / 3.0;
    }
    x
}
