// ─────────────────────────────────────────────────────────────────────
// Mercurana N-Body Core — Embedded Operator Splitting
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Named symplectic operator-splitting compositions.
//!
//! Each scheme is a triple (pre-processor, step, post-processor) acting on
//! a pair of drift/kick callbacks. The shell integrator passes its own
//! shell-local kernels and recurses through them; any other Hamiltonian
//! splitting can be driven the same way (the test suite uses a harmonic
//! oscillator).
//!
//! Pre- and post-processors are exact inverses of each other. For the
//! processed schemes the boundary stage of the symmetric composition is
//! folded into the processors, so a run of `n` interior steps between
//! processor applications reproduces the n-fold symmetric composition
//! exactly while merging the touching boundary stages.
//!
//! Coefficient provenance: `LF4` is the Forest–Ruth triple jump, `LF6` and
//! `LF8` are Yoshida's solution-A compositions, `LF8_6_4` is the nested
//! 1/5- and 1/7-exponent triple jump over the fourth-order kernel,
//! `LF4_2` is McLachlan's two-force-evaluation kernel, `PLF7_6_4` uses the
//! optimized Forest–Ruth-like coefficients of Omelyan, Mryglod & Folk, and
//! `PMLF4`/`PMLF6` build on the Takahashi–Imada modified-potential kick
//! (the `v` argument of the kick scales that force-gradient term).

use mercurana_types::config::Splitting;

/// Drift/kick callbacks a composition is applied to.
///
/// `drift` advances positions by `dt` at the given shell. `kick` advances
/// velocities: `y` scales the acceleration impulse, `v` scales the
/// force-gradient (jerk) impulse and is zero for the plain leapfrog
/// families. Implementations are monomorphized per call site; the hot
/// path carries no dynamic dispatch.
pub trait OperatorKernel {
    fn drift(&mut self, dt: f64, shell: usize);
    fn kick(&mut self, y: f64, v: f64, shell: usize);
}

/// Forest–Ruth end-drift coefficient, 1/(2(2−2^{1/3})).
const LF4_A: f64 = 0.6756035959798289;

/// McLachlan two-stage end-drift coefficient, (3−√3)/6.
const LF42_A: f64 = 0.21132486540518713;

/// Yoshida sixth-order (solution A) kick weights, outermost first.
const LF6_K: [f64; 7] = [
    0.78451361047756,
    0.235573213359357,
    -1.17767998417887,
    1.3151863206839063,
    -1.17767998417887,
    0.235573213359357,
    0.78451361047756,
];

/// Yoshida eighth-order (solution A) kick weights, outermost first.
const LF8_K: [f64; 15] = [
    1.04242620869991,
    1.82020630970714,
    0.157739928123617,
    2.44002732616735,
    -0.0071698941970812,
    -2.44699182370524,
    -1.61582374150097,
    -1.7808286265894515,
    -1.61582374150097,
    -2.44699182370524,
    -0.0071698941970812,
    2.44002732616735,
    0.157739928123617,
    1.82020630970714,
    1.04242620869991,
];

/// Kick weights of the nested triple jump (4 → 6 via 1/5 exponents,
/// 6 → 8 via 1/7 exponents) over the Forest–Ruth kernel.
const LF864_K: [f64; 27] = [
    1.7716333851955366,
    -2.232118194704369,
    1.7716333851955366,
    -2.035072355231941,
    2.56403049841586,
    -2.035072355231941,
    1.7716333851955366,
    -2.232118194704369,
    1.7716333851955366,
    -1.9560418426688295,
    2.464458292053614,
    -1.9560418426688295,
    2.2469020469790535,
    -2.830919186040789,
    2.2469020469790535,
    -1.9560418426688295,
    2.464458292053614,
    -1.9560418426688295,
    1.7716333851955366,
    -2.232118194704369,
    1.7716333851955366,
    -2.035072355231941,
    2.56403049841586,
    -2.035072355231941,
    1.7716333851955366,
    -2.232118194704369,
    1.7716333851955366,
];

/// Omelyan–Mryglod–Folk optimized Forest–Ruth-like coefficients.
const PLF764_XI: f64 = 0.1786178958448091;
const PLF764_LAMBDA: f64 = -0.2123418310626054;
const PLF764_CHI: f64 = -0.06626458266981849;
/// (1 − 2λ)/2, the outer kick weight.
const PLF764_H1: f64 = 0.7123418310626054;
/// 1 − 2(χ + ξ), the central drift.
const PLF764_MID: f64 = 0.7752933736500187;

/// 1/5-exponent triple-jump weights over the modified kernel.
const PMLF6_G1: f64 = 1.1746717580893635;
const PMLF6_G0: f64 = -1.349343516178727;

/// Takahashi–Imada force-gradient prefactor of a full modified kick.
const GRADIENT_PREFACTOR: f64 = 1.0 / 24.0;

/// Symmetric leapfrog composition defined by its kick weights: adjacent
/// half drifts merge into (k[i] + k[i+1])/2, with k[0]/2 on both ends.
fn composed_kicks<O: OperatorKernel>(ops: &mut O, dt: f64, y: f64, shell: usize, kicks: &[f64]) {
    let last = kicks.len() - 1;
    ops.drift(0.5 * kicks[0] * dt, shell);
    for (i, &k) in kicks.iter().enumerate() {
        ops.kick(k * dt * y, 0.0, shell);
        let d = if i < last {
            0.5 * (k + kicks[i + 1]) * dt
        } else {
            0.5 * k * dt
        };
        ops.drift(d, shell);
    }
}

/// Apply the pre-processor of `phi` for step size `dt`.
pub fn pre_processor<O: OperatorKernel>(ops: &mut O, dt: f64, shell: usize, phi: Splitting) {
    match phi {
        Splitting::Lf | Splitting::Lf4 | Splitting::Lf6 | Splitting::Lf8 | Splitting::Lf864 => {}
        Splitting::Lf42 => ops.drift(LF42_A * dt, shell),
        Splitting::Plf764 => ops.drift(PLF764_XI * dt, shell),
        Splitting::Pmlf4 => {
            let g = GRADIENT_PREFACTOR * dt * dt * dt;
            ops.kick(0.5 * dt, 0.5 * g, shell);
        }
        Splitting::Pmlf6 => {
            let h = PMLF6_G1 * dt;
            ops.kick(0.5 * h, 0.5 * GRADIENT_PREFACTOR * h * h * h, shell);
        }
    }
}

/// Apply the post-processor of `phi` for step size `dt`.
///
/// Exact inverse of [`pre_processor`]; applying both in sequence leaves
/// the state unchanged up to floating-point round-off.
pub fn post_processor<O: OperatorKernel>(ops: &mut O, dt: f64, shell: usize, phi: Splitting) {
    match phi {
        Splitting::Lf | Splitting::Lf4 | Splitting::Lf6 | Splitting::Lf8 | Splitting::Lf864 => {}
        Splitting::Lf42 => ops.drift(-LF42_A * dt, shell),
        Splitting::Plf764 => ops.drift(-PLF764_XI * dt, shell),
        Splitting::Pmlf4 => {
            let g = GRADIENT_PREFACTOR * dt * dt * dt;
            ops.kick(-0.5 * dt, -0.5 * g, shell);
        }
        Splitting::Pmlf6 => {
            let h = PMLF6_G1 * dt;
            ops.kick(-0.5 * h, -0.5 * GRADIENT_PREFACTOR * h * h * h, shell);
        }
    }
}

/// One interior step of `phi` with step size `dt`.
///
/// `y` scales every acceleration impulse and `v` every force-gradient
/// impulse, on top of the scheme's own coefficients; the shell integrator
/// passes 1 for both.
pub fn step<O: OperatorKernel>(ops: &mut O, dt: f64, y: f64, v: f64, shell: usize, phi: Splitting) {
    match phi {
        Splitting::Lf => {
            ops.drift(0.5 * dt, shell);
            ops.kick(dt * y, 0.0, shell);
            ops.drift(0.5 * dt, shell);
        }
        Splitting::Lf4 => {
            let kicks = [2.0 * LF4_A, 1.0 - 4.0 * LF4_A, 2.0 * LF4_A];
            composed_kicks(ops, dt, y, shell, &kicks);
        }
        Splitting::Lf42 => {
            // Boundary drifts live in the processors; the trailing drift
            // is the two merged end stages of adjacent steps.
            ops.kick(0.5 * dt * y, 0.0, shell);
            ops.drift((1.0 - 2.0 * LF42_A) * dt, shell);
            ops.kick(0.5 * dt * y, 0.0, shell);
            ops.drift(2.0 * LF42_A * dt, shell);
        }
        Splitting::Lf6 => composed_kicks(ops, dt, y, shell, &LF6_K),
        Splitting::Lf8 => composed_kicks(ops, dt, y, shell, &LF8_K),
        Splitting::Lf864 => composed_kicks(ops, dt, y, shell, &LF864_K),
        Splitting::Plf764 => {
            ops.kick(PLF764_H1 * dt * y, 0.0, shell);
            ops.drift(PLF764_CHI * dt, shell);
            ops.kick(PLF764_LAMBDA * dt * y, 0.0, shell);
            ops.drift(PLF764_MID * dt, shell);
            ops.kick(PLF764_LAMBDA * dt * y, 0.0, shell);
            ops.drift(PLF764_CHI * dt, shell);
            ops.kick(PLF764_H1 * dt * y, 0.0, shell);
            ops.drift(2.0 * PLF764_XI * dt, shell);
        }
        Splitting::Pmlf4 => {
            let g = GRADIENT_PREFACTOR * dt * dt * dt;
            ops.drift(dt, shell);
            ops.kick(dt * y, g * v, shell);
        }
        Splitting::Pmlf6 => {
            let h1 = PMLF6_G1 * dt;
            let h0 = PMLF6_G0 * dt;
            let g1 = GRADIENT_PREFACTOR * h1 * h1 * h1;
            let g0 = GRADIENT_PREFACTOR * h0 * h0 * h0;
            let mid_y = 0.5 * (h1 + h0);
            let mid_v = 0.5 * (g1 + g0);
            ops.drift(h1, shell);
            ops.kick(mid_y * y, mid_v * v, shell);
            ops.drift(h0, shell);
            ops.kick(mid_y * y, mid_v * v, shell);
            ops.drift(h1, shell);
            ops.kick(h1 * y, g1 * v, shell);
        }
    }
}

/// Longest drift sub-step coefficient of a scheme, as a fraction of the
/// step size. The critical-radius table scales shell timesteps with this.
pub fn longest_drift_substep(phi: Splitting) -> f64 {
    match phi {
        Splitting::Lf => 0.5,
        Splitting::Lf4 => LF4_A,
        Splitting::Lf42 => 1.0 - 2.0 * LF42_A,
        Splitting::Lf6 => 0.5100434119184585,
        Splitting::Lf8 => 1.4313162592035251,
        Splitting::Lf864 => 0.8858166925977683,
        Splitting::Plf764 => PLF764_MID,
        Splitting::Pmlf4 => 1.0,
        Splitting::Pmlf6 => PMLF6_G1,
    }
}

/// Every named scheme, for exhaustive sweeps in tests and benches.
pub const ALL_SCHEMES: [Splitting; 9] = [
    Splitting::Lf,
    Splitting::Lf4,
    Splitting::Lf42,
    Splitting::Lf6,
    Splitting::Lf8,
    Splitting::Lf864,
    Splitting::Plf764,
    Splitting::Pmlf4,
    Splitting::Pmlf6,
];
