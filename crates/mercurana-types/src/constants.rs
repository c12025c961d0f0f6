// ─────────────────────────────────────────────────────────────────────
// Mercurana N-Body Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Gravitational constant in simulation units.
/// NOTE: Integrations normally run in G = 1 units; hosts working in SI
/// override `Simulation::g` directly.
pub const DEFAULT_GRAVITATIONAL_CONSTANT: f64 = 1.0;

/// Fixed iteration count of the Newton cube root used for critical radii.
/// Chosen so the iterate is converged to the last bit on every platform;
/// bit-for-bit reproducibility of a step depends on this being fixed.
pub const CBRT_NEWTON_ITERATIONS: usize = 200;

/// Sentinel for "no drift bound yet" in the maxdrift tables.
pub const MAXDRIFT_UNBOUNDED: f64 = 1e300;

/// Initial capacity of the collision pair buffer.
pub const COLLISION_BUFFER_INITIAL: usize = 32;
