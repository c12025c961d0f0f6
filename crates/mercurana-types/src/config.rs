// ─────────────────────────────────────────────────────────────────────
// Mercurana N-Body Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{MercuranaError, MercuranaResult};

/// Named operator-splitting composition schemes.
///
/// The serialized names are the external constants hosts use in JSON
/// configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Splitting {
    #[serde(rename = "LF")]
    Lf,
    #[serde(rename = "LF4")]
    Lf4,
    #[serde(rename = "LF4_2")]
    Lf42,
    #[serde(rename = "LF6")]
    Lf6,
    #[serde(rename = "LF8")]
    Lf8,
    #[serde(rename = "LF8_6_4")]
    Lf864,
    #[serde(rename = "PLF7_6_4")]
    Plf764,
    #[serde(rename = "PMLF4")]
    Pmlf4,
    #[serde(rename = "PMLF6")]
    Pmlf6,
}

/// Collision detection mode.
///
/// Only the direct all-pairs search is representable; the adaptive
/// integrator predicts overlaps itself during the drift predictor pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CollisionMode {
    #[serde(rename = "NONE")]
    #[default]
    None,
    #[serde(rename = "DIRECT")]
    Direct,
}

/// Configuration of the adaptive shell integrator.
///
/// Defaults match the state restored by `reset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegratorConfig {
    /// Maximum recursion depth (shell 0 is the outermost).
    #[serde(default = "default_nmaxshells")]
    pub nmaxshells: usize,
    /// Sub-steps of the outermost recursion.
    #[serde(default = "default_n0")]
    pub n0: u32,
    /// Sub-steps of deeper recursions. 0 reuses `n0`.
    #[serde(default)]
    pub n1: u32,
    /// Dimensionless error target controlling the critical radii.
    #[serde(default = "default_kappa")]
    pub kappa: f64,
    /// Critical-radius scaling exponent. 0.5 takes a square-root fast
    /// path that is stable under platform `pow` differences.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// G·m₀/r₀ of the innermost orbit; enables the relativistic
    /// critical-radius floor when positive.
    #[serde(default)]
    pub gm0r0: f64,
    /// Composition scheme of the outermost shell.
    #[serde(default = "default_scheme")]
    pub phi0: Splitting,
    /// Composition scheme of the inner shells.
    #[serde(default = "default_scheme")]
    pub phi1: Splitting,
    /// Apply the post-processor at the end of every global step.
    #[serde(default = "default_safe_mode")]
    pub safe_mode: bool,
    /// Number of dominant bodies; the first `n_dominant` particle
    /// indices are treated as sources of dominant gravity.
    #[serde(default)]
    pub n_dominant: usize,
    /// Collision detection mode.
    #[serde(default)]
    pub collision: CollisionMode,
}

fn default_nmaxshells() -> usize {
    10
}
fn default_n0() -> u32 {
    2
}
fn default_kappa() -> f64 {
    1e-3
}
fn default_alpha() -> f64 {
    0.5
}
fn default_scheme() -> Splitting {
    Splitting::Lf
}
fn default_safe_mode() -> bool {
    true
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        IntegratorConfig {
            nmaxshells: default_nmaxshells(),
            n0: default_n0(),
            n1: 0,
            kappa: default_kappa(),
            alpha: default_alpha(),
            gm0r0: 0.0,
            phi0: default_scheme(),
            phi1: default_scheme(),
            safe_mode: default_safe_mode(),
            n_dominant: 0,
            collision: CollisionMode::None,
        }
    }
}

impl IntegratorConfig {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> MercuranaResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Validate the shell/sub-step/error-target combination.
    ///
    /// Rejected configurations leave no way to build a consistent
    /// critical-radius table, so they are refused before any state is
    /// allocated.
    pub fn validate(&self) -> MercuranaResult<()> {
        if self.nmaxshells == 0 {
            return Err(MercuranaError::ConfigError(
                "nmaxshells needs to be larger than 0".to_string(),
            ));
        }
        if self.nmaxshells == 1 && self.n0 > 0 {
            return Err(MercuranaError::ConfigError(
                "nmaxshells >= 2 is required if n0 is greater than 0".to_string(),
            ));
        }
        if self.nmaxshells == 2 && self.n1 > 0 {
            return Err(MercuranaError::ConfigError(
                "nmaxshells >= 3 is required if n1 is greater than 0".to_string(),
            ));
        }
        if self.nmaxshells > 1 && self.kappa <= 0.0 {
            return Err(MercuranaError::ConfigError(
                "kappa > 0 is required if nmaxshells > 1".to_string(),
            ));
        }
        if self.nmaxshells > 1 && self.n0 == 0 {
            return Err(MercuranaError::ConfigError(
                "n0 >= 1 is required if nmaxshells > 1".to_string(),
            ));
        }
        if !self.kappa.is_finite() || !self.alpha.is_finite() || !self.gm0r0.is_finite() {
            return Err(MercuranaError::ConfigError(
                "kappa, alpha and gm0r0 must be finite".to_string(),
            ));
        }
        if self.gm0r0 < 0.0 {
            return Err(MercuranaError::ConfigError(
                "gm0r0 must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}
