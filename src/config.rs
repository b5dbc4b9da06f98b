//! Solver tolerances and presentation settings.
//!
//! [`SolverConfig`] can be built in code with the `with_*` setters or loaded
//! from TOML:
//!
//! ```
//! use matrixlib::config::SolverConfig;
//!
//! let config = SolverConfig::from_toml_str("default_damping = 0.05").unwrap();
//! assert!((config.default_damping - 0.05).abs() < 1e-12);
//! assert_eq!(config.display_precision, 6);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, Result};

/// Tolerances used by the checked solvers, the nullspace projector and
/// matrix printing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Relative pivot threshold for the invertibility test of
    /// `solve_check`. `None` selects `f64::EPSILON * n`.
    pub rank_threshold: Option<f64>,
    /// Damping used by the nullspace projector when none is given.
    pub default_damping: f64,
    /// Tolerance of [`Matrix::is_approx_with`](crate::Matrix::is_approx_with).
    pub approx_precision: f64,
    /// Digits after the decimal point when displaying a matrix.
    pub display_precision: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            rank_threshold: None,
            default_damping: 0.0,
            approx_precision: 1e-12,
            display_precision: 6,
        }
    }
}

impl SolverConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the relative pivot threshold used to decide invertibility.
    #[must_use]
    pub fn with_rank_threshold(mut self, threshold: f64) -> Self {
        self.rank_threshold = Some(threshold);
        self
    }

    /// Sets the default damping of the nullspace projector.
    #[must_use]
    pub fn with_default_damping(mut self, damping: f64) -> Self {
        self.default_damping = damping;
        self
    }

    /// Sets the default approximate-equality tolerance.
    #[must_use]
    pub fn with_approx_precision(mut self, precision: f64) -> Self {
        self.approx_precision = precision;
        self
    }

    /// Sets the number of digits used when displaying matrices.
    #[must_use]
    pub fn with_display_precision(mut self, digits: usize) -> Self {
        self.display_precision = digits;
        self
    }

    /// Threshold for an `n`-by-`n` factorization.
    #[must_use]
    pub fn rank_threshold_for(&self, n: usize) -> f64 {
        self.rank_threshold
            .unwrap_or(f64::EPSILON * n.max(1) as f64)
    }

    /// Checks that every field lies in its accepted domain.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if let Some(threshold) = self.rank_threshold {
            if !(threshold.is_finite() && threshold >= 0.0) {
                return Err(MatrixError::Config(format!(
                    "rank_threshold must be a finite non-negative number, got {threshold}"
                )));
            }
        }
        if !(self.default_damping.is_finite() && self.default_damping >= 0.0) {
            return Err(MatrixError::Config(format!(
                "default_damping must be a finite non-negative number, got {}",
                self.default_damping
            )));
        }
        if !(self.approx_precision.is_finite() && self.approx_precision > 0.0) {
            return Err(MatrixError::Config(format!(
                "approx_precision must be positive, got {}",
                self.approx_precision
            )));
        }
        if self.display_precision > 17 {
            return Err(MatrixError::Config(format!(
                "display_precision must be at most 17, got {}",
                self.display_precision
            )));
        }
        Ok(())
    }

    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Config`] on malformed TOML or invalid values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| MatrixError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Io`] if the file cannot be read, or
    /// [`MatrixError::Config`] if its content is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading solver configuration");
        Self::from_toml_str(&text)
    }

    /// Serializes the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Config`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| MatrixError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::default();
        assert!(config.rank_threshold.is_none());
        assert_eq!(config.default_damping, 0.0);
        assert_eq!(config.display_precision, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SolverConfig::new()
            .with_rank_threshold(1e-9)
            .with_default_damping(0.5)
            .with_approx_precision(1e-6)
            .with_display_precision(3);
        assert_eq!(config.rank_threshold, Some(1e-9));
        assert_eq!(config.default_damping, 0.5);
        assert_eq!(config.approx_precision, 1e-6);
        assert_eq!(config.display_precision, 3);
    }

    #[test]
    fn test_rank_threshold_default_scales_with_size() {
        let config = SolverConfig::default();
        assert_eq!(config.rank_threshold_for(10), f64::EPSILON * 10.0);
        assert_eq!(config.rank_threshold_for(0), f64::EPSILON);
        let fixed = config.with_rank_threshold(1e-3);
        assert_eq!(fixed.rank_threshold_for(10), 1e-3);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = SolverConfig::from_toml_str("display_precision = 4\n")
            .expect("valid partial configuration");
        assert_eq!(config.display_precision, 4);
        assert_eq!(config.approx_precision, 1e-12);
    }

    #[test]
    fn test_from_toml_rejects_negative_damping() {
        let err = SolverConfig::from_toml_str("default_damping = -1.0").unwrap_err();
        assert!(matches!(err, MatrixError::Config(_)));
        assert!(err.to_string().contains("default_damping"));
    }

    #[test]
    fn test_from_toml_rejects_malformed() {
        let err = SolverConfig::from_toml_str("default_damping = [").unwrap_err();
        assert!(matches!(err, MatrixError::Config(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = SolverConfig::new()
            .with_rank_threshold(1e-10)
            .with_default_damping(0.25);
        let text = config.to_toml_string().expect("serializable");
        let parsed = SolverConfig::from_toml_str(&text).expect("parsable");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "approx_precision = 1e-8").expect("write config");
        let config = SolverConfig::from_file(file.path()).expect("load config");
        assert_eq!(config.approx_precision, 1e-8);
    }

    #[test]
    fn test_from_missing_file() {
        let err = SolverConfig::from_file("/nonexistent/solver.toml").unwrap_err();
        assert!(matches!(err, MatrixError::Io(_)));
    }
}
