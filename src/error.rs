//! Error types for configuration loading and validation.
//!
//! The per-frame simulation path is total and never returns these: degenerate
//! geometry (zero-length offsets, empty collections) is absorbed as a no-op.
//! Errors only arise while turning `assets/field.toml` into a [`FieldConfig`].
//!
//! [`FieldConfig`]: crate::config::FieldConfig

use std::fmt;

/// Top-level error enum for the particle field.
#[derive(Debug)]
pub enum FieldError {
    /// The config file exists but could not be read.
    ConfigRead {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML, or a key has the wrong type.
    ConfigParse {
        /// Path of the offending file.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// A numeric setting is outside its safe operating range.
    UnsafeConstant {
        /// Name of the setting (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// Two settings that bound a range are in the wrong order.
    InvertedRange {
        /// Setting that must be the smaller one.
        low: &'static str,
        low_value: f32,
        /// Setting that must be the larger one.
        high: &'static str,
        high_value: f32,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::ConfigRead { path, source } => {
                write!(f, "failed to read {}: {}", path, source)
            }
            FieldError::ConfigParse { path, source } => {
                write!(f, "failed to parse {}: {}", path, source)
            }
            FieldError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "setting '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
            FieldError::InvertedRange {
                low,
                low_value,
                high,
                high_value,
            } => write!(
                f,
                "setting '{}' = {} must be below '{}' = {}",
                low, low_value, high, high_value
            ),
        }
    }
}

impl std::error::Error for FieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FieldError::ConfigRead { source, .. } => Some(source),
            FieldError::ConfigParse { source, .. } => Some(source),
            FieldError::UnsafeConstant { .. } | FieldError::InvertedRange { .. } => None,
        }
    }
}

/// Convenience alias: a `Result` using `FieldError` as the error type.
pub type FieldResult<T> = Result<T, FieldError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is finite and strictly positive.
pub fn validate_positive(name: &'static str, value: f32) -> FieldResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FieldError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error unless `value` is finite and non-negative.
pub fn validate_non_negative(name: &'static str, value: f32) -> FieldResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FieldError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, ∞)",
        })
    }
}

/// Returns an error if a count that drives per-click or per-query work is zero.
pub fn validate_count(name: &'static str, value: usize) -> FieldResult<()> {
    if value == 0 {
        Err(FieldError::UnsafeConstant {
            name,
            value: 0.0,
            safe_range: "[1, ∞)",
        })
    } else {
        Ok(())
    }
}

/// Returns an error unless `low` does not exceed `high`.
pub fn validate_at_most(
    low: (&'static str, f32),
    high: (&'static str, f32),
) -> FieldResult<()> {
    if low.1 <= high.1 {
        Ok(())
    } else {
        Err(FieldError::InvertedRange {
            low: low.0,
            low_value: low.1,
            high: high.0,
            high_value: high.1,
        })
    }
}

/// Returns an error unless `low` is strictly below `high`.
pub fn validate_below(low: (&'static str, f32), high: (&'static str, f32)) -> FieldResult<()> {
    if low.1 < high.1 {
        Ok(())
    } else {
        Err(FieldError::InvertedRange {
            low: low.0,
            low_value: low.1,
            high: high.0,
            high_value: high.1,
        })
    }
}

/// Returns an error unless `value` lies in `[0, 1]`.
pub fn validate_unit(name: &'static str, value: f32) -> FieldResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(FieldError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, 1.0]",
        })
    }
}
