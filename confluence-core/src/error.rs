//! Error types for the indicator pipeline and signal engine.
//!
//! Every error is raised at setup time (constructors, config loading, series
//! validation). Once a series is accepted, indicator and engine evaluation are
//! infallible: numeric degeneracy is resolved in-value (NaN, 0, or 100).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("insufficient data for {indicator}: need more than {required} bars, got {actual}")]
    InsufficientData {
        indicator: String,
        required: usize,
        actual: usize,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl CoreError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Reject zero-length windows.
pub(crate) fn ensure_length(name: &str, length: usize) -> Result<()> {
    if length == 0 {
        return Err(CoreError::invalid(name, "length must be >= 1"));
    }
    Ok(())
}

/// Reject non-finite or non-positive multipliers.
pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CoreError::invalid(
            name,
            format!("must be a finite value > 0, got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_rejected() {
        let err = ensure_length("ema", 0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidParameter { ref name, .. } if name == "ema"));
        assert!(ensure_length("ema", 1).is_ok());
    }

    #[test]
    fn non_positive_multiplier_rejected() {
        assert!(ensure_positive("st_mult", 0.0).is_err());
        assert!(ensure_positive("st_mult", -1.0).is_err());
        assert!(ensure_positive("st_mult", f64::NAN).is_err());
        assert!(ensure_positive("st_mult", 3.0).is_ok());
    }

    #[test]
    fn error_messages_name_the_parameter() {
        let err = CoreError::invalid("vol_mult", "must be > 0");
        assert_eq!(err.to_string(), "invalid parameter `vol_mult`: must be > 0");

        let err = CoreError::InsufficientData {
            indicator: "atr_14".into(),
            required: 13,
            actual: 5,
        };
        assert!(err.to_string().contains("atr_14"));
    }
}
