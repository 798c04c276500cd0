//! Error types shared by the engine and the visualizer.

use std::fmt;

/// Errors raised when a caller asks for a galaxy that cannot be generated.
#[derive(Debug, Clone, PartialEq)]
pub enum GalaxyError {
    /// A generation or configuration parameter is outside its accepted range.
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Human readable description of the constraint that was violated.
        reason: String,
    },
}

impl GalaxyError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        GalaxyError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for GalaxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GalaxyError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
        }
    }
}

impl std::error::Error for GalaxyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_parameter() {
        let err = GalaxyError::invalid("spread", "must not be negative (got -1)");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'spread': must not be negative (got -1)"
        );
    }

    #[test]
    fn test_converts_into_anyhow_and_back() {
        let err: anyhow::Error = GalaxyError::invalid("num_stars", "must be positive").into();
        let typed = err.downcast_ref::<GalaxyError>();
        assert!(matches!(
            typed,
            Some(GalaxyError::InvalidParameter { name: "num_stars", .. })
        ));
    }
}
