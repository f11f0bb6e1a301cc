//! Error types for menu loading and route resolution

use thiserror::Error;

/// Result type alias for router operations
pub type RouterResult<T> = Result<T, RouterError>;

/// Errors that can occur while loading menus or resolving views
#[derive(Error, Debug)]
pub enum RouterError {
    /// The menu endpoint answered with something other than a node array
    #[error("Malformed menu response: {reason}")]
    MalformedResponse {
        /// What was wrong with the payload
        reason: String,
    },

    /// Network or transport failure while fetching menu data
    #[error("Failed to fetch menu data: {message}")]
    FetchFailure {
        /// Error message
        message: String,
    },

    /// The backend rejected the session
    #[error("Session rejected by backend: {message}")]
    Unauthorized {
        /// Error message
        message: String,
    },

    /// No registered view matches a component reference
    #[error("No view matches component reference {component:?}")]
    ComponentResolution {
        /// Declared component reference
        component: String,
    },

    /// A registered view failed to load
    #[error("Failed to load view {key}: {message}")]
    ViewLoad {
        /// Registry key of the view
        key: String,
        /// Error message
        message: String,
    },

    /// Invalid router configuration
    #[error("Invalid router configuration: {message}")]
    Configuration {
        /// Error message
        message: String,
    },
}

impl RouterError {
    /// Create a malformed response error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Create a fetch failure error
    pub fn fetch_failure(message: impl Into<String>) -> Self {
        Self::FetchFailure {
            message: message.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a component resolution error
    pub fn component_resolution(component: impl Into<String>) -> Self {
        Self::ComponentResolution {
            component: component.into(),
        }
    }

    /// Create a view load error
    pub fn view_load(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ViewLoad {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Check if a later attempt may succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchFailure { .. })
    }

    /// Get error severity level for logging
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ComponentResolution { .. } | Self::ViewLoad { .. } => ErrorSeverity::Warning,
            Self::FetchFailure { .. } | Self::Unauthorized { .. } => ErrorSeverity::Error,
            Self::MalformedResponse { .. } | Self::Configuration { .. } => ErrorSeverity::Critical,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Warning - recovered locally
    Warning,
    /// Error - operation failed, navigation falls back
    Error,
    /// Critical - backend contract broken or misconfigured
    Critical,
}

impl From<chai_core::Error> for RouterError {
    fn from(err: chai_core::Error) -> Self {
        match err {
            chai_core::Error::Validation { .. } | chai_core::Error::Serialization(_) => {
                Self::malformed(err.to_string())
            }
            chai_core::Error::Configuration { message } => Self::Configuration { message },
            chai_core::Error::Io(_) | chai_core::Error::Other(_) => {
                Self::fetch_failure(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = RouterError::malformed("expected an array");
        assert!(matches!(err, RouterError::MalformedResponse { .. }));

        let err = RouterError::component_resolution("system/user");
        assert!(matches!(err, RouterError::ComponentResolution { .. }));
    }

    #[test]
    fn test_error_retryable() {
        assert!(RouterError::fetch_failure("connection reset").is_retryable());
        assert!(!RouterError::malformed("null").is_retryable());
        assert!(!RouterError::unauthorized("token expired").is_retryable());
    }

    #[test]
    fn test_error_severity() {
        assert_eq!(
            RouterError::view_load("error/404View", "boom").severity(),
            ErrorSeverity::Warning
        );
        assert_eq!(
            RouterError::fetch_failure("timeout").severity(),
            ErrorSeverity::Error
        );
        assert_eq!(
            RouterError::malformed("object").severity(),
            ErrorSeverity::Critical
        );
    }

    #[test]
    fn test_core_validation_maps_to_malformed() {
        let core = chai_core::Error::validation("response", "expected an array");
        let err = RouterError::from(core);

        assert!(matches!(err, RouterError::MalformedResponse { .. }));
        assert!(err.to_string().contains("expected an array"));
    }

    #[test]
    fn test_error_display() {
        let err = RouterError::component_resolution("system/missing");
        assert_eq!(
            err.to_string(),
            "No view matches component reference \"system/missing\""
        );
    }
}
