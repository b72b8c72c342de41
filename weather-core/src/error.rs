//! Error taxonomy for lookups against the weather and geocoding providers.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeatherError {
    /// Geocoding returned no match for the query.
    #[error("City not found: {0}")]
    NotFound(String),

    /// Network failure or non-success HTTP status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with a payload we cannot interpret.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl WeatherError {
    pub fn transport(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Transport(format!("{context}: {err}"))
    }

    pub fn malformed(context: &str, err: impl std::fmt::Display) -> Self {
        Self::MalformedResponse(format!("{context}: {err}"))
    }

    /// Text suitable for a toast or status line.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(query) => format!("City not found: {query}"),
            Self::Transport(_) => "Network error. Please try again.".to_string(),
            Self::MalformedResponse(_) => "Something went wrong loading weather data.".to_string(),
        }
    }
}

/// Failures of the platform geolocation capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Geolocation is not supported here")]
    Unsupported,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages() {
        assert!(WeatherError::NotFound("Atlantis".into()).user_message().contains("Atlantis"));
        assert!(WeatherError::Transport("reset".into()).user_message().contains("try again"));
        assert!(!WeatherError::MalformedResponse("x".into()).user_message().contains('x'));
    }

    #[test]
    fn constructors_keep_context() {
        let err = WeatherError::transport("geocoding request", "connection refused");
        assert_eq!(err.to_string(), "Transport error: geocoding request: connection refused");
    }
}
