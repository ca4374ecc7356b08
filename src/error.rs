//! Error types for trainvox.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainvoxError {
    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio capture errors
    #[error("Microphone access denied: {message}")]
    PermissionDenied { message: String },

    #[error("Audio input device unavailable: {device}")]
    DeviceUnavailable { device: String },

    #[error("No active capture session")]
    NoActiveSession,

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Waveform encoding errors
    #[error("Failed to decode audio: {message}")]
    Decode { message: String },

    // Solver pipeline errors
    #[error("Solver unreachable: {message}")]
    Unreachable { message: String },

    #[error("Malformed solver response: {message}")]
    MalformedResponse { message: String },

    #[error("Solver error: {message}")]
    Solver { message: String },

    #[error("Empty query: provide text or audio")]
    EmptyQuery,

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, TrainvoxError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_permission_denied_display() {
        let error = TrainvoxError::PermissionDenied {
            message: "portal refused the stream".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Microphone access denied: portal refused the stream"
        );
    }

    #[test]
    fn test_device_unavailable_display() {
        let error = TrainvoxError::DeviceUnavailable {
            device: "default".to_string(),
        };
        assert_eq!(error.to_string(), "Audio input device unavailable: default");
    }

    #[test]
    fn test_no_active_session_display() {
        let error = TrainvoxError::NoActiveSession;
        assert_eq!(error.to_string(), "No active capture session");
    }

    #[test]
    fn test_decode_display() {
        let error = TrainvoxError::Decode {
            message: "not a RIFF container".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to decode audio: not a RIFF container"
        );
    }

    #[test]
    fn test_unreachable_display() {
        let error = TrainvoxError::Unreachable {
            message: "connection refused".to_string(),
        };
        assert_eq!(error.to_string(), "Solver unreachable: connection refused");
    }

    #[test]
    fn test_malformed_response_display() {
        let error = TrainvoxError::MalformedResponse {
            message: "unexpected content type text/html".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Malformed solver response: unexpected content type text/html"
        );
    }

    #[test]
    fn test_solver_error_passes_message_through() {
        let error = TrainvoxError::Solver {
            message: "Aucun itinéraire trouvé".to_string(),
        };
        assert_eq!(error.to_string(), "Solver error: Aucun itinéraire trouvé");
    }

    #[test]
    fn test_empty_query_display() {
        let error = TrainvoxError::EmptyQuery;
        assert_eq!(error.to_string(), "Empty query: provide text or audio");
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = TrainvoxError::ConfigInvalidValue {
            key: "solver.timeout_secs".to_string(),
            message: "must be positive".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for solver.timeout_secs: must be positive"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file missing");
        let error: TrainvoxError = io_error.into();
        assert!(matches!(error, TrainvoxError::Io(_)));
        assert!(error.to_string().contains("file missing"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_error = toml::from_str::<toml::Value>("not [valid").unwrap_err();
        let error: TrainvoxError = toml_error.into();
        assert!(matches!(error, TrainvoxError::Config(_)));
    }
}
