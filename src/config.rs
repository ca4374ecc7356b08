use crate::defaults;
use crate::error::{Result, TrainvoxError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub solver: SolverConfig,
    pub audio: AudioConfig,
}

/// Itinerary solver configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    pub url: String,
    pub timeout_secs: u64,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            url: defaults::SOLVER_URL.to_string(),
            timeout_secs: defaults::SOLVER_TIMEOUT_SECS,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Fields absent from the file keep their defaults; invalid TOML is an
    /// error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    ///
    /// A file that exists but fails to parse is still an error; a typo in
    /// the config must not silently fall back.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(TrainvoxError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Apply `TRAINVOX_SOLVER_URL` and `TRAINVOX_AUDIO_DEVICE` overrides.
    ///
    /// Empty values are ignored, so `TRAINVOX_SOLVER_URL= trainvox …`
    /// does not blank out the configured URL.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("TRAINVOX_SOLVER_URL")
            && !url.is_empty()
        {
            self.solver.url = url;
        }

        if let Ok(device) = std::env::var("TRAINVOX_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        self
    }

    /// Validate configuration values.
    ///
    /// Checks the fields whose bad values would only surface deep inside the
    /// pipeline (a zero timeout, an empty solver URL).
    pub fn validate(&self) -> Result<()> {
        if self.solver.url.trim().is_empty() {
            return Err(TrainvoxError::ConfigInvalidValue {
                key: "solver.url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.solver.timeout_secs == 0 {
            return Err(TrainvoxError::ConfigInvalidValue {
                key: "solver.timeout_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.audio.sample_rate == 0 {
            return Err(TrainvoxError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Default config location: `<config dir>/trainvox/config.toml`.
    #[cfg(feature = "cli")]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("trainvox").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_trainvox_env() {
        remove_env("TRAINVOX_SOLVER_URL");
        remove_env("TRAINVOX_AUDIO_DEVICE");
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.solver.url, "http://localhost:8000");
        assert_eq!(config.solver.timeout_secs, 30);
        assert_eq!(config.audio.device, None);
        assert_eq!(config.audio.sample_rate, 16000);
    }

    #[test]
    fn test_load_from_toml_file() {
        let toml_content = r#"
            [solver]
            url = "http://solver.example:9000"
            timeout_secs = 10

            [audio]
            device = "hw:0,0"
            sample_rate = 48000
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.solver.url, "http://solver.example:9000");
        assert_eq!(config.solver.timeout_secs, 10);
        assert_eq!(config.audio.device, Some("hw:0,0".to_string()));
        assert_eq!(config.audio.sample_rate, 48000);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let toml_content = r#"
            [solver]
            url = "http://10.0.0.2:8000"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        // Only the URL should be overridden
        assert_eq!(config.solver.url, "http://10.0.0.2:8000");

        // Everything else should be defaults
        assert_eq!(config.solver.timeout_secs, 30);
        assert_eq!(config.audio.device, None);
        assert_eq!(config.audio.sample_rate, 16000);
    }

    #[test]
    fn test_load_invalid_toml_is_an_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"not [valid toml").unwrap();

        assert!(Config::load(temp_file.path()).is_err());
        assert!(Config::load_or_default(temp_file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_for_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/trainvox.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_override_solver_url() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_trainvox_env();

        set_env("TRAINVOX_SOLVER_URL", "http://192.168.1.5:8000");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.solver.url, "http://192.168.1.5:8000");
        assert_eq!(config.audio.device, None); // Not overridden

        clear_trainvox_env();
    }

    #[test]
    fn test_env_override_device() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_trainvox_env();

        set_env("TRAINVOX_AUDIO_DEVICE", "hw:1,0");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.audio.device, Some("hw:1,0".to_string()));

        clear_trainvox_env();
    }

    #[test]
    fn test_env_override_empty_string_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_trainvox_env();

        set_env("TRAINVOX_SOLVER_URL", "");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.solver.url, defaults::SOLVER_URL);

        clear_trainvox_env();
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let mut config = Config::default();
        config.solver.url = "  ".to_string();

        let result = config.validate();
        assert!(matches!(
            result,
            Err(TrainvoxError::ConfigInvalidValue { key, .. }) if key == "solver.url"
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.solver.timeout_secs = 0;

        let result = config.validate();
        assert!(matches!(
            result,
            Err(TrainvoxError::ConfigInvalidValue { key, .. }) if key == "solver.timeout_secs"
        ));
    }

    #[test]
    fn test_validate_rejects_zero_sample_rate() {
        let mut config = Config::default();
        config.audio.sample_rate = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_roundtrip_through_toml() {
        let mut config = Config::default();
        config.audio.device = Some("pipewire".to_string());

        let serialized = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed, config);
    }
}
