use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration loaded from `~/.weft/config.toml`.
///
/// Credentials for generator backends are never stored here; backends read
/// them from environment variables at runtime.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub personas: PersonaConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl Config {
    /// Load config from `~/.weft/config.toml`, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(path)
        } else {
            let cfg = Config::default();
            cfg.validate()?;
            Ok(cfg)
        }
    }

    /// Load from a specific path.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let cfg: Config = toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialize config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        self.validate()?;
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Semantic validation for settings not expressible via type checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generator.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "generator.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".weft")
            .join("config.toml")
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(String),
    #[error("parse: {0}")]
    Parse(String),
    #[error("validation: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Section structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Agent name used when the caller does not name one explicitly.
    #[serde(default)]
    pub default_agent: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            default_agent: None,
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Directory scanned for `*.md` persona files at startup.
    #[serde(default = "default_persona_dir")]
    pub dir: PathBuf,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            dir: default_persona_dir(),
        }
    }
}

fn default_persona_dir() -> PathBuf {
    PathBuf::from("personas")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Model identifier passed to the configured backend.
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum generate attempts per call (first try included).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay for exponential backoff between retries.
    #[serde(default = "default_backoff_ms")]
    pub initial_backoff_ms: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_max_attempts() -> u32 {
    5
}
fn default_backoff_ms() -> u64 {
    2_000
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.general.log_level, "info");
        assert_eq!(cfg.personas.dir, PathBuf::from("personas"));
        assert_eq!(cfg.generator.max_attempts, 5);
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = Config::default();
        let text = cfg.to_toml().unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.generator.model, cfg.generator.model);
        assert_eq!(back.personas.dir, cfg.personas.dir);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[general]\nlog_level = \"debug\"\ndefault_agent = \"Plain\"\n\n[personas]\ndir = \"defs\"\n",
        )
        .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.general.log_level, "debug");
        assert_eq!(cfg.general.default_agent.as_deref(), Some("Plain"));
        assert_eq!(cfg.personas.dir, PathBuf::from("defs"));
        // Unspecified sections fall back to defaults.
        assert_eq!(cfg.generator.max_attempts, 5);
    }

    #[test]
    fn load_from_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not valid [ toml").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_attempts_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[generator]\nmax_attempts = 0\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::load_from("/nonexistent/weft/config.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
