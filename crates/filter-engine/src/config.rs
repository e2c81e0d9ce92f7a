use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_MAX_DEPTH: usize = 512;
pub const MAX_DEPTH_ENV: &str = "FILTER_MAX_DEPTH";

/// Function type for reading environment variables
pub type EnvGetter = fn(&str) -> Option<String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Deepest tree the adapter will walk, counting nested function calls.
    pub max_depth: usize,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl AdapterConfig {
    pub fn with_max_depth(max_depth: usize) -> Result<Self, ConfigError> {
        let config = Self { max_depth };
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `FILTER_MAX_DEPTH` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    pub fn from_env_with(env_getter: EnvGetter) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = env_getter(MAX_DEPTH_ENV) {
            config.max_depth = raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::EnvParseError {
                    var: MAX_DEPTH_ENV.to_string(),
                    value: raw.clone(),
                    expected_type: "unsigned integer".to_string(),
                })?;
            debug!("Using max_depth {} from {}", config.max_depth, MAX_DEPTH_ENV);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_key: &str) -> Option<String> {
        None
    }

    fn depth_env(key: &str) -> Option<String> {
        (key == MAX_DEPTH_ENV).then(|| " 64 ".to_string())
    }

    fn bad_env(_key: &str) -> Option<String> {
        Some("deep".to_string())
    }

    fn zero_env(_key: &str) -> Option<String> {
        Some("0".to_string())
    }

    #[test]
    fn test_defaults_without_env() {
        let config = AdapterConfig::from_env_with(no_env).unwrap();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_env_override() {
        let config = AdapterConfig::from_env_with(depth_env).unwrap();
        assert_eq!(config.max_depth, 64);
    }

    #[test]
    fn test_env_parse_error() {
        let err = AdapterConfig::from_env_with(bad_env).unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { ref value, .. } if value == "deep"));
    }

    #[test]
    fn test_zero_depth_rejected() {
        assert!(matches!(
            AdapterConfig::from_env_with(zero_env),
            Err(ConfigError::Invalid(_))
        ));
        assert!(AdapterConfig::with_max_depth(0).is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: AdapterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AdapterConfig::default());
        let config: AdapterConfig = serde_json::from_str(r#"{"max_depth": 8}"#).unwrap();
        assert_eq!(config.max_depth, 8);
    }
}
