//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Engine name for identification.
    pub name: String,
    /// Maximum reasoning iterations per node before the run is aborted.
    pub max_iterations: usize,
    /// Default page size for `load_data` when the caller omits `limit`.
    pub default_page_limit: usize,
    /// Root directory under which per-run data directories are created.
    pub data_root: PathBuf,
    /// Default `max_emails` seed when the caller supplies none.
    pub default_max_emails: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "inbox-pilot".to_string(),
            max_iterations: 64,
            default_page_limit: 50,
            data_root: PathBuf::from("./data"),
            default_max_emails: 100,
        }
    }
}

impl EngineConfig {
    /// Build a config from environment variables, falling back to defaults.
    ///
    /// A variable that is set but unparseable is a hard error, not a silent
    /// fallback.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(root) = std::env::var("INBOX_PILOT_DATA_ROOT") {
            config.data_root = PathBuf::from(root);
        }
        if let Ok(iters) = std::env::var("INBOX_PILOT_MAX_ITERATIONS") {
            config.max_iterations = parse_positive("INBOX_PILOT_MAX_ITERATIONS", &iters)?;
        }
        Ok(config)
    }
}

fn parse_positive(key: &str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a positive integer, got '{}'", value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = EngineConfig::default();
        assert!(config.max_iterations > 0);
        assert!(config.default_page_limit > 0);
        assert_eq!(config.default_max_emails, 100);
    }

    #[test]
    fn unparseable_override_is_rejected() {
        assert_eq!(parse_positive("K", "32").unwrap(), 32);
        assert_eq!(parse_positive("K", " 8 ").unwrap(), 8);
        for bad in ["abc", "", "-3", "0"] {
            let err = parse_positive("K", bad).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "K"));
        }
    }
}
