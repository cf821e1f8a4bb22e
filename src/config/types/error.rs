//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),

    #[error("`{0}` is required (set it in the config file or pass --{1})")]
    MissingEntry(&'static str, &'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("test.toml"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        let display = format!("{io_err}");
        assert!(display.contains("IO error"));
        assert!(display.contains("test.toml"));

        let validation_err = ConfigError::Validation("host must not be empty".to_string());
        assert!(format!("{validation_err}").contains("host must not be empty"));
    }

    #[test]
    fn test_missing_entry_display() {
        let err = ConfigError::MissingEntry("entry.background", "background");
        let display = format!("{err}");
        assert!(display.contains("entry.background"));
        assert!(display.contains("--background"));
    }
}
