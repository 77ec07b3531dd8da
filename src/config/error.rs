//! Errors raised while loading `notesync.toml`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config `{0}`")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("malformed config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_read_error_names_file() {
        let err = ConfigError::Read(
            PathBuf::from("notesync.toml"),
            Error::new(ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.to_string(), "cannot read config `notesync.toml`");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_carries_reason() {
        let err = ConfigError::Invalid("[convert.roots] is empty".into());
        assert_eq!(err.to_string(), "invalid config: [convert.roots] is empty");
    }

    #[test]
    fn test_parse_error_converts() {
        let err: ConfigError = toml::from_str::<toml::Value>("[vault").unwrap_err().into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
