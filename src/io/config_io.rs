use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::DeckConfig;

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "taskdeck.toml";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Read and parse a config file.
pub fn read_config(path: &Path) -> Result<DeckConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Resolve the config for this run.
///
/// An explicit path must exist. Otherwise `taskdeck.toml` in `dir` is used if
/// present, and defaults if not.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<DeckConfig, ConfigError> {
    match config_source(explicit, dir) {
        Some(path) => read_config(&path),
        None => Ok(DeckConfig::default()),
    }
}

/// The file [`load_config`] reads, or `None` when it falls back to defaults.
pub fn config_source(explicit: Option<&Path>, dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    candidate.is_file().then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::filter::Filter;
    use tempfile::TempDir;

    #[test]
    fn test_missing_default_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(None, tmp.path()).unwrap();
        assert_eq!(config, DeckConfig::default());
    }

    #[test]
    fn test_default_file_is_picked_up() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(DEFAULT_CONFIG_FILE),
            "[view]\ndefault_filter = \"overdue\"\n",
        )
        .unwrap();
        let config = load_config(None, tmp.path()).unwrap();
        assert_eq!(config.view.default_filter, Filter::Overdue);
    }

    #[test]
    fn test_config_source() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(config_source(None, tmp.path()), None);
        let explicit = tmp.path().join("other.toml");
        assert_eq!(config_source(Some(&explicit), tmp.path()), Some(explicit.clone()));
        fs::write(tmp.path().join(DEFAULT_CONFIG_FILE), "").unwrap();
        assert_eq!(
            config_source(None, tmp.path()),
            Some(tmp.path().join(DEFAULT_CONFIG_FILE))
        );
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.toml");
        let err = load_config(Some(&missing), tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "[[seed.tasks]]\ntitle = \"x\"\ndue = \"not a date\"\n").unwrap();
        let err = read_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }
}
