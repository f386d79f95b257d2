//! Configuration file support for simswap-network
//!
//! This module handles parsing `.simswap.toml` configuration files that
//! supply the input path and layout parameters without command-line
//! flags.
//!
//! ## Configuration File Format
//!
//! ```toml
//! # .simswap.toml
//!
//! [input]
//! # Path to the `;`-delimited transaction export
//! path = "exports/TZ_28_Aug.csv"
//!
//! [layout]
//! # Seed and iteration count for the force-directed layout
//! seed = 42
//! iterations = 50
//! ```
//!
//! Command-line arguments override config file values, which override
//! built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Input configuration section
#[derive(Debug, Clone, Deserialize, Default)]
pub struct InputConfig {
    /// Path to the transaction export
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Layout configuration section
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LayoutConfig {
    /// Random seed for the force-directed layout
    #[serde(default)]
    pub seed: Option<u64>,

    /// Number of layout iterations
    #[serde(default)]
    pub iterations: Option<usize>,
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SimSwapConfig {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Load configuration from the given directory
///
/// Searches for `.simswap.toml` in the given directory and parent
/// directories. A missing file yields the default configuration.
pub fn load_config(start_path: &Path) -> Result<SimSwapConfig, ConfigError> {
    match find_config_file(start_path) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: SimSwapConfig = toml::from_str(&content)?;
            Ok(config)
        }
        None => Ok(SimSwapConfig::default()),
    }
}

/// Find the config file by searching up the directory tree
fn find_config_file(start_path: &Path) -> Option<PathBuf> {
    let config_names = [".simswap.toml", "simswap.toml"];

    let mut current = if start_path.is_file() {
        start_path.parent()?.to_path_buf()
    } else {
        start_path.to_path_buf()
    };

    loop {
        for name in &config_names {
            let config_path = current.join(name);
            if config_path.exists() {
                return Some(config_path);
            }
        }

        if let Some(parent) = current.parent() {
            current = parent.to_path_buf();
        } else {
            break;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SimSwapConfig::default();
        assert!(config.input.path.is_none());
        assert!(config.layout.seed.is_none());
        assert!(config.layout.iterations.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [input]
            path = "exports/TZ_28_Aug.csv"

            [layout]
            seed = 7
            iterations = 120
        "#;

        let config: SimSwapConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.input.path.as_deref(),
            Some(Path::new("exports/TZ_28_Aug.csv"))
        );
        assert_eq!(config.layout.seed, Some(7));
        assert_eq!(config.layout.iterations, Some(120));
    }

    #[test]
    fn test_partial_config() {
        let config: SimSwapConfig = toml::from_str("[layout]\nseed = 3\n").unwrap();
        assert!(config.input.path.is_none());
        assert_eq!(config.layout.seed, Some(3));
        assert!(config.layout.iterations.is_none());
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert!(config.input.path.is_none());
    }

    #[test]
    fn test_config_found_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join(".simswap.toml")).unwrap();
        writeln!(file, "[layout]\nseed = 11").unwrap();

        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let config = load_config(&nested).unwrap();
        assert_eq!(config.layout.seed, Some(11));
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".simswap.toml"), "not valid toml [").unwrap();

        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
