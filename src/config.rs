//! Configuration management for CryptoJoule

use crate::error::{JouleError, Result};
use crate::modality::DEFAULT_MAX_DEPTH;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Deepest composed modality chain a config may request.
pub const MAX_MODALITY_DEPTH: usize = 16;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisConfig {
    /// Locate transactions on the rayon pool.
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// 0 uses rayon's global pool.
    #[serde(default)]
    pub threads: usize,
    #[serde(default = "default_modality_depth")]
    pub modality_depth: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: 0,
            modality_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub pretty: bool,
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            color: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_modality_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Config {
    pub fn from_toml(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let depth = self.analysis.modality_depth;
        if depth == 0 || depth > MAX_MODALITY_DEPTH {
            return Err(JouleError::Config(format!(
                "analysis.modality_depth must be between 1 and {}, got {}",
                MAX_MODALITY_DEPTH, depth
            )));
        }
        Ok(())
    }
}

/// Load `config.toml` from the working directory, falling back to defaults.
pub fn load_config() -> Result<Config> {
    load_config_from("config.toml")
}

pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(contents) => {
            debug!("Loaded configuration from {}", path.display());
            Config::from_toml(&contents)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No configuration at {}, using defaults", path.display());
            Ok(Config::default())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_for_empty_file() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.analysis.parallel);
        assert_eq!(config.analysis.modality_depth, 3);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml("[analysis]\nthreads = 4\n\n[output]\ncolor = false\n").unwrap();
        assert_eq!(config.analysis.threads, 4);
        assert!(config.analysis.parallel);
        assert!(!config.output.color);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_depth_validation() {
        let err = Config::from_toml("[analysis]\nmodality_depth = 0\n").unwrap_err();
        assert!(matches!(err, JouleError::Config(_)));
        assert!(Config::from_toml("[analysis]\nmodality_depth = 17\n").is_err());
        assert!(Config::from_toml("[analysis]\nmodality_depth = 16\n").is_ok());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            Config::from_toml("[analysis\n"),
            Err(JouleError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\nparallel = false").unwrap();
        let config = load_config_from(file.path()).unwrap();
        assert!(!config.analysis.parallel);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
