use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::dump::DumpFormat;

/// Name of the configuration file searched for by [`ConvertConfig::find`].
pub const CONFIG_FILE: &str = "astgen.toml";

/// Where to read sources, where to write dumps, and how to name them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub source_suffix: String,
    pub target_suffix: String,
    pub format: DumpFormat,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        ConvertConfig {
            input_dir: PathBuf::from("example"),
            output_dir: PathBuf::from("target"),
            source_suffix: ".py".to_string(),
            target_suffix: ".ast".to_string(),
            format: DumpFormat::Text,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// On-disk layout: every key of the `[convert]` table is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    convert: ConvertTable,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConvertTable {
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    source_suffix: Option<String>,
    target_suffix: Option<String>,
    format: Option<DumpFormat>,
}

impl ConvertConfig {
    /// Load an `astgen.toml`. Relative directories are resolved against the
    /// directory holding the file; missing keys keep their defaults.
    pub fn load(toml_path: &Path) -> Result<ConvertConfig, ConfigError> {
        let content = std::fs::read_to_string(toml_path).map_err(|source| ConfigError::Read {
            path: toml_path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: toml_path.to_path_buf(),
            source,
        })?;

        let root_dir = toml_path.parent().unwrap_or(Path::new("."));
        let table = file.convert;
        let mut config = ConvertConfig::default();
        if let Some(dir) = table.input_dir {
            config.input_dir = root_dir.join(dir);
        }
        if let Some(dir) = table.output_dir {
            config.output_dir = root_dir.join(dir);
        }
        if let Some(suffix) = table.source_suffix {
            config.source_suffix = suffix;
        }
        if let Some(suffix) = table.target_suffix {
            config.target_suffix = suffix;
        }
        if let Some(format) = table.format {
            config.format = format;
        }
        Ok(config)
    }

    /// Look for an `astgen.toml` in `start_dir` or any of its ancestors.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = ConvertConfig::default();
        assert_eq!(config.input_dir, PathBuf::from("example"));
        assert_eq!(config.output_dir, PathBuf::from("target"));
        assert_eq!(config.source_suffix, ".py");
        assert_eq!(config.target_suffix, ".ast");
        assert_eq!(config.format, DumpFormat::Text);
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join(CONFIG_FILE);
        fs::write(
            &toml_path,
            r#"[convert]
input_dir = "scripts"
target_suffix = ".json"
format = "json"
"#,
        )
        .unwrap();

        let config = ConvertConfig::load(&toml_path).unwrap();
        assert_eq!(config.input_dir, dir.path().join("scripts"));
        assert_eq!(config.output_dir, dir.path().join("target"));
        assert_eq!(config.source_suffix, ".py");
        assert_eq!(config.target_suffix, ".json");
        assert_eq!(config.format, DumpFormat::Json);
    }

    #[test]
    fn test_load_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join(CONFIG_FILE);
        fs::write(&toml_path, "").unwrap();

        let config = ConvertConfig::load(&toml_path).unwrap();
        assert_eq!(config.input_dir, dir.path().join("example"));
        assert_eq!(config.target_suffix, ".ast");
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join(CONFIG_FILE);
        fs::write(&toml_path, "[convert]\ninput = \"x\"\n").unwrap();

        let err = ConvertConfig::load(&toml_path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{}", err);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConvertConfig::load(&dir.path().join(CONFIG_FILE)).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().starts_with("cannot read"));
    }

    #[test]
    fn test_find_in_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "").unwrap();

        assert_eq!(
            ConvertConfig::find(&nested),
            Some(dir.path().join(CONFIG_FILE))
        );
    }
}
