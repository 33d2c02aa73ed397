//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::Level;

/// Environment variable prefix for overrides (`ITN_HISTORY_DIR`, ...)
const ENV_PREFIX: &str = "ITN";

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// ONNX export of the usage classifier
    pub model_path: PathBuf,

    /// JSON label decoder (`{"classes": [...]}`)
    pub decoder_path: PathBuf,

    /// Training-time category vocabulary; encoders refit per dataset when unset
    pub vocabulary_path: Option<PathBuf>,

    /// Directory holding one file per recorded prediction run
    pub history_dir: PathBuf,

    /// Maximum log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("itn_xgb_model.onnx"),
            decoder_path: PathBuf::from("target_label_encoder.json"),
            vocabulary_path: None,
            history_dir: PathBuf::from("history"),
            log_level: "info".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Layer defaults, an optional config file and `ITN_*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }
        builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()
    }

    /// Parsed log level, `INFO` when unrecognized
    pub fn level(&self) -> Level {
        Level::from_str(&self.log_level).unwrap_or(Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_sources() {
        let config = PipelineConfig::load(None).unwrap();
        assert_eq!(config.history_dir, PathBuf::from("history"));
        assert_eq!(config.vocabulary_path, None);
        assert_eq!(config.level(), Level::INFO);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "history_dir = \"/var/lib/itn/history\"\nvocabulary_path = \"vocab.json\"\nlog_level = \"debug\""
        )
        .unwrap();

        let config = PipelineConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.history_dir, PathBuf::from("/var/lib/itn/history"));
        assert_eq!(config.vocabulary_path, Some(PathBuf::from("vocab.json")));
        assert_eq!(config.model_path, PathBuf::from("itn_xgb_model.onnx"));
        assert_eq!(config.level(), Level::DEBUG);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(PipelineConfig::load(Some(Path::new("/nonexistent/itn.toml"))).is_err());
    }

    #[test]
    fn test_unknown_level_falls_back() {
        let config = PipelineConfig {
            log_level: "chatty".to_string(),
            ..Default::default()
        };
        assert_eq!(config.level(), Level::INFO);
    }
}
