//! Configuration file support

use crate::error::{Error, Result};
use crate::types::GenerationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Initial session configuration
    #[serde(default)]
    pub defaults: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Inline API key (takes precedence over the environment)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Filename prefix for exported images
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

// Defaults

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_prefix() -> String {
    "nanoglass".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            prefix: default_prefix(),
        }
    }
}

impl ApiConfig {
    /// Inline key, then `$api_key_env`, then `GOOGLE_API_KEY`
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| non_empty_env(&self.api_key_env))
            .or_else(|| non_empty_env("GOOGLE_API_KEY"))
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Default location: `<config dir>/nanoglass/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("nanoglass").join("config.toml"))
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.defaults.validate_ranges()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            tracing::debug!("config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        tracing::info!("loading config from {}", path.display());
        Self::from_file(&path)
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents =
            toml::to_string_pretty(self).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BackgroundColor, ModelTier};

    #[test]
    fn test_empty_file_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.output.prefix, "nanoglass");
        assert_eq!(config.api.api_key_env, "GEMINI_API_KEY");
    }

    #[test]
    fn test_partial_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            [api]
            api_key = "abc"

            [output]
            dir = "renders"

            [defaults]
            background = "transparent"
            model = "pro"
            image_count = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.api.resolve_api_key().as_deref(), Some("abc"));
        assert_eq!(config.api.base_url, default_base_url());
        assert_eq!(config.output.dir, PathBuf::from("renders"));
        assert_eq!(config.output.prefix, "nanoglass");
        assert_eq!(config.defaults.background, BackgroundColor::Transparent);
        assert_eq!(config.defaults.model, ModelTier::Pro);
        assert_eq!(config.defaults.image_count, 4);
        assert_eq!(config.defaults.simplicity_level, 3);
    }

    #[test]
    fn test_file_roundtrip_and_range_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.defaults.image_count = 3;
        config.to_file(&path).unwrap();
        assert_eq!(AppConfig::from_file(&path).unwrap(), config);

        std::fs::write(&path, "[defaults]\nimage_count = 42\n").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(Error::InvalidConfig(_))
        ));

        std::fs::write(&path, "[defaults]\nsimplicity_level = 9\n").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(Some(dir.path().join("absent.toml").as_path())).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
