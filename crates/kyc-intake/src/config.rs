//! Configuration management for kyc-intake.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::capture::FacingMode;
use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "kyc-intake";

/// Default upload endpoint.
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "http://localhost:8080/api/upload";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `KYC_INTAKE_`)
/// 2. TOML config file at `~/.config/kyc-intake/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upload configuration.
    pub upload: UploadConfig,
    /// Camera configuration.
    pub camera: CameraConfig,
}

/// Where and how the form is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// The multipart POST target.
    pub endpoint: String,
    /// Client-side request timeout in seconds. 0 disables it.
    pub timeout_secs: u64,
}

/// Camera capture configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Explicit device path. When unset the device layer picks one
    /// according to `facing`.
    pub device: Option<PathBuf>,
    /// Preferred camera facing.
    pub facing: FacingMode,
    /// JPEG quality for captured stills (1-100).
    pub jpeg_quality: u8,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_UPLOAD_ENDPOINT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: None,
            facing: FacingMode::Environment,
            jpeg_quality: 92,
        }
    }
}

impl Config {
    /// Load configuration from defaults, the TOML file at `config_path` (or
    /// the default path) and `KYC_INTAKE_` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("KYC_INTAKE_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let endpoint =
            reqwest::Url::parse(&self.upload.endpoint).map_err(|e| Error::ConfigValidation {
                message: format!("invalid upload endpoint '{}': {e}", self.upload.endpoint),
            })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::ConfigValidation {
                message: format!(
                    "upload endpoint must be http or https, got '{}'",
                    endpoint.scheme()
                ),
            });
        }

        if !(1..=100).contains(&self.camera.jpeg_quality) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "jpeg_quality must be between 1 and 100, got {}",
                    self.camera.jpeg_quality
                ),
            });
        }

        Ok(())
    }

    /// Get the upload timeout, if one is configured.
    #[must_use]
    pub fn upload_timeout(&self) -> Option<Duration> {
        if self.upload.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.upload.timeout_secs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.upload.endpoint, DEFAULT_UPLOAD_ENDPOINT);
        assert_eq!(config.upload.timeout_secs, 30);
        assert!(config.camera.device.is_none());
        assert_eq!(config.camera.facing, FacingMode::Environment);
        assert_eq!(config.camera.jpeg_quality, 92);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_garbage_endpoint() {
        let mut config = Config::default();
        config.upload.endpoint = "not a url".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("invalid upload endpoint"));
    }

    #[test]
    fn test_validate_rejects_non_http_endpoint() {
        let mut config = Config::default();
        config.upload.endpoint = "ftp://example.com/upload".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("http or https"));
    }

    #[test]
    fn test_validate_jpeg_quality_bounds() {
        let mut config = Config::default();
        config.camera.jpeg_quality = 0;
        assert!(config.validate().is_err());

        config.camera.jpeg_quality = 101;
        assert!(config.validate().is_err());

        config.camera.jpeg_quality = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_upload_timeout() {
        let mut config = Config::default();
        assert_eq!(config.upload_timeout(), Some(Duration::from_secs(30)));

        config.upload.timeout_secs = 0;
        assert!(config.upload_timeout().is_none());
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("kyc-intake"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert_eq!(result.unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[upload]\nendpoint = \"https://kyc.example.com/api/upload\"\n\n\
             [camera]\nfacing = \"user\"\njpeg_quality = 80\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.upload.endpoint, "https://kyc.example.com/api/upload");
        assert_eq!(config.upload.timeout_secs, 30);
        assert_eq!(config.camera.facing, FacingMode::User);
        assert_eq!(config.camera.jpeg_quality, 80);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[camera]\njpeg_quality = 0\n").unwrap();

        assert!(matches!(
            Config::load_from(Some(path)),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_camera_config_deserialize() {
        let json = r#"{"device": "/dev/video2", "facing": "environment"}"#;
        let camera: CameraConfig = serde_json::from_str(json).unwrap();
        assert_eq!(camera.device, Some(PathBuf::from("/dev/video2")));
        assert_eq!(camera.jpeg_quality, 92);
    }

    #[test]
    fn test_config_clone() {
        let config = Config::default();
        assert_eq!(config.clone(), config);
    }
}
