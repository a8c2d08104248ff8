use crate::core::session_store::SessionIdScheme;
use crate::models::pose::PoseConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub type ConfigError = Box<dyn std::error::Error + Send + Sync>;

const MIN_BODY_LIMIT: usize = 1024;
const MAX_BODY_LIMIT: usize = 256 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Interface to bind, e.g. "0.0.0.0"
    pub bind_address: String,
    pub port: u16,
    /// Gesture model artifact (.json, or .pkl with the ml-pyo3 feature)
    pub model_path: PathBuf,
    /// "timestamp" (unix seconds) or "uuid"
    pub session_id_scheme: SessionIdScheme,
    /// JPEG quality of annotated frames (1-100)
    pub jpeg_quality: u8,
    /// Feed face landmarks to the classifier
    pub enable_face_tracking: bool,
    /// Directory holding mediapipe_inference.py
    pub mediapipe_module_dir: Option<PathBuf>,
    /// Largest accepted request body in bytes
    pub body_limit_bytes: usize,
    /// Value of Access-Control-Allow-Origin
    pub cors_allow_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            model_path: PathBuf::from("body_language.json"),
            session_id_scheme: SessionIdScheme::Timestamp,
            jpeg_quality: 95,
            enable_face_tracking: true,
            mediapipe_module_dir: None,
            body_limit_bytes: 16 * 1024 * 1024,
            cors_allow_origin: "*".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults if it doesn't exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Apply `PORT`, `GESTURE_COACH_MODEL_PATH` and `GESTURE_COACH_BIND`
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| format!("Invalid PORT: {}", port))?;
        }
        if let Some(model_path) = lookup("GESTURE_COACH_MODEL_PATH") {
            self.model_path = PathBuf::from(model_path);
        }
        if let Some(bind) = lookup("GESTURE_COACH_BIND") {
            self.bind_address = bind;
        }
        self.validate()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err("Bind address cannot be empty".into());
        }

        if self.port == 0 {
            return Err("Invalid port: 0. Must be between 1 and 65535".into());
        }

        if self.model_path.as_os_str().is_empty() {
            return Err("Model path cannot be empty".into());
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!(
                "Invalid JPEG quality: {}. Must be between 1 and 100",
                self.jpeg_quality
            )
            .into());
        }

        if !(MIN_BODY_LIMIT..=MAX_BODY_LIMIT).contains(&self.body_limit_bytes) {
            return Err(format!(
                "Invalid body limit: {} bytes. Must be between {} and {}",
                self.body_limit_bytes, MIN_BODY_LIMIT, MAX_BODY_LIMIT
            )
            .into());
        }

        if self.cors_allow_origin.trim().is_empty() {
            return Err("CORS allow-origin cannot be empty".into());
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Landmark detector settings derived from this config
    pub fn pose_config(&self) -> PoseConfig {
        PoseConfig {
            enable_face_tracking: self.enable_face_tracking,
            python_module_dir: self.mediapipe_module_dir.clone(),
            ..PoseConfig::default()
        }
    }

    /// `$HOME/.gesture_coach/config/settings.json`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| "Could not determine home directory")?;

        let mut path = PathBuf::from(home);
        path.push(".gesture_coach");
        path.push("config");
        path.push("settings.json");

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.model_path, PathBuf::from("body_language.json"));
        assert_eq!(config.session_id_scheme, SessionIdScheme::Timestamp);
        assert_eq!(config.jpeg_quality, 95);
        assert!(config.enable_face_tracking);
        assert_eq!(config.body_limit_bytes, 16 * 1024 * 1024);
        assert_eq!(config.cors_allow_origin, "*");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.jpeg_quality = 0;
        assert!(config.validate().is_err());
        config.jpeg_quality = 101;
        assert!(config.validate().is_err());
        config.jpeg_quality = 80;

        config.port = 0;
        assert!(config.validate().is_err());
        config.port = 8080;

        config.body_limit_bytes = 10;
        assert!(config.validate().is_err());
        config.body_limit_bytes = 512 * 1024 * 1024;
        assert!(config.validate().is_err());
        config.body_limit_bytes = 1024;

        config.bind_address = " ".to_string();
        assert!(config.validate().is_err());
        config.bind_address = "127.0.0.1".to_string();

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config").join("settings.json");

        let mut config = Config::default();
        config.port = 8081;
        config.session_id_scheme = SessionIdScheme::Uuid;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = Config::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"port": 9000, "session_id_scheme": "uuid"}"#).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.port, 9000);
        assert_eq!(loaded.session_id_scheme, SessionIdScheme::Uuid);
        assert_eq!(loaded.jpeg_quality, 95);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        std::fs::write(&path, r#"{"jpeg_quality": 0}"#).unwrap();
        assert!(Config::load(&path).is_err());

        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("PORT", "7000"),
            ("GESTURE_COACH_MODEL_PATH", "/models/gestures.pkl"),
            ("GESTURE_COACH_BIND", "127.0.0.1"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.port, 7000);
        assert_eq!(config.model_path, PathBuf::from("/models/gestures.pkl"));
        assert_eq!(config.socket_addr(), "127.0.0.1:7000");
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = Config::default();
        assert!(config
            .apply_overrides(|key| (key == "PORT").then(|| "http".to_string()))
            .is_err());
    }

    #[test]
    fn test_pose_config_carries_face_tracking() {
        let mut config = Config::default();
        config.enable_face_tracking = false;
        config.mediapipe_module_dir = Some(PathBuf::from("/opt/python"));

        let pose = config.pose_config();
        assert!(!pose.enable_face_tracking);
        assert_eq!(pose.python_module_dir, Some(PathBuf::from("/opt/python")));
        assert_eq!(pose.min_detection_confidence, 0.5);
    }
}
