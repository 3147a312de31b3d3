use crate::properties::PixelSize;
use serde::Deserialize;
use stagehand_engine::{Error, Result};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Stagehand".to_string(),
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResourcesConfig {
    pub root: PathBuf,
    // Relative to `root`.
    pub index: PathBuf,
    pub initial_scene: Option<String>,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            index: PathBuf::from("index.json"),
            initial_scene: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub resources: ResourcesConfig,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    pub fn from_toml_str(data: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(data)
            .map_err(|e| Error::InvalidConfiguration(format!("engine config: {e}")))?;
        if config.window.width == 0 || config.window.height == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "engine config: window size {}x{} must be non-zero",
                config.window.width, config.window.height
            )));
        }
        Ok(config)
    }

    pub fn window_size(&self) -> PixelSize {
        PixelSize {
            width: self.window.width,
            height: self.window.height,
        }
    }
}

pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let data = read_to_string(path).map_err(|e| {
        Error::InvalidPath(format!("failed to read config '{}': {e}", path.display()))
    })?;
    EngineConfig::from_toml_str(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config_with_defaults() {
        let toml = r#"
            [window]
            width = 1280
            height = 720

            [resources]
            root = "assets"
            index = "scenes/index.json"
            initial_scene = "MainMenu"
        "#;
        let config = EngineConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.window.title, "Stagehand");
        assert_eq!(config.window_size(), PixelSize { width: 1280, height: 720 });
        assert_eq!(config.resources.initial_scene.as_deref(), Some("MainMenu"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn empty_config_is_all_defaults() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn zero_window_and_syntax_errors_are_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("[window]\nwidth = 0"),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[window"),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            load_config(Path::new("/definitely/not/here.toml")),
            Err(Error::InvalidPath(_))
        ));
    }
}
