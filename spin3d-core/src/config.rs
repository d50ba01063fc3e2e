/// Viewer configuration, read from TOML
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub frame: FrameConfig,
    pub log: LogConfig,
    pub panel: PanelConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub fov_degrees: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    pub target_fps: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `env_logger` filter, overridden by `RUST_LOG`
    pub level: String,
    /// Where the terminal frontend writes its log; stderr would garble the screen
    pub file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    pub visible: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 10.0],
            fov_degrees: 75.0,
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { target_fps: 30 }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: Some("spin3d.log".to_string()),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self { visible: true }
    }
}

impl ViewerConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.frame.target_fps == 0 || self.frame.target_fps > 240 {
            return Err(ConfigError::Invalid(format!(
                "frame.target_fps must be in 1..=240, got {}",
                self.frame.target_fps
            )));
        }
        let fov = self.camera.fov_degrees;
        if !(1.0..=179.0).contains(&fov) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov_degrees must be in 1..=179, got {fov}"
            )));
        }
        if self.camera.position.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::Invalid("camera.position must be finite".into()));
        }
        Ok(())
    }
}
