//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`VOLRAY_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;
use volray_core::{CompositingMode, IsoSurface, RaycastParams};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Window configuration
    #[serde(default)]
    pub window: WindowConfig,
    /// Volume file configuration
    #[serde(default)]
    pub volume: VolumeConfig,
    /// Camera configuration
    #[serde(default)]
    pub camera: CameraConfig,
    /// Input configuration
    #[serde(default)]
    pub input: InputConfig,
    /// Rendering configuration
    #[serde(default)]
    pub rendering: RenderingConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`VOLRAY_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // VOLRAY_WINDOW__TITLE=Test -> window.title = "Test"
        figment = figment.merge(Env::prefixed("VOLRAY_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Enable VSync
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Volray - Volume Viewer".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

/// Volume file configuration
///
/// The raw format carries no header, so the grid shape must be known
/// externally and is configured here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeConfig {
    /// Optional volume to load at startup; files can also be dropped
    /// onto the window
    pub path: Option<String>,
    /// Grid width in voxels
    pub width: u32,
    /// Grid height in voxels
    pub height: u32,
    /// Grid depth in voxels
    pub depth: u32,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            path: None,
            width: 256,
            height: 256,
            depth: 256,
        }
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Starting orbit distance from the volume center
    pub initial_radius: f32,
    /// Closest allowed orbit distance (kept outside the bounding box)
    pub min_radius: f32,
    /// Farthest allowed orbit distance
    pub max_radius: f32,
    /// Field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_radius: 1.5,
            min_radius: 1.0,
            max_radius: 10.0,
            fov: 75.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Orbit sensitivity (radians per pixel of mouse movement)
    pub orbit_sensitivity: f32,
    /// Zoom speed (distance per scroll line)
    pub zoom_speed: f32,
    /// Step applied to iso value / alpha keys
    pub parameter_step: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            orbit_sensitivity: 0.005,
            zoom_speed: 0.1,
            parameter_step: 0.02,
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderingConfig {
    /// Number of raymarching steps per ray
    pub step_count: u32,
    /// Background color [r, g, b, a]
    pub background_color: [f32; 4],
    /// Initial primary iso-surface threshold
    pub iso_value_1: f32,
    /// Initial primary iso-surface opacity
    pub iso_alpha_1: f32,
    /// Initial primary iso-surface color
    pub iso_color_1: [f32; 3],
    /// Initial secondary iso-surface threshold
    pub iso_value_2: f32,
    /// Initial secondary iso-surface opacity
    pub iso_alpha_2: f32,
    /// Initial secondary iso-surface color
    pub iso_color_2: [f32; 3],
}

impl Default for RenderingConfig {
    fn default() -> Self {
        let params = RaycastParams::default();
        Self {
            step_count: volray_core::raycast::DEFAULT_STEP_COUNT as u32,
            background_color: [0.02, 0.02, 0.08, 1.0],
            iso_value_1: params.iso[0].value,
            iso_alpha_1: params.iso[0].alpha,
            iso_color_1: params.iso[0].color,
            iso_value_2: params.iso[1].value,
            iso_alpha_2: params.iso[1].alpha,
            iso_color_2: params.iso[1].color,
        }
    }
}

impl RenderingConfig {
    /// Build the initial parameter state
    pub fn to_params(&self) -> RaycastParams {
        RaycastParams {
            mode: CompositingMode::Mip,
            iso: [
                IsoSurface::new(self.iso_value_1, self.iso_alpha_1, self.iso_color_1),
                IsoSurface::new(self.iso_value_2, self.iso_alpha_2, self.iso_color_2),
            ],
            second_iso_enabled: false,
            shading_enabled: false,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.volume.width, 256);
        assert_eq!(config.rendering.step_count, 256);
    }

    #[test]
    fn test_to_params_uses_configured_surfaces() {
        let mut rendering = RenderingConfig::default();
        rendering.iso_value_1 = 0.6;
        rendering.iso_color_2 = [0.1, 0.2, 0.3];
        let params = rendering.to_params();
        assert_eq!(params.iso[0].value, 0.6);
        assert_eq!(params.iso[1].color, [0.1, 0.2, 0.3]);
        assert_eq!(params.mode, CompositingMode::Mip);
    }
}
