//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`FIXELVIEW_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;

use fixelview_core::ColourType;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    /// Fixel field source and display
    #[serde(default)]
    pub fixel: FixelConfig,
    /// Fixel tool settings at startup
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub rendering: RenderingConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`FIXELVIEW_*`)
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

        // FIXELVIEW_TOOL__LINE_OPACITY=0.5 -> tool.line_opacity = 0.5
        figment = figment.merge(Env::prefixed("FIXELVIEW_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Start in fullscreen mode
    pub fullscreen: bool,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Fixelview".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
        }
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Distance from the volume centre; fitted to the volume when unset
    pub distance: Option<f32>,
    /// Orbit step per arrow key press, in degrees
    pub orbit_step: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near: 0.1,
            far: 2000.0,
            distance: None,
            orbit_step: 5.0,
        }
    }
}

/// Fixel field configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixelConfig {
    /// RON volume to load; a synthetic phantom is used when unset
    pub volume: Option<String>,
    /// Phantom dimensions in voxels
    pub phantom_dims: [usize; 3],
    /// Phantom voxel size in mm
    pub phantom_voxel_size: [f32; 3],
    pub colour_type: ColourType,
    /// Colour map name, matched case-insensitively
    pub colourmap: String,
    /// Constant colour for the `Colour` colour type
    pub colour: [f32; 3],
    pub line_length_multiplier: f32,
    pub scale_line_length_by_value: bool,
    pub discard_lower: bool,
    pub discard_upper: bool,
    pub invert_scale: bool,
}

impl Default for FixelConfig {
    fn default() -> Self {
        Self {
            volume: None,
            phantom_dims: [24, 24, 12],
            phantom_voxel_size: [2.0, 2.0, 2.0],
            colour_type: ColourType::Value,
            colourmap: "Hot".to_string(),
            colour: [1.0, 1.0, 1.0],
            line_length_multiplier: 1.0,
            scale_line_length_by_value: false,
            discard_lower: false,
            discard_upper: false,
            invert_scale: false,
        }
    }
}

/// Fixel tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Draw only the current slice
    pub crop_to_slice: bool,
    /// Line opacity; below 1.0 lines blend additively
    pub line_opacity: f32,
    /// Line thickness in pixels
    pub line_thickness: f32,
    /// Slice axis (0 = x, 1 = y, 2 = z)
    pub axis: usize,
    /// Slice index; the middle slice when unset
    pub slice: Option<usize>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            crop_to_slice: true,
            line_opacity: 1.0,
            line_thickness: 1.0,
            axis: 2,
            slice: None,
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// Background color [r, g, b, a]
    pub background_color: [f32; 4],
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            background_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
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
