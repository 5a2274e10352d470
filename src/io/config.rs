use crate::error::{RenderError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub paths: PathConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    // --- Offscreen target ---
    /// Samples per pixel of the scene target; must be a perfect square.
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Internal resolution relative to the window's pixel size.
    #[serde(default = "default_resolution_scale")]
    pub resolution_scale: f32,
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 3],

    // --- Presentation ---
    #[serde(default = "default_exposure")]
    pub exposure: f32,
    #[serde(default = "default_false")]
    pub use_aces: bool,

    // --- Materials ---
    #[serde(default = "default_shininess")]
    pub shininess: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            resolution_scale: default_resolution_scale(),
            clear_color: default_clear_color(),
            exposure: default_exposure(),
            use_aces: false,
            shininess: default_shininess(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    #[serde(default = "default_zoom")]
    pub zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            sensitivity: default_sensitivity(),
            zoom: default_zoom(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathConfig {
    /// Root holding `objects/` and `textures/`.
    #[serde(default = "default_resources")]
    pub resources: PathBuf,
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    #[serde(default = "default_screenshots")]
    pub screenshots: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            resources: default_resources(),
            state_file: default_state_file(),
            screenshots: default_screenshots(),
        }
    }
}

fn default_width() -> usize {
    1280
}
fn default_height() -> usize {
    720
}
fn default_title() -> String {
    "roomlight".to_string()
}
fn default_samples() -> usize {
    4
}
fn default_resolution_scale() -> f32 {
    1.0
}
fn default_clear_color() -> [f32; 3] {
    [0.05, 0.05, 0.05]
}
fn default_exposure() -> f32 {
    1.0
}
fn default_false() -> bool {
    false
}
fn default_shininess() -> f32 {
    128.0
}
fn default_speed() -> f32 {
    crate::scene::camera::SPEED
}
fn default_sensitivity() -> f32 {
    crate::scene::camera::SENSITIVITY
}
fn default_zoom() -> f32 {
    crate::scene::camera::ZOOM
}
fn default_resources() -> PathBuf {
    PathBuf::from("resources")
}
fn default_state_file() -> PathBuf {
    PathBuf::from("resources/program_state.txt")
}
fn default_screenshots() -> PathBuf {
    PathBuf::from("screenshots")
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| RenderError::Config {
            path: path.to_path_buf(),
            message: format!("failed to read config file: {e}"),
        })?;
        Self::from_toml(&content).map_err(|message| RenderError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("failed to parse TOML: {e}"))
    }

    /// Offscreen target size for a window of `width` x `height` pixels.
    pub fn render_size(&self, width: usize, height: usize) -> (usize, usize) {
        let scale = self.render.resolution_scale.max(0.05);
        (
            ((width as f32 * scale).round() as usize).max(1),
            ((height as f32 * scale).round() as usize).max(1),
        )
    }
}
