//! Renderer configuration, stored as RON

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::RenderError;
use crate::rasterizer::{Color, CullMode, RasterMode, RasterSettings, MAX_SCREEN_SIZE};

/// Error type for configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("Invalid config: {0}")]
    Invalid(#[from] RenderError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// Field of view exponent
    pub fov: u32,
    pub raster_mode: RasterMode,
    pub cull_mode: CullMode,
    pub clear_color: Color,
    pub max_stack_depth: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 896,
            height: 504,
            fov: 9,
            raster_mode: RasterMode::Textured,
            cull_mode: CullMode::Back,
            clear_color: Color::BLACK,
            max_stack_depth: 64,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_SCREEN_SIZE).contains(&self.width) || !(1..=MAX_SCREEN_SIZE).contains(&self.height) {
            return Err(RenderError::InvalidResolution {
                width: self.width,
                height: self.height,
            }
            .into());
        }
        if !RasterSettings::fov_is_valid(self.fov) {
            return Err(RenderError::InvalidFov(self.fov).into());
        }
        if self.max_stack_depth == 0 {
            return Err(RenderError::InvalidStackDepth.into());
        }
        Ok(())
    }

    /// Raster settings described by this config
    pub fn raster_settings(&self) -> RasterSettings {
        RasterSettings {
            fov: self.fov,
            raster_mode: self.raster_mode,
            cull_mode: self.cull_mode,
            texture_override: None,
        }
    }
}

/// Load and validate a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RenderConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Save a config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &RenderConfig, path: P) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new().indentor("  ".to_string());
    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

pub fn load_config_from_str(s: &str) -> Result<RenderConfig, ConfigError> {
    let config: RenderConfig = ron::from_str(s)?;
    config.validate()?;
    Ok(config)
}
