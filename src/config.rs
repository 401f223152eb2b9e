//! Session configuration: defaults overlaid with `CROPPER_*` environment
//! variables.

use crate::clamp::{CropConstraints, DEFAULT_MIN_CROP_SIZE};
use crate::export::{
    DEFAULT_BACKGROUND, DEFAULT_JPEG_QUALITY, DEFAULT_OUTPUT_HEIGHT, DEFAULT_OUTPUT_WIDTH,
    ExportSettings,
};

pub const ENV_ASPECT_RATIO: &str = "CROPPER_ASPECT_RATIO";
pub const ENV_OUTPUT_WIDTH: &str = "CROPPER_OUTPUT_WIDTH";
pub const ENV_OUTPUT_HEIGHT: &str = "CROPPER_OUTPUT_HEIGHT";
pub const ENV_MIN_CROP_SIZE: &str = "CROPPER_MIN_CROP_SIZE";
pub const ENV_JPEG_QUALITY: &str = "CROPPER_JPEG_QUALITY";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{key}: '{value}' is not a valid number")]
    InvalidNumber { key: &'static str, value: String },

    #[error("'{0}' is not an aspect ratio (use free, W:H or a positive number)")]
    InvalidAspect(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CropperConfig {
    /// Locked width / height; `None` is free-form.
    pub aspect_ratio: Option<f32>,
    pub output_width: u32,
    pub output_height: u32,
    pub min_crop_size: f32,
    pub background: [u8; 3],
    pub jpeg_quality: u8,
}

impl Default for CropperConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: Some(1.0),
            output_width: DEFAULT_OUTPUT_WIDTH,
            output_height: DEFAULT_OUTPUT_HEIGHT,
            min_crop_size: DEFAULT_MIN_CROP_SIZE,
            background: DEFAULT_BACKGROUND,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl CropperConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key/value source, e.g. a map in tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_ASPECT_RATIO) {
            config.aspect_ratio = parse_aspect_ratio(&value)?;
        }
        if let Some(value) = lookup(ENV_OUTPUT_WIDTH) {
            config.output_width = parse_number(ENV_OUTPUT_WIDTH, &value)?;
        }
        if let Some(value) = lookup(ENV_OUTPUT_HEIGHT) {
            config.output_height = parse_number(ENV_OUTPUT_HEIGHT, &value)?;
        }
        if let Some(value) = lookup(ENV_MIN_CROP_SIZE) {
            config.min_crop_size = parse_length(ENV_MIN_CROP_SIZE, &value)?;
        }
        if let Some(value) = lookup(ENV_JPEG_QUALITY) {
            config.jpeg_quality = parse_number(ENV_JPEG_QUALITY, &value)?;
        }

        Ok(config)
    }

    pub fn constraints(&self) -> CropConstraints {
        CropConstraints::new(self.aspect_ratio, self.min_crop_size)
    }

    /// Export settings for the currently selected aspect ratio.
    pub fn export_settings(&self, aspect_ratio: Option<f32>) -> ExportSettings {
        ExportSettings {
            output_width: self.output_width,
            output_height: self.output_height,
            aspect_ratio,
            background: self.background,
            jpeg_quality: self.jpeg_quality,
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: value.to_string(),
    })
}

/// A finite, non-negative screen length.
fn parse_length(key: &'static str, value: &str) -> Result<f32, ConfigError> {
    let length: f32 = parse_number(key, value)?;
    if length.is_finite() && length >= 0.0 {
        Ok(length)
    } else {
        Err(ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        })
    }
}

/// Parses `free`, `W:H` or a plain number into a width / height ratio.
pub fn parse_aspect_ratio(value: &str) -> Result<Option<f32>, ConfigError> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("free") || value.is_empty() {
        return Ok(None);
    }

    let invalid = || ConfigError::InvalidAspect(value.to_string());
    let ratio = match value.split_once(':') {
        Some((w, h)) => {
            let w: f32 = w.trim().parse().map_err(|_| invalid())?;
            let h: f32 = h.trim().parse().map_err(|_| invalid())?;
            w / h
        }
        None => value.parse::<f32>().map_err(|_| invalid())?,
    };

    if ratio.is_finite() && ratio > 0.0 {
        Ok(Some(ratio))
    } else {
        Err(invalid())
    }
}
