use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rendition::{
    BackgroundRemover, ColorKeyRemover, CommandBackgroundRemover, CommandClassifier, FixedClassifier,
    GarmentClassifier, RenditionGenerator, ShadowCompositor,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wardrobe::Wardrobe;
use wardrobe_common::Offset;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Invalid value for '{field}': {message}")]
    Invalid { field: &'static str, message: String },
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Drop-shadow settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct ShadowConfig {
    pub enabled: bool,
    pub blur_radius: f32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        let compositor = ShadowCompositor::default();
        Self {
            enabled: compositor.enabled,
            blur_radius: compositor.blur_radius,
            offset_x: compositor.offset.x,
            offset_y: compositor.offset.y,
        }
    }
}

impl ShadowConfig {
    pub fn compositor(&self) -> ShadowCompositor {
        ShadowCompositor::new(self.blur_radius, Offset::new(self.offset_x, self.offset_y), self.enabled)
    }
}

/// Which matting adapter removes the background
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MattingConfig {
    /// Key out a plain backdrop colour
    ColorKey {
        #[serde(default = "default_key")]
        key: [u8; 3],
        #[serde(default = "default_tolerance")]
        tolerance: u8,
    },
    /// External matting program
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl Default for MattingConfig {
    fn default() -> Self {
        Self::ColorKey {
            key: default_key(),
            tolerance: default_tolerance(),
        }
    }
}

impl MattingConfig {
    pub fn build(&self) -> Box<dyn BackgroundRemover> {
        match self {
            Self::ColorKey { key, tolerance } => Box::new(ColorKeyRemover {
                key: *key,
                tolerance: *tolerance,
            }),
            Self::Command { program, args } => Box::new(CommandBackgroundRemover::new(program, args.clone())),
        }
    }
}

/// Which classifier names the garment category
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifierConfig {
    /// Always report the same label
    Fixed { label: String },
    /// External classification program printing the label on stdout
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::Fixed {
            label: "shortsleeve".to_string(),
        }
    }
}

impl ClassifierConfig {
    pub fn build(&self) -> Arc<dyn GarmentClassifier> {
        match self {
            Self::Fixed { label } => Arc::new(FixedClassifier::new(label)),
            Self::Command { program, args } => Arc::new(CommandClassifier::new(program, args.clone())),
        }
    }
}

fn default_key() -> [u8; 3] {
    ColorKeyRemover::default().key
}

fn default_tolerance() -> u8 {
    ColorKeyRemover::default().tolerance
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_jpeg_quality() -> u8 {
    75
}

/// Wardrobe configuration file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct WardrobeConfig {
    /// Store root, served as `/static/`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_jpeg_quality")]
    #[schemars(range(min = 1, max = 100))]
    pub jpeg_quality: u8,
    #[serde(default)]
    pub shadow: ShadowConfig,
    #[serde(default)]
    pub matting: MattingConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl Default for WardrobeConfig {
    fn default() -> Self {
        Self {
            static_dir: default_static_dir(),
            jpeg_quality: default_jpeg_quality(),
            shadow: ShadowConfig::default(),
            matting: MattingConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl WardrobeConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: WardrobeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: WardrobeConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(ConfigError::UnsupportedFileFormat),
        }
    }

    /// Convert configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Convert configuration to a JSON string
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(WardrobeConfig)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid {
                field: "jpeg_quality",
                message: format!("{} is outside 1..=100", self.jpeg_quality),
            });
        }
        if !self.shadow.blur_radius.is_finite() {
            return Err(ConfigError::Invalid {
                field: "shadow.blur_radius",
                message: "must be a finite number".to_string(),
            });
        }
        if matches!(&self.matting, MattingConfig::Command { program, .. } if program.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "matting.program",
                message: "must not be empty".to_string(),
            });
        }
        match &self.classifier {
            ClassifierConfig::Command { program, .. } if program.trim().is_empty() => Err(ConfigError::Invalid {
                field: "classifier.program",
                message: "must not be empty".to_string(),
            }),
            ClassifierConfig::Fixed { label } if label.trim().is_empty() => Err(ConfigError::Invalid {
                field: "classifier.label",
                message: "must not be empty".to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub fn generator(&self) -> RenditionGenerator {
        RenditionGenerator::builder()
            .set_boxed_background_remover(self.matting.build())
            .with_compositor(self.shadow.compositor())
            .build()
    }

    /// Assemble the service described by this configuration
    pub fn build_wardrobe(&self) -> Wardrobe {
        Wardrobe::new(&self.static_dir, self.generator(), self.classifier.build())
            .with_jpeg_quality(self.jpeg_quality)
    }
}
