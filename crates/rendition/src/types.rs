use std::path::{Path, PathBuf};

use image::{RgbImage, RgbaImage};
use crate::error::Result;

/// A decoded upload, optionally backed by a file on disk
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub image: RgbImage,
    /// Location of the temporary copy, for adapters that work on files
    pub path: Option<PathBuf>,
}

impl SourceImage {
    pub fn new(image: RgbImage) -> Self {
        Self { image, path: None }
    }

    /// Decode raw upload bytes into an RGB buffer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?.to_rgb8();
        Ok(Self::new(image))
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Both renditions derived from one cutout
#[derive(Debug, Clone)]
pub struct Renditions {
    /// Shadowed cutout flattened onto white
    pub opaque: RgbImage,
    /// Shadowed cutout on a transparent canvas
    pub transparent: RgbaImage,
}
