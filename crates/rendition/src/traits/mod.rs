use image::RgbaImage;
use crate::{error::Result, types::SourceImage};

/// Trait for background matting models
pub trait BackgroundRemover: Send + Sync {
    /// Return an RGBA cutout of the same size whose alpha marks the subject
    fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage>;
}

/// Trait for garment classification models
pub trait GarmentClassifier: Send + Sync {
    /// Return the raw category label predicted for the image
    fn classify(&self, image: &SourceImage) -> Result<String>;
}
