use thiserror::Error;
use wardrobe_common::WardrobeError;

#[derive(Error, Debug)]
pub enum RenditionError {
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Background removal failed: {0}")]
    Matting(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Cutout is {actual:?} but the source image is {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RenditionError> for WardrobeError {
    fn from(err: RenditionError) -> Self {
        match err {
            RenditionError::Io(e) => WardrobeError::Io(e),
            other => WardrobeError::Processing(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RenditionError>;
