//! # Garment Rendition Library
//!
//! Turns a garment photograph into presentation renditions: the background is
//! matted away, a soft drop shadow is composited beneath the cutout, and the
//! result is produced both on white and on a transparent canvas.
//!
//! ## Core Features
//!
//! - **Adapter traits**: matting and classification models sit behind
//!   [`BackgroundRemover`] and [`GarmentClassifier`], so tests and deployments
//!   can swap implementations
//! - **Shadow compositing**: deterministic, allocation-only image operations
//! - **Single matting call**: both renditions derive from one cutout
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rendition::{RenditionGenerator, ColorKeyRemover};
//!
//! let generator = RenditionGenerator::builder()
//!     .set_background_remover(ColorKeyRemover::default())
//!     .with_blur_radius(10.0)
//!     .with_shadow_offset(10, 10)
//!     .build();
//!
//! let photo = image::open("shirt.jpg")?.to_rgb8();
//! let renditions = generator.generate(&photo)?;
//! renditions.opaque.save("shirt_processed.jpg")?;
//! renditions.transparent.save("shirt_transparent.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod adapters;
pub mod compositor;
pub mod error;
pub mod generator;
pub mod traits;
pub mod types;

pub use adapters::*;
pub use compositor::{ShadowCompositor, flatten_onto_white, shadow_mask};
pub use error::{RenditionError, Result};
pub use generator::{RenditionGenerator, builder::RenditionGeneratorBuilder};
pub use traits::*;
pub use types::{Renditions, SourceImage};

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    #[test]
    fn test_source_image_from_bytes() {
        let img = RgbImage::from_pixel(8, 6, Rgb([12, 34, 56]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("Should encode png");

        let source = SourceImage::from_bytes(&bytes).expect("Should decode upload");
        assert_eq!(source.dimensions(), (8, 6));
        assert_eq!(*source.image.get_pixel(0, 0), Rgb([12, 34, 56]));
        assert!(source.path().is_none());
    }

    #[test]
    fn test_source_image_rejects_garbage() {
        let err = SourceImage::from_bytes(b"not an image").unwrap_err();
        assert!(matches!(err, RenditionError::ImageLoad(_)));
    }

    #[test]
    fn test_fixed_classifier() {
        let classifier = FixedClassifier::new("Short Sleeve");
        let source = SourceImage::new(RgbImage::new(1, 1));
        assert_eq!(classifier.classify(&source).expect("Should classify"), "Short Sleeve");
    }

    #[test]
    fn test_error_conversion() {
        use wardrobe_common::{ErrorKind, WardrobeError};

        let err: WardrobeError = RenditionError::Matting("oom".into()).into();
        assert_eq!(err.kind(), ErrorKind::Processing);
        assert!(err.to_string().contains("oom"));

        let err: WardrobeError = RenditionError::Io(std::io::Error::other("disk")).into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
