pub mod builder;

use image::{DynamicImage, RgbImage};
use tracing::debug;

use crate::{
    compositor::{flatten_onto_white, ShadowCompositor},
    error::{RenditionError, Result},
    traits::BackgroundRemover,
    types::Renditions,
};

/// Produces the opaque and transparent renditions of an upload from a single matting call
pub struct RenditionGenerator {
    remover: Box<dyn BackgroundRemover>,
    compositor: ShadowCompositor,
}

impl RenditionGenerator {
    /// Create a new generator builder
    pub fn builder() -> builder::RenditionGeneratorBuilder {
        builder::RenditionGeneratorBuilder::new()
    }

    pub fn new(remover: Box<dyn BackgroundRemover>, compositor: ShadowCompositor) -> Self {
        Self {
            remover,
            compositor,
        }
    }

    pub fn compositor(&self) -> &ShadowCompositor {
        &self.compositor
    }

    /// Matte the image once, then composite each variant on its own canvas
    pub fn generate(&self, image: &RgbImage) -> Result<Renditions> {
        let rgba = DynamicImage::ImageRgb8(image.clone()).to_rgba8();
        let cutout = self.remover.remove_background(&rgba)?;

        if cutout.dimensions() != image.dimensions() {
            return Err(RenditionError::DimensionMismatch {
                expected: image.dimensions(),
                actual: cutout.dimensions(),
            });
        }
        debug!(width = image.width(), height = image.height(), "cutout ready");

        let transparent = self.compositor.compose(&cutout);
        let opaque = flatten_onto_white(&self.compositor.compose(&cutout));

        Ok(Renditions { opaque, transparent })
    }

    /// Get information about the generator configuration
    pub fn info(&self) -> String {
        if self.compositor.enabled {
            format!(
                "RenditionGenerator: shadow blur {} offset ({}, {})",
                self.compositor.blur_radius, self.compositor.offset.x, self.compositor.offset.y
            )
        } else {
            "RenditionGenerator: shadow disabled".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ColorKeyRemover;
    use image::{Rgb, Rgba, RgbaImage};

    struct FailingRemover;

    impl BackgroundRemover for FailingRemover {
        fn remove_background(&self, _image: &RgbaImage) -> Result<RgbaImage> {
            Err(RenditionError::Matting("model unavailable".to_string()))
        }
    }

    struct ShrinkingRemover;

    impl BackgroundRemover for ShrinkingRemover {
        fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage> {
            Ok(RgbaImage::new(image.width() / 2, image.height() / 2))
        }
    }

    fn create_test_photo() -> RgbImage {
        let mut img = RgbImage::from_pixel(60, 60, Rgb([255, 255, 255]));
        for y in 10..40 {
            for x in 15..35 {
                img.put_pixel(x, y, Rgb([20, 30, 160]));
            }
        }
        img
    }

    #[test]
    fn test_generate_both_variants() {
        let generator = RenditionGenerator::builder()
            .set_background_remover(ColorKeyRemover::default())
            .build();
        let renditions = generator.generate(&create_test_photo()).expect("Should generate renditions");

        assert_eq!(renditions.opaque.dimensions(), (60, 60));
        assert_eq!(renditions.transparent.dimensions(), (60, 60));

        // Subject survives in both
        assert_eq!(*renditions.transparent.get_pixel(20, 20), Rgba([20, 30, 160, 255]));
        assert_eq!(*renditions.opaque.get_pixel(20, 20), Rgb([20, 30, 160]));

        // Background is cleared in the transparent variant and white in the opaque one
        assert_eq!(renditions.transparent.get_pixel(2, 2)[3], 0);
        assert_eq!(*renditions.opaque.get_pixel(2, 2), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_opaque_is_flattened_transparent() {
        let generator = RenditionGenerator::builder().build();
        let renditions = generator.generate(&create_test_photo()).expect("Should generate renditions");
        assert_eq!(renditions.opaque, flatten_onto_white(&renditions.transparent));
    }

    #[test]
    fn test_matting_failure_fails_generation() {
        let generator = RenditionGenerator::builder()
            .set_background_remover(FailingRemover)
            .build();
        let err = generator.generate(&create_test_photo()).unwrap_err();
        assert!(matches!(err, RenditionError::Matting(_)));
    }

    #[test]
    fn test_cutout_size_must_match() {
        let generator = RenditionGenerator::builder()
            .set_background_remover(ShrinkingRemover)
            .build();
        let err = generator.generate(&create_test_photo()).unwrap_err();
        assert!(matches!(err, RenditionError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_generator_info() {
        let generator = RenditionGenerator::builder().without_shadow().build();
        assert_eq!(generator.info(), "RenditionGenerator: shadow disabled");
    }
}
