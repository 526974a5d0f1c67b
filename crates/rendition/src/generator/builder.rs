use wardrobe_common::Offset;

use crate::{
    adapters::ColorKeyRemover,
    compositor::ShadowCompositor,
    generator::RenditionGenerator,
    traits::BackgroundRemover,
};

/// Builder for rendition generators with a fluent API
pub struct RenditionGeneratorBuilder {
    remover: Option<Box<dyn BackgroundRemover>>,
    compositor: ShadowCompositor,
}

impl RenditionGeneratorBuilder {
    pub fn new() -> Self {
        Self {
            remover: None,
            compositor: ShadowCompositor::default(),
        }
    }

    /// Set the matting adapter (replaces any existing one)
    pub fn set_background_remover<R>(mut self, remover: R) -> Self
    where
        R: BackgroundRemover + 'static,
    {
        self.remover = Some(Box::new(remover));
        self
    }

    /// Set an already boxed matting adapter
    pub fn set_boxed_background_remover(mut self, remover: Box<dyn BackgroundRemover>) -> Self {
        self.remover = Some(remover);
        self
    }

    pub fn with_compositor(mut self, compositor: ShadowCompositor) -> Self {
        self.compositor = compositor;
        self
    }

    pub fn with_blur_radius(mut self, blur_radius: f32) -> Self {
        self.compositor.blur_radius = blur_radius;
        self
    }

    pub fn with_shadow_offset(mut self, x: i32, y: i32) -> Self {
        self.compositor.offset = Offset::new(x, y);
        self
    }

    pub fn without_shadow(mut self) -> Self {
        self.compositor.enabled = false;
        self
    }

    /// Build the generator, keying out a white background if no matting adapter was set
    pub fn build(self) -> RenditionGenerator {
        let remover = self
            .remover
            .unwrap_or_else(|| Box::new(ColorKeyRemover::default()));

        RenditionGenerator::new(remover, self.compositor)
    }
}

impl Default for RenditionGeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
