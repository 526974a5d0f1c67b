use image::{Rgba, RgbaImage};
use crate::{error::Result, traits::BackgroundRemover};

/// Keys out pixels close to a backdrop colour, for studio shots on a plain background
#[derive(Debug, Clone)]
pub struct ColorKeyRemover {
    pub key: [u8; 3],
    /// Largest per-channel distance still treated as backdrop
    pub tolerance: u8,
}

impl Default for ColorKeyRemover {
    fn default() -> Self {
        Self {
            key: [255, 255, 255],
            tolerance: 16,
        }
    }
}

impl BackgroundRemover for ColorKeyRemover {
    fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage> {
        Ok(RgbaImage::from_fn(image.width(), image.height(), |x, y| {
            let px = image.get_pixel(x, y);
            let is_backdrop = (0..3).all(|c| px[c].abs_diff(self.key[c]) <= self.tolerance);
            if is_backdrop {
                Rgba([px[0], px[1], px[2], 0])
            } else {
                *px
            }
        }))
    }
}
