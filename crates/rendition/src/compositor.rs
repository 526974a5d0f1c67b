use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use wardrobe_common::Offset;

/// Grey level every subject pixel takes in the shadow mask
pub const SHADOW_INTENSITY: u8 = 80;

pub const DEFAULT_BLUR_RADIUS: f32 = 10.0;

pub const DEFAULT_SHADOW_OFFSET: Offset = Offset { x: 10, y: 10 };

/// Drop-shadow compositor for matted cutouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShadowCompositor {
    /// Standard deviation of the gaussian applied to the shadow mask
    pub blur_radius: f32,
    pub offset: Offset,
    pub enabled: bool,
}

impl Default for ShadowCompositor {
    fn default() -> Self {
        Self {
            blur_radius: DEFAULT_BLUR_RADIUS,
            offset: DEFAULT_SHADOW_OFFSET,
            enabled: true,
        }
    }
}

impl ShadowCompositor {
    pub fn new(blur_radius: f32, offset: Offset, enabled: bool) -> Self {
        Self {
            blur_radius,
            offset,
            enabled,
        }
    }

    /// Composite a blurred, offset shadow beneath the cutout on a transparent canvas.
    ///
    /// With the shadow disabled the cutout is returned unchanged.
    pub fn compose(&self, cutout: &RgbaImage) -> RgbaImage {
        if !self.enabled {
            return cutout.clone();
        }

        let shadow = self.shadow_layer(cutout);
        let (width, height) = cutout.dimensions();
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));

        paste_masked(&mut canvas, &shadow, self.offset);
        paste_masked(&mut canvas, cutout, Offset::default());
        canvas
    }

    /// Blurred shadow mask replicated into all four channels
    pub fn shadow_layer(&self, cutout: &RgbaImage) -> RgbaImage {
        let mask = shadow_mask(cutout);
        let blurred = if self.blur_radius > 0.0 {
            imageproc::filter::gaussian_blur_f32(&mask, self.blur_radius)
        } else {
            mask
        };

        RgbaImage::from_fn(blurred.width(), blurred.height(), |x, y| {
            let v = blurred.get_pixel(x, y)[0];
            Rgba([v, v, v, v])
        })
    }
}

/// Threshold the cutout alpha: any visible pixel becomes [`SHADOW_INTENSITY`], the rest 0
pub fn shadow_mask(cutout: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(cutout.width(), cutout.height(), |x, y| {
        if cutout.get_pixel(x, y)[3] > 0 {
            Luma([SHADOW_INTENSITY])
        } else {
            Luma([0])
        }
    })
}

/// Flatten an RGBA composite onto a solid white canvas using its alpha as mask
pub fn flatten_onto_white(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let px = image.get_pixel(x, y);
        let a = px[3];
        Rgb([
            blend(255, px[0], a),
            blend(255, px[1], a),
            blend(255, px[2], a),
        ])
    })
}

/// Paste `layer` at `at`, using the layer's own alpha as the mask.
///
/// Every channel, alpha included, is interpolated between the canvas and the
/// layer. Pixels falling outside the canvas are clipped.
pub fn paste_masked(canvas: &mut RgbaImage, layer: &RgbaImage, at: Offset) {
    let (width, height) = canvas.dimensions();

    for (x, y, px) in layer.enumerate_pixels() {
        let cx = i64::from(x) + i64::from(at.x);
        let cy = i64::from(y) + i64::from(at.y);
        if cx < 0 || cy < 0 || cx >= i64::from(width) || cy >= i64::from(height) {
            continue;
        }

        let mask = px[3];
        if mask == 0 {
            continue;
        }

        let dst = canvas.get_pixel_mut(cx as u32, cy as u32);
        for c in 0..4 {
            dst[c] = blend(dst[c], px[c], mask);
        }
    }
}

/// `(src * mask + dst * (255 - mask)) / 255`, rounded
#[inline]
pub fn blend(dst: u8, src: u8, mask: u8) -> u8 {
    let m = u32::from(mask);
    let tmp = u32::from(src) * m + u32::from(dst) * (255 - m) + 128;
    ((tmp + (tmp >> 8)) >> 8) as u8
}
