use crate::core::color::srgb_to_linear;
use crate::error::{RenderError, Result};
use image::RgbaImage;
use log::info;
use nalgebra::{Vector3, Vector4};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

/// A 2D RGBA8 texture sampled with bilinear filtering.
///
/// Images are stored top row first; `v = 0` addresses the bottom row, the
/// usual OpenGL convention for vertically flipped loads.
#[derive(Debug, Clone)]
pub struct Texture {
    pub image: Arc<RgbaImage>,
    pub width: u32,
    pub height: u32,
    pub wrap: WrapMode,
}

impl Texture {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| RenderError::Texture {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();

        info!("Loaded texture: {:?} ({}x{})", path, image.width(), image.height());
        Ok(Self::from_image(image))
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            image: Arc::new(image),
            wrap: WrapMode::Repeat,
        }
    }

    /// A 1x1 texture of a single color, used when an asset is missing.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self::from_image(RgbaImage::from_pixel(1, 1, image::Rgba(rgba)))
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    /// Color lookup: RGB decoded to linear space.
    pub fn sample_color(&self, u: f32, v: f32) -> Vector3<f32> {
        srgb_to_linear(self.sample_raw(u, v).xyz())
    }

    /// Data lookup (normal and specular maps): raw channel values in [0, 1].
    pub fn sample_data(&self, u: f32, v: f32) -> Vector3<f32> {
        self.sample_raw(u, v).xyz()
    }

    /// Linear RGB with alpha left untouched.
    pub fn sample_rgba(&self, u: f32, v: f32) -> Vector4<f32> {
        let raw = self.sample_raw(u, v);
        let rgb = srgb_to_linear(raw.xyz());
        Vector4::new(rgb.x, rgb.y, rgb.z, raw.w)
    }

    fn sample_raw(&self, u: f32, v: f32) -> Vector4<f32> {
        let (u, v) = match self.wrap {
            WrapMode::Repeat => (u.rem_euclid(1.0), v.rem_euclid(1.0)),
            WrapMode::ClampToEdge => (u.clamp(0.0, 1.0), v.clamp(0.0, 1.0)),
        };

        // Texel centers sit at +0.5
        let x = u * self.width as f32 - 0.5;
        let y = (1.0 - v) * self.height as f32 - 0.5;

        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let wx = x - x.floor();
        let wy = y - y.floor();

        let c00 = self.texel(x0, y0);
        let c10 = self.texel(x0 + 1, y0);
        let c01 = self.texel(x0, y0 + 1);
        let c11 = self.texel(x0 + 1, y0 + 1);

        let top = c00 * (1.0 - wx) + c10 * wx;
        let bottom = c01 * (1.0 - wx) + c11 * wx;
        top * (1.0 - wy) + bottom * wy
    }

    fn texel(&self, x: i64, y: i64) -> Vector4<f32> {
        let w = self.width as i64;
        let h = self.height as i64;
        let (x, y) = match self.wrap {
            WrapMode::Repeat => (x.rem_euclid(w), y.rem_euclid(h)),
            WrapMode::ClampToEdge => (x.clamp(0, w - 1), y.clamp(0, h - 1)),
        };

        let p = self.image.get_pixel(x as u32, y as u32);
        Vector4::new(p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32) / 255.0
    }
}
