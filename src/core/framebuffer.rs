use crate::core::color::to_rgba8;
use crate::error::{RenderError, Result};
use nalgebra::Vector4;

/// Upper bound on samples per pixel, mirroring typical hardware limits.
pub const MAX_SAMPLES: usize = 16;

/// A render target with color and depth attachments.
///
/// A stencil plane is allocated and cleared alongside them so completeness
/// covers all three, but no draw state reads or writes it.
///
/// Multisampling is realized as a supersample grid: a target with `samples = s*s`
/// stores `s x s` subsamples per pixel, laid out as a `width*s` by `height*s`
/// buffer. Resolve averages each pixel's grid.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    /// Samples per pixel (a perfect square).
    pub samples: usize,
    /// Subsamples along one axis: `sqrt(samples)`.
    pub grid: usize,
    pub buffer_width: usize,
    pub buffer_height: usize,

    pub color: Vec<Vector4<f32>>,
    pub depth: Vec<f32>,
    pub stencil: Vec<u8>,
}

impl FrameBuffer {
    /// Allocates all attachments and verifies the result is complete.
    pub fn new(width: usize, height: usize, samples: usize) -> Result<Self> {
        let grid = sample_grid(samples)?;
        if width == 0 || height == 0 {
            return Err(RenderError::FramebufferIncomplete {
                reason: format!("zero-sized attachment ({width}x{height})"),
            });
        }

        let buffer_width = width * grid;
        let buffer_height = height * grid;
        let size = buffer_width * buffer_height;

        let framebuffer = Self {
            width,
            height,
            samples,
            grid,
            buffer_width,
            buffer_height,
            color: vec![Vector4::new(0.0, 0.0, 0.0, 1.0); size],
            depth: vec![f32::INFINITY; size],
            stencil: vec![0; size],
        };
        framebuffer.check_complete()?;
        Ok(framebuffer)
    }

    /// Completeness check: every attachment exists and agrees on size and sample count.
    pub fn check_complete(&self) -> Result<()> {
        let expected = self.buffer_width * self.buffer_height;
        if expected == 0 {
            return Err(RenderError::FramebufferIncomplete {
                reason: "no storage allocated".to_string(),
            });
        }
        if self.grid * self.grid != self.samples {
            return Err(RenderError::FramebufferIncomplete {
                reason: format!("sample grid {} does not match {} samples", self.grid, self.samples),
            });
        }
        for (name, len) in [
            ("color", self.color.len()),
            ("depth", self.depth.len()),
            ("stencil", self.stencil.len()),
        ] {
            if len != expected {
                return Err(RenderError::FramebufferIncomplete {
                    reason: format!("{name} attachment holds {len} samples, expected {expected}"),
                });
            }
        }
        Ok(())
    }

    pub fn clear(&mut self, color: Vector4<f32>, depth: f32, stencil: u8) {
        self.color.fill(color);
        self.depth.fill(depth);
        self.stencil.fill(stencil);
    }

    /// Clears only the color attachment.
    pub fn clear_color(&mut self, color: Vector4<f32>) {
        self.color.fill(color);
    }

    /// Mutable color and depth storage for the sample rows `start_y..=end_y`.
    pub fn rows_mut(&mut self, start_y: usize, end_y: usize) -> (&mut [Vector4<f32>], &mut [f32]) {
        let w = self.buffer_width;
        let range = start_y * w..(end_y + 1) * w;
        (&mut self.color[range.clone()], &mut self.depth[range])
    }

    #[inline]
    pub fn sample(&self, x: usize, y: usize) -> Vector4<f32> {
        self.color[y * self.buffer_width + x]
    }

    /// Average of every sample belonging to pixel `(x, y)`.
    pub fn resolve_pixel(&self, x: usize, y: usize) -> Vector4<f32> {
        if self.grid == 1 {
            return self.sample(x, y);
        }

        let start_x = x * self.grid;
        let start_y = y * self.grid;
        let mut sum = Vector4::zeros();
        for dy in 0..self.grid {
            for dx in 0..self.grid {
                sum += self.sample(start_x + dx, start_y + dy);
            }
        }
        sum / self.samples as f32
    }

    /// Resolved texel lookup with nearest filtering. `v = 1` is the top row.
    pub fn resolve_at_uv(&self, u: f32, v: f32) -> Vector4<f32> {
        let x = ((u * self.width as f32) as isize).clamp(0, self.width as isize - 1) as usize;
        let y = (((1.0 - v) * self.height as f32) as isize).clamp(0, self.height as isize - 1)
            as usize;
        self.resolve_pixel(x, y)
    }

    /// Resolved image as tightly packed RGBA8, top row first.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width * self.height * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                out.extend_from_slice(&to_rgba8(self.resolve_pixel(x, y)));
            }
        }
        out
    }
}

fn sample_grid(samples: usize) -> Result<usize> {
    if samples == 0 || samples > MAX_SAMPLES {
        return Err(RenderError::FramebufferIncomplete {
            reason: format!("unsupported sample count {samples} (1..={MAX_SAMPLES})"),
        });
    }
    let grid = (samples as f64).sqrt().round() as usize;
    if grid * grid != samples {
        return Err(RenderError::FramebufferIncomplete {
            reason: format!("sample count {samples} is not a square grid"),
        });
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_size_is_incomplete() {
        let err = FrameBuffer::new(0, 720, 4).unwrap_err();
        assert!(matches!(err, RenderError::FramebufferIncomplete { .. }));
    }

    #[test]
    fn non_square_sample_count_is_incomplete() {
        assert!(FrameBuffer::new(8, 8, 2).is_err());
        assert!(FrameBuffer::new(8, 8, 0).is_err());
        assert!(FrameBuffer::new(8, 8, 25).is_err());
    }

    #[test]
    fn four_samples_use_two_by_two_grid() {
        let fb = FrameBuffer::new(3, 2, 4).unwrap();
        assert_eq!(fb.grid, 2);
        assert_eq!((fb.buffer_width, fb.buffer_height), (6, 4));
        assert_eq!(fb.stencil.len(), 24);
        fb.check_complete().unwrap();
    }

    #[test]
    fn missing_attachment_storage_is_detected() {
        let mut fb = FrameBuffer::new(2, 2, 1).unwrap();
        fb.stencil.clear();
        assert!(fb.check_complete().is_err());
    }

    #[test]
    fn resolve_averages_samples() {
        let mut fb = FrameBuffer::new(1, 1, 4).unwrap();
        fb.clear(Vector4::new(0.0, 0.0, 0.0, 1.0), 1.0, 0);
        fb.color[0] = Vector4::new(1.0, 1.0, 1.0, 1.0);
        fb.color[3] = Vector4::new(1.0, 0.0, 0.0, 1.0);
        let c = fb.resolve_pixel(0, 0);
        assert_relative_eq!(c, Vector4::new(0.5, 0.25, 0.25, 1.0));
    }

    #[test]
    fn uv_lookup_flips_rows() {
        let mut fb = FrameBuffer::new(1, 2, 1).unwrap();
        fb.color[0] = Vector4::new(1.0, 0.0, 0.0, 1.0);
        fb.color[1] = Vector4::new(0.0, 1.0, 0.0, 1.0);
        assert_relative_eq!(fb.resolve_at_uv(0.5, 0.9).x, 1.0);
        assert_relative_eq!(fb.resolve_at_uv(0.5, 0.1).y, 1.0);
    }
}
