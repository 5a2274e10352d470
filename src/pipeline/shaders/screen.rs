use crate::core::color::{aces_tone_mapping, linear_to_srgb};
use crate::core::framebuffer::FrameBuffer;
use crate::core::geometry::ScreenVertex;
use crate::core::pipeline::Shader;
use crate::scene::material::Material;
use crate::scene::mesh::Mesh;
use nalgebra::{Vector2, Vector4};

/// Presentation settings applied while resolving the scene target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSettings {
    pub exposure: f32,
    pub use_aces: bool,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            exposure: 1.0,
            use_aces: false,
        }
    }
}

/// Full-screen blit: samples the multisampled scene target, averaging every
/// subsample of the texel, then tone maps and gamma-encodes.
pub struct ScreenShader<'a> {
    pub source: &'a FrameBuffer,
    pub settings: ScreenSettings,
}

impl<'a> ScreenShader<'a> {
    pub fn new(source: &'a FrameBuffer, settings: ScreenSettings) -> Self {
        Self { source, settings }
    }
}

impl Shader<ScreenVertex> for ScreenShader<'_> {
    type Varying = Vector2<f32>;

    fn vertex(&self, vertex: &ScreenVertex) -> (Vector4<f32>, Self::Varying) {
        let p = vertex.position;
        (Vector4::new(p.x, p.y, 0.0, 1.0), vertex.texcoord)
    }

    fn fragment(&self, uv: Self::Varying, _material: Option<&Material>) -> Option<Vector4<f32>> {
        let resolved = self.source.resolve_at_uv(uv.x, uv.y);
        let mut color = resolved.xyz() * self.settings.exposure;
        if self.settings.use_aces {
            color = aces_tone_mapping(color);
        }
        Some(linear_to_srgb(color).push(1.0))
    }
}

/// Two counter-clockwise triangles covering NDC `[-1, 1]^2`.
pub fn screen_quad() -> Mesh<ScreenVertex> {
    Mesh::non_indexed(vec![
        ScreenVertex::new(-1.0, 1.0, 0.0, 1.0),
        ScreenVertex::new(-1.0, -1.0, 0.0, 0.0),
        ScreenVertex::new(1.0, -1.0, 1.0, 0.0),
        ScreenVertex::new(-1.0, 1.0, 0.0, 1.0),
        ScreenVertex::new(1.0, -1.0, 1.0, 0.0),
        ScreenVertex::new(1.0, 1.0, 1.0, 1.0),
    ])
}
