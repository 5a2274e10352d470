use super::{FrameUniforms, ObjectTransform};
use crate::core::geometry::{TexturedVertex, Vertex};
use crate::core::pipeline::Shader;
use crate::scene::material::{GlassMaterial, Material};
use nalgebra::{Matrix4, Vector2, Vector4};

/// Texels this transparent are dropped entirely.
const DISCARD_ALPHA: f32 = 0.1;
/// Color scale applied while no light reaches the glass.
const UNLIT_DIM: f32 = 0.2;

/// Unlit, textured, alpha-blended glass. Draws both the flat pane
/// ([`TexturedVertex`]) and the glass model ([`Vertex`]).
pub struct GlassShader {
    pub transform: ObjectTransform,
    pub lit: bool,
    pub fallback_material: GlassMaterial,
}

impl GlassShader {
    pub fn new(frame: &FrameUniforms, model: Matrix4<f32>) -> Self {
        Self {
            transform: ObjectTransform::new(frame, model),
            lit: frame.glass_lit,
            fallback_material: GlassMaterial::default(),
        }
    }

    fn shade(&self, uv: Vector2<f32>, material: Option<&Material>) -> Option<Vector4<f32>> {
        let glass = match material {
            Some(Material::Glass(g)) => g,
            _ => &self.fallback_material,
        };
        let color = match &glass.texture {
            Some(tex) => tex.sample_rgba(uv.x, uv.y),
            None => Vector4::from(glass.fallback_rgba),
        };

        if color.w < DISCARD_ALPHA {
            return None;
        }
        if self.lit {
            Some(color)
        } else {
            let dim = color.xyz() * UNLIT_DIM;
            Some(dim.push(color.w))
        }
    }
}

impl Shader<TexturedVertex> for GlassShader {
    type Varying = Vector2<f32>;

    fn vertex(&self, vertex: &TexturedVertex) -> (Vector4<f32>, Self::Varying) {
        (self.transform.project(&vertex.position).0, vertex.texcoord)
    }

    fn fragment(&self, uv: Self::Varying, material: Option<&Material>) -> Option<Vector4<f32>> {
        self.shade(uv, material)
    }
}

impl Shader<Vertex> for GlassShader {
    type Varying = Vector2<f32>;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        (self.transform.project(&vertex.position).0, vertex.texcoord)
    }

    fn fragment(&self, uv: Self::Varying, material: Option<&Material>) -> Option<Vector4<f32>> {
        self.shade(uv, material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::texture::Texture;
    use crate::state::{Lamp, ProgramState};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn glass(rgba: [u8; 4]) -> Material {
        Material::Glass(GlassMaterial {
            texture: Some(Arc::new(Texture::solid(rgba))),
            ..GlassMaterial::default()
        })
    }

    fn shader(state: &ProgramState) -> GlassShader {
        GlassShader::new(&FrameUniforms::new(state, 1.0, 32.0), Matrix4::identity())
    }

    #[test]
    fn nearly_clear_texels_are_discarded() {
        let shader = shader(&ProgramState::default());
        let uv = Vector2::new(0.5, 0.5);
        assert!(shader.shade(uv, Some(&glass([255, 255, 255, 10]))).is_none());
        assert!(shader.shade(uv, Some(&glass([255, 255, 255, 128]))).is_some());
    }

    #[test]
    fn dims_until_a_reaching_light_is_on() {
        let uv = Vector2::new(0.5, 0.5);
        let mut state = ProgramState::default();
        let dark = shader(&state).shade(uv, None).unwrap();

        state.set_lamp(Lamp::Desk, true);
        let lit = shader(&state).shade(uv, None).unwrap();

        assert_relative_eq!(dark.xyz(), lit.xyz() * UNLIT_DIM, epsilon = 1e-6);
        assert_relative_eq!(dark.w, lit.w);
    }
}
