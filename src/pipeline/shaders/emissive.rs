use super::{FrameUniforms, ObjectTransform};
use crate::core::geometry::Vertex;
use crate::core::pipeline::Shader;
use crate::scene::material::Material;
use nalgebra::{Matrix4, Vector2, Vector3, Vector4};

/// Lamp models while their light is on: the diffuse color, unaffected by lighting.
pub struct EmissiveShader {
    pub transform: ObjectTransform,
    /// Color used for meshes without a Phong material.
    pub glow: Vector3<f32>,
}

impl EmissiveShader {
    pub fn new(frame: &FrameUniforms, model: Matrix4<f32>) -> Self {
        Self {
            transform: ObjectTransform::new(frame, model),
            glow: Vector3::new(1.0, 0.95, 0.8),
        }
    }
}

impl Shader<Vertex> for EmissiveShader {
    type Varying = Vector2<f32>;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        (self.transform.project(&vertex.position).0, vertex.texcoord)
    }

    fn fragment(&self, uv: Self::Varying, material: Option<&Material>) -> Option<Vector4<f32>> {
        let color = match material {
            Some(Material::Phong(m)) => m.diffuse_at(uv.x, uv.y),
            _ => self.glow,
        };
        Some(color.push(1.0))
    }
}
