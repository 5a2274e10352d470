use super::{FrameUniforms, LitVarying, ObjectTransform, unit_or};
use crate::core::geometry::Vertex;
use crate::core::pipeline::Shader;
use crate::scene::light::SurfacePoint;
use crate::scene::material::{Material, PhongMaterial};
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

/// Diffuse texels below this alpha are cut out (leaves, fabric edges).
const ALPHA_CUTOFF: f32 = 0.1;

/// Blinn-Phong shading of loaded OBJ models against the full light rig.
pub struct ModelShader<'a> {
    pub frame: &'a FrameUniforms,
    pub transform: ObjectTransform,
    pub fallback_material: PhongMaterial,
}

impl<'a> ModelShader<'a> {
    pub fn new(frame: &'a FrameUniforms, model: Matrix4<f32>) -> Self {
        Self {
            frame,
            transform: ObjectTransform::new(frame, model),
            fallback_material: PhongMaterial::default(),
        }
    }
}

impl Shader<Vertex> for ModelShader<'_> {
    type Varying = LitVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        let (clip_pos, world_pos) = self.transform.project(&vertex.position);
        let varying = LitVarying {
            world_pos,
            normal: self.transform.normal * vertex.normal,
            uv: vertex.texcoord,
        };
        (clip_pos, varying)
    }

    fn fragment(&self, varying: Self::Varying, material: Option<&Material>) -> Option<Vector4<f32>> {
        let mat = match material {
            Some(Material::Phong(m)) => m,
            _ => &self.fallback_material,
        };
        let (u, v) = (varying.uv.x, varying.uv.y);

        let diffuse = match &mat.diffuse_texture {
            Some(tex) => {
                let rgba = tex.sample_rgba(u, v);
                if rgba.w < ALPHA_CUTOFF {
                    return None;
                }
                rgba.xyz()
            }
            None => mat.diffuse_color,
        };

        let position = Point3::from(varying.world_pos);
        let color = self.frame.lights.shade(&SurfacePoint {
            position,
            normal: unit_or(varying.normal, Vector3::y()),
            view_dir: unit_or(self.frame.camera_pos - position, Vector3::z()),
            diffuse,
            specular: mat.specular_at(u, v),
            shininess: self.frame.shininess,
        });
        Some(color.push(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::texture::Texture;
    use crate::state::{Lamp, ProgramState};
    use nalgebra::Vector2;
    use std::sync::Arc;

    fn lit_varying() -> LitVarying {
        LitVarying {
            world_pos: Vector3::new(0.0, 0.0, 0.0),
            normal: Vector3::y(),
            uv: Vector2::new(0.5, 0.5),
        }
    }

    #[test]
    fn darker_when_lights_are_off() {
        let mut state = ProgramState::default();
        let dark = FrameUniforms::new(&state, 1.0, 32.0);
        state.dir_light = true;
        state.set_lamp(Lamp::Ceiling, true);
        let lit = FrameUniforms::new(&state, 1.0, 32.0);

        let c_dark = ModelShader::new(&dark, Matrix4::identity())
            .fragment(lit_varying(), None)
            .unwrap();
        let c_lit = ModelShader::new(&lit, Matrix4::identity())
            .fragment(lit_varying(), None)
            .unwrap();
        assert!(c_lit.x > c_dark.x);
        assert_eq!(c_lit.w, 1.0);
    }

    #[test]
    fn transparent_texels_are_discarded() {
        let frame = FrameUniforms::new(&ProgramState::default(), 1.0, 32.0);
        let material = Material::Phong(PhongMaterial {
            diffuse_texture: Some(Arc::new(Texture::solid([255, 255, 255, 0]))),
            ..PhongMaterial::default()
        });
        let shader = ModelShader::new(&frame, Matrix4::identity());
        assert!(shader.fragment(lit_varying(), Some(&material)).is_none());
    }
}
