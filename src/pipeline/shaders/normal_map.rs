use super::{FrameUniforms, ObjectTransform, unit_or};
use crate::core::geometry::Vertex;
use crate::core::pipeline::{Interpolatable, Shader};
use crate::scene::light::SurfacePoint;
use crate::scene::material::{Material, PhongMaterial};
use nalgebra::{Matrix3, Matrix4, Point3, Vector2, Vector3, Vector4};
use std::ops::{Add, Mul};

/// World-space tangent frame carried to the fragment stage.
#[derive(Clone, Copy, Debug)]
pub struct TangentVarying {
    pub world_pos: Vector3<f32>,
    pub uv: Vector2<f32>,
    pub tangent: Vector3<f32>,
    pub bitangent: Vector3<f32>,
    pub normal: Vector3<f32>,
}

impl Add for TangentVarying {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            world_pos: self.world_pos + other.world_pos,
            uv: self.uv + other.uv,
            tangent: self.tangent + other.tangent,
            bitangent: self.bitangent + other.bitangent,
            normal: self.normal + other.normal,
        }
    }
}

impl Mul<f32> for TangentVarying {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            world_pos: self.world_pos * scalar,
            uv: self.uv * scalar,
            tangent: self.tangent * scalar,
            bitangent: self.bitangent * scalar,
            normal: self.normal * scalar,
        }
    }
}

impl Interpolatable for TangentVarying {}

/// Blinn-Phong with a tangent-space normal map, used for the walls, floor
/// and ceiling.
pub struct NormalMapShader<'a> {
    pub frame: &'a FrameUniforms,
    pub transform: ObjectTransform,
    pub fallback_material: PhongMaterial,
}

impl<'a> NormalMapShader<'a> {
    pub fn new(frame: &'a FrameUniforms, model: Matrix4<f32>) -> Self {
        Self {
            frame,
            transform: ObjectTransform::new(frame, model),
            fallback_material: PhongMaterial::default(),
        }
    }
}

impl Shader<Vertex> for NormalMapShader<'_> {
    type Varying = TangentVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        let (clip_pos, world_pos) = self.transform.project(&vertex.position);
        let varying = TangentVarying {
            world_pos,
            uv: vertex.texcoord,
            tangent: self.transform.direction(&vertex.tangent),
            bitangent: self.transform.direction(&vertex.bitangent),
            normal: self.transform.normal * vertex.normal,
        };
        (clip_pos, varying)
    }

    fn fragment(&self, varying: Self::Varying, material: Option<&Material>) -> Option<Vector4<f32>> {
        let mat = match material {
            Some(Material::Phong(m)) => m,
            _ => &self.fallback_material,
        };
        let (u, v) = (varying.uv.x, varying.uv.y);

        let n = unit_or(varying.normal, Vector3::z());
        let normal = match &mat.normal_texture {
            Some(map) => {
                let t = unit_or(varying.tangent, Vector3::x());
                let b = unit_or(varying.bitangent, Vector3::y());
                let tbn = Matrix3::from_columns(&[t, b, n]);
                let sampled = map.sample_data(u, v) * 2.0 - Vector3::repeat(1.0);
                unit_or(tbn * sampled, n)
            }
            None => n,
        };

        let position = Point3::from(varying.world_pos);
        let color = self.frame.surface_lights.shade(&SurfacePoint {
            position,
            normal,
            view_dir: unit_or(self.frame.camera_pos - position, Vector3::z()),
            diffuse: mat.diffuse_at(u, v),
            specular: mat.specular_at(u, v),
            shininess: self.frame.shininess,
        });
        Some(color.push(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::light::{LightSet, frame_uniforms};
    use crate::scene::quad::unit_wall_quad;
    use crate::scene::texture::Texture;
    use crate::state::ProgramState;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn material(normal_rgba: [u8; 4]) -> Material {
        Material::Phong(PhongMaterial {
            normal_texture: Some(Arc::new(Texture::solid(normal_rgba))),
            ..PhongMaterial::default()
        })
    }

    #[test]
    fn flat_normal_map_matches_plain_shading() {
        let mut state = ProgramState::default();
        state.dir_light = true;
        let frame = FrameUniforms::new(&state, 1.0, 32.0);
        let shader = NormalMapShader::new(&frame, Matrix4::identity());

        let quad = unit_wall_quad(1.0).unwrap();
        let (_, varying) = shader.vertex(&quad.vertices[0]);

        // 128/255 is not exactly 0.5, so the frame tilts by a hair.
        let mapped = shader.fragment(varying, Some(&material([128, 128, 255, 255]))).unwrap();
        let plain = shader.fragment(varying, None).unwrap();
        assert_relative_eq!(mapped, plain, epsilon = 1e-2);
    }

    #[test]
    fn tilted_map_changes_lighting() {
        let mut state = ProgramState::default();
        state.dir_light = true;
        let frame = FrameUniforms::new(&state, 1.0, 32.0);
        let shader = NormalMapShader::new(&frame, Matrix4::identity());

        let quad = unit_wall_quad(1.0).unwrap();
        let (_, varying) = shader.vertex(&quad.vertices[0]);

        // Tangent-space +Y maps to the quad's bitangent, world +Y, facing the sun.
        let up = shader.fragment(varying, Some(&material([128, 255, 128, 255]))).unwrap();
        let flat = shader.fragment(varying, Some(&material([128, 128, 255, 255]))).unwrap();
        assert!(up.x > flat.x);
    }

    #[test]
    fn surfaces_shade_with_their_own_light_set() {
        let mut state = ProgramState::default();
        state.lamps = [true; 6];
        let frame = FrameUniforms::new(&state, 1.0, 32.0);
        let mut dark_models = frame.clone();
        dark_models.lights = frame_uniforms(&ProgramState::default(), LightSet::Model);

        let quad = unit_wall_quad(1.0).unwrap();
        let lit = NormalMapShader::new(&frame, Matrix4::identity());
        let (_, varying) = lit.vertex(&quad.vertices[0]);
        let expected = lit.fragment(varying, None).unwrap();

        let shader = NormalMapShader::new(&dark_models, Matrix4::identity());
        assert_eq!(shader.fragment(varying, None).unwrap(), expected);
    }
}
