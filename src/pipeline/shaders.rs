pub mod emissive;
pub mod glass;
pub mod model;
pub mod normal_map;
pub mod screen;

use crate::core::math::transform::normal_matrix;
use crate::core::pipeline::Interpolatable;
use crate::scene::light::{LightSet, LightUniforms, frame_uniforms};
use crate::state::ProgramState;
use nalgebra::{Matrix3, Matrix4, Point3, Vector2, Vector3, Vector4};
use std::ops::{Add, Mul};

/// Values shared by every shader of one scene pass.
#[derive(Debug, Clone)]
pub struct FrameUniforms {
    pub view_projection: Matrix4<f32>,
    pub camera_pos: Point3<f32>,
    /// Lights as seen by the model shader.
    pub lights: LightUniforms,
    /// Lights as seen by the normal-mapped surfaces.
    pub surface_lights: LightUniforms,
    pub shininess: f32,
    /// Whether any light that reaches the glass is on.
    pub glass_lit: bool,
}

impl FrameUniforms {
    pub fn new(state: &ProgramState, aspect_ratio: f32, shininess: f32) -> Self {
        let camera = &state.camera;
        Self {
            view_projection: camera.projection_matrix(aspect_ratio) * camera.view_matrix(),
            camera_pos: camera.position,
            lights: frame_uniforms(state, LightSet::Model),
            surface_lights: frame_uniforms(state, LightSet::Surface),
            shininess,
            glass_lit: state.glass_lit(),
        }
    }
}

/// Model matrix of one draw plus the matrices derived from it.
#[derive(Debug, Clone, Copy)]
pub struct ObjectTransform {
    pub model: Matrix4<f32>,
    pub normal: Matrix3<f32>,
    pub mvp: Matrix4<f32>,
}

impl ObjectTransform {
    pub fn new(frame: &FrameUniforms, model: Matrix4<f32>) -> Self {
        Self {
            model,
            normal: normal_matrix(&model),
            mvp: frame.view_projection * model,
        }
    }

    /// Returns `(clip position, world position)`.
    #[inline]
    pub fn project(&self, position: &Point3<f32>) -> (Vector4<f32>, Vector3<f32>) {
        let local = position.to_homogeneous();
        (self.mvp * local, (self.model * local).xyz())
    }

    #[inline]
    pub fn direction(&self, v: &Vector3<f32>) -> Vector3<f32> {
        self.model.fixed_view::<3, 3>(0, 0) * v
    }
}

/// World-space position, normal and UV, interpolated for lit shading.
#[derive(Clone, Copy, Debug)]
pub struct LitVarying {
    pub world_pos: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub uv: Vector2<f32>,
}

impl Add for LitVarying {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            world_pos: self.world_pos + other.world_pos,
            normal: self.normal + other.normal,
            uv: self.uv + other.uv,
        }
    }
}

impl Mul<f32> for LitVarying {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            world_pos: self.world_pos * scalar,
            normal: self.normal * scalar,
            uv: self.uv * scalar,
        }
    }
}

impl Interpolatable for LitVarying {}

/// Unit vector, or `fallback` when `v` has collapsed to zero.
#[inline]
pub(crate) fn unit_or(v: Vector3<f32>, fallback: Vector3<f32>) -> Vector3<f32> {
    v.try_normalize(1e-8).unwrap_or(fallback)
}
