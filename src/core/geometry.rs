use nalgebra::{Point2, Point3, Vector2, Vector3};

/// A lit vertex. Room surfaces carry a tangent frame for normal mapping;
/// vertices loaded from OBJ files leave tangent and bitangent at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in object space.
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub texcoord: Vector2<f32>,
    /// Direction of increasing U on the surface (not normalized).
    pub tangent: Vector3<f32>,
    /// Direction of increasing V on the surface (not normalized).
    pub bitangent: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, texcoord: Vector2<f32>) -> Self {
        Self {
            position,
            normal,
            texcoord,
            tangent: Vector3::zeros(),
            bitangent: Vector3::zeros(),
        }
    }
}

/// Position + UV vertex used by the glass pane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexturedVertex {
    pub position: Point3<f32>,
    pub texcoord: Vector2<f32>,
}

impl TexturedVertex {
    pub const fn new(x: f32, y: f32, z: f32, u: f32, v: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            texcoord: Vector2::new(u, v),
        }
    }
}

/// Full-screen quad vertex: NDC position and the UV it samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub position: Point2<f32>,
    pub texcoord: Vector2<f32>,
}

impl ScreenVertex {
    pub const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: Point2::new(x, y),
            texcoord: Vector2::new(u, v),
        }
    }
}
