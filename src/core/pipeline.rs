use crate::scene::material::Material;
use nalgebra::{Vector2, Vector3, Vector4};
use std::ops::{Add, Mul};

/// Values that can be blended linearly across a triangle.
///
/// Clipping and barycentric interpolation only need `a + b` and `a * t`;
/// `Send + Sync` lets fragments be shaded from rayon workers.
pub trait Interpolatable:
    Copy + Clone + Add<Output = Self> + Mul<f32, Output = Self> + Send + Sync
{
}

impl Interpolatable for f32 {}
impl Interpolatable for Vector2<f32> {}
impl Interpolatable for Vector3<f32> {}

/// The programmable stages of the pipeline, for one vertex layout `V`.
///
/// A shader may implement this for several layouts; the glass shader, for
/// example, draws both the position+UV pane and a full OBJ mesh.
pub trait Shader<V>: Send + Sync {
    /// Per-vertex outputs interpolated across the primitive.
    type Varying: Interpolatable;

    /// Transforms `vertex` into homogeneous clip space and emits its varyings.
    fn vertex(&self, vertex: &V) -> (Vector4<f32>, Self::Varying);

    /// Shades one fragment, returning straight (non-premultiplied) RGBA.
    ///
    /// `None` discards the fragment: neither color nor depth is written.
    fn fragment(&self, varying: Self::Varying, material: Option<&Material>) -> Option<Vector4<f32>>;
}
