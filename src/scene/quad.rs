//! Procedural quads: the normal-mapped room surface and the glass pane.

use crate::core::geometry::{TexturedVertex, Vertex};
use crate::error::{RenderError, Result};
use crate::scene::mesh::Mesh;
use log::debug;
use nalgebra::{Point3, Vector2, Vector3};
use std::collections::HashMap;

/// Below this |det| the UV deltas are treated as linearly dependent.
const DEGENERATE_UV_EPSILON: f32 = 1e-8;

/// Unnormalized per-triangle tangent frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentBasis {
    pub tangent: Vector3<f32>,
    pub bitangent: Vector3<f32>,
}

/// Solves `e1 = du1*T + dv1*B`, `e2 = du2*T + dv2*B` for one triangle.
pub fn tangent_basis(positions: [Point3<f32>; 3], uvs: [Vector2<f32>; 3]) -> Result<TangentBasis> {
    let edge1 = positions[1] - positions[0];
    let edge2 = positions[2] - positions[0];
    let delta_uv1 = uvs[1] - uvs[0];
    let delta_uv2 = uvs[2] - uvs[0];

    let determinant = delta_uv1.x * delta_uv2.y - delta_uv2.x * delta_uv1.y;
    if !determinant.is_finite() || determinant.abs() < DEGENERATE_UV_EPSILON {
        return Err(RenderError::DegenerateUvMapping { determinant });
    }

    let f = 1.0 / determinant;
    let tangent = (edge1 * delta_uv2.y - edge2 * delta_uv1.y) * f;
    let bitangent = (edge2 * delta_uv1.x - edge1 * delta_uv2.x) * f;

    if !(tangent.iter().all(|c| c.is_finite()) && bitangent.iter().all(|c| c.is_finite())) {
        return Err(RenderError::DegenerateUvMapping { determinant });
    }
    Ok(TangentBasis { tangent, bitangent })
}

/// Two-triangle quad `(1,2,3)`, `(1,3,4)` with UVs repeating `tex` times and a
/// tangent frame per triangle.
///
/// Corners are expected counter-clockwise starting top-left, i.e. corner 1
/// maps to UV `(0, tex)`, corner 2 to `(0, 0)`, corner 3 to `(tex, 0)` and
/// corner 4 to `(tex, tex)`.
pub fn build_normal_mapped_quad(
    corners: [Point3<f32>; 4],
    normal: Vector3<f32>,
    tex: f32,
) -> Result<Mesh<Vertex>> {
    let uvs = [
        Vector2::new(0.0, tex),
        Vector2::new(0.0, 0.0),
        Vector2::new(tex, 0.0),
        Vector2::new(tex, tex),
    ];

    let mut vertices = Vec::with_capacity(6);
    for [a, b, c] in [[0, 1, 2], [0, 2, 3]] {
        let basis = tangent_basis([corners[a], corners[b], corners[c]], [uvs[a], uvs[b], uvs[c]])?;
        for i in [a, b, c] {
            vertices.push(Vertex {
                position: corners[i],
                normal,
                texcoord: uvs[i],
                tangent: basis.tangent,
                bitangent: basis.bitangent,
            });
        }
    }
    Ok(Mesh::non_indexed(vertices))
}

/// Unit room surface in the XY plane facing +Z, spanning [-1, 1].
pub fn unit_wall_quad(tex: f32) -> Result<Mesh<Vertex>> {
    build_normal_mapped_quad(
        [
            Point3::new(-1.0, 1.0, 0.0),
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ],
        Vector3::new(0.0, 0.0, 1.0),
        tex,
    )
}

/// Glass pane: x in [0, 1], y in [-0.5, 0.5], UVs spanning the full texture.
pub fn build_transparent_quad() -> Mesh<TexturedVertex> {
    Mesh::non_indexed(vec![
        TexturedVertex::new(0.0, 0.5, 0.0, 0.0, 1.0),
        TexturedVertex::new(0.0, -0.5, 0.0, 0.0, 0.0),
        TexturedVertex::new(1.0, -0.5, 0.0, 1.0, 0.0),
        TexturedVertex::new(0.0, 0.5, 0.0, 0.0, 1.0),
        TexturedVertex::new(1.0, -0.5, 0.0, 1.0, 0.0),
        TexturedVertex::new(1.0, 0.5, 0.0, 1.0, 1.0),
    ])
}

/// Owns the procedural quad meshes for the lifetime of the renderer.
///
/// Room quads are cached per repeat factor, so each distinct `tex` gets its
/// own UV range instead of sharing whichever mesh was built first.
#[derive(Debug)]
pub struct QuadLibrary {
    wall_quads: HashMap<u32, Mesh<Vertex>>,
    transparent: Mesh<TexturedVertex>,
}

impl Default for QuadLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadLibrary {
    pub fn new() -> Self {
        Self {
            wall_quads: HashMap::new(),
            transparent: build_transparent_quad(),
        }
    }

    /// Builds every listed repeat factor up front.
    pub fn prepare(&mut self, factors: impl IntoIterator<Item = f32>) -> Result<()> {
        for tex in factors {
            self.get_or_build(tex)?;
        }
        Ok(())
    }

    pub fn get_or_build(&mut self, tex: f32) -> Result<&Mesh<Vertex>> {
        use std::collections::hash_map::Entry;

        match self.wall_quads.entry(tex.to_bits()) {
            Entry::Occupied(entry) => Ok(&*entry.into_mut()),
            Entry::Vacant(entry) => {
                debug!("Building room quad for tex = {tex}");
                Ok(&*entry.insert(unit_wall_quad(tex)?))
            }
        }
    }

    /// Read-only lookup of a prepared quad.
    pub fn get(&self, tex: f32) -> Option<&Mesh<Vertex>> {
        self.wall_quads.get(&tex.to_bits())
    }

    pub fn transparent(&self) -> &Mesh<TexturedVertex> {
        &self.transparent
    }

    pub fn len(&self) -> usize {
        self.wall_quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wall_quads.is_empty()
    }
}
