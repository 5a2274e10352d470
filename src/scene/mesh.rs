use crate::core::geometry::Vertex;
use nalgebra::{Point3, Vector2, Vector3};

/// Vertices plus a triangle list. `V` is the vertex layout the mesh is drawn with.
#[derive(Debug, Clone)]
pub struct Mesh<V = Vertex> {
    pub vertices: Vec<V>,
    /// Three indices per triangle.
    pub indices: Vec<u32>,
    /// Index into the owning model's material list.
    pub material_id: usize,
}

impl<V> Mesh<V> {
    pub fn new(vertices: Vec<V>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            material_id: 0,
        }
    }

    /// A mesh drawn in vertex order, three vertices per triangle.
    pub fn non_indexed(vertices: Vec<V>) -> Self {
        let indices = (0..vertices.len() as u32).collect();
        Self::new(vertices, indices)
    }

    pub fn with_material(mut self, material_id: usize) -> Self {
        self.material_id = material_id;
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

impl Mesh<Vertex> {
    /// Counter-clockwise unit triangle facing +Z, the stand-in for a model that failed to load.
    pub fn create_test_triangle() -> Self {
        let normal = Vector3::new(0.0, 0.0, 1.0);
        Self::non_indexed(vec![
            Vertex::new(Point3::new(0.0, 0.5, 0.0), normal, Vector2::new(0.5, 1.0)),
            Vertex::new(Point3::new(-0.5, -0.5, 0.0), normal, Vector2::new(0.0, 0.0)),
            Vertex::new(Point3::new(0.5, -0.5, 0.0), normal, Vector2::new(1.0, 0.0)),
        ])
    }
}
