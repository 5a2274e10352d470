use crate::scene::material::Material;
use crate::scene::mesh::Mesh;

/// A loaded object: one mesh per OBJ group, each pointing into `materials`.
#[derive(Debug, Clone)]
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

impl Model {
    pub fn new(meshes: Vec<Mesh>, materials: Vec<Material>) -> Self {
        Self { meshes, materials }
    }

    /// Single test triangle with a given material.
    pub fn placeholder(material: Material) -> Self {
        Self::new(vec![Mesh::create_test_triangle()], vec![material])
    }

    /// Material of `mesh`, or `None` when its id is out of range.
    pub fn material_for(&self, mesh: &Mesh) -> Option<&Material> {
        self.materials.get(mesh.material_id)
    }
}
