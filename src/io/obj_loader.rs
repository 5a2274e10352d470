use crate::core::geometry::Vertex;
use crate::error::{RenderError, Result};
use crate::scene::material::{Material, PhongMaterial};
use crate::scene::mesh::Mesh;
use crate::scene::model::Model;
use crate::scene::texture::Texture;
use log::{debug, info, warn};
use nalgebra::{Point3, Vector2, Vector3};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Decoded textures shared between every model that references the same file.
#[derive(Debug, Default)]
pub struct TextureCache {
    textures: HashMap<PathBuf, Option<Arc<Texture>>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `path` once. A failed load is remembered and yields `None`.
    pub fn get(&mut self, path: &Path) -> Option<Arc<Texture>> {
        self.textures
            .entry(path.to_path_buf())
            .or_insert_with(|| match Texture::load(path) {
                Ok(texture) => Some(Arc::new(texture)),
                Err(e) => {
                    warn!("{e}; falling back to the flat material color");
                    None
                }
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Loads an OBJ file with its MTL materials, one [`Mesh`] per OBJ group.
pub fn load_obj<P: AsRef<Path>>(path: P, textures: &mut TextureCache) -> Result<Model> {
    let path = path.as_ref();
    let model_error = |message: String| RenderError::Model {
        path: path.to_path_buf(),
        message,
    };

    if !path.exists() {
        return Err(model_error("file not found".to_string()));
    }
    info!("Loading OBJ file: {path:?}");

    let load_options = tobj::LoadOptions {
        triangulate: true,
        // Position/normal/UV share one index stream.
        single_index: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };

    let (obj_models, obj_materials) =
        tobj::load_obj(path, &load_options).map_err(|e| model_error(e.to_string()))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut materials: Vec<Material> = match obj_materials {
        Ok(mats) => mats
            .iter()
            .map(|mat| Material::Phong(phong_from_mtl(mat, base_dir, textures)))
            .collect(),
        Err(e) => {
            warn!("No materials for {path:?}: {e}");
            Vec::new()
        }
    };
    if materials.is_empty() {
        materials.push(Material::default());
    }

    let mut meshes = Vec::with_capacity(obj_models.len());
    for obj in &obj_models {
        let mesh = &obj.mesh;
        if mesh.indices.is_empty() {
            debug!("Skipping empty group '{}'", obj.name);
            continue;
        }

        let material_id = match mesh.material_id {
            Some(id) if id < materials.len() => id,
            Some(id) => {
                warn!("Group '{}' has invalid material id {id}; using 0", obj.name);
                0
            }
            None => 0,
        };

        if mesh.normals.is_empty() {
            warn!("Group '{}' is missing normals. Using default (0, 1, 0).", obj.name);
        }
        meshes.push(convert_mesh(mesh).with_material(material_id));
    }

    if meshes.is_empty() {
        return Err(model_error("no triangles".to_string()));
    }

    info!(
        "OBJ loaded: {} groups, {} materials, {} triangles",
        meshes.len(),
        materials.len(),
        meshes.iter().map(Mesh::triangle_count).sum::<usize>()
    );
    Ok(Model::new(meshes, materials))
}

fn phong_from_mtl(mat: &tobj::Material, base_dir: &Path, textures: &mut TextureCache) -> PhongMaterial {
    let mut texture = |name: &Option<String>| {
        name.as_deref()
            .filter(|n| !n.is_empty())
            .and_then(|n| textures.get(&base_dir.join(n)))
    };

    let defaults = PhongMaterial::default();
    PhongMaterial {
        diffuse_color: mat.diffuse.map(Vector3::from).unwrap_or(defaults.diffuse_color),
        specular_color: mat.specular.map(Vector3::from).unwrap_or(defaults.specular_color),
        diffuse_texture: texture(&mat.diffuse_texture),
        specular_texture: texture(&mat.specular_texture),
        normal_texture: texture(&mat.normal_texture),
    }
}

fn convert_mesh(mesh: &tobj::Mesh) -> Mesh<Vertex> {
    let vertex_count = mesh.positions.len() / 3;
    let has_normals = mesh.normals.len() >= vertex_count * 3;
    let has_texcoords = mesh.texcoords.len() >= vertex_count * 2;

    let vertices = (0..vertex_count)
        .map(|i| {
            let p = &mesh.positions[i * 3..i * 3 + 3];
            let normal = if has_normals {
                Vector3::new(mesh.normals[i * 3], mesh.normals[i * 3 + 1], mesh.normals[i * 3 + 2])
            } else {
                Vector3::y()
            };
            let texcoord = if has_texcoords {
                Vector2::new(mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1])
            } else {
                Vector2::zeros()
            };
            Vertex::new(Point3::new(p[0], p[1], p[2]), normal, texcoord)
        })
        .collect();

    Mesh::new(vertices, mesh.indices.clone())
}
