//! Startup loading of every asset the room needs.
//!
//! Nothing here is fatal except a quad that cannot get a tangent frame: a
//! missing model becomes a placeholder triangle and a missing texture a
//! flat color, each with a warning.

use crate::error::Result;
use crate::io::obj_loader::{TextureCache, load_obj};
use crate::scene::layout::{
    GLASS_MODEL_PATH, GLASS_TEXTURE, LAMPS, PROPS, SURFACES, SurfaceSet, TEXTURE_DIR,
};
use crate::scene::material::{GlassMaterial, Material, PhongMaterial};
use crate::scene::model::Model;
use crate::scene::quad::QuadLibrary;
use crate::scene::texture::{Texture, WrapMode};
use log::{info, warn};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Stand-in for a missing tangent-space normal map: the unperturbed normal.
const FLAT_NORMAL: [u8; 4] = [128, 128, 255, 255];
const FALLBACK_DIFFUSE: [u8; 4] = [200, 200, 200, 255];
const FALLBACK_SPECULAR: [u8; 4] = [64, 64, 64, 255];

/// GPU-side resources of the room, created once and read by every frame.
#[derive(Debug)]
pub struct SceneResources {
    pub quads: QuadLibrary,
    /// Indexed by [`SurfaceSet::index`].
    pub surface_materials: [Material; 3],
    /// Parallel to [`PROPS`].
    pub props: Vec<Model>,
    /// Parallel to [`LAMPS`].
    pub lamps: Vec<Model>,
    pub glass_model: Model,
    pub glass_material: Material,
}

impl SceneResources {
    /// Loads models and textures below `root` (the directory holding
    /// `objects/` and `textures/`).
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        info!("Loading scene resources from {root:?}");

        let quads = prepared_quads()?;
        let mut textures = TextureCache::new();

        let surface_materials = SurfaceSet::ALL.map(|set| {
            let [diffuse, specular, normal] =
                set.files().map(|name| root.join(TEXTURE_DIR).join(name));
            Material::Phong(PhongMaterial {
                diffuse_texture: Some(texture_or(&mut textures, &diffuse, FALLBACK_DIFFUSE)),
                specular_texture: Some(texture_or(&mut textures, &specular, FALLBACK_SPECULAR)),
                normal_texture: Some(texture_or(&mut textures, &normal, FLAT_NORMAL)),
                ..PhongMaterial::default()
            })
        });

        let mut models: HashMap<&'static str, Model> = HashMap::new();
        let mut model = |rel: &'static str| -> Model {
            models
                .entry(rel)
                .or_insert_with(|| match load_obj(root.join(rel), &mut textures) {
                    Ok(model) => model,
                    Err(e) => {
                        warn!("{e}; drawing a placeholder instead");
                        Model::placeholder(Material::default())
                    }
                })
                .clone()
        };

        let glass_texture = match Texture::load(root.join(GLASS_TEXTURE)) {
            Ok(texture) => Some(Arc::new(texture.with_wrap(WrapMode::ClampToEdge))),
            Err(e) => {
                warn!("{e}; glass uses its fallback tint");
                None
            }
        };
        let pane = GlassMaterial {
            texture: glass_texture,
            ..GlassMaterial::default()
        };

        let props = PROPS.iter().map(|spec| model(spec.model)).collect();
        let lamps = LAMPS.iter().map(|spec| model(spec.model)).collect();
        let glass_model = with_glass_materials(model(GLASS_MODEL_PATH), &pane);

        info!(
            "Scene resources ready: {} props, {} lamps, {} textures, {} room quads",
            PROPS.len(),
            LAMPS.len(),
            textures.len(),
            quads.len()
        );

        Ok(Self {
            quads,
            surface_materials,
            props,
            lamps,
            glass_model,
            glass_material: Material::Glass(pane),
        })
    }

    /// Resources without touching the disk: placeholder triangles and flat colors.
    pub fn placeholder() -> Result<Self> {
        let solid = |rgba| Some(Arc::new(Texture::solid(rgba)));
        let surface = Material::Phong(PhongMaterial {
            diffuse_texture: solid(FALLBACK_DIFFUSE),
            specular_texture: solid(FALLBACK_SPECULAR),
            normal_texture: solid(FLAT_NORMAL),
            ..PhongMaterial::default()
        });

        Ok(Self {
            quads: prepared_quads()?,
            surface_materials: [surface.clone(), surface.clone(), surface],
            props: PROPS.iter().map(|_| Model::placeholder(Material::default())).collect(),
            lamps: LAMPS.iter().map(|_| Model::placeholder(Material::default())).collect(),
            glass_model: with_glass_materials(
                Model::placeholder(Material::default()),
                &GlassMaterial::default(),
            ),
            glass_material: Material::Glass(GlassMaterial::default()),
        })
    }

    pub fn surface_material(&self, set: SurfaceSet) -> &Material {
        &self.surface_materials[set.index()]
    }
}

fn prepared_quads() -> Result<QuadLibrary> {
    let mut quads = QuadLibrary::new();
    quads.prepare(SURFACES.iter().map(|s| s.tex))?;
    Ok(quads)
}

/// Turns the model's MTL entries into glass. Each keeps its own diffuse map;
/// entries without one take the pane's material.
fn with_glass_materials(model: Model, pane: &GlassMaterial) -> Model {
    let materials = model
        .materials
        .iter()
        .map(|material| match material {
            Material::Phong(PhongMaterial {
                diffuse_texture: Some(texture),
                ..
            }) => Material::Glass(GlassMaterial {
                texture: Some(Arc::clone(texture)),
                ..GlassMaterial::default()
            }),
            Material::Phong(_) => Material::Glass(pane.clone()),
            Material::Glass(glass) => Material::Glass(glass.clone()),
        })
        .collect();
    Model::new(model.meshes, materials)
}

fn texture_or(cache: &mut TextureCache, path: &Path, fallback: [u8; 4]) -> Arc<Texture> {
    cache
        .get(path)
        .unwrap_or_else(|| Arc::new(Texture::solid(fallback)))
}
