use crate::scene::texture::Texture;
use nalgebra::Vector3;
use std::sync::Arc;

/// Surface description handed to the fragment stage.
#[derive(Debug, Clone)]
pub enum Material {
    Phong(PhongMaterial),
    Glass(GlassMaterial),
}

impl Default for Material {
    fn default() -> Self {
        Material::Phong(PhongMaterial::default())
    }
}

/// Blinn-Phong inputs. Maps override the flat colors when present.
#[derive(Debug, Clone)]
pub struct PhongMaterial {
    pub diffuse_color: Vector3<f32>,
    pub specular_color: Vector3<f32>,
    pub diffuse_texture: Option<Arc<Texture>>,
    pub specular_texture: Option<Arc<Texture>>,
    /// Tangent-space normal map; only read by the normal-mapping shader.
    pub normal_texture: Option<Arc<Texture>>,
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self {
            diffuse_color: Vector3::new(0.8, 0.8, 0.8),
            specular_color: Vector3::new(0.5, 0.5, 0.5),
            diffuse_texture: None,
            specular_texture: None,
            normal_texture: None,
        }
    }
}

impl PhongMaterial {
    pub fn diffuse_at(&self, u: f32, v: f32) -> Vector3<f32> {
        match &self.diffuse_texture {
            Some(tex) => tex.sample_color(u, v),
            None => self.diffuse_color,
        }
    }

    pub fn specular_at(&self, u: f32, v: f32) -> Vector3<f32> {
        match &self.specular_texture {
            Some(tex) => tex.sample_data(u, v),
            None => self.specular_color,
        }
    }
}

/// Transparent surface. Alpha comes from the texture.
#[derive(Debug, Clone)]
pub struct GlassMaterial {
    pub texture: Option<Arc<Texture>>,
    /// Used when there is no texture: pale blue, mostly transparent.
    pub fallback_rgba: [f32; 4],
}

impl Default for GlassMaterial {
    fn default() -> Self {
        Self {
            texture: None,
            fallback_rgba: [0.75, 0.85, 0.9, 0.3],
        }
    }
}
