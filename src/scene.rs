pub mod camera;
pub mod layout;
pub mod light;
pub mod loader;
pub mod material;
pub mod mesh;
pub mod model;
pub mod quad;
pub mod texture;
