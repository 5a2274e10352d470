pub mod compositor;
pub mod renderer;
pub mod shaders;
