pub mod input;
pub mod overlay;
