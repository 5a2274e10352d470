//! Software-rasterized room renderer.
//!
//! The crate draws a fixed furnished room: normal-mapped walls, textured
//! props, lamp models that glow when their light is on and two glass objects
//! blended back to front. Frames are rendered into a supersampled offscreen
//! target and resolved onto a single-sample output through a screen shader.

pub mod core;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod scene;
pub mod state;
pub mod ui;

pub use error::{RenderError, Result};
