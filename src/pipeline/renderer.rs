use crate::core::framebuffer::FrameBuffer;
use crate::core::geometry::Vertex;
use crate::core::pipeline::Shader;
use crate::core::rasterizer::{RasterState, Rasterizer};
use crate::error::Result;
use crate::scene::material::Material;
use crate::scene::mesh::Mesh;
use crate::scene::model::Model;
use log::debug;
use nalgebra::Vector4;

/// Values written by [`Renderer::clear_with_options`].
#[derive(Debug, Clone, Copy)]
pub struct ClearOptions {
    pub color: Vector4<f32>,
    pub depth: f32,
    pub stencil: u8,
}

impl Default for ClearOptions {
    fn default() -> Self {
        Self {
            color: Vector4::new(0.0, 0.0, 0.0, 1.0),
            depth: f32::INFINITY,
            stencil: 0,
        }
    }
}

/// A render target plus the fixed-function state used to draw into it.
pub struct Renderer {
    pub rasterizer: Rasterizer,
    pub framebuffer: FrameBuffer,
    /// Draw calls issued since the last clear.
    pub draw_calls: usize,
}

impl Renderer {
    /// `samples`: 1 for a plain target, 4 for a 2x2 grid, etc.
    pub fn new(width: usize, height: usize, samples: usize) -> Result<Self> {
        Ok(Self {
            rasterizer: Rasterizer::default(),
            framebuffer: FrameBuffer::new(width, height, samples)?,
            draw_calls: 0,
        })
    }

    pub fn set_state(&mut self, state: RasterState) {
        self.rasterizer.state = state;
    }

    pub fn state(&self) -> RasterState {
        self.rasterizer.state
    }

    pub fn clear_with_options(&mut self, options: ClearOptions) {
        self.framebuffer
            .clear(options.color, options.depth, options.stencil);
        self.draw_calls = 0;
    }

    /// Draws every mesh of `model` with its own material.
    pub fn draw_model<S: Shader<Vertex>>(&mut self, model: &Model, shader: &S) {
        for mesh in &model.meshes {
            self.draw_mesh(mesh, shader, model.material_for(mesh));
        }
    }

    /// Runs the vertex stage over `mesh` and rasterizes each indexed triangle.
    pub fn draw_mesh<V, S: Shader<V>>(&mut self, mesh: &Mesh<V>, shader: &S, material: Option<&Material>) {
        self.draw_calls += 1;

        for tri in mesh.indices.chunks_exact(3) {
            let (Some(v0), Some(v1), Some(v2)) = (
                mesh.vertices.get(tri[0] as usize),
                mesh.vertices.get(tri[1] as usize),
                mesh.vertices.get(tri[2] as usize),
            ) else {
                debug!("Skipping triangle with out-of-range index {tri:?}");
                continue;
            };

            let (pos0, var0) = shader.vertex(v0);
            let (pos1, var1) = shader.vertex(v1);
            let (pos2, var2) = shader.vertex(v2);

            self.rasterizer.rasterize_triangle(
                &mut self.framebuffer,
                shader,
                &[pos0, pos1, pos2],
                &[var0, var1, var2],
                material,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rasterizer::CullMode;
    use nalgebra::Vector2;

    struct Solid;

    impl Shader<Vector2<f32>> for Solid {
        type Varying = f32;

        fn vertex(&self, v: &Vector2<f32>) -> (Vector4<f32>, f32) {
            (Vector4::new(v.x, v.y, 0.0, 1.0), 1.0)
        }

        fn fragment(&self, _: f32, _: Option<&Material>) -> Option<Vector4<f32>> {
            Some(Vector4::new(1.0, 0.0, 0.0, 1.0))
        }
    }

    #[test]
    fn counts_draw_calls_and_skips_bad_indices() {
        let mut renderer = Renderer::new(4, 4, 1).unwrap();
        renderer.set_state(RasterState {
            cull_mode: CullMode::None,
            ..RasterState::default()
        });
        renderer.clear_with_options(ClearOptions::default());

        let mesh = Mesh::new(
            vec![
                Vector2::new(-1.0, -1.0),
                Vector2::new(1.0, -1.0),
                Vector2::new(-1.0, 1.0),
            ],
            vec![0, 1, 2, 0, 1, 7],
        );
        renderer.draw_mesh(&mesh, &Solid, None);
        assert_eq!(renderer.draw_calls, 1);
        // Lower-left corner is inside the drawn triangle.
        assert_eq!(renderer.framebuffer.resolve_pixel(0, 3).x, 1.0);

        renderer.clear_with_options(ClearOptions::default());
        assert_eq!(renderer.draw_calls, 0);
        assert_eq!(renderer.framebuffer.resolve_pixel(0, 3).x, 0.0);
    }
}
