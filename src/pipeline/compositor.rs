//! Per-frame orchestration: scene pass into the multisampled target, then a
//! blit through the screen shader into the single-sample output.

use crate::core::framebuffer::FrameBuffer;
use crate::core::geometry::ScreenVertex;
use crate::core::rasterizer::{BlendMode, CullMode, RasterState};
use crate::error::Result;
use crate::pipeline::renderer::{ClearOptions, Renderer};
use crate::pipeline::shaders::FrameUniforms;
use crate::pipeline::shaders::emissive::EmissiveShader;
use crate::pipeline::shaders::glass::GlassShader;
use crate::pipeline::shaders::model::ModelShader;
use crate::pipeline::shaders::normal_map::NormalMapShader;
use crate::pipeline::shaders::screen::{ScreenSettings, ScreenShader, screen_quad};
use crate::scene::layout::{GlassId, LAMPS, PROPS, SURFACES, transparent_order};
use crate::scene::loader::SceneResources;
use crate::scene::mesh::Mesh;
use crate::state::ProgramState;
use log::{debug, info, warn};
use nalgebra::Vector4;

/// Tunables of the scene pass and the blit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositorSettings {
    pub clear_color: [f32; 3],
    pub shininess: f32,
    pub screen: ScreenSettings,
}

impl Default for CompositorSettings {
    fn default() -> Self {
        Self {
            clear_color: [0.05, 0.05, 0.05],
            shininess: 128.0,
            screen: ScreenSettings::default(),
        }
    }
}

/// What one call to [`Compositor::render_frame`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Draw calls issued in the scene pass.
    pub draw_calls: usize,
    /// Glass objects in the order they were drawn.
    pub glass_order: [GlassId; 2],
}

pub struct Compositor {
    scene: Renderer,
    output: Renderer,
    screen_quad: Mesh<ScreenVertex>,
    settings: CompositorSettings,
}

impl Compositor {
    /// Allocates the offscreen target (`samples` per pixel) and the output
    /// target, failing if either is incomplete.
    pub fn new(width: usize, height: usize, samples: usize, settings: CompositorSettings) -> Result<Self> {
        let scene = Renderer::new(width, height, samples)?;
        let output = Renderer::new(width, height, 1)?;
        info!("Compositor ready: {width}x{height}, {samples} samples per pixel");
        Ok(Self {
            scene,
            output,
            screen_quad: screen_quad(),
            settings,
        })
    }

    /// Rebuilds both targets at a new size with the same sample count. On
    /// failure the old targets are kept.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        if (width, height) == self.size() {
            return Ok(());
        }
        let samples = self.scene.framebuffer.samples;
        let scene = Renderer::new(width, height, samples)?;
        let output = Renderer::new(width, height, 1)?;
        self.scene = scene;
        self.output = output;
        debug!("Compositor resized to {width}x{height}");
        Ok(())
    }

    pub fn size(&self) -> (usize, usize) {
        (self.output.framebuffer.width, self.output.framebuffer.height)
    }

    pub fn settings(&self) -> &CompositorSettings {
        &self.settings
    }

    /// The resolved, display-encoded frame.
    pub fn output(&self) -> &FrameBuffer {
        &self.output.framebuffer
    }

    /// The multisampled scene target of the last frame.
    pub fn scene_target(&self) -> &FrameBuffer {
        &self.scene.framebuffer
    }

    pub fn render_frame(&mut self, resources: &SceneResources, state: &ProgramState) -> FrameStats {
        let stats = self.scene_pass(resources, state);
        self.blit_pass();
        stats
    }

    fn scene_pass(&mut self, res: &SceneResources, state: &ProgramState) -> FrameStats {
        let [r, g, b] = self.settings.clear_color;
        self.scene.clear_with_options(ClearOptions {
            color: Vector4::new(r, g, b, 1.0),
            ..ClearOptions::default()
        });

        let (width, height) = self.size();
        let frame = FrameUniforms::new(state, width as f32 / height as f32, self.settings.shininess);

        let opaque = |cull_mode| RasterState {
            cull_mode,
            depth_test: true,
            blend: BlendMode::Opaque,
        };

        for surface in &SURFACES {
            let Some(quad) = res.quads.get(surface.tex) else {
                warn!("No room quad for tex = {}; skipping {}", surface.tex, surface.name);
                continue;
            };
            self.scene.set_state(opaque(surface.cull));
            let shader = NormalMapShader::new(&frame, surface.placement.matrix());
            self.scene
                .draw_mesh(quad, &shader, Some(res.surface_material(surface.textures)));
        }

        self.scene.set_state(opaque(CullMode::Back));
        for (spec, model) in PROPS.iter().zip(&res.props) {
            let shader = ModelShader::new(&frame, spec.placement.matrix());
            self.scene.draw_model(model, &shader);
        }

        for (spec, model) in LAMPS.iter().zip(&res.lamps) {
            self.scene.set_state(opaque(spec.cull));
            let transform = spec.placement.matrix();
            if state.lamp(spec.lamp) {
                self.scene
                    .draw_model(model, &EmissiveShader::new(&frame, transform));
            } else {
                self.scene
                    .draw_model(model, &ModelShader::new(&frame, transform));
            }
        }

        self.scene.set_state(RasterState {
            cull_mode: CullMode::None,
            depth_test: true,
            blend: BlendMode::Alpha,
        });
        let order = transparent_order(&state.camera.position);
        for glass in &order {
            let shader = GlassShader::new(&frame, glass.placement.matrix());
            match glass.id {
                GlassId::Pane => {
                    self.scene
                        .draw_mesh(res.quads.transparent(), &shader, Some(&res.glass_material));
                }
                GlassId::Model => self.scene.draw_model(&res.glass_model, &shader),
            }
        }

        FrameStats {
            draw_calls: self.scene.draw_calls,
            glass_order: order.map(|g| g.id),
        }
    }

    fn blit_pass(&mut self) {
        self.output.clear_with_options(ClearOptions {
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
            ..ClearOptions::default()
        });
        self.output.set_state(RasterState {
            cull_mode: CullMode::None,
            depth_test: false,
            blend: BlendMode::Opaque,
        });

        let shader = ScreenShader::new(&self.scene.framebuffer, self.settings.screen);
        self.output.draw_mesh(&self.screen_quad, &shader, None);

        self.output.set_state(RasterState::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn compositor(width: usize, height: usize) -> Compositor {
        Compositor::new(width, height, 4, CompositorSettings::default()).unwrap()
    }

    #[test]
    fn blit_covers_every_output_pixel() {
        let resources = SceneResources::placeholder().unwrap();
        let mut comp = compositor(32, 24);
        comp.render_frame(&resources, &ProgramState::default());

        let out = comp.output();
        for y in 0..out.height {
            for x in 0..out.width {
                let c = out.resolve_pixel(x, y);
                assert!(c.xyz() != nalgebra::Vector3::repeat(1.0), "pixel ({x}, {y}) left at clear color");
            }
        }
    }

    #[test]
    fn scene_pass_draws_the_whole_table() {
        let resources = SceneResources::placeholder().unwrap();
        let mut comp = compositor(16, 16);
        let stats = comp.render_frame(&resources, &ProgramState::default());
        // One mesh per placeholder model, one quad per surface, two glass draws.
        assert_eq!(stats.draw_calls, SURFACES.len() + PROPS.len() + LAMPS.len() + 2);
    }

    #[test]
    fn glass_order_follows_camera() {
        let resources = SceneResources::placeholder().unwrap();
        let mut comp = compositor(8, 8);
        let mut state = ProgramState::default();

        // Next to the pane: the model is farther and goes first.
        state.camera.position = Point3::new(-4.0, 2.0, 3.0);
        let stats = comp.render_frame(&resources, &state);
        assert_eq!(stats.glass_order, [GlassId::Model, GlassId::Pane]);

        state.camera.position = Point3::new(-1.0, 2.5, -3.5);
        let stats = comp.render_frame(&resources, &state);
        assert_eq!(stats.glass_order, [GlassId::Pane, GlassId::Model]);
    }

    #[test]
    fn rejects_unsupported_sample_counts() {
        assert!(Compositor::new(8, 8, 3, CompositorSettings::default()).is_err());
        assert!(Compositor::new(0, 8, 4, CompositorSettings::default()).is_err());
    }

    #[test]
    fn resize_rebuilds_targets() {
        let mut comp = compositor(8, 8);
        comp.resize(20, 10).unwrap();
        assert_eq!(comp.size(), (20, 10));
        assert_eq!(comp.scene_target().samples, 4);
        assert_eq!(comp.scene_target().buffer_width, 40);

        assert!(comp.resize(0, 10).is_err());
        assert_eq!(comp.size(), (20, 10));
    }
}
