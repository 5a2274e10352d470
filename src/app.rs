use anyhow::Context as _;
use log::{debug, error, info, warn};
use roomlight::io::config::Config;
use roomlight::io::image::{save_framebuffer_png, screenshot_path};
use roomlight::io::state_file;
use roomlight::pipeline::compositor::{Compositor, CompositorSettings};
use roomlight::pipeline::shaders::screen::ScreenSettings;
use roomlight::scene::camera::{MAX_ZOOM, MIN_ZOOM};
use roomlight::scene::loader::SceneResources;
use roomlight::state::ProgramState;
use roomlight::ui::input::{self, CursorMode, InputFrame};
use roomlight::ui::overlay;
use std::path::Path;
use std::time::Instant;

/// Nominal height of one wheel line in egui points.
const POINTS_PER_LINE: f32 = 50.0;
/// Seconds between FPS log lines.
const FPS_LOG_INTERVAL: f32 = 2.0;

fn compositor_settings(config: &Config) -> CompositorSettings {
    CompositorSettings {
        clear_color: config.render.clear_color,
        shininess: config.render.shininess,
        screen: ScreenSettings {
            exposure: config.render.exposure,
            use_aces: config.render.use_aces,
        },
    }
}

/// Loads the persisted state and applies the camera tuning from the config.
fn initial_state(config: &Config) -> ProgramState {
    let mut state = state_file::load(&config.paths.state_file);
    let camera = &mut state.camera;
    camera.movement_speed = config.camera.speed;
    camera.mouse_sensitivity = config.camera.sensitivity;
    camera.zoom = config.camera.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    state
}

/// Renders one frame with the persisted state and writes it to `output`.
pub fn run_headless(config: &Config, output: &Path) -> anyhow::Result<()> {
    info!("Starting headless render...");
    let start_time = Instant::now();

    let state = initial_state(config);
    let resources = SceneResources::load(&config.paths.resources)
        .context("could not prepare scene resources")?;

    let (width, height) = config.render_size(config.window.width, config.window.height);
    let mut compositor = Compositor::new(
        width,
        height,
        config.render.samples,
        compositor_settings(config),
    )
    .context("could not create render targets")?;

    let stats = compositor.render_frame(&resources, &state);
    info!(
        "Render completed in {:.2?} ({} draw calls)",
        start_time.elapsed(),
        stats.draw_calls
    );

    save_framebuffer_png(compositor.output(), output)
        .with_context(|| format!("could not save {output:?}"))?;
    info!("Done.");
    Ok(())
}

/// Opens the window and runs the interactive loop until Escape or close.
pub fn run_gui(config: Config) -> anyhow::Result<()> {
    let state = initial_state(&config);
    let resources = SceneResources::load(&config.paths.resources)
        .context("could not prepare scene resources")?;

    let (width, height) = config.render_size(config.window.width, config.window.height);
    let compositor = Compositor::new(
        width,
        height,
        config.render.samples,
        compositor_settings(&config),
    )
    .context("could not create render targets")?;

    info!(
        "Starting GUI mode ({}x{})...",
        config.window.width, config.window.height
    );
    info!("Controls: WASD=Move, Mouse=Look, Scroll=Zoom, F1=UI, F2=Sun, F3=Flashlight, F12=Screenshot, Esc=Quit");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.window.title.clone())
            .with_inner_size([config.window.width as f32, config.window.height as f32])
            .with_resizable(true),
        ..Default::default()
    };

    let title = config.window.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(RoomApp::new(config, state, resources, compositor)))),
    )
    .map_err(|e| anyhow::anyhow!("window system failed: {e}"))
}

struct FpsCounter {
    frames: u32,
    since: Instant,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            frames: 0,
            since: Instant::now(),
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let elapsed = self.since.elapsed().as_secs_f32();
        if elapsed >= FPS_LOG_INTERVAL {
            info!("Average FPS: {:.1}", self.frames as f32 / elapsed);
            self.frames = 0;
            self.since = Instant::now();
        }
    }
}

struct RoomApp {
    config: Config,
    state: ProgramState,
    resources: SceneResources,
    compositor: Compositor,
    frame_texture: Option<egui::TextureHandle>,
    cursor: Option<CursorMode>,
    last_frame: Instant,
    fps: FpsCounter,
    saved: bool,
}

impl RoomApp {
    fn new(config: Config, state: ProgramState, resources: SceneResources, compositor: Compositor) -> Self {
        Self {
            config,
            state,
            resources,
            compositor,
            frame_texture: None,
            cursor: None,
            last_frame: Instant::now(),
            fps: FpsCounter::new(),
            saved: false,
        }
    }

    fn gather_input(ctx: &egui::Context, dt: f32) -> InputFrame {
        ctx.input(|i| {
            let mut frame = InputFrame {
                dt,
                forward: i.key_down(egui::Key::W),
                backward: i.key_down(egui::Key::S),
                left: i.key_down(egui::Key::A),
                right: i.key_down(egui::Key::D),
                toggle_ui: i.key_pressed(egui::Key::F1),
                toggle_dir_light: i.key_pressed(egui::Key::F2),
                toggle_flashlight: i.key_pressed(egui::Key::F3),
                screenshot: i.key_pressed(egui::Key::F12),
                quit: i.key_pressed(egui::Key::Escape),
                ..InputFrame::default()
            };

            for event in &i.events {
                match event {
                    egui::Event::MouseMoved(delta) => {
                        frame.mouse_delta.0 += delta.x;
                        frame.mouse_delta.1 += delta.y;
                    }
                    egui::Event::MouseWheel { unit, delta, .. } => {
                        frame.scroll_lines += match unit {
                            egui::MouseWheelUnit::Line => delta.y,
                            egui::MouseWheelUnit::Point => delta.y / POINTS_PER_LINE,
                            egui::MouseWheelUnit::Page => delta.y * 10.0,
                        };
                    }
                    _ => {}
                }
            }
            frame
        })
    }

    fn set_cursor(&mut self, ctx: &egui::Context, mode: CursorMode) {
        if self.cursor == Some(mode) {
            return;
        }
        let (grab, visible) = match mode {
            CursorMode::Captured => (egui::CursorGrab::Locked, false),
            CursorMode::Released => (egui::CursorGrab::None, true),
        };
        ctx.send_viewport_cmd(egui::ViewportCommand::CursorGrab(grab));
        ctx.send_viewport_cmd(egui::ViewportCommand::CursorVisible(visible));
        self.cursor = Some(mode);
    }

    fn save_state(&mut self) {
        if self.saved {
            return;
        }
        match state_file::save(&self.state, &self.config.paths.state_file) {
            Ok(()) => self.saved = true,
            Err(e) => error!("Failed to save program state: {e}"),
        }
    }

    /// Keeps the render targets at the window's pixel size.
    fn sync_size(&mut self, ctx: &egui::Context) -> bool {
        let size = ctx.screen_rect().size() * ctx.pixels_per_point();
        let (width, height) = self
            .config
            .render_size(size.x.round() as usize, size.y.round() as usize);
        match self.compositor.resize(width, height) {
            Ok(()) => true,
            Err(e) => {
                warn!("Skipping frame: {e}");
                false
            }
        }
    }

    fn upload_frame(&mut self, ctx: &egui::Context) {
        let fb = self.compositor.output();
        let image = egui::ColorImage::from_rgba_unmultiplied([fb.width, fb.height], &fb.to_rgba8());
        match &mut self.frame_texture {
            Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.frame_texture =
                    Some(ctx.load_texture("room-frame", image, egui::TextureOptions::NEAREST));
            }
        }
    }
}

impl eframe::App for RoomApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        if self.cursor.is_none() {
            self.set_cursor(ctx, input::initial_cursor(&self.state));
        }

        let requests = input::apply(&mut self.state, &Self::gather_input(ctx, dt));
        if let Some(mode) = requests.cursor {
            self.set_cursor(ctx, mode);
        }
        if requests.close || ctx.input(|i| i.viewport().close_requested()) {
            self.save_state();
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        if self.sync_size(ctx) {
            self.compositor.render_frame(&self.resources, &self.state);
            self.upload_frame(ctx);

            if requests.screenshot {
                let path = screenshot_path(&self.config.paths.screenshots);
                if let Err(e) = save_framebuffer_png(self.compositor.output(), &path) {
                    error!("Failed to save screenshot: {e}");
                }
            }
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if let Some(texture) = &self.frame_texture {
                    let size = ui.available_size();
                    ui.add(egui::Image::from_texture(egui::load::SizedTexture::new(
                        texture.id(),
                        size,
                    )));
                }
            });

        let toggles = overlay::draw(ctx, &mut self.state);
        if toggles.lamps_changed {
            debug!("Lamps switched: {:?}", self.state.lamps);
        }
        if toggles.coupling_changed {
            debug!("Camera mouse coupling: {}", self.state.camera_mouse_enabled);
        }

        if dt > 0.0 {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(format!(
                "{} - {:.1} FPS",
                self.config.window.title,
                1.0 / dt
            )));
        }
        self.fps.tick();
        ctx.request_repaint();
    }
}
