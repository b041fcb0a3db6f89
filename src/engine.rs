use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
pub use winit::keyboard::KeyCode;
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use crate::camera::Camera;
use crate::config::{ParticleSystemConfig, SkinShaderConfig};
use crate::geometry;
use crate::particles::ParticleSimulator;
use crate::particles::buffer::ParticleBuffers;
use crate::renderer::Renderer;
use crate::renderer::head_pipeline::RenderMode;
use crate::renderer::target::RenderError;

// ── Engine ──────────────────────────────────────────────────────────────────

/// Facade tying the subsystems together: the particle simulator, the
/// attribute-array builder, the orbit camera, and the renderer.
///
/// The engine has no scheduling of its own — the host loop calls
/// [`update`](Self::update) with each frame's time delta and then
/// [`render`](Self::render).
pub struct Engine {
    /// GPU renderer — surface, pass pipeline, particle draw.
    pub renderer: Renderer,
    /// Orbit camera; near/far feed the depth linearization every frame.
    pub camera: Camera,
    simulator: ParticleSimulator,
    buffers: ParticleBuffers,
    skin_config: SkinShaderConfig,
    dt: f32,
    tick: u64,
    /// Set by `request_quit`; the event loop exits after the current tick.
    pub(crate) quit_requested: bool,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    fn from_builder(
        renderer: Renderer,
        particle_config: ParticleSystemConfig,
        skin_config: SkinShaderConfig,
    ) -> Self {
        let camera = Camera::new(skin_config.head_position, 4.0);
        let buffers = ParticleBuffers::new(particle_config.max_particles);
        let simulator = ParticleSimulator::new(particle_config);

        Self {
            renderer,
            camera,
            simulator,
            buffers,
            skin_config,
            dt: 0.0,
            tick: 0,
            quit_requested: false,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn simulator(&self) -> &ParticleSimulator {
        &self.simulator
    }

    pub fn skin_config(&self) -> &SkinShaderConfig {
        &self.skin_config
    }

    pub fn render_mode(&self) -> RenderMode {
        self.renderer.render_mode()
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.renderer.set_render_mode(mode);
    }

    /// Replace the particle configuration snapshot wholesale.  The
    /// attribute arrays are reallocated only when the pool cap changes.
    pub fn set_particle_config(&mut self, config: ParticleSystemConfig) {
        let config = config.clamped();
        if config.max_particles != self.buffers.capacity() {
            self.buffers = ParticleBuffers::new(config.max_particles);
        }
        self.simulator.set_config(config);
    }

    /// Replace the skin parameter snapshot wholesale.
    pub fn set_skin_config(&mut self, config: SkinShaderConfig) {
        self.skin_config = config;
    }

    /// Signal that the application should exit.  The event loop will call
    /// `exit()` after the current update tick completes.
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    // ── Frame ──────────────────────────────────────────────────────────────

    /// Advance simulation state by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.dt = dt;
        self.tick += 1;
        self.simulator.tick(dt);
        self.camera.tick(dt);
    }

    /// Flatten the particle pool and render one frame.
    pub fn render(&mut self) -> Result<(), RenderError> {
        self.buffers.rebuild(self.simulator.pool());
        self.renderer
            .render(&self.camera, &self.skin_config, &self.buffers)
    }
}

// ── EngineBuilder ───────────────────────────────────────────────────────────

pub struct EngineBuilder {
    title: String,
    width: u32,
    height: u32,
    particle_config: ParticleSystemConfig,
    skin_config: SkinShaderConfig,
    render_mode: RenderMode,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            title: "dermis".into(),
            width: 1280,
            height: 720,
            particle_config: ParticleSystemConfig::default(),
            skin_config: SkinShaderConfig::default(),
            render_mode: RenderMode::Skin,
        }
    }
}

impl EngineBuilder {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_particle_config(mut self, config: ParticleSystemConfig) -> Self {
        self.particle_config = config;
        self
    }

    pub fn with_skin_config(mut self, config: SkinShaderConfig) -> Self {
        self.skin_config = config;
        self
    }

    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    pub fn run(self) {
        let event_loop = EventLoop::new().unwrap();
        let mut app = App {
            config: self,
            engine: None,
            last_instant: None,
            orbiting: false,
            last_cursor: [0.0, 0.0],
        };
        event_loop.run_app(&mut app).unwrap();
    }
}

// ── App (winit ApplicationHandler) ──────────────────────────────────────────

struct App {
    config: EngineBuilder,
    engine: Option<Engine>,
    last_instant: Option<Instant>,
    /// True while the left mouse button drags the orbit.
    orbiting: bool,
    last_cursor: [f32; 2],
}

/// Orbit sensitivity in radians per pixel of mouse drag.
const ORBIT_SENSITIVITY: f32 = 0.008;

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title(&self.config.title)
                        .with_inner_size(winit::dpi::PhysicalSize::new(
                            self.config.width,
                            self.config.height,
                        )),
                )
                .unwrap(),
        );

        let mesh = geometry::head_mesh();
        let renderer = pollster::block_on(Renderer::new(window, &mesh));

        let mut engine = Engine::from_builder(
            renderer,
            self.config.particle_config.clone().clamped(),
            self.config.skin_config.clone(),
        );
        engine.set_render_mode(self.config.render_mode);

        self.engine = Some(engine);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(engine) = self.engine.as_ref() {
            engine.renderer.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                engine.renderer.resize(size);
            }

            WindowEvent::CursorMoved { position, .. } => {
                let pos = [position.x as f32, position.y as f32];
                if self.orbiting {
                    let dx = pos[0] - self.last_cursor[0];
                    let dy = pos[1] - self.last_cursor[1];
                    engine
                        .camera
                        .orbit(dx * ORBIT_SENSITIVITY, dy * ORBIT_SENSITIVITY);
                }
                self.last_cursor = pos;
            }

            WindowEvent::MouseInput { button, state, .. } => {
                if button == MouseButton::Left {
                    self.orbiting = state == ElementState::Pressed;
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / 100.0) as f32,
                };
                let target = engine.camera.target_distance() * (1.0 - scroll * 0.1);
                engine.camera.set_distance(target);
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = match self.last_instant {
                    Some(prev) => now.duration_since(prev).as_secs_f32().min(0.25),
                    None => 1.0 / 60.0,
                };
                self.last_instant = Some(now);

                engine.update(dt);
                if engine.quit_requested {
                    event_loop.exit();
                    return;
                }

                match engine.render() {
                    Ok(()) => {}
                    Err(RenderError::Surface(wgpu::SurfaceError::Lost)) => {
                        let size = engine.renderer.window.inner_size();
                        engine.renderer.resize(size);
                    }
                    Err(RenderError::TargetReleased(label)) => {
                        tracing::warn!("skipping frame: render target '{label}' released");
                    }
                    Err(e) => tracing::error!("render error: {e}"),
                }
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match code {
                KeyCode::Digit1 => engine.set_render_mode(RenderMode::Depth),
                KeyCode::Digit2 => engine.set_render_mode(RenderMode::Normal),
                KeyCode::Digit3 => engine.set_render_mode(RenderMode::Skin),
                KeyCode::Digit4 => engine.set_render_mode(RenderMode::Combined),
                KeyCode::Escape => engine.request_quit(),
                _ => {}
            },

            _ => {}
        }
    }
}
