pub mod head_pipeline;
pub mod particle_pipeline;
pub mod pass;
pub mod shading;
pub mod target;
pub mod uniforms;

use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::camera::Camera;
use crate::config::SkinShaderConfig;
use crate::geometry::MeshData;
use crate::particles::buffer::ParticleBuffers;
use head_pipeline::RenderMode;
use particle_pipeline::ParticlePass;
use pass::{FrameContext, PassPipeline};
use target::RenderError;

// ── Renderer ────────────────────────────────────────────────────────────────

/// Owns the GPU surface, device, and queue, plus the pass pipeline and the
/// particle draw.  One [`render`](Self::render) call per externally driven
/// frame; nothing here blocks or suspends — submission is fire-and-forget.
pub struct Renderer {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    /// Depth buffer for the default framebuffer; recreated on resize.
    surface_depth_view: wgpu::TextureView,
    pub pass_pipeline: PassPipeline,
    particle_pass: ParticlePass,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, mesh: &MeshData) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(Arc::clone(&window)).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .expect("no suitable GPU adapter found");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .expect("failed to create device");

        let caps = surface.get_capabilities(&adapter);
        let format = caps.formats[0];

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let surface_depth_view = create_surface_depth(&device, &config);

        let pass_pipeline = PassPipeline::new(&device, format, mesh);
        let particle_pass =
            ParticlePass::new(&device, format, pass_pipeline.scene_bind_group_layout());

        Self {
            window,
            surface,
            device,
            queue,
            config,
            surface_depth_view,
            pass_pipeline,
            particle_pass,
        }
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.surface_depth_view = create_surface_depth(&self.device, &self.config);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Viewport aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    pub fn render_mode(&self) -> RenderMode {
        self.pass_pipeline.render_mode
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.pass_pipeline.render_mode = mode;
    }

    /// Render one frame: upload the particle attribute arrays, then run the
    /// three-pass pipeline against the acquired surface texture.
    ///
    /// A failed frame presents nothing — the previous frame stays on
    /// screen.  `SurfaceError::Lost` is recovered by the caller via
    /// [`resize`](Self::resize).
    pub fn render(
        &mut self,
        camera: &Camera,
        skin: &SkinShaderConfig,
        particles: &ParticleBuffers,
    ) -> Result<(), RenderError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.particle_pass
            .upload(&self.device, &self.queue, particles);

        let ctx = FrameContext {
            camera,
            aspect: self.aspect(),
            skin,
            particles: &self.particle_pass,
        };
        self.pass_pipeline.render_frame(
            &self.device,
            &self.queue,
            &view,
            &self.surface_depth_view,
            &ctx,
        )?;

        frame.present();
        Ok(())
    }

    /// Release the off-screen pass targets (pipeline teardown).  Subsequent
    /// frames degrade with `TargetReleased` instead of crashing.
    pub fn release_targets(&mut self) {
        self.pass_pipeline.release_targets();
    }
}

fn create_surface_depth(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("surface_depth"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
