use thiserror::Error;

// ── RenderError ─────────────────────────────────────────────────────────────

/// Failures at the render-pass boundary.  These never propagate as panics:
/// the pass pipeline catches them, restores the previous program selection,
/// and leaves the last presented frame on the default target.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An off-screen pass tried to bind a target whose GPU resources have
    /// been released (pipeline teardown already ran).
    #[error("render target '{0}' has been released")]
    TargetReleased(&'static str),

    /// Surface acquisition failed; the host loop recovers `Lost` by
    /// resizing (recreating the swapchain).
    #[error(transparent)]
    Surface(#[from] wgpu::SurfaceError),
}

// ── RenderTarget ────────────────────────────────────────────────────────────

/// Fixed-resolution off-screen framebuffer: a sampleable color texture plus
/// a private depth buffer for the pass that renders into it.
///
/// Targets are allocated once at pipeline construction and explicitly
/// released on teardown; binding a released target is an error, not a
/// panic, so a torn-down pipeline degrades instead of crashing.
pub struct RenderTarget {
    label: &'static str,
    inner: Option<TargetTextures>,
}

struct TargetTextures {
    _color: wgpu::Texture,
    color_view: wgpu::TextureView,
    _depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl RenderTarget {
    /// Off-screen pass resolution (square).
    pub const SIZE: u32 = 512;

    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, label: &'static str) -> Self {
        let size = wgpu::Extent3d {
            width: Self::SIZE,
            height: Self::SIZE,
            depth_or_array_layers: 1,
        };

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            label,
            inner: Some(TargetTextures {
                _color: color,
                color_view,
                _depth: depth,
                depth_view,
            }),
        }
    }

    /// The color attachment view, or `TargetReleased` after teardown.
    pub fn color_view(&self) -> Result<&wgpu::TextureView, RenderError> {
        self.inner
            .as_ref()
            .map(|t| &t.color_view)
            .ok_or(RenderError::TargetReleased(self.label))
    }

    /// The depth attachment view, or `TargetReleased` after teardown.
    pub fn depth_view(&self) -> Result<&wgpu::TextureView, RenderError> {
        self.inner
            .as_ref()
            .map(|t| &t.depth_view)
            .ok_or(RenderError::TargetReleased(self.label))
    }

    /// Drop the GPU textures.  Idempotent; later binds fail with
    /// `TargetReleased`.
    pub fn release(&mut self) {
        self.inner = None;
    }

    pub fn is_released(&self) -> bool {
        self.inner.is_none()
    }
}
