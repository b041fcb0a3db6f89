use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::camera::Camera;
use crate::config::SkinShaderConfig;
use crate::geometry::MeshData;
use crate::renderer::head_pipeline::{HeadPrograms, ProgramKind, RenderMode, create_head_programs};
use crate::renderer::particle_pipeline::ParticlePass;
use crate::renderer::target::{RenderError, RenderTarget};
use crate::renderer::uniforms::UniformSync;

// ── PassState ───────────────────────────────────────────────────────────────

/// Per-frame pipeline state.  A frame walks the cycle
/// `Idle → DepthPass → NormalPass → CompositePass → Idle`; the pipeline
/// returns to `Idle` on every exit path, including failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PassState {
    Idle,
    DepthPass,
    NormalPass,
    CompositePass,
}

impl PassState {
    pub fn next(self) -> Self {
        match self {
            PassState::Idle => PassState::DepthPass,
            PassState::DepthPass => PassState::NormalPass,
            PassState::NormalPass => PassState::CompositePass,
            PassState::CompositePass => PassState::Idle,
        }
    }
}

// ── FrameContext ────────────────────────────────────────────────────────────

/// Everything a frame needs from the outside: the camera, the viewport
/// aspect, the skin parameter snapshot, and the prepared particle draw.
pub struct FrameContext<'a> {
    pub camera: &'a Camera,
    pub aspect: f32,
    pub skin: &'a SkinShaderConfig,
    pub particles: &'a ParticlePass,
}

// ── PassPipeline ────────────────────────────────────────────────────────────

/// Three-pass skin rendering pipeline.
///
/// Each frame renders the scene twice off-screen (depth program into
/// `depth_target`, normal program into `normal_target`), submits that work,
/// syncs the uniform buffers, and then renders the composite pass to the
/// default framebuffer with the program selected by `render_mode`.
/// Sequential submission is the ordering guarantee: a pass's output texture
/// is fully written before the next submission samples it.
///
/// On failure the previously selected program stays active and the default
/// target is never touched, so the last presented frame survives — degraded,
/// not crashed.  The off-screen targets live for the pipeline's lifetime and
/// are released on teardown.
pub struct PassPipeline {
    programs: HeadPrograms,
    depth_target: RenderTarget,
    normal_target: RenderTarget,
    /// Depth + normal target views and their sampler, bound by the skin
    /// program.  Dropped together with the targets on release.
    composite_bind_group: Option<wgpu::BindGroup>,
    pub uniforms: UniformSync,
    /// Which program the composite pass displays.
    pub render_mode: RenderMode,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    active_program: ProgramKind,
    state: PassState,
}

impl PassPipeline {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat, mesh: &MeshData) -> Self {
        let programs = create_head_programs(device, color_format);

        let depth_target = RenderTarget::new(device, color_format, "depth_target");
        let normal_target = RenderTarget::new(device, color_format, "normal_target");

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let composite_bind_group = match (depth_target.color_view(), normal_target.color_view()) {
            (Ok(depth_view), Ok(normal_view)) => {
                Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("composite_bg"),
                    layout: &programs.composite_bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(depth_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(normal_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                    ],
                }))
            }
            _ => None,
        };

        let uniforms = UniformSync::new(
            device,
            &programs.scene_bind_group_layout,
            &programs.skin_bind_group_layout,
        );

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("head_vertex_buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("head_index_buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            programs,
            depth_target,
            normal_target,
            composite_bind_group,
            uniforms,
            render_mode: RenderMode::Skin,
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
            active_program: ProgramKind::Skin,
            state: PassState::Idle,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn state(&self) -> PassState {
        self.state
    }

    /// The program the subject mesh currently draws with — stays on the
    /// last successfully selected program across failed frames.
    pub fn active_program(&self) -> ProgramKind {
        self.active_program
    }

    pub fn scene_bind_group(&self) -> &wgpu::BindGroup {
        &self.uniforms.scene_bind_group
    }

    /// Layout shared by every program's group 0 — the particle pipeline
    /// binds its scene uniforms against the same layout.
    pub fn scene_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.programs.scene_bind_group_layout
    }

    // ── Frame ──────────────────────────────────────────────────────────────

    /// Run the three passes for one frame.  `surface_view` and
    /// `surface_depth_view` are the default framebuffer attachments.
    ///
    /// On error the previous program selection is restored, the state
    /// machine returns to `Idle`, and nothing has been submitted against
    /// the default target.
    pub fn render_frame(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_view: &wgpu::TextureView,
        surface_depth_view: &wgpu::TextureView,
        ctx: &FrameContext<'_>,
    ) -> Result<(), RenderError> {
        let prev_program = self.active_program;
        let result = self.run_passes(device, queue, surface_view, surface_depth_view, ctx);
        if result.is_err() {
            self.active_program = prev_program;
        }
        self.state = PassState::Idle;
        result
    }

    fn run_passes(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_view: &wgpu::TextureView,
        surface_depth_view: &wgpu::TextureView,
        ctx: &FrameContext<'_>,
    ) -> Result<(), RenderError> {
        // Resolve the off-screen attachments up front so a released target
        // fails the frame before any state or encoder is touched.
        self.depth_target.color_view()?;
        self.normal_target.color_view()?;

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("offscreen_passes"),
        });

        // ── Depth pass ────────────────────────────────────────────────────
        self.state = self.state.next();
        {
            let color = self.depth_target.color_view()?;
            let depth = self.depth_target.depth_view()?;
            let mut pass = begin_scene_pass(&mut encoder, "depth_pass", color, depth);
            pass.set_pipeline(&self.programs.depth);
            pass.set_bind_group(0, &self.uniforms.scene_bind_group, &[]);
            self.draw_head(&mut pass);
            ctx.particles.draw(&mut pass, &self.uniforms.scene_bind_group);
        }

        // ── Normal pass ───────────────────────────────────────────────────
        self.state = self.state.next();
        {
            let color = self.normal_target.color_view()?;
            let depth = self.normal_target.depth_view()?;
            let mut pass = begin_scene_pass(&mut encoder, "normal_pass", color, depth);
            pass.set_pipeline(&self.programs.normal);
            pass.set_bind_group(0, &self.uniforms.scene_bind_group, &[]);
            self.draw_head(&mut pass);
            ctx.particles.draw(&mut pass, &self.uniforms.scene_bind_group);
        }

        // Submit the off-screen work before the composite encoder begins —
        // the composite submission below samples these targets.
        queue.submit(std::iter::once(encoder.finish()));

        // Push this frame's camera planes and skin parameters now, after
        // the off-screen submission and before the composite pass reads
        // them.
        let model = Mat4::from_translation(ctx.skin.head_position);
        self.uniforms
            .sync(queue, ctx.camera, ctx.aspect, ctx.skin, model);

        // ── Composite pass (default framebuffer) ──────────────────────────
        self.state = self.state.next();
        self.active_program = self.render_mode.program();

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("composite_pass"),
        });
        {
            let mut pass =
                begin_scene_pass(&mut encoder, "composite", surface_view, surface_depth_view);
            pass.set_pipeline(self.programs.get(self.active_program));
            pass.set_bind_group(0, &self.uniforms.scene_bind_group, &[]);
            if self.active_program == ProgramKind::Skin {
                let composite_bg = self
                    .composite_bind_group
                    .as_ref()
                    .ok_or(RenderError::TargetReleased("composite"))?;
                pass.set_bind_group(1, &self.uniforms.skin_bind_group, &[]);
                pass.set_bind_group(2, composite_bg, &[]);
            }
            self.draw_head(&mut pass);
            ctx.particles.draw(&mut pass, &self.uniforms.scene_bind_group);
        }
        queue.submit(std::iter::once(encoder.finish()));

        self.state = self.state.next();
        Ok(())
    }

    fn draw_head(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    // ── Teardown ───────────────────────────────────────────────────────────

    /// Release the off-screen targets.  Idempotent; later frames fail with
    /// `TargetReleased` and degrade instead of crashing.
    pub fn release_targets(&mut self) {
        self.composite_bind_group = None;
        self.depth_target.release();
        self.normal_target.release();
    }

    pub fn targets_released(&self) -> bool {
        self.depth_target.is_released() && self.normal_target.is_released()
    }
}

impl Drop for PassPipeline {
    fn drop(&mut self) {
        self.release_targets();
    }
}

// ── Pass helper ─────────────────────────────────────────────────────────────

/// Begin a scene render pass clearing both attachments.
fn begin_scene_pass<'a>(
    encoder: &'a mut wgpu::CommandEncoder,
    label: &str,
    color_view: &wgpu::TextureView,
    depth_view: &wgpu::TextureView,
) -> wgpu::RenderPass<'a> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            depth_slice: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_state_cycles_back_to_idle() {
        let mut s = PassState::Idle;
        s = s.next();
        assert_eq!(s, PassState::DepthPass);
        s = s.next();
        assert_eq!(s, PassState::NormalPass);
        s = s.next();
        assert_eq!(s, PassState::CompositePass);
        s = s.next();
        assert_eq!(s, PassState::Idle);
    }
}
