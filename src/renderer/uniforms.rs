use bytemuck::Zeroable;
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::camera::Camera;
use crate::config::SkinShaderConfig;

// ── Uniform blocks ──────────────────────────────────────────────────────────

/// Per-frame scene uniforms shared by every program (column-major matrices,
/// matching WGSL `mat4x4<f32>`).  The camera basis vectors feed the particle
/// billboard expansion; near/far feed the depth linearization.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub camera_near: f32,
    pub camera_right: [f32; 3],
    pub camera_far: f32,
    pub camera_up: [f32; 3],
    pub _pad: f32,
}

impl SceneUniforms {
    pub fn new(camera: &Camera, aspect: f32, model: Mat4) -> Self {
        let (right, up) = camera.billboard_basis();
        Self {
            view_proj: camera.view_proj(aspect).to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            camera_pos: camera.eye().to_array(),
            camera_near: camera.near,
            camera_right: right.to_array(),
            camera_far: camera.far,
            camera_up: up.to_array(),
            _pad: 0.0,
        }
    }
}

/// Skin-composite uniform block.  `roughness` and `metalness` are part of
/// the documented uniform schema; the current approximation carries them
/// without sampling them.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkinUniforms {
    pub light_direction: [f32; 3],
    pub subsurface_scattering: f32,
    pub light_color: [f32; 3],
    pub roughness: f32,
    pub skin_color: [f32; 3],
    pub metalness: f32,
}

impl SkinUniforms {
    pub fn new(config: &SkinShaderConfig) -> Self {
        let cfg = config.clone().clamped();
        Self {
            light_direction: cfg.light_direction.normalize_or_zero().to_array(),
            subsurface_scattering: cfg.subsurface_scattering,
            light_color: cfg.light_color.0,
            roughness: cfg.roughness,
            skin_color: cfg.skin_color.0,
            metalness: cfg.metalness,
        }
    }
}

// ── UniformSync ─────────────────────────────────────────────────────────────

/// Owns the scene and skin uniform buffers and pushes fresh values into
/// them once per frame.
///
/// [`sync`](Self::sync) must run after the off-screen passes are submitted
/// and before the composite encoder is built: `write_buffer` is ordered
/// ahead of subsequent submissions, so the composite pass reads the current
/// frame's camera planes rather than last frame's.
pub struct UniformSync {
    scene_buffer: wgpu::Buffer,
    skin_buffer: wgpu::Buffer,
    pub scene_bind_group: wgpu::BindGroup,
    pub skin_bind_group: wgpu::BindGroup,
}

impl UniformSync {
    pub fn new(
        device: &wgpu::Device,
        scene_layout: &wgpu::BindGroupLayout,
        skin_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene_uniforms"),
            contents: bytemuck::bytes_of(&SceneUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let skin_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skin_uniforms"),
            contents: bytemuck::bytes_of(&SkinUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bg"),
            layout: scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });
        let skin_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skin_bg"),
            layout: skin_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: skin_buffer.as_entire_binding(),
            }],
        });

        Self {
            scene_buffer,
            skin_buffer,
            scene_bind_group,
            skin_bind_group,
        }
    }

    /// Write this frame's camera planes and skin parameters.
    pub fn sync(
        &self,
        queue: &wgpu::Queue,
        camera: &Camera,
        aspect: f32,
        skin_config: &SkinShaderConfig,
        model: Mat4,
    ) {
        let scene = SceneUniforms::new(camera, aspect, model);
        queue.write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(&scene));

        let skin = SkinUniforms::new(skin_config);
        queue.write_buffer(&self.skin_buffer, 0, bytemuck::bytes_of(&skin));
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_uniforms_are_176_bytes() {
        // Matches the WGSL struct layout (two mat4x4 + three padded vec3s).
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 176);
    }

    #[test]
    fn skin_uniforms_are_48_bytes() {
        assert_eq!(std::mem::size_of::<SkinUniforms>(), 48);
    }

    #[test]
    fn skin_uniforms_normalize_light_direction() {
        let cfg = SkinShaderConfig::default();
        let u = SkinUniforms::new(&cfg);
        let len: f32 = u
            .light_direction
            .iter()
            .map(|c| c * c)
            .sum::<f32>()
            .sqrt();
        assert!((len - 1.0).abs() < 1e-4);
    }

    #[test]
    fn skin_uniforms_clamp_out_of_range_scalars() {
        let cfg = SkinShaderConfig {
            subsurface_scattering: 4.0,
            roughness: -1.0,
            ..Default::default()
        };
        let u = SkinUniforms::new(&cfg);
        assert_eq!(u.subsurface_scattering, 1.0);
        assert_eq!(u.roughness, 0.0);
    }
}
