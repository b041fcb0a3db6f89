use crate::particles::buffer::ParticleBuffers;

// ── ParticleInstance ────────────────────────────────────────────────────────

/// Per-instance GPU data for one particle quad — the four flat attribute
/// arrays interleaved.  Matches the WGSL `Instance` struct.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub size: f32,
    pub alpha: f32,
}

impl ParticleInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,  // position
        1 => Float32x3,  // color
        2 => Float32,    // size
        3 => Float32,    // alpha
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

// ── ParticlePass ────────────────────────────────────────────────────────────

/// Point-sprite particle draw: six vertices per instance expanded into a
/// camera-facing quad in the vertex stage, additive blending, depth-tested
/// against the scene but never writing depth.
///
/// The instance buffer is persistent and grows in power-of-two steps (min
/// 256 instances); per-frame uploads overwrite the live prefix, so a steady
/// pool never reallocates.
pub struct ParticlePass {
    pipeline: wgpu::RenderPipeline,
    instance_buffer: Option<wgpu::Buffer>,
    /// Number of ParticleInstance slots the current buffer can hold.
    capacity: u32,
    /// Instances uploaded for this frame.
    count: u32,
    /// Reused CPU staging for the interleave step.
    staging: Vec<ParticleInstance>,
}

impl ParticlePass {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        scene_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("particle_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/particle.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("particle_pipeline_layout"),
            bind_group_layouts: &[scene_bind_group_layout],
            ..Default::default()
        });

        // Additive blending: src·alpha added onto the destination.
        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("particle_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[ParticleInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(additive),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            instance_buffer: None,
            capacity: 0,
            count: 0,
            staging: Vec::new(),
        }
    }

    /// Interleave the four attribute arrays and upload them.  Index `i`
    /// across the arrays refers to the same particle; the builder guarantees
    /// coherent lengths (`3N, 3N, N, N`).
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, buffers: &ParticleBuffers) {
        let n = buffers.len();
        let positions = buffers.positions();
        let colors = buffers.colors();
        let sizes = buffers.sizes();
        let alphas = buffers.alphas();

        self.staging.clear();
        self.staging.reserve(n);
        for i in 0..n {
            self.staging.push(ParticleInstance {
                position: [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]],
                color: [colors[i * 3], colors[i * 3 + 1], colors[i * 3 + 2]],
                size: sizes[i],
                alpha: alphas[i],
            });
        }
        self.count = n as u32;

        if n == 0 {
            return;
        }

        if self.count > self.capacity || self.instance_buffer.is_none() {
            // Grow the buffer (next power-of-two, min 256 instances).
            let capacity = self.count.next_power_of_two().max(256);
            self.instance_buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("particle_instance_buffer"),
                size: capacity as u64 * std::mem::size_of::<ParticleInstance>() as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.capacity = capacity;
        }

        if let Some(buffer) = &self.instance_buffer {
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(&self.staging));
        }
    }

    /// Record the particle draw into an open render pass.  No-op when the
    /// last upload carried zero instances.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, scene_bind_group: &wgpu::BindGroup) {
        let Some(buffer) = &self.instance_buffer else {
            return;
        };
        if self.count == 0 {
            return;
        }
        let byte_len = self.count as u64 * std::mem::size_of::<ParticleInstance>() as u64;
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, scene_bind_group, &[]);
        pass.set_vertex_buffer(0, buffer.slice(..byte_len));
        pass.draw(0..6, 0..self.count);
    }
}
