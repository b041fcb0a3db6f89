use crate::geometry::Vertex;

// ── RenderMode ──────────────────────────────────────────────────────────────

/// Which program the composite pass displays on the default target.
///
/// `Depth` and `Normal` show the corresponding single-pass program directly
/// (no composite math); `Skin` and `Combined` both select the skin-composite
/// program, which samples the off-screen depth and normal targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderMode {
    Depth,
    Normal,
    Skin,
    Combined,
}

impl RenderMode {
    /// The program this mode draws the subject mesh with.  Exhaustive by
    /// construction — adding a mode without a program is a compile error.
    pub fn program(self) -> ProgramKind {
        match self {
            RenderMode::Depth => ProgramKind::Depth,
            RenderMode::Normal => ProgramKind::Normal,
            RenderMode::Skin | RenderMode::Combined => ProgramKind::Skin,
        }
    }
}

/// One of the three closed shader programs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProgramKind {
    Depth,
    Normal,
    Skin,
}

// ── HeadPrograms ────────────────────────────────────────────────────────────

/// The three mesh programs and the bind group layouts they share.
///
/// All three render into the same color format (the surface format — the
/// off-screen targets are allocated with it too), so a single pipeline per
/// program serves both the off-screen passes and the composite display.
pub struct HeadPrograms {
    pub depth: wgpu::RenderPipeline,
    pub normal: wgpu::RenderPipeline,
    pub skin: wgpu::RenderPipeline,
    /// Group 0: scene uniforms (every program).
    pub scene_bind_group_layout: wgpu::BindGroupLayout,
    /// Group 1: skin uniforms (skin program only).
    pub skin_bind_group_layout: wgpu::BindGroupLayout,
    /// Group 2: depth + normal textures and their sampler (skin program only).
    pub composite_bind_group_layout: wgpu::BindGroupLayout,
}

impl HeadPrograms {
    pub fn get(&self, kind: ProgramKind) -> &wgpu::RenderPipeline {
        match kind {
            ProgramKind::Depth => &self.depth,
            ProgramKind::Normal => &self.normal,
            ProgramKind::Skin => &self.skin,
        }
    }
}

pub fn create_head_programs(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
) -> HeadPrograms {
    let scene_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

    let skin_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skin_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

    let composite_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("composite_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

    let depth = create_mesh_pipeline(
        device,
        "depth_program",
        include_str!("shaders/depth.wgsl"),
        &[&scene_bind_group_layout],
        color_format,
    );
    let normal = create_mesh_pipeline(
        device,
        "normal_program",
        include_str!("shaders/normal.wgsl"),
        &[&scene_bind_group_layout],
        color_format,
    );
    let skin = create_mesh_pipeline(
        device,
        "skin_program",
        include_str!("shaders/skin.wgsl"),
        &[
            &scene_bind_group_layout,
            &skin_bind_group_layout,
            &composite_bind_group_layout,
        ],
        color_format,
    );

    HeadPrograms {
        depth,
        normal,
        skin,
        scene_bind_group_layout,
        skin_bind_group_layout,
        composite_bind_group_layout,
    }
}

fn create_mesh_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader_source: &str,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(shader_source.into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{}_layout", label)),
        bind_group_layouts,
        ..Default::default()
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

// ── Tests ───────────────────────────────────────────────────────────────────
