//! Render pipeline definitions.
//!
//! Three fixed pipelines cover the whole viewer: `model` for opaque decoded
//! geometry, `highlight` for the subset override material, `grid` for the
//! line helpers. All share one pipeline constructor so blend/depth/topology
//! differences stay visible in one place.

pub mod grid;
pub mod highlight;
pub mod model;

/// All pipelines plus the layout the highlight color bind groups are built
/// against.
#[derive(Debug)]
pub struct Pipelines {
    pub model: wgpu::RenderPipeline,
    pub highlight: wgpu::RenderPipeline,
    pub grid: wgpu::RenderPipeline,
    pub highlight_color_layout: wgpu::BindGroupLayout,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        light_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let highlight_color_layout = highlight::color_layout(device);
        Self {
            model: model::mk_model_pipeline(
                device,
                config,
                camera_bind_group_layout,
                light_bind_group_layout,
            ),
            highlight: highlight::mk_highlight_pipeline(
                device,
                config,
                camera_bind_group_layout,
                &highlight_color_layout,
            ),
            grid: grid::mk_grid_pipeline(device, config, camera_bind_group_layout),
            highlight_color_layout,
        }
    }
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_stencil: Option<wgpu::DepthStencilState>,
    topology: wgpu::PrimitiveTopology,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // IFC exports mix winding orders, so nothing is culled.
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
