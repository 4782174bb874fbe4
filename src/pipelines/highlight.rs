//! Subset override material.
//!
//! Highlighted/selected subsets are drawn over the model with alpha blending
//! and the depth test disabled, so picked elements read through occluding
//! geometry the way the original viewer's override material did.

use crate::{
    data_structures::{mesh::ModelVertex, texture::Texture},
    pipelines::mk_render_pipeline,
};

/// Layout for the subset color uniform (one `vec4<f32>` per material
/// category).
pub fn color_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
        label: Some("highlight_color_layout"),
    })
}

pub fn mk_highlight_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    color_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Highlight Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout, color_bind_group_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Highlight Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("highlight.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &render_pipeline_layout,
        config.format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        Some(wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Always,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        wgpu::PrimitiveTopology::TriangleList,
        &[ModelVertex::desc()],
        shader,
    )
}
