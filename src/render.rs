//! Frame preparation and drawing.
//!
//! `SceneRenderer` mirrors the CPU-side [`Scene`](crate::scene::Scene) into
//! GPU buffers. Model meshes upload once on first sight, subset index buffers
//! re-upload only when the scene-side generation counter moves, and the grid
//! and axis helpers are built a single time at startup.

use std::collections::HashMap;
use std::iter;

use wgpu::util::DeviceExt;

use crate::{
    context::Context,
    data_structures::mesh::{GpuMesh, LineVertex},
    scene::{ModelId, Scene, SubsetKind},
};

/// Side length of the ground grid in scene units.
const GRID_SIZE: f32 = 50.0;
const GRID_DIVISIONS: u32 = 30;
const AXIS_LENGTH: f32 = 5.0;

/// Hover highlight, the original viewer's pink (0xff88ff at 0.6 alpha).
const HIGHLIGHT_COLOR: [f32; 4] = [1.0, 0.533, 1.0, 0.6];
const SELECTION_COLOR: [f32; 4] = [0.45, 0.75, 1.0, 0.8];

#[derive(Debug)]
struct GpuSubset {
    index_buffer: wgpu::Buffer,
    num_indices: u32,
    generation: u64,
}

#[derive(Debug)]
struct LineBuffer {
    vertex_buffer: wgpu::Buffer,
    num_vertices: u32,
}

impl LineBuffer {
    fn upload(device: &wgpu::Device, label: &str, vertices: &[LineVertex]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            vertex_buffer,
            num_vertices: vertices.len() as u32,
        }
    }
}

#[derive(Debug)]
pub struct SceneRenderer {
    meshes: HashMap<ModelId, GpuMesh>,
    subsets: HashMap<(ModelId, SubsetKind), GpuSubset>,
    grid: LineBuffer,
    axes: LineBuffer,
    highlight_color: wgpu::BindGroup,
    selection_color: wgpu::BindGroup,
}

impl SceneRenderer {
    pub fn new(ctx: &Context) -> Self {
        let grid = LineBuffer::upload(
            &ctx.device,
            "Grid Buffer",
            &grid_vertices(GRID_SIZE, GRID_DIVISIONS),
        );
        let axes = LineBuffer::upload(&ctx.device, "Axes Buffer", &axes_vertices(AXIS_LENGTH));

        let highlight_color = mk_color_group(ctx, HIGHLIGHT_COLOR, "highlight_color_bind_group");
        let selection_color = mk_color_group(ctx, SELECTION_COLOR, "selection_color_bind_group");

        Self {
            meshes: HashMap::new(),
            subsets: HashMap::new(),
            grid,
            axes,
            highlight_color,
            selection_color,
        }
    }

    /// Syncs GPU buffers with the scene. Cheap when nothing changed.
    pub fn prepare(&mut self, ctx: &Context, scene: &Scene) {
        for model in scene.models() {
            if !self.meshes.contains_key(&model.id) {
                self.meshes
                    .insert(model.id, GpuMesh::upload(&ctx.device, &model.name, &model.mesh));
            }
        }

        self.subsets
            .retain(|key, _| scene.subset(key.0, key.1).is_some_and(|s| !s.indices.is_empty()));

        for (key, subset) in scene.subsets() {
            if subset.indices.is_empty() {
                continue;
            }
            let stale = self
                .subsets
                .get(key)
                .is_none_or(|gpu| gpu.generation != subset.generation);
            if stale {
                let index_buffer =
                    ctx.device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("Subset Index Buffer"),
                            contents: bytemuck::cast_slice(&subset.indices),
                            usage: wgpu::BufferUsages::INDEX,
                        });
                self.subsets.insert(
                    *key,
                    GpuSubset {
                        index_buffer,
                        num_indices: subset.indices.len() as u32,
                        generation: subset.generation,
                    },
                );
            }
        }
    }

    /// Draws one frame. The optional overlay closure gets the frame encoder
    /// after the scene pass, before submission.
    pub fn render(
        &mut self,
        ctx: &Context,
        scene: &Scene,
        overlay: Option<&mut dyn FnMut(&Context, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&ctx.pipelines.model);
            render_pass.set_bind_group(0, &ctx.camera.bind_group, &[]);
            render_pass.set_bind_group(1, &ctx.light.bind_group, &[]);
            for model in scene.models() {
                if let Some(mesh) = self.meshes.get(&model.id) {
                    render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    render_pass
                        .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..mesh.num_indices, 0, 0..1);
                }
            }

            render_pass.set_pipeline(&ctx.pipelines.grid);
            render_pass.set_bind_group(0, &ctx.camera.bind_group, &[]);
            if scene.show_grid {
                render_pass.set_vertex_buffer(0, self.grid.vertex_buffer.slice(..));
                render_pass.draw(0..self.grid.num_vertices, 0..1);
            }
            if scene.show_axes {
                render_pass.set_vertex_buffer(0, self.axes.vertex_buffer.slice(..));
                render_pass.draw(0..self.axes.num_vertices, 0..1);
            }

            // Subsets draw last with the depth test off so the picked
            // element stays readable behind other geometry.
            render_pass.set_pipeline(&ctx.pipelines.highlight);
            render_pass.set_bind_group(0, &ctx.camera.bind_group, &[]);
            for ((model_id, kind), subset) in &self.subsets {
                let Some(mesh) = self.meshes.get(model_id) else {
                    continue;
                };
                let color = match kind {
                    SubsetKind::Highlight => &self.highlight_color,
                    SubsetKind::Selection => &self.selection_color,
                };
                render_pass.set_bind_group(1, color, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(subset.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..subset.num_indices, 0, 0..1);
            }
        }

        if let Some(overlay) = overlay {
            overlay(ctx, &mut encoder, &view);
        }

        ctx.queue.submit(iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn mk_color_group(ctx: &Context, color: [f32; 4], label: &str) -> wgpu::BindGroup {
    let buffer = ctx
        .device
        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&color),
            usage: wgpu::BufferUsages::UNIFORM,
        });
    ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &ctx.pipelines.highlight_color_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some(label),
    })
}

fn grid_vertices(size: f32, divisions: u32) -> Vec<LineVertex> {
    let half = size / 2.0;
    let step = size / divisions as f32;
    let colour = [0.3, 0.32, 0.36];
    let mut vertices = Vec::with_capacity(((divisions + 1) * 4) as usize);
    for i in 0..=divisions {
        let offset = -half + i as f32 * step;
        vertices.push(LineVertex {
            position: [offset, 0.0, -half],
            color: colour,
        });
        vertices.push(LineVertex {
            position: [offset, 0.0, half],
            color: colour,
        });
        vertices.push(LineVertex {
            position: [-half, 0.0, offset],
            color: colour,
        });
        vertices.push(LineVertex {
            position: [half, 0.0, offset],
            color: colour,
        });
    }
    vertices
}

fn axes_vertices(length: f32) -> Vec<LineVertex> {
    let origin = [0.0, 0.0, 0.0];
    vec![
        LineVertex {
            position: origin,
            color: [1.0, 0.2, 0.2],
        },
        LineVertex {
            position: [length, 0.0, 0.0],
            color: [1.0, 0.2, 0.2],
        },
        LineVertex {
            position: origin,
            color: [0.2, 1.0, 0.2],
        },
        LineVertex {
            position: [0.0, length, 0.0],
            color: [0.2, 1.0, 0.2],
        },
        LineVertex {
            position: origin,
            color: [0.3, 0.4, 1.0],
        },
        LineVertex {
            position: [0.0, 0.0, length],
            color: [0.3, 0.4, 1.0],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_line_count_matches_divisions() {
        let vertices = grid_vertices(50.0, 30);
        // 31 lines per direction, two vertices each
        assert_eq!(vertices.len(), 31 * 2 * 2);
    }

    #[test]
    fn grid_spans_are_symmetric() {
        let vertices = grid_vertices(50.0, 30);
        for v in &vertices {
            assert!(v.position[0] >= -25.0 - 1e-4 && v.position[0] <= 25.0 + 1e-4);
            assert!(v.position[2] >= -25.0 - 1e-4 && v.position[2] <= 25.0 + 1e-4);
            assert_eq!(v.position[1], 0.0);
        }
    }

    #[test]
    fn axes_are_three_lines_from_origin() {
        let vertices = axes_vertices(5.0);
        assert_eq!(vertices.len(), 6);
        for pair in vertices.chunks(2) {
            assert_eq!(pair[0].position, [0.0, 0.0, 0.0]);
        }
    }
}
