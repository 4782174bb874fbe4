//! egui overlay.
//!
//! One left side panel hosts the open-file button and the spatial structure
//! tree. The overlay runs in two halves per frame: `begin_frame` executes the
//! UI (and may mutate scene and pick state through the tree panel) before the
//! scene renderer prepares its buffers, `paint` then draws the tessellated
//! output into the frame encoder after the scene pass.

mod tree_panel;

use crate::{
    context::Context,
    pick::PickSession,
    scene::{ModelId, Scene},
    tree_menu::TreeMenu,
};

/// What the UI asked for this frame.
#[derive(Debug, Default)]
pub struct UiFrameOutput {
    pub open_file: bool,
}

struct PreparedFrame {
    primitives: Vec<egui::ClippedPrimitive>,
    screen: egui_wgpu::ScreenDescriptor,
    free: Vec<egui::TextureId>,
}

pub struct UiLayer {
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    frame: Option<PreparedFrame>,
}

impl UiLayer {
    pub fn new(ctx: &Context) -> Self {
        let egui_ctx = egui::Context::default();
        let state = egui_winit::State::new(
            egui_ctx,
            egui::ViewportId::ROOT,
            ctx.window.as_ref(),
            Some(ctx.window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(
            &ctx.device,
            ctx.config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: false,
                ..Default::default()
            },
        );
        Self {
            state,
            renderer,
            frame: None,
        }
    }

    /// Feed a window event to egui. When the response reports the event as
    /// consumed the pointer was over the panel and scene picking must skip it.
    pub fn on_window_event(
        &mut self,
        window: &winit::window::Window,
        event: &winit::event::WindowEvent,
    ) -> egui_winit::EventResponse {
        self.state.on_window_event(window, event)
    }

    pub fn begin_frame(
        &mut self,
        ctx: &Context,
        scene: &mut Scene,
        session: &mut PickSession,
        tree: &mut TreeMenu,
        tree_model: Option<ModelId>,
        loading: bool,
    ) -> UiFrameOutput {
        let raw_input = self.state.take_egui_input(&ctx.window);
        let mut open_file = false;
        let egui_ctx = self.state.egui_ctx().clone();
        let full_output = egui_ctx.run(raw_input, |egui_ctx| {
            egui::SidePanel::left("structure_panel")
                .resizable(true)
                .default_width(260.0)
                .show(egui_ctx, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("Open IFC file").clicked() {
                            open_file = true;
                        }
                        if loading {
                            ui.spinner();
                        }
                    });
                    ui.separator();
                    match tree_model {
                        Some(model) if !tree.is_empty() => {
                            tree_panel::tree_panel(ui, scene, session, tree, model);
                        }
                        _ => {
                            ui.weak("No model loaded");
                        }
                    }
                });
        });
        self.state
            .handle_platform_output(&ctx.window, full_output.platform_output);

        for (id, delta) in &full_output.textures_delta.set {
            self.renderer
                .update_texture(&ctx.device, &ctx.queue, *id, delta);
        }
        let primitives = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        self.frame = Some(PreparedFrame {
            primitives,
            screen: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [ctx.config.width, ctx.config.height],
                pixels_per_point: full_output.pixels_per_point,
            },
            free: full_output.textures_delta.free,
        });

        UiFrameOutput { open_file }
    }

    /// Draw the frame prepared by the preceding `begin_frame` call.
    pub fn paint(
        &mut self,
        ctx: &Context,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) {
        let Some(frame) = self.frame.take() else {
            return;
        };
        self.renderer.update_buffers(
            &ctx.device,
            &ctx.queue,
            encoder,
            &frame.primitives,
            &frame.screen,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Ui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            self.renderer
                .render(&mut pass, &frame.primitives, &frame.screen);
        }
        for id in &frame.free {
            self.renderer.free_texture(id);
        }
    }
}
