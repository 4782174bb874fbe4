//! Application event loop.
//!
//! One winit [`ApplicationHandler`] owns the whole viewer: GPU context, scene
//! state, pick session and tree menu. Asynchronous work (file dialogs and
//! decodes) leaves the loop as spawned tasks and re-enters it through
//! [`ViewerEvent`]s on the event-loop proxy, so all state mutation happens on
//! the UI thread.
//!
//! Interaction policy: moving the pointer previews the element under it as a
//! highlight, a left click makes it the persistent selection, a right drag
//! orbits, the wheel zooms. `O` opens the file dialog, `H` restores the home
//! view, `G` and `X` toggle the grid and axes helpers.

use std::fmt::Debug;
use std::sync::Arc;

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use crate::{
    context::{Context, DEFAULT_EYE, DEFAULT_TARGET},
    decode::{DecodeError, DecodedModel},
    error::ViewerError,
    loader::{ModelLoader, SharedDecoder},
    pick::PickSession,
    render::SceneRenderer,
    scene::{ModelId, Scene},
    tree_menu::TreeMenu,
    viewport::Viewport,
};

/// Events delivered through the event-loop proxy.
pub enum ViewerEvent {
    /// The user picked a file; its bytes are already read.
    FileChosen { name: String, bytes: Vec<u8> },
    /// A decode finished, successfully or not.
    Decoded {
        name: String,
        result: Result<DecodedModel, DecodeError>,
    },
    /// GPU initialization finished (web only, where `resumed` cannot block).
    #[cfg(target_arch = "wasm32")]
    ContextReady(Box<AppState>),
}

impl Debug for ViewerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileChosen { name, bytes } => f
                .debug_struct("FileChosen")
                .field("name", name)
                .field("bytes", &bytes.len())
                .finish(),
            Self::Decoded { name, result } => f
                .debug_struct("Decoded")
                .field("name", name)
                .field("ok", &result.is_ok())
                .finish(),
            #[cfg(target_arch = "wasm32")]
            Self::ContextReady(_) => f.write_str("ContextReady"),
        }
    }
}

/// Per-frame results that the event loop acts on after drawing.
#[derive(Debug, Default)]
struct FrameFeedback {
    open_file: bool,
}

/// Everything that exists once the GPU context is up.
pub struct AppState {
    pub(crate) ctx: Context,
    pub(crate) scene: Scene,
    renderer: SceneRenderer,
    session: PickSession,
    tree: TreeMenu,
    tree_model: Option<ModelId>,
    viewport: Viewport,
    pointer: Option<PhysicalPosition<f64>>,
    orbiting: bool,
    loading: bool,
    is_surface_configured: bool,
    #[cfg(feature = "ui")]
    ui: crate::ui::UiLayer,
}

impl AppState {
    async fn new(window: Arc<Window>) -> Result<Self, ViewerError> {
        let size = window.inner_size();
        let viewport = Viewport::new(size.width, size.height, window.scale_factor());
        let ctx = Context::new(window, viewport.surface_size())
            .await
            .map_err(|e| ViewerError::Gpu(e.to_string()))?;
        let renderer = SceneRenderer::new(&ctx);
        #[cfg(feature = "ui")]
        let ui = crate::ui::UiLayer::new(&ctx);
        Ok(Self {
            ctx,
            scene: Scene::new(),
            renderer,
            session: PickSession::new(),
            tree: TreeMenu::new(),
            tree_model: None,
            viewport,
            pointer: None,
            orbiting: false,
            loading: false,
            is_surface_configured: false,
            #[cfg(feature = "ui")]
            ui,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.viewport.resize(width, height) {
            self.reconfigure();
        }
    }

    fn reconfigure(&mut self) {
        self.ctx
            .projection
            .resize(self.viewport.width(), self.viewport.height());
        self.ctx.resize(self.viewport.surface_size());
        self.is_surface_configured = true;
    }

    fn render(&mut self) -> Result<FrameFeedback, wgpu::SurfaceError> {
        self.ctx.window.request_redraw();

        if !self.is_surface_configured {
            return Ok(FrameFeedback::default());
        }

        #[allow(unused_mut)]
        let mut feedback = FrameFeedback::default();

        #[cfg(feature = "ui")]
        {
            let out = self.ui.begin_frame(
                &self.ctx,
                &mut self.scene,
                &mut self.session,
                &mut self.tree,
                self.tree_model,
                self.loading,
            );
            feedback.open_file = out.open_file;
        }

        self.renderer.prepare(&self.ctx, &self.scene);

        #[cfg(feature = "ui")]
        {
            let ui = &mut self.ui;
            let mut overlay =
                |ctx: &Context, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView| {
                    ui.paint(ctx, encoder, view);
                };
            self.renderer
                .render(&self.ctx, &self.scene, Some(&mut overlay))?;
        }
        #[cfg(not(feature = "ui"))]
        self.renderer.render(&self.ctx, &self.scene, None)?;

        Ok(feedback)
    }
}

impl Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("models", &self.scene.models().len())
            .field("viewport", &self.viewport)
            .finish()
    }
}

pub struct ViewerApp {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<ViewerEvent>,
    state: Option<AppState>,
    loader: ModelLoader,
    last_time: Instant,
}

impl ViewerApp {
    fn new(event_loop: &EventLoop<ViewerEvent>, decoder: SharedDecoder) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            state: None,
            loader: ModelLoader::new(decoder),
            last_time: Instant::now(),
        })
    }

    /// Open the async file dialog and forward the chosen file into the event
    /// loop. Cancelling the dialog is a no-op.
    fn spawn_file_dialog(&self) {
        let proxy = self.proxy.clone();
        let task = async move {
            let file = rfd::AsyncFileDialog::new()
                .add_filter("IFC model", &["ifc"])
                .pick_file()
                .await;
            if let Some(file) = file {
                let name = file.file_name();
                let bytes = file.read().await;
                if proxy
                    .send_event(ViewerEvent::FileChosen { name, bytes })
                    .is_err()
                {
                    log::error!("event loop closed before the chosen file was delivered");
                }
            }
        };

        // The dialog future is not Send on every platform, so it gets its
        // own thread rather than a tokio task.
        #[cfg(not(target_arch = "wasm32"))]
        std::thread::spawn(move || futures::executor::block_on(task));
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(task);
    }

    fn handle_key(&mut self, code: KeyCode) {
        if code == KeyCode::KeyO {
            self.spawn_file_dialog();
            return;
        }
        let Some(state) = &mut self.state else {
            return;
        };
        match code {
            KeyCode::KeyH => {
                state
                    .ctx
                    .camera
                    .controller
                    .look_from(DEFAULT_EYE, DEFAULT_TARGET);
            }
            KeyCode::KeyG => state.scene.show_grid = !state.scene.show_grid,
            KeyCode::KeyX => state.scene.show_axes = !state.scene.show_axes,
            _ => {}
        }
    }
}

impl ApplicationHandler<ViewerEvent> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("ifc-view");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "three-canvas";

            let canvas = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(CANVAS_ID))
                .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok());
            match canvas {
                Some(canvas) => {
                    window_attributes = window_attributes.with_canvas(Some(canvas));
                }
                None => {
                    log::error!("{}", ViewerError::StartupBinding(CANVAS_ID));
                    event_loop.exit();
                    return;
                }
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("window creation failed: {}", e);
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(AppState::new(window)) {
                Ok(mut state) => {
                    let size = state.ctx.window.inner_size();
                    state.resize(size.width, size.height);
                    state.ctx.window.request_redraw();
                    self.state = Some(state);
                }
                Err(e) => {
                    log::error!("viewer initialization failed: {}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match AppState::new(window).await {
                    Ok(state) => {
                        assert!(
                            proxy
                                .send_event(ViewerEvent::ContextReady(Box::new(state)))
                                .is_ok()
                        );
                    }
                    Err(e) => log::error!("viewer initialization failed: {}", e),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            #[cfg(target_arch = "wasm32")]
            ViewerEvent::ContextReady(state) => {
                let mut state = *state;
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
                state.ctx.window.request_redraw();
                self.state = Some(state);
            }
            ViewerEvent::FileChosen { name, bytes } => {
                self.loader.spawn_decode(
                    name,
                    bytes,
                    self.proxy.clone(),
                    #[cfg(not(target_arch = "wasm32"))]
                    &self.async_runtime,
                );
            }
            ViewerEvent::Decoded { name, result } => {
                self.loader.finish();
                let Some(state) = &mut self.state else {
                    return;
                };
                match result {
                    Ok(model) => {
                        let AppState {
                            scene,
                            tree,
                            tree_model,
                            ..
                        } = state;
                        let id = scene.add_model(model);
                        if let Some(structure) =
                            scene.model(id).and_then(|loaded| loaded.structure.as_ref())
                        {
                            tree.build(structure);
                            *tree_model = Some(id);
                            log::info!(
                                "loaded `{}`: {} structure nodes",
                                name,
                                structure.node_count()
                            );
                        } else {
                            log::info!("loaded `{}`", name);
                        }
                    }
                    // A rejected decode leaves the scene untouched.
                    Err(e) => log::error!("failed to load `{}`: {}", name, e),
                }
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if state.orbiting {
                state.ctx.camera.controller.handle_mouse(dx, dy);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        #[cfg(feature = "ui")]
        let pointer_free = !state
            .ui
            .on_window_event(&state.ctx.window, &event)
            .consumed;
        #[cfg(not(feature = "ui"))]
        let pointer_free = true;

        if pointer_free {
            state.ctx.camera.controller.handle_window_events(&event);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                state.viewport.set_scale_factor(scale_factor);
                state.reconfigure();
            }
            WindowEvent::CursorMoved { position, .. } => {
                state.pointer = Some(position);
                if pointer_free && !state.orbiting {
                    let bounds = (state.viewport.width(), state.viewport.height());
                    let _ = state.session.pick_at(
                        &mut state.scene,
                        position,
                        bounds,
                        &state.ctx.camera.camera,
                        &state.ctx.projection,
                    );
                }
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => match (button, button_state.is_pressed()) {
                (MouseButton::Left, true) => {
                    if pointer_free {
                        if let Some(pointer) = state.pointer {
                            let bounds = (state.viewport.width(), state.viewport.height());
                            let _ = state.session.select_at(
                                &mut state.scene,
                                pointer,
                                bounds,
                                &state.ctx.camera.camera,
                                &state.ctx.projection,
                            );
                        }
                    }
                }
                (MouseButton::Right, true) => state.orbiting = true,
                (_, false) => state.orbiting = false,
                _ => {}
            },
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if pointer_free {
                    self.handle_key(code);
                }
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                state.loading = self.loader.in_flight() > 0;

                let camera = &mut state.ctx.camera;
                camera.controller.update(&mut camera.camera, dt);
                camera
                    .uniform
                    .update_view_proj(&camera.camera, &state.ctx.projection);
                state.ctx.queue.write_buffer(
                    &camera.buffer,
                    0,
                    bytemuck::cast_slice(&[camera.uniform]),
                );

                match state.render() {
                    Ok(feedback) => {
                        if feedback.open_file {
                            self.spawn_file_dialog();
                        }
                    }
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.reconfigure();
                    }
                    Err(e) => log::error!("unable to render: {}", e),
                }
            }
            _ => {}
        }
    }
}

/// Build the event loop and run the viewer until the window closes.
pub fn run(decoder: SharedDecoder) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            eprintln!("could not initialize logger: {}", e);
        }
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;
    let mut app = ViewerApp::new(&event_loop, decoder)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
