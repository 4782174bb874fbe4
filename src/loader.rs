//! Asynchronous model loading.
//!
//! Decodes run off the UI thread (a tokio task on native, `spawn_local` on
//! the web) and re-enter the event loop as [`ViewerEvent::Decoded`]. Nothing
//! blocks, nothing is cancelled: kicking off a second load while one is in
//! flight simply means both results arrive eventually, each appending its
//! model to the scene.

use std::sync::Arc;

use winit::event_loop::EventLoopProxy;

use crate::{app::ViewerEvent, decode::IfcDecoder};

#[cfg(not(target_arch = "wasm32"))]
pub type SharedDecoder = Arc<dyn IfcDecoder + Send + Sync>;
#[cfg(target_arch = "wasm32")]
pub type SharedDecoder = Arc<dyn IfcDecoder>;

pub struct ModelLoader {
    decoder: SharedDecoder,
    in_flight: u32,
}

impl ModelLoader {
    pub fn new(decoder: SharedDecoder) -> Self {
        Self {
            decoder,
            in_flight: 0,
        }
    }

    /// Number of decodes started but not yet delivered.
    pub fn in_flight(&self) -> u32 {
        self.in_flight
    }

    /// Start decoding `bytes` and deliver the outcome as a user event. The
    /// mesh is validated before delivery so the event handler only ever sees
    /// geometry the renderer and picker can trust.
    pub fn spawn_decode(
        &mut self,
        name: String,
        bytes: Vec<u8>,
        proxy: EventLoopProxy<ViewerEvent>,
        #[cfg(not(target_arch = "wasm32"))] runtime: &tokio::runtime::Runtime,
    ) {
        log::info!("decoding `{}` ({} bytes)", name, bytes.len());
        self.in_flight += 1;
        let future = self.decoder.decode(bytes);
        let task = async move {
            let result = future
                .await
                .and_then(|model| model.mesh.validate().map(|()| model));
            if proxy
                .send_event(ViewerEvent::Decoded { name, result })
                .is_err()
            {
                log::error!("event loop closed before a decode could be delivered");
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        runtime.spawn(task);
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(task);
    }

    /// Book-keeping counterpart of [`spawn_decode`](Self::spawn_decode),
    /// called when its event arrives.
    pub fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}
