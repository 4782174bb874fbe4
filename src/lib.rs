//! ifc-view
//!
//! A minimal cross-platform IFC model viewer built on wgpu and winit, for
//! native windows and the web alike. The crate renders loaded building models
//! into a single viewport with orbit navigation, resolves pointer input to
//! the IFC element under the cursor and mirrors the model's spatial structure
//! into a collapsible tree menu. IFC parsing itself is delegated to an
//! external decoder behind the [`decode::IfcDecoder`] trait.
//!
//! High-level modules
//! - `app`: winit application handler, event plumbing and the `run` entry
//! - `camera`: camera, projection and the damped orbit controller
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: mesh, spatial structure and texture types
//! - `decode`: the asynchronous decoder seam and its data model
//! - `loader`: asynchronous decode scheduling
//! - `pick`: ray picking and highlight/selection state
//! - `pipelines`: render pipeline definitions (model, highlight, grid)
//! - `render`: scene-to-GPU synchronization and frame drawing
//! - `scene`: loaded models and override-material subsets
//! - `tree_menu`: flat widget model of the spatial structure tree
//! - `viewport`: window dimensions and device pixel ratio
//!

pub mod app;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod decode;
pub mod error;
pub mod loader;
pub mod pick;
pub mod pipelines;
pub mod render;
pub mod scene;
pub mod tree_menu;
pub mod viewport;

#[cfg(feature = "ui")]
pub mod ui;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::dpi::PhysicalPosition;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
pub use wgpu::*;
