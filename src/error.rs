//! Viewer failure taxonomy.
//!
//! Errors fall into two camps: startup binding failures which abort
//! initialization, and runtime failures (decode rejections, property lookups)
//! which are logged and tolerated without touching the scene.

use crate::decode::DecodeError;

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// A required host element (e.g. the `three-canvas` element on the web)
    /// could not be bound at startup. Unrecoverable.
    #[error("required host element `{0}` is missing")]
    StartupBinding(&'static str),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("gpu initialization failed: {0}")]
    Gpu(String),
}
