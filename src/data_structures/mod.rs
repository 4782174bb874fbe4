//! Viewer data structures: meshes, textures and the spatial-structure tree.
//!
//! - `mesh` contains the decoded triangle data and its GPU upload
//! - `structure` is the hierarchical spatial decomposition of a model
//! - `texture` holds the depth-attachment helper

pub mod mesh;
pub mod structure;
pub mod texture;
