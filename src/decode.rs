//! The IFC decoder seam.
//!
//! Parsing IFC and tessellating its geometry is delegated to an external
//! decoder (in the browser deployment a WASM decoding module served from a
//! fixed relative path). The viewer only depends on the narrow [`IfcDecoder`]
//! trait, so the orchestration is testable with a stub and the production
//! decoder can be swapped without touching any viewer code.
//!
//! A decode is a single asynchronous operation: it either resolves to a
//! [`DecodedModel`] or rejects with a [`DecodeError`]. Rejection leaves the
//! scene unchanged; there is no retry and no cancellation of in-flight
//! decodes.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::data_structures::{mesh::MeshData, structure::SpatialNode};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unparsable IFC input: {0}")]
    Unparsable(String),

    /// The external decoding module could not be found. In the browser this
    /// means the `wasm/` asset path is missing; every decode fails until the
    /// asset is deployed.
    #[error("decoder asset missing at `{0}`")]
    MissingAsset(String),

    #[error("inconsistent geometry from decoder: {0}")]
    Geometry(String),

    #[error("decoder failure: {0}")]
    Internal(String),
}

/// One descriptive property record of an element, as key/value pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyRecord {
    pub name: String,
    pub fields: Vec<(String, String)>,
}

/// Per-element property records extracted at decode time.
///
/// Lookups after decode are plain map reads; the asynchronous part of a
/// property fetch is only its delivery to the console, which is
/// fire-and-forget.
#[derive(Debug, Clone, Default)]
pub struct PropertyTable {
    records: HashMap<u32, PropertyRecord>,
    building: Option<u32>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, express_id: u32, record: PropertyRecord) {
        self.records.insert(express_id, record);
    }

    /// Mark `express_id` as the model's building record. Clicking anywhere in
    /// the model logs this record as a side effect.
    pub fn set_building(&mut self, express_id: u32) {
        self.building = Some(express_id);
    }

    pub fn get(&self, express_id: u32) -> Option<&PropertyRecord> {
        self.records.get(&express_id)
    }

    pub fn building_record(&self) -> Option<(u32, &PropertyRecord)> {
        let id = self.building?;
        Some((id, self.records.get(&id)?))
    }
}

/// Everything the decoder hands back for one file.
#[derive(Debug, Clone)]
pub struct DecodedModel {
    pub name: String,
    pub mesh: MeshData,
    pub structure: SpatialNode,
    pub properties: PropertyTable,
}

/// Future type returned by [`IfcDecoder::decode`]. Decodes run off the UI
/// thread on native targets, so the future must be `Send` there; on the web
/// everything stays on the single browser thread.
#[cfg(not(target_arch = "wasm32"))]
pub type DecodeFuture = Pin<Box<dyn Future<Output = Result<DecodedModel, DecodeError>> + Send>>;
#[cfg(target_arch = "wasm32")]
pub type DecodeFuture = Pin<Box<dyn Future<Output = Result<DecodedModel, DecodeError>>>>;

/// Asynchronous IFC decoder.
///
/// Implementations receive the raw bytes of a user-selected file and resolve
/// to a renderable model plus its spatial structure and property table. The
/// trait is object-safe so the viewer can hold `Arc<dyn IfcDecoder>`.
pub trait IfcDecoder {
    fn decode(&self, bytes: Vec<u8>) -> DecodeFuture;
}
