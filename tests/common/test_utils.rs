#![allow(dead_code)]

use ifc_view::data_structures::{mesh::MeshData, structure::SpatialNode};
use ifc_view::decode::{
    DecodeError, DecodeFuture, DecodedModel, IfcDecoder, PropertyRecord, PropertyTable,
};

/// Two unit quads facing +z: a wall (express ID 501) at z = 0 and a slab
/// (express ID 502) behind it at z = -3. A ray along -z through the overlap
/// must resolve to the wall.
pub fn sample_mesh() -> MeshData {
    MeshData {
        positions: vec![
            [-1.0, -1.0, 0.0],
            [1.0, -1.0, 0.0],
            [1.0, 1.0, 0.0],
            [-1.0, 1.0, 0.0],
            [-1.0, -1.0, -3.0],
            [1.0, -1.0, -3.0],
            [1.0, 1.0, -3.0],
            [-1.0, 1.0, -3.0],
        ],
        normals: Vec::new(),
        colors: Vec::new(),
        indices: vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7],
        face_ids: vec![501, 501, 502, 502],
    }
}

pub fn sample_structure() -> SpatialNode {
    SpatialNode::with_children(
        "IFCPROJECT",
        1,
        vec![SpatialNode::with_children(
            "IFCSITE",
            2,
            vec![SpatialNode::with_children(
                "IFCBUILDING",
                3,
                vec![SpatialNode::with_children(
                    "IFCBUILDINGSTOREY",
                    4,
                    vec![
                        SpatialNode::new("IFCWALL", 501),
                        SpatialNode::new("IFCSLAB", 502),
                    ],
                )],
            )],
        )],
    )
}

pub fn sample_model(name: &str) -> DecodedModel {
    let mut properties = PropertyTable::new();
    properties.insert(
        3,
        PropertyRecord {
            name: "IFCBUILDING".to_string(),
            fields: vec![("Name".to_string(), "Test building".to_string())],
        },
    );
    properties.set_building(3);
    properties.insert(
        501,
        PropertyRecord {
            name: "IFCWALL".to_string(),
            fields: vec![("Name".to_string(), "North wall".to_string())],
        },
    );
    DecodedModel {
        name: name.to_string(),
        mesh: sample_mesh(),
        structure: sample_structure(),
        properties,
    }
}

/// Decoder resolving every input to the sample building.
pub struct StubDecoder;

impl IfcDecoder for StubDecoder {
    fn decode(&self, _bytes: Vec<u8>) -> DecodeFuture {
        let model = sample_model("stub.ifc");
        Box::pin(async move { Ok(model) })
    }
}

/// Decoder rejecting every input.
pub struct FailingDecoder;

impl IfcDecoder for FailingDecoder {
    fn decode(&self, _bytes: Vec<u8>) -> DecodeFuture {
        Box::pin(async { Err(DecodeError::Unparsable("not an IFC file".to_string())) })
    }
}

/// Decoder that resolves, but with a geometry-to-element mapping shorter than
/// the mesh. Mesh validation has to catch this.
pub struct BrokenGeometryDecoder;

impl IfcDecoder for BrokenGeometryDecoder {
    fn decode(&self, _bytes: Vec<u8>) -> DecodeFuture {
        let mut model = sample_model("broken.ifc");
        model.mesh.face_ids.pop();
        Box::pin(async move { Ok(model) })
    }
}
