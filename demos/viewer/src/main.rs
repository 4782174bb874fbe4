//! Demo viewer with a procedural decoder.
//!
//! `SampleDecoder` stands in for a real IFC decoding module: it accepts any
//! file that starts with the STEP magic and always produces the same small
//! building (a slab and two walls), so picking, subsets and the structure
//! tree can be exercised without shipping decoder assets. Press `O` (or use
//! the panel button) and pick any `.ifc` file.

use std::sync::Arc;

use ifc_view::data_structures::{mesh::MeshData, structure::SpatialNode};
use ifc_view::decode::{
    DecodeError, DecodeFuture, DecodedModel, IfcDecoder, PropertyRecord, PropertyTable,
};

const SLAB_ID: u32 = 100;
const WALL_NORTH_ID: u32 = 101;
const WALL_EAST_ID: u32 = 102;

struct SampleDecoder;

impl IfcDecoder for SampleDecoder {
    fn decode(&self, bytes: Vec<u8>) -> DecodeFuture {
        Box::pin(async move {
            if !bytes.starts_with(b"ISO-10303-21") {
                return Err(DecodeError::Unparsable(
                    "missing STEP header".to_string(),
                ));
            }
            Ok(sample_building())
        })
    }
}

fn sample_building() -> DecodedModel {
    let mut mesh = MeshData::default();
    push_box(
        &mut mesh,
        [-5.0, 0.0, -4.0],
        [5.0, 0.3, 4.0],
        [0.75, 0.73, 0.70],
        SLAB_ID,
    );
    push_box(
        &mut mesh,
        [-5.0, 0.3, -4.0],
        [5.0, 3.3, -3.7],
        [0.85, 0.80, 0.72],
        WALL_NORTH_ID,
    );
    push_box(
        &mut mesh,
        [4.7, 0.3, -4.0],
        [5.0, 3.3, 4.0],
        [0.85, 0.80, 0.72],
        WALL_EAST_ID,
    );

    let structure = SpatialNode::with_children(
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
                        SpatialNode::new("IFCSLAB", SLAB_ID),
                        SpatialNode::new("IFCWALLSTANDARDCASE", WALL_NORTH_ID),
                        SpatialNode::new("IFCWALLSTANDARDCASE", WALL_EAST_ID),
                    ],
                )],
            )],
        )],
    );

    let mut properties = PropertyTable::new();
    properties.insert(
        3,
        PropertyRecord {
            name: "IFCBUILDING".to_string(),
            fields: vec![
                ("Name".to_string(), "Sample building".to_string()),
                ("GlobalId".to_string(), "2O2Fr$t4X7Zf8NOew3FLOH".to_string()),
            ],
        },
    );
    properties.set_building(3);
    for (id, name) in [
        (SLAB_ID, "Ground slab"),
        (WALL_NORTH_ID, "North wall"),
        (WALL_EAST_ID, "East wall"),
    ] {
        properties.insert(
            id,
            PropertyRecord {
                name: name.to_string(),
                fields: vec![("Name".to_string(), name.to_string())],
            },
        );
    }

    DecodedModel {
        name: "sample building".to_string(),
        mesh,
        structure,
        properties,
    }
}

/// Append an axis-aligned box, four vertices and two triangles per face, all
/// owned by `express_id`.
fn push_box(mesh: &mut MeshData, min: [f32; 3], max: [f32; 3], color: [f32; 3], express_id: u32) {
    let [x0, y0, z0] = min;
    let [x1, y1, z1] = max;

    // (face normal, four corners counter-clockwise seen from outside)
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [0.0, 0.0, 1.0],
            [[x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]],
        ),
        (
            [0.0, 0.0, -1.0],
            [[x1, y0, z0], [x0, y0, z0], [x0, y1, z0], [x1, y1, z0]],
        ),
        (
            [1.0, 0.0, 0.0],
            [[x1, y0, z1], [x1, y0, z0], [x1, y1, z0], [x1, y1, z1]],
        ),
        (
            [-1.0, 0.0, 0.0],
            [[x0, y0, z0], [x0, y0, z1], [x0, y1, z1], [x0, y1, z0]],
        ),
        (
            [0.0, 1.0, 0.0],
            [[x0, y1, z1], [x1, y1, z1], [x1, y1, z0], [x0, y1, z0]],
        ),
        (
            [0.0, -1.0, 0.0],
            [[x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1]],
        ),
    ];

    for (normal, corners) in faces {
        let base = mesh.positions.len() as u32;
        for corner in corners {
            mesh.positions.push(corner);
            mesh.normals.push(normal);
            mesh.colors.push(color);
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        mesh.face_ids.extend_from_slice(&[express_id, express_id]);
    }
}

fn main() -> anyhow::Result<()> {
    ifc_view::app::run(Arc::new(SampleDecoder))
}
