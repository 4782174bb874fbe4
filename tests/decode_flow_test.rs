use futures::executor::block_on;

use ifc_view::decode::{DecodeError, DecodedModel, IfcDecoder};
use ifc_view::scene::Scene;
use ifc_view::tree_menu::TreeMenu;

use crate::common::test_utils::{BrokenGeometryDecoder, FailingDecoder, StubDecoder};

mod common;

/// Decode and validate the way the loader does before delivering its event.
fn decode(decoder: &dyn IfcDecoder, bytes: &[u8]) -> Result<DecodedModel, DecodeError> {
    block_on(decoder.decode(bytes.to_vec()))
        .and_then(|model| model.mesh.validate().map(|()| model))
}

#[test]
fn decode_populates_scene_and_tree() {
    let model = decode(&StubDecoder, b"ISO-10303-21;").unwrap();
    let mut scene = Scene::new();
    let id = scene.add_model(model);

    let loaded = scene.model(id).unwrap();
    assert_eq!(loaded.mesh.triangle_count(), 4);

    let mut tree = TreeMenu::new();
    let structure = loaded.structure.as_ref().unwrap();
    tree.build(structure);
    assert_eq!(tree.len(), structure.node_count());
    assert_eq!(tree.rows()[0].label, "IFCPROJECT - 1");

    let (building, record) = loaded.properties.building_record().unwrap();
    assert_eq!(building, 3);
    assert_eq!(record.name, "IFCBUILDING");
}

#[test]
fn failed_decode_leaves_scene_unchanged() {
    let result = decode(&FailingDecoder, b"garbage");
    assert!(matches!(result, Err(DecodeError::Unparsable(_))));

    // the loader only registers successful decodes
    let scene = Scene::new();
    assert!(scene.models().is_empty());
}

#[test]
fn inconsistent_geometry_is_rejected() {
    let result = decode(&BrokenGeometryDecoder, b"ISO-10303-21;");
    assert!(matches!(result, Err(DecodeError::Geometry(_))));
}

#[test]
fn decodes_accumulate_models() {
    let mut scene = Scene::new();
    let first = scene.add_model(decode(&StubDecoder, b"ISO-10303-21;").unwrap());
    let second = scene.add_model(decode(&StubDecoder, b"ISO-10303-21;").unwrap());
    assert_ne!(first, second);
    assert_eq!(scene.models().len(), 2);
}
