use cgmath::{Deg, Point3, Vector3};
use winit::dpi::PhysicalPosition;

use ifc_view::camera::{Camera, Projection};
use ifc_view::pick::{PickSession, Ray};
use ifc_view::scene::{Scene, SubsetKind};

use crate::common::test_utils::sample_model;

mod common;

fn forward_ray(x: f32, y: f32) -> Ray {
    Ray {
        origin: Point3::new(x, y, 5.0),
        direction: Vector3::new(0.0, 0.0, -1.0),
    }
}

#[test]
fn empty_scene_never_hits() {
    let mut scene = Scene::new();
    let mut session = PickSession::new();
    assert!(session.pick(&mut scene, &forward_ray(0.0, 0.0)).is_none());
    assert!(session.last_hit().is_none());
}

#[test]
fn nearest_element_wins() {
    let mut scene = Scene::new();
    let id = scene.add_model(sample_model("a.ifc"));
    let mut session = PickSession::new();

    // wall at z = 0 and slab at z = -3 both cross this ray
    let hit = session.pick(&mut scene, &forward_ray(0.2, 0.2)).unwrap();
    assert_eq!(hit.express_id, 501);
    assert!((hit.distance - 5.0).abs() < 1e-4);

    let subset = scene.subset(id, SubsetKind::Highlight).unwrap();
    assert_eq!(subset.element_ids, vec![501]);
    assert_eq!(subset.indices.len(), 6);
}

#[test]
fn hover_miss_clears_highlight_once() {
    let mut scene = Scene::new();
    let id = scene.add_model(sample_model("a.ifc"));
    let mut session = PickSession::new();

    session.pick(&mut scene, &forward_ray(0.0, 0.0)).unwrap();
    assert!(scene.subset(id, SubsetKind::Highlight).is_some());

    assert!(session.pick(&mut scene, &forward_ray(50.0, 50.0)).is_none());
    assert!(scene.subset(id, SubsetKind::Highlight).is_none());
    assert!(session.last_hit().is_none());

    // further misses with nothing highlighted stay no-ops
    assert!(session.pick(&mut scene, &forward_ray(50.0, 50.0)).is_none());
    assert!(scene.subset(id, SubsetKind::Highlight).is_none());
}

#[test]
fn selection_survives_hover_changes() {
    let mut scene = Scene::new();
    let id = scene.add_model(sample_model("a.ifc"));
    let mut session = PickSession::new();

    let hit = session.select(&mut scene, &forward_ray(0.0, 0.0)).unwrap();
    assert_eq!(hit.express_id, 501);
    assert_eq!(session.selection(), Some((id, 501)));

    let _ = session.pick(&mut scene, &forward_ray(50.0, 50.0));
    assert!(scene.subset(id, SubsetKind::Highlight).is_none());
    assert!(scene.subset(id, SubsetKind::Selection).is_some());
    assert_eq!(session.selection(), Some((id, 501)));

    // a click into empty space drops the selection
    assert!(session.select(&mut scene, &forward_ray(50.0, 50.0)).is_none());
    assert!(session.selection().is_none());
    assert!(scene.subset(id, SubsetKind::Selection).is_none());
}

#[test]
fn nearest_model_wins_across_models() {
    let mut scene = Scene::new();
    let far = scene.add_model(sample_model("far.ifc"));
    let mut near_model = sample_model("near.ifc");
    for position in &mut near_model.mesh.positions {
        position[2] += 2.0;
    }
    let near = scene.add_model(near_model);
    let mut session = PickSession::new();

    let hit = session.pick(&mut scene, &forward_ray(0.0, 0.0)).unwrap();
    assert_eq!(hit.model, near);
    assert!((hit.distance - 3.0).abs() < 1e-4);

    // highlight moved to the nearer model only
    assert!(scene.subset(near, SubsetKind::Highlight).is_some());
    assert!(scene.subset(far, SubsetKind::Highlight).is_none());
}

#[test]
fn screen_center_pick_hits_front_element() {
    let mut scene = Scene::new();
    scene.add_model(sample_model("a.ifc"));
    let mut session = PickSession::new();

    // camera on the +z axis looking straight down -z
    let camera = Camera::new((0.0, 0.0, 5.0), Deg(-90.0), Deg(0.0));
    let projection = Projection::new(800, 600, Deg(75.0), 0.1, 1000.0);

    let hit = session
        .pick_at(
            &mut scene,
            PhysicalPosition::new(400.0, 300.0),
            (800, 600),
            &camera,
            &projection,
        )
        .unwrap();
    assert_eq!(hit.express_id, 501);

    // a pointer in the far corner misses the model
    assert!(
        session
            .pick_at(
                &mut scene,
                PhysicalPosition::new(799.0, 1.0),
                (800, 600),
                &camera,
                &projection,
            )
            .is_none()
    );
}
