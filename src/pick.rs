//! Ray picking and highlight/selection management.
//!
//! Pointer coordinates are normalized against the canvas bounds into device
//! coordinates in [-1, 1] (vertical axis inverted), unprojected into a world
//! ray, and intersected against every loaded model. Only the nearest hit
//! counts; the hit triangle is resolved to its owning express ID via the
//! decoder's geometry-to-id mapping and shown as a highlight subset.
//!
//! All interaction state lives in [`PickSession`]: the model of the last hit
//! (needed to clear its highlight on the first miss) and the current
//! selection. Hover drives the preview highlight; click drives the persistent
//! selection and logs the model's building record as a side effect.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Vector3, Vector4};
use winit::dpi::PhysicalPosition;

use crate::{
    camera::{Camera, Projection, inverse_view_proj},
    data_structures::mesh::MeshData,
    scene::{ModelId, Scene, SubsetKind},
};

/// Normalize a canvas-local pointer position into normalized device
/// coordinates: x and y in [-1, 1], screen-down mapping to negative y.
/// The exact top-left corner maps to (-1, 1), bottom-right to (1, -1).
pub fn ndc_from_pointer(position: PhysicalPosition<f64>, bounds: (u32, u32)) -> (f32, f32) {
    let x = (position.x / bounds.0 as f64) * 2.0 - 1.0;
    let y = -(position.y / bounds.1 as f64) * 2.0 + 1.0;
    (x as f32, y as f32)
}

/// A world-space ray with normalized direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Unproject a normalized device coordinate through the inverse
    /// view-projection matrix. Points on the near and far plane are
    /// unprojected and the ray runs through both.
    pub fn from_ndc(ndc: (f32, f32), inv_view_proj: &Matrix4<f32>) -> Option<Ray> {
        let near = inv_view_proj * Vector4::new(ndc.0, ndc.1, 0.0, 1.0);
        let far = inv_view_proj * Vector4::new(ndc.0, ndc.1, 1.0, 1.0);
        if near.w.abs() < f32::EPSILON || far.w.abs() < f32::EPSILON {
            return None;
        }
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;
        let direction = far - near;
        if direction.magnitude2() < f32::EPSILON {
            return None;
        }
        Some(Ray {
            origin: Point3::from_vec(near),
            direction: direction.normalize(),
        })
    }

    /// Construct the pick ray from the camera through a normalized pointer
    /// coordinate.
    pub fn from_camera(ndc: (f32, f32), camera: &Camera, projection: &Projection) -> Option<Ray> {
        let inv = inverse_view_proj(camera, projection)?;
        Self::from_ndc(ndc, &inv)
    }
}

/// Intersection result: distance along the ray and the mesh triangle hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub triangle: usize,
}

/// Seam for the delegated spatial accelerator.
///
/// Implementations must return the nearest intersection along the ray;
/// [`TriangleIndex`] is the in-crate reference implementation and a real
/// bounding-volume hierarchy slots in behind the same trait.
pub trait SpatialIndex {
    fn cast_ray(&self, ray: &Ray) -> Option<RayHit>;
}

/// Reference spatial index: a flat copy of the mesh triangles, intersected
/// with Möller–Trumbore and scanned linearly for the nearest hit.
#[derive(Debug, Clone)]
pub struct TriangleIndex {
    positions: Vec<Point3<f32>>,
    indices: Vec<u32>,
}

impl TriangleIndex {
    pub fn new(mesh: &MeshData) -> Self {
        Self {
            positions: mesh.positions.iter().map(|p| Point3::from(*p)).collect(),
            indices: mesh.indices.clone(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

impl SpatialIndex for TriangleIndex {
    fn cast_ray(&self, ray: &Ray) -> Option<RayHit> {
        let mut nearest: Option<RayHit> = None;
        for triangle in 0..self.triangle_count() {
            let base = triangle * 3;
            let v0 = self.positions[self.indices[base] as usize];
            let v1 = self.positions[self.indices[base + 1] as usize];
            let v2 = self.positions[self.indices[base + 2] as usize];
            if let Some(distance) = ray_triangle(ray, v0, v1, v2) {
                let closer = nearest.map_or(true, |hit| distance < hit.distance);
                if closer {
                    nearest = Some(RayHit { distance, triangle });
                }
            }
        }
        nearest
    }
}

/// Möller–Trumbore ray/triangle intersection. Returns the distance along the
/// ray, for hits in front of the origin only. Backfaces count: IFC geometry
/// is frequently wound inconsistently.
fn ray_triangle(ray: &Ray, v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Option<f32> {
    const EPSILON: f32 = 1e-7;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let t_vec = ray.origin - v0;
    let u = t_vec.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = t_vec.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let distance = edge2.dot(q) * inv_det;
    (distance > EPSILON).then_some(distance)
}

/// A resolved pick: which model, which element, how far along the ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementHit {
    pub model: ModelId,
    pub express_id: u32,
    pub distance: f32,
}

/// Interaction session owning all pick-related state.
#[derive(Debug, Default)]
pub struct PickSession {
    last_hit: Option<ModelId>,
    selected: Option<(ModelId, u32)>,
}

impl PickSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Model whose highlight subset is currently shown, if any.
    pub fn last_hit(&self) -> Option<ModelId> {
        self.last_hit
    }

    pub fn selection(&self) -> Option<(ModelId, u32)> {
        self.selected
    }

    fn cast(&self, scene: &Scene, ray: &Ray) -> Option<(ModelId, RayHit)> {
        scene
            .models()
            .iter()
            .filter_map(|model| model.index.cast_ray(ray).map(|hit| (model.id, hit)))
            .min_by(|a, b| a.1.distance.total_cmp(&b.1.distance))
    }

    /// Hover pick: highlight the element under the pointer, replacing any
    /// previous highlight. A miss clears the previous highlight exactly once;
    /// further misses are no-ops.
    pub fn pick(&mut self, scene: &mut Scene, ray: &Ray) -> Option<ElementHit> {
        match self.cast(scene, ray) {
            Some((model, hit)) => {
                let express_id = scene.model(model)?.mesh.express_id_of(hit.triangle)?;
                if let Some(previous) = self.last_hit {
                    if previous != model {
                        scene.clear_subset(previous, SubsetKind::Highlight);
                    }
                }
                scene.set_subset(model, SubsetKind::Highlight, vec![express_id]);
                self.last_hit = Some(model);
                Some(ElementHit {
                    model,
                    express_id,
                    distance: hit.distance,
                })
            }
            None => {
                if let Some(previous) = self.last_hit.take() {
                    scene.clear_subset(previous, SubsetKind::Highlight);
                }
                None
            }
        }
    }

    /// Convenience wrapper normalizing a pointer position and casting from
    /// the camera.
    pub fn pick_at(
        &mut self,
        scene: &mut Scene,
        pointer: PhysicalPosition<f64>,
        bounds: (u32, u32),
        camera: &Camera,
        projection: &Projection,
    ) -> Option<ElementHit> {
        let ndc = ndc_from_pointer(pointer, bounds);
        match Ray::from_camera(ndc, camera, projection) {
            Some(ray) => self.pick(scene, &ray),
            None => None,
        }
    }

    /// Click pick: make the element under the pointer the persistent
    /// selection. A miss clears the current selection.
    pub fn select(&mut self, scene: &mut Scene, ray: &Ray) -> Option<ElementHit> {
        match self.cast(scene, ray) {
            Some((model, hit)) => {
                let express_id = scene.model(model)?.mesh.express_id_of(hit.triangle)?;
                self.apply_selection(scene, model, express_id);
                Some(ElementHit {
                    model,
                    express_id,
                    distance: hit.distance,
                })
            }
            None => {
                if let Some((model, _)) = self.selected.take() {
                    scene.clear_subset(model, SubsetKind::Selection);
                }
                None
            }
        }
    }

    pub fn select_at(
        &mut self,
        scene: &mut Scene,
        pointer: PhysicalPosition<f64>,
        bounds: (u32, u32),
        camera: &Camera,
        projection: &Projection,
    ) -> Option<ElementHit> {
        let ndc = ndc_from_pointer(pointer, bounds);
        match Ray::from_camera(ndc, camera, projection) {
            Some(ray) => self.select(scene, &ray),
            None => None,
        }
    }

    /// Highlight a known element, e.g. from a tree-menu hover. Same subset
    /// mechanism as ray picking, keyed directly off the element id.
    pub fn highlight_element(&mut self, scene: &mut Scene, model: ModelId, express_id: u32) {
        if let Some(previous) = self.last_hit {
            if previous != model {
                scene.clear_subset(previous, SubsetKind::Highlight);
            }
        }
        scene.set_subset(model, SubsetKind::Highlight, vec![express_id]);
        self.last_hit = Some(model);
    }

    /// Select a known element, e.g. from a tree-menu click.
    pub fn select_element(&mut self, scene: &mut Scene, model: ModelId, express_id: u32) {
        self.apply_selection(scene, model, express_id);
    }

    fn apply_selection(&mut self, scene: &mut Scene, model: ModelId, express_id: u32) {
        if let Some((previous, _)) = self.selected {
            if previous != model {
                scene.clear_subset(previous, SubsetKind::Selection);
            }
        }
        scene.set_subset(model, SubsetKind::Selection, vec![express_id]);
        self.selected = Some((model, express_id));
        log::info!("selected element {}", express_id);
        log_building_record(scene, model);
    }
}

/// Debugging side channel: dump the building record of the clicked model to
/// the console. Lookup failures are tolerated.
fn log_building_record(scene: &Scene, model: ModelId) {
    let Some(loaded) = scene.model(model) else {
        return;
    };
    match loaded.properties.building_record() {
        Some((express_id, record)) => {
            log::info!("building record {} ({})", express_id, record.name);
            for (key, value) in &record.fields {
                log::info!("  {}: {}", key, value);
            }
        }
        None => log::debug!("model {:?} carries no building record", model),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndc_corners_map_exactly() {
        let bounds = (800, 600);
        assert_eq!(
            ndc_from_pointer(PhysicalPosition::new(0.0, 0.0), bounds),
            (-1.0, 1.0)
        );
        assert_eq!(
            ndc_from_pointer(PhysicalPosition::new(800.0, 600.0), bounds),
            (1.0, -1.0)
        );
        let (x, y) = ndc_from_pointer(PhysicalPosition::new(400.0, 300.0), bounds);
        assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
    }

    #[test]
    fn ndc_interior_stays_in_range() {
        let bounds = (1024, 768);
        for (px, py) in [(1.0, 1.0), (512.0, 100.0), (1023.0, 767.0)] {
            let (x, y) = ndc_from_pointer(PhysicalPosition::new(px, py), bounds);
            assert!((-1.0..=1.0).contains(&x));
            assert!((-1.0..=1.0).contains(&y));
        }
    }

    #[test]
    fn ray_hits_facing_triangle() {
        let ray = Ray {
            origin: Point3::new(0.25, 0.25, 5.0),
            direction: Vector3::new(0.0, 0.0, -1.0),
        };
        let distance = ray_triangle(
            &ray,
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        assert!(distance.is_some());
        assert!((distance.unwrap() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn ray_misses_triangle_outside_bounds() {
        let ray = Ray {
            origin: Point3::new(2.0, 2.0, 5.0),
            direction: Vector3::new(0.0, 0.0, -1.0),
        };
        assert!(
            ray_triangle(
                &ray,
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            )
            .is_none()
        );
    }

    #[test]
    fn triangle_behind_origin_does_not_count() {
        let ray = Ray {
            origin: Point3::new(0.25, 0.25, -1.0),
            direction: Vector3::new(0.0, 0.0, -1.0),
        };
        assert!(
            ray_triangle(
                &ray,
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            )
            .is_none()
        );
    }
}
