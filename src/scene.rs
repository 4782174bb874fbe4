//! Scene state: loaded models, helpers and highlight subsets.
//!
//! The scene is append-only for models: every successful decode registers one
//! more [`LoadedModel`], for rendering and for raycasting alike, and models
//! live until the process exits. Subsets are the one replaceable part: per
//! model and per [`SubsetKind`] at most one subset exists, and setting a new
//! one atomically replaces the previous.

use std::collections::HashMap;

use crate::{
    decode::{DecodedModel, PropertyTable},
    data_structures::{mesh::MeshData, structure::SpatialNode},
    pick::TriangleIndex,
};

/// Identifier of a loaded model, assigned at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub u32);

/// Material category of a subset. Hover previews use `Highlight`, clicks and
/// tree-menu selection use `Selection`; the two never replace each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubsetKind {
    Highlight,
    Selection,
}

/// A named group of element geometry rendered with an override material.
#[derive(Debug, Clone)]
pub struct Subset {
    pub element_ids: Vec<u32>,
    /// Index list (3 per triangle) into the owning model's vertex buffer.
    pub indices: Vec<u32>,
    /// Bumped whenever the subset content changes, so the renderer knows to
    /// re-upload its index buffer.
    pub generation: u64,
}

/// One decoded model registered in the scene.
#[derive(Debug)]
pub struct LoadedModel {
    pub id: ModelId,
    pub name: String,
    pub mesh: MeshData,
    pub index: TriangleIndex,
    pub structure: Option<SpatialNode>,
    pub properties: PropertyTable,
}

/// Render/raycast state of the viewer.
#[derive(Debug, Default)]
pub struct Scene {
    models: Vec<LoadedModel>,
    subsets: HashMap<(ModelId, SubsetKind), Subset>,
    next_id: u32,
    next_generation: u64,
    pub show_grid: bool,
    pub show_axes: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            show_grid: true,
            show_axes: true,
            ..Self::default()
        }
    }

    /// Register a decoded model. Models accumulate; loading a second file
    /// never replaces the first.
    pub fn add_model(&mut self, decoded: DecodedModel) -> ModelId {
        let id = ModelId(self.next_id);
        self.next_id += 1;
        let index = TriangleIndex::new(&decoded.mesh);
        self.models.push(LoadedModel {
            id,
            name: decoded.name,
            mesh: decoded.mesh,
            index,
            structure: Some(decoded.structure),
            properties: decoded.properties,
        });
        id
    }

    pub fn models(&self) -> &[LoadedModel] {
        &self.models
    }

    pub fn model(&self, id: ModelId) -> Option<&LoadedModel> {
        self.models.iter().find(|model| model.id == id)
    }

    /// Replace the `kind` subset of `model` with the given element ids. Any
    /// previous subset of the same kind on that model is removed as part of
    /// the same call.
    pub fn set_subset(&mut self, model: ModelId, kind: SubsetKind, element_ids: Vec<u32>) {
        let Some(loaded) = self.model(model) else {
            log::warn!("subset requested for unknown model {:?}", model);
            return;
        };
        let indices = loaded.mesh.subset_indices(&element_ids);
        self.next_generation += 1;
        self.subsets.insert(
            (model, kind),
            Subset {
                element_ids,
                indices,
                generation: self.next_generation,
            },
        );
    }

    /// Remove the `kind` subset of `model`. Removing an absent subset is a
    /// no-op; returns whether anything was removed.
    pub fn clear_subset(&mut self, model: ModelId, kind: SubsetKind) -> bool {
        self.subsets.remove(&(model, kind)).is_some()
    }

    pub fn subset(&self, model: ModelId, kind: SubsetKind) -> Option<&Subset> {
        self.subsets.get(&(model, kind))
    }

    pub fn subsets(&self) -> impl Iterator<Item = (&(ModelId, SubsetKind), &Subset)> {
        self.subsets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::structure::SpatialNode;

    fn decoded(name: &str) -> DecodedModel {
        DecodedModel {
            name: name.to_string(),
            mesh: MeshData {
                positions: vec![
                    [0.0, 0.0, 0.0],
                    [1.0, 0.0, 0.0],
                    [1.0, 1.0, 0.0],
                    [0.0, 1.0, 0.0],
                ],
                normals: Vec::new(),
                colors: Vec::new(),
                indices: vec![0, 1, 2, 0, 2, 3],
                face_ids: vec![11, 22],
            },
            structure: SpatialNode::new("IFCPROJECT", 1),
            properties: PropertyTable::new(),
        }
    }

    #[test]
    fn models_accumulate() {
        let mut scene = Scene::new();
        let a = scene.add_model(decoded("a"));
        let b = scene.add_model(decoded("b"));
        assert_ne!(a, b);
        assert_eq!(scene.models().len(), 2);
        assert!(scene.model(a).is_some());
        assert!(scene.model(b).is_some());
    }

    #[test]
    fn subset_replaces_same_kind() {
        let mut scene = Scene::new();
        let id = scene.add_model(decoded("a"));
        scene.set_subset(id, SubsetKind::Highlight, vec![11]);
        let first_generation = scene.subset(id, SubsetKind::Highlight).unwrap().generation;
        scene.set_subset(id, SubsetKind::Highlight, vec![22]);

        let subset = scene.subset(id, SubsetKind::Highlight).unwrap();
        assert_eq!(subset.element_ids, vec![22]);
        assert_eq!(subset.indices, vec![0, 2, 3]);
        assert!(subset.generation > first_generation);
        assert_eq!(scene.subsets().count(), 1);
    }

    #[test]
    fn subset_kinds_are_independent() {
        let mut scene = Scene::new();
        let id = scene.add_model(decoded("a"));
        scene.set_subset(id, SubsetKind::Highlight, vec![11]);
        scene.set_subset(id, SubsetKind::Selection, vec![22]);
        assert_eq!(scene.subsets().count(), 2);

        scene.clear_subset(id, SubsetKind::Highlight);
        assert!(scene.subset(id, SubsetKind::Highlight).is_none());
        assert!(scene.subset(id, SubsetKind::Selection).is_some());
    }

    #[test]
    fn clearing_absent_subset_is_noop() {
        let mut scene = Scene::new();
        let id = scene.add_model(decoded("a"));
        assert!(!scene.clear_subset(id, SubsetKind::Highlight));
        scene.set_subset(id, SubsetKind::Highlight, vec![11]);
        assert!(scene.clear_subset(id, SubsetKind::Highlight));
        assert!(!scene.clear_subset(id, SubsetKind::Highlight));
    }
}
