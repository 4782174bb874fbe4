//! Spatial structure of a decoded model.
//!
//! IFC models carry a hierarchical decomposition (project → site → building →
//! storey → element). The decoder produces one [`SpatialNode`] tree per model;
//! the tree is read-only afterwards and child order is preserved exactly as
//! supplied.

/// One node of the spatial-structure tree.
///
/// `express_id` is the stable per-element integer identifier from the IFC
/// serialization; `node_type` is the schema type tag (e.g. `IFCBUILDINGSTOREY`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialNode {
    pub node_type: String,
    pub express_id: u32,
    pub children: Vec<SpatialNode>,
}

impl SpatialNode {
    pub fn new(node_type: impl Into<String>, express_id: u32) -> Self {
        Self {
            node_type: node_type.into(),
            express_id,
            children: Vec::new(),
        }
    }

    pub fn with_children(
        node_type: impl Into<String>,
        express_id: u32,
        children: Vec<SpatialNode>,
    ) -> Self {
        Self {
            node_type: node_type.into(),
            express_id,
            children,
        }
    }

    /// Display label used by the tree menu.
    pub fn label(&self) -> String {
        format!("{} - {}", self.node_type, self.express_id)
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(SpatialNode::node_count)
            .sum::<usize>()
    }

    /// Depth-first traversal in supplied child order. The callback receives
    /// each node together with its depth (`self` is depth 0).
    pub fn walk(&self, f: &mut impl FnMut(&SpatialNode, usize)) {
        self.walk_at(0, f);
    }

    fn walk_at(&self, depth: usize, f: &mut impl FnMut(&SpatialNode, usize)) {
        f(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SpatialNode {
        SpatialNode::with_children(
            "IFCPROJECT",
            1,
            vec![SpatialNode::with_children(
                "IFCSITE",
                2,
                vec![
                    SpatialNode::new("IFCWALL", 3),
                    SpatialNode::new("IFCSLAB", 4),
                ],
            )],
        )
    }

    #[test]
    fn counts_all_nodes() {
        assert_eq!(sample().node_count(), 4);
    }

    #[test]
    fn walks_depth_first_in_child_order() {
        let mut visited = Vec::new();
        sample().walk(&mut |node, depth| visited.push((node.express_id, depth)));
        assert_eq!(visited, vec![(1, 0), (2, 1), (3, 2), (4, 2)]);
    }

    #[test]
    fn label_joins_type_and_id() {
        assert_eq!(SpatialNode::new("IFCWALL", 42).label(), "IFCWALL - 42");
    }
}
