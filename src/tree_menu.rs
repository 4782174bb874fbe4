//! Collapsible tree menu over the spatial structure.
//!
//! The menu mirrors the [`SpatialNode`](crate::data_structures::structure::SpatialNode)
//! tree 1:1 into a flat row list in depth-first order, preserving child order
//! exactly. Rows with children are expandable and start collapsed; expansion
//! is toggled strictly by a direct user action on that row, never
//! automatically. Hover and click on leaves are wired by the embedding app to
//! the pick session (highlight and selection respectively), keyed off the
//! row's known express ID.

use crate::data_structures::structure::SpatialNode;

/// One rendered row of the tree menu.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeRow {
    pub express_id: u32,
    pub label: String,
    pub depth: usize,
    pub parent: Option<usize>,
    pub expandable: bool,
    pub expanded: bool,
}

/// Flat representation of the spatial-structure tree.
#[derive(Debug, Default)]
pub struct TreeMenu {
    rows: Vec<TreeRow>,
}

impl TreeMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the menu from a structure tree. Any previously rendered rows
    /// are discarded; the new menu starts fully collapsed.
    pub fn build(&mut self, root: &SpatialNode) {
        self.rows.clear();
        self.push_node(root, 0, None);
    }

    fn push_node(&mut self, node: &SpatialNode, depth: usize, parent: Option<usize>) {
        let index = self.rows.len();
        self.rows.push(TreeRow {
            express_id: node.express_id,
            label: node.label(),
            depth,
            parent,
            expandable: !node.children.is_empty(),
            expanded: false,
        });
        for child in &node.children {
            self.push_node(child, depth + 1, Some(index));
        }
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[TreeRow] {
        &self.rows
    }

    /// Toggle an expandable row. Returns the new expansion state; toggling a
    /// leaf (or an out-of-range row) is a no-op returning `false`.
    pub fn toggle(&mut self, row: usize) -> bool {
        match self.rows.get_mut(row) {
            Some(entry) if entry.expandable => {
                entry.expanded = !entry.expanded;
                entry.expanded
            }
            _ => false,
        }
    }

    /// A row is visible when every ancestor is expanded. The root is always
    /// visible.
    pub fn is_visible(&self, row: usize) -> bool {
        let mut current = match self.rows.get(row) {
            Some(entry) => entry,
            None => return false,
        };
        while let Some(parent) = current.parent {
            let parent_row = &self.rows[parent];
            if !parent_row.expanded {
                return false;
            }
            current = parent_row;
        }
        true
    }

    /// Visible rows in render order (depth-first, supplied child order).
    pub fn visible_rows(&self) -> impl Iterator<Item = (usize, &TreeRow)> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(index, _)| self.is_visible(*index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structure() -> SpatialNode {
        SpatialNode::with_children(
            "IFCPROJECT",
            1,
            vec![SpatialNode::with_children(
                "IFCSITE",
                2,
                vec![SpatialNode::with_children(
                    "IFCBUILDING",
                    3,
                    vec![
                        SpatialNode::with_children(
                            "IFCBUILDINGSTOREY",
                            4,
                            vec![
                                SpatialNode::new("IFCWALL", 5),
                                SpatialNode::new("IFCSLAB", 6),
                            ],
                        ),
                        SpatialNode::new("IFCBUILDINGSTOREY", 7),
                    ],
                )],
            )],
        )
    }

    #[test]
    fn build_mirrors_every_node_once() {
        let mut menu = TreeMenu::new();
        let root = structure();
        menu.build(&root);
        assert_eq!(menu.len(), root.node_count());

        let expandable: Vec<u32> = menu
            .rows()
            .iter()
            .filter(|row| row.expandable)
            .map(|row| row.express_id)
            .collect();
        assert_eq!(expandable, vec![1, 2, 3, 4]);
        assert!(menu.rows().iter().all(|row| !row.expanded));
    }

    #[test]
    fn labels_join_type_and_id() {
        let mut menu = TreeMenu::new();
        menu.build(&structure());
        assert_eq!(menu.rows()[0].label, "IFCPROJECT - 1");
        assert_eq!(menu.rows()[4].label, "IFCWALL - 5");
    }

    #[test]
    fn double_toggle_restores_state() {
        let mut menu = TreeMenu::new();
        menu.build(&structure());
        assert!(menu.toggle(0));
        assert!(menu.rows()[0].expanded);
        assert!(!menu.toggle(0));
        assert!(!menu.rows()[0].expanded);
    }

    #[test]
    fn leaf_toggle_is_noop() {
        let mut menu = TreeMenu::new();
        menu.build(&structure());
        // row 4 is IFCWALL - 5, a leaf
        assert!(!menu.toggle(4));
        assert!(!menu.rows()[4].expanded);
    }

    #[test]
    fn visibility_requires_expanded_ancestors() {
        let mut menu = TreeMenu::new();
        menu.build(&structure());

        // only the root is visible initially
        assert_eq!(menu.visible_rows().count(), 1);

        menu.toggle(0); // project
        assert_eq!(menu.visible_rows().count(), 2);
        menu.toggle(1); // site
        menu.toggle(2); // building
        let visible: Vec<u32> = menu.visible_rows().map(|(_, row)| row.express_id).collect();
        assert_eq!(visible, vec![1, 2, 3, 4, 7]);

        // collapsing an inner node hides its whole subtree again
        menu.toggle(1);
        assert_eq!(menu.visible_rows().count(), 2);
    }

    #[test]
    fn rebuild_discards_previous_rows() {
        let mut menu = TreeMenu::new();
        menu.build(&structure());
        menu.toggle(0);
        menu.build(&SpatialNode::new("IFCPROJECT", 99));
        assert_eq!(menu.len(), 1);
        assert!(!menu.rows()[0].expandable);
    }
}
