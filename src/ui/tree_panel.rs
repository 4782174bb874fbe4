//! The collapsible spatial structure tree.

use crate::{
    pick::PickSession,
    scene::{ModelId, Scene},
    tree_menu::TreeMenu,
};

const INDENT_PER_LEVEL: f32 = 14.0;

/// Render the tree rows. Expandable rows toggle on click; leaf rows preview
/// their element on hover and select it on click, through the same pick
/// session the 3D pointer uses.
pub(crate) fn tree_panel(
    ui: &mut egui::Ui,
    scene: &mut Scene,
    session: &mut PickSession,
    tree: &mut TreeMenu,
    model: ModelId,
) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let visible: Vec<usize> = tree.visible_rows().map(|(index, _)| index).collect();
            for index in visible {
                let row = &tree.rows()[index];
                let depth = row.depth;
                let label = row.label.clone();
                let expandable = row.expandable;
                let expanded = row.expanded;
                let express_id = row.express_id;

                ui.horizontal(|ui| {
                    ui.add_space(depth as f32 * INDENT_PER_LEVEL);
                    if expandable {
                        let caret = if expanded { "−" } else { "+" };
                        if ui
                            .selectable_label(false, format!("{} {}", caret, label))
                            .clicked()
                        {
                            tree.toggle(index);
                        }
                    } else {
                        let selected = session.selection() == Some((model, express_id));
                        let response = ui.selectable_label(selected, label);
                        if response.hovered() {
                            session.highlight_element(scene, model, express_id);
                        }
                        if response.clicked() {
                            session.select_element(scene, model, express_id);
                        }
                    }
                });
            }
        });
}
