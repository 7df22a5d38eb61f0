//! The widget's selection state: region attribute, base map, selected codes.

use egui::{ComboBox, Grid, Ui};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::MapKind;

/// Column-name prefixes that mark a likely region attribute; checked in order
/// when a new dataset arrives.
const PREFERRED_PREFIXES: [&str; 3] = ["country", "location", "region"];

/// Current widget selection, persisted across sessions by eframe.
///
/// `column` names the string column holding geographic names/codes, `map` the
/// active code space, `regions` the canonical codes picked on the rendering
/// surface (empty when nothing is selected).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub column: String,
    pub map: MapKind,
    pub regions: Vec<String>,
}

impl Selection {
    /// Default region attribute for a fresh dataset: the first string column
    /// whose lowercased name starts with `country`/`location`/`region`, else
    /// the first string column, else empty.
    pub fn default_column(string_columns: &[String]) -> String {
        string_columns
            .iter()
            .find(|name| {
                let lower = name.to_lowercase();
                PREFERRED_PREFIXES.iter().any(|p| lower.starts_with(p))
            })
            .or_else(|| string_columns.first())
            .cloned()
            .unwrap_or_default()
    }

    /// Resets to the state of "no dataset loaded".
    pub fn clear(&mut self) {
        self.column.clear();
        self.regions.clear();
    }

    /// Toggles one region code in the selection (UI convenience mirroring a
    /// click on the rendering surface).
    pub fn toggle_region(&mut self, code: &str) {
        if let Some(pos) = self.regions.iter().position(|r| r == code) {
            self.regions.remove(pos);
        } else {
            self.regions.push(code.to_string());
        }
    }

    /// The comma-separated form the rendering surface callback carries.
    pub fn as_callback_payload(&self) -> String {
        self.regions.join(",")
    }

    /// Renders the UI widgets for choosing the attribute column, the base map
    /// and the selected regions. Called by `layout.rs::render_side_panel`.
    ///
    /// **Crucially, it takes `&mut self`. Widgets modify `self` directly.**
    /// The state before rendering is compared with the state afterwards to
    /// detect changes.
    ///
    /// ### Arguments
    ///
    /// * `ui`: The `egui::Ui` to render into.
    /// * `string_columns`: Candidate attribute columns of the loaded dataset.
    /// * `region_counts`: Occurrence counts per region code on the current map.
    ///
    /// ### Returns
    ///
    /// * `Some(Selection)`: if the user changed the column, map or regions.
    /// * `None`: otherwise.
    pub fn render_selection(
        &mut self,
        ui: &mut Ui,
        string_columns: &[String],
        region_counts: &HashMap<String, u64>,
    ) -> Option<Selection> {
        let selection_before_render = self.clone();

        let grid = Grid::new("selection_grid")
            .num_columns(2)
            .spacing([10.0, 20.0])
            .striped(true);

        grid.show(ui, |ui| {
            ui.label("Column:");
            ComboBox::from_id_salt("attribute_column_combo")
                .selected_text(self.column.clone())
                .width(ui.available_width())
                .show_ui(ui, |ui| {
                    for name in string_columns {
                        ui.selectable_value(&mut self.column, name.clone(), name);
                    }
                });
            ui.end_row();

            ui.label("Map:");
            ComboBox::from_id_salt("base_map_combo")
                .selected_text(self.map.label())
                .width(ui.available_width())
                .show_ui(ui, |ui| {
                    for map in MapKind::ALL {
                        ui.selectable_value(&mut self.map, map, map.label());
                    }
                });
            ui.end_row();
        });

        ui.separator();

        // Matched regions, ordered by count (descending) then code. Clicking
        // a row toggles it, mirroring a click on the rendering surface.
        let mut matched: Vec<(&String, &u64)> = region_counts.iter().collect();
        matched.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (code, count) in matched {
            let selected = self.regions.iter().any(|r| r == code);
            let table = self.map.table();
            let name = table.display_name(code).unwrap_or(code);
            let label = format!("{name} ({count})");
            if ui.selectable_label(selected, label).clicked() {
                self.toggle_region(code);
            }
        }

        if !self.regions.is_empty() && ui.button("Clear selection").clicked() {
            self.regions.clear();
        }

        // Report the new state only when something actually changed.
        if *self != selection_before_render {
            tracing::debug!("Change detected in Selection UI: {self:#?}");
            Some(self.clone())
        } else {
            None
        }
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// cargo test -- --show-output tests_selection_state
#[cfg(test)]
mod tests_selection_state {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_column_prefers_geographic_names() {
        assert_eq!(
            Selection::default_column(&cols(&["title", "Country Name", "body"])),
            "Country Name"
        );
        assert_eq!(
            Selection::default_column(&cols(&["title", "LOCATION"])),
            "LOCATION"
        );
        assert_eq!(
            Selection::default_column(&cols(&["title", "body"])),
            "title"
        );
        assert_eq!(Selection::default_column(&[]), "");
    }

    #[test]
    fn test_toggle_region() {
        let mut selection = Selection::default();
        selection.toggle_region("SI");
        selection.toggle_region("FR");
        assert_eq!(selection.regions, vec!["SI", "FR"]);
        assert_eq!(selection.as_callback_payload(), "SI,FR");

        selection.toggle_region("SI");
        assert_eq!(selection.regions, vec!["FR"]);

        selection.clear();
        assert!(selection.regions.is_empty());
        assert_eq!(selection.as_callback_payload(), "");
    }

    #[test]
    fn test_serde_round_trip_keeps_all_three_fields() {
        // The whole triple survives a store/restore cycle, map included.
        let selection = Selection {
            column: "state".to_string(),
            map: MapKind::Usa,
            regions: vec!["US-MT".to_string(), "US-IA".to_string()],
        };

        let json = serde_json::to_string(&selection).expect("serialize selection");
        let restored: Selection = serde_json::from_str(&json).expect("deserialize selection");
        assert_eq!(restored, selection);
    }
}
