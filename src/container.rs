use egui::{Direction, Layout, TextStyle, Ui};
use egui_extras::{Column, TableBuilder, TableRow};
use polars::prelude::*;
use std::{collections::HashMap, sync::Arc};

use crate::{
    DataSource, FileExtension, GeoMapResult, Selection, aggregate_counts, auto_select_map,
    column_locations, distinct_locations, filter_by_regions,
};

/// Contains a DataFrame, its file extension, the loader settings, the
/// geographic selection state and the aggregated per-region counts.
///
/// Provides methods for loading data, recomputing region counts when the
/// column or base map changes, and displaying the output rows in an egui
/// table.
#[derive(Debug, Clone)]
pub struct GeoMapContainer {
    /// The Polars DataFrame, wrapped in an Arc for shared ownership.
    pub df: Arc<DataFrame>,
    /// File extension ("parquet", "csv", "json", etc.).
    pub extension: Arc<FileExtension>,
    /// Loader settings (path, delimiter, schema inference, null markers).
    pub source: Arc<DataSource>,
    /// Geographic selection state (column, base map, selected regions).
    pub selection: Arc<Selection>,
    /// Occurrence counts per canonical region code on the current base map.
    pub region_counts: Arc<HashMap<String, u64>>,
    /// Rows matching the selected regions, or `None` when nothing is emitted.
    pub filtered_df: Arc<Option<DataFrame>>,
}

impl Default for GeoMapContainer {
    fn default() -> Self {
        GeoMapContainer {
            df: Arc::new(DataFrame::default()),          // Empty DataFrame.
            extension: Arc::new(FileExtension::Missing), // No extension.
            source: Arc::new(DataSource::default()),     // Default loader settings.
            selection: Arc::new(Selection::default()),   // No column, no regions.
            region_counts: Arc::new(HashMap::new()),     // No counts.
            filtered_df: Arc::new(None),                 // Nothing emitted.
        }
    }
}

impl GeoMapContainer {
    /// Loads data from a file (Parquet, CSV, Json or NDJson) and computes the
    /// initial geographic state.
    ///
    /// After reading the DataFrame, the attribute column defaults to the best
    /// candidate among the String columns, the base map is auto-selected from
    /// the distinct location tokens, and the per-region counts are aggregated.
    /// Any previously selected regions are discarded because they belong to
    /// the old dataset.
    ///
    /// ### Arguments
    ///
    /// * `source`: A `DataSource` struct containing file path, delimiter, and
    ///   other loader settings.
    ///
    /// ### Returns
    ///
    /// A `GeoMapResult` containing the `GeoMapContainer` or an error.
    pub async fn load_data(mut source: DataSource) -> GeoMapResult<Self> {
        tracing::debug!("fn load_data()\nsource: {source:#?}");

        // Load DataFrame based on extension and get the file extension.
        let (df, extension) = source.get_df_and_extension().await?;

        // Pick the default attribute column for the new dataset.
        let string_columns: Vec<String> = df
            .columns()
            .iter()
            .filter(|col| col.dtype() == &DataType::String)
            .map(|col| col.name().to_string())
            .collect();

        let mut selection = Selection {
            column: Selection::default_column(&string_columns),
            ..Default::default()
        };

        // Auto-select the base map from the distinct location tokens.
        if !selection.column.is_empty() {
            let rows = column_locations(&df, &selection.column)?;
            selection.map = auto_select_map(&distinct_locations(&rows));
        }

        Self::from_parts(df, extension, source, selection)
    }

    /// Recomputes the geographic state for a new `Selection` without
    /// reloading the file.
    ///
    /// Called when the user picks a different attribute column, switches the
    /// base map, or changes the selected regions. When the column changed,
    /// the base map is re-derived from the new column's tokens and stale
    /// region selections are dropped.
    pub async fn update_selection(self, mut selection: Selection) -> GeoMapResult<Self> {
        tracing::debug!("fn update_selection()\nselection: {selection:#?}");

        if selection.column != self.selection.column {
            // A new column invalidates both the auto-selected map and any
            // regions selected on the previous column.
            let rows = column_locations(&self.df, &selection.column)?;
            selection.map = auto_select_map(&distinct_locations(&rows));
            selection.regions.clear();
        } else if selection.map != self.selection.map {
            // Codes from the previous map are meaningless on the new one.
            selection.regions.clear();
        }

        Self::from_parts(
            self.df.as_ref().clone(),
            self.extension.as_ref().clone(),
            self.source.as_ref().clone(),
            selection,
        )
    }

    /// Recomputes the geographic state for a selection stored by a previous
    /// session.
    ///
    /// Unlike `update_selection`, the stored map and regions are kept as-is:
    /// they were valid together when the session was saved, so no reset
    /// logic applies.
    pub async fn restore_selection(self, selection: Selection) -> GeoMapResult<Self> {
        tracing::debug!("fn restore_selection()\nselection: {selection:#?}");

        Self::from_parts(
            self.df.as_ref().clone(),
            self.extension.as_ref().clone(),
            self.source.as_ref().clone(),
            selection,
        )
    }

    /// Builds a container from its parts, aggregating region counts and
    /// applying the region filter.
    fn from_parts(
        df: DataFrame,
        extension: FileExtension,
        source: DataSource,
        selection: Selection,
    ) -> GeoMapResult<Self> {
        let (region_counts, filtered_df) = if selection.column.is_empty() {
            (HashMap::new(), None)
        } else {
            let rows = column_locations(&df, &selection.column)?;
            let counts = aggregate_counts(&rows, selection.map.table());
            let filtered = filter_by_regions(&df, &selection.column, &selection.regions)?;
            (counts, filtered)
        };

        tracing::debug!(
            "fn from_parts(): column: {:?}, map: {:?}, matched regions: {}",
            selection.column,
            selection.map,
            region_counts.len()
        );

        Ok(Self {
            df: Arc::new(df),
            extension: Arc::new(extension),
            source: Arc::new(source),
            selection: Arc::new(selection),
            region_counts: Arc::new(region_counts),
            filtered_df: Arc::new(filtered_df),
        })
    }

    /// The names of the String columns, the candidates for the attribute
    /// column combo box.
    pub fn string_columns(&self) -> Vec<String> {
        self.df
            .columns()
            .iter()
            .filter(|col| col.dtype() == &DataType::String)
            .map(|col| col.name().to_string())
            .collect()
    }

    /// The DataFrame currently shown in the table: the filtered subset when
    /// regions are selected, the full dataset otherwise.
    pub fn visible_df(&self) -> &DataFrame {
        match self.filtered_df.as_ref() {
            Some(filtered) => filtered,
            None => &self.df,
        }
    }

    /// Renders the visible DataFrame as an `egui` table.
    ///
    /// ### Arguments
    ///
    /// * `ui`: A mutable reference to the `egui::Ui` where the table will be rendered.
    pub fn render_table(&self, ui: &mut Ui) {
        let df = self.visible_df();

        // Header rendering closure: displays the column names.
        let analyze_header = |mut table_row: TableRow<'_, '_>| {
            for column_name in df.get_column_names() {
                table_row.col(|ui| {
                    ui.horizontal_centered(|ui| {
                        ui.strong(column_name.to_string());
                    });
                });
            }
        };

        // Rows rendering closure: displays the data for each row in the DataFrame.
        let analyze_rows = |mut table_row: TableRow<'_, '_>| {
            let row_index = table_row.index();

            // Iterate over all columns in the DataFrame.
            for column in df.columns() {
                let dtype = column.dtype();

                // Determine layout based on data type: numbers to the right,
                // dates and booleans centered, everything else to the left.
                let layout = if dtype.is_float() {
                    Layout::right_to_left(egui::Align::Center)
                } else if dtype.is_integer() || dtype.is_date() || dtype.is_bool() {
                    Layout::centered_and_justified(Direction::LeftToRight)
                } else {
                    Layout::left_to_right(egui::Align::Center)
                };

                // Get the cell value and format it as a string.
                let value = match column.get(row_index) {
                    Ok(AnyValue::String(s)) => s.to_string(), // Directly use the string.
                    Ok(AnyValue::Null) => "".to_string(),     // Display empty string for nulls.
                    Ok(av) => av.to_string(),                 // Use to_string() for other types.
                    Err(_) => "Error: Value not found".to_string(),
                };

                // Add the cell to the table row.
                table_row.col(|ui| {
                    // Set the layout for the cell (determined earlier) and disable text wrapping.
                    ui.with_layout(layout.with_main_wrap(false), |ui| {
                        ui.label(value); // Display the formatted value.
                    });
                });
            }
        };

        let style = ui.style();
        let text_height = TextStyle::Body.resolve(style).size;
        let col_number = df.width().max(1) as f32;
        let available_space = ui.available_width()
            - col_number * style.spacing.item_spacing.x
            - style.spacing.scroll.bar_width;

        // Initial and minimal column widths, calculated based on available space and number of columns.
        let initial_col_width = available_space / col_number;
        let header_height = style.spacing.interact_size.y + 2.0 * style.spacing.item_spacing.y;
        let min_col_width = style.spacing.interact_size.x.max(initial_col_width / 4.0);

        // Configure table columns with initial width, minimum width, resizability, and clipping.
        let column = Column::initial(initial_col_width)
            .at_least(min_col_width)
            .resizable(true)
            .clip(true);

        // Build and display the table using `egui_extras::TableBuilder`.
        TableBuilder::new(ui)
            .striped(true) // Alternate row background colors for better readability.
            .columns(column, df.width()) // Set up the columns.
            .column(Column::remainder()) // Add the remainder
            .auto_shrink([false, false]) // Disable auto-shrinking to fit content.
            .header(header_height, analyze_header) // Render the table header.
            .body(|body| {
                let num_rows = df.height();
                body.rows(text_height, num_rows, analyze_rows); // Render the table rows.
            });
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// cargo test -- --show-output tests_container
#[cfg(test)]
mod tests_container {
    use super::*;
    use crate::MapKind;
    use std::{fs::File, io::Write};
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> GeoMapResult<(NamedTempFile, DataSource)> {
        let temp_file = tempfile::Builder::new().suffix(".csv").tempfile()?;
        let mut file = File::create(temp_file.path())?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        let source = DataSource {
            absolute_path: temp_file.path().to_path_buf(),
            ..Default::default()
        };

        Ok((temp_file, source))
    }

    #[tokio::test]
    async fn test_load_data_aggregates_counts() -> GeoMapResult<()> {
        let csv_content = "\
country,value
Slovenia,1
France,2
Slovenia,3";
        let (_temp_file, source) = write_csv(csv_content)?;

        let container = GeoMapContainer::load_data(source).await?;

        assert_eq!(container.selection.column, "country");
        assert_eq!(container.selection.map, MapKind::Europe);
        assert_eq!(container.region_counts.get("SI"), Some(&2));
        assert_eq!(container.region_counts.get("FR"), Some(&1));
        assert!(container.filtered_df.is_none());
        assert_eq!(container.visible_df().height(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_load_data_auto_selects_usa() -> GeoMapResult<()> {
        let csv_content = "\
state,value
Montana,1
Iowa,2";
        let (_temp_file, source) = write_csv(csv_content)?;

        let container = GeoMapContainer::load_data(source).await?;

        assert_eq!(container.selection.map, MapKind::Usa);
        assert_eq!(container.region_counts.get("US-MT"), Some(&1));
        assert_eq!(container.region_counts.get("US-IA"), Some(&1));

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_update_selection_filters_rows() -> GeoMapResult<()> {
        let csv_content = "\
country,value
Slovenia,1
France,2
Slovenia,3";
        let (_temp_file, source) = write_csv(csv_content)?;

        let container = GeoMapContainer::load_data(source).await?;

        let selection = Selection {
            regions: vec!["SI".to_string()],
            ..container.selection.as_ref().clone()
        };
        let container = container.update_selection(selection).await?;

        let filtered = container.filtered_df.as_ref().as_ref().unwrap();
        assert_eq!(filtered.height(), 2);
        assert_eq!(container.visible_df().height(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_selection_column_change_resets_regions() -> GeoMapResult<()> {
        let csv_content = "\
country,state
Slovenia,Montana
France,Iowa";
        let (_temp_file, source) = write_csv(csv_content)?;

        let container = GeoMapContainer::load_data(source).await?;
        assert_eq!(container.selection.column, "country");

        let selection = Selection {
            column: "state".to_string(),
            regions: vec!["SI".to_string()],
            ..container.selection.as_ref().clone()
        };
        let container = container.update_selection(selection).await?;

        // The map follows the new column and stale regions are dropped.
        assert_eq!(container.selection.map, MapKind::Usa);
        assert!(container.selection.regions.is_empty());
        assert!(container.filtered_df.is_none());

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_restore_selection_keeps_map_and_regions() -> GeoMapResult<()> {
        let csv_content = "\
country,value
Slovenia,1
France,2
Slovenia,3";
        let (_temp_file, source) = write_csv(csv_content)?;

        let container = GeoMapContainer::load_data(source).await?;

        let saved = Selection {
            column: "country".to_string(),
            map: MapKind::Europe,
            regions: vec!["SI".to_string()],
        };
        let container = container.restore_selection(saved.clone()).await?;

        // No reset logic: the stored triple is applied verbatim.
        assert_eq!(container.selection.as_ref(), &saved);
        let filtered = container.filtered_df.as_ref().as_ref().unwrap();
        assert_eq!(filtered.height(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_string_columns() -> GeoMapResult<()> {
        let csv_content = "\
country,value
Slovenia,1";
        let (_temp_file, source) = write_csv(csv_content)?;

        let container = GeoMapContainer::load_data(source).await?;
        assert_eq!(container.string_columns(), vec!["country".to_string()]);

        Ok(())
    }
}
