use crate::{Arguments, FileExtension, GeoMapError, GeoMapResult, PathExtension, UniqueElements};

use egui::{DragValue, Grid, TextEdit, Ui};
use polars::prelude::*;
use tokio::task::spawn_blocking;

use std::{
    fmt::Debug,
    fs::File,
    num::NonZero,
    path::{Path, PathBuf},
};

// --- Constants ---

/// Static string listing common values treated as null/missing during CSV parsing.
/// The `r#""#` syntax denotes a raw string literal, avoiding the need to escape quotes.
pub static NULL_VALUES: &str = r#""", <N/D>"#;

/// Default delimiter used for CSV parsing if not specified or detected.
pub static DEFAULT_CSV_DELIMITER: &str = ",";

const DEFAULT_INFER_SCHEMA_ROWS: usize = 200;

// --- DataSource Struct ---

/// Holds configuration parameters related to **loading** data.
///
/// This struct defines how the dataset file is read: path, CSV delimiter,
/// schema-inference depth and custom null markers. Instances are created from
/// `Arguments`, updated by the side-panel UI in `render_loader`, and passed to
/// `GeoMapContainer::load_data`. Changes here trigger a data reload.
#[derive(Debug, Clone, PartialEq)] // PartialEq allows simple change detection
pub struct DataSource {
    /// The canonical, absolute path to the data file.
    pub absolute_path: PathBuf,
    /// The character used to separate columns in a CSV file.
    pub csv_delimiter: String,
    /// Maximum rows to scan for schema inference (CSV, JSON, NDJson).
    pub infer_schema_rows: usize,
    /// Comma-separated string of values to interpret as nulls during CSV parsing.
    pub null_values: String,
}

impl Default for DataSource {
    /// Creates a default `DataSource` with sensible initial values.
    fn default() -> Self {
        DataSource {
            absolute_path: PathBuf::new(),
            csv_delimiter: DEFAULT_CSV_DELIMITER.to_string(),
            infer_schema_rows: DEFAULT_INFER_SCHEMA_ROWS,
            null_values: NULL_VALUES.to_string(),
        }
    }
}

// --- Methods ---

impl DataSource {
    /// Creates a `DataSource` from the parsed command-line arguments.
    pub fn new(args: &Arguments) -> GeoMapResult<Self> {
        let mut source = DataSource {
            csv_delimiter: args.delimiter.clone(),
            null_values: args.null_values.clone(),
            ..Default::default()
        };
        source.set_path(&args.path)?;
        Ok(source)
    }

    /// Sets the data source path, canonicalizing it.
    pub fn set_path(&mut self, path: &Path) -> GeoMapResult<()> {
        self.absolute_path = path.canonicalize()?;
        tracing::debug!("absolute_path set to: {:#?}", self.absolute_path);
        Ok(())
    }

    /// Gets the file extension from `absolute_path` in lowercase.
    pub fn get_extension(&self) -> Option<String> {
        self.absolute_path.extension_as_lowercase()
    }

    /// Determines the `FileExtension` and orchestrates loading the DataFrame
    /// using the appropriate Polars reader. Called by
    /// `GeoMapContainer::load_data`.
    ///
    /// **Important:** It mutates `self` by potentially updating
    /// `csv_delimiter` if automatic detection during `read_csv_data` finds a
    /// different working delimiter than initially configured.
    ///
    /// ### Returns
    /// A `GeoMapResult` containing a tuple `(DataFrame, FileExtension)` on
    /// success, or a `GeoMapError` (e.g. `FileType`, `CsvParsing`) on failure.
    pub async fn get_df_and_extension(&mut self) -> GeoMapResult<(DataFrame, FileExtension)> {
        let extension = FileExtension::from_path(&self.absolute_path);

        let (df, detected_delimiter) = match &extension {
            FileExtension::Csv => self.read_csv_data().await?,
            FileExtension::Json => self.read_json_data().await?,
            FileExtension::NDJson => self.read_ndjson_data().await?,
            FileExtension::Parquet => self.read_parquet_data().await?,
            // Handle unsupported or missing extensions with specific errors.
            FileExtension::Unknown(ext) => {
                return Err(GeoMapError::FileType(format!(
                    "Unsupported extension: `{}` for file: `{}`",
                    ext,
                    self.absolute_path.display()
                )));
            }
            FileExtension::Missing => {
                return Err(GeoMapError::FileType(format!(
                    "Missing extension for file: `{}`",
                    self.absolute_path.display()
                )));
            }
        };

        // If reading a CSV successfully detected a working delimiter, update
        // the source state so the UI reflects the delimiter actually used.
        if let Some(byte) = detected_delimiter {
            self.csv_delimiter = (byte as char).to_string();
        }

        tracing::debug!(
            "fn get_df_and_extension(): Successfully loaded DataFrame with extension: {:?}",
            extension
        );

        Ok((df, extension))
    }

    // --- Data Reading Helper Methods ---

    /// Reads a standard JSON file into a Polars DataFrame.
    async fn read_json_data(&self) -> GeoMapResult<(DataFrame, Option<u8>)> {
        tracing::debug!("Reading JSON data from: {}", self.absolute_path.display());
        let file = File::open(&self.absolute_path)?;
        let infer_schema_rows_for_task = self.infer_schema_rows;

        // Execute the blocking read operation on a separate thread.
        let df = execute_polars_blocking(move || {
            JsonReader::new(file)
                .infer_schema_len(NonZero::new(infer_schema_rows_for_task))
                .finish()
        })
        .await?;

        tracing::debug!("JSON read complete. Shape: {:?}", df.shape());

        Ok((df, None))
    }

    /// Reads a Newline-Delimited JSON (NDJson / JSON Lines) file into a Polars
    /// DataFrame. Uses `LazyJsonLineReader` for better memory behavior on
    /// large files.
    async fn read_ndjson_data(&self) -> GeoMapResult<(DataFrame, Option<u8>)> {
        tracing::debug!("Reading NDJSON data from: {}", self.absolute_path.display());

        let path_for_task = PlRefPath::try_from_pathbuf(self.absolute_path.clone())?;
        let infer_schema_rows_for_task = self.infer_schema_rows;

        let df = execute_polars_blocking(move || {
            let lazyframe = LazyJsonLineReader::new(path_for_task)
                .low_memory(false)
                .with_infer_schema_length(NonZero::new(infer_schema_rows_for_task))
                .with_ignore_errors(true)
                .finish()?;

            // Collect the lazy frame - this is the blocking part.
            lazyframe.with_new_streaming(true).collect()
        })
        .await?;

        tracing::debug!("NDJSON read complete. Shape: {:?}", df.shape());
        Ok((df, None))
    }

    /// Reads an Apache Parquet file into a Polars DataFrame.
    async fn read_parquet_data(&self) -> GeoMapResult<(DataFrame, Option<u8>)> {
        tracing::debug!(
            "Reading Parquet data from: {}",
            self.absolute_path.display()
        );

        let path_for_task = PlRefPath::try_from_pathbuf(self.absolute_path.clone())?;
        let args = ScanArgsParquet {
            low_memory: false,
            ..Default::default()
        };

        let df = execute_polars_blocking(move || {
            let lazyframe = LazyFrame::scan_parquet(path_for_task, args)?;
            lazyframe.with_new_streaming(true).collect()
        })
        .await?;

        tracing::debug!("Parquet read complete. Shape: {:?}", df.shape());

        Ok((df, None))
    }

    /// Reads a CSV file, attempting automatic delimiter detection if the
    /// initial one fails. Iterates through common delimiters and tries reading
    /// a small chunk first for efficiency.
    ///
    /// ### Returns
    /// A `GeoMapResult` containing `(DataFrame, Option<u8>)` where the
    /// `Option<u8>` is the *successfully used* delimiter byte. Returns
    /// `Err(GeoMapError::CsvParsing)` if no common delimiter works.
    async fn read_csv_data(&self) -> GeoMapResult<(DataFrame, Option<u8>)> {
        // Get the currently configured separator byte. Error if invalid.
        let initial_separator = self.get_csv_separator()?;

        // List of common delimiters to try, starting with the configured one.
        let mut delimiters_to_try = vec![initial_separator, b',', b';', b'|', b'\t', b':'];
        delimiters_to_try.unique();
        tracing::debug!(
            "Attempting CSV read. Delimiters to try: {:?}",
            delimiters_to_try
                .iter()
                .map(|&b| b as char)
                .collect::<Vec<_>>()
        );

        let mut iterator = delimiters_to_try.iter().peekable();

        while let Some(&delimiter) = iterator.next() {
            // If peek() returns None, the current item was the last one.
            let is_last_element = iterator.peek().is_none();

            // 1. Quick check: read only a small chunk. Fails fast when the
            //    delimiter is fundamentally wrong (results in 1 column).
            if self
                .attempt_csv_parse_structure(delimiter, is_last_element)
                .await
                .is_ok()
            {
                // 2. Full read after the quick check passed.
                tracing::debug!(
                    "Trying to read full CSV file with delimiter: '{}'",
                    delimiter as char
                );
                match self.attempt_read_csv(delimiter) {
                    Ok(lazyframe) => {
                        tracing::info!(
                            "Successfully read CSV with delimiter: '{}'",
                            delimiter as char
                        );

                        // Execute the lazy plan and collect on a blocking thread.
                        let df = execute_polars_blocking(move || {
                            lazyframe.with_new_streaming(true).collect()
                        })
                        .await?;

                        tracing::debug!("Data collection complete. Shape: {:?}", df.shape());
                        return Ok((df, Some(delimiter)));
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Full CSV read failed with delimiter '{}' after quick check passed: {}",
                            delimiter as char,
                            e
                        );
                        continue;
                    }
                }
            }
            // If the quick check fails, implicitly try the next delimiter.
        }

        // If all delimiters failed, return a parsing error.
        let msg = format!(
            "Failed to read CSV '{}' with common delimiters. Check format or specify delimiter.",
            self.absolute_path.display()
        );
        let error = GeoMapError::CsvParsing(msg);
        tracing::error!("{}", error);
        Err(error)
    }

    /// Retrieves the CSV separator byte from the `csv_delimiter` String.
    ///
    /// ### Returns
    /// `Ok(u8)` containing the first byte, or
    /// `Err(GeoMapError::InvalidDelimiter)` if the string is empty.
    fn get_csv_separator(&self) -> GeoMapResult<u8> {
        self.csv_delimiter
            .as_bytes()
            .first()
            .copied()
            .ok_or_else(|| GeoMapError::InvalidDelimiter(self.csv_delimiter.clone()))
    }

    /// Attempts to parse the CSV structure from the initial chunk of the file
    /// using a specific delimiter and validates the result.
    async fn attempt_csv_parse_structure(
        &self,
        delimiter: u8,
        is_last_element: bool,
    ) -> GeoMapResult<()> {
        // Number of data rows to read during this quick probe. Enough context
        // without reading the whole file.
        const ROW_LIMIT: usize = 100;

        tracing::debug!("Trying to parse CSV with delimiter: '{}'", delimiter as char);

        let data_frame =
            read_csv_partial_from_path(delimiter, ROW_LIMIT, &self.absolute_path).await?;

        // Basic validation: a single resulting column almost certainly means
        // the wrong delimiter. This check is crucial for the detection loop.
        if data_frame.width() <= 1 && !is_last_element {
            tracing::warn!(
                "CSV read with delimiter '{}' resulted in {} column(s). Assuming incorrect delimiter.",
                delimiter as char,
                data_frame.width(),
            );
            return Err(GeoMapError::CsvParsing(format!(
                "Delimiter '{}' likely incorrect (resulted in {} columns)",
                delimiter as char,
                data_frame.width()
            )));
        }

        tracing::debug!(
            "CSV probe successful with delimiter '{}'. Shape (rows, columns): {:?}",
            delimiter as char,
            data_frame.shape()
        );

        Ok(())
    }

    /// Configures the full lazy CSV read with settings from `self`.
    fn attempt_read_csv(&self, delimiter: u8) -> GeoMapResult<LazyFrame> {
        tracing::debug!("Attempting CSV read with delimiter: '{}'", delimiter as char);

        let null_markers: Vec<PlSmallStr> = self
            .parse_null_values()
            .into_iter()
            .map(PlSmallStr::from_str)
            .collect();

        let plpath = PlRefPath::try_from_pathbuf(self.absolute_path.clone())?;

        // Configure the LazyCsvReader using settings from `self`.
        let lazyframe = LazyCsvReader::new(plpath)
            .with_low_memory(false)
            .with_encoding(CsvEncoding::LossyUtf8) // Gracefully handle potential encoding errors.
            .with_has_header(true) // Assume a header row.
            .with_try_parse_dates(true) // Attempt automatic date parsing.
            .with_separator(delimiter) // Use the specified delimiter.
            .with_infer_schema_length(Some(self.infer_schema_rows))
            .with_ignore_errors(true) // Rows with parsing errors become nulls instead of stopping the read.
            .with_missing_is_null(true) // Treat missing fields as null.
            .with_null_values(Some(NullValues::AllColumns(null_markers)))
            .with_rechunk(true) // Rechunk the memory to contiguous chunks when parsing is done.
            .finish()?;

        Ok(lazyframe)
    }

    /// Parses the comma-separated `null_values` string into a `Vec<&str>`,
    /// removing surrounding double quotes if present.
    ///
    /// Example input: `"\"\", \" \", <N/D>, NA "`
    /// Example output: `vec!["", " ", "<N/D>", "NA"]`
    pub fn parse_null_values(&self) -> Vec<&str> {
        self.null_values
            .split(',')
            .map(|s| {
                let trimmed = s.trim();
                if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
                    trimmed[1..trimmed.len() - 1].trim()
                } else {
                    trimmed
                }
            })
            .collect()
    }

    // --- UI Rendering Methods ---

    /// Renders the UI widgets for configuring the data loader within the
    /// "Loading" collapsing header. Called by `layout.rs::render_side_panel`.
    ///
    /// **Crucially, it takes `&mut self`. Widgets modify `self` directly.**
    /// It compares the state of `self` before and after rendering the widgets
    /// and returns `Some(self.clone())` when the user asked for a reload with
    /// changed settings.
    ///
    /// ### Returns
    /// * `Some(DataSource)`: if settings changed and "Reload" was clicked.
    /// * `None`: otherwise.
    pub fn render_loader(&mut self, ui: &mut Ui) -> Option<DataSource> {
        let source_before_render = self.clone();
        let mut result = None;

        let grid = Grid::new("data_loader_grid")
            .num_columns(2)
            .spacing([10.0, 20.0])
            .striped(true);

        grid.show(ui, |ui| {
            // CSV-specific settings: delimiter.
            if self.get_extension().as_deref() == Some("csv") {
                ui.label("CSV Delimiter:");
                let csv_delimiter_edit = TextEdit::singleline(&mut self.csv_delimiter)
                    .char_limit(1)
                    .desired_width(f32::INFINITY);
                ui.add(csv_delimiter_edit)
                    .on_hover_text("Enter the single character CSV delimiter");
                ui.end_row();
            }

            // Input for schema inference length (only for relevant file types).
            if matches!(
                self.get_extension().as_deref(),
                Some("csv" | "json" | "ndjson")
            ) {
                ui.label("Infer Rows:");
                ui.add(
                    DragValue::new(&mut self.infer_schema_rows)
                        .speed(1)
                        .range(0..=usize::MAX),
                )
                .on_hover_text(
                    "Number of rows to scan for inferring data types (CSV/JSON)\n0: No inference",
                );
                ui.end_row();
            }

            // Null markers input.
            ui.label("Null Values:");
            let null_values_edit =
                TextEdit::singleline(&mut self.null_values).desired_width(f32::INFINITY);
            ui.add(null_values_edit).on_hover_text(
                "Comma-separated values to interpret as null during loading.\n\
                Leading/trailing whitespace for each value is automatically trimmed.",
            );
            ui.end_row();

            ui.label("");
            if ui.button("Reload").clicked() && *self != source_before_render {
                tracing::debug!("Change detected in DataSource UI.");
                result = Some(self.clone());
            }
            ui.end_row();
        });

        result
    }
}

/// Reads a CSV file from the specified path using Polars, applying the given
/// delimiter and limiting the number of data rows read. Suitable for probing
/// structure during delimiter detection.
pub async fn read_csv_partial_from_path(
    delimiter: u8,
    n_rows: usize,
    path: &Path,
) -> GeoMapResult<DataFrame> {
    tracing::debug!("Read a CSV file using Polars limited to {} rows.", n_rows);

    // 1. Define the CSV parsing options.
    let csv_parse_options = CsvParseOptions::default()
        .with_encoding(CsvEncoding::LossyUtf8) // Handle potentially non-strict UTF8
        .with_missing_is_null(true) // Treat empty fields as nulls
        .with_separator(delimiter); // Set the chosen delimiter

    // 2. Define the main CSV reading options.
    let csv_read_options = CsvReadOptions::default()
        .with_parse_options(csv_parse_options)
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // Header only: no data rows used for type inference.
        .with_ignore_errors(true)
        .with_n_rows(Some(n_rows))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?;

    // 3. Execute the blocking read operation on a separate thread.
    let df = execute_polars_blocking(move || csv_read_options.finish()).await?;

    tracing::debug!("Partial CSV read complete. Shape: {:?}", df.shape());
    Ok(df)
}

/// Executes a potentially blocking Polars operation on a separate Tokio
/// blocking thread.
///
/// Wraps the closure `op` which is expected to return a `PolarsResult<T>`,
/// runs it with `spawn_blocking`, awaits the result, and maps both the
/// `JoinError` and the inner `PolarsError` to `GeoMapError`.
pub async fn execute_polars_blocking<T, F>(op: F) -> GeoMapResult<T>
where
    F: FnOnce() -> Result<T, PolarsError> + Send + 'static,
    T: Debug + Send + 'static,
{
    // Spawn the blocking task.
    let result_from_task = spawn_blocking(op).await;

    // Map JoinError to GeoMapError::TokioJoin.
    let polars_result = result_from_task.map_err(GeoMapError::from)?;

    // Map PolarsError to GeoMapError::Polars.
    let final_result = polars_result.map_err(GeoMapError::from)?;

    Ok(final_result)
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// cargo test -- --show-output tests_data_source
#[cfg(test)]
mod tests_data_source {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn setup_test_csv(content: &str, delimiter: char) -> GeoMapResult<(NamedTempFile, DataSource)> {
        let temp_file = tempfile::Builder::new().suffix(".csv").tempfile()?;
        let file_path = temp_file.path().to_path_buf();

        let mut file = File::create(&file_path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        let source = DataSource {
            absolute_path: file_path,
            csv_delimiter: delimiter.to_string(),
            ..Default::default()
        };

        Ok((temp_file, source))
    }

    #[test]
    fn test_parse_null_values() {
        let source = DataSource {
            null_values: r#""", " ", <N/D>, NA "#.to_string(),
            ..Default::default()
        };
        assert_eq!(source.parse_null_values(), vec!["", " ", "<N/D>", "NA"]);
    }

    #[test]
    fn test_get_csv_separator() {
        let source = DataSource::default();
        assert_eq!(source.get_csv_separator().unwrap(), b',');

        let empty = DataSource {
            csv_delimiter: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            empty.get_csv_separator(),
            Err(GeoMapError::InvalidDelimiter(_))
        ));
    }

    #[tokio::test]
    async fn test_csv_read_with_configured_delimiter() -> GeoMapResult<()> {
        let csv_content = "\
country;count
Slovenia;10
France;20";
        let (_temp_file, mut source) = setup_test_csv(csv_content, ';')?;

        let (df, extension) = source.get_df_and_extension().await?;
        assert_eq!(extension, FileExtension::Csv);
        assert_eq!(df.shape(), (2, 2));
        assert_eq!(source.csv_delimiter, ";");

        Ok(())
    }

    #[tokio::test]
    async fn test_csv_delimiter_auto_detection() -> GeoMapResult<()> {
        // Configured delimiter is wrong; detection should fall through to ';'.
        let csv_content = "\
country;count
Slovenia;10
France;20";
        let (_temp_file, mut source) = setup_test_csv(csv_content, '|')?;

        let (df, _) = source.get_df_and_extension().await?;
        assert_eq!(df.shape(), (2, 2));
        assert_eq!(source.csv_delimiter, ";");

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_extension_is_rejected() {
        let mut source = DataSource {
            absolute_path: PathBuf::from("map.geojson"),
            ..Default::default()
        };
        assert!(matches!(
            source.get_df_and_extension().await,
            Err(GeoMapError::FileType(_))
        ));
    }
}
