use crate::{FileExtension, GeoMapContainer, GeoMapError, GeoMapResult};

use egui::Context;
use polars::prelude::*;
use rfd::AsyncFileDialog;
use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::oneshot;
use tracing::error;

/// Opens a file dialog asynchronously, allowing the user to choose a dataset.
///
/// This function uses the `rfd::AsyncFileDialog` to present a native file
/// dialog to the user. If the user selects a file, the function returns the
/// full path to that file. If the user cancels the dialog, the function
/// returns a `GeoMapError::FileNotFound` error.
///
/// # Returns
///
/// - `Ok(PathBuf)`: The path to the selected file if the user successfully chooses one.
/// - `Err(GeoMapError::FileNotFound)`: If the user cancels the dialog (no file is selected).
pub async fn open_file() -> GeoMapResult<PathBuf> {
    // Open the file dialog. `pick_file` returns an `Option<FileHandle>`.
    let opt_file = AsyncFileDialog::new().pick_file().await;

    opt_file
        .map(|file| file.path().to_path_buf()) // Extract PathBuf from FileHandle.
        .ok_or_else(|| GeoMapError::FileNotFound(PathBuf::new())) // Convert None to error.
}

/// Exports the currently visible rows to a file chosen by the user.
///
/// When regions are selected on the map, the exported DataFrame is the
/// filtered subset; otherwise the full dataset is written. Supported formats
/// are CSV, Json, NDJson (Newline-Delimited Json) and Parquet, selected via
/// the dialog's format filters.
///
/// ### Arguments
///
/// * `container`: The `GeoMapContainer` holding the data, wrapped in an `Arc`
///   for shared ownership.
/// * `ctx`: The `egui::Context` for UI interaction, needed for repainting the
///   UI after the export completes.
///
/// ### Returns
///
/// A `GeoMapResult<()>` indicating success or failure of the export.
pub async fn save_as(container: Arc<GeoMapContainer>, ctx: Context) -> GeoMapResult<()> {
    // 1. Determine the default file name from the original file's name (if
    //    available). If there's no original file, default to "regions.csv".
    let default_file_name = container
        .source
        .absolute_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("regions.csv");

    // 2. Open the save file dialog, pre-setting the filename and providing format filters.
    let file = AsyncFileDialog::new()
        .add_filter("CSV", &["csv"])
        .add_filter("Json", &["json"])
        .add_filter("NDJson", &["ndjson"])
        .add_filter("Parquet", &["parquet"])
        .set_file_name(default_file_name)
        .save_file()
        .await;

    // 3. Handle the user's file selection (if any). `file` is an `Option<FileHandle>`.
    if let Some(file) = file {
        // Clone the visible DataFrame. Needed for thread safety in the blocking task.
        let mut df = container.visible_df().clone();

        // 4. Create a channel for communicating the write result *before* spawning
        //    the blocking task, so the receiving end is ready before sending.
        let (tx, rx) = oneshot::channel::<GeoMapResult<()>>();

        // 5. Spawn a blocking task for the file-writing operation to avoid
        //    blocking the UI thread.
        let _handle = tokio::task::spawn_blocking(move || {
            let result =
                write_dataframe(&mut df, file.path(), &container.source.csv_delimiter);

            // 6. Send the result of the file-writing operation and request a UI
            //    repaint *within* the `spawn_blocking` closure.
            if tx.send(result).is_err() {
                error!("The receiver has been dropped."); // Log a warning if sending fails.
            }

            ctx.request_repaint(); // Request a repaint of the UI. Essential for updates.
        });

        // 7. Await the result from the channel. The outer `?` covers the
        //    channel itself, the inner one the write result.
        rx.await
            .map_err(|e| GeoMapError::ChannelReceive(e.to_string()))??;
    }

    Ok(()) // Return Ok even if the user cancelled the dialog (no file selected).
}

/// Writes a DataFrame to `path` in the format implied by its extension.
///
/// Supported formats are CSV (using `csv_delimiter` as separator), Json,
/// NDJson and Parquet; any other extension is an
/// `GeoMapError::UnsupportedFileType`.
pub fn write_dataframe(df: &mut DataFrame, path: &Path, csv_delimiter: &str) -> GeoMapResult<()> {
    match FileExtension::from_path(path) {
        FileExtension::Csv => {
            // Reuse the CSV separator from the loader settings.
            let delimiter = csv_delimiter
                .as_bytes()
                .first()
                .copied()
                .ok_or_else(|| GeoMapError::InvalidDelimiter(csv_delimiter.to_string()))?;
            let mut file = File::create(path)?;
            CsvWriter::new(&mut file)
                .with_separator(delimiter)
                .finish(df)
                .map_err(GeoMapError::from)
        }
        FileExtension::Json => {
            let mut file = File::create(path)?;
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::Json)
                .finish(df)
                .map_err(GeoMapError::from)
        }
        FileExtension::NDJson => {
            let mut file = File::create(path)?;
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::JsonLines) // Use JsonLines for NDJson
                .finish(df)
                .map_err(GeoMapError::from)
        }
        FileExtension::Parquet => {
            let mut file = File::create(path)?;
            ParquetWriter::new(&mut file)
                .finish(df)
                .map_err(GeoMapError::from)?;
            Ok(())
        }
        // If the user doesn't select a filter, rfd defaults to the
        // first filter (CSV), so this error should rarely occur.
        FileExtension::Unknown(_) | FileExtension::Missing => Err(
            GeoMapError::UnsupportedFileType("Unsupported file extension for saving".to_string()),
        ),
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//
