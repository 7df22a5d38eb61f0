#![warn(clippy::all)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use geomap_view::{Arguments, DataSource, GeoMapApp, GeoMapContainer, MapKind, Selection};
use tracing::error;

/*
cargo fmt
cargo test -- --nocapture
cargo test -- --show-output tests_aggregate
cargo run -- --help
cargo run -- data.csv -c Country
cargo doc --open
cargo b -r && cargo install --path=.
*/

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    // Initialize the tracing subscriber for logging.
    // Use RUST_LOG environment variable to set logging level.  eg `export RUST_LOG=info`
    tracing_subscriber::fmt::init();

    // Parse command-line arguments.
    let args = Arguments::build();

    // Configure the native options for the eframe application.
    let native_options = eframe::NativeOptions {
        centered: true,
        persist_window: true,
        vsync: true,
        viewport: egui::ViewportBuilder::default().with_drag_and_drop(true),
        ..Default::default()
    };

    // Run the eframe application.
    eframe::run_native(
        "GeoMapView",
        native_options,
        Box::new(move |creation_context| {
            // Create a new GeoMapApp. If a path is provided, load the data.
            let app = if args.path.is_file() {
                // Create the data source from command line arguments.
                let source = DataSource::new(&args)?;

                // RUST_LOG=debug cargo run -- data.csv
                tracing::debug!("main()\nDataSource: {source:#?}");

                let column_override = args.column.clone();
                let map_override = args.map.clone();

                // Load the data, then apply the optional column/map overrides.
                // A column change re-derives the base map, so the map override
                // is applied last.
                let future = async move {
                    let mut container = GeoMapContainer::load_data(source).await?;

                    if let Some(column) = column_override {
                        let selection = Selection {
                            column,
                            ..container.selection.as_ref().clone()
                        };
                        container = container.update_selection(selection).await?;
                    }

                    if let Some(map) = map_override {
                        let selection = Selection {
                            map: MapKind::from_name(&map)?,
                            ..container.selection.as_ref().clone()
                        };
                        container = container.update_selection(selection).await?;
                    }

                    Ok(container)
                };

                // Create a new GeoMapApp with the data loading future.
                GeoMapApp::new_with_future(creation_context, Box::new(Box::pin(future)))
            } else {
                // Create a new GeoMapApp without loading data.
                GeoMapApp::new(creation_context)
            };

            match app {
                Ok(app) => Ok(Box::new(app)),
                Err(err) => {
                    error!("Failed to initialize GeoMapApp: {}", err); //Log
                    panic!("Failed to initialize GeoMapApp: {err}"); //Panic
                }
            }
        }),
    )
}
