use crate::{
    DEFAULT_MAP_ASSET, DataSource, DatasetMetadata, Error, GeoMapContainer, GeoMapResult,
    MapBridge, MyStyle, Notification, Selection, clear_script, file_dialog::open_file,
    file_dialog::save_as, parse_selection, regions_script, render_script,
};

use egui::{
    CentralPanel, Color32, Context, Direction, FontId, Frame, Grid, Hyperlink, Layout, RichText,
    ScrollArea, SidePanel, Stroke, TextEdit, TopBottomPanel, ViewportCommand, menu,
    style::Visuals, warn_if_debug_build, widgets,
};
use std::{path::Path, sync::Arc};
use tokio::sync::oneshot::{self, Receiver, error::TryRecvError};
use tracing::error;

/// Type alias for a Result with a `GeoMapContainer`.
pub type ContainerResult = GeoMapResult<GeoMapContainer>;
/// Type alias for a boxed, dynamically dispatched Future that returns a `ContainerResult`.
pub type DataFuture = Box<dyn Future<Output = ContainerResult> + Unpin + Send + 'static>;

/// The main application struct for GeoMapView.
pub struct GeoMapApp {
    /// The `GeoMapContainer` holds the loaded data and the geographic state.
    /// Using Option<Arc> it is more efficient for sharing data across the UI.
    pub data_container: Option<Arc<GeoMapContainer>>,
    /// Loader settings edited in the side panel (path, delimiter, etc.).
    pub data_source: DataSource,
    /// Selection state edited in the side panel (column, map, regions).
    pub selection: Selection,
    /// Metadata extracted from the loaded dataset (if available).
    pub metadata: Option<DatasetMetadata>,
    /// Optional Notification window for displaying errors.
    pub notification: Option<Box<dyn Notification>>,
    /// Script queue feeding the HTML rendering surface.
    pub map_bridge: MapBridge,
    /// Scratch buffer for the comma-separated selection callback payload.
    callback_input: String,
    /// Selection persisted by a previous session, consumed when the first
    /// dataset finishes loading.
    restored: Option<Selection>,

    /// Tokio runtime for asynchronous operations (file loading, aggregation).
    runtime: tokio::runtime::Runtime,
    /// Channel for receiving the result of asynchronous data loading.
    pipe: Option<Receiver<GeoMapResult<GeoMapContainer>>>,
    /// Vector of active asynchronous tasks.  Used to prevent the app from hanging.
    tasks: Vec<tokio::task::JoinHandle<()>>,
}

impl Default for GeoMapApp {
    fn default() -> Self {
        // The region name dictionaries are constant, so they are pushed to
        // the rendering surface once, followed by a blank render.
        let mut map_bridge = MapBridge::new(Path::new(DEFAULT_MAP_ASSET));
        tracing::debug!("surface asset: {}", map_bridge.asset_url());
        match regions_script() {
            Ok(script) => map_bridge.schedule(script),
            Err(err) => error!("Failed to build region dictionaries: {}", err),
        }
        map_bridge.schedule(clear_script());

        Self {
            data_container: None,
            data_source: DataSource::default(),
            selection: Selection::default(),
            metadata: None,
            notification: None,
            map_bridge,
            callback_input: String::new(),
            restored: None,
            runtime: tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .expect("Failed to build Tokio runtime"),
            pipe: None,
            tasks: Vec::new(),
        }
    }
}

impl GeoMapApp {
    /// Creates a new `GeoMapApp` instance.
    pub fn new(cc: &eframe::CreationContext<'_>) -> GeoMapResult<Self> {
        cc.egui_ctx.set_style_init(Visuals::dark()); // Apply custom styles with the dark theme.
        let mut app: Self = Default::default();
        app.restored = Self::stored_selection(cc);
        Ok(app)
    }

    /// Creates a new `GeoMapApp` with a pre-existing `DataFuture`.
    pub fn new_with_future(
        cc: &eframe::CreationContext<'_>,
        future: DataFuture,
    ) -> GeoMapResult<Self> {
        let mut app: Self = Default::default();
        cc.egui_ctx.set_style_init(Visuals::dark());
        app.restored = Self::stored_selection(cc);
        app.run_data_future(future, &cc.egui_ctx);
        Ok(app)
    }

    /// Reads the selection persisted by a previous session, if any.
    fn stored_selection(cc: &eframe::CreationContext<'_>) -> Option<Selection> {
        cc.storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
    }

    /// Checks if a Notification is active and displays it.
    fn check_notification(&mut self, ctx: &Context) {
        if let Some(notification) = &mut self.notification {
            if !notification.show(ctx) {
                self.notification = None; // Remove closed Notification.
            }
        }
    }

    /// Checks if there is a pending data loading operation (asynchronous).
    /// If data is available or an error occurred, process it.  If the operation is still
    /// in progress, keeps it in the `pipe`.  Returns `true` if loading is pending,
    /// and `false` if loading is complete (either with data or an error).
    fn check_data_pending(&mut self, ctx: &Context) -> bool {
        // Attempt to take ownership of the receiver.  If it's None (no pending operation), return false.
        let Some(mut output) = self.pipe.take() else {
            return false;
        };

        // Try to receive a value from the channel without blocking.
        match output.try_recv() {
            // Successfully received data (Ok) or an error (Err) from the background task.
            Ok(data_result) => {
                match data_result {
                    // Data loaded successfully.
                    Ok(container) => {
                        // Update application state with the new data.

                        // 1. Sync the side-panel state with the container:
                        self.data_source = container.source.as_ref().clone();
                        self.selection = container.selection.as_ref().clone();
                        self.callback_input = self.selection.as_callback_payload();

                        // 2. Load metadata (for display in the UI):
                        self.metadata = DatasetMetadata::from_container(&container);

                        // 3. Push the new aggregation to the rendering surface:
                        match render_script(
                            &container.region_counts,
                            container.selection.map,
                            &container.selection.regions,
                        ) {
                            Ok(script) => self.map_bridge.schedule(script),
                            Err(err) => error!("Failed to build render script: {}", err),
                        }

                        // 4. If a previous session stored a selection whose
                        //    column exists in this dataset, recompute with it.
                        //    The stored map and regions are kept as-is.
                        if let Some(saved) = self.restored.take() {
                            if saved != self.selection
                                && container.string_columns().contains(&saved.column)
                            {
                                let future = container.clone().restore_selection(saved);
                                self.run_data_future(Box::new(Box::pin(future)), ctx);
                            }
                        }

                        // 5. Store the GeoMapContainer (wrapped in Arc for shared ownership):
                        self.data_container = Some(Arc::new(container));

                        false // Indicate that data loading is complete.
                    }
                    // An error occurred during data loading.
                    Err(err) => {
                        let error_message = err.to_string();

                        // Create and display the error Notification (to the user).
                        self.notification = Some(Box::new(Error {
                            message: error_message,
                        }));
                        error!("Data loading failed: {}", err); // Log full error details.
                        false // Indicate that data loading is complete (with error).
                    }
                }
            }
            // An error occurred while trying to receive from the channel.
            Err(try_recv_error) => match try_recv_error {
                // The channel is empty (data not yet available).  This is the normal "pending" state.
                TryRecvError::Empty => {
                    // Put the receiver back into `self.pipe` to check again later.
                    self.pipe = Some(output);
                    true // Indicate that data loading is still pending.
                }
                // The channel is closed (the sender was dropped). This is an unexpected error state.
                TryRecvError::Closed => {
                    let err_msg = "Data operation terminated without response.".to_string();
                    // Notify the user and log the error.
                    self.notification = Some(Box::new(Error {
                        message: err_msg.clone(),
                    }));
                    error!("{}", err_msg);
                    false // Indicate data loading is complete (with error).
                }
            },
        }
    }

    /// Runs a `DataFuture` to load or recompute data asynchronously.
    ///
    /// This function takes a future, spawns a Tokio task, and sets up a channel to receive the result.
    fn run_data_future(&mut self, future: DataFuture, ctx: &Context) {
        // Before scheduling a new future, ensure no tasks are stuck
        self.tasks.retain(|task| !task.is_finished());

        // Create a oneshot channel for sending the data from the async task to the UI thread.
        let (tx, rx) = oneshot::channel::<GeoMapResult<GeoMapContainer>>();
        self.pipe = Some(rx);

        // Clone the context for use within the asynchronous task (to request repaints).
        let ctx_clone = ctx.clone();

        // Spawn an async task to load the data.
        let handle = self.runtime.spawn(async move {
            let data = future.await;
            // Handle potential error if the receiver is dropped.
            if tx.send(data).is_err() {
                error!("Receiver dropped before data could be sent.");
            }

            // Request a repaint of the UI to display the loaded data.
            ctx_clone.request_repaint();
        });

        self.tasks.push(handle); // Track the task.
    }

    /// Schedules an `update_selection` recomputation for the given selection.
    fn apply_selection(&mut self, selection: Selection, ctx: &Context) {
        if let Some(container) = &self.data_container {
            let future = container.as_ref().clone().update_selection(selection);
            self.run_data_future(Box::new(Box::pin(future)), ctx);
        }
    }
}

// See
// https://github.com/emilk/egui/blob/master/examples/custom_window_frame/src/main.rs
// https://rodneylab.com/trying-egui/

impl eframe::App for GeoMapApp {
    /// Persists the selection (column, map, regions) so the next session
    /// can restore it.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.selection);
    }

    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        // Check and display any active Notifications (errors, etc.).
        self.check_notification(ctx);

        // Handle dropped files.
        if let Some(dropped_file) = ctx.input(|i| i.raw.dropped_files.last().cloned()) {
            if let Some(path) = &dropped_file.path {
                if let Err(err) = self.data_source.set_path(path) {
                    error!("Invalid dropped path: {}", err);
                } else {
                    let future = GeoMapContainer::load_data(self.data_source.clone());
                    self.run_data_future(Box::new(Box::pin(future)), ctx);
                }
            }
        }

        // Define the main UI layout.
        //
        //  | menu_bar        widgets |
        //  ---------------------------
        //  |         |               |
        //  | Regions |     main      |
        //  | & Data  |     table     |
        //  |         |               |
        //  ---------------------------
        //  | selection footer        |

        TopBottomPanel::top("top_panel").show(ctx, |ui| {
            menu::bar(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.menu_button("File", |ui| {
                        if ui.button("Open").clicked() {
                            // Open a file dialog to select a file.
                            if let Ok(path) = self.runtime.block_on(open_file()) {
                                if let Err(err) = self.data_source.set_path(&path) {
                                    error!("Invalid path: {}", err);
                                } else {
                                    let future =
                                        GeoMapContainer::load_data(self.data_source.clone());
                                    self.run_data_future(Box::new(Box::pin(future)), ctx);
                                }
                            }
                            ui.close_menu();
                        }

                        // Export the visible rows (the filtered subset when
                        // regions are selected).
                        if ui.button("Save as").clicked() {
                            if let Some(container) = &self.data_container {
                                // Cheap Arc clone, just incrementing the reference count.
                                let container_clone = container.clone();
                                let ctx_clone = ctx.clone();

                                // Spawn an async task so saving doesn't block the UI.
                                self.runtime.spawn(async move {
                                    if let Err(err) = save_as(container_clone, ctx_clone).await {
                                        error!("Failed to save file: {}", err);
                                    }
                                });
                            }
                            ui.close_menu();
                        }

                        ui.menu_button("About", |ui| {
                            // Display application information.
                            Frame::default()
                                .stroke(Stroke::new(1.0, Color32::GRAY))
                                .outer_margin(2.0)
                                .inner_margin(10.0)
                                .show(ui, |ui| {
                                    let version = env!("CARGO_PKG_VERSION");
                                    let authors = env!("CARGO_PKG_AUTHORS");
                                    let description = env!("CARGO_PKG_DESCRIPTION");

                                    Grid::new("about_grid")
                                        .num_columns(1)
                                        .spacing([10.0, 4.0])
                                        .show(ui, |ui| {
                                            ui.with_layout(
                                                Layout::centered_and_justified(
                                                    Direction::LeftToRight,
                                                ),
                                                |ui| {
                                                    ui.label(
                                                        RichText::new("GeoMap View")
                                                            .font(FontId::proportional(30.0)),
                                                    );
                                                },
                                            );
                                            ui.end_row();

                                            ui.with_layout(
                                                Layout::centered_and_justified(
                                                    Direction::LeftToRight,
                                                ),
                                                |ui| {
                                                    ui.label(format!("Version: {version}"));
                                                },
                                            );
                                            ui.end_row();
                                            ui.end_row();

                                            ui.with_layout(
                                                Layout::centered_and_justified(
                                                    Direction::LeftToRight,
                                                ),
                                                |ui| {
                                                    ui.label(
                                                        RichText::new(description)
                                                            .font(FontId::proportional(20.0)),
                                                    );
                                                },
                                            );
                                            ui.end_row();
                                            ui.end_row();

                                            ui.horizontal(|ui| {
                                                let url = "https://github.com/pola-rs/polars";
                                                let heading =
                                                    Hyperlink::from_label_and_url("Polars", url);

                                                ui.label("Powered by ");
                                                ui.add(heading).on_hover_text(url);
                                            });
                                            ui.end_row();

                                            ui.horizontal(|ui| {
                                                let url = "https://github.com/emilk/egui";
                                                let heading =
                                                    Hyperlink::from_label_and_url("egui", url);

                                                ui.label("Built with ");
                                                ui.add(heading).on_hover_text(url);
                                            });
                                            ui.end_row();
                                            ui.end_row();

                                            ui.label(format!("Author: {authors}"));
                                            ui.end_row();
                                        });
                                });
                        });

                        if ui.button("Quit").clicked() {
                            // Close the application.
                            ui.ctx().send_viewport_cmd(ViewportCommand::Close);
                        }
                    });

                    // Add spacing to align theme switch to the right.
                    let delta = ui.available_width() - 15.0;
                    if delta > 0.0 {
                        ui.add_space(delta);
                        widgets::global_theme_preference_switch(ui);
                    }
                });
            });
        });

        SidePanel::left("side_panel")
            .resizable(true)
            .show(ctx, |ui| {
                ScrollArea::vertical().show(ui, |ui| {
                    // Add Metadata section
                    if let Some(metadata) = &self.metadata {
                        ui.collapsing("Metadata", |ui| {
                            metadata.render_metadata(ui);
                        });
                    }

                    // Add Loading section
                    ui.collapsing("Loading", |ui| {
                        if let Some(source) = self.data_source.render_loader(ui) {
                            let future = GeoMapContainer::load_data(source);
                            self.run_data_future(Box::new(Box::pin(future)), ctx);
                        }
                    });

                    // Add Regions section
                    if let Some(container) = self.data_container.clone() {
                        ui.collapsing("Regions", |ui| {
                            let string_columns = container.string_columns();
                            if let Some(selection) = self.selection.render_selection(
                                ui,
                                &string_columns,
                                &container.region_counts,
                            ) {
                                self.apply_selection(selection, ctx);
                            }

                            ui.separator();

                            // The rendering surface reports clicks as a
                            // comma-separated code list. The same payload can
                            // be entered here by hand.
                            ui.label("Surface callback:");
                            let callback_edit = TextEdit::singleline(&mut self.callback_input)
                                .desired_width(f32::INFINITY);
                            ui.add(callback_edit)
                                .on_hover_text("Comma-separated region codes, e.g. SI,FR");
                            if ui.button("Apply").clicked() {
                                let selection = Selection {
                                    regions: parse_selection(&self.callback_input),
                                    ..self.selection.clone()
                                };
                                self.apply_selection(selection, ctx);
                            }
                        });
                    }

                    // Add Schema section
                    if let Some(metadata) = &self.metadata {
                        ui.collapsing("Schema", |ui| {
                            metadata.render_schema(ui);
                        });
                    }
                });
            });

        TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            // Display the loaded path and the current selection payload.
            ui.horizontal(|ui| match &self.data_container {
                Some(container) => {
                    ui.label(format!("{:#?}", container.source.absolute_path));
                    ui.separator();
                    match container.filtered_df.as_ref() {
                        Some(filtered) => {
                            ui.label(format!(
                                "selected: [{}], {} rows",
                                container.selection.as_callback_payload(),
                                filtered.height()
                            ));
                        }
                        None => {
                            ui.label("no regions selected");
                        }
                    }
                }
                None => {
                    ui.label("no file set");
                }
            });
        });

        // Main table display area.
        // CentralPanel must be added after all other panels in your egui layout!
        CentralPanel::default().show(ctx, |ui| {
            // Display a warning message if the application is built in debug mode.
            warn_if_debug_build(ui);

            // Disable UI interaction while data is being loaded or processed (data_pending is true).
            if self.check_data_pending(ctx) {
                ui.disable();
            }

            match &self.data_container {
                Some(container) => {
                    // Dataframe is loaded and available in data_container. Display the table.
                    ScrollArea::horizontal()
                        .auto_shrink([false, false]) // Prevent the scroll area from shrinking.
                        .show(ui, |ui| {
                            // Customize the minimum length of the scrollbar handle for better user interaction.
                            ui.style_mut().spacing.scroll.handle_min_length = 32.0;
                            ui.style_mut().spacing.scroll.allocated_width();

                            // Render the visible rows using render_table.
                            container.render_table(ui);
                        });
                }
                None => {
                    // Check if data loading is pending (e.g., initial load in progress).
                    if self.check_data_pending(ctx) {
                        // Data loading is pending, show a loading spinner in the center of the panel.
                        ui.centered_and_justified(|ui| {
                            ui.spinner();
                        });
                    } else {
                        // No data loaded and no data loading pending.
                        // Display a prompt message to the user.
                        ui.centered_and_justified(|ui| {
                            ui.label("Drag and drop a CSV, JSON or Parquet file here.");
                        });
                    }
                }
            }
        });

        // Hand the queued scripts to the rendering surface. The surface
        // executes them in order; here they are traced for inspection.
        for script in self.map_bridge.drain() {
            tracing::debug!("surface script: {script}");
        }
    }
}
