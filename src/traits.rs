//! Custom traits and trait implementations for `egui` and std types.
//!
//! This module centralizes extensions to existing types (`egui::Context`,
//! `std::path::Path`, `Vec`) and the `Notification` interface used by
//! `layout.rs` for modal windows.

use egui::{
    Align, Color32, Context,
    FontFamily::Proportional,
    FontId, Frame, Layout, Spacing, Stroke, Style,
    TextStyle::{Body, Button, Heading, Monospace, Small},
    Vec2, Visuals, Window,
    style::ScrollStyle,
};

use std::{collections::HashSet, ffi::OsStr, hash::Hash, path::Path};

/// Defines custom text styles for the egui context.
/// Overrides default `egui` font sizes for different logical text styles.
/// Used by `MyStyle::set_style_init`.
pub const CUSTOM_TEXT_STYLE: [(egui::TextStyle, egui::FontId); 5] = [
    (Heading, FontId::new(18.0, Proportional)),
    (Body, FontId::new(16.0, Proportional)),
    (Button, FontId::new(16.0, Proportional)),
    (Monospace, FontId::new(15.0, Proportional)),
    (Small, FontId::new(14.0, Proportional)),
];

/// A trait for applying custom styling to the `egui` context (`Context`).
/// Used once at startup by `layout.rs::GeoMapApp::new`.
pub trait MyStyle {
    /// Applies a pre-defined application style to the `egui` context.
    fn set_style_init(&self, visuals: Visuals);
}

impl MyStyle for Context {
    /// Configures the application's look and feel (theme, spacing, text styles).
    ///
    /// ### Logic
    /// 1. Define custom scrollbar settings (`ScrollStyle`).
    /// 2. Define custom widget spacing (`Spacing`).
    /// 3. Create a full `Style` incorporating `Visuals`, `Spacing` and `CUSTOM_TEXT_STYLE`.
    /// 4. Apply the constructed `Style` to the `egui::Context`.
    fn set_style_init(&self, visuals: Visuals) {
        // 1. Define ScrollStyle.
        let scroll = ScrollStyle {
            handle_min_length: 32.0,
            ..ScrollStyle::default()
        };

        // 2. Define Spacing.
        let spacing = Spacing {
            scroll,
            item_spacing: [8.0, 6.0].into(),
            ..Spacing::default()
        };

        // 3. Create the main Style struct.
        let style = Style {
            visuals,
            spacing,
            text_styles: CUSTOM_TEXT_STYLE.into(),
            ..Style::default()
        };

        // 4. Set the style on the egui Context.
        self.set_style(style);
    }
}

/// Trait for modal Notification windows (like error dialogs).
/// Allows `layout.rs` to manage notification types polymorphically via
/// `Box<dyn Notification>`.
pub trait Notification: Send + Sync + 'static {
    /// Renders the notification window using `egui::Window`.
    /// Called repeatedly by `layout.rs::check_notification` while active.
    ///
    /// ### Returns
    /// `true` if the window should remain open, `false` if closed.
    fn show(&mut self, ctx: &Context) -> bool;
}

/// Notification struct for displaying error messages. Implements `Notification`.
pub struct Error {
    /// The error message content. Set by the caller in `layout.rs`.
    pub message: String,
}

impl Notification for Error {
    /// Renders the Error notification window.
    fn show(&mut self, ctx: &Context) -> bool {
        let mut open = true; // Window starts open.

        Window::new("Error")
            .collapsible(false)
            .open(&mut open)
            .show(ctx, |ui| {
                let width_max = ui.available_width() * 0.80;
                ui.allocate_ui_with_layout(
                    Vec2::new(width_max, ui.available_height()),
                    Layout::top_down(Align::LEFT),
                    |ui| {
                        Frame::default()
                            .fill(Color32::from_rgb(255, 200, 200)) // Light red bg
                            .stroke(Stroke::new(1.0, Color32::DARK_RED)) // Dark red border
                            .outer_margin(2.0)
                            .inner_margin(10.0)
                            .show(ui, |ui| {
                                ui.colored_label(Color32::BLACK, &self.message);
                                ui.disable();
                            });
                    },
                );
            });

        open
    }
}

/// Trait to extend `Path` with a convenient method for getting the lowercase
/// file extension. Used by `file_extension.rs` and `data_source.rs`.
pub trait PathExtension {
    /// Returns the file extension as a lowercase `String`, or `None`.
    fn extension_as_lowercase(&self) -> Option<String>;
}

impl PathExtension for Path {
    /// Implementation for `Path`. Gets extension, converts to &str (lossy), then lowercases.
    fn extension_as_lowercase(&self) -> Option<String> {
        self.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
    }
}

/// A trait for deduplicating vectors while preserving the original order of
/// elements. Used by `data_source.rs` for delimiter guessing.
pub trait UniqueElements<T> {
    /// Removes duplicate elements in place, keeping the first occurrence.
    fn unique(&mut self)
    where
        T: Eq + Hash + Clone;
}

impl<T> UniqueElements<T> for Vec<T> {
    /// Implementation using `HashSet` for efficiency.
    fn unique(&mut self)
    where
        T: Eq + Hash + Clone,
    {
        let mut seen = HashSet::new();
        self.retain(|x| seen.insert(x.clone()));
    }
}

// --- Unit Tests ---

#[cfg(test)]
mod tests_path_extension {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_extension_as_lowercase_some() {
        let path = PathBuf::from("corpus.PARQUET");
        assert_eq!(path.extension_as_lowercase(), Some("parquet".to_string()));
    }

    #[test]
    fn test_extension_as_lowercase_none() {
        let path = PathBuf::from("corpus");
        assert_eq!(path.extension_as_lowercase(), None);
    }

    #[test]
    fn test_extension_as_lowercase_multiple_dots() {
        let path = PathBuf::from("file.name.with.multiple.dots.ext");
        assert_eq!(path.extension_as_lowercase(), Some("ext".to_string()));
    }
}

#[cfg(test)]
mod tests_unique {
    use super::*;

    #[test]
    fn test_unique() {
        let mut vec = vec![b',', b';', b',', b'\t', b';'];
        vec.unique();
        assert_eq!(vec, vec![b',', b';', b'\t']);
    }

    #[test]
    fn test_unique_empty() {
        let mut vec: Vec<i32> = vec![];
        vec.unique();
        assert_eq!(vec, Vec::<i32>::new());
    }
}
