//! Glue between the widget state and the embedded map rendering surface.
//!
//! The surface is an external HTML/JS choropleth asset loaded from disk. The
//! widget drives it by evaluating inline-script global assignments (`REGIONS`,
//! `DATA`, `MAP_CODE`, `SELECTED_REGIONS`) followed by a `renderMap()` call,
//! and the surface reports selections back through a single callback carrying
//! a comma-separated region-code string (see `filter::parse_selection`).
//!
//! Script evaluations are never executed synchronously from UI event
//! handlers: they are queued here and drained on the next frame, so a
//! selection change cannot trigger a re-entrant render.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::{Path, PathBuf};

use crate::{GeoMapResult, MapKind};

/// Default location of the map front-end asset, relative to the working
/// directory.
pub const DEFAULT_MAP_ASSET: &str = "assets/geomap.html";

/// Pending-script queue plus the asset location for the rendering surface.
#[derive(Debug)]
pub struct MapBridge {
    /// Absolute or relative path of the HTML asset on disk.
    asset_path: PathBuf,
    /// Scripts awaiting evaluation by the surface, flushed next frame.
    queue: VecDeque<String>,
}

impl Default for MapBridge {
    fn default() -> Self {
        MapBridge::new(Path::new(DEFAULT_MAP_ASSET))
    }
}

impl MapBridge {
    pub fn new(asset_path: &Path) -> Self {
        MapBridge {
            asset_path: asset_path.to_path_buf(),
            queue: VecDeque::new(),
        }
    }

    /// `file:` URL the surface is loaded from. Relative asset paths are
    /// resolved against the current directory first, so the URL always
    /// carries an absolute path.
    pub fn asset_url(&self) -> String {
        let absolute = match self.asset_path.canonicalize() {
            Ok(path) => path,
            Err(_) => std::env::current_dir()
                .map(|dir| dir.join(&self.asset_path))
                .unwrap_or_else(|_| self.asset_path.clone()),
        };
        format!("file://{}", absolute.display())
    }

    /// Queues a script for deferred evaluation.
    pub fn schedule(&mut self, script: String) {
        tracing::trace!("Scheduling surface script ({} bytes)", script.len());
        self.queue.push_back(script);
    }

    /// Drains all pending scripts, in scheduling order. Called once per UI
    /// frame by the host; the returned scripts are handed to the surface.
    pub fn drain(&mut self) -> Vec<String> {
        self.queue.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }
}

/// Builds the one-time `REGIONS` assignment: map asset id → code→name
/// dictionary for all three base maps.
pub fn regions_script() -> GeoMapResult<String> {
    let mut regions: BTreeMap<&str, BTreeMap<&str, &str>> = BTreeMap::new();
    for kind in MapKind::ALL {
        let names: BTreeMap<&str, &str> = kind
            .table()
            .name_map()
            .iter()
            .map(|(&code, &name)| (code, name))
            .collect();
        regions.insert(kind.asset_id(), names);
    }

    Ok(format!("REGIONS = {};", to_json(&regions)?))
}

/// Builds the per-state render call: aggregation counts, active map id and
/// current selection, followed by `renderMap()`.
pub fn render_script(
    counts: &HashMap<String, u64>,
    map: MapKind,
    selected: &[String],
) -> GeoMapResult<String> {
    // BTreeMap keeps the payload deterministic for identical inputs.
    let ordered: BTreeMap<&str, u64> = counts.iter().map(|(k, &v)| (k.as_str(), v)).collect();

    Ok(format!(
        "DATA = {}; MAP_CODE = {}; SELECTED_REGIONS = {}; renderMap();",
        to_json(&ordered)?,
        to_json(&map.asset_id())?,
        to_json(&selected)?,
    ))
}

/// Blank-surface call used when no dataset is loaded.
pub fn clear_script() -> String {
    "DATA = {}; renderMap();".to_string()
}

fn to_json<T: Serialize>(value: &T) -> GeoMapResult<String> {
    Ok(serde_json::to_string(value)?)
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// cargo test -- --show-output tests_map_bridge
#[cfg(test)]
mod tests_map_bridge {
    use super::*;

    #[test]
    fn test_queue_is_fifo_and_drains() {
        let mut bridge = MapBridge::default();
        assert!(!bridge.has_pending());

        bridge.schedule("first();".to_string());
        bridge.schedule("second();".to_string());
        assert!(bridge.has_pending());

        assert_eq!(bridge.drain(), vec!["first();", "second();"]);
        assert!(!bridge.has_pending());
        assert!(bridge.drain().is_empty());
    }

    #[test]
    fn test_asset_url() {
        let bridge = MapBridge::new(Path::new("/opt/geomap/geomap.html"));
        assert_eq!(bridge.asset_url(), "file:///opt/geomap/geomap.html");
    }

    #[test]
    fn test_asset_url_makes_relative_paths_absolute() {
        // A relative path must not produce "file://assets/...", which would
        // read "assets" as a host name.
        let bridge = MapBridge::new(Path::new(DEFAULT_MAP_ASSET));
        assert!(bridge.asset_url().starts_with("file:///"));
    }

    #[test]
    fn test_regions_script_lists_all_maps() -> GeoMapResult<()> {
        let script = regions_script()?;
        assert!(script.starts_with("REGIONS = {"));
        assert!(script.ends_with("};"));
        assert!(script.contains("world_mill_en"));
        assert!(script.contains("europe_mill_en"));
        assert!(script.contains("us_aea_en"));
        assert!(script.contains(r#""US-MT":"Montana""#));
        Ok(())
    }

    #[test]
    fn test_render_script_shape_and_determinism() -> GeoMapResult<()> {
        let mut counts = HashMap::new();
        counts.insert("SI".to_string(), 2u64);
        counts.insert("FR".to_string(), 1u64);
        let selected = vec!["SI".to_string()];

        let script = render_script(&counts, MapKind::World, &selected)?;
        assert_eq!(
            script,
            r#"DATA = {"FR":1,"SI":2}; MAP_CODE = "world_mill_en"; SELECTED_REGIONS = ["SI"]; renderMap();"#
        );

        // Same inputs, same payload.
        assert_eq!(script, render_script(&counts, MapKind::World, &selected)?);
        Ok(())
    }

    #[test]
    fn test_clear_script() {
        assert_eq!(clear_script(), "DATA = {}; renderMap();");
    }
}
