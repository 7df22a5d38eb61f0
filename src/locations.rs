//! Region extraction and aggregation over a string column.
//!
//! This is the data path between the loaded DataFrame and the rendering
//! surface: each cell of the selected column yields a set of location tokens,
//! the tokens drive the automatic base-map choice, and per-map aggregation
//! turns them into the region → document-count dictionary the choropleth
//! renders.

use polars::prelude::*;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::{GeoMapError, GeoMapResult, MapKind, RegionTable};

/// Segmentation pattern for free-text cells. `\s` is part of the class on
/// purpose: multi-word place names ("new york", "united kingdom") must stay
/// whole, so cells split on punctuation only.
static LOCATION_SEGMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w\s.\-]+").expect("valid location segment pattern"));

/// Splits one cell value into location tokens.
///
/// Cells longer than 3 characters are treated as free text: lowercased and
/// segmented by `LOCATION_SEGMENTS`, each segment trimmed, empty segments
/// dropped. Shorter cells are assumed to already be a literal region code
/// ("US", "FR") and are returned whole, case preserved, so they can match the
/// canonical code set directly.
///
/// The 3-character cutoff is a heuristic; it can misread legitimate 2-3
/// letter place names as codes.
pub fn extract_locations(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    // Counted in characters, not bytes: a 2-character non-ASCII name is
    // still a short literal.
    if trimmed.chars().count() > 3 {
        let lowered = trimmed.to_lowercase();
        LOCATION_SEGMENTS
            .find_iter(&lowered)
            .map(|m| m.as_str().trim().to_string())
            .filter(|token| !token.is_empty())
            .collect()
    } else {
        vec![trimmed.to_string()]
    }
}

/// Extracts per-row location tokens from a string column.
///
/// Null and empty cells are skipped entirely (they produce no row entry).
/// Returns `GeoMapError::NotAStringColumn` when the column does not hold
/// strings.
pub fn column_locations(df: &DataFrame, column: &str) -> GeoMapResult<Vec<Vec<String>>> {
    let series = df.column(column)?.as_materialized_series().clone();
    let strings = series
        .str()
        .map_err(|_| GeoMapError::NotAStringColumn(column.to_string()))?;

    let rows: Vec<Vec<String>> = strings
        .into_iter()
        .flatten() // skip null cells
        .map(extract_locations)
        .filter(|tokens| !tokens.is_empty())
        .collect();

    tracing::debug!(
        "Extracted locations from column '{}': {} non-empty rows",
        column,
        rows.len()
    );

    Ok(rows)
}

/// The set of distinct tokens across all rows. Input to `auto_select_map`.
pub fn distinct_locations(rows: &[Vec<String>]) -> HashSet<String> {
    rows.iter().flatten().cloned().collect()
}

/// Picks the base map for a token set.
///
/// Fixed precedence: USA if every token is a recognized USA alias, else
/// Europe if every token is a recognized Europe alias, else World. The
/// decision is total and deterministic for any input; an empty set selects
/// USA by vacuous containment.
pub fn auto_select_map(locations: &HashSet<String>) -> MapKind {
    if locations.iter().all(|t| MapKind::Usa.table().is_alias(t)) {
        MapKind::Usa
    } else if locations
        .iter()
        .all(|t| MapKind::Europe.table().is_alias(t))
    {
        MapKind::Europe
    } else {
        MapKind::World
    }
}

/// Aggregates per-region document counts for the active map.
///
/// For each row the tokens are resolved through the map's inverse table
/// (falling back to the token itself), deduplicated within the row, and every
/// resolved code present in the map's canonical code set increments that
/// region's counter. Tokens no map recognizes contribute nothing.
pub fn aggregate_counts(rows: &[Vec<String>], table: &RegionTable) -> HashMap<String, u64> {
    let mut counts: HashMap<String, u64> = HashMap::new();

    for tokens in rows {
        // Dedupe per row: one document counts once per region.
        let keys: HashSet<&str> = tokens.iter().map(|t| table.resolve(t)).collect();
        for key in keys {
            if table.contains_code(key) {
                *counts.entry(key.to_string()).or_insert(0) += 1;
            }
        }
    }

    counts
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// cargo test -- --show-output tests_extract
#[cfg(test)]
mod tests_extract {
    use super::*;

    #[test]
    fn test_short_cells_are_literal_codes() {
        // At most 3 chars: returned whole, case preserved.
        assert_eq!(extract_locations("US"), vec!["US"]);
        assert_eq!(extract_locations(" FR "), vec!["FR"]);
        assert_eq!(extract_locations("SVN"), vec!["SVN"]);
    }

    #[test]
    fn test_long_cells_split_on_punctuation_only() {
        // Spaces are inside the segment class, commas are not.
        assert_eq!(
            extract_locations("New York, USA"),
            vec!["new york", "usa"]
        );
        assert_eq!(
            extract_locations("France; Germany / Italy"),
            vec!["france", "germany", "italy"]
        );
        // No punctuation: the whole cell is one token.
        assert_eq!(extract_locations("United Kingdom"), vec!["united kingdom"]);
    }

    #[test]
    fn test_short_cells_counted_in_chars_not_bytes() {
        // "中国" is 2 characters but 6 bytes, "Öst" 3 characters but 4 bytes.
        // Both stay literal codes, case preserved.
        assert_eq!(extract_locations("中国"), vec!["中国"]);
        assert_eq!(extract_locations("Öst"), vec!["Öst"]);
        // 4 characters tip over into free-text segmentation.
        assert_eq!(extract_locations("Östa"), vec!["östa"]);
    }

    #[test]
    fn test_empty_and_whitespace_cells() {
        assert!(extract_locations("").is_empty());
        assert!(extract_locations("   ").is_empty());
        // Punctuation-only long cells yield nothing.
        assert!(extract_locations(",,,,,").is_empty());
    }

    #[test]
    fn test_column_locations_skips_nulls() -> GeoMapResult<()> {
        let df = df!(
            "country" => &[Some("Slovenia, France"), None, Some(""), Some("US")],
            "value" => &[1i64, 2, 3, 4],
        )?;

        let rows = column_locations(&df, "country")?;
        assert_eq!(rows, vec![vec!["slovenia", "france"], vec!["US"]]);

        // Non-string columns are rejected.
        assert!(matches!(
            column_locations(&df, "value"),
            Err(GeoMapError::NotAStringColumn(_))
        ));

        Ok(())
    }
}

/// Run tests with:
/// cargo test -- --show-output tests_auto_select
#[cfg(test)]
mod tests_auto_select {
    use super::*;

    fn set(tokens: &[&str]) -> HashSet<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_usa_takes_precedence() {
        assert_eq!(auto_select_map(&set(&["texas", "mt", "alabama"])), MapKind::Usa);
    }

    #[test]
    fn test_europe_when_not_all_usa() {
        assert_eq!(auto_select_map(&set(&["france", "si", "germany"])), MapKind::Europe);
    }

    #[test]
    fn test_world_fallback() {
        assert_eq!(auto_select_map(&set(&["france", "japan"])), MapKind::World);
        assert_eq!(auto_select_map(&set(&["atlantis"])), MapKind::World);
    }

    #[test]
    fn test_empty_set_selects_usa() {
        // Vacuous subset containment, preserved from the original behavior.
        assert_eq!(auto_select_map(&HashSet::new()), MapKind::Usa);
    }

    #[test]
    fn test_ambiguous_tokens_follow_precedence() {
        // "ga"/"de" are both USA abbreviations and world alpha-2 codes;
        // all-USA wins by precedence.
        assert_eq!(auto_select_map(&set(&["ga", "de"])), MapKind::Usa);
    }
}

/// Run tests with:
/// cargo test -- --show-output tests_aggregate
#[cfg(test)]
mod tests_aggregate {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_counts_dedupe_per_row() {
        // "slovenia" and "svn" resolve to the same code: one document, one count.
        let rows = rows(&[&["slovenia", "svn", "france"], &["slovenia"]]);
        let counts = aggregate_counts(&rows, MapKind::World.table());

        assert_eq!(counts.get("SI"), Some(&2));
        assert_eq!(counts.get("FR"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_unknown_tokens_never_contribute() {
        let rows = rows(&[&["atlantis", "mordor"], &["narnia"]]);
        assert!(aggregate_counts(&rows, MapKind::World.table()).is_empty());
        assert!(aggregate_counts(&rows, MapKind::Usa.table()).is_empty());
    }

    #[test]
    fn test_short_literal_codes_match_case_sensitively() {
        // "US" hits the canonical set directly; lowercase "us" resolves
        // through the inverse map; "XX" matches nothing.
        let rows = rows(&[&["US"], &["us"], &["XX"]]);
        let counts = aggregate_counts(&rows, MapKind::World.table());
        assert_eq!(counts.get("US"), Some(&2));
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let rows = rows(&[&["france", "germany"], &["france"], &["us-tx"]]);
        let first = aggregate_counts(&rows, MapKind::World.table());
        let second = aggregate_counts(&rows, MapKind::World.table());
        assert_eq!(first, second);
    }

    #[test]
    fn test_usa_counts() {
        let rows = rows(&[&["montana", "tx"], &["us-mt"], &["texas"]]);
        let counts = aggregate_counts(&rows, MapKind::Usa.table());
        assert_eq!(counts.get("US-MT"), Some(&2));
        assert_eq!(counts.get("US-TX"), Some(&2));
    }
}
