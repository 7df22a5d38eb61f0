//! Region selection → filtered dataset.
//!
//! The rendering surface reports selected regions as a comma-separated code
//! string. This module turns that selection into the outbound subset of the
//! original DataFrame: rows whose selected column mentions any selected code,
//! matched case-insensitively on word boundaries.

use polars::prelude::*;

use crate::GeoMapResult;

/// Parses the inbound rendering-surface callback payload.
///
/// The payload is a comma-separated region-code list; an empty (or
/// whitespace-only) payload means "clear the selection" and yields an empty
/// vector.
pub fn parse_selection(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builds the case-insensitive, word-boundary-anchored alternation for the
/// selected codes, e.g. `(?i)\bUS-MT\b|\bSI\b`.
fn selection_pattern(regions: &[String]) -> String {
    let alternation = regions
        .iter()
        .map(|code| format!(r"\b{code}\b"))
        .collect::<Vec<_>>()
        .join("|");
    format!("(?i){alternation}")
}

/// Whether a column dtype is discrete (categorical) in the host data model.
/// Discrete columns silently disable filtering (known limitation).
pub fn is_discrete_dtype(dtype: &DataType) -> bool {
    dtype.is_categorical() || dtype.is_enum()
}

/// Filters the dataset to the rows matching the selected regions.
///
/// ### Returns
/// * `Ok(None)` when the selection is empty (cleared) or the column is a
///   discrete attribute — nothing is emitted in either case.
/// * `Ok(Some(df))` with the matching subset otherwise (possibly 0 rows).
pub fn filter_by_regions(
    df: &DataFrame,
    column: &str,
    regions: &[String],
) -> GeoMapResult<Option<DataFrame>> {
    // Cleared selection: the outbound slot emits nothing.
    if regions.is_empty() {
        return Ok(None);
    }

    let dtype = df.column(column)?.dtype().clone();
    if is_discrete_dtype(&dtype) {
        // Discrete attributes cannot be regex-filtered on their string values.
        tracing::warn!(
            "Column '{}' is a discrete attribute; region filtering is disabled for it.",
            column
        );
        return Ok(None);
    }

    let pattern = selection_pattern(regions);
    tracing::debug!("Filtering column '{}' with pattern: {}", column, pattern);

    let filtered = df
        .clone()
        .lazy()
        .filter(col(column).str().contains(lit(pattern), false))
        .collect()?;

    Ok(Some(filtered))
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// cargo test -- --show-output tests_selection
#[cfg(test)]
mod tests_selection {
    use super::*;

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("US-AL,US-TX"), vec!["US-AL", "US-TX"]);
        assert_eq!(parse_selection(" SI , FR "), vec!["SI", "FR"]);
        assert!(parse_selection("").is_empty());
        assert!(parse_selection("  ").is_empty());
        assert!(parse_selection(",,").is_empty());
    }

    #[test]
    fn test_selection_pattern() {
        let regions = vec!["US-MT".to_string(), "SI".to_string()];
        assert_eq!(selection_pattern(&regions), r"(?i)\bUS-MT\b|\bSI\b");
    }
}

/// Run tests with:
/// cargo test -- --show-output tests_filter
#[cfg(test)]
mod tests_filter {
    use super::*;

    fn sample_df() -> DataFrame {
        df!(
            "country" => &["Slovenia SI", "France", "USA and FR", "Japan"],
            "id" => &[1i64, 2, 3, 4],
        )
        .expect("sample DataFrame")
    }

    #[test]
    fn test_empty_selection_emits_nothing() -> GeoMapResult<()> {
        let df = sample_df();
        assert!(filter_by_regions(&df, "country", &[])?.is_none());
        Ok(())
    }

    #[test]
    fn test_word_boundary_case_insensitive_match() -> GeoMapResult<()> {
        let df = sample_df();

        let out = filter_by_regions(&df, "country", &["si".to_string()])?
            .expect("selection emits a subset");
        // "si" matches "SI" (case-insensitive) but not the "si" inside "Slovenia".
        assert_eq!(out.height(), 1);
        assert_eq!(
            out.column("id")?.as_materialized_series().i64()?.get(0),
            Some(1)
        );

        let out = filter_by_regions(&df, "country", &["FR".to_string()])?
            .expect("selection emits a subset");
        assert_eq!(out.height(), 1);
        assert_eq!(
            out.column("id")?.as_materialized_series().i64()?.get(0),
            Some(3)
        );

        Ok(())
    }

    #[test]
    fn test_multiple_regions_union() -> GeoMapResult<()> {
        let df = sample_df();
        let regions = vec!["SI".to_string(), "Japan".to_string()];
        let out = filter_by_regions(&df, "country", &regions)?.expect("subset");
        assert_eq!(out.height(), 2);
        Ok(())
    }

    #[test]
    fn test_no_match_yields_empty_frame() -> GeoMapResult<()> {
        let df = sample_df();
        let out = filter_by_regions(&df, "country", &["XX".to_string()])?.expect("subset");
        assert_eq!(out.height(), 0);
        Ok(())
    }

    #[test]
    fn test_categorical_column_emits_nothing() -> GeoMapResult<()> {
        let df = sample_df()
            .lazy()
            .with_column(col("country").cast(DataType::from_categories(Categories::global())))
            .collect()?;

        assert!(is_discrete_dtype(df.column("country")?.dtype()));
        // A non-empty selection on a discrete attribute still emits nothing.
        assert!(filter_by_regions(&df, "country", &["SI".to_string()])?.is_none());

        Ok(())
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let df = sample_df();
        assert!(filter_by_regions(&df, "missing", &["SI".to_string()]).is_err());
    }
}
