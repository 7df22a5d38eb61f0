use crate::PathExtension;
use std::path::Path;

/// Represents the extension of a data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileExtension {
    /// CSV file extension.
    Csv,
    /// Json file extension.
    Json,
    /// Newline-Delimited Json file extension.
    NDJson,
    /// Parquet file extension.
    Parquet,
    /// Unknown file extension, storing the extension as a string.
    Unknown(String),
    /// Missing file extension, when no extension is present in the path.
    Missing,
}

impl FileExtension {
    /// Determines the file extension from a given path.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension_as_lowercase()
            .as_deref() // Converts `Option<String>` to `Option<&str>` for matching.
        {
            Some("csv") => FileExtension::Csv,
            Some("json") => FileExtension::Json,
            Some("ndjson") => FileExtension::NDJson,
            Some("parquet") => FileExtension::Parquet,
            Some(ext) => FileExtension::Unknown(ext.to_owned()),
            None => FileExtension::Missing,
        }
    }
}

/// Run tests with:
/// cargo test -- --show-output tests_file_extension
#[cfg(test)]
mod tests_file_extension {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_known_extensions() {
        assert_eq!(
            FileExtension::from_path(&PathBuf::from("corpus.CSV")),
            FileExtension::Csv
        );
        assert_eq!(
            FileExtension::from_path(&PathBuf::from("data.parquet")),
            FileExtension::Parquet
        );
        assert_eq!(
            FileExtension::from_path(&PathBuf::from("rows.ndjson")),
            FileExtension::NDJson
        );
    }

    #[test]
    fn test_unknown_and_missing() {
        assert_eq!(
            FileExtension::from_path(&PathBuf::from("map.geojson")),
            FileExtension::Unknown("geojson".to_string())
        );
        assert_eq!(
            FileExtension::from_path(&PathBuf::from("Makefile")),
            FileExtension::Missing
        );
    }
}
