use crate::{DEFAULT_CSV_DELIMITER, GeoMapError, GeoMapResult, MapKind, NULL_VALUES};

use clap::Parser;
use std::path::PathBuf;

// https://stackoverflow.com/questions/74068168/clap-rs-not-printing-colors-during-help
fn get_styles() -> clap::builder::Styles {
    let cyan = anstyle::Color::Ansi(anstyle::AnsiColor::Cyan);
    let green = anstyle::Color::Ansi(anstyle::AnsiColor::Green);
    let yellow = anstyle::Color::Ansi(anstyle::AnsiColor::Yellow);

    clap::builder::Styles::styled()
        .placeholder(anstyle::Style::new().fg_color(Some(yellow)))
        .usage(anstyle::Style::new().fg_color(Some(cyan)).bold())
        .header(
            anstyle::Style::new()
                .fg_color(Some(cyan))
                .bold()
                .underline(),
        )
        .literal(anstyle::Style::new().fg_color(Some(green)))
}

// https://docs.rs/clap/latest/clap/struct.Command.html#method.help_template
const APPLET_TEMPLATE: &str = "\
{before-help}
{about-with-newline}
{usage-heading} {usage}

{all-args}
{after-help}";

const EX1: &str = r#" geomap-view data.csv"#;
const EX2: &str = r#" geomap-view data.csv -c Country"#;
const EX3: &str = r#" geomap-view data.csv -m europe"#;
const EX4: &str = r#" geomap-view -d ";" -n "NA,-" survey.csv"#;

/// Command-line arguments for the GeoMapView application.
#[derive(Parser, Debug, Clone)]
#[command(
    // Read from `Cargo.toml`.
    author, version, about,
    long_about = None,
    next_line_help = true,
    help_template = APPLET_TEMPLATE,
    styles=get_styles(),
    after_help = format!("EXAMPLES:\n{EX1}\n{EX2}\n{EX3}\n{EX4}")
)]
pub struct Arguments {
    /// Attribute column holding geographic names or codes [requires FILE_PATH].
    #[arg(
        short = 'c',
        long,
        value_name = "COLUMN_NAME",
        help = "String column holding geographic names or codes [requires FILE_PATH]",
        long_help = "Selects the attribute column on startup.\n\
        If omitted, a column named like 'country', 'location' or 'region' is\n\
        preferred, falling back to the first String column.",
        requires = "path"
    )]
    pub column: Option<String>,

    /// CSV delimiter character. [Default: ',']
    #[arg(
        short = 'd',
        long,
        default_value = DEFAULT_CSV_DELIMITER,
        help = "CSV delimiter character",
        long_help = "Sets the CSV delimiter.\n\
        Auto-detect tries common separators (, ; | \\t) if initial parse fails.",
        requires = "path"
    )]
    pub delimiter: String,

    /// Base map to use instead of automatic selection [requires FILE_PATH].
    #[arg(
        short = 'm',
        long,
        value_name = "MAP_NAME",
        help = "Base map: world, europe or usa [requires FILE_PATH]",
        long_help = "Overrides the automatic base map selection.\n\
        By default, the map is derived from the column's values:\n\
        US states pick usa, European countries pick europe, otherwise world.",
        requires = "path",
        value_parser = validate_map_argument
    )]
    pub map: Option<String>,

    /// Comma-separated values to treat as NULL. [Default: \"\", <N/D>]
    #[arg(
        short = 'n',
        long,
        value_name = "NULL_LIST",
        default_value = NULL_VALUES,
        help = "Comma-separated values interpreted as NULL",
        long_help = "Specify custom null strings. Whitespace trimmed.\n\
        Use quotes for values with commas/spaces (e.g., \"NA\",\"-\").",
        requires = "path"
    )]
    pub null_values: String,

    /// Optional path to the data file (CSV, JSON, NDJSON, Parquet).
    #[arg(
        value_name = "FILE_PATH",
        default_value = ".",
        required = false,
        help = "Path to data file (CSV/JSON/NDJSON/Parquet) [Optional]",
        long_help = "Path to the input data file.\n\
        If omitted, opens the UI to load a file manually (menu or drag-drop)."
    )]
    pub path: PathBuf,
}

impl Arguments {
    /// Build `Arguments` struct.
    pub fn build() -> Arguments {
        Arguments::parse()
    }
}

// --- Validation Functions ---

/// clap validator for the '--map' argument: the name must resolve to a known
/// base map.
fn validate_map_argument(s: &str) -> GeoMapResult<String> {
    match MapKind::from_name(s) {
        Ok(_) => Ok(s.to_string()),
        Err(e) => Err(GeoMapError::InvalidArgument {
            arg_name: "--map".to_string(),
            reason: e.to_string(),
        }),
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// cargo test -- --show-output tests_args
#[cfg(test)]
mod tests_args {
    use super::*;
    use crate::{DEFAULT_CSV_DELIMITER, NULL_VALUES};
    use std::path::PathBuf;

    // Helper to create a dummy PathBuf for testing command line parsing.
    // clap doesn't need the file to exist for basic parsing tests.
    fn test_path(name: &str) -> PathBuf {
        PathBuf::from(name)
    }

    #[test]
    fn test_args_basic_path_only() {
        let path_str = "data.csv";
        let args = Arguments::parse_from(["geomap-view", path_str]);

        assert_eq!(args.path, test_path(path_str));
        // Check defaults
        assert_eq!(args.delimiter, DEFAULT_CSV_DELIMITER);
        assert_eq!(args.null_values, NULL_VALUES);
        assert_eq!(args.column, None);
        assert_eq!(args.map, None);
    }

    #[test]
    fn test_args_no_path_provided_uses_default() {
        // No path provided, clap should use the default_value "."
        let args = Arguments::parse_from(["geomap-view"]);

        assert_eq!(args.path, test_path("."));
        assert_eq!(args.delimiter, DEFAULT_CSV_DELIMITER);
        assert_eq!(args.null_values, NULL_VALUES);
        assert_eq!(args.column, None);
        assert_eq!(args.map, None);
    }

    #[test]
    fn test_args_all_options_short() {
        let path_str = "survey.parquet";
        let args = Arguments::parse_from([
            "geomap-view",
            "-c",
            "Country",
            "-d",
            ";",
            "-m",
            "europe",
            "-n",
            "NA,-99",
            path_str,
        ]);

        assert_eq!(args.path, test_path(path_str));
        assert_eq!(args.column, Some("Country".to_string()));
        assert_eq!(args.delimiter, ";");
        assert_eq!(args.map, Some("europe".to_string()));
        assert_eq!(args.null_values, "NA,-99");
    }

    #[test]
    fn test_args_all_options_long() {
        let path_str = "log.ndjson";
        let args = Arguments::parse_from([
            "geomap-view",
            "--column",
            "state",
            "--delimiter",
            "|",
            "--map",
            "usa",
            "--null-values",
            "\"-\", \"?\"",
            path_str,
        ]);

        assert_eq!(args.path, test_path(path_str));
        assert_eq!(args.column, Some("state".to_string()));
        assert_eq!(args.delimiter, "|");
        assert_eq!(args.map, Some("usa".to_string()));
        assert_eq!(args.null_values, "\"-\", \"?\"");
    }

    #[test]
    fn test_args_map_rejects_unknown_name() {
        let result = Arguments::try_parse_from(["geomap-view", "-m", "antarctica", "data.csv"]);
        assert!(result.is_err());
    }
}
