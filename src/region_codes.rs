//! Static region code tables for the three base maps (World, Europe, USA).
//!
//! Each table provides a canonical-code → display-name dictionary, an inverse
//! lookup from lowercase aliases (names, ISO codes, abbreviations) back to the
//! canonical code, and a membership test over the alias set. The tables are
//! immutable and built once on first use.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::GeoMapError;

/// The base map driving the rendering surface.
///
/// Ordering of the variants matters: it is the precedence order used by the
/// automatic map selection (USA before Europe before World is handled in
/// `locations::auto_select_map`, the combo box lists World first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MapKind {
    /// World countries (ISO 3166 alpha-2 canonical codes).
    #[default]
    World,
    /// European countries (subset of the world code space).
    Europe,
    /// USA states, canonical codes in the `US-XX` form.
    Usa,
}

impl MapKind {
    /// All map variants, in combo-box display order.
    pub const ALL: [MapKind; 3] = [MapKind::World, MapKind::Europe, MapKind::Usa];

    /// Human-readable label for the map combo box.
    pub fn label(&self) -> &'static str {
        match self {
            MapKind::World => "World",
            MapKind::Europe => "Europe",
            MapKind::Usa => "USA",
        }
    }

    /// Identifier of the vector-map asset the rendering surface loads.
    pub fn asset_id(&self) -> &'static str {
        match self {
            MapKind::World => "world_mill_en",
            MapKind::Europe => "europe_mill_en",
            MapKind::Usa => "us_aea_en",
        }
    }

    /// Parses a user-facing map name (CLI argument, case-insensitive).
    pub fn from_name(name: &str) -> Result<Self, GeoMapError> {
        match name.to_lowercase().as_str() {
            "world" => Ok(MapKind::World),
            "europe" => Ok(MapKind::Europe),
            "usa" | "us" => Ok(MapKind::Usa),
            other => Err(GeoMapError::UnknownMap(other.to_string())),
        }
    }

    /// The static lookup table backing this map.
    pub fn table(&self) -> &'static RegionTable {
        match self {
            MapKind::World => &WORLD,
            MapKind::Europe => &EUROPE,
            MapKind::Usa => &USA,
        }
    }
}

/// Lookup tables for one map's code space.
///
/// `codes` keys are the canonical codes as the rendering surface expects them
/// (case-sensitive, e.g. `SI` or `US-MT`). `inverse` keys are lowercase
/// aliases: display names, ISO alpha-2/alpha-3 codes, state abbreviations and
/// the canonical code itself.
#[derive(Debug)]
pub struct RegionTable {
    codes: HashMap<&'static str, &'static str>,
    inverse: HashMap<String, &'static str>,
}

impl RegionTable {
    /// Builds a table from `(canonical code, short code, display name)` rows
    /// plus extra `(alias, canonical code)` pairs.
    fn build(
        entries: &[(&'static str, &'static str, &'static str)],
        aliases: &[(&'static str, &'static str)],
    ) -> Self {
        let mut codes = HashMap::with_capacity(entries.len());
        let mut inverse = HashMap::with_capacity(entries.len() * 3 + aliases.len());

        for &(code, short, name) in entries {
            codes.insert(code, name);
            inverse.insert(name.to_lowercase(), code);
            inverse.insert(short.to_lowercase(), code);
            inverse.insert(code.to_lowercase(), code);
        }
        for &(alias, code) in aliases {
            inverse.insert(alias.to_lowercase(), code);
        }

        RegionTable { codes, inverse }
    }

    /// Resolves a location token to a canonical code via the inverse map.
    /// Unknown tokens are returned unchanged, so short literal cells like
    /// `"US"` still match the canonical code set directly.
    pub fn resolve<'a>(&'a self, token: &'a str) -> &'a str {
        self.inverse.get(token).copied().unwrap_or(token)
    }

    /// Whether `code` is a canonical code of this map (case-sensitive).
    pub fn contains_code(&self, code: &str) -> bool {
        self.codes.contains_key(code)
    }

    /// Whether `token` is a recognized lowercase alias of this map.
    /// Used by the map auto-selection subset test.
    pub fn is_alias(&self, token: &str) -> bool {
        self.inverse.contains_key(token)
    }

    /// Display name for a canonical code.
    pub fn display_name(&self, code: &str) -> Option<&'static str> {
        self.codes.get(code).copied()
    }

    /// The canonical code → display name dictionary (for the surface payload).
    pub fn name_map(&self) -> &HashMap<&'static str, &'static str> {
        &self.codes
    }

    /// Number of canonical codes in this map.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// World countries: `(ISO alpha-2, ISO alpha-3, display name)`.
const WORLD_ENTRIES: &[(&str, &str, &str)] = &[
    ("AF", "AFG", "Afghanistan"),
    ("AL", "ALB", "Albania"),
    ("DZ", "DZA", "Algeria"),
    ("AO", "AGO", "Angola"),
    ("AR", "ARG", "Argentina"),
    ("AM", "ARM", "Armenia"),
    ("AU", "AUS", "Australia"),
    ("AT", "AUT", "Austria"),
    ("AZ", "AZE", "Azerbaijan"),
    ("BS", "BHS", "Bahamas"),
    ("BD", "BGD", "Bangladesh"),
    ("BY", "BLR", "Belarus"),
    ("BE", "BEL", "Belgium"),
    ("BZ", "BLZ", "Belize"),
    ("BJ", "BEN", "Benin"),
    ("BT", "BTN", "Bhutan"),
    ("BO", "BOL", "Bolivia"),
    ("BA", "BIH", "Bosnia and Herzegovina"),
    ("BW", "BWA", "Botswana"),
    ("BR", "BRA", "Brazil"),
    ("BN", "BRN", "Brunei"),
    ("BG", "BGR", "Bulgaria"),
    ("BF", "BFA", "Burkina Faso"),
    ("BI", "BDI", "Burundi"),
    ("KH", "KHM", "Cambodia"),
    ("CM", "CMR", "Cameroon"),
    ("CA", "CAN", "Canada"),
    ("CF", "CAF", "Central African Republic"),
    ("TD", "TCD", "Chad"),
    ("CL", "CHL", "Chile"),
    ("CN", "CHN", "China"),
    ("CO", "COL", "Colombia"),
    ("CG", "COG", "Republic of the Congo"),
    ("CD", "COD", "Democratic Republic of the Congo"),
    ("CR", "CRI", "Costa Rica"),
    ("CI", "CIV", "Ivory Coast"),
    ("HR", "HRV", "Croatia"),
    ("CU", "CUB", "Cuba"),
    ("CY", "CYP", "Cyprus"),
    ("CZ", "CZE", "Czech Republic"),
    ("DK", "DNK", "Denmark"),
    ("DJ", "DJI", "Djibouti"),
    ("DO", "DOM", "Dominican Republic"),
    ("EC", "ECU", "Ecuador"),
    ("EG", "EGY", "Egypt"),
    ("SV", "SLV", "El Salvador"),
    ("GQ", "GNQ", "Equatorial Guinea"),
    ("ER", "ERI", "Eritrea"),
    ("EE", "EST", "Estonia"),
    ("ET", "ETH", "Ethiopia"),
    ("FJ", "FJI", "Fiji"),
    ("FI", "FIN", "Finland"),
    ("FR", "FRA", "France"),
    ("GF", "GUF", "French Guiana"),
    ("GA", "GAB", "Gabon"),
    ("GM", "GMB", "Gambia"),
    ("GE", "GEO", "Georgia"),
    ("DE", "DEU", "Germany"),
    ("GH", "GHA", "Ghana"),
    ("GR", "GRC", "Greece"),
    ("GL", "GRL", "Greenland"),
    ("GT", "GTM", "Guatemala"),
    ("GN", "GIN", "Guinea"),
    ("GW", "GNB", "Guinea-Bissau"),
    ("GY", "GUY", "Guyana"),
    ("HT", "HTI", "Haiti"),
    ("HN", "HND", "Honduras"),
    ("HU", "HUN", "Hungary"),
    ("IS", "ISL", "Iceland"),
    ("IN", "IND", "India"),
    ("ID", "IDN", "Indonesia"),
    ("IR", "IRN", "Iran"),
    ("IQ", "IRQ", "Iraq"),
    ("IE", "IRL", "Ireland"),
    ("IL", "ISR", "Israel"),
    ("IT", "ITA", "Italy"),
    ("JM", "JAM", "Jamaica"),
    ("JP", "JPN", "Japan"),
    ("JO", "JOR", "Jordan"),
    ("KZ", "KAZ", "Kazakhstan"),
    ("KE", "KEN", "Kenya"),
    ("KP", "PRK", "North Korea"),
    ("KR", "KOR", "South Korea"),
    ("KW", "KWT", "Kuwait"),
    ("KG", "KGZ", "Kyrgyzstan"),
    ("LA", "LAO", "Laos"),
    ("LV", "LVA", "Latvia"),
    ("LB", "LBN", "Lebanon"),
    ("LS", "LSO", "Lesotho"),
    ("LR", "LBR", "Liberia"),
    ("LY", "LBY", "Libya"),
    ("LT", "LTU", "Lithuania"),
    ("LU", "LUX", "Luxembourg"),
    ("MK", "MKD", "North Macedonia"),
    ("MG", "MDG", "Madagascar"),
    ("MW", "MWI", "Malawi"),
    ("MY", "MYS", "Malaysia"),
    ("ML", "MLI", "Mali"),
    ("MT", "MLT", "Malta"),
    ("MR", "MRT", "Mauritania"),
    ("MX", "MEX", "Mexico"),
    ("MD", "MDA", "Moldova"),
    ("MN", "MNG", "Mongolia"),
    ("ME", "MNE", "Montenegro"),
    ("MA", "MAR", "Morocco"),
    ("MZ", "MOZ", "Mozambique"),
    ("MM", "MMR", "Myanmar"),
    ("NA", "NAM", "Namibia"),
    ("NP", "NPL", "Nepal"),
    ("NL", "NLD", "Netherlands"),
    ("NC", "NCL", "New Caledonia"),
    ("NZ", "NZL", "New Zealand"),
    ("NI", "NIC", "Nicaragua"),
    ("NE", "NER", "Niger"),
    ("NG", "NGA", "Nigeria"),
    ("NO", "NOR", "Norway"),
    ("OM", "OMN", "Oman"),
    ("PK", "PAK", "Pakistan"),
    ("PS", "PSE", "Palestine"),
    ("PA", "PAN", "Panama"),
    ("PG", "PNG", "Papua New Guinea"),
    ("PY", "PRY", "Paraguay"),
    ("PE", "PER", "Peru"),
    ("PH", "PHL", "Philippines"),
    ("PL", "POL", "Poland"),
    ("PT", "PRT", "Portugal"),
    ("PR", "PRI", "Puerto Rico"),
    ("QA", "QAT", "Qatar"),
    ("RO", "ROU", "Romania"),
    ("RU", "RUS", "Russia"),
    ("RW", "RWA", "Rwanda"),
    ("SA", "SAU", "Saudi Arabia"),
    ("SN", "SEN", "Senegal"),
    ("RS", "SRB", "Serbia"),
    ("SL", "SLE", "Sierra Leone"),
    ("SG", "SGP", "Singapore"),
    ("SK", "SVK", "Slovakia"),
    ("SI", "SVN", "Slovenia"),
    ("SB", "SLB", "Solomon Islands"),
    ("SO", "SOM", "Somalia"),
    ("ZA", "ZAF", "South Africa"),
    ("SS", "SSD", "South Sudan"),
    ("ES", "ESP", "Spain"),
    ("LK", "LKA", "Sri Lanka"),
    ("SD", "SDN", "Sudan"),
    ("SR", "SUR", "Suriname"),
    ("SZ", "SWZ", "Eswatini"),
    ("SE", "SWE", "Sweden"),
    ("CH", "CHE", "Switzerland"),
    ("SY", "SYR", "Syria"),
    ("TW", "TWN", "Taiwan"),
    ("TJ", "TJK", "Tajikistan"),
    ("TZ", "TZA", "Tanzania"),
    ("TH", "THA", "Thailand"),
    ("TL", "TLS", "Timor-Leste"),
    ("TG", "TGO", "Togo"),
    ("TT", "TTO", "Trinidad and Tobago"),
    ("TN", "TUN", "Tunisia"),
    ("TR", "TUR", "Turkey"),
    ("TM", "TKM", "Turkmenistan"),
    ("UG", "UGA", "Uganda"),
    ("UA", "UKR", "Ukraine"),
    ("AE", "ARE", "United Arab Emirates"),
    ("GB", "GBR", "United Kingdom"),
    ("US", "USA", "United States"),
    ("UY", "URY", "Uruguay"),
    ("UZ", "UZB", "Uzbekistan"),
    ("VU", "VUT", "Vanuatu"),
    ("VE", "VEN", "Venezuela"),
    ("VN", "VNM", "Vietnam"),
    ("YE", "YEM", "Yemen"),
    ("ZM", "ZMB", "Zambia"),
    ("ZW", "ZWE", "Zimbabwe"),
    ("XK", "XKX", "Kosovo"),
];

/// Common alternate spellings that the inverse map should also recognize.
const WORLD_ALIASES: &[(&str, &str)] = &[
    ("uk", "GB"),
    ("great britain", "GB"),
    ("britain", "GB"),
    ("england", "GB"),
    ("united states of america", "US"),
    ("america", "US"),
    ("russian federation", "RU"),
    ("republic of korea", "KR"),
    ("korea", "KR"),
    ("czechia", "CZ"),
    ("macedonia", "MK"),
    ("burma", "MM"),
    ("swaziland", "SZ"),
    ("east timor", "TL"),
    ("democratic republic of congo", "CD"),
    ("drc", "CD"),
    ("congo", "CG"),
    ("uae", "AE"),
    ("viet nam", "VN"),
    ("holland", "NL"),
];

/// Countries shown on the Europe map (ISO alpha-2, subset of the world list).
const EUROPE_CODES: &[&str] = &[
    "AL", "AT", "BA", "BE", "BG", "BY", "CH", "CY", "CZ", "DE", "DK", "EE", "ES", "FI", "FR",
    "GB", "GR", "HR", "HU", "IE", "IS", "IT", "LT", "LU", "LV", "MD", "ME", "MK", "MT", "NL",
    "NO", "PL", "PT", "RO", "RS", "RU", "SE", "SI", "SK", "UA", "XK",
];

/// USA states: `(canonical code, postal abbreviation, display name)`.
const USA_ENTRIES: &[(&str, &str, &str)] = &[
    ("US-AL", "AL", "Alabama"),
    ("US-AK", "AK", "Alaska"),
    ("US-AZ", "AZ", "Arizona"),
    ("US-AR", "AR", "Arkansas"),
    ("US-CA", "CA", "California"),
    ("US-CO", "CO", "Colorado"),
    ("US-CT", "CT", "Connecticut"),
    ("US-DE", "DE", "Delaware"),
    ("US-DC", "DC", "District of Columbia"),
    ("US-FL", "FL", "Florida"),
    ("US-GA", "GA", "Georgia"),
    ("US-HI", "HI", "Hawaii"),
    ("US-ID", "ID", "Idaho"),
    ("US-IL", "IL", "Illinois"),
    ("US-IN", "IN", "Indiana"),
    ("US-IA", "IA", "Iowa"),
    ("US-KS", "KS", "Kansas"),
    ("US-KY", "KY", "Kentucky"),
    ("US-LA", "LA", "Louisiana"),
    ("US-ME", "ME", "Maine"),
    ("US-MD", "MD", "Maryland"),
    ("US-MA", "MA", "Massachusetts"),
    ("US-MI", "MI", "Michigan"),
    ("US-MN", "MN", "Minnesota"),
    ("US-MS", "MS", "Mississippi"),
    ("US-MO", "MO", "Missouri"),
    ("US-MT", "MT", "Montana"),
    ("US-NE", "NE", "Nebraska"),
    ("US-NV", "NV", "Nevada"),
    ("US-NH", "NH", "New Hampshire"),
    ("US-NJ", "NJ", "New Jersey"),
    ("US-NM", "NM", "New Mexico"),
    ("US-NY", "NY", "New York"),
    ("US-NC", "NC", "North Carolina"),
    ("US-ND", "ND", "North Dakota"),
    ("US-OH", "OH", "Ohio"),
    ("US-OK", "OK", "Oklahoma"),
    ("US-OR", "OR", "Oregon"),
    ("US-PA", "PA", "Pennsylvania"),
    ("US-RI", "RI", "Rhode Island"),
    ("US-SC", "SC", "South Carolina"),
    ("US-SD", "SD", "South Dakota"),
    ("US-TN", "TN", "Tennessee"),
    ("US-TX", "TX", "Texas"),
    ("US-UT", "UT", "Utah"),
    ("US-VT", "VT", "Vermont"),
    ("US-VA", "VA", "Virginia"),
    ("US-WA", "WA", "Washington"),
    ("US-WV", "WV", "West Virginia"),
    ("US-WI", "WI", "Wisconsin"),
    ("US-WY", "WY", "Wyoming"),
];

static WORLD: LazyLock<RegionTable> =
    LazyLock::new(|| RegionTable::build(WORLD_ENTRIES, WORLD_ALIASES));

static EUROPE: LazyLock<RegionTable> = LazyLock::new(|| {
    // The Europe table is the world table restricted to the European code set,
    // aliases included.
    let entries: Vec<_> = WORLD_ENTRIES
        .iter()
        .filter(|(code, _, _)| EUROPE_CODES.contains(code))
        .copied()
        .collect();
    let aliases: Vec<_> = WORLD_ALIASES
        .iter()
        .filter(|(_, code)| EUROPE_CODES.contains(code))
        .copied()
        .collect();
    RegionTable::build(&entries, &aliases)
});

static USA: LazyLock<RegionTable> = LazyLock::new(|| RegionTable::build(USA_ENTRIES, &[]));

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// cargo test -- --show-output tests_region_codes
#[cfg(test)]
mod tests_region_codes {
    use super::*;

    #[test]
    fn test_world_resolves_names_and_codes() {
        let world = MapKind::World.table();
        assert_eq!(world.resolve("slovenia"), "SI");
        assert_eq!(world.resolve("svn"), "SI");
        assert_eq!(world.resolve("si"), "SI");
        // Unknown tokens pass through unchanged.
        assert_eq!(world.resolve("atlantis"), "atlantis");
        // Short literal cells keep their case and hit the canonical code set.
        assert!(world.contains_code("US"));
        assert!(!world.contains_code("us"));
    }

    #[test]
    fn test_world_aliases() {
        let world = MapKind::World.table();
        assert_eq!(world.resolve("uk"), "GB");
        assert_eq!(world.resolve("united states of america"), "US");
        assert_eq!(world.resolve("russian federation"), "RU");
    }

    #[test]
    fn test_europe_is_world_subset() {
        let europe = MapKind::Europe.table();
        let world = MapKind::World.table();
        assert_eq!(europe.len(), EUROPE_CODES.len());
        for code in europe.name_map().keys() {
            assert!(world.contains_code(code), "{code} missing from world");
        }
        assert!(europe.is_alias("france"));
        assert!(!europe.is_alias("texas"));
    }

    #[test]
    fn test_usa_resolves_abbreviations() {
        let usa = MapKind::Usa.table();
        assert_eq!(usa.resolve("montana"), "US-MT");
        assert_eq!(usa.resolve("mt"), "US-MT");
        assert_eq!(usa.resolve("us-mt"), "US-MT");
        assert_eq!(usa.display_name("US-MT"), Some("Montana"));
        assert_eq!(usa.len(), 51); // 50 states + DC
    }

    #[test]
    fn test_map_kind_parsing_and_assets() {
        assert_eq!(MapKind::from_name("World").unwrap(), MapKind::World);
        assert_eq!(MapKind::from_name("USA").unwrap(), MapKind::Usa);
        assert!(MapKind::from_name("mars").is_err());
        assert_eq!(MapKind::World.asset_id(), "world_mill_en");
        assert_eq!(MapKind::Usa.asset_id(), "us_aea_en");
    }
}
