//! Fixed names shared across the pipeline: the upstream API surface, the
//! source-to-clean column mapping, and every snapshot/output filename.

/// Seoul Open Data Plaza endpoint and service for public Wi-Fi hotspots.
pub const BASE_URL: &str = "http://openapi.seoul.go.kr:8088";
pub const SERVICE_NAME: &str = "TbPublicWifiInfo";

/// Upstream fields a record must carry to be accepted by the collector.
/// Presence is what is validated here; value sanity (numeric coordinates)
/// is the preprocessor's job.
pub const REQUIRED_FIELDS: &[&str] = &[
    "X_SWIFI_MGR_NO",
    "X_SWIFI_WRDOFC",
    "X_SWIFI_MAIN_NM",
    "X_SWIFI_ADRES1",
    "X_SWIFI_INSTL_TY",
    "X_SWIFI_INSTL_MBY",
    "LAT",
    "LNT",
];

/// Total mapping from upstream field names to cleaned-table column names.
/// Every output column corresponds to exactly one source field.
pub const COLUMN_MAP: &[(&str, &str)] = &[
    ("X_SWIFI_MGR_NO", "mgr_no"),
    ("X_SWIFI_WRDOFC", "district"),
    ("X_SWIFI_MAIN_NM", "main_name"),
    ("X_SWIFI_ADRES1", "address"),
    ("X_SWIFI_ADRES2", "address_detail"),
    ("X_SWIFI_INSTL_TY", "installation_type"),
    ("X_SWIFI_INSTL_MBY", "install_agency"),
    ("X_SWIFI_SVC_SE", "service_type"),
    ("X_SWIFI_CMCWR", "network_type"),
    ("X_SWIFI_CNSTC_YEAR", "construction_year"),
    ("X_SWIFI_INOUT_DOOR", "indoor_outdoor"),
    ("X_SWIFI_REMARS3", "remarks"),
    ("LAT", "latitude"),
    ("LNT", "longitude"),
    ("WORK_DTTM", "registered_at"),
];

// Snapshot filename prefixes. Raw and processed snapshots live in separate
// directories, so the raw prefix never shadows the cleaned one.
pub const RAW_SNAPSHOT_PREFIX: &str = "wifi_data_";
pub const CLEANED_SNAPSHOT_PREFIX: &str = "wifi_data_cleaned_";
pub const DISTRICT_SNAPSHOT_PREFIX: &str = "district_stats_";
pub const INSTALLATION_SNAPSHOT_PREFIX: &str = "installation_stats_";

// Visualization outputs, overwritten on every run.
pub const DISTRICT_CHART_FILE: &str = "district_distribution.png";
pub const INSTALLATION_CHART_FILE: &str = "installation_distribution.png";
pub const PATTERN_CHART_FILE: &str = "installation_patterns.png";
pub const TEMPORAL_CHART_FILE: &str = "temporal_patterns.png";
pub const MAP_FILE: &str = "wifi_map.html";

/// Map center: Seoul city hall.
pub const SEOUL_CENTER: (f64, f64) = (37.5665, 126.978);
pub const MAP_ZOOM: u32 = 11;

/// Construction years before this are treated as data-entry noise.
pub const MIN_CONSTRUCTION_YEAR: i32 = 2000;

/// How many leading districts get the highlight color in the bar chart.
pub const DISTRICT_HIGHLIGHT_COUNT: usize = 5;
/// How many installation types the horizontal bar chart keeps.
pub const INSTALLATION_TYPE_LIMIT: usize = 10;
/// How many installation types the heatmap cross-tab keeps.
pub const HEATMAP_TYPE_LIMIT: usize = 8;
