use crate::constants::REQUIRED_FIELDS;
use serde::{Deserialize, Serialize};

/// One hotspot record as returned by the open-data API. Field names follow
/// the upstream schema so raw JSON snapshots round-trip the API payload
/// byte-for-byte. Every field is optional; [`RawHotspot::has_required_fields`]
/// decides whether the record is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHotspot {
    #[serde(rename = "X_SWIFI_MGR_NO", skip_serializing_if = "Option::is_none")]
    pub mgr_no: Option<String>,
    #[serde(rename = "X_SWIFI_WRDOFC", skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(rename = "X_SWIFI_MAIN_NM", skip_serializing_if = "Option::is_none")]
    pub main_name: Option<String>,
    #[serde(rename = "X_SWIFI_ADRES1", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "X_SWIFI_ADRES2", skip_serializing_if = "Option::is_none")]
    pub address_detail: Option<String>,
    #[serde(rename = "X_SWIFI_INSTL_TY", skip_serializing_if = "Option::is_none")]
    pub installation_type: Option<String>,
    #[serde(rename = "X_SWIFI_INSTL_MBY", skip_serializing_if = "Option::is_none")]
    pub install_agency: Option<String>,
    #[serde(rename = "X_SWIFI_SVC_SE", skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(rename = "X_SWIFI_CMCWR", skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
    #[serde(rename = "X_SWIFI_CNSTC_YEAR", skip_serializing_if = "Option::is_none")]
    pub construction_year: Option<String>,
    #[serde(rename = "X_SWIFI_INOUT_DOOR", skip_serializing_if = "Option::is_none")]
    pub indoor_outdoor: Option<String>,
    #[serde(rename = "X_SWIFI_REMARS3", skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(rename = "LAT", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(rename = "LNT", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(rename = "WORK_DTTM", skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<String>,
}

impl RawHotspot {
    /// Looks a field up by its upstream name.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "X_SWIFI_MGR_NO" => self.mgr_no.as_deref(),
            "X_SWIFI_WRDOFC" => self.district.as_deref(),
            "X_SWIFI_MAIN_NM" => self.main_name.as_deref(),
            "X_SWIFI_ADRES1" => self.address.as_deref(),
            "X_SWIFI_ADRES2" => self.address_detail.as_deref(),
            "X_SWIFI_INSTL_TY" => self.installation_type.as_deref(),
            "X_SWIFI_INSTL_MBY" => self.install_agency.as_deref(),
            "X_SWIFI_SVC_SE" => self.service_type.as_deref(),
            "X_SWIFI_CMCWR" => self.network_type.as_deref(),
            "X_SWIFI_CNSTC_YEAR" => self.construction_year.as_deref(),
            "X_SWIFI_INOUT_DOOR" => self.indoor_outdoor.as_deref(),
            "X_SWIFI_REMARS3" => self.remarks.as_deref(),
            "LAT" => self.latitude.as_deref(),
            "LNT" => self.longitude.as_deref(),
            "WORK_DTTM" => self.registered_at.as_deref(),
            _ => None,
        }
    }

    /// Required fields absent from this record. Presence counts even when the
    /// value is empty; value sanity is checked during preprocessing.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|name| self.field(name).is_none())
            .collect()
    }

    pub fn has_required_fields(&self) -> bool {
        self.missing_required_fields().is_empty()
    }
}

/// One cleaned row: renamed columns, numeric coordinates, nullable
/// construction year. Missing string cells are empty strings, which the
/// aggregation step treats as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub mgr_no: String,
    pub district: String,
    pub main_name: String,
    pub address: String,
    #[serde(default)]
    pub address_detail: String,
    pub installation_type: String,
    pub install_agency: String,
    #[serde(default)]
    pub service_type: String,
    #[serde(default)]
    pub network_type: String,
    pub construction_year: Option<i32>,
    #[serde(default)]
    pub indoor_outdoor: String,
    #[serde(default)]
    pub remarks: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub registered_at: String,
}

/// (district, count) aggregate row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictStat {
    pub district: String,
    pub count: u64,
}

/// (installation_type, count) aggregate row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationStat {
    pub installation_type: String,
    pub count: u64,
}

/// Everything preprocessing (or loading) hands to the visualization stages.
#[derive(Debug, Clone)]
pub struct WifiDataset {
    pub hotspots: Vec<Hotspot>,
    pub district_stats: Vec<DistrictStat>,
    pub installation_stats: Vec<InstallationStat>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::COLUMN_MAP;
    use std::collections::HashSet;

    fn complete_record() -> RawHotspot {
        RawHotspot {
            mgr_no: Some("MGR-001".into()),
            district: Some("Gangnam-gu".into()),
            main_name: Some("Gangnam Station Exit 2".into()),
            address: Some("396 Gangnam-daero".into()),
            installation_type: Some("Bus stop".into()),
            install_agency: Some("Seoul Metropolitan Government".into()),
            latitude: Some("37.4979".into()),
            longitude: Some("127.0276".into()),
            ..Default::default()
        }
    }

    #[test]
    fn complete_record_passes_validation() {
        assert!(complete_record().has_required_fields());
    }

    #[test]
    fn missing_coordinate_field_fails_validation() {
        let mut record = complete_record();
        record.latitude = None;
        assert_eq!(record.missing_required_fields(), vec!["LAT"]);
        assert!(!record.has_required_fields());
    }

    #[test]
    fn empty_value_still_counts_as_present() {
        // The API emits <LAT></LAT> for unknown coordinates; the field is
        // present, so collection accepts the record and preprocessing drops it.
        let mut record = complete_record();
        record.latitude = Some(String::new());
        assert!(record.has_required_fields());
    }

    #[test]
    fn json_snapshot_round_trips_upstream_keys() {
        let record = complete_record();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("X_SWIFI_MGR_NO"));
        assert!(json.contains("LNT"));
        // Absent optional fields stay absent, as in the upstream payload.
        assert!(!json.contains("X_SWIFI_CNSTC_YEAR"));
        let back: RawHotspot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn column_mapping_is_total_and_deterministic() {
        let sources: HashSet<_> = COLUMN_MAP.iter().map(|(s, _)| *s).collect();
        let outputs: HashSet<_> = COLUMN_MAP.iter().map(|(_, o)| *o).collect();
        assert_eq!(sources.len(), COLUMN_MAP.len());
        assert_eq!(outputs.len(), COLUMN_MAP.len());
        // Every mapped source name resolves on a fully-populated record.
        let full = RawHotspot {
            mgr_no: Some("m".into()),
            district: Some("d".into()),
            main_name: Some("n".into()),
            address: Some("a".into()),
            address_detail: Some("a2".into()),
            installation_type: Some("t".into()),
            install_agency: Some("g".into()),
            service_type: Some("s".into()),
            network_type: Some("c".into()),
            construction_year: Some("2020".into()),
            indoor_outdoor: Some("in".into()),
            remarks: Some("r".into()),
            latitude: Some("37.0".into()),
            longitude: Some("127.0".into()),
            registered_at: Some("2024-01-01".into()),
        };
        for (source, _) in COLUMN_MAP {
            assert!(full.field(source).is_some(), "unmapped source {source}");
        }
        for required in crate::constants::REQUIRED_FIELDS {
            assert!(sources.contains(required));
        }
    }
}
