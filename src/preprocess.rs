//! Preprocessing: turns raw API records into the cleaned table and the two
//! aggregate tables, and snapshots all three as CSV.

use crate::config::Config;
use crate::error::Result;
use crate::records::{DistrictStat, Hotspot, InstallationStat, RawHotspot, WifiDataset};
use crate::snapshot;
use std::collections::HashMap;
use tracing::{info, instrument, warn};

fn parse_coordinate(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.trim().parse::<f64>().ok())
}

/// Construction years arrive as strings, sometimes with a decimal point
/// ("2017.0"); anything non-numeric becomes missing without dropping the row.
fn parse_year(value: Option<&str>) -> Option<i32> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .map(|year| year as i32)
}

fn owned_or_empty(value: &Option<String>) -> String {
    value.as_deref().unwrap_or_default().trim().to_string()
}

/// Renames columns, coerces the numeric ones, and drops rows whose
/// coordinates do not survive coercion. A bad construction year alone never
/// drops a row.
pub fn clean_records(raw: &[RawHotspot]) -> Vec<Hotspot> {
    raw.iter()
        .filter_map(|record| {
            let latitude = parse_coordinate(record.latitude.as_deref())?;
            let longitude = parse_coordinate(record.longitude.as_deref())?;
            Some(Hotspot {
                mgr_no: owned_or_empty(&record.mgr_no),
                district: owned_or_empty(&record.district),
                main_name: owned_or_empty(&record.main_name),
                address: owned_or_empty(&record.address),
                address_detail: owned_or_empty(&record.address_detail),
                installation_type: owned_or_empty(&record.installation_type),
                install_agency: owned_or_empty(&record.install_agency),
                service_type: owned_or_empty(&record.service_type),
                network_type: owned_or_empty(&record.network_type),
                construction_year: parse_year(record.construction_year.as_deref()),
                indoor_outdoor: owned_or_empty(&record.indoor_outdoor),
                remarks: owned_or_empty(&record.remarks),
                latitude,
                longitude,
                registered_at: owned_or_empty(&record.registered_at),
            })
        })
        .collect()
}

/// Value counts over a string column, descending by count with the category
/// name breaking ties. Empty cells are missing and do not count.
pub fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, u64)> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for value in values.filter(|value| !value.is_empty()) {
        *counts.entry(value).or_default() += 1;
    }
    let mut rows: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows
}

pub fn district_counts(hotspots: &[Hotspot]) -> Vec<DistrictStat> {
    value_counts(hotspots.iter().map(|h| h.district.as_str()))
        .into_iter()
        .map(|(district, count)| DistrictStat { district, count })
        .collect()
}

pub fn installation_counts(hotspots: &[Hotspot]) -> Vec<InstallationStat> {
    value_counts(hotspots.iter().map(|h| h.installation_type.as_str()))
        .into_iter()
        .map(|(installation_type, count)| InstallationStat {
            installation_type,
            count,
        })
        .collect()
}

/// Preprocesses the given records, or the latest raw snapshot on disk when
/// none are given. Returns `Ok(None)` when there is nothing to preprocess.
#[instrument(skip_all)]
pub fn preprocess_wifi_data(
    raw: Option<Vec<RawHotspot>>,
    config: &Config,
) -> Result<Option<WifiDataset>> {
    let raw = match raw {
        Some(records) => records,
        None => match snapshot::load_latest_raw(&config.raw_data_dir)? {
            Some((path, records)) => {
                info!(path = %path.display(), records = records.len(), "using latest raw snapshot");
                println!("📂 Using latest raw snapshot: {}", path.display());
                records
            }
            None => {
                warn!("no raw snapshot available to preprocess");
                println!("⚠️  No raw data to preprocess.");
                return Ok(None);
            }
        },
    };

    let hotspots = clean_records(&raw);
    let dropped = raw.len() - hotspots.len();
    if dropped > 0 {
        info!(dropped, "rows dropped for missing or invalid coordinates");
    }

    let dataset = WifiDataset {
        district_stats: district_counts(&hotspots),
        installation_stats: installation_counts(&hotspots),
        hotspots,
    };

    let paths = snapshot::write_processed_snapshots(&config.processed_data_dir, &dataset)?;
    info!(
        rows = dataset.hotspots.len(),
        districts = dataset.district_stats.len(),
        types = dataset.installation_stats.len(),
        "processed snapshots written"
    );
    println!("💾 Processed data saved:");
    println!("   - Cleaned table: {}", paths.cleaned.display());
    println!("   - District stats: {}", paths.district.display());
    println!("   - Installation stats: {}", paths.installation.display());

    Ok(Some(dataset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(district: &str, kind: &str, lat: &str, lng: &str, year: Option<&str>) -> RawHotspot {
        RawHotspot {
            mgr_no: Some("MGR".into()),
            district: Some(district.into()),
            main_name: Some("spot".into()),
            address: Some("addr".into()),
            installation_type: Some(kind.into()),
            install_agency: Some("Seoul".into()),
            construction_year: year.map(Into::into),
            latitude: Some(lat.into()),
            longitude: Some(lng.into()),
            ..Default::default()
        }
    }

    #[test]
    fn rows_without_numeric_coordinates_are_dropped() {
        let raw = vec![
            record("A", "t", "37.5", "127.0", None),
            record("A", "t", "", "127.0", None),
            record("B", "t", "not-a-number", "127.0", None),
            record("B", "t", "37.6", "126.9", None),
        ];
        let cleaned = clean_records(&raw);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].district, "A");
        assert_eq!(cleaned[1].district, "B");
    }

    #[test]
    fn bad_construction_year_becomes_missing_but_row_survives() {
        let raw = vec![
            record("A", "t", "37.5", "127.0", Some("unknown")),
            record("A", "t", "37.5", "127.0", Some("2017.0")),
            record("A", "t", "37.5", "127.0", Some("2021")),
        ];
        let cleaned = clean_records(&raw);
        assert_eq!(cleaned.len(), 3);
        assert_eq!(cleaned[0].construction_year, None);
        assert_eq!(cleaned[1].construction_year, Some(2017));
        assert_eq!(cleaned[2].construction_year, Some(2021));
    }

    #[test]
    fn district_aggregate_counts_sum_to_row_count() {
        let raw = vec![
            record("A", "t1", "37.5", "127.0", None),
            record("A", "t1", "37.5", "127.0", None),
            record("B", "t2", "37.5", "127.0", None),
        ];
        let cleaned = clean_records(&raw);
        let stats = district_counts(&cleaned);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0], DistrictStat { district: "A".into(), count: 2 });
        assert_eq!(stats[1], DistrictStat { district: "B".into(), count: 1 });
        let total: u64 = stats.iter().map(|s| s.count).sum();
        assert_eq!(total, cleaned.len() as u64);
    }

    #[test]
    fn installation_aggregate_skips_missing_type_cells() {
        let mut incomplete = record("A", "", "37.5", "127.0", None);
        incomplete.installation_type = None;
        let raw = vec![
            record("A", "Bus stop", "37.5", "127.0", None),
            record("B", "Bus stop", "37.5", "127.0", None),
            record("C", "Park", "37.5", "127.0", None),
            incomplete,
        ];
        let cleaned = clean_records(&raw);
        assert_eq!(cleaned.len(), 4);
        let stats = installation_counts(&cleaned);
        let total: u64 = stats.iter().map(|s| s.count).sum();
        // Only rows with a non-missing installation type count.
        assert_eq!(total, 3);
        assert_eq!(stats[0].installation_type, "Bus stop");
        assert_eq!(stats[0].count, 2);
    }

    #[test]
    fn value_counts_orders_descending_with_name_tiebreak() {
        let values = ["b", "a", "b", "c", "a", "b"];
        let counts = value_counts(values.iter().copied());
        assert_eq!(
            counts,
            vec![("b".to_string(), 3), ("a".to_string(), 2), ("c".to_string(), 1)]
        );
    }

    #[test]
    fn end_to_end_scenario_two_of_three_records_survive() {
        // Three field-complete records; one has an empty latitude value. The
        // collector accepts all three, preprocessing drops exactly one.
        let raw = vec![
            record("A", "t", "37.51", "127.01", Some("2019")),
            record("A", "t", "", "127.02", Some("2020")),
            record("B", "t", "37.53", "127.03", None),
        ];
        assert!(raw.iter().all(RawHotspot::has_required_fields));
        let cleaned = clean_records(&raw);
        assert_eq!(cleaned.len(), 2);
    }
}
