//! Timestamped snapshot files and latest-file selection.
//!
//! Every run writes fresh `<prefix><YYYYMMDD_HHMMSS>` artifacts and never
//! mutates prior ones; "latest" is the lexicographically greatest matching
//! filename. Two snapshots written within the same second tie on name and
//! their relative order is unspecified.

use crate::constants::{
    CLEANED_SNAPSHOT_PREFIX, DISTRICT_SNAPSHOT_PREFIX, INSTALLATION_SNAPSHOT_PREFIX,
    RAW_SNAPSHOT_PREFIX,
};
use crate::error::Result;
use crate::records::{DistrictStat, Hotspot, InstallationStat, RawHotspot, WifiDataset};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Filename timestamp, second granularity.
pub fn timestamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

/// The lexicographically greatest file in `dir` matching `<prefix>*<ext>`.
pub fn latest_file(dir: &Path, prefix: &str, ext: &str) -> Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(prefix) && name.ends_with(ext))
        .collect();
    names.sort();
    Ok(names.pop().map(|name| dir.join(name)))
}

/// Writes the accepted raw records as one pretty-printed JSON snapshot.
pub fn write_raw_snapshot(dir: &Path, records: &[RawHotspot]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{RAW_SNAPSHOT_PREFIX}{}.json", timestamp()));
    let json = serde_json::to_string_pretty(records)?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Reads the most recent raw JSON snapshot, if any exists.
pub fn load_latest_raw(dir: &Path) -> Result<Option<(PathBuf, Vec<RawHotspot>)>> {
    let Some(path) = latest_file(dir, RAW_SNAPSHOT_PREFIX, ".json")? else {
        return Ok(None);
    };
    let content = fs::read_to_string(&path)?;
    let records: Vec<RawHotspot> = serde_json::from_str(&content)?;
    Ok(Some((path, records)))
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// The three processed CSV snapshots written by one preprocessing run.
#[derive(Debug)]
pub struct ProcessedPaths {
    pub cleaned: PathBuf,
    pub district: PathBuf,
    pub installation: PathBuf,
}

/// Writes the cleaned table and both aggregates under one shared timestamp.
pub fn write_processed_snapshots(dir: &Path, dataset: &WifiDataset) -> Result<ProcessedPaths> {
    fs::create_dir_all(dir)?;
    let ts = timestamp();
    let paths = ProcessedPaths {
        cleaned: dir.join(format!("{CLEANED_SNAPSHOT_PREFIX}{ts}.csv")),
        district: dir.join(format!("{DISTRICT_SNAPSHOT_PREFIX}{ts}.csv")),
        installation: dir.join(format!("{INSTALLATION_SNAPSHOT_PREFIX}{ts}.csv")),
    };
    write_csv(&paths.cleaned, &dataset.hotspots)?;
    write_csv(&paths.district, &dataset.district_stats)?;
    write_csv(&paths.installation, &dataset.installation_stats)?;
    Ok(paths)
}

/// The loader: reads back the most recent set of processed snapshots. Each of
/// the three categories is resolved to its own latest file independently; any
/// category with no snapshot at all means there is nothing to load.
pub fn load_data(dir: &Path) -> Result<Option<WifiDataset>> {
    let cleaned = latest_file(dir, CLEANED_SNAPSHOT_PREFIX, ".csv")?;
    let district = latest_file(dir, DISTRICT_SNAPSHOT_PREFIX, ".csv")?;
    let installation = latest_file(dir, INSTALLATION_SNAPSHOT_PREFIX, ".csv")?;

    let (Some(cleaned), Some(district), Some(installation)) = (cleaned, district, installation)
    else {
        warn!("missing processed data files; run collection and preprocessing first");
        println!("⚠️  Missing data: no processed snapshots found in {}", dir.display());
        return Ok(None);
    };

    info!(
        cleaned = %cleaned.display(),
        district = %district.display(),
        installation = %installation.display(),
        "loading processed snapshots"
    );

    let hotspots: Vec<Hotspot> = read_csv(&cleaned)?;
    let district_stats: Vec<DistrictStat> = read_csv(&district)?;
    let installation_stats: Vec<InstallationStat> = read_csv(&installation)?;

    println!(
        "📂 Loaded {} hotspots, {} districts, {} installation types",
        hotspots.len(),
        district_stats.len(),
        installation_stats.len()
    );

    Ok(Some(WifiDataset {
        hotspots,
        district_stats,
        installation_stats,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "x").unwrap();
    }

    #[test]
    fn latest_file_picks_lexicographically_greatest() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "wifi_data_20240101_000000.json");
        touch(dir.path(), "wifi_data_20240301_120000.json");
        touch(dir.path(), "wifi_data_20240201_060000.json");

        let latest = latest_file(dir.path(), RAW_SNAPSHOT_PREFIX, ".json")
            .unwrap()
            .unwrap();
        assert!(latest.ends_with("wifi_data_20240301_120000.json"));
    }

    #[test]
    fn latest_file_ignores_other_patterns_and_missing_dir() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "district_stats_20240101_000000.csv");
        assert!(latest_file(dir.path(), RAW_SNAPSHOT_PREFIX, ".json")
            .unwrap()
            .is_none());
        assert!(latest_file(Path::new("does/not/exist"), RAW_SNAPSHOT_PREFIX, ".json")
            .unwrap()
            .is_none());
    }

    #[test]
    fn each_category_resolves_independently() {
        let dir = tempdir().unwrap();
        // Three timestamps per category, deliberately interleaved.
        for ts in ["20240101_000000", "20240215_090000", "20240130_230000"] {
            touch(dir.path(), &format!("wifi_data_cleaned_{ts}.csv"));
        }
        for ts in ["20231201_000000", "20240301_000000", "20240102_000000"] {
            touch(dir.path(), &format!("district_stats_{ts}.csv"));
        }
        for ts in ["20240401_000000", "20240101_000000", "20240202_000000"] {
            touch(dir.path(), &format!("installation_stats_{ts}.csv"));
        }

        let cleaned = latest_file(dir.path(), CLEANED_SNAPSHOT_PREFIX, ".csv")
            .unwrap()
            .unwrap();
        let district = latest_file(dir.path(), DISTRICT_SNAPSHOT_PREFIX, ".csv")
            .unwrap()
            .unwrap();
        let installation = latest_file(dir.path(), INSTALLATION_SNAPSHOT_PREFIX, ".csv")
            .unwrap()
            .unwrap();

        assert!(cleaned.ends_with("wifi_data_cleaned_20240215_090000.csv"));
        assert!(district.ends_with("district_stats_20240301_000000.csv"));
        assert!(installation.ends_with("installation_stats_20240401_000000.csv"));
    }

    #[test]
    fn load_data_reports_missing_when_any_category_absent() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "wifi_data_cleaned_20240101_000000.csv");
        touch(dir.path(), "district_stats_20240101_000000.csv");
        // installation_stats missing
        assert!(load_data(dir.path()).unwrap().is_none());
    }

    #[test]
    fn raw_snapshot_round_trips() {
        let dir = tempdir().unwrap();
        let records = vec![RawHotspot {
            mgr_no: Some("MGR-1".into()),
            district: Some("Mapo-gu".into()),
            main_name: Some("World Cup Park".into()),
            address: Some("243 World Cup-ro".into()),
            installation_type: Some("Park".into()),
            install_agency: Some("Seoul".into()),
            latitude: Some("37.5654".into()),
            longitude: Some("126.8977".into()),
            ..Default::default()
        }];
        write_raw_snapshot(dir.path(), &records).unwrap();
        let (_, back) = load_latest_raw(dir.path()).unwrap().unwrap();
        assert_eq!(back, records);
    }
}
