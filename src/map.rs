//! Interactive map: a single self-contained HTML file using Leaflet with a
//! marker-cluster layer. Marker data is embedded as JSON; the cleaned table
//! is subsampled with a fixed seed so successive runs produce the same map.

use crate::config::Config;
use crate::constants::{MAP_FILE, MAP_ZOOM, SEOUL_CENTER};
use crate::error::{Result, WifiError};
use crate::records::Hotspot;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tracing::{info, instrument};

const MAP_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Seoul Public Wi-Fi Hotspots</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.4.1/dist/MarkerCluster.css" />
  <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.4.1/dist/MarkerCluster.Default.css" />
  <script src="https://unpkg.com/leaflet.markercluster@1.4.1/dist/leaflet.markercluster.js"></script>
  <style>
    html, body, #map { height: 100%; margin: 0; }
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    var map = L.map('map').setView([__CENTER_LAT__, __CENTER_LNG__], __ZOOM__);
    L.tileLayer('https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png', {
      attribution: '&copy; OpenStreetMap contributors &copy; CARTO',
      subdomains: 'abcd',
      maxZoom: 19
    }).addTo(map);

    var cluster = L.markerClusterGroup();
    var hotspots = __HOTSPOTS__;
    hotspots.forEach(function (h) {
      var popup = '<div style="width: 200px"><b>' + h.name + '</b><br>' +
        'Address: ' + h.address + '<br>' +
        'Type: ' + h.kind + '<br>' +
        'Year: ' + h.year + '</div>';
      var marker = L.marker([h.lat, h.lng]);
      marker.bindPopup(popup, { maxWidth: 300 });
      marker.bindTooltip(h.name);
      cluster.addLayer(marker);
    });
    map.addLayer(cluster);
  </script>
</body>
</html>
"#;

/// Uniform subsample of the cleaned rows at `sample_ratio`, at least one row,
/// reproducible for a given seed.
pub fn sample_hotspots<'a>(hotspots: &'a [Hotspot], ratio: f64, seed: u64) -> Vec<&'a Hotspot> {
    if hotspots.is_empty() {
        return Vec::new();
    }
    let sample_size = ((hotspots.len() as f64) * ratio) as usize;
    let sample_size = sample_size.clamp(1, hotspots.len());
    let mut rng = StdRng::seed_from_u64(seed);
    rand::seq::index::sample(&mut rng, hotspots.len(), sample_size)
        .iter()
        .map(|i| &hotspots[i])
        .collect()
}

fn marker_payload(sampled: &[&Hotspot]) -> Result<String> {
    let markers: Vec<serde_json::Value> = sampled
        .iter()
        .map(|h| {
            json!({
                "lat": h.latitude,
                "lng": h.longitude,
                "name": h.main_name,
                "address": h.address,
                "kind": h.installation_type,
                "year": h.construction_year
                    .map(|year| year.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
            })
        })
        .collect();
    Ok(serde_json::to_string(&markers)?)
}

/// Renders the clustered-marker map to its fixed output path.
#[instrument(skip_all)]
pub fn create_wifi_map(hotspots: &[Hotspot], config: &Config) -> Result<PathBuf> {
    if hotspots.is_empty() {
        return Err(WifiError::MissingData("no hotspot rows to map".into()));
    }

    let sampled = sample_hotspots(hotspots, config.sample_ratio, config.sample_seed);
    info!(
        total = hotspots.len(),
        sampled = sampled.len(),
        "subsampled rows for map markers"
    );
    println!(
        "🗺️  Sampling {} of {} hotspots for the map",
        sampled.len(),
        hotspots.len()
    );

    let (center_lat, center_lng) = SEOUL_CENTER;
    let html = MAP_TEMPLATE
        .replace("__CENTER_LAT__", &center_lat.to_string())
        .replace("__CENTER_LNG__", &center_lng.to_string())
        .replace("__ZOOM__", &MAP_ZOOM.to_string())
        .replace("__HOTSPOTS__", &marker_payload(&sampled)?);

    let path = config.viz_dir.join(MAP_FILE);
    fs::write(&path, html)?;
    info!(path = %path.display(), "map written");
    println!("🗺️  Interactive map: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotspot(name: &str, year: Option<i32>) -> Hotspot {
        Hotspot {
            mgr_no: "m".into(),
            district: "A".into(),
            main_name: name.into(),
            address: "addr".into(),
            address_detail: String::new(),
            installation_type: "Bus stop".into(),
            install_agency: "Seoul".into(),
            service_type: String::new(),
            network_type: String::new(),
            construction_year: year,
            indoor_outdoor: String::new(),
            remarks: String::new(),
            latitude: 37.5,
            longitude: 127.0,
            registered_at: String::new(),
        }
    }

    #[test]
    fn sampling_is_reproducible_for_a_fixed_seed() {
        let hotspots: Vec<Hotspot> = (0..100).map(|i| hotspot(&format!("h{i}"), None)).collect();
        let first: Vec<String> = sample_hotspots(&hotspots, 0.1, 42)
            .iter()
            .map(|h| h.main_name.clone())
            .collect();
        let second: Vec<String> = sample_hotspots(&hotspots, 0.1, 42)
            .iter()
            .map(|h| h.main_name.clone())
            .collect();
        assert_eq!(first.len(), 10);
        assert_eq!(first, second);
    }

    #[test]
    fn sampling_keeps_at_least_one_row() {
        let hotspots = vec![hotspot("only", None)];
        assert_eq!(sample_hotspots(&hotspots, 0.1, 42).len(), 1);
    }

    #[test]
    fn markers_carry_popup_fields_and_fallback_year() {
        let hotspots = vec![hotspot("Gwanghwamun", None), hotspot("Plaza", Some(2018))];
        let sampled: Vec<&Hotspot> = hotspots.iter().collect();
        let payload = marker_payload(&sampled).unwrap();
        assert!(payload.contains("\"name\":\"Gwanghwamun\""));
        assert!(payload.contains("\"year\":\"unknown\""));
        assert!(payload.contains("\"year\":\"2018\""));
    }
}
