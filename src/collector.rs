//! Data collection: paginates the public Wi-Fi service of the Seoul Open
//! Data Plaza, validates required fields per record, and snapshots the
//! accepted records to a timestamped JSON file.

use crate::config::Config;
use crate::constants::{BASE_URL, SERVICE_NAME};
use crate::error::{Result, WifiError};
use crate::records::RawHotspot;
use crate::snapshot;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// One parsed page of the XML response.
#[derive(Debug)]
struct WifiPage {
    total_count: Option<u64>,
    rows: Vec<RawHotspot>,
}

/// Inclusive index ranges covering `1..=total_count`, one per page. Every
/// index is requested exactly once: no gaps, no overlaps.
pub fn page_ranges(total_count: u64, page_size: u64) -> Vec<(u64, u64)> {
    let mut ranges = Vec::new();
    let mut start = 1;
    while start <= total_count {
        ranges.push((start, (start + page_size - 1).min(total_count)));
        start += page_size;
    }
    ranges
}

fn element_text(node: roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(name))
        .map(|child| child.text().unwrap_or_default().trim().to_string())
}

fn parse_row(node: roxmltree::Node<'_, '_>) -> RawHotspot {
    RawHotspot {
        mgr_no: element_text(node, "X_SWIFI_MGR_NO"),
        district: element_text(node, "X_SWIFI_WRDOFC"),
        main_name: element_text(node, "X_SWIFI_MAIN_NM"),
        address: element_text(node, "X_SWIFI_ADRES1"),
        address_detail: element_text(node, "X_SWIFI_ADRES2"),
        installation_type: element_text(node, "X_SWIFI_INSTL_TY"),
        install_agency: element_text(node, "X_SWIFI_INSTL_MBY"),
        service_type: element_text(node, "X_SWIFI_SVC_SE"),
        network_type: element_text(node, "X_SWIFI_CMCWR"),
        construction_year: element_text(node, "X_SWIFI_CNSTC_YEAR"),
        indoor_outdoor: element_text(node, "X_SWIFI_INOUT_DOOR"),
        remarks: element_text(node, "X_SWIFI_REMARS3"),
        latitude: element_text(node, "LAT"),
        longitude: element_text(node, "LNT"),
        registered_at: element_text(node, "WORK_DTTM"),
    }
}

/// Parses one page. A document whose root element is `RESULT` carrying a
/// code and message is a service-level failure, not a data page.
fn parse_page(xml: &str) -> Result<WifiPage> {
    let doc = roxmltree::Document::parse(xml)?;
    let root = doc.root_element();

    if root.has_tag_name("RESULT") {
        let code = element_text(root, "CODE");
        let message = element_text(root, "MESSAGE");
        if code.is_some() || message.is_some() {
            return Err(WifiError::Api {
                code: code.unwrap_or_default(),
                message: message.unwrap_or_default(),
            });
        }
    }

    let total_count = element_text(root, "list_total_count").and_then(|t| t.parse().ok());
    let rows = root
        .children()
        .filter(|child| child.has_tag_name("row"))
        .map(parse_row)
        .collect();

    Ok(WifiPage { total_count, rows })
}

async fn fetch_page(
    client: &reqwest::Client,
    api_key: &str,
    start: u64,
    end: u64,
) -> Result<WifiPage> {
    let url = format!("{BASE_URL}/{api_key}/xml/{SERVICE_NAME}/{start}/{end}");
    debug!(start, end, "requesting page");
    let body = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    parse_page(&body)
}

/// Appends the field-complete rows of one page to `accepted`, preserving the
/// order received, and returns how many were valid.
fn accept_rows(rows: Vec<RawHotspot>, accepted: &mut Vec<RawHotspot>) -> usize {
    let mut valid = 0;
    for row in rows {
        let missing = row.missing_required_fields();
        if missing.is_empty() {
            accepted.push(row);
            valid += 1;
        } else {
            debug!(?missing, "dropping record with missing required fields");
        }
    }
    valid
}

/// Collects all hotspot records. Returns `Ok(None)` when there is no API key
/// or nothing was collected; network/API failures stop pagination early but
/// whatever was accumulated so far is still snapshotted.
#[instrument(skip_all)]
pub async fn collect_wifi_data(
    api_key: Option<&str>,
    config: &Config,
) -> Result<Option<Vec<RawHotspot>>> {
    let Some(api_key) = api_key.filter(|key| !key.trim().is_empty()) else {
        warn!("no API key provided; skipping collection");
        println!("⚠️  No API key provided; falling back to existing data.");
        return Ok(None);
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()?;

    let mut accepted: Vec<RawHotspot> = Vec::new();

    // The first page doubles as the total-count probe.
    let first = match fetch_page(&client, api_key, 1, config.page_size).await {
        Ok(page) => page,
        Err(e) => {
            error!("failed to fetch first page: {e}");
            println!("❌ Failed to fetch data: {e}");
            return Ok(None);
        }
    };
    let Some(total_count) = first.total_count else {
        warn!("response carried no list_total_count; nothing to collect");
        println!("⚠️  No records reported by the service.");
        return Ok(None);
    };
    info!(total_count, "service reports total record count");
    println!("📡 Service reports {total_count} hotspot records");

    let valid = accept_rows(first.rows, &mut accepted);
    info!(page_start = 1, valid, collected = accepted.len(), "page accepted");
    println!("   Collected {}/{} records", accepted.len(), total_count);

    for (start, end) in page_ranges(total_count, config.page_size).into_iter().skip(1) {
        let page = match fetch_page(&client, api_key, start, end).await {
            Ok(page) => page,
            Err(e) => {
                error!(start, end, "page fetch failed, stopping pagination: {e}");
                println!("❌ Failed to fetch records {start}-{end}: {e}");
                break;
            }
        };
        if page.rows.is_empty() {
            debug!(start, "empty page, stopping pagination");
            break;
        }
        let valid = accept_rows(page.rows, &mut accepted);
        info!(page_start = start, valid, collected = accepted.len(), "page accepted");
        println!("   Collected {}/{} records", accepted.len(), total_count);
    }

    if accepted.is_empty() {
        warn!("no valid records collected");
        println!("⚠️  No records collected.");
        return Ok(None);
    }

    let path = snapshot::write_raw_snapshot(&config.raw_data_dir, &accepted)?;
    info!(records = accepted.len(), path = %path.display(), "raw snapshot written");
    println!("💾 Saved {} records to {}", accepted.len(), path.display());

    Ok(Some(accepted))
}
