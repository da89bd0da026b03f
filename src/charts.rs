//! Static chart rendering. Four operations, each writing one fixed-named PNG
//! under the visualization directory, overwriting the previous run's file.

use crate::constants::{
    DISTRICT_CHART_FILE, DISTRICT_HIGHLIGHT_COUNT, HEATMAP_TYPE_LIMIT, INSTALLATION_CHART_FILE,
    INSTALLATION_TYPE_LIMIT, MIN_CONSTRUCTION_YEAR, PATTERN_CHART_FILE, TEMPORAL_CHART_FILE,
};
use crate::error::{Result, WifiError};
use crate::preprocess::value_counts;
use crate::records::{DistrictStat, Hotspot, InstallationStat};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const ROYAL_BLUE: RGBColor = RGBColor(65, 105, 225);
const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);
const FOREST_GREEN: RGBColor = RGBColor(34, 139, 34);

/// Thousands-separated count label, e.g. 12345 -> "12,345".
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn centered_label(size: u32) -> TextStyle<'static> {
    TextStyle::from(("sans-serif", size).into_font())
        .pos(Pos::new(HPos::Center, VPos::Bottom))
}

/// Vertical bar chart of hotspot counts per district, sorted descending,
/// with the leading districts highlighted and every bar annotated.
pub fn district_distribution(stats: &[DistrictStat], viz_dir: &Path) -> Result<PathBuf> {
    if stats.is_empty() {
        return Err(WifiError::MissingData("no district statistics to chart".into()));
    }
    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| b.count.cmp(&a.count));

    let path = viz_dir.join(DISTRICT_CHART_FILE);
    draw_district_chart(&path, &sorted).map_err(WifiError::chart)?;
    info!(path = %path.display(), "district distribution chart written");
    println!("📊 District distribution chart: {}", path.display());
    Ok(path)
}

fn draw_district_chart(path: &Path, stats: &[DistrictStat]) -> DrawResult {
    let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let max = stats.iter().map(|s| s.count).max().unwrap_or(0);
    let y_max = max + max / 8 + 1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Public Wi-Fi Hotspots by District", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(90)
        .y_label_area_size(60)
        .build_cartesian_2d((0..stats.len()).into_segmented(), 0u64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Hotspots")
        .x_desc("District")
        .x_labels(stats.len())
        .x_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => stats
                .get(*i)
                .map(|s| s.district.clone())
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        })
        .label_style(("sans-serif", 12))
        .draw()?;

    chart.draw_series(stats.iter().enumerate().map(|(i, s)| {
        let color = if i < DISTRICT_HIGHLIGHT_COUNT {
            ROYAL_BLUE
        } else {
            SKY_BLUE
        };
        Rectangle::new(
            [
                (SegmentValue::Exact(i), 0u64),
                (SegmentValue::Exact(i + 1), s.count),
            ],
            color.filled(),
        )
    }))?;

    let label_style = centered_label(13);
    chart.draw_series(stats.iter().enumerate().map(|(i, s)| {
        Text::new(
            format_count(s.count),
            (SegmentValue::CenterOf(i), s.count),
            label_style.clone(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Horizontal bar chart of the most common installation types.
pub fn installation_distribution(stats: &[InstallationStat], viz_dir: &Path) -> Result<PathBuf> {
    if stats.is_empty() {
        return Err(WifiError::MissingData(
            "no installation statistics to chart".into(),
        ));
    }
    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| b.count.cmp(&a.count));
    sorted.truncate(INSTALLATION_TYPE_LIMIT);

    let path = viz_dir.join(INSTALLATION_CHART_FILE);
    draw_installation_chart(&path, &sorted).map_err(WifiError::chart)?;
    info!(path = %path.display(), "installation distribution chart written");
    println!("📊 Installation distribution chart: {}", path.display());
    Ok(path)
}

fn draw_installation_chart(path: &Path, stats: &[InstallationStat]) -> DrawResult {
    let root = BitMapBackend::new(path, (1400, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let max = stats.iter().map(|s| s.count).max().unwrap_or(0);
    let x_max = max + max / 8 + 1;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Hotspots by Installation Type (Top 10)",
            ("sans-serif", 28),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(220)
        .build_cartesian_2d(0u64..x_max, (0..stats.len()).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Hotspots")
        .y_desc("Installation type")
        .y_labels(stats.len())
        .y_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => stats
                .get(*i)
                .map(|s| s.installation_type.clone())
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        })
        .label_style(("sans-serif", 13))
        .draw()?;

    chart.draw_series(stats.iter().enumerate().map(|(i, s)| {
        Rectangle::new(
            [
                (0u64, SegmentValue::Exact(i)),
                (s.count, SegmentValue::Exact(i + 1)),
            ],
            LIGHT_GREEN.filled(),
        )
    }))?;

    let label_style = TextStyle::from(("sans-serif", 13).into_font())
        .pos(Pos::new(HPos::Left, VPos::Center));
    chart.draw_series(stats.iter().enumerate().map(|(i, s)| {
        Text::new(
            format_count(s.count),
            (s.count, SegmentValue::CenterOf(i)),
            label_style.clone(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// District × installation-type cross-tabulation restricted to the most
/// frequent types. Returns (district labels, type labels, counts matrix).
pub fn cross_tab(hotspots: &[Hotspot]) -> (Vec<String>, Vec<String>, Vec<Vec<u64>>) {
    let top_types: Vec<String> = value_counts(hotspots.iter().map(|h| h.installation_type.as_str()))
        .into_iter()
        .take(HEATMAP_TYPE_LIMIT)
        .map(|(value, _)| value)
        .collect();

    let mut districts: Vec<String> = hotspots
        .iter()
        .map(|h| h.district.as_str())
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect();
    districts.sort();
    districts.dedup();

    let type_index: HashMap<&str, usize> = top_types
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();
    let district_index: HashMap<&str, usize> = districts
        .iter()
        .enumerate()
        .map(|(i, d)| (d.as_str(), i))
        .collect();

    let mut matrix = vec![vec![0u64; top_types.len()]; districts.len()];
    for hotspot in hotspots {
        let (Some(&d), Some(&t)) = (
            district_index.get(hotspot.district.as_str()),
            type_index.get(hotspot.installation_type.as_str()),
        ) else {
            continue;
        };
        matrix[d][t] += 1;
    }

    (districts, top_types, matrix)
}

fn heat_color(value: u64, max: u64) -> RGBColor {
    // Light-yellow to deep-red ramp, YlOrRd endpoints.
    let t = if max == 0 { 0.0 } else { value as f64 / max as f64 };
    let lerp = |a: f64, b: f64| (a + (b - a) * t) as u8;
    RGBColor(lerp(255.0, 189.0), lerp(255.0, 0.0), lerp(204.0, 38.0))
}

/// Annotated heatmap of installation patterns across districts.
pub fn installation_patterns(hotspots: &[Hotspot], viz_dir: &Path) -> Result<PathBuf> {
    let (districts, types, matrix) = cross_tab(hotspots);
    if districts.is_empty() || types.is_empty() {
        return Err(WifiError::MissingData(
            "no district/installation data to cross-tabulate".into(),
        ));
    }

    let path = viz_dir.join(PATTERN_CHART_FILE);
    draw_pattern_heatmap(&path, &districts, &types, &matrix).map_err(WifiError::chart)?;
    info!(path = %path.display(), "installation pattern heatmap written");
    println!("📊 Installation pattern heatmap: {}", path.display());
    Ok(path)
}

fn draw_pattern_heatmap(
    path: &Path,
    districts: &[String],
    types: &[String],
    matrix: &[Vec<u64>],
) -> DrawResult {
    let root = BitMapBackend::new(path, (1400, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    let max = matrix
        .iter()
        .flat_map(|row| row.iter())
        .copied()
        .max()
        .unwrap_or(0);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Installation Patterns by District",
            ("sans-serif", 30),
        )
        .margin(20)
        .x_label_area_size(80)
        .y_label_area_size(140)
        .build_cartesian_2d(
            (0..types.len()).into_segmented(),
            (0..districts.len()).into_segmented(),
        )?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Installation type")
        .y_desc("District")
        .x_labels(types.len())
        .y_labels(districts.len())
        .x_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                types.get(*i).cloned().unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        })
        .y_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                districts.get(*i).cloned().unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        })
        .label_style(("sans-serif", 13))
        .draw()?;

    chart.draw_series(matrix.iter().enumerate().flat_map(|(d, row)| {
        row.iter().enumerate().map(move |(t, &count)| {
            Rectangle::new(
                [
                    (SegmentValue::Exact(t), SegmentValue::Exact(d)),
                    (SegmentValue::Exact(t + 1), SegmentValue::Exact(d + 1)),
                ],
                heat_color(count, max).filled(),
            )
        })
    }))?;

    let annotation = TextStyle::from(("sans-serif", 12).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(matrix.iter().enumerate().flat_map(|(d, row)| {
        let annotation = annotation.clone();
        row.iter().enumerate().map(move |(t, &count)| {
            Text::new(
                count.to_string(),
                (SegmentValue::CenterOf(t), SegmentValue::CenterOf(d)),
                annotation.clone(),
            )
        })
    }))?;

    root.present()?;
    Ok(())
}

/// Per-year installation counts, ascending by year. Years before the noise
/// cutoff are discarded; rows without a year simply do not contribute.
pub fn yearly_installation_counts(hotspots: &[Hotspot]) -> Vec<(i32, u64)> {
    let mut counts: HashMap<i32, u64> = HashMap::new();
    for year in hotspots.iter().filter_map(|h| h.construction_year) {
        if year >= MIN_CONSTRUCTION_YEAR {
            *counts.entry(year).or_default() += 1;
        }
    }
    let mut rows: Vec<(i32, u64)> = counts.into_iter().collect();
    rows.sort_by_key(|(year, _)| *year);
    rows
}

/// Running cumulative sum over the yearly counts.
pub fn cumulative_counts(yearly: &[(i32, u64)]) -> Vec<(i32, u64)> {
    let mut running = 0u64;
    yearly
        .iter()
        .map(|&(year, count)| {
            running += count;
            (year, running)
        })
        .collect()
}

/// Two stacked panels: yearly installations (peak year highlighted) above
/// the cumulative installation curve. Also returns the per-year counts.
pub fn temporal_patterns(hotspots: &[Hotspot], viz_dir: &Path) -> Result<(PathBuf, Vec<(i32, u64)>)> {
    let yearly = yearly_installation_counts(hotspots);
    if yearly.is_empty() {
        return Err(WifiError::MissingData(
            "no construction-year data to analyze".into(),
        ));
    }

    let path = viz_dir.join(TEMPORAL_CHART_FILE);
    draw_temporal_chart(&path, &yearly).map_err(WifiError::chart)?;
    info!(path = %path.display(), years = yearly.len(), "temporal pattern chart written");
    println!("📊 Temporal pattern chart: {}", path.display());
    Ok((path, yearly))
}

fn draw_temporal_chart(path: &Path, yearly: &[(i32, u64)]) -> DrawResult {
    let root = BitMapBackend::new(path, (1400, 1000)).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(500);

    let cumulative = cumulative_counts(yearly);

    // First year with the maximum count wins on ties.
    let peak = yearly
        .iter()
        .enumerate()
        .fold(0usize, |best, (i, &(_, count))| {
            if count > yearly[best].1 {
                i
            } else {
                best
            }
        });

    let year_label = |seg: &SegmentValue<usize>| match seg {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => yearly
            .get(*i)
            .map(|(year, _)| year.to_string())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };

    let max = yearly.iter().map(|&(_, count)| count).max().unwrap_or(0);
    let y_max = max + max / 8 + 1;

    let mut bar_chart = ChartBuilder::on(&upper)
        .caption("Installations per Year", ("sans-serif", 26))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((0..yearly.len()).into_segmented(), 0u64..y_max)?;

    bar_chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Installations")
        .x_labels(yearly.len())
        .x_label_formatter(&year_label)
        .label_style(("sans-serif", 12))
        .draw()?;

    bar_chart.draw_series(yearly.iter().enumerate().map(|(i, &(_, count))| {
        let color = if i == peak { ROYAL_BLUE } else { SKY_BLUE };
        Rectangle::new(
            [
                (SegmentValue::Exact(i), 0u64),
                (SegmentValue::Exact(i + 1), count),
            ],
            color.filled(),
        )
    }))?;

    let peak_font = FontDesc::new(FontFamily::SansSerif, 15.0, FontStyle::Bold);
    let peak_style = TextStyle::from(peak_font).pos(Pos::new(HPos::Center, VPos::Bottom));
    bar_chart.draw_series(std::iter::once(Text::new(
        format_count(yearly[peak].1),
        (SegmentValue::CenterOf(peak), yearly[peak].1),
        peak_style,
    )))?;

    let cum_max = cumulative.last().map(|&(_, total)| total).unwrap_or(0);
    let cum_y_max = cum_max + cum_max / 10 + 1;

    let mut line_chart = ChartBuilder::on(&lower)
        .caption("Cumulative Installations", ("sans-serif", 26))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d((0..yearly.len()).into_segmented(), 0u64..cum_y_max)?;

    line_chart
        .configure_mesh()
        .y_desc("Cumulative installations")
        .x_desc("Construction year")
        .x_labels(yearly.len())
        .x_label_formatter(&year_label)
        .label_style(("sans-serif", 12))
        .draw()?;

    line_chart.draw_series(LineSeries::new(
        cumulative
            .iter()
            .enumerate()
            .map(|(i, &(_, total))| (SegmentValue::CenterOf(i), total)),
        FOREST_GREEN.stroke_width(2),
    ))?;
    line_chart.draw_series(cumulative.iter().enumerate().map(|(i, &(_, total))| {
        Circle::new((SegmentValue::CenterOf(i), total), 4, FOREST_GREEN.filled())
    }))?;

    root.present()?;
    Ok(())
}
