//! Orchestration: which stages run, in what order, and how the pipeline
//! falls back from fresh data to the latest on-disk snapshots.

use crate::charts;
use crate::collector;
use crate::config::Config;
use crate::error::{Result, WifiError};
use crate::map;
use crate::preprocess;
use crate::records::WifiDataset;
use crate::snapshot;
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Which stages this run executes. `all` (or no stage flag at all) enables
/// everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePlan {
    pub collect: bool,
    pub preprocess: bool,
    pub basic: bool,
    pub advanced: bool,
    pub maps: bool,
}

impl StagePlan {
    pub fn all() -> Self {
        Self {
            collect: true,
            preprocess: true,
            basic: true,
            advanced: true,
            maps: true,
        }
    }

    pub fn from_flags(
        collect: bool,
        preprocess: bool,
        basic: bool,
        advanced: bool,
        maps: bool,
        all: bool,
    ) -> Self {
        let any = collect || preprocess || basic || advanced || maps;
        if all || !any {
            Self::all()
        } else {
            Self {
                collect,
                preprocess,
                basic,
                advanced,
                maps,
            }
        }
    }
}

/// The pipeline's fallback chain, made explicit: collection feeds
/// preprocessing; a skipped or empty preprocessing step falls back to
/// loading the latest processed snapshots; only a present dataset reaches
/// the visualization stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Collecting,
    Preprocessing,
    Loaded,
    Ready,
    Aborted,
}

/// Per-run outcomes for the final operator report.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub collected_records: Option<usize>,
    pub cleaned_rows: Option<usize>,
    pub districts: Option<usize>,
    pub installation_types: Option<usize>,
    pub charts: Vec<String>,
    pub map: Option<String>,
}

fn banner(title: &str) {
    println!("\n{}", "=".repeat(50));
    println!("{title}");
    println!("{}", "=".repeat(50));
}

/// Runs the enabled stages strictly in order. Returns an error only for
/// conditions the spec treats as fatal: no dataset after every fallback, or
/// a failed snapshot write / chart rendering.
#[instrument(skip_all)]
pub async fn run(plan: StagePlan, api_key: Option<&str>, config: &Config) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    let mut raw = None;
    let mut dataset: Option<WifiDataset> = None;
    let mut state = PipelineState::Collecting;

    // Walk the acquisition states until a dataset is Ready (or not).
    loop {
        state = match state {
            PipelineState::Collecting => {
                if plan.collect {
                    banner("1. Data collection");
                    raw = collector::collect_wifi_data(api_key, config).await?;
                    match &raw {
                        Some(records) => {
                            summary.collected_records = Some(records.len());
                            info!(records = records.len(), "collection finished");
                        }
                        None => info!("collection yielded nothing; continuing with existing data"),
                    }
                }
                PipelineState::Preprocessing
            }
            PipelineState::Preprocessing => {
                if plan.preprocess {
                    banner("2. Preprocessing");
                    dataset = preprocess::preprocess_wifi_data(raw.take(), config)?;
                    if dataset.is_some() {
                        PipelineState::Ready
                    } else {
                        PipelineState::Loaded
                    }
                } else {
                    PipelineState::Loaded
                }
            }
            PipelineState::Loaded => {
                println!("\n📂 Loading latest processed snapshots...");
                dataset = snapshot::load_data(&config.processed_data_dir)?;
                if dataset.is_some() {
                    PipelineState::Ready
                } else {
                    PipelineState::Aborted
                }
            }
            PipelineState::Ready => break,
            PipelineState::Aborted => {
                warn!("no dataset available after all fallbacks; aborting");
                return Err(WifiError::MissingData(
                    "no processed dataset available; run with --collect and --preprocess first"
                        .into(),
                ));
            }
        };
    }

    let Some(dataset) = dataset else {
        // Ready is only reachable with a dataset in hand.
        unreachable!("pipeline reached Ready without a dataset");
    };
    summary.cleaned_rows = Some(dataset.hotspots.len());
    summary.districts = Some(dataset.district_stats.len());
    summary.installation_types = Some(dataset.installation_stats.len());

    if plan.basic {
        banner("3. Basic analysis");
        let district = charts::district_distribution(&dataset.district_stats, &config.viz_dir)?;
        let installation =
            charts::installation_distribution(&dataset.installation_stats, &config.viz_dir)?;
        let patterns = charts::installation_patterns(&dataset.hotspots, &config.viz_dir)?;
        for path in [district, installation, patterns] {
            summary.charts.push(path.display().to_string());
        }
    }

    if plan.advanced {
        banner("4. Advanced analysis");
        let (path, yearly) = charts::temporal_patterns(&dataset.hotspots, &config.viz_dir)?;
        info!(years = yearly.len(), "temporal analysis finished");
        summary.charts.push(path.display().to_string());
    }

    if plan.maps {
        banner("5. Map visualization");
        let path = map::create_wifi_map(&dataset.hotspots, config)?;
        summary.map = Some(path.display().to_string());
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_behaves_as_all() {
        let plan = StagePlan::from_flags(false, false, false, false, false, false);
        assert_eq!(plan, StagePlan::all());
    }

    #[test]
    fn all_flag_overrides_individual_selection() {
        let plan = StagePlan::from_flags(true, false, false, false, false, true);
        assert_eq!(plan, StagePlan::all());
    }

    #[test]
    fn individual_flags_select_only_those_stages() {
        let plan = StagePlan::from_flags(false, true, false, true, false, false);
        assert!(!plan.collect);
        assert!(plan.preprocess);
        assert!(!plan.basic);
        assert!(plan.advanced);
        assert!(!plan.maps);
    }
}
