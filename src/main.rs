use clap::Parser;
use dotenv::dotenv;
use tracing::error;

use seoul_wifi::config::Config;
use seoul_wifi::logging;
use seoul_wifi::pipeline::{self, StagePlan};

#[derive(Parser)]
#[command(name = "seoul_wifi")]
#[command(about = "Seoul public Wi-Fi open-data pipeline: collect, clean, chart, map")]
#[command(version = "0.1.0")]
struct Cli {
    /// Seoul Open Data Plaza API key (falls back to the SEOUL_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,
    /// Run the data collection stage
    #[arg(long)]
    collect: bool,
    /// Run the preprocessing stage
    #[arg(long)]
    preprocess: bool,
    /// Render the basic distribution charts
    #[arg(long)]
    basic: bool,
    /// Render the temporal analysis chart
    #[arg(long)]
    advanced: bool,
    /// Render the interactive map
    #[arg(long)]
    maps: bool,
    /// Run every stage (the default when no stage flag is given)
    #[arg(long)]
    all: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;
    config.ensure_directories()?;

    let api_key = cli
        .api_key
        .clone()
        .or_else(|| std::env::var("SEOUL_API_KEY").ok());
    let plan = StagePlan::from_flags(
        cli.collect,
        cli.preprocess,
        cli.basic,
        cli.advanced,
        cli.maps,
        cli.all,
    );

    println!("\n{}", "=".repeat(50));
    println!("Seoul public Wi-Fi data analysis");
    println!("{}", "=".repeat(50));

    match pipeline::run(plan, api_key.as_deref(), &config).await {
        Ok(summary) => {
            println!("\n{}", "=".repeat(50));
            println!("✅ All requested stages finished.");
            if let Some(rows) = summary.cleaned_rows {
                println!("   Cleaned rows: {rows}");
            }
            if !summary.charts.is_empty() || summary.map.is_some() {
                println!("   Results are in {}", config.viz_dir.display());
            }
            println!("{}", "=".repeat(50));
            Ok(())
        }
        Err(e) => {
            error!("pipeline failed: {e}");
            println!("\n❌ Pipeline failed: {e}");
            Err(e.into())
        }
    }
}
