mod config;
mod error;
mod normalizer;
mod output;
mod record;
mod render;
mod series;
mod store;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Layout;
use crate::record::NormalizedRecord;
use crate::render::Renderer;
use crate::series::SeriesMap;
use crate::store::LogStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "Chart HomeSeer device history with gnuplot", long_about = None)]
struct Args {
    /// HomeSeer install directory (holds Logs/ and html/)
    #[arg(short, long, default_value = ".")]
    base_dir: PathBuf,

    #[arg(long, default_value = "gnuplot")]
    gnuplot: String,

    /// Also write every normalized record to stdout or a .json/.jsonl/.csv file
    #[arg(short, long)]
    dump: Option<String>,

    #[arg(long)]
    benchmark: bool,
}

#[derive(Debug, Default)]
struct RunStats {
    records: usize,
    devices: usize,
    charts: usize,
    sentinels: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let start_time = Instant::now();

    let base = std::path::absolute(&args.base_dir)
        .with_context(|| format!("invalid base directory {}", args.base_dir.display()))?;
    let layout = Layout::new(&base);

    let stats = run(&layout, &args)?;

    if args.benchmark {
        print_benchmark_results(&stats, start_time.elapsed());
    }

    Ok(())
}

fn run(layout: &Layout, args: &Args) -> Result<RunStats> {
    let store = LogStore::open(&layout.log_store)?;
    let records = store.device_records()?;

    let mut dump = args.dump.as_deref().map(output::create_writer).transpose()?;
    let mut dumped = Vec::new();
    let mut sentinels = 0;

    let series = SeriesMap::from_records(&records, |record, n| {
        if n.is_sentinel() {
            sentinels += 1;
        }
        if dump.is_some() {
            dumped.push(NormalizedRecord {
                timestamp: record.timestamp.clone(),
                device: n.device.clone(),
                value: n.value,
                cleaned: n.cleaned.clone(),
                rule: n.rule.to_string(),
            });
        }
    });

    if let Some(mut writer) = dump.take() {
        writer.write_batch(&dumped)?;
        writer.finish()?;
    }

    if series.is_empty() {
        info!(store = %layout.log_store.display(), "no device records found");
    }

    let renderer = Renderer::new(layout.clone(), args.gnuplot.clone());
    let charts = renderer.render(&series)?;

    Ok(RunStats {
        records: records.len(),
        devices: series.len(),
        charts: charts.len(),
        sentinels,
    })
}

fn print_benchmark_results(stats: &RunStats, duration: std::time::Duration) {
    let duration_secs = duration.as_secs_f64();

    eprintln!("\n=== RUN STATISTICS ===");
    eprintln!("Device records: {}", stats.records);
    eprintln!("Devices: {}", stats.devices);
    eprintln!("Charts rendered: {}", stats.charts);
    eprintln!("Unparsed values: {}", stats.sentinels);
    eprintln!("Processing time: {:.3}s", duration_secs);
    if stats.records > 0 {
        eprintln!(
            "Parse success rate: {:.1}%",
            ((stats.records - stats.sentinels) as f64 / stats.records as f64) * 100.0
        );
    }
}
