use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;

use job_graph_clusterer::config::Config;
use job_graph_clusterer::data::{self, SourceFormat};
use job_graph_clusterer::distance::MetricKind;
use job_graph_clusterer::graph::LaplacianMode;
use job_graph_clusterer::pipeline;
use job_graph_clusterer::report::{ConsoleReporter, ReportFormat, Reporter};

#[derive(Parser, Debug)]
#[clap(
    name = "job-graph-clusterer",
    about = "Cluster job stage graphs by structural similarity"
)]
struct Cli {
    /// TOML configuration file
    #[clap(long)]
    config: Option<PathBuf>,

    /// Stage-link file (.parquet or .json)
    #[clap(long)]
    input: Option<PathBuf>,

    /// Input format when it cannot be inferred from the extension
    #[clap(long)]
    format: Option<SourceFormat>,

    /// Maximum single-linkage merge distance
    #[clap(long)]
    threshold: Option<f64>,

    /// Distance metric (laplacian-spectral, ipsen-mikhailov, degree-divergence, portrait-divergence)
    #[clap(long)]
    metric: Option<MetricKind>,

    /// Kernel half width at half maximum for the spectral density
    #[clap(long)]
    bandwidth: Option<f64>,

    /// Evaluation points of the spectral density grid
    #[clap(long)]
    grid_points: Option<usize>,

    /// How directed graphs enter the Laplacian (augmented, skeleton)
    #[clap(long)]
    laplacian: Option<LaplacianMode>,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long)]
    threads: Option<usize>,

    /// Print a JSON report instead of the label vector
    #[clap(long)]
    json: bool,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

impl Cli {
    /// Command-line values win over the configuration file
    fn apply(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.source.path = Some(input.clone());
        }
        if let Some(format) = self.format {
            config.source.format = Some(format);
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(metric) = self.metric {
            config.metric = metric;
        }
        if let Some(bandwidth) = self.bandwidth {
            config.spectral.hwhm = bandwidth;
        }
        if let Some(grid_points) = self.grid_points {
            config.spectral.grid_points = grid_points;
        }
        if let Some(laplacian) = self.laplacian {
            config.spectral.laplacian = laplacian;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    let num_threads = config.worker_threads();
    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let input = config
        .source
        .path
        .clone()
        .ok_or_else(|| anyhow!("no input given: pass --input or set source.path in the config"))?;

    log::info!("Starting job graph clustering");
    log::info!("Input: {}", input.display());

    // the source is released as soon as the run has read what it needs
    let run = {
        let source = data::open_source(&input, config.source.format)?;
        pipeline::run(source.as_ref(), &config)?
    };

    let format = if args.json {
        ReportFormat::Json
    } else {
        ReportFormat::Labels
    };
    let mut reporter = ConsoleReporter::new(std::io::stdout().lock(), format);
    reporter.report(&run)?;

    log::info!("Clustering complete");

    Ok(())
}
