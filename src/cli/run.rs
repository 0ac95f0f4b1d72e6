use crate::cli::args::{Cli, Commands, InsufficientArg, RunArgs};
use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use readstats::core::engine::{self, DatasetInput, InsufficientDataPolicy, RunConfig, SummarizeConfig};
use readstats::core::io::OutputSink;
use readstats::core::metrics::{QualityCutoffs, StatsConfig, TOP_N};
use readstats::report::stats_txt::{self, ReportOptions};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{Level, debug, info};

pub fn entry() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => {
            init_logging(args.verbose);
            run(args)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn run(args: RunArgs) -> Result<()> {
    let t0 = Instant::now();

    stage("preflight", || {
        for path in &args.tables {
            if !path.is_file() {
                bail!("input file not found: {}", path.display());
            }
        }
        if args.threads == 0 {
            bail!("--threads must be >= 1");
        }
        if !args.names.is_empty() && args.names.len() != args.tables.len() {
            bail!(
                "got {} --name values for {} tables",
                args.names.len(),
                args.tables.len()
            );
        }
        Ok(())
    })?;

    let t_names = Instant::now();
    let names = if args.names.is_empty() {
        args.tables
            .iter()
            .map(|p| dataset_name(p))
            .collect::<Result<Vec<_>>>()?
    } else {
        args.names.clone()
    };
    stage_done("dataset-names", t_names);

    let cutoffs: QualityCutoffs = args
        .cutoffs
        .parse()
        .map_err(|e: String| anyhow!(e))
        .context("invalid --cutoffs")?;
    let policy = match args.on_insufficient {
        InsufficientArg::Fail => InsufficientDataPolicy::Fail,
        InsufficientArg::Skip => InsufficientDataPolicy::Skip,
    };
    let sink = OutputSink::from_arg(&args.output);

    let config = RunConfig {
        datasets: names
            .into_iter()
            .zip(args.tables.iter().cloned())
            .map(|(name, path)| DatasetInput { name, path })
            .collect(),
        summarize: SummarizeConfig {
            threads: args.threads,
            stats: StatsConfig {
                min_reads: args.min_reads,
                cutoffs,
                top_n: TOP_N,
            },
            outlier_column: args.drop_outliers.clone(),
            policy,
        },
    };
    info!(
        datasets = config.datasets.len(),
        threads = args.threads,
        min_reads = args.min_reads,
        cutoffs = %config.summarize.stats.cutoffs,
        output = %sink.describe(),
        "starting run"
    );

    let t_engine = Instant::now();
    let output = engine::run(config)?;
    stage_done("engine", t_engine);

    let t_report = Instant::now();
    let opts = ReportOptions {
        field_width: args.width,
    };
    stats_txt::write(&sink, &output, &opts)
        .with_context(|| format!("failed to write report to {}", sink.describe()))?;
    stage_done("report", t_report);

    debug!(total = %fmt_dur(t0.elapsed()), "done");
    Ok(())
}

fn dataset_name(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .context("failed to determine dataset name from input file")?;
    let name = name.strip_suffix(".gz").unwrap_or(name);
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    Ok(stem.to_string())
}

fn stage<F>(name: &str, f: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    let t = Instant::now();
    let res = f();
    stage_done(name, t);
    res
}

fn stage_done(name: &str, t: Instant) {
    debug!(stage = name, time = %fmt_dur(t.elapsed()), "stage finished");
}

fn fmt_dur(d: Duration) -> String {
    if d.as_secs_f64() < 1.0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}
