use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use readstats::core::io::STDOUT_SENTINEL;
use readstats::core::metrics::DEFAULT_MIN_READS;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "readstats",
    version,
    about = "Summary statistics for tables of sequencing reads"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Run(RunArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    #[arg(required = true)]
    pub tables: Vec<PathBuf>,

    #[arg(long = "name")]
    pub names: Vec<String>,

    #[arg(long, default_value = STDOUT_SENTINEL)]
    pub output: String,

    #[arg(long, default_value_t = num_cpus::get())]
    pub threads: usize,

    #[arg(long, default_value_t = DEFAULT_MIN_READS)]
    pub min_reads: usize,

    #[arg(long, default_value = "5,7,10,12,15", help = "comma-separated thresholds or 'adaptive'")]
    pub cutoffs: String,

    #[arg(long, value_enum, default_value_t = InsufficientArg::Fail)]
    pub on_insufficient: InsufficientArg,

    #[arg(long, help = "drop rows at or above median + 3 sd of this column")]
    pub drop_outliers: Option<String>,

    #[arg(long, default_value_t = 0)]
    pub width: usize,

    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum InsufficientArg {
    #[value(name = "fail")]
    Fail,
    #[value(name = "skip")]
    Skip,
}
