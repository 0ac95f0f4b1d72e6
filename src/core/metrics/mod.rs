use crate::core::model::{Feature, ReadTable};
use thiserror::Error;

mod basic;
mod cutoffs;
mod n50;
mod outliers;
mod quality;
mod top_reads;

pub use basic::{distinct_count, mean, median, median_sorted_u64, sorted_distinct, std_dev};
pub use cutoffs::{
    ADAPTIVE_STEP, CutoffCount, DEFAULT_CUTOFFS, MAX_PHRED, QualityCutoffs, reads_above,
};
pub use n50::{n50, n50_sorted};
pub use outliers::{is_outlier, outlier_cutoff, remove_outliers};
pub use quality::{
    average_quality, error_to_phred, median_quality, phred_to_error, phred_to_percent,
};
pub use top_reads::{RankBy, TopRead, top_reads};

pub const DEFAULT_MIN_READS: usize = 10;
pub const TOP_N: usize = 5;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatsError {
    #[error("insufficient data: {reads} reads, at least {min_reads} required")]
    InsufficientData { reads: usize, min_reads: usize },
    #[error("empty input")]
    EmptyInput,
    #[error("total bases of {reads} reads exceed {max}", max = u64::MAX)]
    TotalBasesOverflow { reads: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatsConfig {
    pub min_reads: usize,
    pub cutoffs: QualityCutoffs,
    pub top_n: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            min_reads: DEFAULT_MIN_READS,
            cutoffs: QualityCutoffs::default(),
            top_n: TOP_N,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IdentityStats {
    pub mean: f64,
    pub median: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QualityStats {
    pub mean: f64,
    pub median: f64,
    pub top_by_length: Vec<TopRead>,
    pub top_by_quality: Vec<TopRead>,
    pub above_cutoffs: Vec<CutoffCount>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReadStats {
    pub number_of_reads: u64,
    pub number_of_bases: u64,
    pub median_read_length: f64,
    pub mean_read_length: f64,
    pub n50: u64,
    pub number_of_bases_aligned: Option<f64>,
    pub identity: Option<IdentityStats>,
    pub active_channels: Option<u64>,
    pub run_ids: Option<Vec<String>>,
    pub quality: Option<QualityStats>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Metric {
    NumberOfReads,
    TotalBases,
    TotalBasesAligned,
    MedianReadLength,
    MeanReadLength,
    ReadLengthN50,
    AveragePercentIdentity,
    MedianPercentIdentity,
    ActiveChannels,
    RunIds,
    MeanReadQuality,
    MedianReadQuality,
}

impl Metric {
    pub const ALL: [Metric; 12] = [
        Metric::NumberOfReads,
        Metric::TotalBases,
        Metric::TotalBasesAligned,
        Metric::MedianReadLength,
        Metric::MeanReadLength,
        Metric::ReadLengthN50,
        Metric::AveragePercentIdentity,
        Metric::MedianPercentIdentity,
        Metric::ActiveChannels,
        Metric::RunIds,
        Metric::MeanReadQuality,
        Metric::MedianReadQuality,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::NumberOfReads => "Number of reads",
            Metric::TotalBases => "Total bases",
            Metric::TotalBasesAligned => "Total bases aligned",
            Metric::MedianReadLength => "Median read length",
            Metric::MeanReadLength => "Mean read length",
            Metric::ReadLengthN50 => "Read length N50",
            Metric::AveragePercentIdentity => "Average percent identity",
            Metric::MedianPercentIdentity => "Median percent identity",
            Metric::ActiveChannels => "Active channels",
            Metric::RunIds => "Run IDs",
            Metric::MeanReadQuality => "Mean read quality",
            Metric::MedianReadQuality => "Median read quality",
        }
    }

    pub fn by_label() -> Vec<Metric> {
        let mut metrics = Metric::ALL.to_vec();
        metrics.sort_by_key(|m| m.label());
        metrics
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MetricValue {
    Count(u64),
    Decimal(f64),
    Text(String),
}

impl ReadStats {
    pub fn value(&self, metric: Metric) -> Option<MetricValue> {
        match metric {
            Metric::NumberOfReads => Some(MetricValue::Count(self.number_of_reads)),
            Metric::TotalBases => Some(MetricValue::Count(self.number_of_bases)),
            Metric::TotalBasesAligned => self.number_of_bases_aligned.map(MetricValue::Decimal),
            Metric::MedianReadLength => Some(MetricValue::Decimal(self.median_read_length)),
            Metric::MeanReadLength => Some(MetricValue::Decimal(self.mean_read_length)),
            Metric::ReadLengthN50 => Some(MetricValue::Count(self.n50)),
            Metric::AveragePercentIdentity => {
                self.identity.as_ref().map(|i| MetricValue::Decimal(i.mean))
            }
            Metric::MedianPercentIdentity => {
                self.identity.as_ref().map(|i| MetricValue::Decimal(i.median))
            }
            Metric::ActiveChannels => self.active_channels.map(MetricValue::Count),
            Metric::RunIds => self
                .run_ids
                .as_ref()
                .map(|ids| MetricValue::Text(ids.join(","))),
            Metric::MeanReadQuality => self.quality.as_ref().map(|q| MetricValue::Decimal(q.mean)),
            Metric::MedianReadQuality => {
                self.quality.as_ref().map(|q| MetricValue::Decimal(q.median))
            }
        }
    }

    pub fn has_quality(&self) -> bool {
        self.quality.is_some()
    }
}

// empty tables are always insufficient, whatever min_reads says
pub fn aggregate(table: &ReadTable, cfg: &StatsConfig) -> Result<ReadStats, StatsError> {
    let reads = table.len();
    let min_reads = cfg.min_reads.max(1);
    if reads < min_reads {
        return Err(StatsError::InsufficientData {
            reads,
            min_reads: cfg.min_reads,
        });
    }

    let mut sorted = table.lengths().to_vec();
    sorted.sort_unstable();
    let number_of_bases = sorted
        .iter()
        .try_fold(0u64, |acc, &len| acc.checked_add(len))
        .ok_or(StatsError::TotalBasesOverflow { reads })?;

    let mut stats = ReadStats {
        number_of_reads: reads as u64,
        number_of_bases,
        median_read_length: median_sorted_u64(&sorted).ok_or(StatsError::EmptyInput)?,
        mean_read_length: number_of_bases as f64 / reads as f64,
        n50: n50_sorted(&sorted)?,
        number_of_bases_aligned: None,
        identity: None,
        active_channels: None,
        run_ids: None,
        quality: None,
    };

    for feature in table.capabilities().iter() {
        match feature {
            Feature::AlignedLengths => {
                stats.number_of_bases_aligned = table.aligned_lengths().map(|a| a.iter().sum());
            }
            Feature::PercentIdentity => {
                stats.identity = table.percent_identity().and_then(identity_stats);
            }
            Feature::ChannelIds => {
                stats.active_channels = table.channel_ids().map(distinct_count);
            }
            Feature::RunIds => {
                stats.run_ids = table.run_ids().map(sorted_distinct);
            }
            Feature::Quals => {
                stats.quality = table
                    .quals()
                    .and_then(|q| quality_stats(table.lengths(), q, table.read_ids(), cfg));
            }
            // only decorates the top-read lists
            Feature::ReadIds => {}
        }
    }

    Ok(stats)
}

fn identity_stats(identity: &[f64]) -> Option<IdentityStats> {
    Some(IdentityStats {
        mean: mean(identity)?,
        median: median(identity)?,
    })
}

fn quality_stats(
    lengths: &[u64],
    quals: &[f64],
    read_ids: Option<&[String]>,
    cfg: &StatsConfig,
) -> Option<QualityStats> {
    let thresholds = cfg.cutoffs.thresholds(quals);
    Some(QualityStats {
        mean: mean(quals)?,
        median: median_quality(quals)?,
        top_by_length: top_reads(lengths, quals, read_ids, RankBy::Length, cfg.top_n),
        top_by_quality: top_reads(lengths, quals, read_ids, RankBy::Quality, cfg.top_n),
        above_cutoffs: reads_above(quals, &thresholds),
    })
}
