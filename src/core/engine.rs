use crate::core::io;
use crate::core::metrics::{self, ReadStats, StatsConfig, StatsError};
use crate::core::model::ReadTable;
use anyhow::{Context, Result, anyhow, bail};
use crossbeam_channel as channel;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum InsufficientDataPolicy {
    #[default]
    Fail,
    Skip,
}

#[derive(Clone, Debug)]
pub struct DatasetInput {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Clone, Debug, Default)]
pub struct SummarizeConfig {
    pub threads: usize,
    pub stats: StatsConfig,
    pub outlier_column: Option<String>,
    pub policy: InsufficientDataPolicy,
}

pub struct RunConfig {
    pub datasets: Vec<DatasetInput>,
    pub summarize: SummarizeConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedDataset {
    pub name: String,
    pub reads: usize,
    pub min_reads: usize,
}

#[derive(Clone, Debug)]
pub struct RunOutput {
    pub names: Vec<String>,
    pub records: Vec<ReadStats>,
    pub skipped: Vec<SkippedDataset>,
}

pub fn run(cfg: RunConfig) -> Result<RunOutput> {
    let threads = cfg.summarize.threads.max(1);
    // a few large gzip inputs can still use spare threads for inflation
    let gz_threads = (threads / cfg.datasets.len().max(1)).max(1);

    let t_load = Instant::now();
    let loaded = par_map(&cfg.datasets, threads, |d| {
        io::load_table(&d.path, gz_threads)
    })?;
    log_stage("engine.load", t_load);

    let mut tables = Vec::with_capacity(loaded.len());
    for (input, table) in cfg.datasets.iter().zip(loaded) {
        let table = table?;
        info!(dataset = %input.name, reads = table.len(), path = %input.path.display(), "loaded table");
        tables.push((input.name.clone(), table));
    }

    summarize(&tables, &cfg.summarize)
}

pub fn summarize(tables: &[(String, ReadTable)], cfg: &SummarizeConfig) -> Result<RunOutput> {
    if tables.is_empty() {
        bail!("no datasets given");
    }

    let t_agg = Instant::now();
    let results = par_map(tables, cfg.threads.max(1), |(_, table)| {
        summarize_one(table, cfg)
    })?;
    log_stage("engine.aggregate", t_agg);

    let mut output = RunOutput {
        names: Vec::with_capacity(tables.len()),
        records: Vec::with_capacity(tables.len()),
        skipped: Vec::new(),
    };
    for ((name, _), result) in tables.iter().zip(results) {
        match result {
            Ok(stats) => {
                output.names.push(name.clone());
                output.records.push(stats);
            }
            Err(err) => {
                let insufficient = match err.downcast_ref::<StatsError>() {
                    Some(StatsError::InsufficientData { reads, min_reads }) => {
                        Some((*reads, *min_reads))
                    }
                    _ => None,
                };
                match insufficient {
                    Some((reads, min_reads)) if cfg.policy == InsufficientDataPolicy::Skip => {
                        warn!(dataset = %name, reads, min_reads, "skipping dataset with insufficient data");
                        output.skipped.push(SkippedDataset {
                            name: name.clone(),
                            reads,
                            min_reads,
                        });
                    }
                    _ => return Err(err.context(format!("dataset '{}'", name))),
                }
            }
        }
    }

    if output.records.is_empty() {
        bail!("no dataset has enough reads to report");
    }
    Ok(output)
}

fn summarize_one(table: &ReadTable, cfg: &SummarizeConfig) -> Result<ReadStats> {
    let stats = match &cfg.outlier_column {
        Some(column) => {
            let filtered = metrics::remove_outliers(table, column)
                .with_context(|| format!("failed to remove outliers on '{}'", column))?;
            debug!(
                column = %column,
                removed = table.len() - filtered.len(),
                "removed outliers"
            );
            metrics::aggregate(&filtered, &cfg.stats)?
        }
        None => metrics::aggregate(table, &cfg.stats)?,
    };
    Ok(stats)
}

// results come back in input order
fn par_map<T, R, F>(items: &[T], threads: usize, f: F) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let workers = threads.min(items.len());
    if workers <= 1 {
        return Ok(items.iter().map(f).collect());
    }

    let (job_tx, job_rx) = channel::bounded::<usize>(workers * 2);
    let (result_tx, result_rx) = channel::unbounded::<(usize, R)>();
    let f = &f;

    thread::scope(|scope| {
        for _ in 0..workers {
            let rx = job_rx.clone();
            let tx = result_tx.clone();
            scope.spawn(move || {
                for index in rx.iter() {
                    if tx.send((index, f(&items[index]))).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);
        for index in 0..items.len() {
            if job_tx.send(index).is_err() {
                break;
            }
        }
        drop(job_tx);
    });

    let mut slots: Vec<Option<R>> = (0..items.len()).map(|_| None).collect();
    for (index, result) in result_rx.iter() {
        slots[index] = Some(result);
    }
    slots
        .into_iter()
        .collect::<Option<Vec<R>>>()
        .ok_or_else(|| anyhow!("worker exited before finishing all datasets"))
}

fn log_stage(name: &str, t: Instant) {
    debug!(stage = name, time = %fmt_dur(t.elapsed()), "stage finished");
}

fn fmt_dur(d: Duration) -> String {
    if d.as_secs_f64() < 1.0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(n: u64) -> ReadTable {
        ReadTable::new((1..=n).map(|i| i * 10).collect())
    }

    #[test]
    fn par_map_keeps_order() {
        let items: Vec<u64> = (0..100).collect();
        let out = par_map(&items, 4, |x| x * 2).unwrap();
        assert_eq!(out, items.iter().map(|x| x * 2).collect::<Vec<_>>());
    }

    #[test]
    fn skip_policy_drops_small_datasets() {
        let tables = vec![
            ("big".to_string(), table(20)),
            ("small".to_string(), table(3)),
        ];
        let cfg = SummarizeConfig {
            threads: 2,
            policy: InsufficientDataPolicy::Skip,
            ..SummarizeConfig::default()
        };
        let out = summarize(&tables, &cfg).unwrap();
        assert_eq!(out.names, vec!["big"]);
        assert_eq!(
            out.skipped,
            vec![SkippedDataset {
                name: "small".into(),
                reads: 3,
                min_reads: 10
            }]
        );
    }

    #[test]
    fn fail_policy_names_the_dataset() {
        let tables = vec![
            ("big".to_string(), table(20)),
            ("small".to_string(), table(3)),
        ];
        let err = summarize(&tables, &SummarizeConfig::default()).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("small"));
        assert!(msg.contains("insufficient data"));
    }

    #[test]
    fn all_skipped_is_an_error() {
        let tables = vec![("small".to_string(), table(3))];
        let cfg = SummarizeConfig {
            policy: InsufficientDataPolicy::Skip,
            ..SummarizeConfig::default()
        };
        assert!(summarize(&tables, &cfg).is_err());
    }

    #[test]
    fn overflow_fails_even_under_skip_policy() {
        let mut lengths = vec![1u64; 12];
        lengths.push(u64::MAX);
        let tables = vec![
            ("big".to_string(), table(20)),
            ("huge".to_string(), ReadTable::new(lengths)),
        ];
        let cfg = SummarizeConfig {
            policy: InsufficientDataPolicy::Skip,
            ..SummarizeConfig::default()
        };
        let msg = format!("{:#}", summarize(&tables, &cfg).unwrap_err());
        assert!(msg.contains("huge"));
        assert!(msg.contains("total bases"));
    }

    #[test]
    fn outlier_column_filters_before_aggregation() {
        let mut lengths = vec![100u64; 30];
        lengths.push(1_000_000);
        let tables = vec![("reads".to_string(), ReadTable::new(lengths))];
        let cfg = SummarizeConfig {
            outlier_column: Some("lengths".into()),
            ..SummarizeConfig::default()
        };
        let out = summarize(&tables, &cfg).unwrap();
        assert_eq!(out.records[0].number_of_reads, 30);
        assert_eq!(out.records[0].n50, 100);
    }
}
