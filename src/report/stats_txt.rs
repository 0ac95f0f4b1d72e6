use crate::core::engine::{RunOutput, SkippedDataset};
use crate::core::io::OutputSink;
use crate::core::metrics::{Metric, QualityStats, ReadStats, TopRead};
use crate::report::format;
use anyhow::{Context, Result, bail};
use std::io::Write;

pub const GENERAL_SUMMARY: &str = "General summary";
pub const SKIPPED: &str = "Skipped (insufficient data)";
pub const TOP_LENGTHS_TITLE: &str = "Top 5 longest reads and their mean basecall quality score";
pub const TOP_QUALS_TITLE: &str =
    "Top 5 highest mean basecall quality scores and their read lengths";
pub const CUTOFFS_TITLE: &str = "Number and percentage of reads above quality cutoffs";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReportOptions {
    pub field_width: usize,
}

pub fn write(sink: &OutputSink, output: &RunOutput, opts: &ReportOptions) -> Result<()> {
    let mut w = sink.open()?;
    write_report(
        w.as_mut(),
        &output.names,
        &output.records,
        &output.skipped,
        opts,
    )?;
    w.flush()
        .with_context(|| format!("failed to flush report to {}", sink.describe()))?;
    Ok(())
}

pub fn render(
    names: &[String],
    records: &[ReadStats],
    skipped: &[SkippedDataset],
    opts: &ReportOptions,
) -> Result<String> {
    let mut buf = Vec::new();
    write_report(&mut buf, names, records, skipped, opts)?;
    String::from_utf8(buf).context("report is not valid UTF-8")
}

pub fn write_report(
    w: &mut dyn Write,
    names: &[String],
    records: &[ReadStats],
    skipped: &[SkippedDataset],
    opts: &ReportOptions,
) -> Result<()> {
    if names.len() != records.len() {
        bail!(
            "{} dataset names given for {} datasets",
            names.len(),
            records.len()
        );
    }
    if records.is_empty() {
        bail!("nothing to report");
    }
    let width = opts.field_width;

    writeln!(w, "{}", format::line(GENERAL_SUMMARY, names, width))?;
    if !skipped.is_empty() {
        let cells: Vec<String> = skipped
            .iter()
            .map(|s| format!("{}: {} reads, need {}", s.name, s.reads, s.min_reads))
            .collect();
        writeln!(w, "{}", format::line(SKIPPED, &cells, width))?;
    }

    write_metrics(w, records, width)?;

    let quality: Option<Vec<&QualityStats>> = records.iter().map(|r| r.quality.as_ref()).collect();
    if let Some(quality) = quality {
        write_top_block(w, TOP_LENGTHS_TITLE, &quality, |q| q.top_by_length.as_slice(), width)?;
        write_top_block(w, TOP_QUALS_TITLE, &quality, |q| q.top_by_quality.as_slice(), width)?;
        write_cutoffs(w, &quality, width)?;
    }
    Ok(())
}

fn write_metrics(w: &mut dyn Write, records: &[ReadStats], width: usize) -> Result<()> {
    for metric in Metric::by_label() {
        let values: Option<Vec<_>> = records.iter().map(|r| r.value(metric)).collect();
        let Some(values) = values else {
            continue;
        };
        let cells: Vec<String> = values.iter().map(format::metric_value).collect();
        writeln!(w, "{}", format::line(metric.label(), &cells, width))?;
    }
    Ok(())
}

fn write_top_block<F>(
    w: &mut dyn Write,
    title: &str,
    quality: &[&QualityStats],
    list: F,
    width: usize,
) -> Result<()>
where
    F: Fn(&QualityStats) -> &[TopRead],
{
    writeln!(w, "{}", title)?;
    let rows = quality.iter().map(|q| list(*q).len()).max().unwrap_or(0);
    for rank in 0..rows {
        let cells: Vec<String> = quality
            .iter()
            .map(|q| format::top_read(list(*q).get(rank)))
            .collect();
        writeln!(w, "{}", format::line(&(rank + 1).to_string(), &cells, width))?;
    }
    Ok(())
}

// union of thresholds across datasets, N/A where a dataset lacks one
fn write_cutoffs(w: &mut dyn Write, quality: &[&QualityStats], width: usize) -> Result<()> {
    writeln!(w, "{}", CUTOFFS_TITLE)?;
    let mut thresholds: Vec<u32> = quality
        .iter()
        .flat_map(|q| q.above_cutoffs.iter().map(|c| c.threshold))
        .collect();
    thresholds.sort_unstable();
    thresholds.dedup();

    for threshold in thresholds {
        let cells: Vec<String> = quality
            .iter()
            .map(|q| {
                format::cutoff(q.above_cutoffs.iter().find(|c| c.threshold == threshold))
            })
            .collect();
        writeln!(
            w,
            "{}",
            format::line(&format!(">Q{}", threshold), &cells, width)
        )?;
    }
    Ok(())
}
