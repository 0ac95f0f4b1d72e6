//! End-to-end checks: tables in, report text out.

use readstats::core::engine::{self, InsufficientDataPolicy, SummarizeConfig};
use readstats::core::metrics::{self, QualityCutoffs, StatsConfig};
use readstats::core::model::ReadTable;
use readstats::report::stats_txt::{self, ReportOptions};

fn report(tables: Vec<(&str, ReadTable)>, cfg: &SummarizeConfig) -> String {
    let tables: Vec<(String, ReadTable)> = tables
        .into_iter()
        .map(|(name, table)| (name.to_string(), table))
        .collect();
    let out = engine::summarize(&tables, cfg).unwrap();
    stats_txt::render(&out.names, &out.records, &out.skipped, &ReportOptions::default()).unwrap()
}

fn strings(values: impl IntoIterator<Item = String>) -> Vec<String> {
    values.into_iter().collect()
}

/// Ten reads with every optional column. Quality falls as length rises.
fn full_table() -> ReadTable {
    let n = 10u64;
    ReadTable::new((1..=n).map(|i| i * 100).collect())
        .with_quals((1..=n).map(|i| 15.0 - i as f64).collect())
        .unwrap()
        .with_aligned_lengths((1..=n).map(|i| (i * 90) as f64).collect())
        .unwrap()
        .with_percent_identity((1..=n).map(|i| 89.0 + i as f64).collect())
        .unwrap()
        .with_channel_ids(strings((1..=n).map(|i| (i % 2 + 1).to_string())))
        .unwrap()
        .with_run_ids(strings((1..=n).map(|i| {
            if i % 2 == 0 { "runA".to_string() } else { "runB".to_string() }
        })))
        .unwrap()
        .with_read_ids(strings((1..=n).map(|i| format!("r{}", i))))
        .unwrap()
}

#[test]
fn lengths_only_datasets() {
    let first = ReadTable::new((1..=20).collect());
    let second = ReadTable::new((1..=20).map(|i| i * 100).collect());
    let text = report(
        vec![("first", first), ("second", second)],
        &SummarizeConfig::default(),
    );
    let expected = "\
General summary:\tfirst\tsecond
Mean read length:\t10.5\t1050
Median read length:\t10.5\t1050
Number of reads:\t20\t20
Read length N50:\t14\t1400
Total bases:\t210\t21000
";
    assert_eq!(text, expected);
}

#[test]
fn quality_lines_need_quality_in_every_dataset() {
    let with_quals = ReadTable::new((1..=20).collect())
        .with_quals(vec![12.0; 20])
        .unwrap();
    let without = ReadTable::new((1..=20).collect());
    let text = report(
        vec![("with", with_quals), ("without", without)],
        &SummarizeConfig::default(),
    );
    assert!(!text.contains("Mean read quality"));
    assert!(!text.contains("Median read quality"));
    assert!(!text.contains("Top 5"));
    assert!(!text.contains("quality cutoffs"));
    assert!(text.contains("Number of reads:\t20\t20"));
}

#[test]
fn single_long_read_sets_n50() {
    let cfg = SummarizeConfig {
        stats: StatsConfig {
            min_reads: 5,
            ..StatsConfig::default()
        },
        ..SummarizeConfig::default()
    };
    let text = report(vec![("tiny", ReadTable::new(vec![1, 2, 3, 4, 90]))], &cfg);
    assert!(text.contains("Read length N50:\t90\n"));
    assert_eq!(metrics::n50(&[1, 2, 3, 4, 90]), Ok(90));
}

#[test]
fn full_columns_render_every_section() {
    let text = report(vec![("full", full_table())], &SummarizeConfig::default());
    let expected = "\
General summary:\tfull
Active channels:\t2
Average percent identity:\t94.5
Mean read length:\t550
Mean read quality:\t9.5
Median percent identity:\t94.5
Median read length:\t550
Median read quality:\t9.5
Number of reads:\t10
Read length N50:\t700
Run IDs:\trunA,runB
Total bases:\t5500
Total bases aligned:\t4950
Top 5 longest reads and their mean basecall quality score
1:\t1000 (5, [r10])
2:\t900 (6, [r9])
3:\t800 (7, [r8])
4:\t700 (8, [r7])
5:\t600 (9, [r6])
Top 5 highest mean basecall quality scores and their read lengths
1:\t100 (14, [r1])
2:\t200 (13, [r2])
3:\t300 (12, [r3])
4:\t400 (11, [r4])
5:\t500 (10, [r5])
Number and percentage of reads above quality cutoffs
>Q5:\t9 (90.0%)
>Q7:\t7 (70.0%)
>Q10:\t4 (40.0%)
>Q12:\t2 (20.0%)
>Q15:\t0 (0.0%)
";
    assert_eq!(text, expected);
}

#[test]
fn two_quality_datasets_share_blocks() {
    let second = ReadTable::new((1..=10).map(|i| i * 10).collect())
        .with_quals(vec![20.0; 10])
        .unwrap();
    let text = report(
        vec![("full", full_table()), ("flat", second)],
        &SummarizeConfig::default(),
    );
    assert!(text.contains("Mean read quality:\t9.5\t20\n"));
    // read ids only exist in the first dataset
    assert!(text.contains("1:\t1000 (5, [r10])\t100 (20)\n"));
    assert!(text.contains(">Q15:\t0 (0.0%)\t10 (100.0%)\n"));
    assert!(!text.contains("Active channels"));
}

#[test]
fn adaptive_cutoffs_are_merged_across_datasets() {
    let low = ReadTable::new(vec![100; 10]).with_quals(vec![6.0; 10]).unwrap();
    let high = ReadTable::new(vec![100; 10]).with_quals(vec![16.0; 10]).unwrap();
    let cfg = SummarizeConfig {
        stats: StatsConfig {
            cutoffs: QualityCutoffs::Adaptive,
            ..StatsConfig::default()
        },
        ..SummarizeConfig::default()
    };
    let text = report(vec![("low", low), ("high", high)], &cfg);
    assert!(text.contains(">Q5:\t10 (100.0%)\t10 (100.0%)\n"));
    assert!(text.contains(">Q10:\t0 (0.0%)\t10 (100.0%)\n"));
    assert!(text.contains(">Q15:\tN/A\t10 (100.0%)\n"));
    assert!(text.contains(">Q20:\tN/A\t0 (0.0%)\n"));
}

#[test]
fn skipped_datasets_are_listed() {
    let cfg = SummarizeConfig {
        policy: InsufficientDataPolicy::Skip,
        ..SummarizeConfig::default()
    };
    let text = report(
        vec![
            ("ok", ReadTable::new((1..=20).collect())),
            ("small", ReadTable::new(vec![5, 6, 7])),
        ],
        &cfg,
    );
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("General summary:\tok"));
    assert_eq!(
        lines.next(),
        Some("Skipped (insufficient data):\tsmall: 3 reads, need 10")
    );
}

#[test]
fn fixed_width_cells() {
    let tables = vec![("a".to_string(), ReadTable::new((1..=20).collect()))];
    let out = engine::summarize(&tables, &SummarizeConfig::default()).unwrap();
    let text = stats_txt::render(
        &out.names,
        &out.records,
        &out.skipped,
        &ReportOptions { field_width: 6 },
    )
    .unwrap();
    assert!(text.starts_with("General summary:\t     a\n"));
    assert!(text.contains("Total bases:\t   210\n"));
}

#[test]
fn mismatched_names_are_rejected() {
    let tables = vec![("a".to_string(), ReadTable::new((1..=20).collect()))];
    let out = engine::summarize(&tables, &SummarizeConfig::default()).unwrap();
    let names = vec!["a".to_string(), "b".to_string()];
    assert!(stats_txt::render(&names, &out.records, &[], &ReportOptions::default()).is_err());
}
