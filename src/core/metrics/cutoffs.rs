use std::fmt;
use std::str::FromStr;

pub const DEFAULT_CUTOFFS: [u32; 5] = [5, 7, 10, 12, 15];
pub const ADAPTIVE_STEP: u32 = 5;
// highest score a Sanger-encoded quality string can carry
pub const MAX_PHRED: u32 = 93;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QualityCutoffs {
    Fixed(Vec<u32>),
    Adaptive,
}

impl Default for QualityCutoffs {
    fn default() -> Self {
        QualityCutoffs::Fixed(DEFAULT_CUTOFFS.to_vec())
    }
}

impl QualityCutoffs {
    pub fn thresholds(&self, quals: &[f64]) -> Vec<u32> {
        match self {
            QualityCutoffs::Fixed(list) => list.clone(),
            QualityCutoffs::Adaptive => {
                let Some(max) = quals.iter().copied().filter(|q| q.is_finite()).reduce(f64::max)
                else {
                    return Vec::new();
                };
                // multiples of the step up to max + step, never past MAX_PHRED
                let limit = (max + f64::from(ADAPTIVE_STEP)).min(f64::from(MAX_PHRED));
                (1..=MAX_PHRED / ADAPTIVE_STEP)
                    .map(|i| i * ADAPTIVE_STEP)
                    .take_while(|&t| f64::from(t) <= limit)
                    .collect()
            }
        }
    }
}

impl FromStr for QualityCutoffs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("adaptive") {
            return Ok(QualityCutoffs::Adaptive);
        }
        let mut list = s
            .split(',')
            .map(|t| {
                t.trim()
                    .parse::<u32>()
                    .map_err(|_| format!("invalid quality cutoff '{}'", t.trim()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        list.sort_unstable();
        list.dedup();
        Ok(QualityCutoffs::Fixed(list))
    }
}

impl fmt::Display for QualityCutoffs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityCutoffs::Adaptive => write!(f, "adaptive"),
            QualityCutoffs::Fixed(list) => {
                let parts: Vec<String> = list.iter().map(u32::to_string).collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CutoffCount {
    pub threshold: u32,
    pub count: u64,
    pub percent: f64,
}

pub fn reads_above(quals: &[f64], thresholds: &[u32]) -> Vec<CutoffCount> {
    let total = quals.len();
    thresholds
        .iter()
        .map(|&threshold| {
            let limit = f64::from(threshold);
            let count = quals.iter().filter(|&&q| q > limit).count() as u64;
            let percent = if total == 0 {
                0.0
            } else {
                100.0 * count as f64 / total as f64
            };
            CutoffCount {
                threshold,
                count,
                percent,
            }
        })
        .collect()
}
