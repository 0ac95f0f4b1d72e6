use thiserror::Error;

pub const LENGTHS: &str = "lengths";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Feature {
    Quals,
    AlignedLengths,
    PercentIdentity,
    ChannelIds,
    RunIds,
    ReadIds,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::Quals,
        Feature::AlignedLengths,
        Feature::PercentIdentity,
        Feature::ChannelIds,
        Feature::RunIds,
        Feature::ReadIds,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            Feature::Quals => "quals",
            Feature::AlignedLengths => "aligned_lengths",
            Feature::PercentIdentity => "percentIdentity",
            Feature::ChannelIds => "channelIDs",
            Feature::RunIds => "runIDs",
            Feature::ReadIds => "readIDs",
        }
    }

    pub fn from_column_name(name: &str) -> Option<Self> {
        Feature::ALL.into_iter().find(|f| f.column_name() == name)
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Feature::Quals | Feature::AlignedLengths | Feature::PercentIdentity
        )
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Capabilities(u8);

impl Capabilities {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn with(self, feature: Feature) -> Self {
        Self(self.0 | feature.bit())
    }

    pub fn has(self, feature: Feature) -> bool {
        self.0 & feature.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = Feature> {
        Feature::ALL.into_iter().filter(move |f| self.has(*f))
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    #[error("column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("column '{0}' is not present")]
    MissingColumn(String),
    #[error("column '{0}' is not numeric")]
    NotNumeric(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReadTable {
    lengths: Vec<u64>,
    quals: Option<Vec<f64>>,
    aligned_lengths: Option<Vec<f64>>,
    percent_identity: Option<Vec<f64>>,
    channel_ids: Option<Vec<String>>,
    run_ids: Option<Vec<String>>,
    read_ids: Option<Vec<String>>,
}

impl ReadTable {
    pub fn new(lengths: Vec<u64>) -> Self {
        Self {
            lengths,
            ..Self::default()
        }
    }

    pub fn with_quals(mut self, quals: Vec<f64>) -> Result<Self, TableError> {
        self.check_len(Feature::Quals, quals.len())?;
        self.quals = Some(quals);
        Ok(self)
    }

    pub fn with_aligned_lengths(mut self, aligned: Vec<f64>) -> Result<Self, TableError> {
        self.check_len(Feature::AlignedLengths, aligned.len())?;
        self.aligned_lengths = Some(aligned);
        Ok(self)
    }

    pub fn with_percent_identity(mut self, identity: Vec<f64>) -> Result<Self, TableError> {
        self.check_len(Feature::PercentIdentity, identity.len())?;
        self.percent_identity = Some(identity);
        Ok(self)
    }

    pub fn with_channel_ids(mut self, channels: Vec<String>) -> Result<Self, TableError> {
        self.check_len(Feature::ChannelIds, channels.len())?;
        self.channel_ids = Some(channels);
        Ok(self)
    }

    pub fn with_run_ids(mut self, runs: Vec<String>) -> Result<Self, TableError> {
        self.check_len(Feature::RunIds, runs.len())?;
        self.run_ids = Some(runs);
        Ok(self)
    }

    pub fn with_read_ids(mut self, ids: Vec<String>) -> Result<Self, TableError> {
        self.check_len(Feature::ReadIds, ids.len())?;
        self.read_ids = Some(ids);
        Ok(self)
    }

    fn check_len(&self, feature: Feature, found: usize) -> Result<(), TableError> {
        if found != self.lengths.len() {
            return Err(TableError::LengthMismatch {
                column: feature.column_name(),
                expected: self.lengths.len(),
                found,
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    pub fn capabilities(&self) -> Capabilities {
        Feature::ALL
            .into_iter()
            .filter(|f| self.has_column(*f))
            .fold(Capabilities::empty(), Capabilities::with)
    }

    fn has_column(&self, feature: Feature) -> bool {
        match feature {
            Feature::Quals => self.quals.is_some(),
            Feature::AlignedLengths => self.aligned_lengths.is_some(),
            Feature::PercentIdentity => self.percent_identity.is_some(),
            Feature::ChannelIds => self.channel_ids.is_some(),
            Feature::RunIds => self.run_ids.is_some(),
            Feature::ReadIds => self.read_ids.is_some(),
        }
    }

    pub fn lengths(&self) -> &[u64] {
        &self.lengths
    }

    pub fn quals(&self) -> Option<&[f64]> {
        self.quals.as_deref()
    }

    pub fn aligned_lengths(&self) -> Option<&[f64]> {
        self.aligned_lengths.as_deref()
    }

    pub fn percent_identity(&self) -> Option<&[f64]> {
        self.percent_identity.as_deref()
    }

    pub fn channel_ids(&self) -> Option<&[String]> {
        self.channel_ids.as_deref()
    }

    pub fn run_ids(&self) -> Option<&[String]> {
        self.run_ids.as_deref()
    }

    pub fn read_ids(&self) -> Option<&[String]> {
        self.read_ids.as_deref()
    }

    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, TableError> {
        if name == LENGTHS {
            return Ok(self.lengths.iter().map(|&l| l as f64).collect());
        }
        let feature =
            Feature::from_column_name(name).ok_or_else(|| TableError::MissingColumn(name.into()))?;
        if !feature.is_numeric() {
            return Err(TableError::NotNumeric(name.into()));
        }
        let values = match feature {
            Feature::Quals => self.quals(),
            Feature::AlignedLengths => self.aligned_lengths(),
            Feature::PercentIdentity => self.percent_identity(),
            _ => None,
        };
        values
            .map(<[f64]>::to_vec)
            .ok_or_else(|| TableError::MissingColumn(name.into()))
    }

    pub fn filter_rows<F>(&self, keep: F) -> ReadTable
    where
        F: Fn(usize) -> bool,
    {
        let rows: Vec<usize> = (0..self.len()).filter(|&i| keep(i)).collect();
        ReadTable {
            lengths: pick(&self.lengths, &rows),
            quals: self.quals.as_ref().map(|c| pick(c, &rows)),
            aligned_lengths: self.aligned_lengths.as_ref().map(|c| pick(c, &rows)),
            percent_identity: self.percent_identity.as_ref().map(|c| pick(c, &rows)),
            channel_ids: self.channel_ids.as_ref().map(|c| pick(c, &rows)),
            run_ids: self.run_ids.as_ref().map(|c| pick(c, &rows)),
            read_ids: self.read_ids.as_ref().map(|c| pick(c, &rows)),
        }
    }
}

fn pick<T: Clone>(column: &[T], rows: &[usize]) -> Vec<T> {
    rows.iter().map(|&i| column[i].clone()).collect()
}
