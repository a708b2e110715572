//! Loading scraper output and shaping it into per-role feature matrices.

use std::io;
use std::path::Path;

use ordinalizer::Ordinal;
use rustc_hash::FxHashSet;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter};
use thiserror::Error;

use rivals::csv::CsvReader;
use rivals::heroes::Role;
use rivals::model::{header, MatchRecord, RecordError};

use crate::linear::Matrix;

/// The numeric performance features the model is fitted on, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Ordinal, Display, EnumCount, EnumIter)]
pub enum Feature {
    #[strum(serialize = "kills")]
    Kills,
    #[strum(serialize = "deaths")]
    Deaths,
    #[strum(serialize = "assists")]
    Assists,
    #[strum(serialize = "damage")]
    Damage,
    #[strum(serialize = "dmg_taken")]
    DamageTaken,
    #[strum(serialize = "healing")]
    Healing,
}
impl Feature {
    pub fn index(ordinal: usize) -> Self {
        Self::iter().nth(ordinal).unwrap_or_else(|| panic!("no feature at ordinal {ordinal}"))
    }

    pub fn extract(&self, record: &MatchRecord) -> f64 {
        match self {
            Feature::Kills => record.kills as f64,
            Feature::Deaths => record.deaths as f64,
            Feature::Assists => record.assists as f64,
            Feature::Damage => record.damage as f64,
            Feature::DamageTaken => record.damage_taken as f64,
            Feature::Healing => record.healing as f64,
        }
    }
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("file is empty")]
    Empty,

    #[error("unexpected header {0:?}")]
    Header(Vec<String>),

    #[error("line {line}: {source}")]
    Record { line: usize, source: RecordError },
}

/// The features and MVP labels of the records of one role.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleSet {
    pub role: Role,
    pub features: Matrix,
    pub labels: Vec<bool>,
}
impl RoleSet {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&label| label).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<MatchRecord>,
}
impl Dataset {
    pub fn new(records: Vec<MatchRecord>) -> Self {
        Self { records }
    }

    /// Reads a file written by the scraper, validating the header.
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let mut reader = CsvReader::open(path)?;
        let first = reader.read().ok_or(DatasetError::Empty)??;
        let expected: Vec<_> = header().into_iter().collect();
        if first != expected {
            return Err(DatasetError::Header(first));
        }
        let mut records = vec![];
        for (line, fields) in (2..).zip(reader) {
            let fields = fields?;
            if fields.len() == 1 && fields[0].is_empty() {
                continue;
            }
            let record = MatchRecord::try_from(fields.as_slice())
                .map_err(|source| DatasetError::Record { line, source })?;
            records.push(record);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records that exactly repeat an earlier record.
    pub fn duplicates(&self) -> usize {
        let mut seen = FxHashSet::default();
        self.records
            .iter()
            .filter(|record| !seen.insert(*record))
            .count()
    }

    /// Drops exact repeats, keeping the first occurrence of each record.
    pub fn dedup(self) -> Self {
        let mut seen = FxHashSet::default();
        let records = self
            .records
            .into_iter()
            .filter(|record| seen.insert(record.clone()))
            .collect();
        Self { records }
    }

    pub fn by_role(&self, role: Role) -> RoleSet {
        let selected: Vec<_> = self
            .records
            .iter()
            .filter(|record| record.role == role)
            .collect();
        let mut features = Matrix::allocate(selected.len(), Feature::COUNT);
        for (row, record) in selected.iter().enumerate() {
            for feature in Feature::iter() {
                features[(row, feature.ordinal())] = feature.extract(record);
            }
        }
        RoleSet {
            role,
            features,
            labels: selected.iter().map(|record| record.is_mvp).collect(),
        }
    }
}
