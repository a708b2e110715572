//! Output records and their persistence.

use std::io;
use std::path::Path;

use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter};
use thiserror::Error;
use tracing::{info, warn};

use crate::csv::{CsvWriter, Record};
use crate::heroes::{InvalidRoleCode, Role};

/// One extracted detail row: a single player's performance in a single match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchRecord {
    pub match_index: usize,
    pub row_index: usize,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub damage: u64,
    pub damage_taken: u64,
    pub healing: u64,
    pub is_mvp: bool,
    pub hero_id: Option<String>,
    pub hero_name: String,
    pub role: Role,
}

/// Output columns, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumCount)]
pub enum Column {
    #[strum(serialize = "match")]
    Match,
    #[strum(serialize = "row")]
    Row,
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
    #[strum(serialize = "mvp")]
    Mvp,
    #[strum(serialize = "hero_id")]
    HeroId,
    #[strum(serialize = "hero_name")]
    HeroName,
    #[strum(serialize = "role")]
    Role,
}

impl From<Column> for usize {
    fn from(column: Column) -> Self {
        column as usize
    }
}

pub fn header() -> Record {
    Record::with_values(Column::iter())
}

fn render_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

impl From<&MatchRecord> for Record {
    fn from(record: &MatchRecord) -> Self {
        let mut row = Record::with_capacity(Column::COUNT);
        row.set(Column::Match, record.match_index);
        row.set(Column::Row, record.row_index);
        row.set(Column::Kills, record.kills);
        row.set(Column::Deaths, record.deaths);
        row.set(Column::Assists, record.assists);
        row.set(Column::Damage, record.damage);
        row.set(Column::DamageTaken, record.damage_taken);
        row.set(Column::Healing, record.healing);
        row.set(Column::Mvp, render_bool(record.is_mvp));
        row.set(Column::HeroId, record.hero_id.as_deref().unwrap_or_default());
        row.set(Column::HeroName, &record.hero_name);
        row.set(Column::Role, record.role.code());
        row
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("expected {expected} fields, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    #[error("invalid {column} value '{value}'")]
    InvalidValue { column: Column, value: String },

    #[error("{0}")]
    InvalidRole(#[from] InvalidRoleCode),
}

impl TryFrom<&[String]> for MatchRecord {
    type Error = RecordError;

    fn try_from(fields: &[String]) -> Result<Self, Self::Error> {
        if fields.len() != Column::COUNT {
            return Err(RecordError::FieldCount {
                expected: Column::COUNT,
                actual: fields.len(),
            });
        }
        fn field<T: std::str::FromStr>(fields: &[String], column: Column) -> Result<T, RecordError> {
            let value = &fields[usize::from(column)];
            value.trim().parse().map_err(|_| RecordError::InvalidValue {
                column,
                value: value.clone(),
            })
        }
        let is_mvp = match fields[usize::from(Column::Mvp)].trim() {
            "True" | "true" | "1" => true,
            "False" | "false" | "0" => false,
            other => {
                return Err(RecordError::InvalidValue {
                    column: Column::Mvp,
                    value: other.to_string(),
                })
            }
        };
        let hero_id = &fields[usize::from(Column::HeroId)];
        Ok(Self {
            match_index: field(fields, Column::Match)?,
            row_index: field(fields, Column::Row)?,
            kills: field(fields, Column::Kills)?,
            deaths: field(fields, Column::Deaths)?,
            assists: field(fields, Column::Assists)?,
            damage: field(fields, Column::Damage)?,
            damage_taken: field(fields, Column::DamageTaken)?,
            healing: field(fields, Column::Healing)?,
            is_mvp,
            hero_id: (!hero_id.is_empty()).then(|| hero_id.clone()),
            hero_name: fields[usize::from(Column::HeroName)].clone(),
            role: Role::try_from(field::<u8>(fields, Column::Role)?)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// There were no records, so no file was written.
    NothingToSave,
    Saved { records: usize },
}

/// Writes the header and one line per record to `path`. An empty slice leaves the file system
/// untouched.
pub fn save(records: &[MatchRecord], path: impl AsRef<Path>) -> Result<SaveOutcome, io::Error> {
    let path = path.as_ref();
    if records.is_empty() {
        warn!("no data to save; {} not written", path.display());
        return Ok(SaveOutcome::NothingToSave);
    }
    let mut csv = CsvWriter::create(path)?;
    csv.append(header())?;
    for record in records {
        csv.append(Record::from(record))?;
    }
    csv.flush()?;
    info!("saved {} records to {}", records.len(), path.display());
    Ok(SaveOutcome::Saved {
        records: records.len(),
    })
}

/// All records collected over one run, in extraction order.
#[derive(Debug, Default)]
pub struct RunResult {
    records: Vec<MatchRecord>,
}
impl RunResult {
    pub fn extend(&mut self, records: impl IntoIterator<Item = MatchRecord>) {
        self.records.extend(records);
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

    /// Saves the collected records, consuming the result.
    pub fn persist(self, path: impl AsRef<Path>) -> Result<SaveOutcome, io::Error> {
        save(&self.records, path)
    }
}
