//! Turning the detail rows of an expanded match into [`MatchRecord`]s.

use strum_macros::Display;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ScrapeConfig, Selectors};
use crate::heroes::{HeroTables, Resolution};
use crate::model::MatchRecord;
use crate::parse::{parse_grouped, parse_kda, HeroIdPattern, ParseError};
use crate::session::{Page, Scope, SessionError};

/// A mandatory field of a detail row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Field {
    #[strum(serialize = "K/D/A")]
    Kda,
    #[strum(serialize = "damage")]
    Damage,
    #[strum(serialize = "damage taken")]
    DamageTaken,
    #[strum(serialize = "healing")]
    Healing,
}

#[derive(Debug, Error)]
pub enum RowError {
    #[error("missing {0} field")]
    MissingField(Field),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Session(#[from] SessionError),
}

/// The text of a row as read from the page, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub kda: String,
    pub damage: String,
    pub damage_taken: String,
    pub healing: String,
    pub is_mvp: bool,
    /// Source reference of the hero image, if there is one.
    pub hero_src: Option<String>,
}

/// Records extracted from one match, and the number of rows that had to be skipped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub records: Vec<MatchRecord>,
    pub skipped: usize,
}

pub struct RowExtractor<'a> {
    selectors: &'a Selectors,
    tables: &'a HeroTables,
    pattern: HeroIdPattern,
    enrich_heroes: bool,
}
impl<'a> RowExtractor<'a> {
    pub fn new(config: &'a ScrapeConfig, tables: &'a HeroTables) -> Result<Self, anyhow::Error> {
        Ok(Self {
            selectors: &config.selectors,
            tables,
            pattern: HeroIdPattern::new(&config.selectors.hero_id_pattern)?,
            enrich_heroes: config.enrich_heroes,
        })
    }

    /// Parses a raw row into a record. Hero fields fall back to the unknown sentinels when the
    /// identifier is absent, unmapped or enrichment is off.
    pub fn build(
        &self,
        match_index: usize,
        row_index: usize,
        raw: &RawRow,
    ) -> Result<MatchRecord, ParseError> {
        let kda = parse_kda(&raw.kda)?;
        let damage = parse_grouped(&raw.damage)?;
        let damage_taken = parse_grouped(&raw.damage_taken)?;
        let healing = parse_grouped(&raw.healing)?;
        let hero_id = if self.enrich_heroes {
            raw.hero_src
                .as_deref()
                .and_then(|src| self.pattern.extract(src))
        } else {
            None
        };
        let Resolution { name, role } = self.tables.resolve(hero_id.as_deref());
        Ok(MatchRecord {
            match_index,
            row_index,
            kills: kda.kills,
            deaths: kda.deaths,
            assists: kda.assists,
            damage,
            damage_taken,
            healing,
            is_mvp: raw.is_mvp,
            hero_name: name.to_string(),
            hero_id,
            role,
        })
    }

    async fn field_text<P: Page>(
        &self,
        page: &P,
        row: &P::Element,
        css: &str,
        field: Field,
    ) -> Result<String, RowError> {
        let element = page
            .find_first(Scope::Within(row), css)
            .await?
            .ok_or(RowError::MissingField(field))?;
        Ok(page.text(&element).await?)
    }

    async fn hero_src<P: Page>(
        &self,
        page: &P,
        row: &P::Element,
    ) -> Result<Option<String>, SessionError> {
        match page
            .find_first(Scope::Within(row), &self.selectors.hero_image)
            .await?
        {
            Some(image) => page.attribute(&image, "src").await,
            None => Ok(None),
        }
    }

    /// Reads the text of a single row. Failing to read the hero image is not an error; the hero
    /// is then left unidentified.
    pub async fn read_row<P: Page>(&self, page: &P, row: &P::Element) -> Result<RawRow, RowError> {
        let selectors = self.selectors;
        let kda = self.field_text(page, row, &selectors.kda, Field::Kda).await?;
        let damage = self
            .field_text(page, row, &selectors.damage, Field::Damage)
            .await?;
        let damage_taken = self
            .field_text(page, row, &selectors.damage_taken, Field::DamageTaken)
            .await?;
        let healing = self
            .field_text(page, row, &selectors.healing, Field::Healing)
            .await?;
        let is_mvp = page
            .find_first(Scope::Within(row), &selectors.mvp_marker)
            .await?
            .is_some();
        let hero_src = if self.enrich_heroes {
            self.hero_src(page, row).await.unwrap_or_else(|err| {
                debug!("hero image unreadable: {err}");
                None
            })
        } else {
            None
        };
        Ok(RawRow {
            kda,
            damage,
            damage_taken,
            healing,
            is_mvp,
            hero_src,
        })
    }

    /// Extracts every row currently present in a match. A row that cannot be read or parsed is
    /// logged and skipped; only failing to enumerate the rows is an error.
    pub async fn extract<P: Page>(
        &self,
        page: &P,
        element: &P::Element,
        match_index: usize,
    ) -> Result<Extraction, SessionError> {
        let rows = page
            .find_all(Scope::Within(element), &self.selectors.rows)
            .await?;
        let mut extraction = Extraction {
            records: Vec::with_capacity(rows.len()),
            skipped: 0,
        };
        for (row_index, row) in (1..).zip(&rows) {
            let record = match self.read_row(page, row).await {
                Ok(raw) => self
                    .build(match_index, row_index, &raw)
                    .map_err(RowError::from),
                Err(err) => Err(err),
            };
            match record {
                Ok(record) => {
                    debug!("{record:?}");
                    extraction.records.push(record);
                }
                Err(err) => {
                    warn!("match #{match_index}, row {row_index}: skipped: {err}");
                    extraction.skipped += 1;
                }
            }
        }
        Ok(extraction)
    }
}
