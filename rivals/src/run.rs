//! A complete scrape of one player: bootstrap, walk, extract, persist, release.

use std::io;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::bootstrap::bootstrap;
use crate::config::{PlayerId, ScrapeConfig, Selectors, Timings};
use crate::extract::RowExtractor;
use crate::model::{RunResult, SaveOutcome};
use crate::session::{wait_for_element, Page, Scope, SessionError};
use crate::walker::{LiveMatches, MatchVisitor, Walker};

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("match container '{selector}' not present after {timeout:?}")]
    ContainerTimeout { selector: String, timeout: Duration },

    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

/// Whether a match revealed its detail rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    Expanded,
    /// The match stays as it was; the reason is kept for diagnostics.
    Collapsed(String),
}

async fn try_expand<P: Page>(
    page: &P,
    element: &P::Element,
    selectors: &Selectors,
    timings: &Timings,
) -> Result<Expansion, SessionError> {
    let Some(expander) = page
        .find_first(Scope::Within(element), &selectors.expander)
        .await?
    else {
        return Ok(Expansion::Collapsed("no expander".into()));
    };
    page.click(&expander).await?;
    let rows = wait_for_element(
        page,
        Scope::Within(element),
        &selectors.rows,
        timings.expand_timeout(),
        timings.poll_interval(),
    )
    .await?;
    match rows {
        Some(_) => {
            sleep(timings.expand_pause()).await;
            Ok(Expansion::Expanded)
        }
        None => Ok(Expansion::Collapsed(format!(
            "no rows after {:?}",
            timings.expand_timeout()
        ))),
    }
}

/// Clicks the match's expander and waits, within a bound, for its rows. Never fails; any problem
/// yields [`Expansion::Collapsed`].
pub async fn expand<P: Page>(
    page: &P,
    element: &P::Element,
    selectors: &Selectors,
    timings: &Timings,
) -> Expansion {
    try_expand(page, element, selectors, timings)
        .await
        .unwrap_or_else(|err| Expansion::Collapsed(err.to_string()))
}

/// Visits each match: brings it into view, expands it and extracts its rows into the result.
struct MatchScanner<'a, P: Page> {
    page: &'a P,
    extractor: RowExtractor<'a>,
    selectors: &'a Selectors,
    timings: &'a Timings,
    result: RunResult,
    matches: usize,
    skipped_rows: usize,
    collapsed_matches: usize,
}

impl<P: Page> MatchVisitor<P::Element> for MatchScanner<'_, P> {
    type Error = ScrapeError;

    async fn visit(&mut self, match_index: usize, element: &P::Element) -> Result<(), ScrapeError> {
        self.page.scroll_into_view(element).await?;
        sleep(self.timings.scroll_pause()).await;

        match expand(self.page, element, self.selectors, self.timings).await {
            Expansion::Expanded => debug!("match #{match_index}: expanded"),
            Expansion::Collapsed(reason) => {
                warn!("match #{match_index}: not expanded: {reason}");
                self.collapsed_matches += 1;
            }
        }

        let extraction = self.extractor.extract(self.page, element, match_index).await?;
        info!(
            "match #{match_index}: {} records extracted, {} rows skipped",
            extraction.records.len(),
            extraction.skipped
        );
        self.matches += 1;
        self.skipped_rows += extraction.skipped;
        self.result.extend(extraction.records);
        Ok(())
    }
}

/// What a run did.
#[derive(Debug)]
pub struct RunReport {
    pub matches: usize,
    pub records: usize,
    pub skipped_rows: usize,
    pub collapsed_matches: usize,
    pub saved: Result<SaveOutcome, io::Error>,
    /// Set when the run ended early.
    pub abort: Option<ScrapeError>,
}
impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.abort.is_none() && self.saved.is_ok()
    }
}

async fn scrape<P: Page>(
    page: &P,
    config: &ScrapeConfig,
    player: &PlayerId,
    scanner: &mut MatchScanner<'_, P>,
) -> Result<usize, ScrapeError> {
    bootstrap(page, config, player).await?;
    let mut source = LiveMatches::new(page, &config.selectors.matches);
    Walker::new(config.timings.match_pause())
        .walk(&mut source, scanner)
        .await
}

/// Scrapes every match of `player`, then writes whatever was collected to `output` and closes the
/// page. Persistence and release happen on every path, in that order, and the page is closed
/// exactly once.
pub async fn run<P: Page>(
    page: P,
    config: &ScrapeConfig,
    extractor: RowExtractor<'_>,
    player: &PlayerId,
    output: impl AsRef<Path>,
) -> RunReport {
    let (result, matches, skipped_rows, collapsed_matches, abort) = {
        let mut scanner = MatchScanner {
            page: &page,
            extractor,
            selectors: &config.selectors,
            timings: &config.timings,
            result: RunResult::default(),
            matches: 0,
            skipped_rows: 0,
            collapsed_matches: 0,
        };
        let abort = match scrape(&page, config, player, &mut scanner).await {
            Ok(matches) => {
                info!("walked {matches} matches");
                None
            }
            Err(err) => {
                error!("run aborted: {err}");
                Some(err)
            }
        };
        (
            scanner.result,
            scanner.matches,
            scanner.skipped_rows,
            scanner.collapsed_matches,
            abort,
        )
    };

    let records = result.len();
    let saved = result.persist(output);
    if let Err(err) = &saved {
        error!("could not save results: {err}");
    }

    if let Err(err) = page.close().await {
        error!("could not close session: {err}");
    }
    info!(
        "finished: {matches} matches, {records} records, {skipped_rows} rows skipped, {collapsed_matches} matches not expanded"
    );
    RunReport {
        matches,
        records,
        skipped_rows,
        collapsed_matches,
        saved,
        abort,
    }
}
