//! Scraper configuration: target locator, timing policy, page selectors and backend settings.

use std::time::Duration;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::parse::HeroIdPattern;
use crate::webdriver::WebDriverConfig;

/// Identifier of the player whose match history is scraped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerId(String);
impl PlayerId {
    pub fn new(id: impl Into<String>) -> Result<Self, anyhow::Error> {
        let id = id.into();
        if id.is_empty()
            || !id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            bail!("player identifier '{id}' must be a non-empty string of [A-Za-z0-9_-]");
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PlayerId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Waits and pauses, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Bound on the wait for the match container; expiry is fatal.
    pub container_timeout: u64,
    /// Unconditional delay after the container appears.
    pub settle_delay: u64,
    /// Interval between presence checks of a bounded wait.
    pub poll_interval: u64,
    /// Pause after scrolling a match into view.
    pub scroll_pause: u64,
    /// Bound on the wait for rows after clicking the expander; expiry is not fatal.
    pub expand_timeout: u64,
    /// Pause after a successful expansion.
    pub expand_pause: u64,
    /// Pause between matches.
    pub match_pause: u64,
}
impl Timings {
    pub fn container_timeout(&self) -> Duration {
        Duration::from_millis(self.container_timeout)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause)
    }

    pub fn expand_timeout(&self) -> Duration {
        Duration::from_millis(self.expand_timeout)
    }

    pub fn expand_pause(&self) -> Duration {
        Duration::from_millis(self.expand_pause)
    }

    pub fn match_pause(&self) -> Duration {
        Duration::from_millis(self.match_pause)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.poll_interval == 0 {
            bail!("poll interval must be positive");
        }
        if self.container_timeout < self.poll_interval {
            bail!(
                "container timeout ({} ms) cannot be shorter than the poll interval ({} ms)",
                self.container_timeout,
                self.poll_interval
            );
        }
        Ok(())
    }

    /// No pauses and short waits, for exercising the scraper against a local page.
    #[cfg(test)]
    pub(crate) fn instant() -> Self {
        Self {
            container_timeout: 20,
            settle_delay: 0,
            poll_interval: 1,
            scroll_pause: 0,
            expand_timeout: 5,
            expand_pause: 0,
            match_pause: 0,
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            container_timeout: 12_000,
            settle_delay: 10_000,
            poll_interval: 250,
            scroll_pause: 100,
            expand_timeout: 12_000,
            expand_pause: 200,
            match_pause: 100,
        }
    }
}

/// CSS selectors locating the parts of the match-history view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// The container holding the match list.
    pub container: String,
    /// Match elements, searched from the document.
    pub matches: String,
    /// The expander within a match.
    pub expander: String,
    /// Detail rows within a match.
    pub rows: String,
    /// The following are searched within a row.
    pub kda: String,
    pub damage: String,
    pub damage_taken: String,
    pub healing: String,
    pub mvp_marker: String,
    pub hero_image: String,
    /// Regular expression whose first group captures the hero identifier in the image source.
    pub hero_id_pattern: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            container: "div.matches".into(),
            matches: "div.matches > div.match-details".into(),
            expander: "a.match .link-ind".into(),
            rows: "tr".into(),
            kda: ".kda .avg".into(),
            damage: ".stat-value.damage .text".into(),
            damage_taken: ".stat-value.dmg-taken .text".into(),
            healing: ".stat-value.heal .text".into(),
            mvp_marker: ".badges .mvp, .badges .svp".into(),
            hero_image: ".hero img".into(),
            hero_id_pattern: HeroIdPattern::DEFAULT.into(),
        }
    }
}

impl Selectors {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let required = [
            ("container", &self.container),
            ("matches", &self.matches),
            ("expander", &self.expander),
            ("rows", &self.rows),
            ("kda", &self.kda),
            ("damage", &self.damage),
            ("damage_taken", &self.damage_taken),
            ("healing", &self.healing),
            ("mvp_marker", &self.mvp_marker),
            ("hero_image", &self.hero_image),
        ];
        for (name, selector) in required {
            if selector.trim().is_empty() {
                bail!("{name} selector cannot be empty");
            }
        }
        HeroIdPattern::new(&self.hero_id_pattern)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Locator of the match-history view; `{id}` is replaced with the player identifier.
    pub url_template: String,
    pub timings: Timings,
    pub selectors: Selectors,
    /// Whether to resolve hero identifiers, names and roles. When off, every record carries the
    /// unknown sentinels.
    pub enrich_heroes: bool,
    pub webdriver: WebDriverConfig,
}

impl ScrapeConfig {
    pub const ID_PLACEHOLDER: &'static str = "{id}";

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.url_template.contains(Self::ID_PLACEHOLDER) {
            bail!(
                "URL template '{}' must contain the {} placeholder",
                self.url_template,
                Self::ID_PLACEHOLDER
            );
        }
        self.timings.validate()?;
        self.selectors.validate()?;
        self.webdriver.validate()?;
        Ok(())
    }

    pub fn player_url(&self, player: &PlayerId) -> String {
        self.url_template
            .replace(Self::ID_PLACEHOLDER, player.as_str())
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url_template: "https://rivalsmeta.com/player/{id}".into(),
            timings: Timings::default(),
            selectors: Selectors::default(),
            enrich_heroes: true,
            webdriver: WebDriverConfig::default(),
        }
    }
}
