//! Parsing of the text fields shown in a match detail row.

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected K/D/A as three '/'-separated integers, got '{0}'")]
    Kda(String),

    #[error("expected a non-negative integer, got '{0}'")]
    Grouped(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kda {
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
}

/// Parses a compound `kills/deaths/assists` field, such as `12 / 3 / 7`.
pub fn parse_kda(text: &str) -> Result<Kda, ParseError> {
    let mut parts = [0; 3];
    let mut tokens = text.split('/');
    for part in &mut parts {
        *part = tokens
            .next()
            .and_then(|token| token.trim().parse().ok())
            .ok_or_else(|| ParseError::Kda(text.to_string()))?;
    }
    if tokens.next().is_some() {
        return Err(ParseError::Kda(text.to_string()));
    }
    let [kills, deaths, assists] = parts;
    Ok(Kda {
        kills,
        deaths,
        assists,
    })
}

/// Parses an integer that may be rendered with thousands separators, such as `12,345`.
/// Commas and whitespace (including non-breaking and narrow no-break spaces) are grouping
/// punctuation; anything else that is not a digit fails the parse.
pub fn parse_grouped(text: &str) -> Result<u64, ParseError> {
    let digits: String = text
        .chars()
        .filter(|&c| c != ',' && !c.is_whitespace())
        .collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::Grouped(text.to_string()));
    }
    digits
        .parse()
        .map_err(|_| ParseError::Grouped(text.to_string()))
}

/// Extracts the hero identifier from an image source reference, using the first capture group of
/// the supplied pattern.
#[derive(Debug, Clone)]
pub struct HeroIdPattern {
    regex: Regex,
}
impl HeroIdPattern {
    pub const DEFAULT: &'static str = r"img_selecthero_(\d+)";

    pub fn new(pattern: &str) -> Result<Self, anyhow::Error> {
        let regex = Regex::new(pattern)?;
        if regex.captures_len() < 2 {
            anyhow::bail!("hero identifier pattern '{pattern}' must have a capture group");
        }
        Ok(Self { regex })
    }

    pub fn extract(&self, src: &str) -> Option<String> {
        self.regex
            .captures(src)
            .and_then(|captures| captures.get(1))
            .map(|group| group.as_str().to_string())
            .filter(|hero_id| !hero_id.is_empty())
    }
}
