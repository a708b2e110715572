//! Scrapes per-match player statistics from a player's match-history view and writes one record
//! per player per match to a CSV file.
//!
//! A run opens the view through a [`session::Page`], waits for the match container, then walks
//! the match list incrementally, expanding each match and extracting its detail rows. Whatever was
//! collected is persisted when the run ends, however it ends.

pub mod bootstrap;
pub mod config;
pub mod csv;
pub mod extract;
pub mod file;
pub mod heroes;
pub mod model;
pub mod parse;
pub mod run;
pub mod session;
pub mod walker;
pub mod webdriver;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../../README.md")]
#[cfg(doc)]
fn readme() {}
