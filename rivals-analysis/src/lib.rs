//! Analysis of scraped match records: which in-match performance features predict the MVP
//! award, per hero role.
//!
//! A [`dataset::Dataset`] is read from the scraper's CSV output and split by role. Each role is
//! described, its features correlated, and a class-balanced, L2-penalised logistic model fitted
//! and evaluated on a stratified hold-out split (see [`analysis::analyse`]).

pub mod analysis;
pub mod correlation;
pub mod dataset;
pub mod describe;
pub mod linear;
pub mod logistic;
pub mod metrics;
pub mod report;
pub mod scale;
pub mod split;

#[doc = include_str!("../../README.md")]
#[cfg(doc)]
fn readme() {}
