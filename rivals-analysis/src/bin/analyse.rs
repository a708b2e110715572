use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info, warn};

use rivals_analysis::analysis::{analyse, AnalysisOptions, RoleOutcome};
use rivals_analysis::dataset::{Dataset, Feature};
use rivals_analysis::report::{
    tabulate_calibration, tabulate_coefficients, tabulate_correlations, tabulate_metrics,
    tabulate_summaries,
};
use strum::IntoEnumIterator;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// CSV file written by the scraper
    file: PathBuf,

    /// drop exact duplicate records before analysing
    #[clap(long)]
    dedup: bool,

    /// seed for the train/test split and cross-validation folds
    #[clap(long, default_value = "42")]
    seed: u64,

    /// number of cross-validation folds
    #[clap(long, default_value = "5")]
    folds: usize,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.folds < 2 {
            bail!("at least two folds are required");
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let options = AnalysisOptions {
        seed: args.seed,
        folds: args.folds,
        ..AnalysisOptions::default()
    };
    options.validate()?;

    let mut dataset = Dataset::read_csv(&args.file)?;
    let duplicates = dataset.duplicates();
    info!(
        "{} records read from {}: {} unique, {duplicates} duplicate",
        dataset.len(),
        args.file.display(),
        dataset.len() - duplicates
    );
    if args.dedup {
        dataset = dataset.dedup();
        info!("duplicates dropped, {} records remain", dataset.len());
    } else if duplicates > 0 {
        warn!("duplicates kept; pass --dedup to drop them");
    }

    let names: Vec<_> = Feature::iter().collect();
    for (role, outcome) in analyse(&dataset, &options)? {
        match outcome {
            RoleOutcome::NoData => info!("role {role} ({}): no data", role.code()),
            RoleOutcome::SingleClass { samples } => {
                info!(
                    "role {role} ({}): {samples} samples with a single outcome, cannot fit",
                    role.code()
                )
            }
            RoleOutcome::Fitted(analysis) => {
                info!(
                    "role {role} ({}): {} samples, {} MVP",
                    role.code(),
                    analysis.samples,
                    analysis.positives
                );
                info!("\n{}", Console::default().render(&tabulate_summaries(&analysis)));
                info!(
                    "correlations:\n{}",
                    Console::default().render(&tabulate_correlations(&analysis.correlations))
                );
                for pair in &analysis.strong_pairs {
                    info!(
                        "strong correlation: {} ~ {} ({:.3})",
                        pair.first, pair.second, pair.correlation
                    );
                }
                info!(
                    "{} training, {} test samples; fitted in {} iterations (converged: {})",
                    analysis.train_samples,
                    analysis.test_samples,
                    analysis.model.iterations,
                    analysis.model.converged
                );
                info!("\n{}", Console::default().render(&tabulate_coefficients(&analysis)));
                info!("over standardised features: {}", analysis.model.equation(&names));
                info!(
                    "cross-validated ROC-AUC: {:?}",
                    analysis
                        .cv_auc
                        .iter()
                        .map(|auc| format!("{auc:.4}"))
                        .collect::<Vec<_>>()
                );
                info!("\n{}", Console::default().render(&tabulate_metrics(&analysis)));
                info!(
                    "calibration:\n{}",
                    Console::default().render(&tabulate_calibration(&analysis))
                );
            }
        }
    }
    Ok(())
}
