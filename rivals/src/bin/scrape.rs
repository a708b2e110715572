use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use tracing::{debug, info};

use rivals::config::{PlayerId, ScrapeConfig};
use rivals::extract::RowExtractor;
use rivals::file::ReadJsonFile;
use rivals::heroes::HeroTables;
use rivals::run::run;
use rivals::webdriver::WebDriverPage;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// player whose match history to scrape
    player: PlayerId,

    /// file to write the records to
    #[clap(short = 'o', long, default_value = "match_data.csv")]
    output: PathBuf,

    /// JSON file to source the scraper configuration from
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// JSON file to source the hero table from
    #[clap(long)]
    heroes: Option<PathBuf>,

    /// WebDriver endpoint
    #[clap(long)]
    webdriver: Option<String>,

    /// run the browser without a window
    #[clap(long)]
    headless: bool,

    /// skip hero and role resolution
    #[clap(long)]
    no_heroes: bool,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.output.as_os_str().is_empty() {
            return Err(anyhow!("output file must be specified"));
        }
        Ok(())
    }

    fn load_config(&self) -> anyhow::Result<ScrapeConfig> {
        let mut config = match &self.config {
            Some(path) => ScrapeConfig::read_json_file(path)
                .map_err(|err| anyhow!("cannot read config {}: {err}", path.display()))?,
            None => ScrapeConfig::default(),
        };
        if let Some(endpoint) = &self.webdriver {
            config.webdriver.endpoint = endpoint.clone();
        }
        if self.headless {
            config.webdriver.headless = true;
        }
        if self.no_heroes {
            config.enrich_heroes = false;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
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

    let config = args.load_config()?;
    debug!("config: {config:?}");
    let tables = match &args.heroes {
        Some(path) => HeroTables::read_json_file(path)?,
        None => HeroTables::default(),
    };
    info!("{} heroes known", tables.len());
    let extractor = RowExtractor::new(&config, &tables)?;

    let page = WebDriverPage::connect(&config.webdriver).await?;
    let report = run(page, &config, extractor, &args.player, &args.output).await;
    if let Some(err) = report.abort {
        return Err(err.into());
    }
    report.saved?;
    Ok(())
}
