use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing::warn;

use kaggle_spider_rs::config::Config;
use kaggle_spider_rs::config::SourceMode;
use kaggle_spider_rs::export;
use kaggle_spider_rs::source::ApiSource;
use kaggle_spider_rs::source::SplashSource;
use kaggle_spider_rs::spider;

#[derive(Parser, Debug)]
#[clap(about, version, author)]
struct Args {
    /// Path to the configuration file
    #[clap(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Path to the output file (overrides config)
    #[clap(short, long)]
    output: Option<String>,

    /// Write the default configuration file and exit
    #[clap(long)]
    generate_config: bool,

    /// Maximum number of ranking pages to walk (overrides config)
    #[clap(long)]
    max_pages: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    if args.generate_config {
        Config::default().save(&args.config)?;
        info!("generated default configuration at {}", args.config.display());
        return Ok(());
    }

    let mut config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            warn!("failed to load configuration: {e}, using defaults");
            Config::default()
        }
    };
    if let Some(output) = args.output {
        config.output_file = output;
    }
    if let Some(max_pages) = args.max_pages {
        config.max_pages = max_pages;
    }

    if let Some(dir) = Path::new(&config.output_file).parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    info!(
        "scraping rankings for {} users, {} pages",
        config.target_country, config.max_pages
    );
    let mut rng = StdRng::from_os_rng();
    let users = match config.mode {
        SourceMode::Scrape => {
            let source = SplashSource::new(&config)?;
            spider::crawl(&source, &config, &mut rng).await
        }
        SourceMode::Api => {
            let source = ApiSource::new(&config)?;
            spider::crawl(&source, &config, &mut rng).await
        }
    };

    info!("found {} users from {}", users.len(), config.target_country);
    fs::write(&config.output_file, export::to_csv(&users)?)?;
    info!("wrote {} users to {}", users.len(), config.output_file);

    Ok(())
}
