//! Heritage Wiki CLI
//!
//! Download the UNESCO World Heritage list and scrape Wikipedia for it.
//!
//! # Examples
//!
//! Fetch the site list and all regional title lists:
//! ```bash
//! heritage-wiki all
//! ```
//!
//! Extract the UNESCO id of one article, re-downloading it:
//! ```bash
//! heritage-wiki --refresh id "Tower of London"
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use heritage_wiki::{fuzzy, logging, Config, HeritageDownloader, Region};

#[derive(Parser)]
#[command(name = "heritage-wiki")]
#[command(author, version, about = "Fetch UNESCO World Heritage Sites and their Wikipedia articles")]
#[command(long_about = r#"
Download the UNESCO World Heritage list and the Wikipedia articles about
each site. Every download is cached under the data directory; pass
--refresh to download again.

EXAMPLES:
  Fetch the site list and every regional title list:
    heritage-wiki all

  Scrape one region:
    heritage-wiki titles oceania

  UNESCO id of an article (redirects are followed):
    heritage-wiki id "Tower of London"

  Closest UNESCO site name:
    heritage-wiki match "Galapagos"
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory for cached downloads and the log file [default: data]
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Config file (defaults to <data>/config.json when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Download again even if cached
    #[arg(short, long)]
    refresh: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// UNESCO site list URL
    #[arg(long, global = true)]
    sites_url: Option<String>,

    /// MediaWiki API endpoint
    #[arg(long, global = true)]
    wiki_api: Option<String>,

    /// Wikidata API endpoint used for translations
    #[arg(long, global = true)]
    translation_api: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the UNESCO site list
    Sites,

    /// List the regions with a list article
    Regions,

    /// Scrape site names and article titles from the list articles
    Titles {
        /// Region code (all regions when omitted)
        region: Option<Region>,
    },

    /// Print the wikitext of an article
    Markup { title: String },

    /// Follow redirects to the canonical article title
    Resolve { title: String },

    /// Extract the UNESCO id number from an article's infobox
    Id { title: String },

    /// Titles of an article in other languages
    Translate { title: String },

    /// Closest UNESCO site name to a query
    Match { query: String },

    /// Tie every scraped site to a UNESCO id
    Link,

    /// Download the site list and all title lists
    All,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let _guard = logging::init(&config.log_path(), cli.verbose)
        .context("Failed to initialise logging")?;

    let downloader = HeritageDownloader::new(config).context("Failed to create HTTP client")?;
    let refresh = cli.refresh;

    match cli.command {
        Commands::Sites => {
            let sites = downloader.sites(refresh)?;
            for site in sites.iter() {
                println!(
                    "{:>6}  {}  ({})",
                    site.id_number().map(|id| id.to_string()).unwrap_or_default(),
                    site.name().unwrap_or("?"),
                    site.states().unwrap_or("?")
                );
            }
            println!("\n{} sites", sites.len());
        }

        Commands::Regions => {
            for region in Region::all() {
                println!("  {:<16} {}", region.code(), region.list_article());
            }
        }

        Commands::Titles { region: Some(region) } => {
            let titles = downloader.region_titles(region, refresh)?;
            println!("{}", serde_json::to_string_pretty(&titles)?);
        }

        Commands::Titles { region: None } => {
            let index = downloader.all_titles(refresh)?;
            println!("{}", serde_json::to_string_pretty(&index.titles)?);
        }

        Commands::Markup { title } => {
            println!("{}", downloader.markup(&title, refresh)?);
        }

        Commands::Resolve { title } => {
            let (canonical, _) = downloader.resolve(&title, refresh)?;
            if canonical == title {
                println!("{} is not a redirect", title);
            } else {
                println!("{} -> {}", title, canonical);
            }
        }

        Commands::Id { title } => {
            match downloader.id_number(&title, refresh)? {
                Some(id) => println!("{}", id),
                None => anyhow::bail!("No UNESCO id found in {:?}", title),
            }
        }

        Commands::Translate { title } => {
            let translations = downloader.translations(&title, refresh)?;
            for (lang, translated) in &translations {
                println!("  {:<8} {}", lang, translated);
            }
        }

        Commands::Match { query } => {
            let sites = downloader.sites(refresh)?;
            let site = fuzzy::closest_site(&query, &sites)
                .ok_or_else(|| anyhow::anyhow!("Site list is empty"))?;
            println!(
                "{} ({})",
                site.name().unwrap_or("?"),
                site.id_number().map(|id| id.to_string()).unwrap_or_default()
            );
        }

        Commands::Link => {
            let sites = downloader.sites(refresh)?;
            let index = downloader.all_titles(refresh)?;
            let links = downloader.link(&sites, &index.titles, refresh)?;

            let path = downloader.config().links_path();
            std::fs::write(&path, serde_json::to_string_pretty(&links)?)
                .with_context(|| format!("Failed to write {:?}", path))?;
            println!("✅ Linked {} sites, saved to {:?}", links.len(), path);
        }

        Commands::All => {
            let stats = downloader.run(refresh)?;
            downloader.config().save()?;

            println!("\n✅ Download complete!");
            println!("  UNESCO sites:        {:>6}", stats.sites);
            println!("  Regions scraped:     {:>6}", stats.regions);
            println!("  Sites with articles: {:>6}", stats.titled_sites);
            if let Some(duration) = stats.duration_secs {
                println!("  Duration:            {:>6.1}s", duration);
            }
            println!("\n📂 Data saved to: {:?}", downloader.config().data_dir);
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::locate(cli.config.as_deref(), cli.data.as_deref())
        .context("Failed to read config")?;

    if let Some(url) = &cli.sites_url {
        config = config.with_sites_url(url);
    }
    if let Some(url) = &cli.wiki_api {
        config = config.with_wiki_api_url(url);
    }
    if let Some(url) = &cli.translation_api {
        config = config.with_translation_api_url(url);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout_secs(secs);
    }
    Ok(config)
}
