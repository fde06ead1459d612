//! # Heritage Wiki
//!
//! Fetch the UNESCO World Heritage list and the Wikipedia articles about
//! each site.
//!
//! This crate provides tools to:
//! - Download the UNESCO site list XML and parse it into records
//! - Scrape the regional "List of World Heritage Sites" articles for the
//!   article titles of every site
//! - Download and cache article wikitext through the MediaWiki API
//! - Follow redirects, look up translations and extract the UNESCO id
//!   number from an article's infobox
//! - Match names approximately by edit distance
//!
//! Every download is cached under the data directory and reused until a
//! refresh is requested.
//!
//! ## Quick Start
//!
//! ```bash
//! # Download the site list and every regional title list
//! heritage-wiki all
//!
//! # UNESCO id of an article
//! heritage-wiki id "Tower of London"
//! ```

pub mod cache;
pub mod config;
pub mod downloader;
pub mod error;
pub mod fetch;
pub mod fuzzy;
pub mod logging;
pub mod markup;
pub mod parser;
pub mod sites;
pub mod titles;
pub mod translate;

pub use config::Config;
pub use downloader::HeritageDownloader;
pub use error::{Error, Result};
pub use fetch::{Fetch, HttpFetcher};
pub use markup::MarkupFetcher;
pub use parser::WikiParser;
pub use sites::{SiteList, SiteRecord};
pub use titles::{ArticleTitles, TitleIndex};

/// Regions covered by a "List of World Heritage Sites in ..." article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    NorthernAfrica,
    WesternAfrica,
    CentralAfrica,
    EasternAfrica,
    SouthernAfrica,
    WesternAsia,
    SouthernAsia,
    EasternAsia,
    SoutheastAsia,
    Oceania,
    Americas,
    Europe,
}

impl Region {
    /// Short code used on the command line
    pub fn code(&self) -> &'static str {
        match self {
            Region::NorthernAfrica => "northern-africa",
            Region::WesternAfrica => "western-africa",
            Region::CentralAfrica => "central-africa",
            Region::EasternAfrica => "eastern-africa",
            Region::SouthernAfrica => "southern-africa",
            Region::WesternAsia => "western-asia",
            Region::SouthernAsia => "southern-asia",
            Region::EasternAsia => "eastern-asia",
            Region::SoutheastAsia => "southeast-asia",
            Region::Oceania => "oceania",
            Region::Americas => "americas",
            Region::Europe => "europe",
        }
    }

    /// Name as it appears in the list article title
    pub fn display_name(&self) -> &'static str {
        match self {
            Region::NorthernAfrica => "Northern Africa",
            Region::WesternAfrica => "Western Africa",
            Region::CentralAfrica => "Central Africa",
            Region::EasternAfrica => "Eastern Africa",
            Region::SouthernAfrica => "Southern Africa",
            Region::WesternAsia => "Western Asia",
            Region::SouthernAsia => "Southern Asia",
            Region::EasternAsia => "Eastern Asia",
            Region::SoutheastAsia => "Southeast Asia",
            Region::Oceania => "Oceania",
            Region::Americas => "the Americas",
            Region::Europe => "Europe",
        }
    }

    /// Title of the Wikipedia list article
    pub fn list_article(&self) -> String {
        format!("List of World Heritage Sites in {}", self.display_name())
    }

    /// Parse from string
    pub fn from_code(code: &str) -> Option<Region> {
        let normalized = code.trim().to_lowercase().replace([' ', '_'], "-");
        let normalized = normalized.strip_prefix("the-").unwrap_or(&normalized);
        Region::all().iter().copied().find(|r| r.code() == normalized)
    }

    /// Get all regions
    pub fn all() -> &'static [Region] {
        &[
            Region::NorthernAfrica,
            Region::WesternAfrica,
            Region::CentralAfrica,
            Region::EasternAfrica,
            Region::SouthernAfrica,
            Region::WesternAsia,
            Region::SouthernAsia,
            Region::EasternAsia,
            Region::SoutheastAsia,
            Region::Oceania,
            Region::Americas,
            Region::Europe,
        ]
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Region::from_code(s).ok_or_else(|| {
            let codes: Vec<&str> = Region::all().iter().map(Region::code).collect();
            format!("Unknown region: {}. Use one of: {}", s, codes.join(", "))
        })
    }
}
