//! Site name to article title mapping, scraped from the regional list articles

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache;
use crate::config::Config;
use crate::error::Result;
use crate::fetch::Fetch;
use crate::markup::MarkupFetcher;
use crate::parser::WikiParser;
use crate::Region;

/// Site name to one or more article titles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleTitles {
    pub titles: BTreeMap<String, Vec<String>>,
}

impl ArticleTitles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add titles under a name, skipping ones already recorded
    pub fn insert(&mut self, name: &str, titles: impl IntoIterator<Item = String>) {
        let entry = self.titles.entry(name.to_string()).or_default();
        for title in titles {
            if !entry.contains(&title) {
                entry.push(title);
            }
        }
    }

    pub fn merge(&mut self, other: ArticleTitles) {
        for (name, titles) in other.titles {
            self.insert(&name, titles);
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.titles.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.titles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Build the mapping from the markup of one list article
    pub fn from_markup(text: &str) -> Self {
        let mut titles = Self::new();
        for row in WikiParser::parse_table(text) {
            titles.insert(&row.name, row.titles);
        }
        titles
    }
}

/// The persisted merge of every region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleIndex {
    pub built_at: DateTime<Utc>,
    pub regions: Vec<String>,
    pub titles: ArticleTitles,
}

/// Mapping for one region, scraped from its (cached) list article
pub fn region_titles(config: &Config, fetcher: &dyn Fetch, region: Region, refresh: bool) -> Result<ArticleTitles> {
    let markup = MarkupFetcher::new(config, fetcher);
    let (_, text) = markup.resolve(&region.list_article(), refresh)?;
    let titles = ArticleTitles::from_markup(&text);
    tracing::info!("{}: {} sites", region, titles.len());
    if titles.is_empty() {
        tracing::warn!("No site rows found in {:?}", region.list_article());
    }
    Ok(titles)
}

/// Mapping for all twelve regions, persisted to `article_titles.json`.
///
/// With the index already on disk and no refresh, nothing is downloaded.
pub fn all_titles<P>(config: &Config, fetcher: &dyn Fetch, refresh: bool, mut progress: P) -> Result<TitleIndex>
where
    P: FnMut(Region),
{
    let path = config.titles_path();
    let json = cache::load_or_fetch(&path, refresh, || {
        let mut titles = ArticleTitles::new();
        for &region in Region::all() {
            progress(region);
            titles.merge(region_titles(config, fetcher, region, refresh)?);
        }
        let index = TitleIndex {
            built_at: Utc::now(),
            regions: Region::all().iter().map(|r| r.to_string()).collect(),
            titles,
        };
        Ok(serde_json::to_string_pretty(&index)?)
    })?;
    Ok(serde_json::from_str(&json)?)
}
