//! Download pipeline tying the site list to the Wikipedia articles

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::fetch::{Fetch, HttpFetcher};
use crate::fuzzy;
use crate::markup::MarkupFetcher;
use crate::parser::WikiParser;
use crate::sites::SiteList;
use crate::titles::{self, ArticleTitles, TitleIndex};
use crate::translate::TranslationFetcher;
use crate::Region;

/// How a scraped site was tied to a UNESCO record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Id number read from the article infobox
    Infobox,
    /// Closest UNESCO site name by edit distance
    Name,
}

/// A scraped site name with its article and UNESCO id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteLink {
    pub name: String,
    pub title: String,
    pub id_number: Option<u32>,
    pub source: MatchSource,
}

/// Summary of a full run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarvestStats {
    pub sites: usize,
    pub regions: usize,
    pub titled_sites: usize,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl HarvestStats {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            ..Default::default()
        }
    }

    fn finish(&mut self) {
        let now = Utc::now();
        self.duration_secs = Some((now - self.started_at).num_milliseconds() as f64 / 1000.0);
    }
}

/// Cached downloader for every data source
pub struct HeritageDownloader {
    config: Config,
    fetcher: Box<dyn Fetch>,
}

impl HeritageDownloader {
    /// Create a downloader talking to the network
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, Box::new(fetcher)))
    }

    pub fn with_fetcher(config: Config, fetcher: Box<dyn Fetch>) -> Self {
        Self { config, fetcher }
    }

    /// Get the config
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn markup_fetcher(&self) -> MarkupFetcher<'_> {
        MarkupFetcher::new(&self.config, self.fetcher.as_ref())
    }

    pub fn translation_fetcher(&self) -> TranslationFetcher<'_> {
        TranslationFetcher::new(&self.config, self.fetcher.as_ref())
    }

    pub fn sites(&self, refresh: bool) -> Result<SiteList> {
        SiteList::load(&self.config, self.fetcher.as_ref(), refresh)
    }

    pub fn region_titles(&self, region: Region, refresh: bool) -> Result<ArticleTitles> {
        titles::region_titles(&self.config, self.fetcher.as_ref(), region, refresh)
    }

    /// Titles of all regions, with a progress bar
    pub fn all_titles(&self, refresh: bool) -> Result<TitleIndex> {
        let pb = ProgressBar::new(Region::all().len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );

        let index = titles::all_titles(&self.config, self.fetcher.as_ref(), refresh, |region| {
            pb.set_message(region.to_string());
            pb.inc(1);
        })?;
        pb.finish_and_clear();
        Ok(index)
    }

    pub fn markup(&self, title: &str, refresh: bool) -> Result<String> {
        self.markup_fetcher().markup(title, refresh)
    }

    pub fn resolve(&self, title: &str, refresh: bool) -> Result<(String, String)> {
        self.markup_fetcher().resolve(title, refresh)
    }

    pub fn id_number(&self, title: &str, refresh: bool) -> Result<Option<u32>> {
        self.markup_fetcher().id_number(title, refresh)
    }

    pub fn translations(&self, title: &str, refresh: bool) -> Result<BTreeMap<String, String>> {
        self.translation_fetcher().translations(title, refresh)
    }

    /// Tie every scraped site to a UNESCO id.
    ///
    /// The infobox of the first linked article is tried first; when it has no
    /// id the scraped name is matched against the UNESCO names.
    pub fn link(&self, sites: &SiteList, titles: &ArticleTitles, refresh: bool) -> Result<Vec<SiteLink>> {
        let markup = self.markup_fetcher();
        let pb = ProgressBar::new(titles.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut links = Vec::with_capacity(titles.len());
        for (name, article_titles) in &titles.titles {
            pb.inc(1);
            let Some(first) = article_titles.first() else {
                continue;
            };

            let (title, text) = markup.resolve(first, refresh)?;
            let link = match WikiParser::extract_id_number(&text)? {
                Some(id) => SiteLink {
                    name: name.clone(),
                    title,
                    id_number: Some(id),
                    source: MatchSource::Infobox,
                },
                None => {
                    let id_number = fuzzy::closest_site(name, sites).and_then(|s| s.id_number());
                    tracing::debug!("{:?}: no infobox id, matched by name to {:?}", name, id_number);
                    SiteLink {
                        name: name.clone(),
                        title,
                        id_number,
                        source: MatchSource::Name,
                    }
                }
            };
            links.push(link);
        }
        pb.finish_and_clear();

        let by_infobox = links.iter().filter(|l| l.source == MatchSource::Infobox).count();
        tracing::info!("Linked {} sites ({} by infobox id)", links.len(), by_infobox);
        Ok(links)
    }

    /// Site list plus every regional title list
    pub fn run(&self, refresh: bool) -> Result<HarvestStats> {
        let mut stats = HarvestStats::new();

        let sites = self.sites(refresh)?;
        stats.sites = sites.len();

        let index = self.all_titles(refresh)?;
        stats.regions = index.regions.len();
        stats.titled_sites = index.titles.len();

        stats.finish();
        tracing::info!("Run complete!");
        tracing::info!("  UNESCO sites: {}", stats.sites);
        tracing::info!("  Sites with articles: {}", stats.titled_sites);
        tracing::info!("  Output: {:?}", self.config.data_dir);
        Ok(stats)
    }
}
