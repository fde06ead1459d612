//! Article wikitext from the MediaWiki action API

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::cache;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::Fetch;
use crate::parser::WikiParser;

/// Redirect hops followed before giving up
pub const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<Query>,
}

#[derive(Debug, Deserialize)]
struct Query {
    #[serde(default)]
    pages: Pages,
}

/// `formatversion=1` keys pages by id, `formatversion=2` lists them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Pages {
    ById(BTreeMap<String, Page>),
    List(Vec<Page>),
}

impl Default for Pages {
    fn default() -> Self {
        Pages::List(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    missing: Option<serde_json::Value>,
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
struct Revision {
    #[serde(rename = "*", alias = "content")]
    content: Option<String>,
    slots: Option<BTreeMap<String, Slot>>,
}

#[derive(Debug, Deserialize)]
struct Slot {
    #[serde(rename = "*", alias = "content")]
    content: Option<String>,
}

impl Revision {
    fn into_content(self) -> Option<String> {
        self.content.or_else(|| {
            self.slots
                .and_then(|mut slots| slots.remove("main"))
                .and_then(|slot| slot.content)
        })
    }
}

/// Cached access to article markup
pub struct MarkupFetcher<'a> {
    config: &'a Config,
    fetcher: &'a dyn Fetch,
}

impl<'a> MarkupFetcher<'a> {
    pub fn new(config: &'a Config, fetcher: &'a dyn Fetch) -> Self {
        Self { config, fetcher }
    }

    /// Revision-content query URL for a title
    pub fn api_url(&self, title: &str) -> String {
        format!(
            "{}?action=query&prop=revisions&rvprop=content&format=json&titles={}",
            self.config.wiki_api_url,
            urlencoding::encode(title)
        )
    }

    /// Raw JSON response for a title, from the cache when present
    pub fn raw(&self, title: &str, refresh: bool) -> Result<String> {
        let path = self.config.markup_path(title);
        cache::load_or_fetch(&path, refresh, || self.fetcher.get(&self.api_url(title)))
    }

    /// Wikitext of the latest revision of a title
    pub fn markup(&self, title: &str, refresh: bool) -> Result<String> {
        let raw = self.raw(title, refresh)?;
        decode(&raw, title)
    }

    /// Follow redirects from `title`, returning the final title and its markup
    pub fn resolve(&self, title: &str, refresh: bool) -> Result<(String, String)> {
        let mut current = title.to_string();
        for _ in 0..=MAX_REDIRECTS {
            let text = self.markup(&current, refresh)?;
            match WikiParser::redirect_target(&text) {
                Some(target) => {
                    tracing::debug!("{:?} redirects to {:?}", current, target);
                    current = target;
                }
                None => return Ok((current, text)),
            }
        }
        Err(Error::RedirectLoop(title.to_string(), MAX_REDIRECTS))
    }

    /// UNESCO id of the article at `title`, following redirects first
    pub fn id_number(&self, title: &str, refresh: bool) -> Result<Option<u32>> {
        let (_, text) = self.resolve(title, refresh)?;
        WikiParser::extract_id_number(&text)
    }
}

/// Pull the revision content out of an API response
pub fn decode(raw: &str, title: &str) -> Result<String> {
    let response: QueryResponse = serde_json::from_str(raw)?;
    let pages = match response.query.map(|q| q.pages) {
        Some(Pages::ById(map)) => map.into_values().collect(),
        Some(Pages::List(list)) => list,
        None => Vec::new(),
    };

    pages
        .into_iter()
        .find(|page| page.missing.is_none())
        .and_then(|page| page.revisions.into_iter().next())
        .and_then(Revision::into_content)
        .ok_or_else(|| Error::MissingPage(title.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StubFetcher;

    fn response(title: &str, text: &str) -> String {
        serde_json::json!({
            "batchcomplete": "",
            "query": {
                "pages": {
                    "4242": {
                        "pageid": 4242,
                        "ns": 0,
                        "title": title,
                        "revisions": [{"contentformat": "text/x-wiki", "*": text}]
                    }
                }
            }
        })
        .to_string()
    }

    #[test]
    fn test_decode_legacy_format() {
        let raw = response("Petra", "'''Petra''' is a city");
        assert_eq!(decode(&raw, "Petra").unwrap(), "'''Petra''' is a city");
    }

    #[test]
    fn test_decode_formatversion_2() {
        let raw = r#"{"query":{"pages":[{"pageid":1,"title":"Petra","revisions":[{"slots":{"main":{"content":"text"}}}]}]}}"#;
        assert_eq!(decode(raw, "Petra").unwrap(), "text");
    }

    #[test]
    fn test_decode_missing_page() {
        let raw = r#"{"query":{"pages":{"-1":{"ns":0,"title":"Nowhere","missing":""}}}}"#;
        assert!(matches!(decode(raw, "Nowhere"), Err(Error::MissingPage(_))));
        assert!(decode("{}", "Nowhere").is_err());
        assert!(decode("not json", "Nowhere").is_err());
    }

    #[test]
    fn test_api_url_encodes_title() {
        let config = Config::new();
        let fetcher = StubFetcher::new();
        let markup = MarkupFetcher::new(&config, &fetcher);
        assert_eq!(
            markup.api_url("Tower of London"),
            "https://en.wikipedia.org/w/api.php?action=query&prop=revisions&rvprop=content&format=json&titles=Tower%20of%20London"
        );
    }

    #[test]
    fn test_markup_is_cached_per_title() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new().with_data_dir(dir.path());
        let fetcher = StubFetcher::new().route("titles=Abu%20Mena", &response("Abu Mena", "ruins"));
        let markup = MarkupFetcher::new(&config, &fetcher);

        assert_eq!(markup.markup("Abu Mena", false).unwrap(), "ruins");
        assert!(dir.path().join("wiki/Abu_Mena.json").exists());
        assert_eq!(markup.markup("Abu Mena", false).unwrap(), "ruins");
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn test_resolve_follows_redirects() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new().with_data_dir(dir.path());
        let fetcher = StubFetcher::new()
            .route("titles=Thebes", &response("Thebes", "#REDIRECT [[Luxor#Ancient Thebes]]"))
            .route(
                "titles=Luxor",
                &response("Luxor", "{{Infobox World Heritage Site\n| ID = 87bis\n}}"),
            );
        let markup = MarkupFetcher::new(&config, &fetcher);

        let (title, text) = markup.resolve("Thebes", false).unwrap();
        assert_eq!(title, "Luxor");
        assert!(text.contains("ID = 87"));
        assert_eq!(markup.id_number("Thebes", false).unwrap(), Some(87));
    }

    #[test]
    fn test_resolve_refresh_downloads_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new().with_data_dir(dir.path());
        let fetcher = StubFetcher::new().route("titles=Petra", &response("Petra", "rock-cut city"));
        let markup = MarkupFetcher::new(&config, &fetcher);

        let (title, text) = markup.resolve("Petra", true).unwrap();
        assert_eq!(title, "Petra");
        assert_eq!(text, "rock-cut city");
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn test_resolve_detects_loops() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new().with_data_dir(dir.path());
        let fetcher = StubFetcher::new()
            .route("titles=A", &response("A", "#REDIRECT [[B]]"))
            .route("titles=B", &response("B", "#REDIRECT [[A]]"));
        let markup = MarkupFetcher::new(&config, &fetcher);

        assert!(matches!(markup.resolve("A", false), Err(Error::RedirectLoop(_, _))));
    }
}
