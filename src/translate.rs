//! Cross-language article titles from Wikidata sitelinks

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::cache;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::Fetch;

/// Sitelink keys ending in `wiki` that are not language editions
const NON_LANGUAGE_SITES: &[&str] = &[
    "commonswiki", "specieswiki", "metawiki", "mediawikiwiki", "wikidatawiki",
    "sourceswiki", "incubatorwiki", "outreachwiki", "wikimaniawiki", "wikifunctionswiki",
];

#[derive(Debug, Deserialize)]
struct EntitiesResponse {
    #[serde(default)]
    entities: BTreeMap<String, Entity>,
}

#[derive(Debug, Deserialize)]
struct Entity {
    #[serde(default)]
    missing: Option<serde_json::Value>,
    #[serde(default)]
    sitelinks: BTreeMap<String, Sitelink>,
}

#[derive(Debug, Deserialize)]
struct Sitelink {
    title: String,
}

/// Cached access to translations of English article titles
pub struct TranslationFetcher<'a> {
    config: &'a Config,
    fetcher: &'a dyn Fetch,
}

impl<'a> TranslationFetcher<'a> {
    pub fn new(config: &'a Config, fetcher: &'a dyn Fetch) -> Self {
        Self { config, fetcher }
    }

    pub fn api_url(&self, title: &str) -> String {
        format!(
            "{}?action=wbgetentities&sites=enwiki&titles={}&props=sitelinks&format=json",
            self.config.translation_api_url,
            urlencoding::encode(title)
        )
    }

    /// Raw JSON response for a title, from the cache when present
    pub fn raw(&self, title: &str, refresh: bool) -> Result<String> {
        let path = self.config.translation_path(title);
        cache::load_or_fetch(&path, refresh, || self.fetcher.get(&self.api_url(title)))
    }

    /// Language code to article title, English included
    pub fn translations(&self, title: &str, refresh: bool) -> Result<BTreeMap<String, String>> {
        let raw = self.raw(title, refresh)?;
        decode(&raw, title)
    }
}

/// Extract language editions from a `wbgetentities` response
pub fn decode(raw: &str, title: &str) -> Result<BTreeMap<String, String>> {
    let response: EntitiesResponse = serde_json::from_str(raw)?;
    let entity = response
        .entities
        .into_values()
        .find(|e| e.missing.is_none())
        .ok_or_else(|| Error::MissingPage(title.to_string()))?;

    Ok(entity
        .sitelinks
        .into_iter()
        .filter_map(|(site, link)| language_code(&site).map(|code| (code, link.title)))
        .collect())
}

/// `dewiki` → `de`, `zh_yuewiki` → `zh-yue`
fn language_code(site: &str) -> Option<String> {
    if NON_LANGUAGE_SITES.contains(&site) {
        return None;
    }
    let code = site.strip_suffix("wiki")?;
    if code.is_empty() {
        return None;
    }
    Some(code.replace('_', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StubFetcher;

    const PETRA: &str = r#"{"entities":{"Q5788":{"type":"item","id":"Q5788","sitelinks":{
        "enwiki":{"site":"enwiki","title":"Petra","badges":[]},
        "dewiki":{"site":"dewiki","title":"Petra (Jordanien)","badges":[]},
        "zh_yuewiki":{"site":"zh_yuewiki","title":"佩特拉","badges":[]},
        "commonswiki":{"site":"commonswiki","title":"Category:Petra","badges":[]},
        "enwikivoyage":{"site":"enwikivoyage","title":"Petra","badges":[]}
    }}},"success":1}"#;

    #[test]
    fn test_decode_sitelinks() {
        let translations = decode(PETRA, "Petra").unwrap();
        assert_eq!(translations.len(), 3);
        assert_eq!(translations["en"], "Petra");
        assert_eq!(translations["de"], "Petra (Jordanien)");
        assert_eq!(translations["zh-yue"], "佩特拉");
    }

    #[test]
    fn test_decode_missing() {
        let raw = r#"{"entities":{"-1":{"site":"enwiki","title":"Nowhere","missing":""}},"success":1}"#;
        assert!(matches!(decode(raw, "Nowhere"), Err(Error::MissingPage(_))));
    }

    #[test]
    fn test_language_code() {
        assert_eq!(language_code("frwiki").as_deref(), Some("fr"));
        assert_eq!(language_code("specieswiki"), None);
        assert_eq!(language_code("wiki"), None);
        assert_eq!(language_code("frwiktionary"), None);
    }

    #[test]
    fn test_translations_cached() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new().with_data_dir(dir.path());
        let fetcher = StubFetcher::new().route("wbgetentities", PETRA);
        let translate = TranslationFetcher::new(&config, &fetcher);

        assert_eq!(translate.translations("Petra", false).unwrap().len(), 3);
        assert_eq!(translate.translations("Petra", false).unwrap().len(), 3);
        assert_eq!(fetcher.calls(), 1);
        assert!(fetcher.urls()[0].starts_with("https://www.wikidata.org/w/api.php?action=wbgetentities"));
        assert!(config.translation_path("Petra").exists());
    }
}
