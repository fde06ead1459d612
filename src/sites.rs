//! UNESCO World Heritage site list

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::cache;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::Fetch;

/// One `<row>` of the UNESCO XML, field name to text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteRecord {
    pub fields: BTreeMap<String, String>,
}

impl SiteRecord {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Official site name
    pub fn name(&self) -> Option<&str> {
        self.get("site")
    }

    pub fn id_number(&self) -> Option<u32> {
        self.get("id_number").and_then(|id| id.trim().parse().ok())
    }

    /// States parties, comma separated in the source
    pub fn states(&self) -> Option<&str> {
        self.get("states")
    }

    pub fn region(&self) -> Option<&str> {
        self.get("region")
    }

    /// Cultural, Natural or Mixed
    pub fn category(&self) -> Option<&str> {
        self.get("category")
    }
}

/// The full site table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteList {
    pub sites: Vec<SiteRecord>,
}

impl SiteList {
    /// Download the list, or read it from the cache
    pub fn load(config: &Config, fetcher: &dyn Fetch, refresh: bool) -> Result<Self> {
        let xml = cache::load_or_fetch(&config.sites_path(), refresh, || fetcher.get(&config.sites_url))?;
        let list = Self::parse(&xml)?;
        tracing::info!("Loaded {} sites", list.len());
        Ok(list)
    }

    /// Parse the UNESCO XML document
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut sites = Vec::new();
        let mut current: Option<SiteRecord> = None;
        let mut field: Option<String> = None;
        let mut value = String::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if name == "row" {
                        current = Some(SiteRecord::default());
                    } else if current.is_some() && field.is_none() {
                        field = Some(name);
                        value.clear();
                    }
                }
                Event::Empty(e) => {
                    if let Some(record) = current.as_mut() {
                        if field.is_none() {
                            let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                            record.fields.insert(name, String::new());
                        }
                    }
                }
                Event::Text(e) => {
                    if field.is_some() {
                        value.push_str(&e.unescape().unwrap_or_default());
                    }
                }
                Event::CData(e) => {
                    if field.is_some() {
                        value.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Event::End(e) => {
                    let name = e.name();
                    let name = name.as_ref();
                    if name == b"row" {
                        if let Some(record) = current.take() {
                            sites.push(record);
                        }
                        field = None;
                    } else if field.as_deref().map(str::as_bytes) == Some(name) {
                        if let (Some(record), Some(key)) = (current.as_mut(), field.take()) {
                            record.fields.insert(key, value.trim().to_string());
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if sites.is_empty() {
            return Err(Error::NoSites);
        }
        Ok(Self { sites })
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SiteRecord> {
        self.sites.iter()
    }

    pub fn find_by_id(&self, id: u32) -> Option<&SiteRecord> {
        self.sites.iter().find(|s| s.id_number() == Some(id))
    }

    /// All site names, in document order
    pub fn names(&self) -> Vec<&str> {
        self.sites.iter().filter_map(SiteRecord::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StubFetcher;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<query>
<row>
<category>Cultural</category>
<danger/>
<id_number>208</id_number>
<region>Asia and the Pacific</region>
<short_description>&lt;p&gt;The cultural landscape&lt;/p&gt;</short_description>
<site>Cultural Landscape and Archaeological Remains of the Bamiyan Valley</site>
<states>Afghanistan</states>
</row>
<row>
<category>Natural</category>
<id_number>147</id_number>
<site><![CDATA[Kakadu National Park]]></site>
<states>Australia</states>
</row>
</query>"#;

    #[test]
    fn test_parse_rows() {
        let list = SiteList::parse(SAMPLE).unwrap();
        assert_eq!(list.len(), 2);

        let bamiyan = &list.sites[0];
        assert_eq!(bamiyan.id_number(), Some(208));
        assert_eq!(bamiyan.states(), Some("Afghanistan"));
        assert_eq!(bamiyan.category(), Some("Cultural"));
        assert_eq!(bamiyan.region(), Some("Asia and the Pacific"));
        assert_eq!(bamiyan.get("danger"), Some(""));
        assert_eq!(bamiyan.get("short_description"), Some("<p>The cultural landscape</p>"));

        assert_eq!(list.sites[1].name(), Some("Kakadu National Park"));
    }

    #[test]
    fn test_find_by_id_and_names() {
        let list = SiteList::parse(SAMPLE).unwrap();
        assert_eq!(list.find_by_id(147).and_then(SiteRecord::name), Some("Kakadu National Park"));
        assert!(list.find_by_id(1).is_none());
        assert_eq!(list.names().len(), 2);
    }

    #[test]
    fn test_no_rows_is_an_error() {
        assert!(matches!(SiteList::parse("<query></query>"), Err(Error::NoSites)));
        assert!(SiteList::parse("").is_err());
    }

    #[test]
    fn test_load_uses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new().with_data_dir(dir.path());
        let fetcher = StubFetcher::new().route("whc.unesco.org", SAMPLE);

        let first = SiteList::load(&config, &fetcher, false).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(fetcher.calls(), 1);
        assert!(config.sites_path().exists());

        let second = SiteList::load(&config, &fetcher, false).unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(fetcher.calls(), 1);

        SiteList::load(&config, &fetcher, true).unwrap();
        assert_eq!(fetcher.calls(), 2);
    }
}
