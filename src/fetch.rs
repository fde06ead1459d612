//! HTTP access

use crate::config::Config;
use crate::error::{Error, Result};

/// Something that can turn a URL into a response body.
///
/// Every network request of the crate goes through this trait so the
/// cache layer can be exercised without a network.
pub trait Fetch {
    fn get(&self, url: &str) -> Result<String>;
}

/// Blocking reqwest-backed fetcher
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|source| Error::Http {
                url: String::new(),
                source,
            })?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<String> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().map_err(|source| Error::Http {
            url: url.to_string(),
            source,
        })?;

        if !response.status().is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().map_err(|source| Error::Http {
            url: url.to_string(),
            source,
        })
    }
}
