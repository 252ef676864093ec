//! Sample mission catalogs hosted upstream.

use std::fmt;
use std::time::Duration;

use indexmap::IndexMap;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{HorizonError, Result};

/// Raw-content root of the sample datasets.
pub const SAMPLE_BASE_URL: &str =
    "https://raw.githubusercontent.com/qgacabrera-bit/OrbitalHorizon/refs/heads/main/assets";

/// A downloadable sample catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleDataset {
    Kepler,
    K2,
    Tess,
}

impl SampleDataset {
    pub const ALL: [SampleDataset; 3] = [SampleDataset::Kepler, SampleDataset::K2, SampleDataset::Tess];

    pub fn as_str(&self) -> &'static str {
        match self {
            SampleDataset::Kepler => "kepler",
            SampleDataset::K2 => "k2",
            SampleDataset::Tess => "tess",
        }
    }

    /// Look up a sample by its short name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    /// Upstream location of the catalog export.
    pub fn default_url(&self) -> String {
        let file = match self {
            SampleDataset::Kepler => "cumulative_2025.09.25_12.58.46.csv",
            SampleDataset::K2 => "k2pandc_2025.09.25_12.59.27.csv",
            SampleDataset::Tess => "TOI_2025.09.25_11.42.37.csv",
        };
        format!("{}/{}", SAMPLE_BASE_URL, file)
    }

    /// Name the download is saved under.
    pub fn file_name(&self) -> String {
        format!("{}_data.csv", self.as_str())
    }
}

impl fmt::Display for SampleDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Default URL per sample name.
pub fn default_urls() -> IndexMap<String, String> {
    SampleDataset::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), s.default_url()))
        .collect()
}

/// Downloads sample catalogs.
pub struct SampleFetcher {
    client: Client,
    urls: IndexMap<String, String>,
}

impl SampleFetcher {
    /// Fetcher over the upstream URLs.
    pub fn new() -> Result<Self> {
        Self::with_urls(default_urls())
    }

    /// Fetcher with overridden URLs; names without an entry use the default.
    pub fn with_urls(urls: IndexMap<String, String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| HorizonError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, urls })
    }

    /// URL a sample is fetched from.
    pub fn url(&self, sample: SampleDataset) -> String {
        self.urls
            .get(sample.as_str())
            .cloned()
            .unwrap_or_else(|| sample.default_url())
    }

    /// Fetch the raw CSV bytes of a sample.
    pub fn fetch(&self, sample: SampleDataset) -> Result<Vec<u8>> {
        let url = self.url(sample);
        info!(sample = %sample, %url, "fetching sample dataset");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| HorizonError::Download(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HorizonError::Download(format!("{} returned {}", url, status)));
        }

        let bytes = response
            .bytes()
            .map_err(|e| HorizonError::Download(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_files() {
        assert_eq!(SampleDataset::from_name("tess"), Some(SampleDataset::Tess));
        assert_eq!(SampleDataset::from_name("TESS"), None);
        assert_eq!(SampleDataset::from_name("hubble"), None);
        assert_eq!(SampleDataset::K2.file_name(), "k2_data.csv");
    }

    #[test]
    fn test_default_urls() {
        let urls = default_urls();
        assert_eq!(urls.len(), 3);
        assert!(urls["kepler"].ends_with("/assets/cumulative_2025.09.25_12.58.46.csv"));
        assert!(urls["tess"].starts_with(SAMPLE_BASE_URL));
    }

    #[test]
    fn test_url_override() {
        let mut urls = IndexMap::new();
        urls.insert("k2".to_string(), "http://localhost:9/k2.csv".to_string());
        let fetcher = SampleFetcher::with_urls(urls).unwrap();
        assert_eq!(fetcher.url(SampleDataset::K2), "http://localhost:9/k2.csv");
        assert_eq!(fetcher.url(SampleDataset::Kepler), SampleDataset::Kepler.default_url());
    }

    #[test]
    fn test_unreachable_host_is_download_error() {
        let mut urls = IndexMap::new();
        urls.insert("k2".to_string(), "http://127.0.0.1:9/k2.csv".to_string());
        let err = SampleFetcher::with_urls(urls)
            .unwrap()
            .fetch(SampleDataset::K2)
            .unwrap_err();
        assert!(matches!(err, HorizonError::Download(_)));
    }
}
