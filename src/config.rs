use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Result;

/// Which representation the ranking listing pages arrive in.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListFormat {
    #[default]
    Html,
    Json,
}

/// Which backend produces listing pages and profile details.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    #[default]
    Scrape,
    Api,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub splash_url: String,
    pub kaggle_base_url: String,
    pub output_file: String,
    pub page_size: u32,
    pub max_pages: u32,
    pub target_country: String,
    /// Alternate spellings the upstream reports for the target country.
    pub country_aliases: Vec<String>,
    /// Seconds, forwarded to the render gateway.
    pub request_timeout: u64,
    /// Seconds the render gateway lets page scripts settle.
    pub wait_time: u64,
    /// Inter-request delay bounds, whole seconds.
    pub min_delay: u64,
    pub max_delay: u64,
    pub list_format: ListFormat,
    pub mode: SourceMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            splash_url: "http://localhost:8050".to_string(),
            kaggle_base_url: "https://www.kaggle.com".to_string(),
            output_file: "output.csv".to_string(),
            page_size: 20,
            max_pages: 250,
            target_country: "Japan".to_string(),
            country_aliases: vec!["JP".to_string(), "日本".to_string()],
            request_timeout: 10,
            wait_time: 5,
            min_delay: 1,
            max_delay: 5,
            list_format: ListFormat::default(),
            mode: SourceMode::default(),
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file. A missing file is not an
    /// error; defaults apply.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn country_matches(&self, country: &str) -> bool {
        country == self.target_country || self.country_aliases.iter().any(|alias| alias == country)
    }
}
