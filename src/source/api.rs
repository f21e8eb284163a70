use std::env;
use std::fs;

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;
use tracing::info;

use super::API_KEYS;
use super::RANKING_GROUP;
use super::RankingSource;
use super::json_references;
use super::user_from_state;
use crate::config::Config;
use crate::error::Error;
use crate::error::Result;
use crate::model::User;

/// Ranking source backed by the public profile API instead of the render
/// gateway. Listing pages come straight off the JSON rankings endpoint.
pub struct ApiSource {
    client: reqwest::Client,
    config: Config,
    credentials: Credentials,
}

#[derive(Clone, Deserialize)]
struct Credentials {
    username: String,
    key: String,
}

impl Credentials {
    /// Environment variables win; `~/.kaggle/kaggle.json` is the fallback.
    /// Missing credentials abort the run before any fetching starts.
    fn resolve() -> Result<Self> {
        if let (Ok(username), Ok(key)) = (env::var("KAGGLE_USERNAME"), env::var("KAGGLE_KEY")) {
            if !username.is_empty() && !key.is_empty() {
                info!("using Kaggle credentials from environment");
                return Ok(Self { username, key });
            }
        }

        let path = dirs::home_dir()
            .ok_or_else(|| Error::Credentials("cannot locate home directory".to_string()))?
            .join(".kaggle")
            .join("kaggle.json");
        let data = fs::read_to_string(&path).map_err(|_| {
            Error::Credentials(
                "credentials not found; set KAGGLE_USERNAME and KAGGLE_KEY or create ~/.kaggle/kaggle.json"
                    .to_string(),
            )
        })?;
        info!("using Kaggle credentials from {}", path.display());
        Ok(serde_json::from_str(&data)?)
    }
}

impl ApiSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            config: config.clone(),
            credentials: Credentials::resolve()?,
        })
    }

    async fn get(&self, url: &str) -> Result<String> {
        let body = self
            .client
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.key))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

impl RankingSource for ApiSource {
    async fn fetch_listing(&self, page: u32) -> Result<String> {
        let url = format!(
            "{}/rankings.json?group={}&page={}&pageSize={}",
            self.config.kaggle_base_url, RANKING_GROUP, page, self.config.page_size
        );
        self.get(&url).await
    }

    fn extract_references(&self, content: &str) -> Result<Vec<String>> {
        json_references(content, &self.config.kaggle_base_url)
    }

    async fn fetch_detail(&self, profile_url: &str) -> Result<Option<User>> {
        let username = username_from_url(profile_url);
        let url = format!(
            "{}/api/v1/users/profile/{}",
            self.config.kaggle_base_url, username
        );
        let state: Map<String, Value> = serde_json::from_str(&self.get(&url).await?)?;
        let kaggle_url = format!("{}/{}", self.config.kaggle_base_url, username);
        Ok(user_from_state(&state, &kaggle_url, &API_KEYS, &self.config))
    }
}

fn username_from_url(profile_url: &str) -> &str {
    profile_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(profile_url)
}
