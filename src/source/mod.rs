pub mod api;
pub mod scrape;

use serde_json::Map;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::model::User;

pub use api::ApiSource;
pub use scrape::SplashSource;

const TWITTER_BASE: &str = "https://twitter.com/";
const GITHUB_BASE: &str = "https://github.com/";

pub(crate) const RANKING_GROUP: &str = "competitions";

/// A backend that enumerates ranking pages and resolves user references
/// into full records. The pagination loop in [`crate::spider`] is written
/// once against this contract.
#[allow(async_fn_in_trait)]
pub trait RankingSource {
    /// Fetches the raw content of one ranking page (1-based index).
    async fn fetch_listing(&self, page: u32) -> Result<String>;

    /// Extracts the ordered absolute profile URLs from a fetched ranking
    /// page.
    fn extract_references(&self, content: &str) -> Result<Vec<String>>;

    /// Fetches and parses one profile. `Ok(None)` means the user exists but
    /// is outside the target country; `Err` means the attempt failed and
    /// the caller should move on.
    async fn fetch_detail(&self, profile_url: &str) -> Result<Option<User>>;
}

/// Pulls the `list[].userUrl` references out of a JSON ranking page.
/// A missing or non-array `list` field marks an empty page, not an error.
pub(crate) fn json_references(content: &str, base_url: &str) -> Result<Vec<String>> {
    let page: Value = serde_json::from_str(content)?;
    let Some(list) = page.get("list").and_then(Value::as_array) else {
        debug!("ranking page carries no list field, treating as empty");
        return Ok(Vec::new());
    };
    Ok(list
        .iter()
        .filter_map(|entry| entry.get("userUrl").and_then(Value::as_str))
        .map(|path| format!("{base_url}{path}"))
        .collect())
}

/// JSON key names for the handful of fields the two backends spell
/// differently.
pub(crate) struct StateKeys {
    pub twitter: &'static str,
    pub github: &'static str,
    pub avatar: &'static str,
}

pub(crate) const SCRAPE_KEYS: StateKeys = StateKeys {
    twitter: "twitterUserName",
    github: "gitHubUserName",
    avatar: "userAvatarUrl",
};

pub(crate) const API_KEYS: StateKeys = StateKeys {
    twitter: "twitterName",
    github: "githubName",
    avatar: "avatarUrl",
};

/// Builds a [`User`] from a flat profile state map, or `None` when the
/// reported country is outside the configured target.
pub(crate) fn user_from_state(
    state: &Map<String, Value>,
    kaggle_url: &str,
    keys: &StateKeys,
    config: &Config,
) -> Option<User> {
    let country = text_field(state, "country");
    if !config.country_matches(&country) {
        debug!("skipping user from {country}, outside target country");
        return None;
    }

    Some(User {
        display_name: text_field(state, "displayName"),
        bio: text_field(state, "bio"),
        country,
        kaggle_url: kaggle_url.to_string(),
        twitter_url: social_url(TWITTER_BASE, &text_field(state, keys.twitter)),
        linked_in_url: text_field(state, "linkedInUrl"),
        github_url: social_url(GITHUB_BASE, &text_field(state, keys.github)),
        website_url: text_field(state, "websiteUrl"),
        organization: text_field(state, "organization"),
        avatar_url: text_field(state, keys.avatar),
        email: text_field(state, "email"),
    })
}

/// Absent or non-string keys default to the empty string.
fn text_field(state: &Map<String, Value>, key: &str) -> String {
    state
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Expands a raw handle into a profile URL. An empty handle yields no URL
/// rather than a bare template prefix.
fn social_url(base: &str, handle: &str) -> String {
    if handle.is_empty() {
        String::new()
    } else {
        format!("{base}{handle}")
    }
}
