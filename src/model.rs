use serde::Deserialize;
use serde::Serialize;

/// One leaderboard user that survived the country filter. Built once by a
/// ranking source, never mutated afterwards.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub display_name: String,
    pub bio: String,
    pub country: String,
    /// Profile URL, always populated; it is the fetch key.
    pub kaggle_url: String,
    pub twitter_url: String,
    pub linked_in_url: String,
    pub github_url: String,
    pub website_url: String,
    pub organization: String,
    pub avatar_url: String,
    pub email: String,
}
