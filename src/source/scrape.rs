use scraper::Html;
use scraper::Selector;
use serde_json::Map;
use serde_json::Value;
use url::Url;

use super::RANKING_GROUP;
use super::RankingSource;
use super::SCRAPE_KEYS;
use super::json_references;
use super::user_from_state;
use crate::config::Config;
use crate::config::ListFormat;
use crate::error::Error;
use crate::error::Result;
use crate::model::User;

/// Profile pages serialize their state into a script as
/// `Kaggle.State.push({...});` — the JSON payload sits between these two
/// literals and nothing smarter than that is contractual.
const STATE_MARKER: &str = "Kaggle.State.push(";
const STATE_TERMINATOR: &str = ");";

const USER_LINK_SELECTOR: &str = "a.block.UserEntity-link";
const PROFILE_SCRIPT_SELECTOR: &str = "body > main > div > div.site-layout__main-content > script";

/// Ranking source that routes every fetch through a Splash-style render
/// gateway and scrapes the rendered pages.
pub struct SplashSource {
    client: reqwest::Client,
    config: Config,
    user_link: Selector,
    profile_script: Selector,
}

impl SplashSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            config: config.clone(),
            user_link: parse_selector(USER_LINK_SELECTOR)?,
            profile_script: parse_selector(PROFILE_SCRIPT_SELECTOR)?,
        })
    }

    /// Wraps a target URL into a gateway render request.
    fn render_url(&self, target: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.splash_url)?.join("render.html")?;
        url.query_pairs_mut()
            .append_pair("url", target)
            .append_pair("timeout", &self.config.request_timeout.to_string())
            .append_pair("wait", &self.config.wait_time.to_string());
        Ok(url)
    }

    async fn render(&self, target: &str) -> Result<String> {
        let url = self.render_url(target)?;
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }

    /// Reads user profile links off a rendered ranking page, in document
    /// order. Only root-relative hrefs count as profile links.
    fn html_references(&self, content: &str) -> Vec<String> {
        let document = Html::parse_document(content);
        document
            .select(&self.user_link)
            .filter_map(|anchor| anchor.value().attr("href"))
            .filter(|href| href.starts_with('/'))
            .map(|href| format!("{}{}", self.config.kaggle_base_url, href))
            .collect()
    }
}

impl RankingSource for SplashSource {
    async fn fetch_listing(&self, page: u32) -> Result<String> {
        let path = match self.config.list_format {
            ListFormat::Html => "rankings",
            ListFormat::Json => "rankings.json",
        };
        let target = format!(
            "{}/{}?group={}&page={}&pageSize={}",
            self.config.kaggle_base_url, path, RANKING_GROUP, page, self.config.page_size
        );
        self.render(&target).await
    }

    fn extract_references(&self, content: &str) -> Result<Vec<String>> {
        match self.config.list_format {
            ListFormat::Html => Ok(self.html_references(content)),
            ListFormat::Json => json_references(content, &self.config.kaggle_base_url),
        }
    }

    async fn fetch_detail(&self, profile_url: &str) -> Result<Option<User>> {
        let content = self.render(profile_url).await?;
        extract_profile(&content, profile_url, &self.profile_script, &self.config)
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Selector(e.to_string()))
}

/// Parses a rendered profile page into a record, or `None` when the user
/// falls outside the target country.
fn extract_profile(
    content: &str,
    profile_url: &str,
    script_selector: &Selector,
    config: &Config,
) -> Result<Option<User>> {
    let document = Html::parse_document(content);
    let script_text: String = document
        .select(script_selector)
        .flat_map(|script| script.text())
        .collect();
    let state: Map<String, Value> = serde_json::from_str(embedded_state(&script_text)?)?;
    Ok(user_from_state(&state, profile_url, &SCRAPE_KEYS, config))
}

/// Slices the JSON payload out of the profile script text. Missing either
/// bound means the render came back without usable state.
fn embedded_state(script_text: &str) -> Result<&str> {
    let start = script_text
        .find(STATE_MARKER)
        .ok_or(Error::InsufficientData)?
        + STATE_MARKER.len();
    let rest = &script_text[start..];
    let end = rest.find(STATE_TERMINATOR).ok_or(Error::InsufficientData)?;
    Ok(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SplashSource {
        SplashSource::new(&Config::default()).unwrap()
    }

    fn profile_page(state: &Value) -> String {
        format!(
            "<html><body><main><div><div class=\"site-layout__main-content\">\
             <script>window.require([]);Kaggle.State.push({state});performance.mark(\"done\");</script>\
             </div></div></main></body></html>"
        )
    }

    fn taro_state(country: &str) -> Value {
        serde_json::json!({
            "displayName": "Taro Yamada",
            "bio": "ML engineer\nloves CV, NLP",
            "country": country,
            "twitterUserName": "taro",
            "linkedInUrl": "https://www.linkedin.com/in/taro",
            "gitHubUserName": "taro-gh",
            "websiteUrl": "https://taro.example",
            "organization": "Example Lab",
            "userAvatarUrl": "https://storage.example/taro.png",
            "email": "taro@example.com",
        })
    }

    fn extract(source: &SplashSource, content: &str) -> Result<Option<User>> {
        extract_profile(
            content,
            "https://www.kaggle.com/taro",
            &source.profile_script,
            &source.config,
        )
    }

    #[test]
    fn html_references_keep_document_order_and_root_relative_hrefs_only() {
        let page = r##"<html><body><table>
            <a class="block UserEntity-link" href="/alice">Alice</a>
            <a class="block UserEntity-link" href="https://elsewhere.example/bob">Bob</a>
            <a class="UserEntity-link" href="/carol">Carol</a>
            <a class="block UserEntity-link" href="/dave">Dave</a>
            </table></body></html>"##;
        let refs = source().html_references(page);
        assert_eq!(
            refs,
            vec!["https://www.kaggle.com/alice", "https://www.kaggle.com/dave"]
        );
    }

    #[test]
    fn render_url_percent_encodes_the_target() {
        let url = source()
            .render_url("https://www.kaggle.com/rankings?group=competitions&page=1&pageSize=20")
            .unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.path(), "/render.html");
        let query = url.query().unwrap();
        assert!(query.contains("url=https%3A%2F%2Fwww.kaggle.com%2Frankings"));
        assert!(query.contains("timeout=10"));
        assert!(query.contains("wait=5"));
    }

    #[test]
    fn target_country_profile_becomes_a_record() {
        let source = source();
        let page = profile_page(&taro_state("Japan"));
        let user = extract(&source, &page).unwrap().unwrap();
        assert_eq!(user.display_name, "Taro Yamada");
        assert_eq!(user.country, "Japan");
        assert_eq!(user.kaggle_url, "https://www.kaggle.com/taro");
        assert_eq!(user.twitter_url, "https://twitter.com/taro");
        assert_eq!(user.github_url, "https://github.com/taro-gh");
        assert_eq!(user.linked_in_url, "https://www.linkedin.com/in/taro");
        assert_eq!(user.organization, "Example Lab");
        assert_eq!(user.email, "taro@example.com");
    }

    #[test]
    fn alternate_country_spellings_are_accepted() {
        let source = source();
        for spelling in ["JP", "日本"] {
            let page = profile_page(&taro_state(spelling));
            let user = extract(&source, &page).unwrap().unwrap();
            assert_eq!(user.country, spelling);
        }
    }

    #[test]
    fn other_countries_are_filtered_out_without_error() {
        let source = source();
        let page = profile_page(&taro_state("Brazil"));
        assert_eq!(extract(&source, &page).unwrap(), None);
    }

    #[test]
    fn page_without_state_marker_is_insufficient_data() {
        let source = source();
        let page = "<html><body><main><div><div class=\"site-layout__main-content\">\
                    <script>var x = 1;</script></div></div></main></body></html>";
        assert!(matches!(
            extract(&source, page),
            Err(Error::InsufficientData)
        ));
    }

    #[test]
    fn state_without_terminator_is_insufficient_data() {
        let source = source();
        let page = "<html><body><main><div><div class=\"site-layout__main-content\">\
                    <script>Kaggle.State.push({\"country\":\"Japan\"}</script>\
                    </div></div></main></body></html>";
        assert!(matches!(
            extract(&source, page),
            Err(Error::InsufficientData)
        ));
    }

    #[test]
    fn extraction_is_idempotent() {
        let source = source();
        let page = profile_page(&taro_state("Japan"));
        let first = extract(&source, &page).unwrap();
        let second = extract(&source, &page).unwrap();
        assert_eq!(first, second);
    }
}
