use std::time::Duration;

use rand::Rng;
use tracing::info;
use tracing::warn;

use crate::config::Config;
use crate::model::User;
use crate::source::RankingSource;

/// Walks ranking pages `1..=max_pages` and accumulates every user that
/// survives the country filter, in discovery order.
///
/// Page and reference failures are logged and skipped; no retry, no early
/// termination. The loop always runs exactly `max_pages` passes even when
/// pages come back empty. Partial failure never bubbles up — only setup
/// errors (building the source) can abort a run.
pub async fn crawl<S, R>(source: &S, config: &Config, rng: &mut R) -> Vec<User>
where
    S: RankingSource,
    R: Rng,
{
    let mut users = Vec::new();

    for page in 1..=config.max_pages {
        info!("fetching ranking page {page} of {}", config.max_pages);

        let content = match source.fetch_listing(page).await {
            Ok(content) => content,
            Err(e) => {
                warn!("failed to fetch ranking page {page}: {e}");
                continue;
            }
        };
        let references = match source.extract_references(&content) {
            Ok(references) => references,
            Err(e) => {
                warn!("failed to parse ranking page {page}: {e}");
                continue;
            }
        };
        if references.is_empty() && page > 1 {
            info!("no user links on page {page}, might be past the end of the rankings");
        }

        for profile_url in &references {
            match source.fetch_detail(profile_url).await {
                Ok(Some(user)) => {
                    info!("found user {} from {}", user.display_name, user.country);
                    users.push(user);
                }
                // Country mismatch; legitimate, not worth a log line.
                Ok(None) => {}
                Err(e) => warn!("skipping {profile_url}: {e}"),
            }
            throttle(config, rng).await;
        }
    }

    users
}

/// Unconditional blocking pause after every detail attempt. This is the
/// rate-limiting contract towards the upstream target, not an optimization
/// knob.
async fn throttle<R: Rng>(config: &Config, rng: &mut R) {
    let upper = config.max_delay.max(config.min_delay);
    let secs = rng.random_range(config.min_delay..=upper);
    tokio::time::sleep(Duration::from_secs(secs)).await;
}
