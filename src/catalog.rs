use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::http::get_text_with_retries;
use crate::models::Episode;

/// Full episode listing for the show being tracked.
pub const DEFAULT_ENDPOINT: &str = "https://api.tvmaze.com/shows/66/episodes";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const READ_TIMEOUT: Duration = Duration::from_secs(10);
const ATTEMPTS: usize = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Pulls the full catalog from the remote listing endpoint.
pub fn fetch_catalog(url: &str) -> Result<Vec<Episode>> {
    let body = get_text_with_retries(url, CONNECT_TIMEOUT, READ_TIMEOUT, ATTEMPTS, RETRY_DELAY)
        .map_err(|err| anyhow!(err))
        .with_context(|| format!("failed to fetch episode catalog from {url}"))?;
    parse_catalog(&body)
}

fn parse_catalog(body: &str) -> Result<Vec<Episode>> {
    serde_json::from_str(body).context("episode catalog response is not a valid episode array")
}
