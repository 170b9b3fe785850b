// Live ingestion: fetch URLs and hand their bodies to the adapter
//
// This is the environment-specific binding the engine itself stays out of;
// the engine only ever sees (body, content-type) pairs.

use crate::harvester::Harvester;
use anyhow::Result;
use tracing::{info, warn};

/// GET each URL and feed the response through the ingestion adapter.
/// Returns how many responses were actually walked. Individual request
/// failures are warned and skipped.
pub async fn fetch_urls(harvester: &mut Harvester, urls: &[String]) -> Result<usize> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("holdscan/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let mut walked = 0usize;
    for url in urls {
        info!("fetching {}", url);

        let response = match client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("request failed for {}: {}", url, e);
                continue;
            }
        };

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("body read failed for {}: {}", url, e);
                continue;
            }
        };

        if harvester.on_response_body(&body, &content_type) {
            walked += 1;
        }
    }

    Ok(walked)
}
