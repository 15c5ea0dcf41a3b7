use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; notebook-portal)";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no candidate URLs configured")]
    NoCandidates,

    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("all {} candidate URLs failed: {}", .attempts.len(), .attempts.join("; "))]
    AllCandidatesFailed { attempts: Vec<String> },
}

/// Builds the client used for reference downloads.
///  - `timeout_secs` caps each request.
///  - Redirects are followed (raw GitHub links redirect).
pub fn reference_client(timeout_secs: u64) -> Result<Client, FetchError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(10))
        .user_agent(USER_AGENT)
        .build()?)
}

/// GETs each URL in order and returns the first body that parses as JSON,
/// together with the URL that produced it.
pub async fn fetch_first_json(client: &Client, urls: &[String]) -> Result<(String, Value), FetchError> {
    if urls.is_empty() {
        return Err(FetchError::NoCandidates);
    }

    let mut attempts = Vec::with_capacity(urls.len());

    for url in urls {
        match fetch_json(client, url).await {
            Ok(value) => {
                tracing::debug!(url = %url, "reference document fetched");
                return Ok((url.clone(), value));
            }
            Err(reason) => {
                tracing::warn!(url = %url, reason = %reason, "reference candidate failed");
                attempts.push(format!("{url}: {reason}"));
            }
        }
    }

    Err(FetchError::AllCandidatesFailed { attempts })
}

async fn fetch_json(client: &Client, url: &str) -> Result<Value, String> {
    let resp = client.get(url).send().await.map_err(|e| e.to_string())?;

    let status = resp.status();
    if !status.is_success() {
        return Err(match status {
            StatusCode::NOT_FOUND => "not found".to_string(),
            other => format!("HTTP {other}"),
        });
    }

    let body = resp.bytes().await.map_err(|e| e.to_string())?;
    serde_json::from_slice(&body).map_err(|e| format!("invalid JSON: {e}"))
}
