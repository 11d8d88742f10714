// ABOUTME: Shared HTTP plumbing for the Google API clients
// ABOUTME: Builds reqwest clients and maps non-success statuses to errors

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use url::Url;

use crate::error::MirrorError;

pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")
}

/// Parse an API base URL that path segments can be appended to.
pub fn parse_base_url(base: &str, service: &'static str) -> Result<Url> {
    let url = Url::parse(base).with_context(|| format!("Invalid {} API URL: {}", service, base))?;
    if url.cannot_be_a_base() {
        anyhow::bail!("{} API URL cannot be used as a base: {}", service, base);
    }
    Ok(url)
}

/// Build `{base}/{segments...}`, percent-encoding each segment.
///
/// `base` must come from [`parse_base_url`].
pub fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Attach the bearer token, if one was configured.
pub fn authorize(request: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
    match access_token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Pass successful responses through; turn everything else into an error.
///
/// 401/403 become [`MirrorError::Unauthorized`] and 404 becomes
/// [`MirrorError::NotFound`] so callers can react to them specifically.
pub async fn check_status(
    response: Response,
    service: &'static str,
    resource: &str,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(MirrorError::Unauthorized {
            service,
            status: status.as_u16(),
        }
        .into()),
        StatusCode::NOT_FOUND => Err(MirrorError::NotFound(resource.to_string()).into()),
        _ => {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "{} returned error {} for {}: {}",
                service,
                status,
                resource,
                body
            )
        }
    }
}
