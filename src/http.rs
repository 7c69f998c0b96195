//! Shared HTTP plumbing for the upstream clients

use std::time::Duration;

use reqwest::Url;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::HttpConfig;
use crate::{Result, SailError};

/// Build the HTTP client used by every upstream source.
///
/// A retry layer is only installed when `max_retries > 0`; by default
/// upstream failures surface on the first attempt.
pub fn build_client(config: &HttpConfig) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds.into()))
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| SailError::config(format!("Failed to create HTTP client: {e}")))?;

    let mut builder = ClientBuilder::new(client);
    if config.max_retries > 0 {
        let policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        builder = builder.with(RetryTransientMiddleware::new_with_policy(policy));
    }
    Ok(builder.build())
}

/// Build `base` with query parameters appended
pub fn url_with_params<I, K, V>(service: &'static str, base: &str, params: I) -> Result<Url>
where
    I: IntoIterator,
    I::Item: std::borrow::Borrow<(K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    Url::parse_with_params(base, params)
        .map_err(|e| SailError::upstream(service, format!("invalid endpoint {base}: {e}")))
}

/// GET `url` and decode a JSON body, mapping every failure to
/// [`SailError::UpstreamUnavailable`]
pub async fn get_json<T: DeserializeOwned>(
    client: &ClientWithMiddleware,
    service: &'static str,
    url: Url,
) -> Result<T> {
    // only the path is logged; query strings may carry API keys
    debug!(service, host = url.host_str().unwrap_or_default(), path = url.path(), "upstream request");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SailError::upstream(service, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!(service, %status, "upstream returned error status");
        return Err(SailError::upstream(
            service,
            format!("HTTP {status}: {}", body.trim()),
        ));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| SailError::upstream(service, e))
}
