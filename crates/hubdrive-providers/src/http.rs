//! Shared reqwest plumbing: client construction, status mapping, body parsing.

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::BoxFuture;
use crate::error::{ProviderError, ProviderErrorCode, ProviderResult, Service};

/// Builds an HTTP client with the given timeout and user agent.
pub(crate) fn build_client(timeout: Duration, user_agent: &str) -> ProviderResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| ProviderError::internal("failed to create HTTP client").with_source(e))
}

/// Maps a transport failure to a network error.
pub(crate) fn send_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::network("request timeout")
    } else if e.is_connect() {
        ProviderError::network(format!("connection failed: {}", e))
    } else {
        ProviderError::network(format!("request failed: {}", e))
    }
}

/// Maps a non-success status to an error; passes successful responses through.
///
/// `what` names the resource for error messages.
pub(crate) async fn check_status(response: Response, what: &str) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let err = status_error(status, what, "");
        return Err(match retry_after {
            Some(delay) => err.with_retry_after(delay),
            None => err,
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, what, &body))
}

/// Builds the error for a failed status code.
pub(crate) fn status_error(status: StatusCode, what: &str, body: &str) -> ProviderError {
    let code = ProviderErrorCode::from_status(status.as_u16());
    let message = match code {
        ProviderErrorCode::AuthenticationFailed => "access token expired or invalid".to_string(),
        ProviderErrorCode::AuthorizationFailed => format!("access denied to {what}"),
        ProviderErrorCode::NotFound => format!("{what} not found"),
        ProviderErrorCode::BadRequest => format!("bad request: {body}"),
        ProviderErrorCode::RateLimited => "rate limit exceeded".to_string(),
        _ => format!("API error ({}): {}", status, body),
    };
    ProviderError::new(code, message)
}

/// Boxes a future, tagging any error with `service`.
pub(crate) fn tagged<'a, T, F>(service: Service, fut: F) -> BoxFuture<'a, ProviderResult<T>>
where
    F: Future<Output = ProviderResult<T>> + Send + 'a,
    T: Send + 'a,
{
    Box::pin(async move { fut.await.map_err(|e| e.with_service(service)) })
}

/// Reads and parses a JSON response body.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> ProviderResult<T> {
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

    serde_json::from_str(&body)
        .map_err(|e| ProviderError::invalid_response(format!("failed to parse response: {}", e)))
}
