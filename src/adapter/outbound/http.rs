//! HTTP status handling shared by the outbound REST adapters.

use reqwest::{Response, StatusCode};

use crate::error::{ProviderError, Result};

/// Longest error body kept in a [`ProviderError::Rejected`].
const MAX_ERROR_BODY: usize = 512;

/// Classify a non-success HTTP status.
///
/// Credentials problems and malformed requests will fail the same way on
/// every attempt; throttling, timeouts and server errors may clear up.
pub(crate) fn classify_status(provider: &'static str, status: StatusCode, body: String) -> ProviderError {
    let code = status.as_u16();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Unauthorized {
            provider,
            status: code,
        },
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            ProviderError::Unavailable { provider, status: code }
        }
        s if s.is_client_error() => ProviderError::Rejected {
            provider,
            status: code,
            body: truncate(body),
        },
        _ => ProviderError::Unavailable { provider, status: code },
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

/// Pass a successful response through, or turn the status into a [`ProviderError`].
pub(crate) async fn check_status(provider: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify_status(provider, status, body).into())
}
