use tracing::debug;

use crate::error::{HandoffError, HandoffResult};

/// Map a reqwest send failure onto the error taxonomy.
pub(super) fn classify_send_error(err: &reqwest::Error, timeout_secs: u64) -> HandoffError {
    if err.is_timeout() {
        HandoffError::Timeout(timeout_secs)
    } else {
        HandoffError::Transport(err.to_string())
    }
}

/// Send a request exactly once.
///
/// Session creation is not idempotent, so nothing here retries; callers
/// surface transient failures and let the user resend.
pub(super) async fn send_once(
    request: reqwest::RequestBuilder,
    timeout_secs: u64,
) -> HandoffResult<reqwest::Response> {
    match request.send().await {
        Ok(response) => Ok(response),
        Err(err) => {
            debug!("HTTP request error: {}", err);
            Err(classify_send_error(&err, timeout_secs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        // Either refused or timed out; both are transient.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let err = send_once(client.post("http://127.0.0.1:9/sessions"), 5)
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}
