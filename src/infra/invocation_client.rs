// ============================================================
// Layer 6 — Invocation Client
// ============================================================
// Sends one JSON payload to a model-serving endpoint and hands
// back whatever it answered. The endpoint expects a frame in
// pandas "split" orientation, announced through a `format`
// header next to the usual content type.
//
// No retries and no timeout: a hung server hangs the client.
// Non-2xx answers are returned like any other body.

use anyhow::{Context, Result};
use reqwest::{blocking::Client, header::CONTENT_TYPE};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:9000/invocations";
pub const FORMAT_HEADER:    &str = "format";
pub const PANDAS_SPLIT:     &str = "pandas-split";

#[derive(Debug, Clone)]
pub struct InvocationClient {
    client: Client,
    url:    String,
}

/// Status and raw body of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResponse {
    pub status: u16,
    pub body:   Vec<u8>,
}

impl InvocationResponse {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl InvocationClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        // No timeout on purpose: this replaces reqwest's 30 s default
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .context("Cannot build HTTP client")?;
        Ok(Self { client, url: url.into() })
    }

    /// POST `payload` as JSON with the pandas-split format header.
    pub fn invoke(&self, payload: &serde_json::Value) -> Result<InvocationResponse> {
        let body = serde_json::to_string(payload)?;
        tracing::debug!("POST {} ({} bytes)", self.url, body.len());

        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(FORMAT_HEADER, PANDAS_SPLIT)
            .body(body)
            .send()
            .with_context(|| format!("Request to '{}' failed", self.url))?;

        let status = resp.status().as_u16();
        let body   = resp
            .bytes()
            .with_context(|| format!("Cannot read response body from '{}'", self.url))?
            .to_vec();

        tracing::info!("Endpoint answered {} with {} bytes", status, body.len());
        Ok(InvocationResponse { status, body })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use rstest::*;

    #[fixture]
    fn mock_server() -> MockServer {
        MockServer::start()
    }

    #[rstest]
    fn test_posts_json_with_format_header(mock_server: MockServer) {
        let payload = serde_json::json!({"columns": ["a", "b"], "data": [[0, 1]]});
        let mock = mock_server.mock(|when, then| {
            when.method(POST)
                .path("/invocations")
                .header("content-type", "application/json")
                .header("format", "pandas-split")
                .json_body(payload.clone());
            then.status(200).body("[[0.1, 0.9]]");
        });

        let client   = InvocationClient::new(mock_server.url("/invocations")).unwrap();
        let response = client.invoke(&payload).unwrap();

        mock.assert();
        assert_eq!(response.status, 200);
        assert_eq!(response.body_text(), "[[0.1, 0.9]]");
    }

    #[rstest]
    #[case(400, "{\"error\": \"bad frame\"}")]
    #[case(500, "{\"error\": \"boom\"}")]
    fn test_error_status_is_returned_not_raised(
        #[case] status: u16,
        #[case] reply: &str,
        mock_server: MockServer,
    ) {
        mock_server.mock(|when, then| {
            when.method(POST).path("/invocations");
            then.status(status).body(reply);
        });

        let response = InvocationClient::new(mock_server.url("/invocations"))
            .unwrap()
            .invoke(&serde_json::json!({}))
            .unwrap();
        assert_eq!(response.status, status);
        assert_eq!(response.body_text(), reply);
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        // Bind then drop to get a port nothing listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = InvocationClient::new(format!("http://127.0.0.1:{port}/invocations")).unwrap();
        assert!(client.invoke(&serde_json::json!({})).is_err());
    }
}
