//! HTTP streaming client: POST a query to `/api/{endpoint}` and hand each
//! decoded run-log patch to a caller-supplied callback as it arrives.
//! No retries and no backoff; a failed request surfaces immediately.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderValue, ACCEPT};

use crate::payload::QueryPayload;
use crate::runlog::RunLogPatch;
use crate::sse::SseParser;

/// Client over a RAG chat server's `/api` surface.
#[derive(Debug, Clone)]
pub struct ChatApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChatApiClient {
    /// Build a client for `base_url` (e.g. `http://127.0.0.1:8000`).
    /// `timeout` bounds connection establishment only; an open stream is
    /// never cut off, however long the answer takes.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.base_url, endpoint)
    }

    /// Open a streaming query against `endpoint` and feed every decoded patch
    /// to `on_patch`, in arrival order, until the stream ends.
    pub async fn stream_query<F>(
        &self,
        endpoint: &str,
        payload: &QueryPayload<'_>,
        mut on_patch: F,
    ) -> Result<(), ClientError>
    where
        F: FnMut(RunLogPatch),
    {
        let response = self
            .http
            .post(self.endpoint_url(endpoint))
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status(status.as_u16(), body));
        }

        let mut bytes = response.bytes_stream();
        let mut parser = SseParser::default();

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk?;
            for data in parser.feed(&chunk) {
                if data == "null" {
                    continue;
                }
                let patch: RunLogPatch = serde_json::from_str(&data)
                    .map_err(|e| ClientError::Decode(format!("{}: {}", e, data)))?;
                on_patch(patch);
            }
        }

        Ok(())
    }

    /// Trigger an on-demand schema refresh on the server. Independent of any
    /// chat stream; success or failure only.
    pub async fn refresh_schema(&self) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.endpoint_url("refresh-schema"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status(status.as_u16(), body));
        }
        Ok(())
    }
}

/// Request or stream error.
#[derive(Debug)]
pub enum ClientError {
    /// Transport-level failure (connect, send, or mid-stream read).
    Http(String),
    /// Non-success HTTP status with the response body.
    Status(u16, String),
    /// A stream chunk that could not be decoded as a run-log patch.
    Decode(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Http(s) => write!(f, "request failed: {}", s),
            ClientError::Status(code, body) => {
                write!(f, "server returned HTTP {}: {}", code, body)
            }
            ClientError::Decode(s) => write!(f, "invalid stream chunk: {}", s),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e.to_string())
    }
}
