//! Content endpoint client.

use cloudput_protocol::{
    API_ARG_HEADER, ApiErrorBody, CommitInfo, DEFAULT_CONTENT_URL, Endpoint, FileMetadata,
    UploadSessionAppendArg, UploadSessionCursor, UploadSessionFinishArg, UploadSessionStartArg,
    UploadSessionStartResult, encode_api_arg,
};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Errors from the content API client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid access token")]
    InvalidToken,

    #[error("invalid call argument: {0}")]
    InvalidArg(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("rate limited{}", retry_hint(.retry_after))]
    RateLimited { retry_after: Option<u64> },

    #[error("{endpoint} failed: {summary}")]
    Endpoint {
        endpoint: &'static str,
        summary: String,
    },

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    retry_after
        .as_ref()
        .map(|secs| format!(", retry after {secs}s"))
        .unwrap_or_default()
}

/// Storage content API client.
pub struct Client {
    http: reqwest::Client,
    content_url: String,
}

impl Client {
    /// Creates a new client authenticated with `access_token`.
    pub fn new(access_token: &str) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {access_token}"))
                .map_err(|_| Error::InvalidToken)?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            content_url: DEFAULT_CONTENT_URL.to_string(),
        })
    }

    /// Points the client at another content host.
    pub fn with_content_url(mut self, url: impl Into<String>) -> Self {
        self.content_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Performs a content call: JSON argument in the header, raw bytes in the body.
    async fn post_content<A: Serialize>(
        &self,
        endpoint: Endpoint,
        arg: &A,
        data: Vec<u8>,
    ) -> Result<Vec<u8>, Error> {
        let url = format!("{}{}", self.content_url, endpoint.path());
        let arg = encode_api_arg(arg)?;
        let arg = HeaderValue::from_str(&arg).map_err(|e| Error::InvalidArg(e.to_string()))?;

        debug!(endpoint = endpoint.name(), bytes = data.len(), "content request");

        let resp = self
            .http
            .post(&url)
            .header(API_ARG_HEADER, arg)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.bytes().await?.to_vec());
        }

        let retry_after = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = resp.text().await.unwrap_or_default();

        Err(match status {
            StatusCode::UNAUTHORIZED => Error::Unauthorized(error_summary(&body)),
            StatusCode::TOO_MANY_REQUESTS => Error::RateLimited { retry_after },
            StatusCode::CONFLICT => Error::Endpoint {
                endpoint: endpoint.name(),
                summary: error_summary(&body),
            },
            _ => Error::Api {
                status: status.as_u16(),
                body,
            },
        })
    }

    async fn call<A: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        arg: &A,
        data: Vec<u8>,
    ) -> Result<T, Error> {
        let body = self.post_content(endpoint, arg, data).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Opens an upload session carrying the first chunk.
    pub async fn upload_session_start(
        &self,
        data: Vec<u8>,
    ) -> Result<UploadSessionStartResult, Error> {
        self.call(Endpoint::SessionStart, &UploadSessionStartArg::default(), data)
            .await
    }

    /// Appends a chunk at `cursor.offset`.
    pub async fn upload_session_append(
        &self,
        cursor: UploadSessionCursor,
        data: Vec<u8>,
    ) -> Result<(), Error> {
        // The response body is `null`; nothing to decode.
        self.post_content(
            Endpoint::SessionAppend,
            &UploadSessionAppendArg::new(cursor),
            data,
        )
        .await?;
        Ok(())
    }

    /// Sends the final bytes and commits the session to `commit.path`.
    pub async fn upload_session_finish(
        &self,
        cursor: UploadSessionCursor,
        commit: CommitInfo,
        data: Vec<u8>,
    ) -> Result<FileMetadata, Error> {
        let arg = UploadSessionFinishArg { cursor, commit };
        self.call(Endpoint::SessionFinish, &arg, data).await
    }

    /// Uploads a whole file in one call.
    pub async fn upload(&self, commit: &CommitInfo, data: Vec<u8>) -> Result<FileMetadata, Error> {
        self.call(Endpoint::Upload, commit, data).await
    }
}

/// Extracts `error_summary` from an error body, falling back to the raw text.
fn error_summary(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) => {
            debug!(tag = err.tag().unwrap_or_default(), "API error body");
            err.error_summary
        }
        Err(_) => body.trim().to_string(),
    }
}
