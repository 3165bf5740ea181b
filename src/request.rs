use std::io::Write;

use flate2::{write::GzEncoder, Compression};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::Serialize;

use crate::error::{PushError, Result};
use crate::limiter::ConcurrencyLimiter;

/// Bodies longer than this many bytes are gzipped by default
pub const DEFAULT_GZIP_THRESHOLD: usize = 1024;

const CLIENT_USER_AGENT: &str = concat!("expo-notification-client/", env!("CARGO_PKG_VERSION"));

/// What came back over the wire, before any interpretation
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub text: String,
}

/// Issues single HTTP calls against the push service, one slot of the limiter per call.
#[derive(Clone, Debug)]
pub struct RequestExecutor {
    http: reqwest::Client,
    limiter: ConcurrencyLimiter,
    access_token: Option<String>,
}

impl RequestExecutor {
    pub fn new(http: reqwest::Client, limiter: ConcurrencyLimiter, access_token: Option<String>) -> Self {
        RequestExecutor {
            http,
            limiter,
            access_token,
        }
    }

    /// Serializes `body`, gzips it when `should_compress` says so, and sends it.
    ///
    /// Exactly one network call is made; no retries.
    pub async fn execute<B, P>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        should_compress: P,
    ) -> Result<RawResponse>
    where
        B: Serialize + ?Sized,
        P: Fn(&[u8]) -> bool,
    {
        let mut headers = self.default_headers()?;

        let mut request = self.http.request(method.clone(), url);
        if let Some(body) = body {
            let json = serde_json::to_vec(body)?;
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

            let payload = if should_compress(&json) {
                headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
                gzip(&json)?
            } else {
                json
            };
            debug!("request:: {} {} ({} byte body)", method, url, payload.len());
            request = request.body(payload);
        } else {
            debug!("request:: {} {}", method, url);
        }
        let request = request.headers(headers);

        self.limiter
            .run(|| async move {
                let response = request.send().await?;
                let status = response.status();
                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);
                let text = response.text().await?;
                Ok::<_, PushError>(RawResponse {
                    status,
                    content_type,
                    text,
                })
            })
            .await
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        if let Some(token) = &self.access_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| PushError::Config("access token contains invalid header characters".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

/// Compression predicate for bodies longer than `threshold` bytes; `None` never compresses
pub fn compress_over(threshold: Option<usize>) -> impl Fn(&[u8]) -> bool {
    move |body: &[u8]| threshold.is_some_and(|limit| body.len() > limit)
}

fn gzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).map_err(PushError::Compression)?;
    encoder.finish().map_err(PushError::Compression)
}
