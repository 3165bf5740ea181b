use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use futures::future::try_join_all;
use log::{debug, info};
use reqwest::Method;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::chunk::{
    chunk_push_notification_receipt_ids, chunk_push_notifications, PUSH_NOTIFICATION_CHUNK_LIMIT,
    PUSH_NOTIFICATION_RECEIPT_CHUNK_LIMIT,
};
use crate::error::{PushError, Result};
use crate::limiter::ConcurrencyLimiter;
use crate::models::{PushMessage, PushTicket};
use crate::request::{compress_over, RequestExecutor, DEFAULT_GZIP_THRESHOLD};
use crate::response::normalize_response;
use crate::token::is_expo_push_token;
use crate::types::{ReceiptId, ReceiptMap};
use crate::util::{VAR_ACCESS_TOKEN, VAR_BASE_URL, VAR_MAX_CONCURRENT_REQUESTS};

pub const DEFAULT_BASE_URL: &str = "https://exp.host";

const SEND_PATH: &str = "/--/api/v2/push/send";
const RECEIPTS_PATH: &str = "/--/api/v2/push/getReceipts";

#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub base_url: String,
    /// Sent as a bearer token when the project requires authenticated pushes
    pub access_token: Option<String>,
    /// `None` leaves requests unthrottled
    pub max_concurrent_requests: Option<usize>,
    /// Request bodies longer than this are gzipped; `None` disables compression
    pub gzip_threshold: Option<usize>,
    /// Caller-provided client, e.g. to control connection reuse
    pub http_client: Option<reqwest::Client>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            max_concurrent_requests: None,
            gzip_threshold: Some(DEFAULT_GZIP_THRESHOLD),
            http_client: None,
        }
    }
}

impl ClientOptions {
    /// Reads `EXPO_BASE_URL`, `EXPO_ACCESS_TOKEN` and `EXPO_MAX_CONCURRENT_REQUESTS`.
    pub fn from_env() -> Result<Self> {
        let mut options = ClientOptions::default();
        if let Ok(base_url) = env::var(VAR_BASE_URL) {
            options.base_url = base_url;
        }
        options.access_token = env::var(VAR_ACCESS_TOKEN).ok().filter(|token| !token.is_empty());
        if let Ok(max) = env::var(VAR_MAX_CONCURRENT_REQUESTS) {
            options.max_concurrent_requests = Some(parse_max_concurrent(&max)?);
        }
        Ok(options)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = Some(max);
        self
    }

    pub fn with_gzip_threshold(mut self, threshold: Option<usize>) -> Self {
        self.gzip_threshold = threshold;
        self
    }

    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }
}

fn parse_max_concurrent(value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(max) if max > 0 => Ok(max),
        _ => Err(PushError::Config(format!(
            "{VAR_MAX_CONCURRENT_REQUESTS} must be a positive integer, got `{value}`"
        ))),
    }
}

#[derive(Serialize)]
struct ReceiptsRequest<'a> {
    ids: &'a [ReceiptId],
}

/// Client for the Expo push service.
///
/// Cheap to clone; clones share the HTTP connection pool and the concurrency limit.
#[derive(Clone, Debug)]
pub struct ExpoClient {
    executor: RequestExecutor,
    send_url: Arc<str>,
    receipts_url: Arc<str>,
    gzip_threshold: Option<usize>,
}

impl ExpoClient {
    pub const PUSH_NOTIFICATION_CHUNK_LIMIT: usize = PUSH_NOTIFICATION_CHUNK_LIMIT;
    pub const PUSH_NOTIFICATION_RECEIPT_CHUNK_LIMIT: usize = PUSH_NOTIFICATION_RECEIPT_CHUNK_LIMIT;

    pub fn new(options: ClientOptions) -> Result<Self> {
        let limiter = ConcurrencyLimiter::new(options.max_concurrent_requests)?;
        let http = options.http_client.unwrap_or_default();
        let base_url = options.base_url.trim_end_matches('/');

        Ok(ExpoClient {
            executor: RequestExecutor::new(http, limiter, options.access_token),
            send_url: format!("{base_url}{SEND_PATH}").into(),
            receipts_url: format!("{base_url}{RECEIPTS_PATH}").into(),
            gzip_threshold: options.gzip_threshold,
        })
    }

    pub fn is_expo_push_token(token: &str) -> bool {
        is_expo_push_token(token)
    }

    /// Sends `messages` and returns one ticket per message, in the same order.
    ///
    /// Messages are split into chunks of [`PUSH_NOTIFICATION_CHUNK_LIMIT`] that are sent
    /// concurrently, subject to the configured limit. The first failing chunk fails the whole
    /// call; chunks already in flight still run to completion in the background.
    ///
    /// With a bounded limiter, chunks are admitted in the order their tasks reach the limiter,
    /// which the runtime decides; only the merged tickets are guaranteed to follow chunk order.
    pub async fn send_push_notifications(&self, messages: &[PushMessage]) -> Result<Vec<PushTicket>> {
        let chunks = chunk_push_notifications(messages);
        info!("client:: sending {} messages in {} chunks", messages.len(), chunks.len());

        let handles: Vec<JoinHandle<Result<Vec<PushTicket>>>> = chunks
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| {
                let client = self.clone();
                tokio::spawn(async move { client.send_chunk(index, chunk).await })
            })
            .collect();

        let tickets = join_in_order(handles).await?;
        Ok(tickets.into_iter().flatten().collect())
    }

    /// Looks up receipts for `receipt_ids`, chunked by [`PUSH_NOTIFICATION_RECEIPT_CHUNK_LIMIT`].
    ///
    /// Ids the service has no receipt for are simply absent from the map.
    pub async fn get_push_notification_receipts(&self, receipt_ids: &[ReceiptId]) -> Result<ReceiptMap> {
        let chunks = chunk_push_notification_receipt_ids(receipt_ids);
        info!("client:: fetching {} receipts in {} chunks", receipt_ids.len(), chunks.len());

        let handles: Vec<JoinHandle<Result<ReceiptMap>>> = chunks
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| {
                let client = self.clone();
                tokio::spawn(async move { client.fetch_receipts_chunk(index, chunk).await })
            })
            .collect();

        let mut receipts = HashMap::with_capacity(receipt_ids.len());
        for chunk in join_in_order(handles).await? {
            receipts.extend(chunk);
        }
        Ok(receipts)
    }

    async fn send_chunk(&self, index: usize, messages: Vec<PushMessage>) -> Result<Vec<PushTicket>> {
        debug!("client:: chunk {} sending {} messages", index, messages.len());
        let response = self
            .executor
            .execute(
                Method::POST,
                &self.send_url,
                Some(messages.as_slice()),
                compress_over(self.gzip_threshold),
            )
            .await?;

        let data = normalize_response(response)?;
        let tickets: Vec<PushTicket> = serde_json::from_value(data)
            .map_err(|e| PushError::transport(format!("Could not decode push tickets: {e}")))?;

        if tickets.len() != messages.len() {
            return Err(PushError::transport(format!(
                "Expected the push service to respond with {} tickets but got {}",
                messages.len(),
                tickets.len()
            )));
        }
        Ok(tickets)
    }

    async fn fetch_receipts_chunk(&self, index: usize, receipt_ids: Vec<ReceiptId>) -> Result<ReceiptMap> {
        debug!("client:: chunk {} fetching {} receipts", index, receipt_ids.len());
        let body = ReceiptsRequest { ids: &receipt_ids };
        let response = self
            .executor
            .execute(
                Method::POST,
                &self.receipts_url,
                Some(&body),
                compress_over(self.gzip_threshold),
            )
            .await?;

        let data = normalize_response(response)?;
        if !data.is_object() {
            return Err(PushError::transport(
                "Expected the push service to respond with a map from receipt ids to receipts",
            ));
        }
        serde_json::from_value(data)
            .map_err(|e| PushError::transport(format!("Could not decode push receipts: {e}")))
    }
}

/// Waits for every chunk task, keeping chunk order. Returns the first error observed; tasks
/// still running are detached, not aborted.
async fn join_in_order<T>(handles: Vec<JoinHandle<Result<T>>>) -> Result<Vec<T>> {
    try_join_all(handles.into_iter().map(|handle| async move { handle.await? })).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_the_base_url() {
        let client = ExpoClient::new(ClientOptions::default().with_base_url("http://localhost:8080/")).unwrap();
        assert_eq!(&*client.send_url, "http://localhost:8080/--/api/v2/push/send");
        assert_eq!(&*client.receipts_url, "http://localhost:8080/--/api/v2/push/getReceipts");
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let result = ExpoClient::new(ClientOptions::default().with_max_concurrent_requests(0));
        assert!(matches!(result, Err(PushError::InvalidArgument(_))));
    }

    #[test]
    fn max_concurrent_must_be_a_positive_integer() {
        assert_eq!(parse_max_concurrent(" 6 ").unwrap(), 6);
        assert!(matches!(parse_max_concurrent("0"), Err(PushError::Config(_))));
        assert!(matches!(parse_max_concurrent("many"), Err(PushError::Config(_))));
    }

    #[tokio::test]
    async fn empty_batches_make_no_requests() {
        let client = ExpoClient::new(ClientOptions::default().with_base_url("http://127.0.0.1:1")).unwrap();
        assert!(client.send_push_notifications(&[]).await.unwrap().is_empty());
        assert!(client.get_push_notification_receipts(&[]).await.unwrap().is_empty());
    }
}
