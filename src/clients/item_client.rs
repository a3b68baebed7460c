use super::ItemLookup;
use crate::model::Item;
use crate::order_builder::OrderError;
use crate::response::Envelope;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the item service's `GET /items/{id}` endpoint.
///
/// Cheap to clone; clones share one connection pool. Responses are never cached, so every
/// fetch sees the catalog as it is at that moment.
///
/// | Outcome | Error |
/// |---------|-------|
/// | connection refused, timeout, body read failure | [`OrderError::Transport`] |
/// | HTTP 404, empty `data`, no entry with the requested id | [`OrderError::NotFound`] |
/// | any other non-success status | [`OrderError::Transport`] |
/// | body is not an item envelope | [`OrderError::Protocol`] |
#[derive(Debug, Clone)]
pub struct ItemServiceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ItemServiceClient {
    /// `base` may omit the scheme (`127.0.0.1:8080` means `http://127.0.0.1:8080`).
    pub fn new(base: &str, timeout: Duration) -> Result<Self, OrderError> {
        let base = if base.contains("://") {
            base.to_string()
        } else {
            format!("http://{base}")
        };
        let base_url = Url::parse(&base)
            .map_err(|e| OrderError::Transport(format!("invalid item service url {base:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(OrderError::Transport(format!(
                "item service url {base:?} cannot be a base"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OrderError::Transport(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn item_url(&self, item_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["items", item_id]);
        }
        url
    }
}

#[async_trait]
impl ItemLookup for ItemServiceClient {
    #[instrument(skip(self))]
    async fn fetch(&self, item_id: &str) -> Result<Item, OrderError> {
        let url = self.item_url(item_id);
        debug!(%url, "Fetching item");

        let response = self.http.get(url).send().await.map_err(|e| {
            warn!(error = %e, "Item service request failed");
            OrderError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(OrderError::NotFound(item_id.to_string()));
        }
        if !status.is_success() {
            warn!(%status, "Item service returned an error");
            return Err(OrderError::Transport(format!("item service returned {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| OrderError::Transport(e.to_string()))?;
        let envelope: Envelope<Item> =
            serde_json::from_slice(&body).map_err(|e| OrderError::Protocol(e.to_string()))?;

        if envelope.status == StatusCode::NOT_FOUND.as_u16() || envelope.count == 0 {
            return Err(OrderError::NotFound(item_id.to_string()));
        }

        envelope
            .into_data()
            .into_iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| OrderError::NotFound(item_id.to_string()))
    }
}
