//! Routes of the item service.
//!
//! | Method | Path | |
//! |--------|------|-|
//! | GET | `/` | pong |
//! | GET | `/healthz` | health |
//! | GET | `/items` | every entry |
//! | POST | `/items` | create a batch |
//! | PUT | `/items` | create or replace a batch |
//! | GET | `/items/{id}` | one entry |
//! | DELETE | `/items/{id}` | delete one entry |

use super::{healthz, pong, reply, with_common_layers, Reply};
use crate::model::Item;
use crate::response::Envelope;
use crate::store::ItemStore;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use kv_actor::KvEngine;
use std::sync::Arc;
use tracing::{debug, error};

type Shared<E> = Arc<ItemStore<E>>;

/// Builds the item service router over `store`.
pub fn router<E: KvEngine + 'static>(store: ItemStore<E>) -> Router {
    let routes = Router::new()
        .route("/", get(pong))
        .route("/healthz", get(healthz))
        .route(
            "/items",
            get(list_items::<E>)
                .post(create_items::<E>)
                .put(update_items::<E>),
        )
        .route("/items/{id}", get(get_item::<E>).delete(delete_item::<E>))
        .with_state(Arc::new(store));
    with_common_layers(routes)
}

async fn list_items<E: KvEngine + 'static>(State(store): State<Shared<E>>) -> Reply {
    match store.get_all().await {
        Ok(items) if items.is_empty() => Envelope::empty(StatusCode::NOT_FOUND, "no items present"),
        Ok(items) => reply(StatusCode::OK, "items retrieved", items),
        Err(e) => {
            error!(error = %e, "Unable to list items");
            Envelope::empty(StatusCode::INTERNAL_SERVER_ERROR, "unable to retrieve items")
        }
    }
}

async fn create_items<E: KvEngine + 'static>(State(store): State<Shared<E>>, body: Bytes) -> Reply {
    set_items(&store, &body, false).await
}

async fn update_items<E: KvEngine + 'static>(State(store): State<Shared<E>>, body: Bytes) -> Reply {
    set_items(&store, &body, true).await
}

async fn set_items<E: KvEngine>(store: &ItemStore<E>, body: &[u8], overwrite: bool) -> Reply {
    let items: Vec<Item> = match serde_json::from_slice(body) {
        Ok(items) => items,
        Err(e) => {
            debug!(error = %e, "Unable to parse payload");
            return Envelope::empty(StatusCode::BAD_REQUEST, "unable to parse payload");
        }
    };
    if items.is_empty() {
        return Envelope::empty(StatusCode::UNPROCESSABLE_ENTITY, "items can't be empty");
    }
    if items.iter().any(|item| item.name.is_empty()) {
        return Envelope::empty(StatusCode::UNPROCESSABLE_ENTITY, "item needs name");
    }

    let summary = match store.set_many(items, overwrite).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Unable to store items");
            return Envelope::empty(StatusCode::INTERNAL_SERVER_ERROR, "unable to create items");
        }
    };

    let status = if summary.all_created() {
        StatusCode::CREATED
    } else if summary.all_failed() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    let message = summary.message();
    reply(status, message, summary.created)
}

async fn get_item<E: KvEngine + 'static>(
    State(store): State<Shared<E>>,
    Path(id): Path<String>,
) -> Reply {
    match store.get(&id).await {
        Ok(Some(item)) => reply(StatusCode::OK, "item retrieved", vec![item]),
        Ok(None) => Envelope::empty(
            StatusCode::NOT_FOUND,
            format!("item with ID {id} doesn't exist"),
        ),
        Err(e) => {
            error!(%id, error = %e, "Unable to get item");
            Envelope::empty(StatusCode::INTERNAL_SERVER_ERROR, "unable to retrieve item")
        }
    }
}

async fn delete_item<E: KvEngine + 'static>(
    State(store): State<Shared<E>>,
    Path(id): Path<String>,
) -> Reply {
    match store.delete(&id).await {
        Ok(()) => Envelope::empty(StatusCode::OK, "item deleted"),
        Err(e) => {
            error!(%id, error = %e, "Unable to delete item");
            Envelope::empty(
                StatusCode::INTERNAL_SERVER_ERROR,
                "an error occurred while trying to delete item",
            )
        }
    }
}
