//! Routes of the order service.
//!
//! | Method | Path | |
//! |--------|------|-|
//! | GET | `/` | pong |
//! | GET | `/healthz` | health |
//! | GET | `/orders` | every order, by id |
//! | GET | `/orders/{id}` | one order |
//! | POST | `/orders/create` | build an order from `{"items": [{"id", "qty"}]}` |

use super::{healthz, pong, reply, with_common_layers, Reply};
use crate::clients::ItemLookup;
use crate::model::{OrderId, OrderLine};
use crate::order_builder::OrderBuilder;
use crate::response::Envelope;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use kv_actor::KvEngine;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};

type Shared<L, E> = Arc<OrderBuilder<L, E>>;

/// Body of `POST /orders/create`.
#[derive(Debug, Deserialize)]
pub struct CreateOrder {
    pub items: Vec<OrderLine>,
}

pub fn router<L, E>(builder: OrderBuilder<L, E>) -> Router
where
    L: ItemLookup + 'static,
    E: KvEngine + 'static,
{
    let routes = Router::new()
        .route("/", get(pong))
        .route("/healthz", get(healthz))
        .route("/orders", get(list_orders::<L, E>))
        .route("/orders/create", post(create_order::<L, E>))
        .route("/orders/{id}", get(get_order::<L, E>))
        .with_state(Arc::new(builder));
    with_common_layers(routes)
}

async fn list_orders<L, E>(State(builder): State<Shared<L, E>>) -> Reply
where
    L: ItemLookup + 'static,
    E: KvEngine + 'static,
{
    match builder.orders().get_all().await {
        Ok(orders) if orders.is_empty() => {
            Envelope::empty(StatusCode::NOT_FOUND, "no orders present")
        }
        Ok(mut orders) => {
            orders.sort_by_key(|order| order.id);
            reply(StatusCode::OK, "orders retrieved", orders)
        }
        Err(e) => {
            error!(error = %e, "Unable to list orders");
            Envelope::empty(StatusCode::INTERNAL_SERVER_ERROR, "unable to retrieve orders")
        }
    }
}

async fn get_order<L, E>(State(builder): State<Shared<L, E>>, Path(raw): Path<String>) -> Reply
where
    L: ItemLookup + 'static,
    E: KvEngine + 'static,
{
    let id: OrderId = match raw.parse() {
        Ok(id) => id,
        Err(_) => return Envelope::empty(StatusCode::BAD_REQUEST, "invalid order ID"),
    };
    match builder.orders().get_order(id).await {
        Ok(Some(order)) => reply(StatusCode::OK, "order retrieved", vec![order]),
        Ok(None) => Envelope::empty(
            StatusCode::NOT_FOUND,
            format!("order with ID {id} doesn't exist"),
        ),
        Err(e) => {
            error!(%id, error = %e, "Unable to get order");
            Envelope::empty(StatusCode::INTERNAL_SERVER_ERROR, "unable to retrieve order")
        }
    }
}

async fn create_order<L, E>(State(builder): State<Shared<L, E>>, body: Bytes) -> Reply
where
    L: ItemLookup + 'static,
    E: KvEngine + 'static,
{
    let request: CreateOrder = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "Unable to parse payload");
            return Envelope::empty(StatusCode::BAD_REQUEST, "unable to parse payload");
        }
    };

    match builder.build(request.items).await {
        Ok(order) => reply(
            StatusCode::CREATED,
            format!("order {} created", order.id),
            vec![order],
        ),
        Err(e) => Envelope::empty(e.status_code(), e.to_string()),
    }
}
