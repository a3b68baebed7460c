use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use kv_actor::{Backend, KvActor, KvEngine};
use serde_json::{json, Value};
use std::time::Duration;
use stockroom::clients::{ItemLookup, ItemServiceClient};
use stockroom::lifecycle::{start_item_service, start_order_service, Config, Stockroom, Storage};
use stockroom::model::{Item, Order};
use stockroom::order_builder::OrderError;
use stockroom::response::Envelope;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

fn local_config() -> Config {
    Config {
        item_address: "127.0.0.1:0".into(),
        order_address: "127.0.0.1:0".into(),
        ..Config::default()
    }
}

async fn send(request: reqwest::RequestBuilder) -> (u16, Value) {
    let response = request.send().await.expect("request failed");
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.expect("body is not json");
    (status, body)
}

/// Full round trip: stock the catalog, then order against it through the order service.
#[tokio::test]
async fn test_stock_then_order() {
    let system = Stockroom::start(&local_config()).await.unwrap();
    let http = reqwest::Client::new();
    let items_url = format!("{}/items", system.item.url());
    let orders_url = format!("{}/orders", system.order.url());

    let widget = Item::new("Widget", "blue", 10).unwrap();
    let gizmo = Item::new("Gizmo", "", 2).unwrap();

    let (status, body) = send(http.post(&items_url).json(&json!([
        {"name": "Widget", "desc": "blue", "qty": 10},
        {"name": "Gizmo", "qty": 2}
    ])))
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["count"], 2);

    // Re-posting one existing and one new entry is a partial success.
    let (status, body) = send(http.post(&items_url).json(&json!([
        {"name": "Widget", "qty": 1},
        {"name": "Doohickey", "qty": 4}
    ])))
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["count"], 1);

    let (status, _) = send(http.post(&items_url).json(&json!([{"name": "Gizmo", "qty": 9}]))).await;
    assert_eq!(status, 422);

    let (status, body) = send(http.get(format!("{items_url}/{}", widget.id))).await;
    assert_eq!(status, 200);
    let stored: Envelope<Item> = serde_json::from_value(body).unwrap();
    assert_eq!(stored.into_data(), vec![widget.clone()]);

    let (status, body) = send(http.post(format!("{orders_url}/create")).json(&json!({
        "items": [{"id": widget.id, "qty": 10}, {"id": gizmo.id, "qty": 1}]
    })))
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["message"], "order 1 created");

    let (status, body) = send(http.get(format!("{orders_url}/1"))).await;
    assert_eq!(status, 200);
    let orders: Envelope<Order> = serde_json::from_value(body).unwrap();
    let order = &orders.into_data()[0];
    assert_eq!(order.id.0, 1);
    assert_eq!(order.lines.len(), 2);

    // Orders do not decrement stock.
    let (status, body) = send(http.get(format!("{items_url}/{}", widget.id))).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"][0]["qty"], 10);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_order_rejections() {
    let system = Stockroom::start(&local_config()).await.unwrap();
    let http = reqwest::Client::new();
    let items_url = format!("{}/items", system.item.url());
    let create_url = format!("{}/orders/create", system.order.url());

    let widget = Item::new("Widget", "", 3).unwrap();
    let (status, _) = send(http.put(&items_url).json(&json!([{"name": "Widget", "qty": 3}]))).await;
    assert_eq!(status, 201);

    let (status, body) = send(
        http.post(&create_url)
            .json(&json!({"items": [{"id": widget.id, "qty": 4}]})),
    )
    .await;
    assert_eq!(status, 422);
    assert!(body["message"].as_str().unwrap().contains("insufficient stock"));

    let (status, _) = send(
        http.post(&create_url)
            .json(&json!({"items": [{"id": "nosuchid", "qty": 1}]})),
    )
    .await;
    assert_eq!(status, 404);

    let (status, _) = send(http.post(&create_url).json(&json!({"items": []}))).await;
    assert_eq!(status, 422);

    let (status, body) = send(http.post(&create_url).body("{not json")).await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "unable to parse payload");

    // Two rejected builds consumed ids 1 and 2; none was stored.
    let (status, body) = send(http.get(format!("{}/orders", system.order.url()))).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "no orders present");

    let (status, body) = send(
        http.post(&create_url)
            .json(&json!({"items": [{"id": widget.id, "qty": 3}]})),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["message"], "order 3 created");

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_item_service_edges() {
    let system = Stockroom::start(&local_config()).await.unwrap();
    let http = reqwest::Client::new();
    let base = system.item.url();

    let (status, body) = send(http.get(format!("{base}/items"))).await;
    assert_eq!(status, 404);
    assert_eq!(body["data"], Value::Null);

    let (status, body) = send(http.post(format!("{base}/items")).json(&json!([]))).await;
    assert_eq!(status, 422);
    assert_eq!(body["message"], "items can't be empty");

    let (status, body) = send(http.post(format!("{base}/items")).json(&json!([{"name": "", "qty": 1}]))).await;
    assert_eq!(status, 422);
    assert_eq!(body["message"], "item needs name");

    let (status, body) = send(http.get(format!("{base}/nowhere"))).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "resource not found");

    let (status, body) = send(http.get(format!("{base}/healthz"))).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "healthy");

    let widget = Item::new("Widget", "", 1).unwrap();
    send(http.post(format!("{base}/items")).json(&json!([{"name": "Widget", "qty": 1}]))).await;
    let (status, _) = send(http.delete(format!("{base}/items/{}", widget.id))).await;
    assert_eq!(status, 200);
    let (status, _) = send(http.get(format!("{base}/items/{}", widget.id))).await;
    assert_eq!(status, 404);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_lookup_against_unreachable_service() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ItemServiceClient::new(&addr.to_string(), Duration::from_secs(1)).unwrap();
    let result = client.fetch("abc").await;
    assert!(matches!(result, Err(OrderError::Transport(_))));
}

#[tokio::test]
async fn test_lookup_against_garbled_service() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/items/{id}", get(|| async { "definitely not json" }));
    let server = tokio::spawn(async move { axum::serve(listener, app).await });

    let client = ItemServiceClient::new(&format!("http://{addr}"), Duration::from_secs(1)).unwrap();
    let result = client.fetch("abc").await;
    assert!(matches!(result, Err(OrderError::Protocol(_))));

    server.abort();
}

/// Serves `body` with `status` for every `GET /items/{id}`.
async fn stub_item_service(
    status: StatusCode,
    body: Value,
) -> (ItemServiceClient, JoinHandle<std::io::Result<()>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route(
        "/items/{id}",
        get(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );
    let server = tokio::spawn(async move { axum::serve(listener, app).await });

    let client = ItemServiceClient::new(&format!("http://{addr}"), Duration::from_secs(1)).unwrap();
    (client, server)
}

fn abc() -> Value {
    json!({"id": "abc", "name": "Widget", "desc": "", "qty": 5})
}

#[tokio::test]
async fn test_lookup_finds_matching_entry() {
    let (client, server) = stub_item_service(
        StatusCode::OK,
        json!({"status": 200, "message": "item retrieved", "count": 1, "data": [abc()]}),
    )
    .await;

    let item = client.fetch("abc").await.unwrap();
    assert_eq!(item.qty, 5);

    server.abort();
}

#[tokio::test]
async fn test_lookup_envelope_status_not_found() {
    // The transport status says OK but the envelope says 404; the envelope wins.
    let (client, server) = stub_item_service(
        StatusCode::OK,
        json!({"status": 404, "message": "item not found", "count": 1, "data": [abc()]}),
    )
    .await;

    assert!(matches!(client.fetch("abc").await, Err(OrderError::NotFound(id)) if id == "abc"));

    server.abort();
}

#[tokio::test]
async fn test_lookup_empty_envelope() {
    let (client, server) = stub_item_service(
        StatusCode::OK,
        json!({"status": 200, "message": "item retrieved", "count": 0, "data": null}),
    )
    .await;

    assert!(matches!(client.fetch("abc").await, Err(OrderError::NotFound(id)) if id == "abc"));

    server.abort();
}

#[tokio::test]
async fn test_lookup_envelope_for_another_item() {
    let other = json!({"id": "xyz", "name": "Gizmo", "desc": "", "qty": 50});
    let (client, server) = stub_item_service(
        StatusCode::OK,
        json!({"status": 200, "message": "item retrieved", "count": 1, "data": [other]}),
    )
    .await;

    assert!(matches!(client.fetch("abc").await, Err(OrderError::NotFound(id)) if id == "abc"));

    server.abort();
}

#[tokio::test]
async fn test_lookup_server_error() {
    let (client, server) = stub_item_service(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"status": 500, "message": "boom", "count": 0, "data": null}),
    )
    .await;

    assert!(matches!(client.fetch("abc").await, Err(OrderError::Transport(_))));

    server.abort();
}

/// Order ids come from the keyspace, not the process: an order service restarted against
/// the same engine keeps counting where the last one stopped.
#[tokio::test]
async fn test_order_ids_survive_restart() {
    let (actor, orders) = KvActor::named("orders", 16);
    let orders_engine = tokio::spawn(actor.run());

    let item = start_item_service("127.0.0.1:0", Storage::InProcess).await.unwrap();
    let http = reqwest::Client::new();
    let widget = Item::new("Widget", "", 5).unwrap();
    let (status, _) = send(
        http.post(format!("{}/items", item.url()))
            .json(&json!([{"name": "Widget", "qty": 5}])),
    )
    .await;
    assert_eq!(status, 201);

    let mut messages = Vec::new();
    for _ in 0..2 {
        let order = start_order_service(
            "127.0.0.1:0",
            &item.url(),
            Duration::from_secs(1),
            Storage::Attached(Backend::from(orders.clone())),
        )
        .await
        .unwrap();

        let (status, body) = send(
            http.post(format!("{}/orders/create", order.url()))
                .json(&json!({"items": [{"id": widget.id, "qty": 1}]})),
        )
        .await;
        assert_eq!(status, 201);
        messages.push(body["message"].as_str().unwrap().to_string());

        order.shutdown().await.unwrap();
    }
    assert_eq!(messages, vec!["order 1 created", "order 2 created"]);

    let mut stored = orders.scan_all(Some("order:*")).await.unwrap();
    stored.sort();
    assert_eq!(stored, vec!["order:1", "order:2"]);

    item.shutdown().await.unwrap();
    drop(orders);
    orders_engine.await.unwrap();
}

/// The same restart against Redis, when `STOCKROOM_TEST_REDIS_URL` points at a scratch
/// database. Skipped otherwise.
#[tokio::test]
async fn test_order_ids_survive_restart_on_redis() {
    let Ok(url) = std::env::var("STOCKROOM_TEST_REDIS_URL") else {
        return;
    };
    let scratch = kv_actor::RedisEngine::connect(&url).await.unwrap();
    let mut stale = scratch.scan_all(Some("order:*")).await.unwrap();
    stale.push("nextID".into());
    scratch.del(stale).await.unwrap();

    let item = start_item_service("127.0.0.1:0", Storage::InProcess).await.unwrap();
    let http = reqwest::Client::new();
    let widget = Item::new("Widget", "", 5).unwrap();
    send(
        http.post(format!("{}/items", item.url()))
            .json(&json!([{"name": "Widget", "qty": 5}])),
    )
    .await;

    let mut messages = Vec::new();
    for _ in 0..2 {
        let order = start_order_service(
            "127.0.0.1:0",
            &item.url(),
            Duration::from_secs(1),
            Storage::Redis(url.clone()),
        )
        .await
        .unwrap();
        let (_, body) = send(
            http.post(format!("{}/orders/create", order.url()))
                .json(&json!({"items": [{"id": widget.id, "qty": 1}]})),
        )
        .await;
        messages.push(body["message"].as_str().unwrap().to_string());
        order.shutdown().await.unwrap();
    }
    assert_eq!(messages, vec!["order 1 created", "order 2 created"]);

    item.shutdown().await.unwrap();
}
