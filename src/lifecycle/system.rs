//! # Service Bootstrap
//!
//! Each service owns one keyspace and one HTTP server. The keyspace comes from its
//! [`Storage`]: a Redis server, which outlives the process, or an in-process engine actor
//! spawned alongside the server. Starting a service returns a [`ServiceHandle`]; shutting it
//! down stops the server gracefully, which drops the router and with it the last engine
//! client, which in turn ends an in-process engine's loop.
//!
//! ```text
//! ItemService:  Backend("items")  ◄── ItemStore  ◄── axum router ◄── :8080
//! OrderService: Backend("orders") ◄── OrderBuilder ◄── axum router ◄── :9090
//!                                          │
//!                                          └── ItemServiceClient ──► GET :8080/items/{id}
//! ```

use crate::clients::ItemServiceClient;
use crate::lifecycle::Config;
use crate::order_builder::{OrderBuilder, OrderError};
use crate::services::{item_service, order_service};
use crate::store::ItemStore;
use axum::Router;
use kv_actor::{Backend, KvActor, KvError, RedisEngine};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

const ENGINE_BUFFER: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("unable to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("unable to configure item service client: {0}")]
    Client(#[from] OrderError),
    #[error("storage unavailable: {0}")]
    Storage(#[from] KvError),
}

/// Where a service keeps its keyspace.
#[derive(Debug, Clone)]
pub enum Storage {
    /// A fresh engine actor owned by the service. Everything is lost on shutdown.
    InProcess,
    /// A Redis server at the given URL.
    Redis(String),
    /// An engine the caller already runs and keeps alive across service restarts.
    Attached(Backend),
}

impl Storage {
    /// Redis when a URL is configured, otherwise in-process.
    pub fn from_url(url: Option<&str>) -> Self {
        match url {
            Some(url) => Storage::Redis(url.to_string()),
            None => Storage::InProcess,
        }
    }

    async fn open(
        self,
        name: &'static str,
    ) -> Result<(Backend, Option<JoinHandle<()>>), LifecycleError> {
        let opened = match self {
            Storage::InProcess => {
                let (actor, client) = KvActor::named(name, ENGINE_BUFFER);
                (Backend::Local(client), Some(tokio::spawn(actor.run())))
            }
            Storage::Redis(url) => (Backend::Redis(RedisEngine::connect(&url).await?), None),
            Storage::Attached(backend) => (backend, None),
        };
        info!(keyspace = name, storage = opened.0.kind(), "Storage ready");
        Ok(opened)
    }
}

/// A running service.
pub struct ServiceHandle {
    name: &'static str,
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    server: JoinHandle<std::io::Result<()>>,
    engine: Option<JoinHandle<()>>,
}

impl ServiceHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The address actually bound, useful when listening on port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `http://<local addr>`, with an unspecified bind address replaced by loopback.
    pub fn url(&self) -> String {
        let mut addr = self.local_addr;
        if addr.ip().is_unspecified() {
            addr.set_ip(match addr {
                SocketAddr::V4(_) => Ipv4Addr::LOCALHOST.into(),
                SocketAddr::V6(_) => Ipv6Addr::LOCALHOST.into(),
            });
        }
        format!("http://{addr}")
    }

    /// Stops accepting connections, lets in-flight requests finish, then waits for an
    /// owned engine actor to drain.
    pub async fn shutdown(self) -> Result<(), LifecycleError> {
        info!(service = self.name, "Shutting down");
        let _ = self.shutdown.send(());

        self.server.await??;
        if let Some(engine) = self.engine {
            engine.await?;
        }

        info!(service = self.name, "Shutdown complete");
        Ok(())
    }
}

async fn spawn_server(
    name: &'static str,
    address: &str,
    router: Router,
    engine: Option<JoinHandle<()>>,
) -> Result<ServiceHandle, LifecycleError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| LifecycleError::Bind {
            address: address.to_string(),
            source,
        })?;
    let local_addr = listener.local_addr()?;
    let (shutdown, signal) = oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = signal.await;
            })
            .await;
        if let Err(e) = &result {
            error!(service = name, error = %e, "Server error");
        }
        result
    });

    info!(service = name, %local_addr, "Listening");
    Ok(ServiceHandle {
        name,
        local_addr,
        shutdown,
        server,
        engine,
    })
}

/// Starts the item service over `storage`.
pub async fn start_item_service(
    address: &str,
    storage: Storage,
) -> Result<ServiceHandle, LifecycleError> {
    let (backend, engine) = storage.open("items").await?;

    let router = item_service::router(ItemStore::new(backend));
    spawn_server("item", address, router, engine).await
}

/// Starts the order service, reaching the catalog at `item_service`.
pub async fn start_order_service(
    address: &str,
    item_service: &str,
    timeout: Duration,
    storage: Storage,
) -> Result<ServiceHandle, LifecycleError> {
    let lookup = ItemServiceClient::new(item_service, timeout)?;
    info!(item_service = %lookup.base_url(), "Verifying stock against item service");

    let (backend, engine) = storage.open("orders").await?;

    let router = order_service::router(OrderBuilder::new(lookup, backend));
    spawn_server("order", address, router, engine).await
}

/// Both services in one process, the order service wired to the item service's bound
/// address. Each uses Redis when its URL is configured and an in-process engine otherwise.
pub struct Stockroom {
    pub item: ServiceHandle,
    pub order: ServiceHandle,
}

impl Stockroom {
    pub async fn start(config: &Config) -> Result<Self, LifecycleError> {
        let item = start_item_service(
            &config.item_address,
            Storage::from_url(config.item_redis_url.as_deref()),
        )
        .await?;
        let order = match start_order_service(
            &config.order_address,
            &item.url(),
            config.request_timeout,
            Storage::from_url(config.order_redis_url.as_deref()),
        )
        .await
        {
            Ok(order) => order,
            Err(e) => {
                item.shutdown().await?;
                return Err(e);
            }
        };
        Ok(Self { item, order })
    }

    /// Stops the order service first so no build is left talking to a closed catalog.
    pub async fn shutdown(self) -> Result<(), LifecycleError> {
        self.order.shutdown().await?;
        self.item.shutdown().await
    }
}
