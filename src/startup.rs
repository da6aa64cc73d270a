use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::configuration::{DatabaseSettings, Settings, StoreKind};
use crate::routes::{
    health_check, inbound_json_webhook, inbound_twiml_webhook, send_sms, sms_health, subscribe,
};
use crate::subscriber_store::{InMemorySubscriberStore, PostgresSubscriberStore, SubscriberStore};
use crate::AppState;

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    subscriber_store: Arc<dyn SubscriberStore>,
}

impl Application {
    pub async fn build(configuration: Settings) -> anyhow::Result<Self> {
        let subscriber_store: Arc<dyn SubscriberStore> = match configuration.application.store {
            StoreKind::Postgres => {
                let store = PostgresSubscriberStore::new(get_connection_pool(
                    &configuration.database,
                ));
                if configuration.database.migrate_on_startup {
                    store.migrate().await?;
                }
                Arc::new(store)
            }
            StoreKind::InMemory => Arc::new(InMemorySubscriberStore::new()),
        };
        let sms_client = Arc::new(configuration.sms.client()?);

        let app_state = AppState {
            subscriber_store: subscriber_store.clone(),
            sms_client,
            keywords: Arc::new(configuration.keywords),
        };

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind {address}"))?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router: router(app_state),
            subscriber_store,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Shared handle on the store the running application writes to.
    pub fn subscriber_store(&self) -> Arc<dyn SubscriberStore> {
        self.subscriber_store.clone()
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        tracing::info!(port = self.port, "Listening");
        axum::serve(self.listener, self.router).await
    }
}

pub fn get_connection_pool(configuration: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(configuration.with_db())
}

pub fn router(app_state: AppState) -> Router {
    let http_tracing = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    Router::new()
        .route("/health_check", get(health_check))
        .route("/subscriptions", post(subscribe))
        .route("/webhooks/inbound", post(inbound_json_webhook))
        .route("/webhooks/twiml", post(inbound_twiml_webhook))
        .route("/sms/send", post(send_sms))
        .route("/sms/health", get(sms_health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(http_tracing)
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(app_state)
}
