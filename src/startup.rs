use crate::{
    app_state::AppState,
    configuration::{DatabaseSettings, Settings},
    routes::{health_check, subscriptions},
    telemetry::{request_span, RequestUuid},
};
use axum::{serve::Serve, Router};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{net::SocketAddr, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

const POOL_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Application {
    local_addr: SocketAddr,
    server: Serve<Router, Router>,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, std::io::Error> {
        let db_pool = get_connection_pool(&configuration.database);

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address).await?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            local_addr,
            server: run(listener, db_pool),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        tracing::info!("Listening on {}", self.local_addr);
        self.server.await
    }
}

pub fn get_connection_pool(configuration: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(POOL_ACQUIRE_TIMEOUT)
        .connect_lazy_with(configuration.with_db())
}

pub fn run(listener: TcpListener, db_pool: PgPool) -> Serve<Router, Router> {
    let api = Router::new()
        .merge(health_check::router())
        .merge(subscriptions::router());

    let app = Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(RequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
        )
        .with_state(AppState::new(db_pool));

    axum::serve(listener, app)
}
