use crate::app_state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use sqlx::{Connection, PgPool};

pub fn router() -> Router<AppState> {
    Router::new().route("/healthcheck", get(health_check))
}

#[tracing::instrument(name = "Health check", skip(db_pool))]
async fn health_check(State(db_pool): State<PgPool>) -> (StatusCode, Json<Health>) {
    match ping(&db_pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(Health {
                status: "ok",
                message: "success",
            }),
        ),
        Err(e) => {
            tracing::error!("Database ping failed: {e:?}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Health {
                    status: "fail",
                    message: "database not reachable",
                }),
            )
        }
    }
}

async fn ping(db_pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut conn = db_pool.acquire().await?;
    conn.ping().await
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    message: &'static str,
}
