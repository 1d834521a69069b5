use crate::{
    app_state::AppState,
    domain::{CreateSubscription, Subscription},
    repository::{CostQuery, RepositoryError, SubscriptionRepository},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/subscriptions",
            get(list_subscriptions).post(create_subscription),
        )
        .route("/subscriptions/total", get(total_cost))
        .route(
            "/subscriptions/:id",
            get(get_subscription)
                .put(update_subscription)
                .delete(delete_subscription),
        )
}

#[tracing::instrument(name = "List subscriptions", skip(repository))]
async fn list_subscriptions(
    State(repository): State<SubscriptionRepository>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Subscription>>, ApiError> {
    let limit = pagination
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(0, MAX_PAGE_SIZE);
    let offset = pagination.offset.unwrap_or(0).max(0);

    let subscriptions = repository.list(limit, offset).await?;

    Ok(Json(subscriptions))
}

#[tracing::instrument(name = "Create a subscription", skip(repository, payload))]
async fn create_subscription(
    State(repository): State<SubscriptionRepository>,
    payload: Result<Json<CreateSubscription>, JsonRejection>,
) -> Result<(StatusCode, Json<Subscription>), ApiError> {
    let Json(payload) = payload?;

    let subscription = repository.create(payload).await?;

    Ok((StatusCode::CREATED, Json(subscription)))
}

#[tracing::instrument(name = "Get a subscription", skip(repository))]
async fn get_subscription(
    State(repository): State<SubscriptionRepository>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Subscription>, ApiError> {
    let Path(id) = id?;

    let subscription = repository.get(id).await?;

    Ok(Json(subscription))
}

#[tracing::instrument(name = "Update a subscription", skip(repository, payload))]
async fn update_subscription(
    State(repository): State<SubscriptionRepository>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CreateSubscription>, JsonRejection>,
) -> Result<Json<Subscription>, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;

    let subscription = repository.update(id, payload).await?;

    Ok(Json(subscription))
}

#[tracing::instrument(name = "Delete a subscription", skip(repository))]
async fn delete_subscription(
    State(repository): State<SubscriptionRepository>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;

    repository.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(name = "Sum subscription costs", skip(repository))]
async fn total_cost(
    State(repository): State<SubscriptionRepository>,
    Query(params): Query<CostParams>,
) -> Result<Json<TotalCost>, ApiError> {
    let date_from = params
        .date_from
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("date_from is required".into()))?;
    let date_to = params
        .date_to
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("date_to is required".into()))?;

    let total_price = repository
        .total_cost(CostQuery {
            date_from,
            date_to,
            user_id: params.user_id,
            service_name: params.service_name,
        })
        .await?;

    Ok(Json(TotalCost { total_price }))
}

#[derive(Debug, Deserialize)]
struct Pagination {
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CostParams {
    date_from: Option<String>,
    date_to: Option<String>,
    user_id: Option<String>,
    service_name: Option<String>,
}

#[derive(Serialize)]
struct TotalCost {
    total_price: i64,
}

#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Subscription not found")]
    NotFound,
    #[error("Something went wrong")]
    Unexpected(#[source] RepositoryError),
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Validation(e) => Self::BadRequest(e.to_string()),
            RepositoryError::NotFound => Self::NotFound,
            e => Self::Unexpected(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(_: JsonRejection) -> Self {
        Self::BadRequest("Invalid request body".into())
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        Self::BadRequest("Invalid subscription id".into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("{:#?}", self);

        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(ErrorBody {
                status: "error",
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}
