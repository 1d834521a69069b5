use super::ServiceName;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// A persisted subscription record. `id` and `created_at` are assigned at
/// insertion time and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: ServiceName,
    pub price: i32,
    pub user_id: String,
    pub start_date: Date,
    /// `None` means the subscription is ongoing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
