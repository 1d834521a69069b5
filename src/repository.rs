use crate::domain::{parse_date, CreateSubscription, NewSubscription, Subscription, ValidationError};
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::Date;
use uuid::Uuid;

/// Sole owner of subscription SQL. Every statement binds its values through
/// positional placeholders; filter values are never interpolated into the
/// query text.
#[derive(Clone)]
pub struct SubscriptionRepository {
    db_pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    #[tracing::instrument(name = "List subscriptions", skip(self))]
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Subscription>, RepositoryError> {
        let subscriptions = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, service_name, price, user_id, start_date, end_date, created_at
            FROM subscriptions
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(subscriptions)
    }

    #[tracing::instrument(name = "Insert a subscription", skip(self, input))]
    pub async fn create(&self, input: CreateSubscription) -> Result<Subscription, RepositoryError> {
        let new = NewSubscription::try_from(input)?;

        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (id, service_name, price, user_id, start_date, end_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, now())
            RETURNING id, service_name, price, user_id, start_date, end_date, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.service_name.as_ref())
        .bind(new.price)
        .bind(new.user_id.as_str())
        .bind(new.start_date)
        .bind(new.end_date)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(subscription)
    }

    #[tracing::instrument(name = "Get a subscription by id", skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Subscription, RepositoryError> {
        sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, service_name, price, user_id, start_date, end_date, created_at
            FROM subscriptions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Replaces every mutable field; `id` and `created_at` are left untouched.
    #[tracing::instrument(name = "Update a subscription", skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: CreateSubscription,
    ) -> Result<Subscription, RepositoryError> {
        let changes = NewSubscription::try_from(input)?;

        sqlx::query_as::<_, Subscription>(
            r#"
            UPDATE subscriptions
            SET service_name = $1, price = $2, user_id = $3, start_date = $4, end_date = $5
            WHERE id = $6
            RETURNING id, service_name, price, user_id, start_date, end_date, created_at
            "#,
        )
        .bind(changes.service_name.as_ref())
        .bind(changes.price)
        .bind(changes.user_id.as_str())
        .bind(changes.start_date)
        .bind(changes.end_date)
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    #[tracing::instrument(name = "Delete a subscription", skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Sums `price` over subscriptions whose `start_date` falls within the
    /// requested range, narrowed by the optional filters. Yields `0` when
    /// nothing matches.
    #[tracing::instrument(name = "Sum subscription costs", skip(self))]
    pub async fn total_cost(&self, query: CostQuery) -> Result<i64, RepositoryError> {
        let filter = CostFilter::try_from(query)?;

        let mut builder = build_total_cost_query(&filter);
        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.db_pool)
            .await?;

        Ok(total)
    }
}

/// Raw aggregate parameters as they arrive from the query string. Empty
/// optional filters are treated as absent.
#[derive(Debug)]
pub struct CostQuery {
    pub date_from: String,
    pub date_to: String,
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

#[derive(Debug)]
struct CostFilter {
    date_from: Date,
    date_to: Date,
    user_id: Option<String>,
    service_name: Option<String>,
}

impl TryFrom<CostQuery> for CostFilter {
    type Error = ValidationError;

    fn try_from(query: CostQuery) -> Result<Self, Self::Error> {
        let date_from = parse_date(&query.date_from)
            .map_err(|_| ValidationError::InvalidDateFrom(query.date_from.clone()))?;
        let date_to = parse_date(&query.date_to)
            .map_err(|_| ValidationError::InvalidDateTo(query.date_to.clone()))?;

        Ok(Self {
            date_from,
            date_to,
            user_id: query.user_id.filter(|v| !v.is_empty()),
            service_name: query.service_name.filter(|v| !v.is_empty()),
        })
    }
}

/// Appends predicate clauses and their bind values in lockstep, so the
/// placeholder numbering always matches the argument order.
fn build_total_cost_query(filter: &CostFilter) -> QueryBuilder<'_, Postgres> {
    let mut builder: QueryBuilder<'_, Postgres> =
        QueryBuilder::new("SELECT COALESCE(SUM(price), 0) FROM subscriptions WHERE start_date >= ");
    builder.push_bind(filter.date_from);
    builder.push(" AND start_date <= ");
    builder.push_bind(filter.date_to);

    if let Some(user_id) = &filter.user_id {
        builder.push(" AND user_id = ").push_bind(user_id.as_str());
    }

    if let Some(service_name) = &filter.service_name {
        builder
            .push(" AND service_name ILIKE ")
            .push_bind(format!("%{service_name}%"));
    }

    builder
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Subscription not found")]
    NotFound,
    #[error(transparent)]
    Query(#[from] sqlx::Error),
}
