use crate::repository::SubscriptionRepository;
use axum::extract::FromRef;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub subscriptions: SubscriptionRepository,
}

impl AppState {
    pub fn new(db_pool: PgPool) -> Self {
        Self {
            subscriptions: SubscriptionRepository::new(db_pool.clone()),
            db_pool,
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.db_pool.clone()
    }
}

impl FromRef<AppState> for SubscriptionRepository {
    fn from_ref(state: &AppState) -> Self {
        state.subscriptions.clone()
    }
}
