use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::info;

use crate::{
    application::usecases::subscriptions::SubscriptionUseCase,
    domain::repositories::subscriptions::SubscriptionRepository,
    infrastructure::{
        axum_http::{auth::AuthUser, error_responses::error_response},
        postgres::{
            postgres_connection::PgPoolSquad, repositories::subscriptions::SubscriptionPostgres,
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let subscriptions_usecase = SubscriptionUseCase::new(Arc::new(subscription_repository));

    Router::new()
        .route("/current", get(current_subscription))
        .route("/cancel", post(cancel_subscription))
        .with_state(Arc::new(subscriptions_usecase))
}

pub async fn cancel_subscription<S>(
    State(usecase): State<Arc<SubscriptionUseCase<S>>>,
    AuthUser { user_id }: AuthUser,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    info!(%user_id, "subscriptions router: cancel request received");
    match usecase.cancel(user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn current_subscription<S>(
    State(usecase): State<Arc<SubscriptionUseCase<S>>>,
    AuthUser { user_id }: AuthUser,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    match usecase.current(user_id).await {
        Ok(current) => Json(current).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
