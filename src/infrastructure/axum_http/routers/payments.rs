use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    application::usecases::payments::{DarajaGateway, PaymentUseCase},
    domain::{
        repositories::payment_intents::PaymentIntentRepository,
        value_objects::{payments::InitiatePaymentModel, stk_callback::StkCallbackEnvelope},
    },
    infrastructure::{
        axum_http::{auth::AuthUser, error_responses::error_response},
        mpesa::daraja_client::DarajaClient,
        postgres::{
            postgres_connection::PgPoolSquad, repositories::payment_intents::PaymentIntentPostgres,
        },
    },
};

const DEFAULT_HISTORY_LIMIT: i64 = 20;
const MAX_HISTORY_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    page: Option<i64>,
    limit: Option<i64>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, daraja_client: Arc<DarajaClient>) -> Router {
    let payment_intent_repository = PaymentIntentPostgres::new(Arc::clone(&db_pool));
    let payments_usecase =
        PaymentUseCase::new(Arc::new(payment_intent_repository), daraja_client);

    Router::new()
        .route("/initiate", post(initiate_payment))
        .route("/callback", post(provider_callback))
        .route("/status/:intent_id", get(payment_status))
        .route("/history", get(payment_history))
        .with_state(Arc::new(payments_usecase))
}

pub async fn initiate_payment<P, G>(
    State(usecase): State<Arc<PaymentUseCase<P, G>>>,
    AuthUser { user_id }: AuthUser,
    Json(model): Json<InitiatePaymentModel>,
) -> impl IntoResponse
where
    P: PaymentIntentRepository + Send + Sync + 'static,
    G: DarajaGateway + Send + Sync + 'static,
{
    info!(%user_id, "payments router: initiate request received");
    match usecase.initiate(user_id, model).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

/// Provider-trusted webhook; no bearer auth. Acknowledges with
/// `{"success": true}` once processing completes, regardless of whether the
/// underlying payment succeeded or failed.
pub async fn provider_callback<P, G>(
    State(usecase): State<Arc<PaymentUseCase<P, G>>>,
    Json(envelope): Json<StkCallbackEnvelope>,
) -> impl IntoResponse
where
    P: PaymentIntentRepository + Send + Sync + 'static,
    G: DarajaGateway + Send + Sync + 'static,
{
    match usecase.handle_callback(envelope).await {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(err) => {
            error!(error = ?err, "payments router: callback processing failed");
            error_response(err.status_code(), err.to_string())
        }
    }
}

pub async fn payment_status<P, G>(
    State(usecase): State<Arc<PaymentUseCase<P, G>>>,
    AuthUser { user_id }: AuthUser,
    Path(intent_id): Path<Uuid>,
) -> impl IntoResponse
where
    P: PaymentIntentRepository + Send + Sync + 'static,
    G: DarajaGateway + Send + Sync + 'static,
{
    match usecase.payment_status(user_id, intent_id).await {
        Ok(dto) => Json(dto).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn payment_history<P, G>(
    State(usecase): State<Arc<PaymentUseCase<P, G>>>,
    AuthUser { user_id }: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse
where
    P: PaymentIntentRepository + Send + Sync + 'static,
    G: DarajaGateway + Send + Sync + 'static,
{
    let page = query.page.unwrap_or(1);
    if page < 1 {
        return error_response(StatusCode::BAD_REQUEST, "page must be >= 1");
    }

    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if limit < 1 {
        return error_response(StatusCode::BAD_REQUEST, "limit must be a positive number");
    }
    if limit > MAX_HISTORY_LIMIT {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("limit must be <= {}", MAX_HISTORY_LIMIT),
        );
    }

    match usecase.payment_history(user_id, page, limit).await {
        Ok(history) => Json(history).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
