use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    domain::{
        entities::payment_intents::InsertPaymentIntentEntity,
        repositories::payment_intents::PaymentIntentRepository,
        value_objects::{
            enums::{payment_intent_statuses::PaymentIntentStatus, plan_tiers::PlanTier},
            payments::{
                CompletionOutcome, InitiatePaymentModel, InitiatePaymentResponse,
                PaymentIntentDto, is_valid_msisdn,
            },
            stk_callback::StkCallbackEnvelope,
        },
    },
    infrastructure::mpesa::daraja_client::{DarajaClient, StkPushResponse},
};

const CURRENCY: &str = "KES";
const TRANSACTION_DESC: &str = "Elimu Hub subscription";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DarajaGateway: Send + Sync {
    async fn stk_push(
        &self,
        phone_number: &str,
        amount: i32,
        account_reference: &str,
        transaction_desc: &str,
    ) -> AnyResult<StkPushResponse>;
}

#[async_trait]
impl DarajaGateway for DarajaClient {
    async fn stk_push(
        &self,
        phone_number: &str,
        amount: i32,
        account_reference: &str,
        transaction_desc: &str,
    ) -> AnyResult<StkPushResponse> {
        self.stk_push(phone_number, amount, account_reference, transaction_desc)
            .await
    }
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("invalid payment request: {0}")]
    Validation(String),
    #[error("unknown plan")]
    UnknownPlan,
    #[error("payment could not be started: {0}")]
    Provider(String),
    #[error("checkout request id already assigned for this intent")]
    CorrelationConflict,
    #[error("payment intent not found")]
    NotFound,
    #[error("invalid provider callback: {0}")]
    InvalidCallback(String),
    #[error("callback reconciliation failed: {0}")]
    Reconciliation(anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PaymentError::Validation(_)
            | PaymentError::UnknownPlan
            | PaymentError::InvalidCallback(_) => StatusCode::BAD_REQUEST,
            PaymentError::Provider(_) => StatusCode::BAD_GATEWAY,
            PaymentError::NotFound => StatusCode::NOT_FOUND,
            PaymentError::CorrelationConflict
            | PaymentError::Reconciliation(_)
            | PaymentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type PaymentResult<T> = std::result::Result<T, PaymentError>;

/// Reconciles locally created payment intents with the provider's
/// asynchronous STK push results, activating the funded subscription exactly
/// once per successful payment.
pub struct PaymentUseCase<P, G>
where
    P: PaymentIntentRepository + Send + Sync + 'static,
    G: DarajaGateway + Send + Sync + 'static,
{
    payment_intent_repo: Arc<P>,
    daraja_client: Arc<G>,
}

impl<P, G> PaymentUseCase<P, G>
where
    P: PaymentIntentRepository + Send + Sync + 'static,
    G: DarajaGateway + Send + Sync + 'static,
{
    pub fn new(payment_intent_repo: Arc<P>, daraja_client: Arc<G>) -> Self {
        Self {
            payment_intent_repo,
            daraja_client,
        }
    }

    pub async fn initiate(
        &self,
        user_id: Uuid,
        model: InitiatePaymentModel,
    ) -> PaymentResult<InitiatePaymentResponse> {
        info!(
            %user_id,
            plan = %model.plan,
            amount = model.amount,
            "payments: initiate requested"
        );

        if !is_valid_msisdn(&model.phone_number) {
            let err = PaymentError::Validation(
                "phone_number must be in 2547XXXXXXXX format".to_string(),
            );
            warn!(%user_id, status = err.status_code().as_u16(), "payments: invalid phone number");
            return Err(err);
        }

        if model.amount <= 0 {
            let err = PaymentError::Validation("amount must be positive".to_string());
            warn!(%user_id, status = err.status_code().as_u16(), "payments: non-positive amount");
            return Err(err);
        }

        let plan = PlanTier::from_str(&model.plan).ok_or_else(|| {
            let err = PaymentError::UnknownPlan;
            warn!(
                %user_id,
                plan = %model.plan,
                status = err.status_code().as_u16(),
                "payments: unknown plan"
            );
            err
        })?;

        let intent = self
            .payment_intent_repo
            .create(InsertPaymentIntentEntity {
                user_id,
                amount: model.amount,
                currency: CURRENCY.to_string(),
                plan: plan.to_string(),
                phone_number: model.phone_number.clone(),
                status: PaymentIntentStatus::Pending.to_string(),
            })
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "payments: failed to create payment intent");
                PaymentError::Internal(err)
            })?;

        let push = match self
            .daraja_client
            .stk_push(
                &model.phone_number,
                model.amount,
                &intent.id.to_string(),
                TRANSACTION_DESC,
            )
            .await
        {
            Ok(push) => push,
            Err(err) => {
                // Synchronous provider rejection: no callback will ever
                // arrive for this intent, so finalize it now.
                error!(
                    %user_id,
                    intent_id = %intent.id,
                    error = ?err,
                    "payments: provider rejected push payment request"
                );
                let reason = err.to_string();
                if let Err(mark_err) = self
                    .payment_intent_repo
                    .mark_failed(intent.id, reason.clone())
                    .await
                {
                    error!(
                        intent_id = %intent.id,
                        db_error = ?mark_err,
                        "payments: failed to mark rejected intent failed"
                    );
                }
                return Err(PaymentError::Provider(reason));
            }
        };

        let assigned = self
            .payment_intent_repo
            .assign_checkout_request_id(intent.id, &push.checkout_request_id)
            .await
            .map_err(|err| {
                error!(
                    intent_id = %intent.id,
                    db_error = ?err,
                    "payments: failed to store checkout request id"
                );
                PaymentError::Internal(err)
            })?;

        if !assigned {
            // Should be impossible given the causal ordering of initiation;
            // a conflict here means corrupted state, not a retryable race.
            let err = PaymentError::CorrelationConflict;
            error!(
                intent_id = %intent.id,
                checkout_request_id = %push.checkout_request_id,
                "payments: checkout request id already assigned"
            );
            return Err(err);
        }

        info!(
            %user_id,
            intent_id = %intent.id,
            checkout_request_id = %push.checkout_request_id,
            "payments: push payment initiated"
        );

        Ok(InitiatePaymentResponse {
            intent_id: intent.id,
            checkout_request_id: push.checkout_request_id,
            customer_message: push.customer_message,
        })
    }

    pub async fn handle_callback(&self, envelope: StkCallbackEnvelope) -> PaymentResult<()> {
        let callback = envelope.body.stk_callback;
        info!(
            checkout_request_id = %callback.checkout_request_id,
            result_code = callback.result_code,
            "payments: provider callback received"
        );

        let intent = match self
            .payment_intent_repo
            .find_by_checkout_request_id(&callback.checkout_request_id)
            .await
            .map_err(PaymentError::Internal)?
        {
            Some(intent) => intent,
            None => {
                // Stale or test traffic; acknowledge so the provider stops
                // retrying a notification this system never asked for.
                warn!(
                    checkout_request_id = %callback.checkout_request_id,
                    "payments: callback references unknown checkout request, acknowledging"
                );
                return Ok(());
            }
        };

        if intent.status != PaymentIntentStatus::Pending.to_string() {
            info!(
                intent_id = %intent.id,
                status = %intent.status,
                "payments: duplicate callback for finalized intent, acknowledging"
            );
            return Ok(());
        }

        if callback.is_success() {
            let receipt = callback.receipt().map_err(|err| {
                warn!(
                    intent_id = %intent.id,
                    error = %err,
                    "payments: success callback has malformed metadata"
                );
                PaymentError::InvalidCallback(err.to_string())
            })?;

            match self
                .payment_intent_repo
                .complete_and_activate(intent.id, receipt.receipt_number, receipt.paid_at)
                .await
            {
                Ok(CompletionOutcome::Activated {
                    subscription_id, ..
                }) => {
                    info!(
                        intent_id = %intent.id,
                        %subscription_id,
                        "payments: payment completed, subscription activated"
                    );
                    Ok(())
                }
                Ok(CompletionOutcome::AlreadyFinalized(existing)) => {
                    info!(
                        intent_id = %existing.id,
                        status = %existing.status,
                        "payments: concurrent delivery lost the completion race, acknowledging"
                    );
                    Ok(())
                }
                Err(err) => {
                    // Rolled back; the intent stays pending so the provider's
                    // redelivery can complete it.
                    error!(
                        intent_id = %intent.id,
                        error = ?err,
                        "payments: completion unit of work failed, intent left pending"
                    );
                    Err(PaymentError::Reconciliation(err))
                }
            }
        } else {
            let failed = self
                .payment_intent_repo
                .mark_failed(intent.id, callback.result_desc.clone())
                .await
                .map_err(PaymentError::Internal)?;
            info!(
                intent_id = %failed.id,
                result_code = callback.result_code,
                result_desc = %callback.result_desc,
                "payments: payment failed at provider"
            );
            Ok(())
        }
    }

    pub async fn payment_status(
        &self,
        user_id: Uuid,
        intent_id: Uuid,
    ) -> PaymentResult<PaymentIntentDto> {
        let intent = self
            .payment_intent_repo
            .find_by_id(intent_id)
            .await
            .map_err(PaymentError::Internal)?
            .ok_or(PaymentError::NotFound)?;

        // Owner-scoped: a foreign intent is indistinguishable from a missing
        // one.
        if intent.user_id != user_id {
            return Err(PaymentError::NotFound);
        }

        Ok(PaymentIntentDto::from(intent))
    }

    pub async fn payment_history(
        &self,
        user_id: Uuid,
        page: i64,
        limit: i64,
    ) -> PaymentResult<Vec<PaymentIntentDto>> {
        let offset = (page - 1) * limit;
        let intents = self
            .payment_intent_repo
            .list_by_user(user_id, limit, offset)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "payments: failed to load payment history");
                PaymentError::Internal(err)
            })?;

        Ok(intents.into_iter().map(PaymentIntentDto::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;
    use serde_json::json;

    use crate::domain::{
        entities::payment_intents::PaymentIntentEntity,
        repositories::payment_intents::MockPaymentIntentRepository,
    };

    fn pending_intent(user_id: Uuid) -> PaymentIntentEntity {
        let now = Utc::now();
        PaymentIntentEntity {
            id: Uuid::new_v4(),
            user_id,
            amount: 1200,
            currency: "KES".to_string(),
            plan: "premium".to_string(),
            phone_number: "254712345678".to_string(),
            checkout_request_id: None,
            status: PaymentIntentStatus::Pending.to_string(),
            receipt_number: None,
            failure_reason: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn completed_intent(user_id: Uuid) -> PaymentIntentEntity {
        let mut intent = pending_intent(user_id);
        intent.status = PaymentIntentStatus::Completed.to_string();
        intent.receipt_number = Some("QAX123".to_string());
        intent.checkout_request_id = Some("ws_CO_123".to_string());
        intent
    }

    fn push_response() -> StkPushResponse {
        StkPushResponse {
            merchant_request_id: "29115-34620561-1".to_string(),
            checkout_request_id: "ws_CO_123".to_string(),
            response_code: "0".to_string(),
            response_description: "Success. Request accepted for processing".to_string(),
            customer_message: "Success. Request accepted for processing".to_string(),
        }
    }

    fn initiate_model() -> InitiatePaymentModel {
        InitiatePaymentModel {
            phone_number: "254712345678".to_string(),
            amount: 1200,
            plan: "premium".to_string(),
        }
    }

    fn success_callback(checkout_request_id: &str) -> StkCallbackEnvelope {
        serde_json::from_value(json!({
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "29115-34620561-1",
                    "CheckoutRequestID": checkout_request_id,
                    "ResultCode": 0,
                    "ResultDesc": "The service request is processed successfully.",
                    "CallbackMetadata": {
                        "Item": [
                            { "Name": "Amount", "Value": 1200.0 },
                            { "Name": "MpesaReceiptNumber", "Value": "QAX123" },
                            { "Name": "TransactionDate", "Value": 20250116103000u64 },
                            { "Name": "PhoneNumber", "Value": 254712345678u64 }
                        ]
                    }
                }
            }
        }))
        .unwrap()
    }

    fn failure_callback(checkout_request_id: &str) -> StkCallbackEnvelope {
        serde_json::from_value(json!({
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "29115-34620561-1",
                    "CheckoutRequestID": checkout_request_id,
                    "ResultCode": 1032,
                    "ResultDesc": "Request cancelled by user"
                }
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn initiate_creates_pending_intent_and_assigns_correlation_id() {
        let user_id = Uuid::new_v4();
        let intent = pending_intent(user_id);
        let intent_id = intent.id;

        let mut repo = MockPaymentIntentRepository::new();
        let mut gateway = MockDarajaGateway::new();

        repo.expect_create()
            .withf(move |insert| {
                insert.user_id == user_id
                    && insert.amount == 1200
                    && insert.plan == "premium"
                    && insert.status == "pending"
            })
            .returning(move |_| Ok(intent.clone()));

        gateway
            .expect_stk_push()
            .withf(move |phone, amount, reference, _| {
                phone == "254712345678" && *amount == 1200 && reference == &intent_id.to_string()
            })
            .returning(|_, _, _, _| Ok(push_response()));

        repo.expect_assign_checkout_request_id()
            .with(eq(intent_id), eq("ws_CO_123"))
            .returning(|_, _| Ok(true));

        let usecase = PaymentUseCase::new(Arc::new(repo), Arc::new(gateway));
        let response = usecase.initiate(user_id, initiate_model()).await.unwrap();

        assert_eq!(response.intent_id, intent_id);
        assert_eq!(response.checkout_request_id, "ws_CO_123");
    }

    #[tokio::test]
    async fn initiate_rejects_invalid_phone_number_before_any_side_effect() {
        let repo = MockPaymentIntentRepository::new();
        let gateway = MockDarajaGateway::new();
        let usecase = PaymentUseCase::new(Arc::new(repo), Arc::new(gateway));

        let mut model = initiate_model();
        model.phone_number = "0712345678".to_string();

        let err = usecase.initiate(Uuid::new_v4(), model).await.unwrap_err();
        assert!(matches!(err, PaymentError::Validation(_)));
    }

    #[tokio::test]
    async fn initiate_rejects_unknown_plan() {
        let repo = MockPaymentIntentRepository::new();
        let gateway = MockDarajaGateway::new();
        let usecase = PaymentUseCase::new(Arc::new(repo), Arc::new(gateway));

        let mut model = initiate_model();
        model.plan = "gold".to_string();

        let err = usecase.initiate(Uuid::new_v4(), model).await.unwrap_err();
        assert!(matches!(err, PaymentError::UnknownPlan));
    }

    #[tokio::test]
    async fn initiate_marks_intent_failed_when_provider_rejects() {
        let user_id = Uuid::new_v4();
        let intent = pending_intent(user_id);
        let intent_id = intent.id;

        let mut repo = MockPaymentIntentRepository::new();
        let mut gateway = MockDarajaGateway::new();

        repo.expect_create().returning(move |_| Ok(intent.clone()));

        gateway
            .expect_stk_push()
            .returning(|_, _, _, _| Err(anyhow!("invalid access token")));

        repo.expect_mark_failed()
            .withf(move |id, reason| *id == intent_id && reason.contains("invalid access token"))
            .times(1)
            .returning(move |id, reason| {
                let mut failed = pending_intent(Uuid::new_v4());
                failed.id = id;
                failed.status = PaymentIntentStatus::Failed.to_string();
                failed.failure_reason = Some(reason);
                Ok(failed)
            });

        let usecase = PaymentUseCase::new(Arc::new(repo), Arc::new(gateway));
        let err = usecase
            .initiate(user_id, initiate_model())
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Provider(_)));
    }

    #[tokio::test]
    async fn initiate_treats_correlation_conflict_as_fatal() {
        let user_id = Uuid::new_v4();
        let intent = pending_intent(user_id);

        let mut repo = MockPaymentIntentRepository::new();
        let mut gateway = MockDarajaGateway::new();

        repo.expect_create().returning(move |_| Ok(intent.clone()));
        gateway
            .expect_stk_push()
            .returning(|_, _, _, _| Ok(push_response()));
        repo.expect_assign_checkout_request_id()
            .returning(|_, _| Ok(false));

        let usecase = PaymentUseCase::new(Arc::new(repo), Arc::new(gateway));
        let err = usecase
            .initiate(user_id, initiate_model())
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::CorrelationConflict));
    }

    #[tokio::test]
    async fn success_callback_completes_intent_and_activates_subscription() {
        let user_id = Uuid::new_v4();
        let mut intent = pending_intent(user_id);
        intent.checkout_request_id = Some("ws_CO_123".to_string());
        let intent_id = intent.id;
        let paid_at = Utc.with_ymd_and_hms(2025, 1, 16, 10, 30, 0).unwrap();

        let mut repo = MockPaymentIntentRepository::new();
        let gateway = MockDarajaGateway::new();

        repo.expect_find_by_checkout_request_id()
            .with(eq("ws_CO_123"))
            .returning(move |_| Ok(Some(intent.clone())));

        repo.expect_complete_and_activate()
            .withf(move |id, receipt, at| {
                *id == intent_id && receipt == "QAX123" && *at == paid_at
            })
            .times(1)
            .returning(move |id, receipt, at| {
                let mut completed = pending_intent(Uuid::new_v4());
                completed.id = id;
                completed.status = PaymentIntentStatus::Completed.to_string();
                completed.receipt_number = Some(receipt);
                completed.paid_at = Some(at);
                Ok(CompletionOutcome::Activated {
                    subscription_id: Uuid::new_v4(),
                    intent: completed,
                })
            });

        let usecase = PaymentUseCase::new(Arc::new(repo), Arc::new(gateway));
        usecase
            .handle_callback(success_callback("ws_CO_123"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn duplicate_callback_is_acknowledged_without_reapplying_effects() {
        let user_id = Uuid::new_v4();
        let intent = completed_intent(user_id);

        let mut repo = MockPaymentIntentRepository::new();
        let gateway = MockDarajaGateway::new();

        repo.expect_find_by_checkout_request_id()
            .returning(move |_| Ok(Some(intent.clone())));
        // No complete_and_activate expectation: a second activation would
        // panic the mock.

        let usecase = PaymentUseCase::new(Arc::new(repo), Arc::new(gateway));
        usecase
            .handle_callback(success_callback("ws_CO_123"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn concurrent_delivery_losing_the_race_is_acknowledged() {
        let user_id = Uuid::new_v4();
        let mut intent = pending_intent(user_id);
        intent.checkout_request_id = Some("ws_CO_123".to_string());

        let mut repo = MockPaymentIntentRepository::new();
        let gateway = MockDarajaGateway::new();

        repo.expect_find_by_checkout_request_id()
            .returning(move |_| Ok(Some(intent.clone())));
        repo.expect_complete_and_activate().returning(move |_, _, _| {
            Ok(CompletionOutcome::AlreadyFinalized(completed_intent(
                Uuid::new_v4(),
            )))
        });

        let usecase = PaymentUseCase::new(Arc::new(repo), Arc::new(gateway));
        usecase
            .handle_callback(success_callback("ws_CO_123"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failure_callback_marks_intent_failed_without_subscription() {
        let user_id = Uuid::new_v4();
        let mut intent = pending_intent(user_id);
        intent.checkout_request_id = Some("ws_CO_123".to_string());
        let intent_id = intent.id;

        let mut repo = MockPaymentIntentRepository::new();
        let gateway = MockDarajaGateway::new();

        repo.expect_find_by_checkout_request_id()
            .returning(move |_| Ok(Some(intent.clone())));
        repo.expect_mark_failed()
            .with(eq(intent_id), eq("Request cancelled by user".to_string()))
            .times(1)
            .returning(move |id, reason| {
                let mut failed = pending_intent(Uuid::new_v4());
                failed.id = id;
                failed.status = PaymentIntentStatus::Failed.to_string();
                failed.failure_reason = Some(reason);
                Ok(failed)
            });

        let usecase = PaymentUseCase::new(Arc::new(repo), Arc::new(gateway));
        usecase
            .handle_callback(failure_callback("ws_CO_123"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_correlation_id_is_acknowledged_without_mutation() {
        let mut repo = MockPaymentIntentRepository::new();
        let gateway = MockDarajaGateway::new();

        repo.expect_find_by_checkout_request_id()
            .returning(|_| Ok(None));

        let usecase = PaymentUseCase::new(Arc::new(repo), Arc::new(gateway));
        usecase
            .handle_callback(success_callback("ws_CO_unknown"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unit_of_work_failure_leaves_intent_pending_and_signals_retry() {
        let user_id = Uuid::new_v4();
        let mut intent = pending_intent(user_id);
        intent.checkout_request_id = Some("ws_CO_123".to_string());

        let mut repo = MockPaymentIntentRepository::new();
        let gateway = MockDarajaGateway::new();

        repo.expect_find_by_checkout_request_id()
            .returning(move |_| Ok(Some(intent.clone())));
        repo.expect_complete_and_activate()
            .returning(|_, _, _| Err(anyhow!("subscription insert failed")));

        let usecase = PaymentUseCase::new(Arc::new(repo), Arc::new(gateway));
        let err = usecase
            .handle_callback(success_callback("ws_CO_123"))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Reconciliation(_)));
    }

    #[tokio::test]
    async fn success_callback_with_missing_receipt_is_invalid() {
        let user_id = Uuid::new_v4();
        let mut intent = pending_intent(user_id);
        intent.checkout_request_id = Some("ws_CO_123".to_string());

        let mut repo = MockPaymentIntentRepository::new();
        let gateway = MockDarajaGateway::new();

        repo.expect_find_by_checkout_request_id()
            .returning(move |_| Ok(Some(intent.clone())));

        let envelope: StkCallbackEnvelope = serde_json::from_value(json!({
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "29115-34620561-1",
                    "CheckoutRequestID": "ws_CO_123",
                    "ResultCode": 0,
                    "ResultDesc": "The service request is processed successfully.",
                    "CallbackMetadata": { "Item": [ { "Name": "Amount", "Value": 1200.0 } ] }
                }
            }
        }))
        .unwrap();

        let usecase = PaymentUseCase::new(Arc::new(repo), Arc::new(gateway));
        let err = usecase.handle_callback(envelope).await.unwrap_err();
        assert!(matches!(err, PaymentError::InvalidCallback(_)));
    }

    #[tokio::test]
    async fn payment_status_hides_foreign_intents() {
        let owner = Uuid::new_v4();
        let intent = pending_intent(owner);
        let intent_id = intent.id;

        let mut repo = MockPaymentIntentRepository::new();
        let gateway = MockDarajaGateway::new();

        repo.expect_find_by_id()
            .with(eq(intent_id))
            .returning(move |_| Ok(Some(intent.clone())));

        let usecase = PaymentUseCase::new(Arc::new(repo), Arc::new(gateway));
        let err = usecase
            .payment_status(Uuid::new_v4(), intent_id)
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::NotFound));
    }

    #[tokio::test]
    async fn payment_history_translates_page_to_offset() {
        let user_id = Uuid::new_v4();

        let mut repo = MockPaymentIntentRepository::new();
        let gateway = MockDarajaGateway::new();

        repo.expect_list_by_user()
            .with(eq(user_id), eq(10), eq(10))
            .returning(|_, _, _| Ok(vec![]));

        let usecase = PaymentUseCase::new(Arc::new(repo), Arc::new(gateway));
        let history = usecase.payment_history(user_id, 2, 10).await.unwrap();
        assert!(history.is_empty());
    }
}
