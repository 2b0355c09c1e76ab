//! Payment handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use super::dto::{PaymentDto, RecordPaymentRequest};
use crate::domain::payment::PaymentTotals;
use crate::domain::{DomainError, Payment, PaymentStatus, RepositoryProvider};
use crate::interfaces::http::common::{
    error_response, ok, ApiError, ApiResponse, ApiResult, ValidatedJson,
};

#[derive(Clone)]
pub struct PaymentHandlerState {
    pub repos: Arc<dyn RepositoryProvider>,
}

#[utoipa::path(
    get,
    path = "/api/v1/payments",
    tag = "Payments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Payments, newest date first", body = ApiResponse<Vec<PaymentDto>>)
    )
)]
pub async fn list_payments(State(state): State<PaymentHandlerState>) -> ApiResult<Vec<PaymentDto>> {
    let payments = state.repos.payments().find_all().await.map_err(error_response)?;
    ok(payments.into_iter().map(PaymentDto::from).collect())
}

#[utoipa::path(
    post,
    path = "/api/v1/payments",
    tag = "Payments",
    security(("bearer_auth" = [])),
    request_body = RecordPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = ApiResponse<PaymentDto>),
        (status = 400, description = "Negative amount"),
        (status = 422, description = "Missing user or more than two decimal places")
    )
)]
pub async fn record_payment(
    State(state): State<PaymentHandlerState>,
    ValidatedJson(body): ValidatedJson<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentDto>>), ApiError> {
    if body.amount.is_sign_negative() {
        return Err(error_response(DomainError::Validation(
            "Amount must not be negative.".to_string(),
        )));
    }

    let payment = Payment {
        id: format!("pay-{}", uuid::Uuid::new_v4().simple()),
        user_id: body.user_id,
        user_name: body.user_name,
        amount: body.amount,
        date: body.date.unwrap_or_else(|| Utc::now().date_naive()),
        status: body.status.unwrap_or(PaymentStatus::Succeeded),
    };
    state
        .repos
        .payments()
        .save(payment.clone())
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(payment.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/summary",
    tag = "Payments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Revenue and per-status counts", body = ApiResponse<PaymentTotals>)
    )
)]
pub async fn payment_summary(State(state): State<PaymentHandlerState>) -> ApiResult<PaymentTotals> {
    let payments = state.repos.payments().find_all().await.map_err(error_response)?;
    ok(PaymentTotals::from_payments(&payments))
}
