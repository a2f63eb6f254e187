// src/handlers/service_accounts.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError, config::AppState,
    models::service_account::{ProvisionResponse, ProvisionServiceAccountPayload},
};

// POST /api/service-accounts
#[utoipa::path(
    post,
    path = "/api/service-accounts",
    tag = "Service Accounts",
    request_body = ProvisionServiceAccountPayload,
    responses(
        (status = 200, description = "Conta provisionada, atualizada ou já existente", body = ProvisionResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Role inexistente durante a reconciliação"),
        (status = 502, description = "Falha no Secrets Manager ou no Parameter Store")
    )
)]
pub async fn provision_service_account(
    State(app_state): State<AppState>,
    Json(payload): Json<ProvisionServiceAccountPayload>,
) -> Result<impl IntoResponse, AppError> {
    let response = app_state.account_service.provision(payload).await?;

    Ok((StatusCode::OK, Json(response)))
}
