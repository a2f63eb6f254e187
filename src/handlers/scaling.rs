// src/handlers/scaling.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    models::scaling::{ScalingPayload, ScalingResponse},
};

// POST /api/scaling  { "action": "scale_down" | "scale_up" }
#[utoipa::path(
    post,
    path = "/api/scaling",
    tag = "Scaling",
    request_body = ScalingPayload,
    responses(
        (status = 200, description = "Resultado por serviço", body = ScalingResponse),
        (status = 400, description = "Ação ausente ou inválida"),
        (status = 500, description = "Falha ao listar/descrever os serviços do cluster")
    )
)]
pub async fn run_scaling(
    State(app_state): State<AppState>,
    Json(payload): Json<ScalingPayload>,
) -> Result<impl IntoResponse, AppError> {
    // A ação é validada antes de qualquer chamada ao ECS
    let action = payload.action()?;

    let service = app_state
        .scaling_service
        .as_ref()
        .ok_or(AppError::MissingConfig("ECS_CLUSTER_NAME/APP_NAME"))?;

    let response = service.run(action).await?;
    Ok(Json(response))
}
