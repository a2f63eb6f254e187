// src/models/scaling.rs

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::common::error::AppError;

/// Tag que habilita o scale-down fora do horário comercial.
pub const OFF_HOURS_TAG: &str = "OffHoursScaling";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScalingAction {
    ScaleDown,
    ScaleUp,
}

impl FromStr for ScalingAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scale_down" => Ok(ScalingAction::ScaleDown),
            "scale_up" => Ok(ScalingAction::ScaleUp),
            other => Err(AppError::InvalidAction(other.to_string())),
        }
    }
}

// O evento chega "cru": a ação é validada antes de qualquer chamada remota
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScalingPayload {
    #[schema(example = "scale_down")]
    pub action: Option<String>,
}

impl ScalingPayload {
    pub fn action(&self) -> Result<ScalingAction, AppError> {
        self.action
            .as_deref()
            .ok_or(AppError::MissingAction)?
            .parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTag {
    pub key: String,
    pub value: String,
}

// Visão mínima de um serviço retornado pelo describe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescription {
    pub service_name: Option<String>,
    pub service_arn: String,
    pub desired_count: i32,
    pub tags: Vec<ServiceTag>,
}

impl ServiceDescription {
    pub fn opted_in(&self) -> bool {
        self.tags
            .iter()
            .any(|t| t.key == OFF_HOURS_TAG && t.value.eq_ignore_ascii_case("true"))
    }
}

/// Serviço elegível para o scaling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalableService {
    pub service_name: String,
    pub service_arn: String,
    pub current_desired_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServiceOutcome {
    Scaled { from: i32, to: i32 },
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ServiceResult {
    pub service_name: String,
    #[serde(flatten)]
    pub outcome: ServiceOutcome,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScalingResponse {
    pub message: String,
    pub action: ScalingAction,
    pub services: Vec<ServiceResult>,
}

/// Caminho do parâmetro que guarda o desired count original.
pub fn original_count_parameter(app_name: &str, service_name: &str) -> String {
    format!("/{}/ecs/{}/original_desired_count", app_name, service_name)
}
