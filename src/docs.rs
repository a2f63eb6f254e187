// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::service_accounts::provision_service_account,
        handlers::scaling::run_scaling,
    ),
    components(
        schemas(
            // --- Service Accounts ---
            models::privileges::TablePrivilege,
            models::privileges::SchemaPermission,
            models::privileges::RoleAttribute,
            models::service_account::ProvisionServiceAccountPayload,
            models::service_account::ProvisionResponse,
            models::service_account::StepOutcome,
            models::service_account::StepStatus,

            // --- Scaling ---
            models::scaling::ScalingAction,
            models::scaling::ScalingPayload,
            models::scaling::ScalingResponse,
            models::scaling::ServiceResult,
            models::scaling::ServiceOutcome,
        )
    ),
    tags(
        (name = "Service Accounts", description = "Provisionamento de contas de serviço no Aurora"),
        (name = "Scaling", description = "Scaling dos serviços ECS fora do horário comercial")
    )
)]
pub struct ApiDoc;
