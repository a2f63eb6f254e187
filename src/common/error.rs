// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Tipo de erro único da aplicação, com `thiserror` para ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Campo 'action' ausente. Esperado 'scale_down' ou 'scale_up'.")]
    MissingAction,

    #[error("Ação inválida: {0}")]
    InvalidAction(String),

    #[error("Configuração ausente: {0}")]
    MissingConfig(&'static str),

    // Pré-condição: nunca revogamos/concedemos para um role inexistente
    #[error("Usuário {0} não existe - impossível revogar/conceder permissões")]
    RoleNotFound(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro no Secrets Manager: {0}")]
    SecretsError(String),

    #[error("Erro no Parameter Store: {0}")]
    ParameterStoreError(String),

    #[error("Erro no cluster ECS: {0}")]
    ClusterError(String),

    #[error("Erro HTTP: {0}")]
    HttpError(#[from] reqwest::Error),

    // `anyhow::Error` captura o contexto de qualquer outro erro inesperado.
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            ref e @ (AppError::MissingAction | AppError::InvalidAction(_)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ref e @ AppError::RoleNotFound(_) => (StatusCode::CONFLICT, e.to_string()),

            // Falhas de dependências externas: o detalhe vai para o log e para o chamador
            ref e @ (AppError::SecretsError(_)
            | AppError::ParameterStoreError(_)
            | AppError::HttpError(_)) => {
                tracing::error!("Falha em dependência externa: {}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }

            // Todos os outros erros (ClusterError, DatabaseError, InternalServerError...) viram 500.
            // O detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
