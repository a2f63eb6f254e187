// src/clients/secrets.rs

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;

use crate::common::error::AppError;
use crate::models::service_account::MasterCredentials;

#[async_trait]
pub trait SecretsProvider: Send + Sync {
    /// Lê o segredo `{"username", "password"}` do usuário master.
    async fn master_credentials(&self, secret_id: &str) -> Result<MasterCredentials, AppError>;
}

#[derive(Clone)]
pub struct AwsSecretsProvider {
    client: aws_sdk_secretsmanager::Client,
}

impl AwsSecretsProvider {
    pub fn new(client: aws_sdk_secretsmanager::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretsProvider for AwsSecretsProvider {
    async fn master_credentials(&self, secret_id: &str) -> Result<MasterCredentials, AppError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| AppError::SecretsError(DisplayErrorContext(e).to_string()))?;

        let raw = output
            .secret_string()
            .ok_or_else(|| {
                AppError::SecretsError(format!("Segredo {} sem SecretString", secret_id))
            })?;

        parse_credentials(raw)
    }
}

pub fn parse_credentials(raw: &str) -> Result<MasterCredentials, AppError> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::SecretsError(format!("Segredo master malformado: {}", e)))
}
