// src/clients/parameter_store.rs

use async_trait::async_trait;
use aws_sdk_ssm::{
    error::DisplayErrorContext,
    types::{ParameterType, Tag},
};

use crate::common::error::AppError;

/// Escrita de um parâmetro. `tags` só pode ser enviado na criação:
/// o SSM recusa `Overwrite=true` junto com tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutParameter {
    pub name: String,
    pub value: String,
    pub description: String,
    pub secure: bool,
    pub overwrite: bool,
    pub tags: Vec<(String, String)>,
}

#[async_trait]
pub trait ParameterStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<String>, AppError>;

    async fn exists(&self, name: &str) -> Result<bool, AppError> {
        Ok(self.get(name).await?.is_some())
    }

    async fn put(&self, request: PutParameter) -> Result<(), AppError>;

    async fn delete(&self, name: &str) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    pub fn new(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get(&self, name: &str) -> Result<Option<String>, AppError> {
        match self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
        {
            Ok(output) => Ok(output
                .parameter()
                .and_then(|p| p.value())
                .map(str::to_string)),
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_parameter_not_found()) {
                    return Ok(None);
                }
                Err(AppError::ParameterStoreError(DisplayErrorContext(e).to_string()))
            }
        }
    }

    async fn put(&self, request: PutParameter) -> Result<(), AppError> {
        let tags = request
            .tags
            .iter()
            .map(|(k, v)| Tag::builder().key(k).value(v).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::ParameterStoreError(e.to_string()))?;

        let parameter_type = if request.secure {
            ParameterType::SecureString
        } else {
            ParameterType::String
        };

        self.client
            .put_parameter()
            .name(&request.name)
            .value(&request.value)
            .description(&request.description)
            .r#type(parameter_type)
            .overwrite(request.overwrite)
            .set_tags(if tags.is_empty() { None } else { Some(tags) })
            .send()
            .await
            .map_err(|e| AppError::ParameterStoreError(DisplayErrorContext(e).to_string()))?;

        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), AppError> {
        self.client
            .delete_parameter()
            .name(name)
            .send()
            .await
            .map_err(|e| AppError::ParameterStoreError(DisplayErrorContext(e).to_string()))?;

        Ok(())
    }
}
