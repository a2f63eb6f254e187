// src/clients/cluster.rs

use async_trait::async_trait;
use aws_sdk_ecs::{error::DisplayErrorContext, types::ServiceField};

use crate::common::error::AppError;
use crate::models::scaling::{ServiceDescription, ServiceTag};

/// Limite do ECS para o DescribeServices.
pub const DESCRIBE_BATCH_LIMIT: usize = 10;

const LIST_PAGE_SIZE: i32 = 100;

#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn list_services(&self, cluster: &str) -> Result<Vec<String>, AppError>;

    /// No máximo `DESCRIBE_BATCH_LIMIT` ARNs por chamada.
    async fn describe_services(
        &self,
        cluster: &str,
        service_arns: &[String],
    ) -> Result<Vec<ServiceDescription>, AppError>;

    async fn update_desired_count(
        &self,
        cluster: &str,
        service: &str,
        desired_count: i32,
    ) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct EcsClusterApi {
    client: aws_sdk_ecs::Client,
}

impl EcsClusterApi {
    pub fn new(client: aws_sdk_ecs::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterApi for EcsClusterApi {
    async fn list_services(&self, cluster: &str) -> Result<Vec<String>, AppError> {
        let mut arns = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_services()
                .cluster(cluster)
                .max_results(LIST_PAGE_SIZE)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| AppError::ClusterError(DisplayErrorContext(e).to_string()))?;

            arns.extend(output.service_arns().iter().cloned());

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(arns)
    }

    async fn describe_services(
        &self,
        cluster: &str,
        service_arns: &[String],
    ) -> Result<Vec<ServiceDescription>, AppError> {
        if service_arns.len() > DESCRIBE_BATCH_LIMIT {
            return Err(AppError::ClusterError(format!(
                "DescribeServices aceita no máximo {} serviços, recebeu {}",
                DESCRIBE_BATCH_LIMIT,
                service_arns.len()
            )));
        }

        let output = self
            .client
            .describe_services()
            .cluster(cluster)
            .set_services(Some(service_arns.to_vec()))
            .include(ServiceField::Tags)
            .send()
            .await
            .map_err(|e| AppError::ClusterError(DisplayErrorContext(e).to_string()))?;

        let services = output
            .services()
            .iter()
            .map(|s| ServiceDescription {
                service_name: s.service_name().map(str::to_string),
                service_arn: s.service_arn().unwrap_or_default().to_string(),
                desired_count: s.desired_count(),
                tags: s
                    .tags()
                    .iter()
                    .filter_map(|t| {
                        Some(ServiceTag {
                            key: t.key()?.to_string(),
                            value: t.value().unwrap_or_default().to_string(),
                        })
                    })
                    .collect(),
            })
            .collect();

        Ok(services)
    }

    async fn update_desired_count(
        &self,
        cluster: &str,
        service: &str,
        desired_count: i32,
    ) -> Result<(), AppError> {
        self.client
            .update_service()
            .cluster(cluster)
            .service(service)
            .desired_count(desired_count)
            .send()
            .await
            .map_err(|e| AppError::ClusterError(DisplayErrorContext(e).to_string()))?;

        Ok(())
    }
}
