// src/services/scaling_service.rs

use std::sync::Arc;

use crate::{
    clients::{ClusterApi, ParameterStore, PutParameter, DESCRIBE_BATCH_LIMIT},
    common::error::AppError,
    models::scaling::{
        original_count_parameter, ScalableService, ScalingAction, ScalingResponse, ServiceOutcome,
        ServiceResult,
    },
};

#[derive(Clone)]
pub struct ScalingService {
    cluster: Arc<dyn ClusterApi>,
    parameters: Arc<dyn ParameterStore>,
    cluster_name: String,
    app_name: String,
}

impl ScalingService {
    pub fn new(
        cluster: Arc<dyn ClusterApi>,
        parameters: Arc<dyn ParameterStore>,
        cluster_name: String,
        app_name: String,
    ) -> Self {
        Self { cluster, parameters, cluster_name, app_name }
    }

    pub async fn run(&self, action: ScalingAction) -> Result<ScalingResponse, AppError> {
        tracing::info!("Iniciando {:?} no cluster {}", action, self.cluster_name);

        let arns = self.cluster.list_services(&self.cluster_name).await?;
        if arns.is_empty() {
            tracing::info!("Nenhum serviço encontrado no cluster");
            return Ok(ScalingResponse {
                message: "Nenhum serviço para escalar".to_string(),
                action,
                services: Vec::new(),
            });
        }

        let services = self.opted_in_services(&arns).await?;
        tracing::info!("{} serviços elegíveis para scaling", services.len());

        let results = match action {
            ScalingAction::ScaleDown => self.scale_down(&services).await,
            ScalingAction::ScaleUp => self.scale_up(&services).await,
        };

        let message = match action {
            ScalingAction::ScaleDown => "Scale down concluído",
            ScalingAction::ScaleUp => "Scale up concluído",
        };

        Ok(ScalingResponse { message: message.to_string(), action, services: results })
    }

    // O DescribeServices aceita no máximo 10 serviços por chamada
    async fn opted_in_services(&self, arns: &[String]) -> Result<Vec<ScalableService>, AppError> {
        let mut described = Vec::with_capacity(arns.len());
        for chunk in arns.chunks(DESCRIBE_BATCH_LIMIT) {
            described.extend(self.cluster.describe_services(&self.cluster_name, chunk).await?);
        }

        Ok(described
            .into_iter()
            .filter(|s| s.opted_in())
            .filter_map(|s| {
                // Sem nome = tarefa agendada, não é um serviço
                let service_name = s.service_name?;
                Some(ScalableService {
                    service_name,
                    service_arn: s.service_arn,
                    current_desired_count: s.desired_count,
                })
            })
            .collect())
    }

    async fn scale_down(&self, services: &[ScalableService]) -> Vec<ServiceResult> {
        let mut results = Vec::with_capacity(services.len());

        for service in services {
            let name = &service.service_name;
            let current = service.current_desired_count;

            if current == 0 {
                tracing::info!("Serviço {} já está em zero, ignorando", name);
                let outcome = ServiceOutcome::Skipped { reason: "já em zero".into() };
                results.push(result(name, outcome));
                continue;
            }

            // Sem o valor original salvo não há como restaurar depois: não escala
            let parameter = original_count_parameter(&self.app_name, name);
            let stored = self
                .parameters
                .put(PutParameter {
                    name: parameter,
                    value: current.to_string(),
                    description: format!(
                        "Original desired count for {} before off-hours scaling",
                        name
                    ),
                    secure: false,
                    overwrite: true,
                    tags: Vec::new(),
                })
                .await;
            if let Err(e) = stored {
                tracing::error!("Erro ao salvar o desired count original de {}: {}", name, e);
                results.push(result(name, ServiceOutcome::Failed { error: e.to_string() }));
                continue;
            }
            tracing::info!("Desired count original {} salvo para {}", current, name);

            match self.cluster.update_desired_count(&self.cluster_name, name, 0).await {
                Ok(()) => {
                    tracing::info!("⬇️ Serviço {} reduzido para 0", name);
                    results.push(result(name, ServiceOutcome::Scaled { from: current, to: 0 }));
                }
                Err(e) => {
                    tracing::error!("Erro ao reduzir o serviço {}: {}", name, e);
                    results.push(result(name, ServiceOutcome::Failed { error: e.to_string() }));
                }
            }
        }

        results
    }

    async fn scale_up(&self, services: &[ScalableService]) -> Vec<ServiceResult> {
        let mut results = Vec::with_capacity(services.len());

        for service in services {
            let name = &service.service_name;
            let parameter = original_count_parameter(&self.app_name, name);

            let original = match self.parameters.get(&parameter).await {
                Ok(Some(value)) => match value.trim().parse::<i32>() {
                    Ok(count) => {
                        tracing::info!("Desired count original {} lido para {}", count, name);
                        count
                    }
                    Err(e) => {
                        tracing::warn!("Valor inválido em {}: {:?} ({})", parameter, value, e);
                        0
                    }
                },
                Ok(None) => {
                    tracing::info!("Nenhum desired count salvo para {}, mantendo em zero", name);
                    0
                }
                Err(e) => {
                    tracing::error!("Erro ao ler o desired count original de {}: {}", name, e);
                    0
                }
            };

            let outcome = if original > 0 {
                match self.cluster.update_desired_count(&self.cluster_name, name, original).await {
                    Ok(()) => {
                        tracing::info!("⬆️ Serviço {} restaurado para {}", name, original);
                        ServiceOutcome::Scaled { from: service.current_desired_count, to: original }
                    }
                    Err(e) => {
                        tracing::error!("Erro ao restaurar o serviço {}: {}", name, e);
                        results.push(result(name, ServiceOutcome::Failed { error: e.to_string() }));
                        continue;
                    }
                }
            } else {
                ServiceOutcome::Skipped { reason: "nenhum desired count salvo".into() }
            };

            // Limpeza tolerante: parâmetro órfão não invalida o scale up
            match self.parameters.delete(&parameter).await {
                Ok(()) => tracing::info!("Parâmetro {} removido", parameter),
                Err(e) => tracing::warn!("Erro ao remover o parâmetro {}: {}", parameter, e),
            }

            results.push(result(name, outcome));
        }

        results
    }
}

fn result(name: &str, outcome: ServiceOutcome) -> ServiceResult {
    ServiceResult { service_name: name.to_string(), outcome }
}
