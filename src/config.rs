// src/config.rs

use std::{env, sync::Arc};

use crate::{
    clients::{AwsSecretsProvider, EcsClusterApi, ParameterStore, SsmParameterStore},
    db::PgRoleDatabase,
    services::{AccountService, ScalingService},
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub environment: String,
    pub app_name: Option<String>,
    pub ecs_cluster_name: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "unknown".to_string()),
            app_name: env::var("APP_NAME").ok().filter(|v| !v.is_empty()),
            ecs_cluster_name: env::var("ECS_CLUSTER_NAME").ok().filter(|v| !v.is_empty()),
        }
    }
}

// O estado compartilhado que será acessível em todos os handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub account_service: AccountService,
    // Só existe quando ECS_CLUSTER_NAME e APP_NAME estão definidos
    pub scaling_service: Option<ScalingService>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let settings = Settings::from_env();

        let aws_config = aws_config::load_from_env().await;
        let parameters: Arc<dyn ParameterStore> =
            Arc::new(SsmParameterStore::new(aws_sdk_ssm::Client::new(&aws_config)));
        let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);
        let secrets = Arc::new(AwsSecretsProvider::new(secrets_client));

        // --- Monta o gráfico de dependências ---
        let account_service = AccountService::new(
            secrets,
            parameters.clone(),
            Arc::new(PgRoleDatabase),
            settings.environment.clone(),
        );

        let scaling_service = match (&settings.ecs_cluster_name, &settings.app_name) {
            (Some(cluster_name), Some(app_name)) => Some(ScalingService::new(
                Arc::new(EcsClusterApi::new(aws_sdk_ecs::Client::new(&aws_config))),
                parameters,
                cluster_name.clone(),
                app_name.clone(),
            )),
            _ => {
                tracing::warn!("ECS_CLUSTER_NAME/APP_NAME ausentes: scaling desabilitado");
                None
            }
        };

        tracing::info!("✅ Clientes AWS configurados (ambiente: {})", settings.environment);

        Ok(Self { settings, account_service, scaling_service })
    }
}
