// src/services/account_service.rs

use std::sync::Arc;
use validator::Validate;

use crate::{
    clients::{ParameterStore, PutParameter, SecretsProvider},
    common::{error::AppError, password::generate_password},
    db::{RoleDatabase, RoleSession, Statement},
    models::{
        privileges::{DesiredGrants, RoleAttribute, SchemaPermission, TableScope},
        service_account::{
            ProvisionResponse, ProvisionServiceAccountPayload, ReconcileReport, StepOutcome,
            StepStatus,
        },
    },
};

#[derive(Clone)]
pub struct AccountService {
    secrets: Arc<dyn SecretsProvider>,
    parameters: Arc<dyn ParameterStore>,
    database: Arc<dyn RoleDatabase>,
    environment: String,
}

impl AccountService {
    pub fn new(
        secrets: Arc<dyn SecretsProvider>,
        parameters: Arc<dyn ParameterStore>,
        database: Arc<dyn RoleDatabase>,
        environment: String,
    ) -> Self {
        Self { secrets, parameters, database, environment }
    }

    /// Cria ou atualiza a conta de serviço e publica a connection string no SSM.
    ///
    /// Sem `update_permissions`, uma conta cujo parâmetro já existe não é tocada.
    pub async fn provision(
        &self,
        payload: ProvisionServiceAccountPayload,
    ) -> Result<ProvisionResponse, AppError> {
        // Erros de entrada abortam antes de qualquer mutação
        payload.validate()?;

        let name = &payload.service_account_name;
        let parameter = &payload.ssm_parameter_name;

        // 1. O registro de credenciais já existe?
        let record_exists = self.parameters.exists(parameter).await?;
        if record_exists {
            tracing::info!("Parâmetro SSM '{}' já existe", parameter);
        } else {
            tracing::info!("Parâmetro SSM '{}' não existe", parameter);
        }

        if record_exists && !payload.update_permissions {
            return Ok(ProvisionResponse::already_provisioned(name, parameter));
        }

        // 2. Credenciais master e conexão exclusiva desta invocação
        let credentials = self.secrets.master_credentials(&payload.master_secret_arn).await?;
        let mut session = self.database.connect(&payload.target(), &credentials).await?;

        let result = self.reconcile(session.as_mut(), &payload, record_exists).await;

        // 3. A conexão é liberada em qualquer caminho
        if let Err(e) = session.close().await {
            tracing::warn!("Falha ao encerrar a conexão com o banco: {}", e);
        }

        let report = result?;
        Ok(ProvisionResponse::from_report(name, parameter, report))
    }

    async fn reconcile(
        &self,
        session: &mut dyn RoleSession,
        payload: &ProvisionServiceAccountPayload,
        record_exists: bool,
    ) -> Result<ReconcileReport, AppError> {
        let role = payload.service_account_name.as_str();
        let update = payload.update_permissions;

        session.begin().await?;

        let role_exists = session.role_exists(role).await?;

        // Nunca publicamos um registro com senha que não acabou de ser gravada no banco
        let should_generate_password = update || !role_exists || !record_exists;

        let password = if should_generate_password {
            let password = generate_password();
            if role_exists {
                session
                    .execute(&Statement::AlterPassword {
                        role: role.into(),
                        password: password.clone(),
                    })
                    .await?;
                tracing::info!("🔑 Senha da conta de serviço '{}' atualizada", role);
            } else {
                session
                    .execute(&Statement::CreateRole {
                        role: role.into(),
                        password: password.clone(),
                    })
                    .await?;
                tracing::info!("👤 Conta de serviço '{}' criada", role);
            }
            Some(password)
        } else {
            None
        };

        let mut report = ReconcileReport {
            user_created: !role_exists,
            password_updated: password.is_some(),
            ..Default::default()
        };

        if !role_exists || update {
            report.revocations = reconcile_grants(session, role, &payload.desired_grants()).await?;
            report.permissions_updated = true;
        }

        // `update` sempre gera senha nova, então este ramo cobre também
        // o caso "update com registro existente".
        if let Some(password) = &password {
            self.store_credentials(payload, password, record_exists).await?;
        }

        // Commit só depois do SSM: se a escrita falhar o banco volta ao estado anterior
        session.commit().await?;

        Ok(report)
    }

    async fn store_credentials(
        &self,
        payload: &ProvisionServiceAccountPayload,
        password: &str,
        record_exists: bool,
    ) -> Result<(), AppError> {
        let role = &payload.service_account_name;

        // SSM não aceita tags junto com Overwrite: tags só na criação
        let tags = if record_exists {
            Vec::new()
        } else {
            vec![
                ("ServiceAccount".to_string(), role.clone()),
                ("ManagedBy".to_string(), "terraform".to_string()),
                ("Environment".to_string(), self.environment.clone()),
            ]
        };

        self.parameters
            .put(PutParameter {
                name: payload.ssm_parameter_name.clone(),
                value: payload.target().connection_string(role, password),
                description: format!("Database service account credentials for {}", role),
                secure: true,
                overwrite: record_exists,
                tags,
            })
            .await?;

        tracing::info!("💾 Credenciais de '{}' gravadas no SSM", role);
        Ok(())
    }
}

/// Zera as permissões do role e aplica exatamente o conjunto desejado.
///
/// Os REVOKEs de schema e de atributos são "best effort": uma falha vira
/// um `StepOutcome` ignorado em vez de abortar a operação.
pub async fn reconcile_grants(
    session: &mut dyn RoleSession,
    role: &str,
    desired: &DesiredGrants,
) -> Result<Vec<StepOutcome>, AppError> {
    if !session.role_exists(role).await? {
        return Err(AppError::RoleNotFound(role.to_string()));
    }

    let schema = desired.schema.as_str();
    let mut outcomes = Vec::new();

    // --- REVOKE: do mais amplo para o mais específico ---
    tracing::info!("Revogando todas as permissões de {}...", role);

    session
        .execute(&Statement::RevokeAllTables { schema: schema.into(), role: role.into() })
        .await?;
    session
        .execute(&Statement::RevokeDefaultTables { schema: schema.into(), role: role.into() })
        .await?;

    for permission in SchemaPermission::REVOCABLE {
        let statement =
            Statement::RevokeSchema { schema: schema.into(), permission, role: role.into() };
        outcomes.push(best_effort(session, statement).await?);
    }

    for attribute in RoleAttribute::REVOCABLE {
        let statement = Statement::RevokeAttribute { role: role.into(), attribute };
        outcomes.push(best_effort(session, statement).await?);
    }

    // --- GRANT: estado desejado ---
    tracing::info!("Concedendo as permissões desejadas para {}...", role);

    for attribute in &desired.role_attributes {
        session
            .execute(&Statement::GrantAttribute { role: role.into(), attribute: *attribute })
            .await?;
        tracing::info!("Privilégio {} concedido a {}", attribute, role);
    }

    for permission in &desired.schema_permissions {
        session
            .execute(&Statement::GrantSchema {
                schema: schema.into(),
                permission: *permission,
                role: role.into(),
            })
            .await?;
        tracing::info!("{} no schema {} concedido a {}", permission, schema, role);
    }

    for privilege in &desired.table_privileges {
        match &desired.table_scope {
            TableScope::Tables(tables) => {
                for table in tables {
                    session
                        .execute(&Statement::GrantTable {
                            schema: schema.into(),
                            table: table.clone(),
                            privilege: *privilege,
                            role: role.into(),
                        })
                        .await?;
                    tracing::info!("{} em {} concedido a {}", privilege, table, role);
                }
            }
            TableScope::AllTables => {
                session
                    .execute(&Statement::GrantAllTables {
                        schema: schema.into(),
                        privilege: *privilege,
                        role: role.into(),
                    })
                    .await?;
                session
                    .execute(&Statement::GrantDefaultTables {
                        schema: schema.into(),
                        privilege: *privilege,
                        role: role.into(),
                    })
                    .await?;
                tracing::info!(
                    "{} em todas as tabelas (atuais e futuras) concedido a {}",
                    privilege,
                    role
                );
            }
        }
    }

    Ok(outcomes)
}

// Só falhas do próprio comando são toleradas; erro ao gerenciar o savepoint propaga
async fn best_effort(
    session: &mut dyn RoleSession,
    statement: Statement,
) -> Result<StepOutcome, AppError> {
    match session.execute_best_effort(&statement).await? {
        Ok(()) => {
            tracing::info!("Aplicado: {}", statement);
            Ok(StepOutcome {
                statement: statement.to_string(),
                status: StepStatus::Applied,
                detail: None,
            })
        }
        Err(e) => {
            tracing::warn!("Ignorado (permissão não concedida?): {} - {}", statement, e);
            Ok(StepOutcome {
                statement: statement.to_string(),
                status: StepStatus::Ignored,
                detail: Some(e.to_string()),
            })
        }
    }
}
