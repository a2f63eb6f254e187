// src/models/service_account.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::privileges::{
    DesiredGrants, RoleAttribute, SchemaPermission, TablePrivilege, TableScope,
};

// Limite de identificadores do Postgres (NAMEDATALEN - 1)
const MAX_IDENTIFIER_LEN: usize = 63;

fn default_port() -> u16 {
    5432
}

fn default_schema() -> String {
    "public".to_string()
}

// Payload de provisionamento de uma conta de serviço
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProvisionServiceAccountPayload {
    #[validate(custom(function = "validate_role_name"))]
    #[schema(example = "svc_orders")]
    pub service_account_name: String,

    #[validate(length(min = 1, message = "O nome do banco é obrigatório."))]
    pub database_name: String,

    #[serde(default)]
    pub permissions: Vec<TablePrivilege>,

    #[serde(default)]
    #[validate(custom(function = "validate_tables"))]
    pub tables: Vec<String>,

    #[serde(default)]
    pub schema_permissions: Vec<SchemaPermission>,

    #[serde(default)]
    pub database_privileges: Vec<RoleAttribute>,

    #[serde(default)]
    pub update_permissions: bool,

    #[validate(length(min = 1, message = "O endpoint do Aurora é obrigatório."))]
    pub aurora_endpoint: String,

    #[serde(default = "default_port")]
    #[validate(range(min = 1, message = "Porta inválida."))]
    pub aurora_port: u16,

    #[validate(length(min = 1, message = "O ARN do segredo master é obrigatório."))]
    pub master_secret_arn: String,

    #[validate(custom(function = "validate_parameter_name"))]
    #[schema(example = "/shop/service-account/svc_orders")]
    pub ssm_parameter_name: String,

    #[serde(default = "default_schema")]
    #[validate(length(min = 1, max = 63, message = "Schema inválido."))]
    pub schema: String,
}

impl ProvisionServiceAccountPayload {
    pub fn desired_grants(&self) -> DesiredGrants {
        DesiredGrants {
            schema: self.schema.clone(),
            table_privileges: self.permissions.clone(),
            table_scope: TableScope::from_request(&self.tables),
            schema_permissions: self.schema_permissions.clone(),
            role_attributes: self.database_privileges.clone(),
        }
    }

    pub fn target(&self) -> DatabaseTarget {
        DatabaseTarget {
            host: self.aurora_endpoint.clone(),
            port: self.aurora_port,
            database: self.database_name.clone(),
        }
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn validate_role_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() || name.len() > MAX_IDENTIFIER_LEN {
        return Err(invalid("role_name_length", "O nome da conta deve ter entre 1 e 63 caracteres."));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(invalid(
            "role_name_charset",
            "O nome da conta aceita apenas letras, dígitos, '_' e '-'.",
        ));
    }
    Ok(())
}

fn validate_tables(tables: &[String]) -> Result<(), ValidationError> {
    if tables.iter().any(|t| t.is_empty() || t.len() > MAX_IDENTIFIER_LEN) {
        return Err(invalid("table_name", "Nomes de tabela devem ter entre 1 e 63 caracteres."));
    }
    Ok(())
}

fn validate_parameter_name(name: &str) -> Result<(), ValidationError> {
    if !name.starts_with('/') || name.len() < 2 {
        return Err(invalid("parameter_name", "O nome do parâmetro SSM deve começar com '/'."));
    }
    Ok(())
}

/// Onde o role vive: host, porta e banco alvo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseTarget {
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl DatabaseTarget {
    pub fn connection_string(&self, role: &str, password: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            role, password, self.host, self.port, self.database
        )
    }
}

// Credenciais master lidas do Secrets Manager
#[derive(Clone, Deserialize)]
pub struct MasterCredentials {
    pub username: String,
    pub password: String,
}

// Nunca imprime a senha
impl std::fmt::Debug for MasterCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Applied,
    Ignored,
}

/// Resultado de um REVOKE "best effort": aplicado ou ignorado (com o motivo).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StepOutcome {
    pub statement: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// O que a reconciliação efetivamente fez.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub user_created: bool,
    pub password_updated: bool,
    pub permissions_updated: bool,
    pub revocations: Vec<StepOutcome>,
}

// Resposta do endpoint de provisionamento
#[derive(Debug, Serialize, ToSchema)]
pub struct ProvisionResponse {
    pub message: String,
    pub ssm_parameter: String,
    pub user_created: bool,
    pub password_updated: bool,
    pub permissions_updated: bool,
    pub revocations: Vec<StepOutcome>,
}

impl ProvisionResponse {
    pub fn already_provisioned(name: &str, parameter: &str) -> Self {
        Self {
            message: format!("Conta de serviço {} já provisionada", name),
            ssm_parameter: parameter.to_string(),
            user_created: false,
            password_updated: false,
            permissions_updated: false,
            revocations: Vec::new(),
        }
    }

    pub fn from_report(name: &str, parameter: &str, report: ReconcileReport) -> Self {
        Self {
            message: format!("Conta de serviço {} provisionada/atualizada com sucesso", name),
            ssm_parameter: parameter.to_string(),
            user_created: report.user_created,
            password_updated: report.password_updated,
            permissions_updated: report.permissions_updated,
            revocations: report.revocations,
        }
    }

    pub fn is_noop(&self) -> bool {
        !self.user_created && !self.password_updated && !self.permissions_updated
    }
}
