// src/models/privileges.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

// Privilégios de tabela aceitos no GRANT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TablePrivilege {
    Select,
    Insert,
    Update,
    Delete,
    Truncate,
    References,
    Trigger,
    All,
}

impl TablePrivilege {
    pub fn as_sql(&self) -> &'static str {
        match self {
            TablePrivilege::Select => "SELECT",
            TablePrivilege::Insert => "INSERT",
            TablePrivilege::Update => "UPDATE",
            TablePrivilege::Delete => "DELETE",
            TablePrivilege::Truncate => "TRUNCATE",
            TablePrivilege::References => "REFERENCES",
            TablePrivilege::Trigger => "TRIGGER",
            TablePrivilege::All => "ALL PRIVILEGES",
        }
    }
}

// Permissões de schema. ALTER e DROP não existem no Postgres moderno,
// mas continuam no ciclo de revogação (tolerante a falhas).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaPermission {
    Usage,
    Create,
    Alter,
    Drop,
}

impl SchemaPermission {
    /// Conjunto fixo revogado em todo reset de permissões.
    pub const REVOCABLE: [SchemaPermission; 4] = [
        SchemaPermission::Usage,
        SchemaPermission::Create,
        SchemaPermission::Alter,
        SchemaPermission::Drop,
    ];

    pub fn as_sql(&self) -> &'static str {
        match self {
            SchemaPermission::Usage => "USAGE",
            SchemaPermission::Create => "CREATE",
            SchemaPermission::Alter => "ALTER",
            SchemaPermission::Drop => "DROP",
        }
    }
}

// Privilégios "de banco" aplicados como atributos do role (ALTER USER ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoleAttribute {
    CreateDb,
    CreateRole,
    CreateUser,
    Superuser,
    Inherit,
    Login,
    Replication,
    BypassRls,
}

impl RoleAttribute {
    /// Atributos removidos no reset. LOGIN nunca entra aqui: sem ele o role fica inutilizável.
    pub const REVOCABLE: [RoleAttribute; 5] = [
        RoleAttribute::CreateDb,
        RoleAttribute::CreateRole,
        RoleAttribute::CreateUser,
        RoleAttribute::Superuser,
        RoleAttribute::Inherit,
    ];

    pub fn as_sql(&self) -> &'static str {
        match self {
            RoleAttribute::CreateDb => "CREATEDB",
            RoleAttribute::CreateRole => "CREATEROLE",
            RoleAttribute::CreateUser => "CREATEUSER",
            RoleAttribute::Superuser => "SUPERUSER",
            RoleAttribute::Inherit => "INHERIT",
            RoleAttribute::Login => "LOGIN",
            RoleAttribute::Replication => "REPLICATION",
            RoleAttribute::BypassRls => "BYPASSRLS",
        }
    }

    pub fn negated_sql(&self) -> String {
        format!("NO{}", self.as_sql())
    }
}

impl fmt::Display for TablePrivilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl fmt::Display for SchemaPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl fmt::Display for RoleAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Alvo dos privilégios de tabela.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableScope {
    /// Todas as tabelas atuais e futuras do schema
    AllTables,
    Tables(Vec<String>),
}

impl TableScope {
    // Lista vazia ou contendo "*" significa todas as tabelas
    pub fn from_request(tables: &[String]) -> Self {
        if tables.is_empty() || tables.iter().any(|t| t == "*") {
            TableScope::AllTables
        } else {
            TableScope::Tables(tables.to_vec())
        }
    }
}

/// Estado desejado de permissões para um role.
#[derive(Debug, Clone)]
pub struct DesiredGrants {
    pub schema: String,
    pub table_privileges: Vec<TablePrivilege>,
    pub table_scope: TableScope,
    pub schema_permissions: Vec<SchemaPermission>,
    pub role_attributes: Vec<RoleAttribute>,
}
