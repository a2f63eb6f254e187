// src/db/statements.rs

use std::fmt;

use crate::models::privileges::{RoleAttribute, SchemaPermission, TablePrivilege};

/// Comandos DDL/DCL emitidos durante a reconciliação de um role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    CreateRole { role: String, password: String },
    AlterPassword { role: String, password: String },
    RevokeAllTables { schema: String, role: String },
    RevokeDefaultTables { schema: String, role: String },
    RevokeSchema { schema: String, permission: SchemaPermission, role: String },
    RevokeAttribute { role: String, attribute: RoleAttribute },
    GrantAttribute { role: String, attribute: RoleAttribute },
    GrantSchema { schema: String, permission: SchemaPermission, role: String },
    GrantTable { schema: String, table: String, privilege: TablePrivilege, role: String },
    GrantAllTables { schema: String, privilege: TablePrivilege, role: String },
    GrantDefaultTables { schema: String, privilege: TablePrivilege, role: String },
}

// Identificador entre aspas duplas, duplicando as aspas internas
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

// Utilitários (CREATE/ALTER USER) não aceitam bind de parâmetros: literal escapado
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl Statement {
    pub fn to_sql(&self) -> String {
        self.render(false)
    }

    fn render(&self, redact: bool) -> String {
        let secret = |password: &str| {
            if redact {
                "'***'".to_string()
            } else {
                quote_literal(password)
            }
        };

        match self {
            Statement::CreateRole { role, password } => {
                format!("CREATE USER {} WITH PASSWORD {}", quote_ident(role), secret(password))
            }
            Statement::AlterPassword { role, password } => {
                format!("ALTER USER {} PASSWORD {}", quote_ident(role), secret(password))
            }
            Statement::RevokeAllTables { schema, role } => format!(
                "REVOKE ALL PRIVILEGES ON ALL TABLES IN SCHEMA {} FROM {}",
                quote_ident(schema),
                quote_ident(role)
            ),
            Statement::RevokeDefaultTables { schema, role } => format!(
                "ALTER DEFAULT PRIVILEGES IN SCHEMA {} REVOKE ALL PRIVILEGES ON TABLES FROM {}",
                quote_ident(schema),
                quote_ident(role)
            ),
            Statement::RevokeSchema { schema, permission, role } => format!(
                "REVOKE {} ON SCHEMA {} FROM {}",
                permission,
                quote_ident(schema),
                quote_ident(role)
            ),
            Statement::RevokeAttribute { role, attribute } => {
                format!("ALTER USER {} {}", quote_ident(role), attribute.negated_sql())
            }
            Statement::GrantAttribute { role, attribute } => {
                format!("ALTER USER {} {}", quote_ident(role), attribute)
            }
            Statement::GrantSchema { schema, permission, role } => format!(
                "GRANT {} ON SCHEMA {} TO {}",
                permission,
                quote_ident(schema),
                quote_ident(role)
            ),
            Statement::GrantTable { schema, table, privilege, role } => format!(
                "GRANT {} ON {}.{} TO {}",
                privilege,
                quote_ident(schema),
                quote_ident(table),
                quote_ident(role)
            ),
            Statement::GrantAllTables { schema, privilege, role } => format!(
                "GRANT {} ON ALL TABLES IN SCHEMA {} TO {}",
                privilege,
                quote_ident(schema),
                quote_ident(role)
            ),
            Statement::GrantDefaultTables { schema, privilege, role } => format!(
                "ALTER DEFAULT PRIVILEGES IN SCHEMA {} GRANT {} ON TABLES TO {}",
                quote_ident(schema),
                privilege,
                quote_ident(role)
            ),
        }
    }
}

// Display é o que vai para logs e respostas: senha sempre mascarada
impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(true))
    }
}
