// src/testing.rs
//
// Implementações em memória dos colaboradores externos, usadas pelos testes.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::clients::{
    ClusterApi, ParameterStore, PutParameter, SecretsProvider, DESCRIBE_BATCH_LIMIT,
};
use crate::common::error::AppError;
use crate::db::{RoleDatabase, RoleSession, Statement};
use crate::models::privileges::{RoleAttribute, SchemaPermission, TablePrivilege};
use crate::models::scaling::{ServiceDescription, ServiceTag, OFF_HOURS_TAG};
use crate::models::service_account::{DatabaseTarget, MasterCredentials};

// ---------- Secrets ----------

pub struct FakeSecrets {
    credentials: MasterCredentials,
    calls: AtomicUsize,
}

impl FakeSecrets {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            credentials: MasterCredentials { username: username.into(), password: password.into() },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretsProvider for FakeSecrets {
    async fn master_credentials(&self, _secret_id: &str) -> Result<MasterCredentials, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.credentials.clone())
    }
}

// ---------- Parameter Store ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredParameter {
    pub value: String,
    pub description: String,
    pub secure: bool,
    pub tags: Vec<(String, String)>,
}

#[derive(Default)]
pub struct FakeParameterStore {
    params: Mutex<BTreeMap<String, StoredParameter>>,
    puts: Mutex<Vec<PutParameter>>,
    deletes: Mutex<Vec<String>>,
    fail_puts: AtomicBool,
    fail_gets: AtomicBool,
    fail_deletes: AtomicBool,
}

impl FakeParameterStore {
    pub fn insert(&self, name: &str, value: &str) {
        self.params.lock().unwrap().insert(
            name.to_string(),
            StoredParameter {
                value: value.to_string(),
                description: String::new(),
                secure: false,
                tags: Vec::new(),
            },
        );
    }

    pub fn stored(&self, name: &str) -> Option<StoredParameter> {
        self.params.lock().unwrap().get(name).cloned()
    }

    pub fn puts(&self) -> Vec<PutParameter> {
        self.puts.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ParameterStore for FakeParameterStore {
    async fn get(&self, name: &str) -> Result<Option<String>, AppError> {
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(AppError::ParameterStoreError("AccessDenied".into()));
        }
        Ok(self.params.lock().unwrap().get(name).map(|p| p.value.clone()))
    }

    async fn put(&self, request: PutParameter) -> Result<(), AppError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(AppError::ParameterStoreError("ThrottlingException".into()));
        }
        // Mesmas regras do SSM
        if request.overwrite && !request.tags.is_empty() {
            return Err(AppError::ParameterStoreError(
                "ValidationException: tags and overwrite cannot be used together".into(),
            ));
        }

        let mut params = self.params.lock().unwrap();
        if params.contains_key(&request.name) && !request.overwrite {
            return Err(AppError::ParameterStoreError("ParameterAlreadyExists".into()));
        }

        let tags = match params.get(&request.name) {
            Some(existing) => existing.tags.clone(),
            None => request.tags.clone(),
        };
        params.insert(
            request.name.clone(),
            StoredParameter {
                value: request.value.clone(),
                description: request.description.clone(),
                secure: request.secure,
                tags,
            },
        );
        self.puts.lock().unwrap().push(request);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), AppError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::ParameterStoreError("InternalServerError".into()));
        }
        match self.params.lock().unwrap().remove(name) {
            Some(_) => {
                self.deletes.lock().unwrap().push(name.to_string());
                Ok(())
            }
            None => Err(AppError::ParameterStoreError("ParameterNotFound".into())),
        }
    }
}

// ---------- Postgres (modelo de grants) ----------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleState {
    pub password: String,
    pub attributes: BTreeSet<RoleAttribute>,
    pub schema_permissions: BTreeSet<(String, SchemaPermission)>,
    pub table_grants: BTreeSet<(String, String, TablePrivilege)>,
    pub default_grants: BTreeSet<(String, TablePrivilege)>,
}

#[derive(Debug, Clone, Default)]
struct Catalog {
    tables: BTreeMap<String, Vec<String>>,
    roles: BTreeMap<String, RoleState>,
}

fn role_mut<'a>(
    roles: &'a mut BTreeMap<String, RoleState>,
    role: &str,
) -> Result<&'a mut RoleState, String> {
    roles
        .get_mut(role)
        .ok_or_else(|| format!("role \"{}\" does not exist", role))
}

impl Catalog {
    // Aplica um comando; `Err` imita a rejeição do Postgres
    fn apply(&mut self, statement: &Statement) -> Result<(), String> {
        match statement {
            Statement::CreateRole { role, password } => {
                if self.roles.contains_key(role) {
                    return Err(format!("role \"{}\" already exists", role));
                }
                self.roles.insert(
                    role.clone(),
                    RoleState {
                        password: password.clone(),
                        attributes: BTreeSet::from([RoleAttribute::Login, RoleAttribute::Inherit]),
                        ..Default::default()
                    },
                );
            }
            Statement::AlterPassword { role, password } => {
                role_mut(&mut self.roles, role)?.password = password.clone();
            }
            Statement::RevokeAllTables { schema, role } => {
                role_mut(&mut self.roles, role)?.table_grants.retain(|(s, _, _)| s != schema);
            }
            Statement::RevokeDefaultTables { schema, role } => {
                role_mut(&mut self.roles, role)?.default_grants.retain(|(s, _)| s != schema);
            }
            Statement::RevokeSchema { schema, permission, role } => match permission {
                SchemaPermission::Alter | SchemaPermission::Drop => {
                    return Err(format!("invalid privilege type {} for schema", permission));
                }
                _ => {
                    role_mut(&mut self.roles, role)?
                        .schema_permissions
                        .remove(&(schema.clone(), *permission));
                }
            },
            Statement::RevokeAttribute { role, attribute } => {
                if *attribute == RoleAttribute::CreateUser {
                    return Err("syntax error at or near \"NOCREATEUSER\"".into());
                }
                role_mut(&mut self.roles, role)?.attributes.remove(attribute);
            }
            Statement::GrantAttribute { role, attribute } => {
                role_mut(&mut self.roles, role)?.attributes.insert(*attribute);
            }
            Statement::GrantSchema { schema, permission, role } => {
                role_mut(&mut self.roles, role)?
                    .schema_permissions
                    .insert((schema.clone(), *permission));
            }
            Statement::GrantTable { schema, table, privilege, role } => {
                let known = self.tables.get(schema).is_some_and(|t| t.contains(table));
                if !known {
                    return Err(format!("relation \"{}.{}\" does not exist", schema, table));
                }
                role_mut(&mut self.roles, role)?
                    .table_grants
                    .insert((schema.clone(), table.clone(), *privilege));
            }
            Statement::GrantAllTables { schema, privilege, role } => {
                let tables = self.tables.get(schema).cloned().unwrap_or_default();
                let state = role_mut(&mut self.roles, role)?;
                for table in tables {
                    state.table_grants.insert((schema.clone(), table, *privilege));
                }
            }
            Statement::GrantDefaultTables { schema, privilege, role } => {
                role_mut(&mut self.roles, role)?
                    .default_grants
                    .insert((schema.clone(), *privilege));
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct DbShared {
    catalog: Catalog,
    statements: Vec<Statement>,
    opened: usize,
    open: usize,
    fail_on: HashSet<String>,
    fail_savepoints: bool,
}

#[derive(Clone, Default)]
pub struct FakeRoleDatabase {
    shared: Arc<Mutex<DbShared>>,
}

impl FakeRoleDatabase {
    pub fn with_tables(schema: &str, tables: &[&str]) -> Self {
        let db = Self::default();
        db.shared.lock().unwrap().catalog.tables.insert(
            schema.to_string(),
            tables.iter().map(|t| t.to_string()).collect(),
        );
        db
    }

    /// Sessão direta, sem passar pelo `connect`.
    pub fn session(&self) -> FakeSession {
        FakeSession { shared: self.shared.clone(), snapshot: None, aborted: false, closed: false }
    }

    pub fn role(&self, name: &str) -> Option<RoleState> {
        self.shared.lock().unwrap().catalog.roles.get(name).cloned()
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.shared.lock().unwrap().statements.clone()
    }

    pub fn connections_opened(&self) -> usize {
        self.shared.lock().unwrap().opened
    }

    pub fn open_connections(&self) -> usize {
        self.shared.lock().unwrap().open
    }

    /// Faz o comando com este SQL falhar.
    pub fn fail_on(&self, sql: &str) {
        self.shared.lock().unwrap().fail_on.insert(sql.to_string());
    }

    /// Faz a criação de savepoints falhar.
    pub fn fail_savepoints(&self) {
        self.shared.lock().unwrap().fail_savepoints = true;
    }

    fn seed(&self, statement: Statement) {
        self.shared.lock().unwrap().catalog.apply(&statement).unwrap();
    }

    pub fn create_role(&self, role: &str) {
        self.seed(Statement::CreateRole { role: role.into(), password: "old-password".into() });
    }

    pub fn grant_table(&self, role: &str, schema: &str, table: &str, privilege: TablePrivilege) {
        self.seed(Statement::GrantTable {
            schema: schema.into(),
            table: table.into(),
            privilege,
            role: role.into(),
        });
    }

    pub fn grant_default(&self, role: &str, schema: &str, privilege: TablePrivilege) {
        self.seed(Statement::GrantDefaultTables { schema: schema.into(), privilege, role: role.into() });
    }

    pub fn grant_schema(&self, role: &str, schema: &str, permission: SchemaPermission) {
        self.seed(Statement::GrantSchema { schema: schema.into(), permission, role: role.into() });
    }

    pub fn grant_attribute(&self, role: &str, attribute: RoleAttribute) {
        self.seed(Statement::GrantAttribute { role: role.into(), attribute });
    }
}

#[async_trait]
impl RoleDatabase for FakeRoleDatabase {
    async fn connect(
        &self,
        _target: &DatabaseTarget,
        _credentials: &MasterCredentials,
    ) -> Result<Box<dyn RoleSession>, AppError> {
        {
            let mut shared = self.shared.lock().unwrap();
            shared.opened += 1;
            shared.open += 1;
        }
        Ok(Box::new(self.session()))
    }
}

pub struct FakeSession {
    shared: Arc<Mutex<DbShared>>,
    snapshot: Option<Catalog>,
    // Como no Postgres: após um erro, a transação rejeita tudo até o rollback
    aborted: bool,
    closed: bool,
}

const ABORTED: &str = "current transaction is aborted, commands ignored until end of transaction block";

fn db_error(message: impl Into<String>) -> sqlx::Error {
    sqlx::Error::Protocol(message.into())
}

impl FakeSession {
    fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    fn run(&mut self, statement: &Statement) -> Result<(), sqlx::Error> {
        if self.aborted {
            return Err(db_error(ABORTED));
        }

        let result = {
            let mut shared = self.shared.lock().unwrap();
            shared.statements.push(statement.clone());
            if shared.fail_on.contains(&statement.to_sql()) {
                Err(db_error("injected failure"))
            } else {
                shared.catalog.apply(statement).map_err(db_error)
            }
        };

        if result.is_err() && self.in_transaction() {
            self.aborted = true;
        }
        result
    }
}

#[async_trait]
impl RoleSession for FakeSession {
    async fn begin(&mut self) -> Result<(), AppError> {
        self.snapshot = Some(self.shared.lock().unwrap().catalog.clone());
        self.aborted = false;
        Ok(())
    }

    async fn role_exists(&mut self, role: &str) -> Result<bool, AppError> {
        if self.aborted {
            return Err(AppError::DatabaseError(db_error(ABORTED)));
        }
        Ok(self.shared.lock().unwrap().catalog.roles.contains_key(role))
    }

    async fn execute(&mut self, statement: &Statement) -> Result<(), AppError> {
        Ok(self.run(statement)?)
    }

    async fn execute_best_effort(
        &mut self,
        statement: &Statement,
    ) -> Result<Result<(), sqlx::Error>, AppError> {
        if !self.in_transaction() {
            return Ok(self.run(statement));
        }
        if self.aborted {
            return Err(AppError::DatabaseError(db_error(ABORTED)));
        }
        if self.shared.lock().unwrap().fail_savepoints {
            self.aborted = true;
            return Err(AppError::DatabaseError(db_error("SAVEPOINT failed")));
        }

        // O catálogo só muda em caso de sucesso; o ROLLBACK TO limpa o estado abortado
        let result = self.run(statement);
        self.aborted = false;
        Ok(result)
    }

    async fn commit(&mut self) -> Result<(), AppError> {
        if self.aborted {
            // COMMIT numa transação abortada vira ROLLBACK
            if let Some(snapshot) = self.snapshot.take() {
                self.shared.lock().unwrap().catalog = snapshot;
            }
            self.aborted = false;
            return Err(AppError::DatabaseError(db_error(ABORTED)));
        }
        self.snapshot = None;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), AppError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut shared = self.shared.lock().unwrap();
        if let Some(snapshot) = self.snapshot.take() {
            shared.catalog = snapshot;
        }
        shared.open = shared.open.saturating_sub(1);
        Ok(())
    }
}

// ---------- ECS ----------

#[derive(Default)]
pub struct FakeCluster {
    services: Mutex<Vec<ServiceDescription>>,
    describe_batches: Mutex<Vec<usize>>,
    updates: Mutex<Vec<(String, i32)>>,
    fail_updates_for: Mutex<HashSet<String>>,
    fail_list: AtomicBool,
}

impl FakeCluster {
    pub fn add_service(&self, name: &str, desired_count: i32, opted_in: bool) {
        let tags = if opted_in {
            vec![ServiceTag { key: OFF_HOURS_TAG.into(), value: "true".into() }]
        } else {
            Vec::new()
        };
        self.services.lock().unwrap().push(ServiceDescription {
            service_name: Some(name.to_string()),
            service_arn: format!("arn:aws:ecs:us-east-1:1:service/cluster/{}", name),
            desired_count,
            tags,
        });
    }

    pub fn add_unnamed(&self, arn: &str) {
        self.services.lock().unwrap().push(ServiceDescription {
            service_name: None,
            service_arn: arn.to_string(),
            desired_count: 1,
            tags: vec![ServiceTag { key: OFF_HOURS_TAG.into(), value: "true".into() }],
        });
    }

    pub fn desired_count(&self, name: &str) -> Option<i32> {
        self.services
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.service_name.as_deref() == Some(name))
            .map(|s| s.desired_count)
    }

    pub fn describe_batches(&self) -> Vec<usize> {
        self.describe_batches.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(String, i32)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn fail_updates_for(&self, name: &str) {
        self.fail_updates_for.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn list_services(&self, _cluster: &str) -> Result<Vec<String>, AppError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(AppError::ClusterError("ClusterNotFoundException".into()));
        }
        Ok(self.services.lock().unwrap().iter().map(|s| s.service_arn.clone()).collect())
    }

    async fn describe_services(
        &self,
        _cluster: &str,
        service_arns: &[String],
    ) -> Result<Vec<ServiceDescription>, AppError> {
        if service_arns.len() > DESCRIBE_BATCH_LIMIT {
            return Err(AppError::ClusterError("InvalidParameterException".into()));
        }
        self.describe_batches.lock().unwrap().push(service_arns.len());
        Ok(self
            .services
            .lock()
            .unwrap()
            .iter()
            .filter(|s| service_arns.contains(&s.service_arn))
            .cloned()
            .collect())
    }

    async fn update_desired_count(
        &self,
        _cluster: &str,
        service: &str,
        desired_count: i32,
    ) -> Result<(), AppError> {
        if self.fail_updates_for.lock().unwrap().contains(service) {
            return Err(AppError::ClusterError("ServiceNotActiveException".into()));
        }
        self.updates.lock().unwrap().push((service.to_string(), desired_count));
        if let Some(s) = self
            .services
            .lock()
            .unwrap()
            .iter_mut()
            .find(|s| s.service_name.as_deref() == Some(service))
        {
            s.desired_count = desired_count;
        }
        Ok(())
    }
}
