// src/db/role_session.rs

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::{
    postgres::{PgConnectOptions, PgConnection, PgPoolOptions},
    Connection, PgPool, Postgres, Transaction,
};
use std::{future::Future, pin::Pin, time::Duration};

use crate::common::error::AppError;
use crate::db::statements::Statement;
use crate::models::service_account::{DatabaseTarget, MasterCredentials};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Uma conexão exclusiva, válida durante uma única invocação.
#[async_trait]
pub trait RoleSession: Send {
    async fn begin(&mut self) -> Result<(), AppError>;

    async fn role_exists(&mut self, role: &str) -> Result<bool, AppError>;

    async fn execute(&mut self, statement: &Statement) -> Result<(), AppError>;

    /// Executa isolado num savepoint: uma falha do comando não invalida a transação em curso.
    ///
    /// O erro externo vem do controle do savepoint e é fatal. O interno é a falha
    /// do próprio comando, já desfeita.
    async fn execute_best_effort(
        &mut self,
        statement: &Statement,
    ) -> Result<Result<(), sqlx::Error>, AppError>;

    async fn commit(&mut self) -> Result<(), AppError>;

    /// Desfaz qualquer transação aberta e libera a conexão.
    async fn close(&mut self) -> Result<(), AppError>;
}

#[async_trait]
pub trait RoleDatabase: Send + Sync {
    async fn connect(
        &self,
        target: &DatabaseTarget,
        credentials: &MasterCredentials,
    ) -> Result<Box<dyn RoleSession>, AppError>;
}

#[derive(Clone, Default)]
pub struct PgRoleDatabase;

#[async_trait]
impl RoleDatabase for PgRoleDatabase {
    async fn connect(
        &self,
        target: &DatabaseTarget,
        credentials: &MasterCredentials,
    ) -> Result<Box<dyn RoleSession>, AppError> {
        let options = PgConnectOptions::new()
            .host(&target.host)
            .port(target.port)
            .database(&target.database)
            .username(&credentials.username)
            .password(&credentials.password);

        // Pool de uma única conexão: a invocação inteira usa a mesma sessão
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect_with(options)
            .await?;

        tracing::info!("✅ Conectado ao banco {} em {}", target.database, target.host);

        Ok(Box::new(PgRoleSession { pool, tx: None }))
    }
}

// Execução simples (sem prepare), necessária para DDL/DCL
fn run<'a>(
    conn: &'a mut PgConnection,
    sql: &'a str,
) -> Pin<Box<dyn Future<Output = Result<(), sqlx::Error>> + Send + 'a>> {
    Box::pin(async move {
        sqlx::Executor::execute(conn, sqlx::raw_sql(sql)).await?;
        Ok(())
    })
}

pub struct PgRoleSession {
    pool: PgPool,
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgRoleSession {
    fn tx(&mut self) -> Result<&mut Transaction<'static, Postgres>, AppError> {
        self.tx
            .as_mut()
            .ok_or_else(|| AppError::InternalServerError(anyhow!("Nenhuma transação aberta")))
    }
}

#[async_trait]
impl RoleSession for PgRoleSession {
    async fn begin(&mut self) -> Result<(), AppError> {
        self.tx = Some(self.pool.begin().await?);
        Ok(())
    }

    async fn role_exists(&mut self, role: &str) -> Result<bool, AppError> {
        let query = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM pg_roles WHERE rolname = $1)",
        )
        .bind(role);

        let exists = match self.tx.as_mut() {
            Some(tx) => query.fetch_one(&mut **tx).await?,
            None => query.fetch_one(&self.pool).await?,
        };

        Ok(exists)
    }

    async fn execute(&mut self, statement: &Statement) -> Result<(), AppError> {
        let sql = statement.to_sql();
        let tx = self.tx()?;
        run(&mut **tx, &sql).await?;
        Ok(())
    }

    async fn execute_best_effort(
        &mut self,
        statement: &Statement,
    ) -> Result<Result<(), sqlx::Error>, AppError> {
        let sql = statement.to_sql();
        let tx = self.tx()?;

        // Transação aninhada = SAVEPOINT; commit = RELEASE, rollback = ROLLBACK TO
        let mut savepoint = Connection::begin(&mut **tx).await?;

        match run(&mut *savepoint, &sql).await {
            Ok(()) => {
                savepoint.commit().await?;
                Ok(Ok(()))
            }
            Err(e) => {
                savepoint.rollback().await?;
                Ok(Err(e))
            }
        }
    }

    async fn commit(&mut self) -> Result<(), AppError> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| AppError::InternalServerError(anyhow!("Nenhuma transação aberta")))?;
        tx.commit().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), AppError> {
        if let Some(tx) = self.tx.take() {
            if let Err(e) = tx.rollback().await {
                tracing::warn!("Falha ao desfazer a transação: {:?}", e);
            }
        }

        self.pool.close().await;
        Ok(())
    }
}
