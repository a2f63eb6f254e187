// src/services/log_emitter.rs

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

use crate::clients::IngestClient;
use crate::common::error::AppError;
use crate::models::log_record::synthetic_record;

#[async_trait]
pub trait LogSink: Send + Sync {
    async fn push(&self, records: &[Value]) -> Result<StatusCode, AppError>;
}

#[async_trait]
impl LogSink for IngestClient {
    async fn push(&self, records: &[Value]) -> Result<StatusCode, AppError> {
        IngestClient::push(self, records).await
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmitSummary {
    pub sent: usize,
    pub failed: usize,
}

/// Envia `count` registros sintéticos, um por requisição.
///
/// O `delay` é aplicado apenas entre envios, nunca depois do último.
pub async fn emit_logs(
    sink: &dyn LogSink,
    count: usize,
    delay: Duration,
) -> EmitSummary {
    let mut summary = EmitSummary::default();

    for i in 0..count {
        // Escopo curto: o ThreadRng não pode atravessar o await
        let record = {
            let mut rng = rand::thread_rng();
            synthetic_record(&mut rng, i + 1, Utc::now())
        };

        match sink.push(std::slice::from_ref(&record)).await {
            Ok(status) if status == StatusCode::OK => {
                summary.sent += 1;
                tracing::info!("Log {}/{} enviado com sucesso", i + 1, count);
            }
            Ok(status) => {
                summary.failed += 1;
                tracing::warn!("Log {}/{} falhou com status: {}", i + 1, count, status.as_u16());
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!("Log {}/{} falhou: {}", i + 1, count, e);
            }
        }

        if !delay.is_zero() && i + 1 < count {
            tokio::time::sleep(delay).await;
        }
    }

    summary
}
