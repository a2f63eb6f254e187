// src/clients/ingest.rs

use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::common::error::AppError;

/// Cliente do endpoint de ingestão JSON do OpenObserve.
#[derive(Clone)]
pub struct IngestClient {
    http: Client,
    url: String,
    user: String,
    password: String,
}

impl IngestClient {
    pub fn new(
        host: &str,
        org: &str,
        stream: &str,
        user: &str,
        password: &str,
    ) -> Result<Self, AppError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            http,
            url: ingest_url(host, org, stream),
            user: user.to_string(),
            password: password.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Envia um lote de registros; devolve o status HTTP recebido.
    pub async fn push(&self, records: &[Value]) -> Result<StatusCode, AppError> {
        let response = self
            .http
            .post(&self.url)
            .basic_auth(&self.user, Some(&self.password))
            .json(records)
            .send()
            .await?;

        Ok(response.status())
    }
}

pub fn ingest_url(host: &str, org: &str, stream: &str) -> String {
    format!("{}/api/{}/{}/_json", host.trim_end_matches('/'), org, stream)
}
