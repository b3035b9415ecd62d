// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal collector API client.

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::monitor::ServiceReport;

/// One alert for `set_alerts`.
#[derive(Debug, Clone, Serialize)]
pub struct AlertReport {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The collector answered with an error status.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// OverC API client: identifies as one server against one collector.
pub struct Overclient {
    base: String,
    server: Value,
    client: reqwest::Client,
}

impl Overclient {
    pub fn new(url: &str, server_name: &str, server_key: &str) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base: url.trim_end_matches('/').to_owned(),
            server: json!({ "name": server_name, "key": server_key }),
            client,
        })
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, ReportError> {
        let response = self
            .client
            .post(format!("{}{}", self.base, path))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let value: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            let message = value
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_owned();
            return Err(ReportError::Api { status: status.as_u16(), message });
        }
        Ok(value)
    }

    /// `POST /api/ping`: test connection and credentials.
    pub async fn ping(&self) -> Result<(), ReportError> {
        self.post("/api/ping", json!({ "server": self.server })).await?;
        Ok(())
    }

    /// `POST /api/set/service/status`: ship one probe batch.
    pub async fn set_service_status(
        &self,
        period: i64,
        services: &[ServiceReport],
    ) -> Result<(), ReportError> {
        self.post(
            "/api/set/service/status",
            json!({
                "server": self.server,
                "period": period,
                "services": services,
            }),
        )
        .await?;
        Ok(())
    }

    /// `POST /api/set/alerts`: report alerts noticed locally.
    pub async fn set_alerts(&self, alerts: &[AlertReport]) -> Result<(), ReportError> {
        self.post(
            "/api/set/alerts",
            json!({ "server": self.server, "alerts": alerts }),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "reporter_tests.rs"]
mod tests;
