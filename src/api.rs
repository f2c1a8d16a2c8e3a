use crate::provider::ProviderConfig;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::time::Duration;

/// Reply to `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: String,
    pub command_executed: Option<CommandExecuted>,
    pub error: Option<String>,
}

/// Record of a CLI command the backend ran on behalf of a turn. Exactly one
/// of `output`/`error` is populated, chosen by `success`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandExecuted {
    pub command: String,
    #[serde(default)]
    pub success: bool,
    pub output: Option<String>,
    pub error: Option<String>,
}

/// Reply to `POST /api/settings`.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsAck {
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
}

/// Reply to `GET /api/health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub cli_tools: BTreeMap<String, String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Serialize)]
struct SettingsRequest<'a> {
    #[serde(flatten)]
    config: &'a ProviderConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_connection: Option<bool>,
}

/// HTTP client for the assistant backend. All bodies are JSON; every response
/// is parsed as JSON regardless of HTTP status, and a non-2xx status is a
/// failure even when the body parses.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one user message. Backend-reported failures come back as a
    /// `ChatResponse` with `success == false`; transport and parse faults as
    /// an error.
    pub async fn send_message(&self, message: &str) -> Result<ChatResponse> {
        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(&ChatRequest { message })
            .send()
            .await
            .context("chat request failed")?;

        let status = response.status();
        let mut body: ChatResponse = response
            .json()
            .await
            .context("chat response was not valid JSON")?;

        if !status.is_success() {
            body.success = false;
        }
        if !body.success && body.error.is_none() {
            body.error = Some(format!("server returned {status}"));
        }
        Ok(body)
    }

    /// Ask the backend to discard its conversation history. Best-effort: an
    /// error status in the reply is logged, not surfaced; only a transport
    /// fault is an error.
    pub async fn clear_conversation(&self) -> Result<()> {
        let response = self
            .client
            .post(self.url("/api/conversation/clear"))
            .send()
            .await
            .context("conversation clear request failed")?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "conversation clear returned an error status");
        }
        Ok(())
    }

    pub async fn get_settings(&self) -> Result<ProviderConfig> {
        let response = self
            .client
            .get(self.url("/api/settings"))
            .send()
            .await
            .context("settings request failed")?;

        let status = response.status();
        let config: ProviderConfig = response
            .json()
            .await
            .context("settings response was not valid JSON")?;

        if !status.is_success() {
            bail!("server returned {status}");
        }
        Ok(config)
    }

    /// Persist settings, or probe them without persisting when
    /// `test_connection` is set.
    pub async fn save_settings(
        &self,
        config: &ProviderConfig,
        test_connection: bool,
    ) -> Result<SettingsAck> {
        let request = SettingsRequest {
            config,
            test_connection: test_connection.then_some(true),
        };
        let response = self
            .client
            .post(self.url("/api/settings"))
            .json(&request)
            .send()
            .await
            .context("settings request failed")?;

        let status = response.status();
        let mut ack: SettingsAck = response
            .json()
            .await
            .context("settings response was not valid JSON")?;

        if !status.is_success() {
            ack.success = false;
        }
        if !ack.success && ack.error.is_none() {
            ack.error = Some(format!("server returned {status}"));
        }
        Ok(ack)
    }

    pub async fn health(&self) -> Result<HealthReport> {
        let response = self
            .client
            .get(self.url("/api/health"))
            .send()
            .await
            .context("health request failed")?;

        let status = response.status();
        let report: HealthReport = response
            .json()
            .await
            .context("health response was not valid JSON")?;

        if !status.is_success() {
            bail!("server returned {status}");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderConfig;

    #[test]
    fn chat_response_with_command_record_parses() {
        let body = r#"{
            "success": true,
            "response": "Hello",
            "command_executed": {
                "command": "oc get pods",
                "success": true,
                "output": "pod/a Running"
            }
        }"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.success);
        let cmd = parsed.command_executed.unwrap();
        assert_eq!(cmd.command, "oc get pods");
        assert_eq!(cmd.output.as_deref(), Some("pod/a Running"));
        assert!(cmd.error.is_none());
    }

    #[test]
    fn chat_failure_carries_error_text() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"success":false,"error":"rate limited"}"#).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.error.as_deref(), Some("rate limited"));
        assert!(parsed.command_executed.is_none());
    }

    #[test]
    fn settings_request_flattens_config_and_flag() {
        let config = ProviderConfig::Groq {
            api_key: "gsk-1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
        };
        let value = serde_json::to_value(SettingsRequest {
            config: &config,
            test_connection: Some(true),
        })
        .unwrap();
        assert_eq!(value["provider"], "groq");
        assert_eq!(value["config"]["api_key"], "gsk-1");
        assert_eq!(value["test_connection"], true);

        let value = serde_json::to_value(SettingsRequest {
            config: &config,
            test_connection: None,
        })
        .unwrap();
        assert!(value.get("test_connection").is_none());
    }

    #[test]
    fn health_report_parses_tool_map() {
        let body = r#"{
            "status": "healthy",
            "provider": "groq",
            "cli_tools": {"oc": "4.15.0\nextra", "rosa": "1.2.40"}
        }"#;
        let report: HealthReport = serde_json::from_str(body).unwrap();
        assert!(report.is_healthy());
        assert_eq!(report.cli_tools.len(), 2);
        assert_eq!(report.cli_tools["rosa"], "1.2.40");
    }
}
