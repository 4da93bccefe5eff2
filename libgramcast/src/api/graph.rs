//! Graph API client
//!
//! Thin reqwest wrapper over the three publishing endpoints and the
//! container status endpoint. The access token is sent as a form/query
//! parameter on every call, which is how this API authenticates.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::api::{ContainerStatus, PublishApi, StatusCode};
use crate::config::Config;
use crate::error::{ApiError, Result};

/// Bound on ordinary request calls; the long waits in this system come
/// from the readiness polling loop, not from any single request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GraphClient {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ApiError::Request)?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            http,
            base_url,
            access_token: access_token.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.graph_url.clone(), config.access_token.clone())
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "POST");

        let response = self
            .http
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(ApiError::Request)?;

        read_json(response).await
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(ApiError::Request)?;

        read_json(response).await
    }
}

#[async_trait]
impl PublishApi for GraphClient {
    async fn create_container(
        &self,
        account_id: &str,
        image_url: &str,
        caption: Option<&str>,
        carousel_item: bool,
    ) -> Result<String> {
        let mut form: Vec<(&str, &str)> = vec![
            ("image_url", image_url),
            ("access_token", &self.access_token),
        ];
        if let Some(caption) = caption {
            form.push(("caption", caption));
        }
        if carousel_item {
            form.push(("is_carousel_item", "true"));
        }

        let body = self.post_form(&format!("{}/media", account_id), &form).await?;
        id_field(&body)
    }

    async fn create_carousel_container(
        &self,
        account_id: &str,
        children: &[String],
        caption: &str,
    ) -> Result<String> {
        let children = children.join(",");
        let form: Vec<(&str, &str)> = vec![
            ("media_type", "CAROUSEL"),
            ("children", &children),
            ("caption", caption),
            ("access_token", &self.access_token),
        ];

        let body = self.post_form(&format!("{}/media", account_id), &form).await?;
        id_field(&body)
    }

    async fn publish(&self, account_id: &str, container_id: &str) -> Result<String> {
        let form: Vec<(&str, &str)> = vec![
            ("creation_id", container_id),
            ("access_token", &self.access_token),
        ];

        let body = self
            .post_form(&format!("{}/media_publish", account_id), &form)
            .await?;
        id_field(&body)
    }

    async fn container_status(&self, container_id: &str) -> Result<ContainerStatus> {
        let query: Vec<(&str, &str)> = vec![
            ("fields", "status_code,status"),
            ("access_token", &self.access_token),
        ];

        let body = self.get_json(container_id, &query).await?;
        parse_status(&body)
    }
}

/// Turn a response into JSON, mapping non-2xx bodies into the structured
/// remote error they carry.
async fn read_json(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await.map_err(ApiError::Request)?;

    if !status.is_success() {
        return Err(ApiError::Remote {
            status: status.as_u16(),
            message: remote_error_message(&text),
        }
        .into());
    }

    serde_json::from_str(&text)
        .map_err(|e| ApiError::UnexpectedResponse(format!("invalid JSON body: {}", e)).into())
}

/// Extract the error message from a Graph error body
/// (`{"error": {"message": ...}}`), falling back to the raw body.
fn remote_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn id_field(body: &Value) -> Result<String> {
    body.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ApiError::UnexpectedResponse(format!("response missing id field: {}", body)).into()
        })
}

fn parse_status(body: &Value) -> Result<ContainerStatus> {
    let code = body
        .get("status_code")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ApiError::UnexpectedResponse(format!("response missing status_code field: {}", body))
        })?;

    Ok(ContainerStatus {
        code: StatusCode::parse(code),
        detail: body
            .get("status")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_strips_trailing_slash() {
        let client = GraphClient::new("https://graph.example.com/v19.0/", "token").unwrap();
        assert_eq!(client.base_url, "https://graph.example.com/v19.0");
    }

    #[test]
    fn test_id_field_present() {
        let body = json!({"id": "17900001"});
        assert_eq!(id_field(&body).unwrap(), "17900001");
    }

    #[test]
    fn test_id_field_missing() {
        let body = json!({"ok": true});
        assert!(id_field(&body).is_err());
    }

    #[test]
    fn test_parse_status_with_detail() {
        let body = json!({"status_code": "ERROR", "status": "Media type unsupported"});
        let status = parse_status(&body).unwrap();
        assert_eq!(status.code, StatusCode::Error);
        assert_eq!(status.detail.as_deref(), Some("Media type unsupported"));
    }

    #[test]
    fn test_parse_status_without_detail() {
        let body = json!({"status_code": "IN_PROGRESS"});
        let status = parse_status(&body).unwrap();
        assert_eq!(status.code, StatusCode::InProgress);
        assert_eq!(status.detail, None);
    }

    #[test]
    fn test_parse_status_missing_code() {
        let body = json!({"status": "no code here"});
        assert!(parse_status(&body).is_err());
    }

    #[test]
    fn test_remote_error_message_structured() {
        let body = r#"{"error": {"message": "Invalid OAuth access token", "type": "OAuthException", "code": 190}}"#;
        assert_eq!(remote_error_message(body), "Invalid OAuth access token");
    }

    #[test]
    fn test_remote_error_message_unstructured_falls_back_to_body() {
        assert_eq!(remote_error_message("Bad Gateway"), "Bad Gateway");
    }
}
