//! Host platform persistence client
//!
//! Pushes the full widget config upstream after local saves. The core
//! adapter absorbs failures from this client into `SaveOutcome`; nothing
//! here retries or rolls back.

use std::sync::Arc;

use async_trait::async_trait;
use flowcal_core::{PlatformPush, PlatformPushFactory};
use flowcal_domain::{Board, FlowNode, Result, WidgetConfig};
use reqwest::Method;
use serde::Serialize;
use tracing::debug;

use crate::errors::require_success;
use crate::http::HttpClient;

/// HTTP client for the platform's widget persistence endpoint.
pub struct PlatformApiClient {
    http: HttpClient,
    base_url: String,
}

impl PlatformApiClient {
    pub fn new(platform_api_url: impl Into<String>) -> Result<Self> {
        let base_url = platform_api_url.into().trim_end_matches('/').to_string();
        Ok(Self { http: HttpClient::new()?, base_url })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WidgetPushBody<'a> {
    config: &'a FlowNode,
    board: &'a Board,
    user_id: i64,
    role: &'a str,
}

#[async_trait]
impl PlatformPush for PlatformApiClient {
    async fn push_widget_config(&self, config: &WidgetConfig) -> Result<()> {
        let body = WidgetPushBody {
            config: &config.config,
            board: &config.board,
            user_id: config.user_id,
            role: &config.role,
        };
        let url = format!("{}/widget/{}", self.base_url, config.widget_id);
        debug!(widget_id = config.widget_id, %url, "pushing widget config upstream");
        let request = self.http.request(Method::PUT, url).json(&body);
        require_success(self.http.send(request).await?).await?;
        Ok(())
    }
}

/// Factory binding [`PlatformApiClient`]s to platform URLs at resolution
/// time.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformClientFactory;

impl PlatformPushFactory for PlatformClientFactory {
    fn platform_push(&self, platform_api_url: &str) -> Result<Arc<dyn PlatformPush>> {
        Ok(Arc::new(PlatformApiClient::new(platform_api_url)?))
    }
}
