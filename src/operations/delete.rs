//! User deletion

use super::expect_status;
use crate::error::{Error, Result};
use crate::executor::ItemOperation;
use crate::http::ApiClient;
use crate::types::JsonValue;
use async_trait::async_trait;
use reqwest::StatusCode;

/// Deletes listed user objects by id
#[derive(Debug, Clone)]
pub struct DeleteUser {
    client: ApiClient,
    api_root: String,
}

impl DeleteUser {
    /// Create a delete operation against an environment's resource root
    pub fn new(client: ApiClient, api_root: impl Into<String>) -> Self {
        Self {
            client,
            api_root: api_root.into().trim_end_matches('/').to_string(),
        }
    }

    fn user_url(&self, id: &str) -> String {
        format!("{}/users/{}", self.api_root, id)
    }
}

#[async_trait]
impl ItemOperation<JsonValue> for DeleteUser {
    fn identify(&self, item: &JsonValue) -> String {
        item.get("id")
            .and_then(JsonValue::as_str)
            .unwrap_or("[no id]")
            .to_string()
    }

    async fn apply(&self, item: &JsonValue, token: &str) -> Result<()> {
        let id = item
            .get("id")
            .and_then(JsonValue::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::decode("listed user has no id"))?;

        let response = self.client.delete(&self.user_url(id), token).await?;
        expect_status(response, StatusCode::NO_CONTENT).await
    }
}
