//! User import

use super::expect_status;
use crate::error::Result;
use crate::executor::ItemOperation;
use crate::http::{ApiClient, RequestConfig};
use crate::mapping::{map_record, MapperConfig};
use crate::source::Record;
use async_trait::async_trait;
use reqwest::StatusCode;

/// Media type that switches the create endpoint to import semantics
pub const IMPORT_CONTENT_TYPE: &str = "application/vnd.pingidentity.user.import+json";

/// Creates users from mapped CSV records
#[derive(Debug, Clone)]
pub struct ImportUser {
    client: ApiClient,
    users_url: String,
    mapper: MapperConfig,
}

impl ImportUser {
    /// Create an import operation against an environment's resource root
    pub fn new(client: ApiClient, api_root: &str, mapper: MapperConfig) -> Self {
        Self {
            client,
            users_url: format!("{}/users", api_root.trim_end_matches('/')),
            mapper,
        }
    }
}

#[async_trait]
impl ItemOperation<Record> for ImportUser {
    fn identify(&self, item: &Record) -> String {
        match item.get("username").filter(|u| !u.is_empty()) {
            Some(username) => username.to_string(),
            None => format!("[unknown] line {}", item.line()),
        }
    }

    async fn apply(&self, item: &Record, token: &str) -> Result<()> {
        let body = map_record(item, &self.mapper).to_json();
        let config = RequestConfig::new().json_as(IMPORT_CONTENT_TYPE, body);
        let response = self.client.post(&self.users_url, token, config).await?;
        expect_status(response, StatusCode::CREATED).await
    }
}
