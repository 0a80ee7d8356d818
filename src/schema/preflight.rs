//! Import preflight checks
//!
//! Runs before any row is imported. Every failure here is fatal.

use super::types::{AttributeDefinition, Population, UserAttributes};
use crate::error::{Error, Result};
use crate::http::{ApiClient, RequestConfig};
use crate::mapping::is_reserved;
use crate::types::JsonValue;
use tracing::{debug, error, info};

/// Read the user attribute paths of an environment
///
/// Uses the first schema the environment reports.
pub async fn fetch_user_attributes(
    client: &ApiClient,
    api_root: &str,
    token: &str,
) -> Result<UserAttributes> {
    let root = api_root.trim_end_matches('/');

    let schemas = client
        .get_json(&format!("{root}/schemas"), token, RequestConfig::new())
        .await?;
    let schema_id = schemas
        .pointer("/_embedded/schemas/0/id")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::decode("environment reported no user schema"))?;
    debug!("Using schema {}", schema_id);

    let body = client
        .get_json(
            &format!("{root}/schemas/{schema_id}/attributes"),
            token,
            RequestConfig::new(),
        )
        .await?;
    let definitions: Vec<AttributeDefinition> = embedded(&body, "attributes")?;

    let attributes = UserAttributes::from_definitions(&definitions);
    info!("Read {} user attribute paths", attributes.len());
    Ok(attributes)
}

/// Every non-reserved header must name a known attribute path
///
/// All mismatches are logged; the first one is returned.
pub fn check_headers(headers: &[String], attributes: &UserAttributes) -> Result<()> {
    let unknown: Vec<&String> = headers
        .iter()
        .filter(|h| !is_reserved(h) && !attributes.contains(h))
        .collect();

    for header in &unknown {
        error!("CSV header '{}' is not a user attribute", header);
    }

    match unknown.first() {
        Some(header) => Err(Error::SchemaMismatch {
            header: (*header).clone(),
        }),
        None => Ok(()),
    }
}

/// List the populations of an environment
pub async fn list_populations(
    client: &ApiClient,
    api_root: &str,
    token: &str,
) -> Result<Vec<Population>> {
    let url = format!("{}/populations", api_root.trim_end_matches('/'));
    let body = client.get_json(&url, token, RequestConfig::new()).await?;
    embedded(&body, "populations")
}

/// The population must exist in the environment
pub fn check_population(populations: &[Population], id: &str) -> Result<()> {
    if populations.iter().any(|p| p.id == id) {
        Ok(())
    } else {
        Err(Error::UnknownPopulation { id: id.to_string() })
    }
}

fn embedded<T: serde::de::DeserializeOwned>(body: &JsonValue, collection: &str) -> Result<Vec<T>> {
    let items = body
        .get("_embedded")
        .and_then(|e| e.get(collection))
        .cloned()
        .ok_or_else(|| Error::decode(format!("response has no _embedded.{collection}")))?;
    Ok(serde_json::from_value(items)?)
}
