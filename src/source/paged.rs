//! Server-paginated source
//!
//! Walks a list endpoint by following the continuation link in each
//! response body:
//!
//! ```text
//! { "_embedded": { "users": [ ... ] },
//!   "_links": { "next": { "href": "https://.../users?cursor=..." } } }
//! ```
//!
//! A response without `_links.next` is the last page.

use super::types::{RecordSource, WorkBatch};
use crate::error::Result;
use crate::http::{ApiClient, RequestConfig};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

/// Paging progress
#[derive(Debug, Clone, Default)]
pub struct PageState {
    /// Pages fetched so far
    pub pages_fetched: u64,
    /// Items seen so far
    pub total_fetched: u64,
    /// Next page URL
    pub next_url: Option<String>,
    /// Whether the last page has been read
    pub done: bool,
}

/// Source over a paginated list endpoint
#[derive(Debug)]
pub struct PagedSource {
    client: ApiClient,
    first_url: String,
    collection: String,
    filter: Option<String>,
    state: PageState,
}

impl PagedSource {
    /// Create a source for `first_url` whose items sit under
    /// `_embedded.<collection>`
    pub fn new(client: ApiClient, first_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            client,
            first_url: first_url.into(),
            collection: collection.into(),
            filter: None,
            state: PageState::default(),
        }
    }

    /// Restrict the listing with a server-side `filter` expression
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Paging progress
    pub fn state(&self) -> &PageState {
        &self.state
    }

    fn first_request(&self) -> RequestConfig {
        match &self.filter {
            Some(filter) => RequestConfig::new().query("filter", filter),
            None => RequestConfig::new(),
        }
    }

    fn extract_items(&self, body: &Value) -> Vec<Value> {
        match body
            .get("_embedded")
            .and_then(|embedded| embedded.get(&self.collection))
        {
            Some(Value::Array(items)) => items.clone(),
            _ => {
                debug!("Page has no _embedded.{} array", self.collection);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl RecordSource for PagedSource {
    type Item = Value;

    async fn next_batch(&mut self, token: &str) -> Result<WorkBatch<Value>> {
        if self.state.done {
            return Ok(WorkBatch::last(Vec::new()));
        }

        let (url, config) = match self.state.next_url.take() {
            // The continuation link already carries the filter
            Some(next) => (next, RequestConfig::new()),
            None => (self.first_url.clone(), self.first_request()),
        };

        let body = self.client.get_json(&url, token, config).await?;
        let items = self.extract_items(&body);

        self.state.pages_fetched += 1;
        self.state.total_fetched += items.len() as u64;
        info!(
            "Page {} retrieved: {} {}",
            self.state.pages_fetched,
            items.len(),
            self.collection
        );

        match next_link(&body) {
            Some(href) => {
                let next = resolve_link(&url, &href)?;
                self.state.next_url = Some(next.clone());
                Ok(WorkBatch::more(items, next))
            }
            None => {
                self.state.done = true;
                Ok(WorkBatch::last(items))
            }
        }
    }

    async fn record_count(&mut self, token: &str) -> Result<Option<u64>> {
        let body = self
            .client
            .get_json(&self.first_url, token, self.first_request())
            .await?;

        Ok(body
            .get("count")
            .or_else(|| body.get("size"))
            .and_then(Value::as_u64))
    }

    fn is_done(&self) -> bool {
        self.state.done
    }
}

/// Extract `_links.next.href`, ignoring empty links
fn next_link(body: &Value) -> Option<String> {
    body.get("_links")?
        .get("next")?
        .get("href")?
        .as_str()
        .filter(|href| !href.is_empty())
        .map(String::from)
}

/// Resolve a possibly relative continuation link against the page it came from
fn resolve_link(current: &str, href: &str) -> Result<String> {
    match Url::parse(href) {
        Ok(url) => Ok(url.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(Url::parse(current)?.join(href)?.to_string()),
        Err(e) => Err(e.into()),
    }
}
