//! Remote item operations
//!
//! The two per-item calls the bulk tools dispatch:
//! - `DeleteUser` - `DELETE {api}/users/{id}`, success on 204
//! - `ImportUser` - `POST {api}/users` with the import media type, success on 201

mod delete;
mod import;

pub use delete::DeleteUser;
pub use import::{ImportUser, IMPORT_CONTENT_TYPE};

use crate::error::{Error, Result};
use reqwest::{Response, StatusCode};

/// Require one exact success status
///
/// Any other 2xx is reported like a remote error so that it shows up in the
/// failure log.
async fn expect_status(response: Response, expected: StatusCode) -> Result<()> {
    let status = response.status();
    if status == expected {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::http_status(status.as_u16(), body))
}

#[cfg(test)]
mod tests;
