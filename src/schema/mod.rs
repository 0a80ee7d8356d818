//! Import preflight
//!
//! Cross-checks a CSV file against the target environment before any row is
//! imported:
//!
//! - **Headers**: every non-reserved header must be a user attribute path
//!   (`name` for simple attributes, `name.sub` for complex ones)
//! - **Population**: the default population must exist

mod preflight;
mod types;

pub use preflight::{check_headers, check_population, fetch_user_attributes, list_populations};
pub use types::{
    AttributeDefinition, AttributeKind, Population, SubAttribute, UserAttributes, ALWAYS_ACCEPTED,
};
