//! Per-item eligibility filtering
//!
//! Used by the conditional delete modes. Items that do not qualify are
//! recorded as skipped and never reach the remote operation.

mod predicates;

pub use predicates::{
    inactivity_qualifies, unverified_age_qualifies, FilterPredicate, ItemFilter, PassAll,
    VERIFICATION_REQUIRED,
};

#[cfg(test)]
mod tests;
