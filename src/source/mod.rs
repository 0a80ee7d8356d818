//! Record sources
//!
//! Supports: server-paginated listings and CSV files
//!
//! # Overview
//!
//! Both strategies sit behind [`RecordSource`]: the orchestrator asks for the
//! next bounded batch until the source reports that the final batch has been
//! produced. Sources are forward-only.

mod csv;
mod paged;
mod types;

pub use self::csv::{CsvSource, CSV_BATCH_SIZE};
pub use paged::{PageState, PagedSource};
pub use types::{Record, RecordSource, WorkBatch};
