//! Batch query execution module
//!
//! This module splits a SQL script into statements and executes them in
//! order, continuing past failed statements.

mod executor;
mod preview;
mod splitter;
#[cfg(test)]
mod tests;

pub use executor::{BatchExecutor, BatchResult, BatchSummary, StatementError, StatementOutcome};
pub use preview::{DEFAULT_PREVIEW_WIDTH, command_verb, reports_row_count, statement_preview};
pub use splitter::{StatementSplitter, split_statements, strip_line_comments};
