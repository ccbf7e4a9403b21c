//! Script splitting and sequential batch execution
//!
//! Turns the text of a SQL file into individually executable statements and
//! runs them one at a time against a [`sqlrun_core::Connection`], reporting
//! every statement's outcome as it completes.

pub mod batch;
#[cfg(any(test, feature = "test-support"))]
pub mod test_helpers;

pub use batch::{
    BatchExecutor, BatchResult, BatchSummary, DEFAULT_PREVIEW_WIDTH, StatementError,
    StatementOutcome, StatementSplitter, command_verb, reports_row_count, split_statements,
    statement_preview, strip_line_comments,
};
