//! Short descriptions of statements for console output

use super::strip_line_comments;

/// Number of characters shown when a failing statement is echoed back
pub const DEFAULT_PREVIEW_WIDTH: usize = 80;

/// Statement leaders whose completion message carries a row count
const COUNTED_VERBS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "SELECT", "MERGE", "MOVE", "FETCH", "COPY", "WITH", "TABLE",
    "VALUES",
];

/// One-line preview of a statement: comments stripped, whitespace collapsed,
/// truncated to `max_chars` characters.
pub fn statement_preview(sql: &str, max_chars: usize) -> String {
    let stripped = strip_line_comments(sql);
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(max_chars).collect()
}

/// Leading keyword of a statement, upper-cased (e.g. `CREATE`, `INSERT`).
///
/// Returns `None` when the statement has no leading keyword.
pub fn command_verb(sql: &str) -> Option<String> {
    let stripped = strip_line_comments(sql);
    let verb: String = stripped
        .trim_start_matches(|c: char| c.is_whitespace() || c == '(')
        .chars()
        .take_while(|c| c.is_ascii_alphabetic() || *c == '_')
        .collect();

    (!verb.is_empty()).then(|| verb.to_ascii_uppercase())
}

/// Whether the server reports an affected-row count for statements led by `verb`
pub fn reports_row_count(verb: &str) -> bool {
    COUNTED_VERBS.iter().any(|v| v.eq_ignore_ascii_case(verb))
}
