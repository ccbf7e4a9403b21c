//! SQL script splitter
//!
//! Splits a script on `;` while treating semicolons inside single-quoted
//! strings, parentheses and `--` line comments as ordinary text.
//!
//! The quote handling is a plain toggle on every `'`. A doubled quote (`''`)
//! toggles twice and so survives, but backslash escapes such as `E'it\'s'`
//! leave the splitter inside a string. Block comments, double-quoted
//! identifiers and dollar quoting are not recognised.

/// Incremental statement splitter.
///
/// The splitter is a left fold over the characters of a script: feed every
/// character (with one character of lookahead) through [`push`](Self::push),
/// then call [`finish`](Self::finish) to collect the statements.
#[derive(Debug, Clone, Default)]
pub struct StatementSplitter {
    /// Open parentheses seen outside quotes. Goes negative on unbalanced `)`.
    paren_depth: i32,
    in_quote: bool,
    in_line_comment: bool,
    buffer: String,
    statements: Vec<String>,
}

impl StatementSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one character. `next` is the character that follows it, if any.
    pub fn push(&mut self, ch: char, next: Option<char>) {
        if self.in_line_comment {
            if ch == '\n' {
                self.in_line_comment = false;
            }
            self.buffer.push(ch);
            return;
        }

        if ch == '-' && next == Some('-') && !self.in_quote {
            self.in_line_comment = true;
            self.buffer.push(ch);
            return;
        }

        if ch == '\'' {
            self.in_quote = !self.in_quote;
            self.buffer.push(ch);
            return;
        }

        if !self.in_quote {
            match ch {
                '(' => self.paren_depth += 1,
                ')' => self.paren_depth -= 1,
                _ => {}
            }
        }

        if ch == ';' && self.paren_depth == 0 && !self.in_quote {
            self.flush();
        } else {
            self.buffer.push(ch);
        }
    }

    /// Feed a whole chunk of text
    pub fn push_str(&mut self, text: &str) {
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            self.push(ch, chars.peek().copied());
        }
    }

    /// Current parenthesis depth
    pub fn paren_depth(&self) -> i32 {
        self.paren_depth
    }

    /// Whether the splitter is inside a single-quoted string
    pub fn in_quote(&self) -> bool {
        self.in_quote
    }

    /// Whether the splitter is inside a `--` comment
    pub fn in_line_comment(&self) -> bool {
        self.in_line_comment
    }

    /// Emit the trailing fragment and return all statements in source order
    pub fn finish(mut self) -> Vec<String> {
        self.flush();
        self.statements
    }

    fn flush(&mut self) {
        let trimmed = trim_blank(&self.buffer);
        if !trim_blank(&strip_line_comments(trimmed)).is_empty() {
            self.statements.push(trimmed.to_string());
        }
        self.buffer.clear();
    }
}

/// Trim whitespace and byte-order marks from both ends
fn trim_blank(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Split a multi-statement SQL script into individual statements.
///
/// Statements are trimmed (including a leading byte-order mark) and lose their terminating `;`. Comments inside a
/// statement are kept; fragments that hold nothing but comments and
/// whitespace are dropped.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut splitter = StatementSplitter::new();
    splitter.push_str(sql);
    splitter.finish()
}

/// Remove every `--` comment up to the end of its line.
///
/// Quotes are not considered, so a `--` inside a string literal also cuts
/// the rest of that line. Line terminators are kept.
pub fn strip_line_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut in_comment = false;

    while let Some(ch) = chars.next() {
        if in_comment {
            if is_line_terminator(ch) {
                in_comment = false;
                out.push(ch);
            }
            continue;
        }

        if ch == '-' && chars.peek() == Some(&'-') {
            chars.next();
            in_comment = true;
            continue;
        }

        out.push(ch);
    }

    out
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}
