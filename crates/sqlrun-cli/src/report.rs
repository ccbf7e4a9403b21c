//! Console report of a run
//!
//! Progress and results go to the output stream; failed statements go to the
//! error stream. The format is meant for a person watching the run.

use std::io::{self, Stderr, Stdout, Write};

use comfy_table::{Table, presets::UTF8_FULL};
use sqlrun_core::QueryResult;
use sqlrun_query::{BatchResult, StatementOutcome};

pub struct Reporter<O, E> {
    out: O,
    err: E,
    preview_width: usize,
}

impl Reporter<Stdout, Stderr> {
    pub fn stdio(preview_width: usize) -> Self {
        Self::new(io::stdout(), io::stderr(), preview_width)
    }
}

impl<O: Write, E: Write> Reporter<O, E> {
    pub fn new(out: O, err: E, preview_width: usize) -> Self {
        Self {
            out,
            err,
            preview_width,
        }
    }

    pub fn connected(&mut self) -> io::Result<()> {
        writeln!(self.out, "Connected to database successfully.")?;
        writeln!(self.out)
    }

    /// Report one finished statement
    pub fn statement(&mut self, result: &BatchResult) -> io::Result<()> {
        match &result.outcome {
            StatementOutcome::Rows(rows) => {
                writeln!(self.out, "---")?;
                writeln!(self.out, "{}", render_table(rows))
            }
            StatementOutcome::Command {
                command,
                affected_rows: Some(count),
            } => writeln!(self.out, "{}: {} row(s) affected", command, count),
            StatementOutcome::Command {
                command,
                affected_rows: None,
            } => writeln!(self.out, "{}: OK", command),
            StatementOutcome::Failed(error) => {
                self.out.flush()?;
                writeln!(self.err, "ERROR: {}...", result.preview(self.preview_width))?;
                writeln!(self.err, "  {}", error.message)?;
                writeln!(self.err)
            }
        }
    }

    pub fn done(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Done.")?;
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

/// Rows as a table with a leading `(index)` column
fn render_table(result: &QueryResult) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    let mut header = vec!["(index)".to_string()];
    header.extend(result.column_names().into_iter().map(str::to_string));
    table.set_header(header);

    for (index, row) in result.rows.iter().enumerate() {
        let mut cells = vec![index.to_string()];
        cells.extend(row.values.iter().map(|value| value.to_string()));
        table.add_row(cells);
    }

    table
}
