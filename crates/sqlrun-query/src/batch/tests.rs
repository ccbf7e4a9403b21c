//! Tests for script splitting and batch execution

use super::*;
use crate::test_helpers::{ScriptedConnection, text_rows};
use sqlrun_core::{SqlRunError, StatementResult};

mod splitter_tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_statement_without_terminator() {
        assert_eq!(split_statements("SELECT 1"), vec!["SELECT 1"]);
    }

    #[test]
    fn test_multiple_statements() {
        let script = indoc! {"
            CREATE TABLE t (id int);
            INSERT INTO t VALUES (1);
            SELECT * FROM t;
        "};

        assert_eq!(
            split_statements(script),
            vec![
                "CREATE TABLE t (id int)",
                "INSERT INTO t VALUES (1)",
                "SELECT * FROM t",
            ]
        );
    }

    #[test]
    fn test_semicolon_inside_string() {
        assert_eq!(
            split_statements("SELECT ';' AS x; SELECT 2;"),
            vec!["SELECT ';' AS x", "SELECT 2"]
        );
    }

    #[test]
    fn test_semicolon_inside_parentheses() {
        assert_eq!(
            split_statements("SELECT (1; 2) AS x; SELECT 3"),
            vec!["SELECT (1; 2) AS x", "SELECT 3"]
        );
    }

    #[test]
    fn test_semicolon_inside_line_comment() {
        let statements = split_statements("-- drop table;\nSELECT 1;");

        assert_eq!(statements, vec!["-- drop table;\nSELECT 1"]);
    }

    #[test]
    fn test_comment_only_fragments_are_dropped() {
        let script = indoc! {"
            -- header
            -- nothing to run here;
              ;
            SELECT 1; -- trailing note
        "};

        assert_eq!(split_statements(script), vec!["SELECT 1"]);
    }

    #[test]
    fn test_empty_and_blank_scripts() {
        assert!(split_statements("").is_empty());
        assert!(split_statements(" \n\t ").is_empty());
        assert!(split_statements(";;;").is_empty());
    }

    #[test]
    fn test_leading_byte_order_mark_is_trimmed() {
        assert_eq!(split_statements("\u{feff}SELECT 1;\n"), vec!["SELECT 1"]);
        assert!(split_statements("\u{feff}-- nothing here\n").is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(
            split_statements("SELECT 1;\r\nSELECT 2;\r\n"),
            vec!["SELECT 1", "SELECT 2"]
        );
    }

    #[test]
    fn test_dashes_inside_string_are_not_a_comment() {
        assert_eq!(
            split_statements("SELECT '--'; SELECT 2"),
            vec!["SELECT '--'", "SELECT 2"]
        );
    }

    #[test]
    fn test_doubled_quote_stays_in_string() {
        assert_eq!(
            split_statements("SELECT 'it''s; fine'; SELECT 2"),
            vec!["SELECT 'it''s; fine'", "SELECT 2"]
        );
    }

    #[test]
    fn test_backslash_escaped_quote_is_not_understood() {
        // The escaped quote closes the string, the final quote reopens it.
        let statements = split_statements(r"SELECT E'it\'s'; SELECT 2");

        assert_eq!(statements, vec![r"SELECT E'it\'s'; SELECT 2"]);
    }

    #[test]
    fn test_block_comments_are_not_recognised() {
        assert_eq!(
            split_statements("/* a; b */ SELECT 1"),
            vec!["/* a", "b */ SELECT 1"]
        );
    }

    #[test]
    fn test_unbalanced_close_paren_suppresses_splitting() {
        assert_eq!(
            split_statements("SELECT 1); SELECT 2; SELECT 3"),
            vec!["SELECT 1); SELECT 2; SELECT 3"]
        );
    }

    #[test]
    fn test_resplitting_joined_statements_is_stable() {
        let script = indoc! {"
            CREATE TABLE a (x text, y int);
            INSERT INTO a VALUES ('x;y', (1 + 2));
            SELECT count(*) FROM a
        "};

        let statements = split_statements(script);
        let again = split_statements(&statements.join(";"));

        assert_eq!(again, statements);
        assert_eq!(statements.len(), 3);
    }

    #[test]
    fn test_statements_are_trimmed_and_keep_inner_text() {
        let statements = split_statements("  \n UPDATE t\n   SET x = 1  ;  ");

        assert_eq!(statements, vec!["UPDATE t\n   SET x = 1"]);
    }

    #[test]
    fn test_incremental_state() {
        let mut splitter = StatementSplitter::new();
        splitter.push_str("INSERT INTO t VALUES ('(");
        assert!(splitter.in_quote());
        assert_eq!(splitter.paren_depth(), 1);

        splitter.push_str("'); -- done");
        assert!(!splitter.in_quote());
        assert_eq!(splitter.paren_depth(), 0);
        assert!(splitter.in_line_comment());

        splitter.push_str("\nSELECT 2");
        assert!(!splitter.in_line_comment());

        assert_eq!(
            splitter.finish(),
            vec!["INSERT INTO t VALUES ('(')", "-- done\nSELECT 2"]
        );
    }
}

mod strip_line_comments_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strips_to_end_of_line() {
        assert_eq!(
            strip_line_comments("SELECT 1 -- one\nSELECT 2"),
            "SELECT 1 \nSELECT 2"
        );
    }

    #[test]
    fn test_strips_trailing_comment_without_newline() {
        assert_eq!(strip_line_comments("SELECT 1 -- one"), "SELECT 1 ");
    }

    #[test]
    fn test_any_line_terminator_ends_comment() {
        assert_eq!(strip_line_comments("-- a\rSELECT 1"), "\rSELECT 1");
        assert_eq!(
            strip_line_comments("-- a\u{2028}SELECT 1"),
            "\u{2028}SELECT 1"
        );
    }

    #[test]
    fn test_ignores_quotes() {
        assert_eq!(strip_line_comments("SELECT '--x'"), "SELECT '");
    }

    #[test]
    fn test_single_dash_is_kept() {
        assert_eq!(strip_line_comments("SELECT 3 - 1"), "SELECT 3 - 1");
    }
}

mod preview_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_preview_collapses_whitespace_and_comments() {
        let sql = "  SELECT *\n   FROM   users -- all of them\n WHERE id = 1";

        assert_eq!(
            statement_preview(sql, DEFAULT_PREVIEW_WIDTH),
            "SELECT * FROM users WHERE id = 1"
        );
    }

    #[test]
    fn test_preview_truncates_by_characters() {
        assert_eq!(statement_preview("SELECT 1234567890", 8), "SELECT 1");
        assert_eq!(statement_preview("SELECT 'héllo'", 10), "SELECT 'hé");
    }

    #[test]
    fn test_command_verb() {
        assert_eq!(
            command_verb("insert into t values (1)"),
            Some("INSERT".to_string())
        );
        assert_eq!(
            command_verb("-- note\n  update t set x = 1"),
            Some("UPDATE".to_string())
        );
        assert_eq!(command_verb("(SELECT 1)"), Some("SELECT".to_string()));
        assert_eq!(
            command_verb("create_thing()"),
            Some("CREATE_THING".to_string())
        );
        assert_eq!(command_verb(""), None);
        assert_eq!(command_verb("123"), None);
    }

    #[test]
    fn test_command_verb_is_the_leading_keyword() {
        assert_eq!(
            command_verb("WITH moved AS (DELETE FROM a RETURNING *) INSERT INTO b SELECT * FROM moved"),
            Some("WITH".to_string())
        );
        assert_eq!(
            command_verb("CREATE TABLE t AS SELECT 1"),
            Some("CREATE".to_string())
        );
    }

    #[test]
    fn test_reports_row_count() {
        assert!(reports_row_count("INSERT"));
        assert!(reports_row_count("select"));
        assert!(reports_row_count("WITH"));
        assert!(!reports_row_count("CREATE"));
        assert!(!reports_row_count("BEGIN"));
    }
}

mod statement_error_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_statement_error_new() {
        let error = StatementError::new("test error");

        assert_eq!(error.message, "test error");
        assert!(error.code.is_none());
    }

    #[test]
    fn test_statement_error_display_with_code() {
        let error = StatementError::new("test error").with_code("42601");

        assert_eq!(error.to_string(), "[42601] test error");
    }

    #[test]
    fn test_from_database_error_keeps_code() {
        let error = StatementError::from(SqlRunError::Database {
            code: Some("42P01".into()),
            message: "relation \"nope\" does not exist".into(),
        });

        assert_eq!(error.message, "relation \"nope\" does not exist");
        assert_eq!(error.code.as_deref(), Some("42P01"));
    }

    #[test]
    fn test_from_other_errors_uses_display() {
        let error = StatementError::from(SqlRunError::Query("bad".into()));
        assert_eq!(error.message, "bad");

        let error = StatementError::from(SqlRunError::Closed);
        assert_eq!(error.message, SqlRunError::Closed.to_string());
        assert!(error.code.is_none());
    }

    #[test]
    fn test_statement_error_serialization() {
        let error = StatementError::new("boom").with_code("XX000");
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["message"], "boom");
        assert_eq!(json["code"], "XX000");
    }
}

mod statement_outcome_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ddl_has_no_count() {
        let outcome = StatementOutcome::from_result(
            "CREATE TABLE t (id int)",
            Ok(StatementResult::command(Some(0))),
        );

        match outcome {
            StatementOutcome::Command {
                command,
                affected_rows,
            } => {
                assert_eq!(command, "CREATE");
                assert_eq!(affected_rows, None);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_dml_reports_count() {
        let outcome = StatementOutcome::from_result(
            "update t set x = 1",
            Ok(StatementResult::command(Some(3))),
        );

        match outcome {
            StatementOutcome::Command {
                command,
                affected_rows,
            } => {
                assert_eq!(command, "UPDATE");
                assert_eq!(affected_rows, Some(3));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_statements_are_named_by_leading_keyword() {
        let with_insert = StatementOutcome::from_result(
            "WITH src AS (SELECT 1 AS x) INSERT INTO t SELECT x FROM src",
            Ok(StatementResult::command(Some(2))),
        );
        let create_as = StatementOutcome::from_result(
            "CREATE TABLE t2 AS SELECT * FROM t",
            Ok(StatementResult::command(Some(2))),
        );

        match (with_insert, create_as) {
            (
                StatementOutcome::Command {
                    command: with_command,
                    affected_rows: with_rows,
                },
                StatementOutcome::Command {
                    command: create_command,
                    affected_rows: create_rows,
                },
            ) => {
                assert_eq!(with_command, "WITH");
                assert_eq!(with_rows, Some(2));
                assert_eq!(create_command, "CREATE");
                assert_eq!(create_rows, None);
            }
            other => panic!("unexpected outcomes: {other:?}"),
        }
    }

    #[test]
    fn test_empty_result_set_is_a_command() {
        let outcome = StatementOutcome::from_result(
            "SELECT 1 WHERE false",
            Ok(text_rows(&["x"], &[])),
        );

        match outcome {
            StatementOutcome::Command {
                command,
                affected_rows,
            } => {
                assert_eq!(command, "SELECT");
                assert_eq!(affected_rows, Some(0));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_rows() {
        let outcome =
            StatementOutcome::from_result("SELECT 1 AS x", Ok(text_rows(&["x"], &[&[Some("1")]])));

        match outcome {
            StatementOutcome::Rows(result) => {
                assert_eq!(result.column_names(), vec!["x"]);
                assert_eq!(result.rows[0].get(0).and_then(|v| v.as_str()), Some("1"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_missing_verb_is_unknown() {
        let outcome = StatementOutcome::from_result("-- x\n;", Ok(StatementResult::command(None)));

        assert!(matches!(
            outcome,
            StatementOutcome::Command { ref command, affected_rows: None } if command == "UNKNOWN"
        ));
    }

    #[test]
    fn test_failure() {
        let outcome =
            StatementOutcome::from_result("SELECT", Err(SqlRunError::Query("syntax".into())));

        assert!(outcome.is_failed());
        assert!(!outcome.is_success());
    }
}

mod batch_executor_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// A one-table engine good enough to exercise the executor
    fn table_engine() -> ScriptedConnection {
        let rows: Mutex<Option<Vec<String>>> = Mutex::new(None);
        ScriptedConnection::new(move |sql| {
            let mut rows = rows.lock().unwrap();
            let upper = sql.to_ascii_uppercase();
            if upper.starts_with("CREATE TABLE T") {
                *rows = Some(Vec::new());
                Ok(StatementResult::command(None))
            } else if let Some(value) = upper.strip_prefix("INSERT INTO T VALUES (") {
                let table = rows.as_mut().ok_or_else(|| SqlRunError::Database {
                    code: Some("42P01".into()),
                    message: "relation \"t\" does not exist".into(),
                })?;
                table.push(value.trim_end_matches(')').to_string());
                Ok(StatementResult::command(Some(1)))
            } else if upper == "SELECT X FROM T" {
                let table = rows.as_ref().cloned().unwrap_or_default();
                let values: Vec<[Option<&str>; 1]> =
                    table.iter().map(|v| [Some(v.as_str())]).collect();
                let refs: Vec<&[Option<&str>]> = values.iter().map(|r| &r[..]).collect();
                Ok(text_rows(&["x"], &refs))
            } else {
                Err(SqlRunError::Database {
                    code: Some("42601".into()),
                    message: format!("syntax error at or near \"{}\"", sql),
                })
            }
        })
    }

    fn statements(script: &str) -> Vec<String> {
        split_statements(script)
    }

    #[tokio::test]
    async fn test_execute_in_order_with_streaming_results() {
        let conn = table_engine();
        let executor = BatchExecutor::new();
        let stmts = statements("CREATE TABLE t (x int); INSERT INTO t VALUES (1); SELECT x FROM t;");

        let mut seen = Vec::new();
        let summary = executor
            .execute(&conn, &stmts, |result| seen.push(result.clone()))
            .await;

        assert_eq!(summary.statement_count, 3);
        assert_eq!(summary.success_count, 3);
        assert!(summary.all_succeeded());
        assert_eq!(conn.executed(), stmts);

        assert_eq!(seen.iter().map(|r| r.index).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(matches!(
            &seen[0].outcome,
            StatementOutcome::Command { command, affected_rows: None } if command == "CREATE"
        ));
        assert!(matches!(
            &seen[1].outcome,
            StatementOutcome::Command { command, affected_rows: Some(1) } if command == "INSERT"
        ));
        match &seen[2].outcome {
            StatementOutcome::Rows(result) => {
                assert_eq!(result.row_count(), 1);
                assert_eq!(result.rows[0].get_by_name("x").and_then(|v| v.as_str()), Some("1"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_the_batch() {
        let conn = table_engine();
        let executor = BatchExecutor::new();
        let stmts = statements(
            "INSERT INTO t VALUES (0); SELEC oops; CREATE TABLE t (x int); INSERT INTO t VALUES (2);",
        );

        let mut seen = Vec::new();
        let summary = executor
            .execute(&conn, &stmts, |result| seen.push(result.clone()))
            .await;

        assert_eq!(summary.statement_count, 4);
        assert_eq!(summary.failure_count, 2);
        assert_eq!(summary.success_count, 2);
        assert!(summary.has_failures());
        assert_eq!(conn.executed().len(), 4);

        match &seen[0].outcome {
            StatementOutcome::Failed(error) => {
                assert_eq!(error.code.as_deref(), Some("42P01"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(seen[1].is_failed());
        assert!(seen[2].is_success());
        assert!(seen[3].is_success());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let conn = table_engine();
        let summary = BatchExecutor::new()
            .execute(&conn, &[], |_| panic!("no statements to report"))
            .await;

        assert_eq!(summary.statement_count, 0);
        assert!(summary.all_succeeded());
        assert!(conn.executed().is_empty());
    }

    #[tokio::test]
    async fn test_batch_result_preview() {
        let conn = table_engine();
        let result = BatchExecutor::new()
            .execute_single(&conn, 7, "SELEC   oops\n  -- typo\n FROM nowhere")
            .await;

        assert_eq!(result.index, 7);
        assert!(result.is_failed());
        assert_eq!(result.preview(DEFAULT_PREVIEW_WIDTH), "SELEC oops FROM nowhere");
        assert_eq!(result.preview(5), "SELEC");
    }
}
