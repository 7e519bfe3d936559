//! Ad-hoc SQL execution
//!
//! Off unless `sqlserver.allow_raw_sql` is set. The statement text is passed
//! to the store unchanged; only the leading keyword decides whether rows are
//! read back.

use crate::adapters::database::{with_session, SqlOutcome, StoreConnector};
use crate::domain::connection::ConnectionDescriptor;
use crate::domain::{AdminError, Result};

const ROW_KEYWORDS: [&str; 3] = ["SELECT", "WITH", "EXEC"];

/// True when the statement is expected to return a result set
///
/// Leading whitespace, `--` line comments and `/* */` block comments are
/// skipped before the keyword is read.
pub fn returns_rows(sql: &str) -> bool {
    let keyword: String = strip_leading_comments(sql)
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase();
    ROW_KEYWORDS.iter().any(|k| *k == keyword || (*k == "EXEC" && keyword == "EXECUTE"))
}

fn strip_leading_comments(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start();
        if let Some(rest) = sql.strip_prefix("--") {
            sql = rest.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            sql = rest.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            return sql;
        }
    }
}

/// Runs `sql` in a fresh session
///
/// # Errors
///
/// [`AdminError::Authentication`] when raw SQL is disabled and
/// [`AdminError::Validation`] for empty text, both before connecting.
pub async fn execute_sql(
    connector: &dyn StoreConnector,
    descriptor: &ConnectionDescriptor,
    sql: &str,
    allowed: bool,
) -> Result<SqlOutcome> {
    if !allowed {
        return Err(AdminError::Authentication(
            "Chức năng thực thi SQL đang bị tắt".to_string(),
        ));
    }
    let statement = sql.trim();
    if statement.is_empty() {
        return Err(AdminError::Validation("Câu lệnh SQL trống".to_string()));
    }
    descriptor.validate()?;

    tracing::info!(
        server = %descriptor.server,
        database = %descriptor.database,
        length = statement.len(),
        returns_rows = returns_rows(statement),
        "Executing raw SQL"
    );

    let statement = statement.to_string();
    with_session(connector, descriptor, move |session| {
        Box::pin(async move { session.execute_raw(&statement).await })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::InMemoryStore;
    use crate::config::secret_string;
    use test_case::test_case;

    #[test_case("SELECT 1" => true ; "select")]
    #[test_case("  select * from tblBenhNhan" => true ; "lowercase with indent")]
    #[test_case("WITH x AS (SELECT 1) SELECT * FROM x" => true ; "cte")]
    #[test_case("EXEC sp_who" => true ; "exec")]
    #[test_case("execute sp_who" => true ; "execute")]
    #[test_case("-- note\nSELECT 1" => true ; "line comment")]
    #[test_case("/* a */ select 1" => true ; "block comment")]
    #[test_case("UPDATE tblBenhNhan SET sohoso = 1" => false ; "update")]
    #[test_case("SELECTED" => false ; "keyword prefix only")]
    #[test_case("-- only a comment" => false ; "comment only")]
    fn test_returns_rows(sql: &str) -> bool {
        returns_rows(sql)
    }

    fn descriptor() -> ConnectionDescriptor {
        ConnectionDescriptor::sql_login("localhost", "clinic", "sa", secret_string("pw".into()))
    }

    #[tokio::test]
    async fn test_disabled_by_default() {
        let store = InMemoryStore::new();
        let err = execute_sql(&store, &descriptor(), "SELECT 1", false)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Authentication(_)));
        assert_eq!(store.session_counts(), (0, 0));
    }

    #[tokio::test]
    async fn test_empty_statement_rejected() {
        let store = InMemoryStore::new();
        let err = execute_sql(&store, &descriptor(), "   ", true).await.unwrap_err();
        assert!(matches!(err, AdminError::Validation(_)));
    }

    #[tokio::test]
    async fn test_statement_forwarded_trimmed() {
        let store = InMemoryStore::new();
        let outcome = execute_sql(&store, &descriptor(), " DELETE FROM t \n", true)
            .await
            .unwrap();

        assert_eq!(outcome, SqlOutcome::Affected { rows_affected: 0 });
        assert_eq!(store.executed_sql(), vec!["DELETE FROM t".to_string()]);
        assert_eq!(store.session_counts(), (1, 1));
    }
}
