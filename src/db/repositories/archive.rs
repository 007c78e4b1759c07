use anyhow::Result;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Statement};

pub struct ArchiveRepository {
    conn: DatabaseConnection,
}

impl ArchiveRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Zero-row existence probe.
    ///
    /// Only a table-does-not-exist error marks the candidate absent; any
    /// other outcome, including unrelated query errors, counts as present.
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let backend = self.conn.get_database_backend();
        let probe = format!(r#"SELECT 1 FROM "{table}" LIMIT 0"#);

        match self
            .conn
            .query_all(Statement::from_string(backend, probe))
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if is_undefined_table(&err) => Ok(false),
            Err(err) => {
                tracing::warn!("Archive probe for {table} failed, treating as present: {err}");
                Ok(true)
            }
        }
    }
}

/// Matches Postgres `undefined_table` (42P01) and the SQLite equivalent.
fn is_undefined_table(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("does not exist") || msg.contains("no such table")
}
