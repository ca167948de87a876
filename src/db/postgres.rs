//! PostgreSQL connection provider.
//!
//! Provides `PostgresProvider` and `PostgresConnection`, implementing the
//! provider and connection traits for PostgreSQL using sqlx.

use crate::config::ConnectionConfig;
use crate::db::{ConnectionProvider, DatabaseConnection, Employee};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::postgres::PgConnection;
use sqlx::Connection;
use tracing::debug;

/// Opens single PostgreSQL connections from an explicit configuration.
#[derive(Debug, Clone)]
pub struct PostgresProvider {
    config: ConnectionConfig,
}

impl PostgresProvider {
    /// Creates a provider for the given connection settings.
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ConnectionProvider for PostgresProvider {
    async fn get_connection(&self) -> Result<Box<dyn DatabaseConnection>> {
        let conn_str = self
            .config
            .to_connection_string()
            .map_err(|e| ReportError::connection(e.message()))?;

        debug!("Connecting to {}", self.config.display_string());
        let conn = PgConnection::connect(&conn_str)
            .await
            .map_err(|e| map_connection_error(e, &self.config))?;
        debug!("Connection opened");

        Ok(Box::new(PostgresConnection { conn }))
    }
}

/// A single open PostgreSQL connection.
#[derive(Debug)]
pub struct PostgresConnection {
    conn: PgConnection,
}

#[async_trait]
impl DatabaseConnection for PostgresConnection {
    async fn for_each_employee(
        &mut self,
        sql: &str,
        on_row: &mut (dyn FnMut(Employee) -> Result<()> + Send),
    ) -> Result<usize> {
        let mut count = 0;
        {
            // Unprepared statement: the cursor is dropped at the end of this scope.
            let mut rows = sqlx::raw_sql(sql).fetch(&mut self.conn);
            debug!("Statement executed, reading cursor");

            while let Some(row) = rows
                .try_next()
                .await
                .map_err(|e| ReportError::query(format_query_error(e)))?
            {
                on_row(Employee::from_row(&row)?)?;
                count += 1;
            }
        }
        debug!("Cursor and statement released after {} rows", count);
        Ok(count)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(|e| ReportError::connection(format!("Failed to close connection: {e}")))?;
        debug!("Connection closed");
        Ok(())
    }
}

/// Maps a sqlx connection error to a user-friendly ReportError.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> ReportError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        ReportError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        ReportError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        ReportError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("ssl") || error_str.contains("tls") {
        ReportError::connection(
            "Server requires SSL. Add '--param sslmode=require' or '?sslmode=require'.",
        )
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        ReportError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        ReportError::connection(error.to_string())
    }
}

/// Formats a sqlx query error, including PostgreSQL detail and hint fields.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }
        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }
        if let Some(table) = pg_error.table() {
            result.push_str("\n  TABLE: ");
            result.push_str(table);
        }
        if let Some(column) = pg_error.column() {
            result.push_str("\n  COLUMN: ");
            result.push_str(column);
        }
    }

    result
}
