//! SQLite connection provider.
//!
//! Reads the employee table from a local database file. The file must already
//! exist unless the `mode=rwc` parameter asks for it to be created.

use crate::config::ConnectionConfig;
use crate::db::{ConnectionProvider, DatabaseConnection, Employee};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection as SqlxSqliteConnection};
use sqlx::Connection;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Opens single SQLite connections from an explicit configuration.
#[derive(Debug, Clone)]
pub struct SqliteProvider {
    config: ConnectionConfig,
}

impl SqliteProvider {
    /// Creates a provider for the given connection settings.
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ConnectionProvider for SqliteProvider {
    async fn get_connection(&self) -> Result<Box<dyn DatabaseConnection>> {
        let options = connect_options(&self.config)?;

        debug!("Opening {}", self.config.display_string());
        let conn = SqlxSqliteConnection::connect_with(&options)
            .await
            .map_err(|e| {
                let path = self.config.database.as_deref().unwrap_or("unknown");
                ReportError::connection(format!("Cannot open database file '{path}': {e}"))
            })?;
        debug!("Connection opened");

        Ok(Box::new(SqliteConnection { conn }))
    }
}

/// Builds connect options from the config.
///
/// The file path is passed to sqlx as-is rather than through a URL, so names
/// containing `%`, `?` or `#` open unchanged. Driver parameters are the ones
/// SQLite accepts in a URI: `mode`, `cache`, `immutable` and `vfs`.
fn connect_options(config: &ConnectionConfig) -> Result<SqliteConnectOptions> {
    let database = config
        .database
        .as_deref()
        .ok_or_else(|| ReportError::connection("Database name is required"))?;

    let mut options = if database == ":memory:" {
        SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| ReportError::connection(e.to_string()))?
    } else {
        SqliteConnectOptions::new().filename(database)
    };

    for (key, value) in &config.params {
        options = match (key.as_str(), value.as_str()) {
            ("mode", "ro") => options.read_only(true),
            ("mode", "rw") => options.read_only(false),
            ("mode", "rwc") => options.create_if_missing(true),
            ("cache", "shared") => options.shared_cache(true),
            ("cache", "private") => options.shared_cache(false),
            ("immutable", "1" | "true") => options.immutable(true),
            ("immutable", "0" | "false") => options.immutable(false),
            ("vfs", vfs) => options.vfs(vfs.to_string()),
            _ => {
                return Err(ReportError::connection(format!(
                    "Unsupported SQLite parameter '{key}={value}'"
                )))
            }
        };
    }

    Ok(options)
}

/// A single open SQLite connection.
#[derive(Debug)]
pub struct SqliteConnection {
    conn: SqlxSqliteConnection,
}

impl SqliteConnection {
    /// Opens a connection directly from a sqlx connection string.
    ///
    /// Used by tests that need to seed a database before reporting on it.
    pub async fn open(conn_str: &str) -> Result<Self> {
        let conn = SqlxSqliteConnection::connect(conn_str)
            .await
            .map_err(|e| ReportError::connection(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Opens `path`, creating the file if it does not exist.
    ///
    /// Used by tests that seed a database file before reporting on it.
    pub async fn create(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let conn = SqlxSqliteConnection::connect_with(&options)
            .await
            .map_err(|e| ReportError::connection(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Executes a batch of statements, discarding any rows.
    pub async fn execute_batch(&mut self, sql: &str) -> Result<()> {
        sqlx::raw_sql(sql)
            .execute(&mut self.conn)
            .await
            .map_err(|e| ReportError::query(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl DatabaseConnection for SqliteConnection {
    async fn for_each_employee(
        &mut self,
        sql: &str,
        on_row: &mut (dyn FnMut(Employee) -> Result<()> + Send),
    ) -> Result<usize> {
        let mut count = 0;
        {
            let mut rows = sqlx::raw_sql(sql).fetch(&mut self.conn);
            debug!("Statement executed, reading cursor");

            while let Some(row) = rows
                .try_next()
                .await
                .map_err(|e| ReportError::query(e.to_string()))?
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
