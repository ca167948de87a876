//! Database abstraction layer for the employee report.
//!
//! Provides a trait-based interface for acquiring connections and reading
//! employee rows, allowing different database backends to be used
//! interchangeably.

mod mock;
mod postgres;
mod sqlite;
mod types;

pub use mock::{MockFailure, MockProvider, ResourceEvent, ResourceLog};
pub use postgres::{PostgresConnection, PostgresProvider};
pub use sqlite::{SqliteConnection, SqliteProvider};
pub use types::{columns, Employee, EMPLOYEE_QUERY};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Returns the default port for this backend (0 when it has none).
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Postgres => 5432,
            Self::Sqlite => 0,
        }
    }
}

impl std::str::FromStr for DatabaseBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!("Invalid database backend: {s}. Expected: postgres or sqlite")
        })
    }
}

/// Creates the connection provider for the configured backend.
///
/// This is the central factory for database access. No connection is opened
/// until [`ConnectionProvider::get_connection`] is called.
pub fn provider_for(config: &ConnectionConfig) -> Box<dyn ConnectionProvider> {
    match config.backend {
        DatabaseBackend::Postgres => Box::new(PostgresProvider::new(config.clone())),
        DatabaseBackend::Sqlite => Box::new(SqliteProvider::new(config.clone())),
    }
}

/// Supplies live database connections.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Opens a new connection.
    ///
    /// Fails with a `Connection` error when the database is unreachable, the
    /// credentials are rejected, or the configuration is incomplete. The
    /// caller owns the returned connection and must release it with
    /// [`DatabaseConnection::close`].
    async fn get_connection(&self) -> Result<Box<dyn DatabaseConnection>>;
}

/// An open connection to the employee database.
#[async_trait]
pub trait DatabaseConnection: Send {
    /// Executes `sql` and passes every decoded row to `on_row`, in the order
    /// the database returns them.
    ///
    /// The statement and its result cursor live only for the duration of this
    /// call; both are released before it returns, whether iteration finished,
    /// the database failed, or `on_row` returned an error. Returns the number
    /// of rows handed to `on_row`.
    async fn for_each_employee(
        &mut self,
        sql: &str,
        on_row: &mut (dyn FnMut(Employee) -> Result<()> + Send),
    ) -> Result<usize>;

    /// Closes the connection.
    async fn close(self: Box<Self>) -> Result<()>;
}
