//! Shared helpers for integration tests.

use employee_report::config::ConnectionConfig;
use employee_report::db::{
    ConnectionProvider, DatabaseBackend, DatabaseConnection, SqliteConnection,
};
use employee_report::error::Result;
use employee_report::report::{ReportRunner, ReportSummary};
use tempfile::TempDir;

pub const CREATE_EMPLOYEE_TABLE: &str = "CREATE TABLE Employee (
    emp_id INTEGER PRIMARY KEY,
    emp_name TEXT NOT NULL,
    emp_department TEXT NOT NULL,
    emp_salary DECIMAL(10, 2) NOT NULL
);";

/// A SQLite database file that lives as long as the fixture.
pub struct SqliteFixture {
    _dir: TempDir,
    pub config: ConnectionConfig,
}

impl SqliteFixture {
    /// Creates a database file and runs `seed` against it.
    pub async fn new(seed: &str) -> Self {
        Self::with_file_name("employees.db", seed).await
    }

    /// Like [`SqliteFixture::new`], with a chosen database file name.
    pub async fn with_file_name(file_name: &str, seed: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(file_name);

        let mut conn = SqliteConnection::create(&path).await.unwrap();
        conn.execute_batch(seed).await.unwrap();
        Box::new(conn).close().await.unwrap();

        let config = ConnectionConfig {
            backend: DatabaseBackend::Sqlite,
            database: Some(path.display().to_string()),
            ..Default::default()
        };

        Self { _dir: dir, config }
    }
}

/// Runs the report and captures everything it prints.
pub async fn run_report(provider: &dyn ConnectionProvider) -> (Result<ReportSummary>, String) {
    let mut buf = Vec::new();
    let result = ReportRunner::new(provider).run(&mut buf).await;
    (result, String::from_utf8(buf).unwrap())
}
