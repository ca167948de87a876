//! PostgreSQL report tests.
//!
//! These need DATABASE_URL pointing at a database that has an Employee table.

use super::common::run_report;
use employee_report::config::ConnectionConfig;
use employee_report::db::PostgresProvider;
use employee_report::error::ReportError;
use employee_report::report::render::{CONNECTION_FAILED, SEPARATOR};

/// Helper to get test database URL from environment.
fn get_test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

/// Helper to create a test provider.
fn get_test_provider() -> Option<PostgresProvider> {
    let url = get_test_database_url()?;
    let config = ConnectionConfig::from_connection_string(&url).ok()?;
    Some(PostgresProvider::new(config))
}

#[tokio::test]
async fn test_postgres_report_matches_row_count() {
    let Some(provider) = get_test_provider() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let (result, output) = run_report(&provider).await;
    let summary = result.unwrap();

    let data_lines = output
        .lines()
        .skip_while(|l| *l != SEPARATOR)
        .skip(1)
        .take_while(|l| *l != SEPARATOR)
        .count();
    assert_eq!(data_lines, summary.rows);
}

#[tokio::test]
async fn test_postgres_report_is_repeatable() {
    let Some(provider) = get_test_provider() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let (_, first) = run_report(&provider).await;
    let (_, second) = run_report(&provider).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_postgres_bad_credentials() {
    let Some(url) = get_test_database_url() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let mut config = ConnectionConfig::from_connection_string(&url).unwrap();
    config.user = Some("no_such_user_xyz".to_string());
    config.password = Some("wrong".to_string());

    let (result, output) = run_report(&PostgresProvider::new(config)).await;
    assert!(matches!(result, Err(ReportError::Connection(_))));
    assert_eq!(output, format!("{CONNECTION_FAILED}\n"));
}
