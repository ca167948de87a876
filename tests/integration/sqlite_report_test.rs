//! End-to-end report tests against SQLite database files.

use super::common::{run_report, SqliteFixture, CREATE_EMPLOYEE_TABLE};
use employee_report::config::ConnectionConfig;
use employee_report::db::{self, DatabaseBackend, SqliteProvider};
use employee_report::error::ReportError;
use employee_report::report::render::{BANNER, CLOSED, CONNECTED, CONNECTION_FAILED, SEPARATOR};
use pretty_assertions::assert_eq;

fn seed(rows: &str) -> String {
    format!("{CREATE_EMPLOYEE_TABLE}\n{rows}")
}

/// Scenario: Table with a few employees
/// Given an Employee table with three rows
/// When the report runs
/// Then every row is printed once, aligned, with two-decimal salaries
#[tokio::test]
async fn test_report_prints_every_employee() {
    let fixture = SqliteFixture::new(&seed(
        "INSERT INTO Employee VALUES (1, 'Alice', 'Engineering', 75000.5);
         INSERT INTO Employee VALUES (2, 'Bob', 'Sales', 52000);
         INSERT INTO Employee VALUES (3, 'Carol', 'Finance', 61234.25);",
    ))
    .await;

    let provider = SqliteProvider::new(fixture.config.clone());
    let (result, output) = run_report(&provider).await;

    assert_eq!(result.unwrap().rows, 3);
    assert_eq!(
        output,
        "Database connection established successfully!\n\
         \n\
         ========== EMPLOYEE RECORDS ==========\n\
         ID\tNAME\t\tDEPARTMENT\tSALARY\n\
         =====================================\n\
         1\tAlice          \tEngineering \t75000.50\n\
         2\tBob            \tSales       \t52000.00\n\
         3\tCarol          \tFinance     \t61234.25\n\
         =====================================\n\
         \n\
         Connection closed successfully!\n"
    );
}

/// Scenario: Empty table
/// Given an Employee table with no rows
/// When the report runs
/// Then banners are printed with no data lines and the closing message follows
#[tokio::test]
async fn test_report_on_empty_table() {
    let fixture = SqliteFixture::new(CREATE_EMPLOYEE_TABLE).await;

    let provider = SqliteProvider::new(fixture.config.clone());
    let (result, output) = run_report(&provider).await;

    assert_eq!(result.unwrap().rows, 0);
    assert!(output.starts_with(CONNECTED));
    assert!(output.contains(BANNER));
    let separators: Vec<usize> = output
        .lines()
        .enumerate()
        .filter(|(_, l)| *l == SEPARATOR)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(separators.len(), 2);
    assert_eq!(separators[1], separators[0] + 1);
    assert!(output.ends_with(&format!("{CLOSED}\n")));
}

/// Scenario: Running twice
/// Given an unchanged table
/// When the report runs twice
/// Then both outputs are identical
#[tokio::test]
async fn test_report_is_repeatable() {
    let fixture = SqliteFixture::new(&seed(
        "INSERT INTO Employee VALUES (10, 'Dana', 'Legal', 88000.125);
         INSERT INTO Employee VALUES (11, 'Eve', 'Security', 99000);",
    ))
    .await;

    let provider = db::provider_for(&fixture.config);
    let (first, first_output) = run_report(provider.as_ref()).await;
    let (second, second_output) = run_report(provider.as_ref()).await;

    assert_eq!(first.unwrap(), second.unwrap());
    assert_eq!(first_output, second_output);
}

/// Scenario: Missing table
/// Given a database without an Employee table
/// When the report runs
/// Then a query error is returned after connecting, and no table is printed
#[tokio::test]
async fn test_report_without_employee_table() {
    let fixture = SqliteFixture::new("CREATE TABLE Department (id INTEGER);").await;

    let provider = SqliteProvider::new(fixture.config.clone());
    let (result, output) = run_report(&provider).await;

    let error = result.unwrap_err();
    assert!(matches!(error, ReportError::Query(_)));
    assert!(error.message().contains("no such table"));
    assert_eq!(output, format!("{CONNECTED}\n"));

    // The connection was released: the file can be reported on again.
    let (again, _) = run_report(&provider).await;
    assert!(matches!(again, Err(ReportError::Query(_))));
}

/// Scenario: Unreachable database
/// Given a configuration pointing at a file that does not exist
/// When the report runs
/// Then no query is attempted and only the failure line is printed
#[tokio::test]
async fn test_report_when_connection_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConnectionConfig {
        backend: DatabaseBackend::Sqlite,
        database: Some(dir.path().join("missing.db").display().to_string()),
        ..Default::default()
    };

    let provider = db::provider_for(&config);
    let (result, output) = run_report(provider.as_ref()).await;

    assert!(matches!(result, Err(ReportError::Connection(_))));
    assert_eq!(output, format!("{CONNECTION_FAILED}\n"));
    assert!(!dir.path().join("missing.db").exists());
}

/// Scenario: Read-only driver parameter
/// Given a connection configured with mode=ro
/// When the report runs
/// Then the parameter reaches the driver and the report still prints
#[tokio::test]
async fn test_report_with_driver_params() {
    let fixture = SqliteFixture::new(&seed(
        "INSERT INTO Employee VALUES (1, 'Alice', 'Engineering', 75000.5);",
    ))
    .await;

    let mut config = fixture.config.clone();
    config.params.insert("mode".to_string(), "ro".to_string());

    let provider = SqliteProvider::new(config);
    let (result, output) = run_report(&provider).await;

    assert_eq!(result.unwrap().rows, 1);
    assert!(output.contains("1\tAlice          \tEngineering \t75000.50\n"));
}

/// Scenario: File name with URL metacharacters
/// Given a database file named `pay 100%25.db`
/// When the report runs against that path
/// Then the file is opened as named and every row is printed
#[tokio::test]
async fn test_report_on_file_name_with_percent_sign() {
    let fixture = SqliteFixture::with_file_name(
        "pay 100%25.db",
        &seed("INSERT INTO Employee VALUES (1, 'Alice', 'Engineering', 75000.5);"),
    )
    .await;

    let provider = db::provider_for(&fixture.config);
    let (result, output) = run_report(provider.as_ref()).await;

    assert_eq!(result.unwrap().rows, 1);
    assert!(output.contains("1\tAlice          \tEngineering \t75000.50\n"));
    assert!(output.ends_with(&format!("\n{CLOSED}\n")));
}

/// Scenario: Unknown driver parameter
/// Given a SQLite connection with a parameter the driver does not accept
/// When the report runs
/// Then it stops at the connection step without touching the file
#[tokio::test]
async fn test_report_with_unsupported_param() {
    let fixture = SqliteFixture::new(CREATE_EMPLOYEE_TABLE).await;

    let mut config = fixture.config.clone();
    config.params.insert("journal".to_string(), "wal".to_string());

    let (result, output) = run_report(&SqliteProvider::new(config)).await;

    assert!(matches!(result, Err(ReportError::Connection(_))));
    assert_eq!(output, format!("{CONNECTION_FAILED}\n"));
}
