//! Runs the employee report end to end.
//!
//! Acquires a connection, streams the fixed query through the renderer, and
//! releases the connection on every path before returning.

use std::io::Write;

use tracing::{debug, info, warn};

use crate::db::{ConnectionProvider, DatabaseConnection, EMPLOYEE_QUERY};
use crate::error::Result;
use crate::report::render::ReportRenderer;

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    /// Number of record lines printed.
    pub rows: usize,
}

/// Prints the employee report using connections from a provider.
pub struct ReportRunner<'a> {
    provider: &'a dyn ConnectionProvider,
}

impl<'a> ReportRunner<'a> {
    /// Creates a new runner.
    pub fn new(provider: &'a dyn ConnectionProvider) -> Self {
        Self { provider }
    }

    /// Prints the full report to `out`.
    ///
    /// If no connection can be acquired, the failure line is printed and no
    /// query is attempted. Otherwise the connection is closed whether or not
    /// the query succeeds; a query error is returned only after that.
    pub async fn run<W: Write + Send>(&self, out: &mut W) -> Result<ReportSummary> {
        let mut renderer = ReportRenderer::new(out);

        let mut conn = match self.provider.get_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Could not acquire connection: {}", e);
                renderer.connection_failed()?;
                return Err(e);
            }
        };
        renderer.connected()?;

        let printed = print_records(conn.as_mut(), &mut renderer).await;
        let closed = conn.close().await;

        if let (Err(_), Err(e)) = (&printed, &closed) {
            warn!("Failed to close connection after query error: {}", e);
        }
        let rows = printed?;
        closed?;
        renderer.closed()?;

        info!(rows, "Report complete");
        Ok(ReportSummary { rows })
    }
}

async fn print_records<W: Write + Send>(
    conn: &mut dyn DatabaseConnection,
    renderer: &mut ReportRenderer<'_, W>,
) -> Result<usize> {
    debug!("Executing: {}", EMPLOYEE_QUERY);
    let rows = conn
        .for_each_employee(EMPLOYEE_QUERY, &mut |employee| renderer.row(&employee))
        .await?;
    renderer.footer()?;
    Ok(rows)
}
