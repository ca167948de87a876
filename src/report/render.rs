//! Console rendering of the employee report.
//!
//! Every line goes through [`ReportRenderer`], which writes to any
//! `std::io::Write` so the exact output can be captured in tests.

use crate::db::Employee;
use crate::error::{ReportError, Result};
use std::io::Write;

pub const CONNECTED: &str = "Database connection established successfully!";
pub const CONNECTION_FAILED: &str = "Failed to establish database connection!";
pub const BANNER: &str = "========== EMPLOYEE RECORDS ==========";
pub const HEADER: &str = "ID\tNAME\t\tDEPARTMENT\tSALARY";
pub const SEPARATOR: &str = "=====================================";
pub const CLOSED: &str = "Connection closed successfully!";

/// Formats one employee as a fixed-width, tab-separated line (no newline).
///
/// Name is padded to 15 characters, department to 12, and salary always has
/// two decimal places. Longer values are printed in full.
pub fn format_employee(employee: &Employee) -> String {
    format!(
        "{}\t{:<15}\t{:<12}\t{:.2}",
        employee.id, employee.name, employee.department, employee.salary
    )
}

/// Writes the report, section by section.
///
/// The table header is written lazily, right before the first record or the
/// closing separator, so a statement that fails before returning anything
/// leaves no empty table behind.
pub struct ReportRenderer<'a, W: Write> {
    out: &'a mut W,
    header_written: bool,
}

impl<'a, W: Write> ReportRenderer<'a, W> {
    /// Creates a renderer writing to `out`.
    pub fn new(out: &'a mut W) -> Self {
        Self {
            out,
            header_written: false,
        }
    }

    /// Announces that the connection was acquired.
    pub fn connected(&mut self) -> Result<()> {
        writeln!(self.out, "{CONNECTED}")?;
        Ok(())
    }

    /// Reports that no connection could be acquired.
    pub fn connection_failed(&mut self) -> Result<()> {
        writeln!(self.out, "{CONNECTION_FAILED}")?;
        Ok(())
    }

    fn header(&mut self) -> Result<()> {
        if !self.header_written {
            writeln!(self.out, "\n{BANNER}")?;
            writeln!(self.out, "{HEADER}")?;
            writeln!(self.out, "{SEPARATOR}")?;
            self.header_written = true;
        }
        Ok(())
    }

    /// Writes one record line.
    pub fn row(&mut self, employee: &Employee) -> Result<()> {
        self.header()?;
        writeln!(self.out, "{}", format_employee(employee))?;
        Ok(())
    }

    /// Closes the table.
    pub fn footer(&mut self) -> Result<()> {
        self.header()?;
        writeln!(self.out, "{SEPARATOR}")?;
        Ok(())
    }

    /// Writes the closing message and flushes.
    pub fn closed(&mut self) -> Result<()> {
        writeln!(self.out, "\n{CLOSED}")?;
        self.out.flush()?;
        Ok(())
    }

    /// Writes the user-facing line for a failed run.
    pub fn failure(&mut self, error: &ReportError) -> Result<()> {
        if error.is_database_error() {
            writeln!(self.out, "Database Error: {}", error.message())?;
        } else {
            writeln!(self.out, "{}: {}", error.category(), error.message())?;
        }
        self.out.flush()?;
        Ok(())
    }
}
