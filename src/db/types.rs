//! Employee record type and row decoding.

use crate::error::{ReportError, Result};
use sqlx::{ColumnIndex, Decode, Row};

/// The one statement this program issues.
pub const EMPLOYEE_QUERY: &str = "SELECT * FROM Employee";

/// Column names of the employee table.
pub mod columns {
    pub const ID: &str = "emp_id";
    pub const NAME: &str = "emp_name";
    pub const DEPARTMENT: &str = "emp_department";
    pub const SALARY: &str = "emp_salary";
}

/// One row of the employee table.
///
/// Materialized per row while the result cursor is read and dropped as soon
/// as it has been printed.
#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: i32,
    pub name: String,
    pub department: String,
    pub salary: f64,
}

impl Employee {
    /// Creates a new employee record.
    pub fn new(id: i32, name: impl Into<String>, department: impl Into<String>, salary: f64) -> Self {
        Self {
            id,
            name: name.into(),
            department: department.into(),
            salary,
        }
    }

    /// Decodes an employee from a result row, looking columns up by name.
    ///
    /// SQL NULL reads as `0`, an empty string, or `0.00`. Values are decoded
    /// without checking the declared SQL type: the statement is sent
    /// unprepared, so Postgres returns every value as text (NUMERIC salaries
    /// included), and SQLite converts between storage classes on read.
    pub fn from_row<'r, R>(row: &'r R) -> Result<Self>
    where
        R: Row,
        &'static str: ColumnIndex<R>,
        Option<i32>: Decode<'r, R::Database>,
        Option<f64>: Decode<'r, R::Database>,
        Option<String>: Decode<'r, R::Database>,
    {
        let id: Option<i32> = get(row, columns::ID)?;
        let name: Option<String> = get(row, columns::NAME)?;
        let department: Option<String> = get(row, columns::DEPARTMENT)?;
        let salary: Option<f64> = get(row, columns::SALARY)?;

        Ok(Self {
            id: id.unwrap_or_default(),
            name: name.unwrap_or_default(),
            department: department.unwrap_or_default(),
            salary: salary.unwrap_or_default(),
        })
    }
}

fn get<'r, R, T>(row: &'r R, column: &'static str) -> Result<T>
where
    R: Row,
    &'static str: ColumnIndex<R>,
    T: Decode<'r, R::Database>,
{
    row.try_get_unchecked(column).map_err(|e| match e {
        sqlx::Error::ColumnNotFound(_) => {
            ReportError::query(format!("Column '{column}' not found in result set"))
        }
        other => ReportError::query(format!("Failed to read column '{column}': {other}")),
    })
}
