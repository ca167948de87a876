//! Mock connection provider for testing.
//!
//! Serves a fixed list of employees from memory and records every resource
//! it acquires and releases, so tests can check that nothing leaks.

use super::{ConnectionProvider, DatabaseConnection, Employee};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// A resource lifecycle event recorded by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceEvent {
    ConnectionOpened,
    StatementOpened,
    CursorOpened,
    CursorClosed,
    StatementClosed,
    ConnectionClosed,
    /// The connection was dropped without `close` being called.
    ConnectionDropped,
}

/// Shared, ordered log of resource events.
#[derive(Debug, Clone, Default)]
pub struct ResourceLog {
    events: Arc<Mutex<Vec<ResourceEvent>>>,
}

impl ResourceLog {
    fn push(&self, event: ResourceEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }

    /// Returns a snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<ResourceEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Returns true if every acquired resource has been released.
    pub fn all_released(&self) -> bool {
        let events = self.events();
        let count = |e: ResourceEvent| events.iter().filter(|&&x| x == e).count();

        count(ResourceEvent::ConnectionOpened)
            == count(ResourceEvent::ConnectionClosed) + count(ResourceEvent::ConnectionDropped)
            && count(ResourceEvent::StatementOpened) == count(ResourceEvent::StatementClosed)
            && count(ResourceEvent::CursorOpened) == count(ResourceEvent::CursorClosed)
    }
}

/// How the mock should fail, if at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// `get_connection` fails.
    Connect(String),
    /// Executing the statement fails before any row is returned.
    Query(String),
    /// Reading the cursor fails after this many rows were returned.
    AfterRows(usize, String),
}

/// A provider that hands out in-memory connections.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    employees: Vec<Employee>,
    failure: Option<MockFailure>,
    close_failure: Option<String>,
    log: ResourceLog,
}

impl MockProvider {
    /// Creates a mock whose table holds `employees`.
    pub fn new(employees: Vec<Employee>) -> Self {
        Self {
            employees,
            ..Default::default()
        }
    }

    /// Makes the mock fail in the given way.
    pub fn failing(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Makes `close` report an error after releasing the connection.
    pub fn failing_close(mut self, msg: impl Into<String>) -> Self {
        self.close_failure = Some(msg.into());
        self
    }

    /// Returns the log shared by every connection this provider opens.
    pub fn log(&self) -> ResourceLog {
        self.log.clone()
    }
}

#[async_trait]
impl ConnectionProvider for MockProvider {
    async fn get_connection(&self) -> Result<Box<dyn DatabaseConnection>> {
        if let Some(MockFailure::Connect(msg)) = &self.failure {
            return Err(ReportError::connection(msg.clone()));
        }

        self.log.push(ResourceEvent::ConnectionOpened);
        Ok(Box::new(MockConnection {
            employees: self.employees.clone(),
            failure: self.failure.clone(),
            close_failure: self.close_failure.clone(),
            log: self.log.clone(),
            closed: false,
        }))
    }
}

struct MockConnection {
    employees: Vec<Employee>,
    failure: Option<MockFailure>,
    close_failure: Option<String>,
    log: ResourceLog,
    closed: bool,
}

/// Records a release event when dropped.
struct Guard {
    log: ResourceLog,
    on_drop: ResourceEvent,
}

impl Guard {
    fn open(log: &ResourceLog, opened: ResourceEvent, on_drop: ResourceEvent) -> Self {
        log.push(opened);
        Self {
            log: log.clone(),
            on_drop,
        }
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        self.log.push(self.on_drop);
    }
}

#[async_trait]
impl DatabaseConnection for MockConnection {
    async fn for_each_employee(
        &mut self,
        sql: &str,
        on_row: &mut (dyn FnMut(Employee) -> Result<()> + Send),
    ) -> Result<usize> {
        if !sql.trim_start().to_uppercase().starts_with("SELECT") {
            return Err(ReportError::query(format!("Mock only supports SELECT: {sql}")));
        }

        // Declared in acquisition order so they drop cursor first.
        let _statement = Guard::open(
            &self.log,
            ResourceEvent::StatementOpened,
            ResourceEvent::StatementClosed,
        );
        if let Some(MockFailure::Query(msg)) = &self.failure {
            return Err(ReportError::query(msg.clone()));
        }
        let _cursor = Guard::open(
            &self.log,
            ResourceEvent::CursorOpened,
            ResourceEvent::CursorClosed,
        );

        let mut count = 0;
        for employee in &self.employees {
            if let Some(MockFailure::AfterRows(limit, msg)) = &self.failure {
                if count == *limit {
                    return Err(ReportError::query(msg.clone()));
                }
            }
            on_row(employee.clone())?;
            count += 1;
        }
        Ok(count)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut conn = self;
        conn.closed = true;
        conn.log.push(ResourceEvent::ConnectionClosed);
        match &conn.close_failure {
            Some(msg) => Err(ReportError::connection(format!(
                "Failed to close connection: {msg}"
            ))),
            None => Ok(()),
        }
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        if !self.closed {
            self.log.push(ResourceEvent::ConnectionDropped);
        }
    }
}
