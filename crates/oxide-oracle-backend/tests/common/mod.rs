#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use oxide_oracle_backend::{
    ConnectionConfig, DatabaseWrapper, DbValue, Driver, DriverConnection, DriverCursor,
    DriverError, Row,
};
use oxide_oracle_core::{BoundParams, InputSizes};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct MockError {
    pub message: String,
    pub integrity: bool,
}

impl MockError {
    pub fn database(message: &str) -> Self {
        Self {
            message: message.to_string(),
            integrity: false,
        }
    }

    pub fn integrity(message: &str) -> Self {
        Self {
            message: message.to_string(),
            integrity: true,
        }
    }
}

impl DriverError for MockError {
    fn is_integrity_error(&self) -> bool {
        self.integrity
    }
}

/// Everything the mock driver saw, plus its scripted behavior.
#[derive(Debug)]
pub struct MockState {
    pub connects: Vec<(String, String, String)>,
    pub executed: Vec<(String, BoundParams)>,
    pub batches: Vec<(String, Vec<BoundParams>, Option<InputSizes>)>,
    pub numbers_as_strings: Vec<bool>,
    pub cache_size: Option<u32>,
    pub closed: usize,
    pub version_queries: usize,

    /// Banner returned by `server_version`; `None` makes the query fail.
    pub version: Option<String>,
    pub fail_cache_size: bool,
    pub fail_connect: Option<MockError>,
    /// Fails any statement containing the first element.
    pub fail_execute: Option<(String, MockError)>,
    /// Rows returned for statements containing the key.
    pub responses: Vec<(String, Vec<Row>)>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            connects: Vec::new(),
            executed: Vec::new(),
            batches: Vec::new(),
            numbers_as_strings: Vec::new(),
            cache_size: None,
            closed: 0,
            version_queries: 0,
            version: Some("Oracle Database 10g Release 10.2.0.1.0 - Production".to_string()),
            fail_cache_size: false,
            fail_connect: None,
            fail_execute: None,
            responses: Vec::new(),
        }
    }
}

impl MockState {
    pub fn executed_sql(&self) -> Vec<&str> {
        self.executed.iter().map(|(sql, _)| sql.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    pub state: Rc<RefCell<MockState>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(banner: Option<&str>) -> Self {
        let driver = Self::new();
        driver.state.borrow_mut().version = banner.map(ToString::to_string);
        driver
    }

    pub fn respond(&self, sql_fragment: &str, rows: Vec<Row>) {
        self.state
            .borrow_mut()
            .responses
            .push((sql_fragment.to_string(), rows));
    }
}

impl Driver for MockDriver {
    type Connection = MockConnection;

    fn connect(&self, dsn: &str, user: &str, password: &str) -> Result<MockConnection, MockError> {
        let mut state = self.state.borrow_mut();
        state
            .connects
            .push((dsn.to_string(), user.to_string(), password.to_string()));
        if let Some(err) = state.fail_connect.clone() {
            return Err(err);
        }
        Ok(MockConnection {
            state: Rc::clone(&self.state),
        })
    }
}

#[derive(Debug)]
pub struct MockConnection {
    state: Rc<RefCell<MockState>>,
}

impl DriverConnection for MockConnection {
    type Error = MockError;
    type Cursor = MockCursor;

    fn cursor(&mut self) -> Result<MockCursor, MockError> {
        Ok(MockCursor {
            state: Rc::clone(&self.state),
            pending: VecDeque::new(),
            rowcount: None,
        })
    }

    fn set_statement_cache_size(&mut self, size: u32) -> Result<(), MockError> {
        let mut state = self.state.borrow_mut();
        if state.fail_cache_size {
            return Err(MockError::database("statement caching not available"));
        }
        state.cache_size = Some(size);
        Ok(())
    }

    fn server_version(&mut self) -> Result<String, MockError> {
        let mut state = self.state.borrow_mut();
        state.version_queries += 1;
        state
            .version
            .clone()
            .ok_or_else(|| MockError::database("ORA-00942: table or view does not exist"))
    }

    fn close(&mut self) -> Result<(), MockError> {
        self.state.borrow_mut().closed += 1;
        Ok(())
    }
}

#[derive(Debug)]
pub struct MockCursor {
    state: Rc<RefCell<MockState>>,
    pending: VecDeque<Row>,
    rowcount: Option<u64>,
}

impl MockCursor {
    fn load(&mut self, sql: &str) -> Result<(), MockError> {
        let state = self.state.borrow();
        if let Some((fragment, err)) = &state.fail_execute {
            if sql.contains(fragment.as_str()) {
                return Err(err.clone());
            }
        }
        self.pending = state
            .responses
            .iter()
            .find(|(fragment, _)| sql.contains(fragment.as_str()))
            .map(|(_, rows)| rows.iter().cloned().collect())
            .unwrap_or_default();
        Ok(())
    }
}

impl DriverCursor for MockCursor {
    type Error = MockError;

    fn execute(&mut self, sql: &str, params: &BoundParams) -> Result<(), MockError> {
        self.state
            .borrow_mut()
            .executed
            .push((sql.to_string(), params.clone()));
        self.load(sql)?;
        self.rowcount = Some(1);
        Ok(())
    }

    fn executemany(
        &mut self,
        sql: &str,
        batch: &[BoundParams],
        input_sizes: Option<&InputSizes>,
    ) -> Result<(), MockError> {
        self.state.borrow_mut().batches.push((
            sql.to_string(),
            batch.to_vec(),
            input_sizes.cloned(),
        ));
        self.load(sql)?;
        self.rowcount = Some(batch.len() as u64);
        Ok(())
    }

    fn fetchone(&mut self) -> Result<Option<Row>, MockError> {
        Ok(self.pending.pop_front())
    }

    fn fetchmany(&mut self, size: usize) -> Result<Vec<Row>, MockError> {
        let n = size.min(self.pending.len());
        Ok(self.pending.drain(..n).collect())
    }

    fn fetchall(&mut self) -> Result<Vec<Row>, MockError> {
        Ok(self.pending.drain(..).collect())
    }

    fn set_numbers_as_strings(&mut self, enabled: bool) {
        self.state.borrow_mut().numbers_as_strings.push(enabled);
    }

    fn rowcount(&self) -> Option<u64> {
        self.rowcount
    }
}

pub fn text_row(values: &[&str]) -> Row {
    values
        .iter()
        .map(|v| DbValue::Text((*v).to_string()))
        .collect()
}

pub fn config() -> ConnectionConfig {
    ConnectionConfig::new("orcl")
        .host("db.internal")
        .port(1521)
        .credentials("scott", "tiger")
}

pub fn wrapper(driver: &MockDriver) -> DatabaseWrapper<MockDriver> {
    init_tracing();
    DatabaseWrapper::new(config(), driver.clone())
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
