use crate::model::Package;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// A result row keyed by column name.
pub type Row = HashMap<String, String>;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Query failed: {0}")]
    Query(String),
    #[error("Unknown connection: {0}")]
    UnknownConnection(String),
    #[error("Connection error: {0}")]
    Connection(String),
}

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Database version detection failed: {0}")]
    Database(#[from] DatabaseError),
    #[error("Database version detection timed out after {timeout_ms}ms")]
    DatabaseTimeout { timeout_ms: u64 },
    #[error("Harvest executor is closed")]
    ExecutorClosed,
}

/// Oldest database layer: raw SQL against a global handle.
#[async_trait]
pub trait LegacyDatabase: Send + Sync {
    /// Runs `sql` and returns its first row, if any.
    async fn query_row(&self, sql: &str) -> Result<Option<Row>, DatabaseError>;
}

/// Global database handle with a dedicated version accessor.
#[async_trait]
pub trait DatabaseHandle: Send + Sync {
    async fn server_version(&self) -> Result<String, DatabaseError>;
}

#[async_trait]
pub trait Connection: Send + Sync {
    async fn server_version(&self) -> Result<String, DatabaseError>;
}

/// Current database layer: named connections resolved through a pool.
#[async_trait]
pub trait ConnectionPool: Send + Sync {
    /// Registered connection names, in registration order.
    fn connection_names(&self) -> Vec<String>;

    async fn connection_by_name(&self, name: &str) -> Result<Arc<dyn Connection>, DatabaseError>;
}

pub trait PackageRegistry: Send + Sync {
    /// Active packages in registry order.
    fn active_packages(&self) -> Vec<Package>;
}

impl PackageRegistry for Vec<Package> {
    fn active_packages(&self) -> Vec<Package> {
        self.clone()
    }
}
