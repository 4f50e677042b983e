use crate::bridge::BridgeClient;
use crate::error::ApiError;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

/// Shared per-process context: the read-only store pool and the bridge
/// client. Built once in `main`, never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub store_pool: Pool<SqliteConnectionManager>,
    pub bridge: BridgeClient,
}

impl AppState {
    /// Borrow a store handle for one logical operation. Dropping it returns
    /// the connection to the pool on every exit path.
    pub fn store_conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, ApiError> {
        Ok(self.store_pool.get()?)
    }
}
