//! Pinned Transactions
//!
//! A transaction is opened against one master endpoint and every call on
//! it reuses that endpoint. Failures inside a transaction are surfaced
//! verbatim, never retried on another master; if the pinned endpoint dies
//! mid-transaction the transaction is lost.

use std::sync::Arc;

use sqlx::any::AnyRow;

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::sql::{bind_all, rebind, Dialect, Value};

/// A transaction pinned to a single master endpoint
pub struct Transaction {
    endpoint: Arc<Endpoint>,
    dialect: Dialect,
    inner: sqlx::Transaction<'static, sqlx::Any>,
}

impl Transaction {
    pub(crate) async fn begin(endpoint: Arc<Endpoint>, dialect: Dialect) -> Result<Transaction> {
        let inner = endpoint.pool().begin().await?;
        Ok(Transaction {
            endpoint,
            dialect,
            inner,
        })
    }

    /// The endpoint this transaction is pinned to
    pub fn endpoint(&self) -> &Arc<Endpoint> {
        &self.endpoint
    }

    /// Translate `?` placeholders into the pinned driver's dialect
    pub fn rebind(&self, query: &str) -> String {
        rebind(self.dialect, query)
    }

    /// Execute a statement inside the transaction, returning the number
    /// of affected rows
    pub async fn exec(&mut self, query: &str, args: &[Value]) -> Result<u64> {
        let q = bind_all!(sqlx::query(query), args);
        let result = q.execute(&mut *self.inner).await?;
        Ok(result.rows_affected())
    }

    /// Execute a statement, panicking on error
    pub async fn must_exec(&mut self, query: &str, args: &[Value]) -> u64 {
        match self.exec(query, args).await {
            Ok(affected) => affected,
            Err(err) => panic!("must_exec: {err}"),
        }
    }

    /// Run a query inside the transaction and fetch all rows
    pub async fn query(&mut self, query: &str, args: &[Value]) -> Result<Vec<AnyRow>> {
        let q = bind_all!(sqlx::query(query), args);
        Ok(q.fetch_all(&mut *self.inner).await?)
    }

    /// Run a query inside the transaction and fetch one row
    pub async fn query_row(&mut self, query: &str, args: &[Value]) -> Result<AnyRow> {
        let q = bind_all!(sqlx::query(query), args);
        Ok(q.fetch_one(&mut *self.inner).await?)
    }

    /// Commit the transaction
    pub async fn commit(self) -> Result<()> {
        self.inner.commit().await?;
        Ok(())
    }

    /// Roll the transaction back. Dropping an uncommitted transaction
    /// rolls back as well.
    pub async fn rollback(self) -> Result<()> {
        self.inner.rollback().await?;
        Ok(())
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("endpoint", &self.endpoint.id())
            .finish()
    }
}
