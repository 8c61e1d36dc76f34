/// Transaction Scoping Module
///
/// Mutating operations run inside a transactional boundary unless the caller
/// opts out to manage the transaction themselves. The boundary is held by a
/// guard, so it is closed on every exit path including panics.

use crate::core::db::connection::Connection;
use crate::core::Result;
use tracing::{debug, warn};

/// An open transaction that rolls back when dropped unless committed.
#[must_use = "dropping the guard rolls the transaction back"]
pub struct TransactionGuard<'c, C: Connection> {
    conn: &'c C,
    finished: bool,
}

impl<'c, C: Connection> TransactionGuard<'c, C> {
    pub fn begin(conn: &'c C) -> Result<Self> {
        conn.begin()?;
        debug!("transaction started");
        Ok(TransactionGuard {
            conn,
            finished: false,
        })
    }

    /// Commits. If the commit itself fails the guard still rolls back on drop.
    pub fn commit(mut self) -> Result<()> {
        self.conn.commit()?;
        self.finished = true;
        debug!("transaction committed");
        Ok(())
    }

    pub fn rollback(mut self) -> Result<()> {
        self.finished = true;
        self.conn.rollback()?;
        debug!("transaction rolled back");
        Ok(())
    }
}

impl<C: Connection> Drop for TransactionGuard<'_, C> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        match self.conn.rollback() {
            Ok(()) => debug!("transaction rolled back on drop"),
            Err(e) => warn!(error = %e, "rollback on drop failed"),
        }
    }
}

/// Runs `op` inside a transaction when `autocommit` is set.
///
/// On `Ok` the transaction is committed, on `Err` it is rolled back and the
/// original error is returned; a failing rollback is logged and never
/// replaces that error. With `autocommit` unset `op` runs directly inside
/// whatever transaction the caller has open.
pub fn run_in_scope<C, T, F>(conn: &C, autocommit: bool, op: F) -> Result<T>
where
    C: Connection,
    F: FnOnce() -> Result<T>,
{
    if !autocommit {
        return op();
    }

    let guard = TransactionGuard::begin(conn)?;
    match op() {
        Ok(value) => {
            guard.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = guard.rollback() {
                warn!(error = %rollback_err, "rollback after failed operation failed");
            }
            Err(err)
        }
    }
}
