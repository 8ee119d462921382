//! Scoped writes on an explicit connection handle.
//!
//! SQLite savepoints nest inside an open transaction and behave like a
//! transaction of their own outside one, so a scoped write works the same
//! whether or not the caller already began a transaction.

use rusqlite::Connection;
use tracing::debug;

use crate::errors::DaoResult;

/// Run `f` inside the savepoint `name`.
///
/// Released on `Ok`; rolled back and released on `Err`, leaving no partial
/// writes of `f` visible.
pub fn with_savepoint<T, F>(conn: &Connection, name: &str, f: F) -> DaoResult<T>
where
    F: FnOnce(&Connection) -> DaoResult<T>,
{
    conn.execute_batch(&format!("SAVEPOINT {name};"))?;
    match f(conn) {
        Ok(value) => {
            conn.execute_batch(&format!("RELEASE SAVEPOINT {name};"))?;
            Ok(value)
        }
        Err(e) => {
            debug!(savepoint = name, error = %e, "rolling back savepoint");
            let _ = conn.execute_batch(&format!("ROLLBACK TO SAVEPOINT {name};"));
            let _ = conn.execute_batch(&format!("RELEASE SAVEPOINT {name};"));
            Err(e)
        }
    }
}
