//! Document store for an anonymous campus social network, backed by Redis
//! with the JSON module.
//!
//! Documents live as RedisJSON values; unique constraints, relationship
//! ledgers, and denormalized counters are maintained by Lua scripts so each
//! mutation commits atomically. [`Store`] is the entry point; connections
//! are passed per call so callers own pooling.

pub mod collection;
pub mod errors;
pub mod id;
pub mod keys;
pub mod models;
pub mod scripts;
pub mod store;
pub mod validators;

pub use collection::{Collection, Document};
pub use errors::{StoreError, ValidationError, ValidationIssue, ValidationResult};
pub use store::Store;

// Callers share this crate's redis version for connection setup.
pub use redis;
pub use redis::aio::ConnectionManager;

use redis::cmd;

/// Opens a managed connection to the given Redis URL.
pub async fn connect(url: &str) -> Result<ConnectionManager, StoreError> {
    let client = redis::Client::open(url)?;
    let conn = ConnectionManager::new(client).await?;
    Ok(conn)
}

/// Deletes every key matching `pattern` via cursor scans. Used by tests and
/// operational cleanup; never called on request paths.
pub async fn cleanup_pattern(conn: &mut ConnectionManager, pattern: &str) -> Result<u64, StoreError> {
    let mut cursor: u64 = 0;
    let mut removed: u64 = 0;
    loop {
        let (next, keys): (u64, Vec<String>) = cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(200)
            .query_async(conn)
            .await?;
        if !keys.is_empty() {
            let mut del = cmd("DEL");
            for key in &keys {
                del.arg(key);
            }
            let count: u64 = del.query_async(conn).await?;
            removed += count;
        }
        cursor = next;
        if cursor == 0 {
            break;
        }
    }
    Ok(removed)
}
