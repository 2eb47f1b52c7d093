//! Lua-backed mutation commands.
//!
//! Each script receives a single JSON-encoded command in `ARGV[1]` and
//! replies with a JSON object. Errors are reported in-band as
//! `{"error": code, ...}` so a script can roll nothing back: it either
//! completes every write or performs none.

use std::borrow::Cow;
use std::sync::LazyLock;

use redis::{Script, aio::ConnectionManager};
use serde::Serialize;
use serde_json::Value;

use crate::errors::StoreError;

pub const ENTITY_CREATE_SCRIPT_BODY: &str = include_str!("../lua/entity_create.lua");
pub const ENTITY_DELETE_SCRIPT_BODY: &str = include_str!("../lua/entity_delete.lua");
pub const LIKE_TOGGLE_SCRIPT_BODY: &str = include_str!("../lua/like_toggle.lua");
pub const UNLIKE_SCRIPT_BODY: &str = include_str!("../lua/unlike.lua");
pub const FOLLOW_TOGGLE_SCRIPT_BODY: &str = include_str!("../lua/follow_toggle.lua");
pub const COMMENT_CREATE_SCRIPT_BODY: &str = include_str!("../lua/comment_create.lua");
pub const POLL_VOTE_SCRIPT_BODY: &str = include_str!("../lua/poll_vote.lua");
pub const GROUP_MEMBER_SCRIPT_BODY: &str = include_str!("../lua/group_member.lua");

pub static ENTITY_CREATE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(ENTITY_CREATE_SCRIPT_BODY));
pub static ENTITY_DELETE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(ENTITY_DELETE_SCRIPT_BODY));
pub static LIKE_TOGGLE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(LIKE_TOGGLE_SCRIPT_BODY));
pub static UNLIKE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(UNLIKE_SCRIPT_BODY));
pub static FOLLOW_TOGGLE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(FOLLOW_TOGGLE_SCRIPT_BODY));
pub static COMMENT_CREATE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(COMMENT_CREATE_SCRIPT_BODY));
pub static POLL_VOTE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(POLL_VOTE_SCRIPT_BODY));
pub static GROUP_MEMBER_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(GROUP_MEMBER_SCRIPT_BODY));

/// Unique-constraint check carried by the create command.
#[derive(Debug, Serialize)]
pub struct UniqueCheck {
    pub key: String,
    pub field: String,
    pub value: String,
}

/// Sorted-set index entry carried by the create command (member is the document id).
#[derive(Debug, Serialize)]
pub struct IndexEntry {
    pub key: String,
    pub score: i64,
}

#[derive(Debug, Serialize)]
pub struct CreateCommand {
    pub key: String,
    pub id: String,
    pub payload_json: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unique: Vec<UniqueCheck>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<IndexEntry>,
}

#[derive(Debug, Serialize)]
pub struct DeleteCommand {
    pub key: String,
    pub id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unique_keys: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub index_keys: Vec<String>,
}

/// Executes a script with a JSON command payload and maps in-band errors.
pub(crate) async fn run_script<P>(
    conn: &mut ConnectionManager,
    script: &Script,
    command: &P,
) -> Result<Value, StoreError>
where
    P: Serialize,
{
    let payload = serde_json::to_string(command).map_err(|err| StoreError::Other {
        message: Cow::Owned(format!("failed to serialize command: {err}")),
    })?;

    let mut invocation = script.prepare_invoke();
    invocation.arg(payload);
    let raw: String = invocation.invoke_async(conn).await.map_err(StoreError::from)?;

    let value: Value = serde_json::from_str(&raw).map_err(|err| StoreError::Other {
        message: Cow::Owned(format!("failed to parse lua response: {err}")),
    })?;

    if let Some(code) = value.get("error").and_then(|v| v.as_str()) {
        return Err(map_script_error(code, &value));
    }

    Ok(value)
}

fn map_script_error(code: &str, value: &Value) -> StoreError {
    match code {
        "entity_not_found" => {
            let entity_id = value.get("entity_id").and_then(|v| v.as_str()).map(|s| s.to_string());
            StoreError::NotFound { entity_id }
        }
        "unique_constraint_violation" => StoreError::UniqueConstraintViolation {
            field: string_field(value, "field"),
            value: string_field(value, "value"),
            existing_entity_id: string_field(value, "existing_entity_id"),
        },
        "invalid_request" => StoreError::InvalidRequest {
            message: string_field(value, "message"),
        },
        other => StoreError::Other {
            message: Cow::Owned(other.to_string()),
        },
    }
}

fn string_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}
