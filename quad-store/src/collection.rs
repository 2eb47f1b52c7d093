//! Typed collection handles over JSON documents in Redis.

use std::borrow::Cow;
use std::marker::PhantomData;

use redis::{aio::ConnectionManager, cmd};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    errors::StoreError,
    keys::KeyContext,
    scripts::{
        CreateCommand, DeleteCommand, ENTITY_CREATE_SCRIPT, ENTITY_DELETE_SCRIPT, IndexEntry, UniqueCheck,
        run_script,
    },
};

/// A JSON document persisted by this crate.
pub trait Document: Serialize + DeserializeOwned {
    /// The collection name used for key construction.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    /// Creation time as epoch millis, used as the index score.
    fn created_at_millis(&self) -> i64;
}

pub struct Collection<T>
where
    T: Document,
{
    prefix: String,
    _marker: PhantomData<T>,
}

impl<T> Collection<T>
where
    T: Document,
{
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            _marker: PhantomData,
        }
    }

    pub fn key_context(&self) -> KeyContext<'_> {
        KeyContext::new(&self.prefix)
    }

    pub fn entity_key(&self, entity_id: &str) -> String {
        self.key_context().entity(T::COLLECTION, entity_id)
    }

    /// Unique keys are normalized to lowercase so constraints are case-insensitive.
    pub fn unique_key(&self, field: &str, value: &str) -> String {
        self.key_context().unique(T::COLLECTION, field, &value.to_lowercase())
    }

    pub fn pair_key(&self, left: &str, right: &str) -> String {
        self.key_context().pair(T::COLLECTION, left, right)
    }

    pub fn created_index_key(&self) -> String {
        self.key_context().created_index(T::COLLECTION)
    }

    pub fn scoped_index_key(&self, owner_id: &str) -> String {
        self.key_context().scoped_index(T::COLLECTION, owner_id)
    }

    /// Glob pattern matching all keys in this collection, for test cleanup.
    pub fn collection_pattern(&self) -> String {
        self.key_context().collection_pattern(T::COLLECTION)
    }

    pub async fn get(&self, conn: &mut ConnectionManager, entity_id: &str) -> Result<Option<T>, StoreError> {
        let key = self.entity_key(entity_id);
        let result: Option<String> = cmd("JSON.GET").arg(&key).query_async(conn).await?;
        match result {
            Some(json) => {
                let value = serde_json::from_str::<T>(&json).map_err(|err| StoreError::Other {
                    message: Cow::Owned(format!("failed to deserialize document: {err}")),
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Like [`get`](Self::get) but turns a missing document into `NotFound`.
    pub async fn fetch(&self, conn: &mut ConnectionManager, entity_id: &str) -> Result<T, StoreError> {
        self.get(conn, entity_id).await?.ok_or_else(|| StoreError::NotFound {
            entity_id: Some(entity_id.to_string()),
        })
    }

    /// Writes one field in place. Field updates never rewrite the whole
    /// document: a full-document save would clobber counters a Lua script
    /// incremented between the read and the write.
    pub async fn set_path<V>(
        &self,
        conn: &mut ConnectionManager,
        entity_id: &str,
        path: &str,
        value: &V,
    ) -> Result<(), StoreError>
    where
        V: Serialize + ?Sized,
    {
        let key = self.entity_key(entity_id);
        let json = serde_json::to_string(value).map_err(|err| StoreError::Other {
            message: Cow::Owned(format!("failed to serialize field: {err}")),
        })?;
        let _: () = cmd("JSON.SET").arg(&key).arg(path).arg(&json).query_async(conn).await?;
        Ok(())
    }

    /// Removes one field in place; absent fields are a no-op.
    pub async fn del_path(&self, conn: &mut ConnectionManager, entity_id: &str, path: &str) -> Result<(), StoreError> {
        let key = self.entity_key(entity_id);
        let _: i64 = cmd("JSON.DEL").arg(&key).arg(path).query_async(conn).await?;
        Ok(())
    }

    /// Atomic create: unique constraints checked and index entries written in
    /// one script together with the document itself.
    pub async fn create(
        &self,
        conn: &mut ConnectionManager,
        document: &T,
        unique_fields: &[(&str, &str)],
        extra_index_keys: &[String],
    ) -> Result<(), StoreError> {
        let payload_json = serde_json::to_string(document).map_err(|err| StoreError::Other {
            message: Cow::Owned(format!("failed to serialize document: {err}")),
        })?;
        let score = document.created_at_millis();

        let unique = unique_fields
            .iter()
            .map(|(field, value)| UniqueCheck {
                key: self.unique_key(field, value),
                field: (*field).to_string(),
                value: (*value).to_string(),
            })
            .collect();

        let mut indexes = vec![IndexEntry {
            key: self.created_index_key(),
            score,
        }];
        indexes.extend(extra_index_keys.iter().map(|key| IndexEntry {
            key: key.clone(),
            score,
        }));

        let command = CreateCommand {
            key: self.entity_key(document.id()),
            id: document.id().to_string(),
            payload_json,
            unique,
            indexes,
        };
        run_script(conn, &ENTITY_CREATE_SCRIPT, &command).await?;
        Ok(())
    }

    /// Hard delete: removes the document, its unique keys, and index entries.
    pub async fn delete(
        &self,
        conn: &mut ConnectionManager,
        entity_id: &str,
        unique_fields: &[(&str, &str)],
        extra_index_keys: &[String],
    ) -> Result<bool, StoreError> {
        let unique_keys = unique_fields
            .iter()
            .map(|(field, value)| self.unique_key(field, value))
            .collect();
        let mut index_keys = vec![self.created_index_key()];
        index_keys.extend(extra_index_keys.iter().cloned());

        let command = DeleteCommand {
            key: self.entity_key(entity_id),
            id: entity_id.to_string(),
            unique_keys,
            index_keys,
        };
        let value = run_script(conn, &ENTITY_DELETE_SCRIPT, &command).await?;
        Ok(value.get("deleted").and_then(|v| v.as_bool()).unwrap_or(false))
    }

    /// Number of documents ever indexed in this collection.
    pub async fn count(&self, conn: &mut ConnectionManager) -> Result<u64, StoreError> {
        let key = self.created_index_key();
        let total: u64 = cmd("ZCARD").arg(&key).query_async(conn).await?;
        Ok(total)
    }

    /// Resolves a unique field value to the owning document id, if any.
    pub async fn find_id_by_unique(
        &self,
        conn: &mut ConnectionManager,
        field: &str,
        value: &str,
    ) -> Result<Option<String>, StoreError> {
        let key = self.unique_key(field, value);
        let id: Option<String> = cmd("GET").arg(&key).query_async(conn).await?;
        Ok(id)
    }

    pub async fn find_by_unique(
        &self,
        conn: &mut ConnectionManager,
        field: &str,
        value: &str,
    ) -> Result<Option<T>, StoreError> {
        match self.find_id_by_unique(conn, field, value).await? {
            Some(id) => self.get(conn, &id).await,
            None => Ok(None),
        }
    }

    /// Page of document ids from a sorted-set index.
    pub async fn list_ids(
        &self,
        conn: &mut ConnectionManager,
        index_key: &str,
        offset: isize,
        limit: isize,
        newest_first: bool,
    ) -> Result<Vec<String>, StoreError> {
        let stop = if limit <= 0 { -1 } else { offset + limit - 1 };
        let command_name = if newest_first { "ZREVRANGE" } else { "ZRANGE" };
        let ids: Vec<String> = cmd(command_name)
            .arg(index_key)
            .arg(offset)
            .arg(stop)
            .query_async(conn)
            .await?;
        Ok(ids)
    }

    pub async fn fetch_many(&self, conn: &mut ConnectionManager, ids: &[String]) -> Result<Vec<T>, StoreError> {
        let mut documents = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(document) = self.get(conn, id).await? {
                documents.push(document);
            }
        }
        Ok(documents)
    }

    /// Page of documents from a sorted-set index; ids whose documents were
    /// hard-deleted out of band are silently skipped.
    pub async fn list_page(
        &self,
        conn: &mut ConnectionManager,
        index_key: &str,
        offset: isize,
        limit: isize,
        newest_first: bool,
    ) -> Result<Vec<T>, StoreError> {
        let ids = self.list_ids(conn, index_key, offset, limit, newest_first).await?;
        self.fetch_many(conn, &ids).await
    }
}
