/// Service segment shared by every key this crate writes.
pub const SERVICE: &str = "quad";

/// Common key-construction helpers used across the store.
#[derive(Debug, Clone)]
pub struct KeyContext<'a> {
    pub prefix: &'a str,
    pub service: &'a str,
}

impl<'a> KeyContext<'a> {
    pub fn new(prefix: &'a str) -> Self {
        Self {
            prefix,
            service: SERVICE,
        }
    }

    pub fn entity(&self, collection: &str, entity_id: &str) -> String {
        format!("{}:{}:{}:{}", self.prefix, self.service, collection, entity_id)
    }

    /// Key holding the id of the document that owns a unique field value.
    /// Values are normalized (lowercased) by the caller before key construction.
    pub fn unique(&self, collection: &str, field: &str, value: &str) -> String {
        format!(
            "{}:{}:{}:unique:{}:{}",
            self.prefix, self.service, collection, field, value
        )
    }

    /// Ledger pair key enforcing at-most-one relationship per (left, right) pair.
    /// The value is the full entity key of the ledger document.
    pub fn pair(&self, collection: &str, left: &str, right: &str) -> String {
        format!(
            "{}:{}:{}:pair:{}:{}",
            self.prefix, self.service, collection, left, right
        )
    }

    /// Sorted set of document ids in a collection, scored by creation time.
    pub fn created_index(&self, collection: &str) -> String {
        self.named_index(collection, "by_created")
    }

    /// Named sorted-set index over a collection (e.g. `by_active` for users).
    pub fn named_index(&self, collection: &str, name: &str) -> String {
        format!("{}:{}:{}:{}", self.prefix, self.service, collection, name)
    }

    /// Sorted set scoping a collection to one owning document
    /// (comments of a post, replies of a comment, posts of a user).
    pub fn scoped_index(&self, collection: &str, owner_id: &str) -> String {
        format!("{}:{}:{}:of:{}", self.prefix, self.service, collection, owner_id)
    }

    /// Glob pattern matching every key in a collection, for cleanup.
    pub fn collection_pattern(&self, collection: &str) -> String {
        format!("{}:{}:{}:*", self.prefix, self.service, collection)
    }

    /// Glob pattern matching every key under this prefix, for cleanup.
    pub fn service_pattern(&self) -> String {
        format!("{}:{}:*", self.prefix, self.service)
    }
}
