//! Record store trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::records::StoredQuery;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Append one row.
    async fn insert(&self, table: &str, row: Value) -> Result<()>;

    /// Most recent query rows owned by `user_id`, newest first.
    async fn list_queries(&self, user_id: &str, limit: usize) -> Result<Vec<StoredQuery>>;

    /// Delete one query row owned by `user_id`. Returns false when nothing matched.
    async fn delete_query(&self, user_id: &str, id: &str) -> Result<bool>;
}
