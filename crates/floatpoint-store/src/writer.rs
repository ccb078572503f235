//! Best-effort persistence.
//!
//! A write happens only for an identified caller and is never retried. The
//! result is returned so the contract stays visible, but callers are free to
//! drop it: a lost row is accepted data loss. `spawn` runs the write on a
//! detached task so the caller's response never waits for the store.

use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{PersistenceError, StoreError};
use crate::identity::IdentityContext;
use crate::records::{PersistenceRecord, TableNames};
use crate::store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Anonymous request or no store configured.
    Skipped,
}

#[derive(Clone, Default)]
pub struct PersistenceWriter {
    store: Option<Arc<dyn RecordStore>>,
    tables: TableNames,
}

impl PersistenceWriter {
    pub fn new(store: Arc<dyn RecordStore>, tables: TableNames) -> Self {
        Self { store: Some(store), tables }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Hand the write to a background task. `None` when there is nothing to
    /// write, so no task is started for anonymous callers.
    pub fn spawn(
        &self,
        identity: Option<IdentityContext>,
        record: PersistenceRecord,
    ) -> Option<JoinHandle<WriteOutcome>> {
        if self.store.is_none() {
            return None;
        }
        let identity = identity?;
        let writer = self.clone();
        Some(tokio::spawn(async move { writer.write_logged(Some(&identity), record).await }))
    }

    pub async fn write(
        &self,
        identity: Option<&IdentityContext>,
        record: PersistenceRecord,
    ) -> Result<WriteOutcome, PersistenceError> {
        let (Some(store), Some(identity)) = (&self.store, identity) else {
            return Ok(WriteOutcome::Skipped);
        };

        let table = record.table(&self.tables).to_string();
        let row = record
            .to_row(&identity.user_id, Utc::now())
            .map_err(|e| PersistenceError { table: table.clone(), source: StoreError::from(e) })?;

        match store.insert(&table, row).await {
            Ok(()) => {
                debug!(%table, user_id = %identity.user_id, "Record persisted");
                Ok(WriteOutcome::Written)
            }
            Err(source) => Err(PersistenceError { table, source }),
        }
    }

    /// Write and swallow any failure after logging it.
    pub async fn write_logged(&self, identity: Option<&IdentityContext>, record: PersistenceRecord) -> WriteOutcome {
        match self.write(identity, record).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("{e}");
                WriteOutcome::Skipped
            }
        }
    }
}
