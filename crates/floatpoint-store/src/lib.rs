//! floatpoint-store — Identity and persistence collaborators.
//!
//! Both are external (a hosted auth service and a row store). This crate
//! holds the traits the web layer talks to, the Supabase implementation, and
//! the best-effort writer that never lets a storage failure reach the caller.

pub mod error;
pub mod identity;
pub mod records;
pub mod store;
pub mod supabase;
pub mod writer;

pub use error::{PersistenceError, Result, StoreError};
pub use identity::{IdentityContext, IdentityProvider, IdentityResolver};
pub use records::{PersistenceRecord, PredictionRow, QueryRow, StoredQuery, TableNames};
pub use store::RecordStore;
pub use supabase::SupabaseClient;
pub use writer::{PersistenceWriter, WriteOutcome};
