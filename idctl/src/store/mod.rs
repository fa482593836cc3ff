//! Identity record store.
//!
//! The store is an external collaborator reached through a narrow interface:
//! identity history is read per email, and every mutation is a `put` of a
//! whole record keyed by `(email, version_stamp)`. There is no update-in-place
//! beyond key-targeted replacement and no deletion path.
//!
//! Two backends exist: [`PostgresIdentityStore`] for production and
//! [`MemoryIdentityStore`] for tests and local development.

pub mod errors;
pub mod memory;
pub mod models;
pub mod postgres;

pub use errors::StoreError;
pub use memory::MemoryIdentityStore;
pub use models::{IdentityRecord, new_version_stamp};
pub use postgres::PostgresIdentityStore;

use async_trait::async_trait;

/// Record store collaborator for identity history.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Fetch all identity records for an email, newest version stamp first.
    /// The first element, when present, is the current identity.
    async fn find_history(&self, email: &str) -> Result<Vec<IdentityRecord>, StoreError>;

    /// Insert a record, or replace the record already stored under the same
    /// `(email, version_stamp)` key. Inserting under a fresh stamp appends to
    /// the email's history; writing under an existing stamp re-targets that
    /// one historical record and cannot displace a newer one.
    async fn put(&self, record: IdentityRecord) -> Result<(), StoreError>;
}
