//! In-memory identity store for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{IdentityStore, errors::Result, models::IdentityRecord};

#[derive(Default)]
pub struct MemoryIdentityStore {
    records: RwLock<HashMap<String, Vec<IdentityRecord>>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_history(&self, email: &str) -> Result<Vec<IdentityRecord>> {
        let records = self.records.read().await;
        let mut history = records.get(email).cloned().unwrap_or_default();
        history.sort_by(|a, b| b.version_stamp.cmp(&a.version_stamp));
        Ok(history)
    }

    async fn put(&self, record: IdentityRecord) -> Result<()> {
        let mut records = self.records.write().await;
        let history = records.entry(record.email.clone()).or_default();
        match history.iter_mut().find(|r| r.version_stamp == record.version_stamp) {
            Some(existing) => *existing = record,
            None => history.push(record),
        }
        Ok(())
    }
}
