//! Persisted identity record model.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Mint a fresh version stamp: an RFC 3339 UTC instant with millisecond
/// precision. The fixed width makes lexicographic order match chronological
/// order, which is what "current record = greatest stamp" relies on.
pub fn new_version_stamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One persisted identity record. Records for the same email form an
/// append-only history ordered by version stamp; the greatest stamp wins
/// for "current" reads.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct IdentityRecord {
    pub email: String,
    pub version_stamp: String,
    pub password_hash: String,
    pub name: String,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl IdentityRecord {
    /// Build a record with a freshly minted version stamp
    pub fn new(email: String, name: String, password_hash: String, profile_image_url: Option<String>) -> Self {
        Self {
            email,
            version_stamp: new_version_stamp(),
            password_hash,
            name,
            profile_image_url,
            created_at: Utc::now(),
        }
    }
}
