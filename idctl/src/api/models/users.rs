//! Identity views exposed through the API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::IdentityRecord;

/// Public view of an identity: what callers are allowed to see.
/// Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicUser {
    pub email: String,
    pub name: String,
    pub profile_image: Option<String>,
}

impl From<&IdentityRecord> for PublicUser {
    fn from(record: &IdentityRecord) -> Self {
        Self {
            email: record.email.clone(),
            name: record.name.clone(),
            profile_image: record.profile_image_url.clone(),
        }
    }
}

/// Identity established by token verification, attached to the request scope
/// by the route gate for exactly one request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifiedIdentity {
    pub email: String,
    pub name: String,
    pub version_stamp: String,
}

impl From<&IdentityRecord> for VerifiedIdentity {
    fn from(record: &IdentityRecord) -> Self {
        Self {
            email: record.email.clone(),
            name: record.name.clone(),
            version_stamp: record.version_stamp.clone(),
        }
    }
}
