//! Profile operations. All of these run behind the route gate and consume
//! the verified identity it injected; none of them re-derive it.

use axum::{
    Json,
    extract::{Query, State},
};
use std::collections::BTreeMap;

use crate::{
    AppState,
    api::models::{
        auth::{CommitUploadRequest, ProfileImageRequest, ProfileImageResponse, UploadUrlQuery},
        users::{PublicUser, VerifiedIdentity},
    },
    errors::{Error, Result},
    images::{self, UploadGrant},
    store::IdentityRecord,
};

/// Persist a new image reference on the record the caller's token was issued
/// against. Writing under the token's own version stamp means a stale token
/// re-targets its historical record and can never displace a newer one.
async fn persist_image_reference(state: &AppState, identity: &VerifiedIdentity, image_url: String) -> Result<IdentityRecord> {
    let history = state.store.find_history(&identity.email).await?;
    let mut record = history
        .into_iter()
        .find(|r| r.version_stamp == identity.version_stamp)
        .ok_or(Error::Unauthenticated)?;

    record.profile_image_url = Some(image_url);
    state.store.put(record.clone()).await?;
    Ok(record)
}

/// Public view of the caller's current identity
#[utoipa::path(
    get,
    path = "/profile",
    tag = "profile",
    responses(
        (status = 200, description = "Current profile", body = PublicUser),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_profile(State(state): State<AppState>, identity: VerifiedIdentity) -> Result<Json<PublicUser>> {
    let history = state.store.find_history(&identity.email).await?;
    let current = history.first().ok_or(Error::Unauthenticated)?;
    Ok(Json(PublicUser::from(current)))
}

/// Store an inline image payload and update the caller's profile image
#[utoipa::path(
    put,
    path = "/profile-image",
    request_body = ProfileImageRequest,
    tag = "profile",
    responses(
        (status = 200, description = "Profile image updated successfully", body = ProfileImageResponse),
        (status = 400, description = "Invalid image payload"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_profile_image(
    State(state): State<AppState>,
    identity: VerifiedIdentity,
    Json(request): Json<ProfileImageRequest>,
) -> Result<Json<ProfileImageResponse>> {
    request.validate()?;

    let image_url = state.images.store(&request.profile_image, &identity.email).await?;
    persist_image_reference(&state, &identity, image_url.clone()).await?;

    Ok(Json(ProfileImageResponse {
        message: "Profile image updated successfully".to_string(),
        profile_image: image_url,
    }))
}

/// Mint a pre-signed upload grant for a direct client upload
#[utoipa::path(
    get,
    path = "/upload-url",
    params(UploadUrlQuery),
    tag = "profile",
    responses(
        (status = 200, description = "Upload grant", body = UploadGrant),
        (status = 400, description = "Unsupported content type"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_upload_url(
    State(state): State<AppState>,
    identity: VerifiedIdentity,
    Query(query): Query<UploadUrlQuery>,
) -> Result<Json<UploadGrant>> {
    if !images::ALLOWED_CONTENT_TYPES.contains(&query.content_type.as_str()) {
        return Err(Error::Validation {
            errors: BTreeMap::from([("content_type".to_string(), "Invalid image format".to_string())]),
        });
    }

    let grant = state.images.create_upload_grant(&identity.email, &query.content_type).await?;
    Ok(Json(grant))
}

/// Commit a granted upload and update the caller's profile image
#[utoipa::path(
    put,
    path = "/profile-url",
    request_body = CommitUploadRequest,
    tag = "profile",
    responses(
        (status = 200, description = "Profile image updated successfully", body = ProfileImageResponse),
        (status = 400, description = "Invalid object key"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn save_profile_url(
    State(state): State<AppState>,
    identity: VerifiedIdentity,
    Json(request): Json<CommitUploadRequest>,
) -> Result<Json<ProfileImageResponse>> {
    if request.object_key.is_empty() {
        return Err(Error::Validation {
            errors: BTreeMap::from([("object_key".to_string(), "Object key is required".to_string())]),
        });
    }

    let image_url = state.images.commit_reference(&request.object_key).await?;
    persist_image_reference(&state, &identity, image_url.clone()).await?;

    Ok(Json(ProfileImageResponse {
        message: "Profile image updated successfully".to_string(),
        profile_image: image_url,
    }))
}
