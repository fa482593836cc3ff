//! Signup and login workflows.

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::models::{
        auth::{LoginRequest, LoginResponse, SignupRequest, SignupResponse},
        users::{PublicUser, VerifiedIdentity},
    },
    auth::{
        password::{self, Argon2Params},
        session,
    },
    errors::{Error, Result},
    store::IdentityRecord,
};

/// Register a new identity
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    tag = "auth",
    responses(
        (status = 201, description = "User created successfully", body = SignupResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "User already exists"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn signup(State(state): State<AppState>, Json(request): Json<SignupRequest>) -> Result<(StatusCode, Json<SignupResponse>)> {
    request.validate(&state.config.auth.password)?;

    // Any existing history for this email blocks signup, regardless of password
    let history = state.store.find_history(&request.email).await?;
    if !history.is_empty() {
        return Err(Error::Conflict {
            message: "User already exists".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid stalling the async runtime
    let params = Argon2Params::from(&state.config.auth.password);
    let password = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password_with_params(&password, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let image_url = match &request.profile_image {
        Some(payload) => Some(state.images.store(payload, &request.email).await?),
        None => None,
    };

    let record = IdentityRecord::new(request.email, request.name, password_hash, image_url);
    let user = PublicUser::from(&record);
    state.store.put(record).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully".to_string(),
            user,
        }),
    ))
}

/// Authenticate and issue a session token
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<LoginResponse>> {
    request.validate()?;

    // The current identity is the newest record in the email's history.
    // An unknown email and a wrong password must be indistinguishable.
    let history = state.store.find_history(&request.email).await?;
    let current = history.into_iter().next().ok_or(Error::InvalidCredentials)?;

    // Verify the password on a blocking thread to avoid stalling the async runtime
    let password = request.password.clone();
    let hash = current.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::InvalidCredentials);
    }

    let identity = VerifiedIdentity::from(&current);
    let token = session::create_session_token(&identity, &state.config)?;

    Ok(Json(LoginResponse {
        token,
        user: PublicUser::from(&current),
    }))
}
