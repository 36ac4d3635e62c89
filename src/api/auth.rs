// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account and session endpoints.
//!
//! Login failures return the same `INVALID_CREDENTIALS` code for an unknown
//! email and a wrong password, so responses cannot be used to enumerate
//! accounts. Refresh failures collapse to a single `INVALID_REFRESH_TOKEN`
//! code for the same reason; the specific failure kind is logged server-side.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, warn};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        LoginRequest, LogoutAllResponse, LogoutRequest, MessageResponse, PublicUser,
        RefreshRequest, RegisterRequest, RegisterResponse, SessionResponse, VerifyResponse,
    },
    state::AppState,
};

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    tag = "Auth",
    responses(
        (status = 201, body = RegisterResponse),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = hash_password(&request.password)?;

    let mut store = state.store.write().await;
    let user = store.insert_user(email, request.display_name, password_hash)?;
    info!(user_id = %user.id, "Account registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Account created".to_string(),
            user: PublicUser::from(&user),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, body = SessionResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let store = state.store.read().await;

    // Unknown email and wrong password produce the same response.
    let user = store
        .user_by_email(request.email.trim())
        .ok_or_else(invalid_credentials)?;
    verify_password(&request.password, &user.password_hash)?;

    let pair = state
        .tokens
        .issue_pair(&user.id, &user.email, &state.registry)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    info!(user_id = %user.id, "Login succeeded");

    Ok(Json(SessionResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        access_token_expiry: pair.access_token_expiry,
        user: PublicUser::from(user),
    }))
}

#[utoipa::path(
    get,
    path = "/auth/verify",
    tag = "Auth",
    responses(
        (status = 200, body = VerifyResponse),
        (status = 401, description = "Missing, invalid, or expired token")
    )
)]
pub async fn verify(
    Auth(identity): Auth,
    State(state): State<AppState>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let store = state.store.read().await;
    // The extractor re-fetched the user already; this lookup only fills in
    // the public profile fields.
    let user = store
        .user_by_id(&identity.user_id)
        .ok_or_else(|| ApiError::unauthorized("USER_NOT_FOUND", "Account no longer exists"))?;

    Ok(Json(VerifyResponse {
        valid: true,
        user: PublicUser::from(user),
    }))
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    tag = "Auth",
    responses(
        (status = 200, body = SessionResponse),
        (status = 401, description = "Refresh token rejected")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    // Stateless half: signature and expiry.
    let claims = state
        .tokens
        .decode_refresh(&request.refresh_token)
        .map_err(|e| {
            warn!(kind = e.error_code(), "Refresh token rejected");
            invalid_refresh_token()
        })?;

    // Stateful half: atomically retire the record. This is the rotation
    // step; a token that reaches this point is spent even if later steps
    // fail, bounding a leaked token to a single use.
    let record = state.registry.consume(&claims.jti).map_err(|e| {
        warn!(kind = e.error_code(), user_id = %claims.sub, "Refresh token rejected");
        invalid_refresh_token()
    })?;

    let store = state.store.read().await;
    let user = store.user_by_id(&record.user_id).ok_or_else(|| {
        warn!(user_id = %record.user_id, "Refresh for deleted account");
        invalid_refresh_token()
    })?;

    let pair = state
        .tokens
        .issue_pair(&user.id, &user.email, &state.registry)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    info!(user_id = %user.id, "Refresh token rotated");

    Ok(Json(SessionResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        access_token_expiry: pair.access_token_expiry,
        user: PublicUser::from(user),
    }))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    request_body = LogoutRequest,
    tag = "Auth",
    responses((status = 200, body = MessageResponse))
)]
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<LogoutRequest>,
) -> Json<MessageResponse> {
    // Logout never fails visibly: the client discarding its tokens is the
    // operative action, revocation is best-effort bookkeeping.
    if let Some(refresh_token) = request.refresh_token.as_deref() {
        match state.tokens.decode_refresh(refresh_token) {
            Ok(claims) => {
                state.registry.revoke(&claims.jti);
                info!(user_id = %claims.sub, "Logged out");
            }
            Err(e) => {
                warn!(kind = e.error_code(), "Logout with unusable refresh token");
            }
        }
    }

    Json(MessageResponse {
        message: "Logged out".to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/auth/logout-all",
    tag = "Auth",
    responses(
        (status = 200, body = LogoutAllResponse),
        (status = 401, description = "Missing, invalid, or expired token")
    )
)]
pub async fn logout_all(
    Auth(identity): Auth,
    State(state): State<AppState>,
) -> Json<LogoutAllResponse> {
    let revoked = state.registry.revoke_all(&identity.user_id);
    info!(user_id = %identity.user_id, revoked, "Logged out everywhere");

    Json(LogoutAllResponse {
        message: "Logged out everywhere".to_string(),
        revoked,
    })
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("INVALID_CREDENTIALS", "Invalid email or password")
}

fn invalid_refresh_token() -> ApiError {
    ApiError::unauthorized("INVALID_REFRESH_TOKEN", "Refresh token rejected")
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("Password hashing failed: {e}")))
}

fn verify_password(password: &str, password_hash: &str) -> Result<(), ApiError> {
    let parsed =
        PasswordHash::new(password_hash).map_err(|_| invalid_credentials())?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| invalid_credentials())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "Passw0rd1".to_string(),
            display_name: None,
        }
    }

    async fn register_alice(state: &AppState) -> PublicUser {
        let (status, Json(response)) = register(
            State(state.clone()),
            Json(register_request("alice@example.com")),
        )
        .await
        .expect("registration succeeds");
        assert_eq!(status, StatusCode::CREATED);
        response.user
    }

    async fn login_alice(state: &AppState) -> SessionResponse {
        let Json(session) = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "Passw0rd1".to_string(),
            }),
        )
        .await
        .expect("login succeeds");
        session
    }

    #[tokio::test]
    async fn register_then_login_returns_token_pair() {
        let state = AppState::default();
        let user = register_alice(&state).await;
        assert_eq!(user.email, "alice@example.com");

        let session = login_alice(&state).await;
        assert_eq!(session.user.id, user.id);
        assert!(!session.access_token.is_empty());
        assert!(!session.refresh_token.is_empty());

        let claims = state.tokens.verify_access(&session.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let state = AppState::default();
        let mut request = register_request("alice@example.com");
        request.password = "short".to_string();

        let err = register(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "VALIDATION");
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let state = AppState::default();
        register_alice(&state).await;

        let err = register(
            State(state),
            Json(register_request("ALICE@example.com")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "EMAIL_TAKEN");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let state = AppState::default();
        register_alice(&state).await;

        let wrong_password = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "WrongPass1".to_string(),
            }),
        )
        .await
        .unwrap_err();

        let unknown_email = login(
            State(state),
            Json(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "Passw0rd1".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.code, unknown_email.code);
        assert_eq!(wrong_password.code, "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn refresh_rotates_and_spends_the_old_token() {
        let state = AppState::default();
        register_alice(&state).await;
        let session = login_alice(&state).await;

        let Json(rotated) = refresh(
            State(state.clone()),
            Json(RefreshRequest {
                refresh_token: session.refresh_token.clone(),
            }),
        )
        .await
        .expect("first refresh succeeds");
        assert_ne!(rotated.refresh_token, session.refresh_token);

        // Rotation invariant: the original refresh token is spent.
        let err = refresh(
            State(state),
            Json(RefreshRequest {
                refresh_token: session.refresh_token,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.code, "INVALID_REFRESH_TOKEN");
    }

    #[tokio::test]
    async fn refresh_rejects_garbage_tokens() {
        let state = AppState::default();
        let err = refresh(
            State(state),
            Json(RefreshRequest {
                refresh_token: "not-a-token".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, "INVALID_REFRESH_TOKEN");
    }

    #[tokio::test]
    async fn logout_succeeds_even_with_garbage_token() {
        let state = AppState::default();

        let Json(response) = logout(
            State(state.clone()),
            Json(LogoutRequest {
                refresh_token: Some("garbage".to_string()),
            }),
        )
        .await;
        assert_eq!(response.message, "Logged out");

        let Json(response) = logout(
            State(state),
            Json(LogoutRequest {
                refresh_token: None,
            }),
        )
        .await;
        assert_eq!(response.message, "Logged out");
    }

    #[tokio::test]
    async fn logout_revokes_the_refresh_token() {
        let state = AppState::default();
        register_alice(&state).await;
        let session = login_alice(&state).await;

        logout(
            State(state.clone()),
            Json(LogoutRequest {
                refresh_token: Some(session.refresh_token.clone()),
            }),
        )
        .await;

        let err = refresh(
            State(state),
            Json(RefreshRequest {
                refresh_token: session.refresh_token,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, "INVALID_REFRESH_TOKEN");
    }

    #[tokio::test]
    async fn logout_all_revokes_every_session_for_the_user_only() {
        let state = AppState::default();
        let user = register_alice(&state).await;
        let session_one = login_alice(&state).await;
        let session_two = login_alice(&state).await;

        register(
            State(state.clone()),
            Json(register_request("bob@example.com")),
        )
        .await
        .unwrap();
        let Json(bob_session) = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "bob@example.com".to_string(),
                password: "Passw0rd1".to_string(),
            }),
        )
        .await
        .unwrap();

        let identity = AuthenticatedUser {
            user_id: user.id.clone(),
            email: user.email.clone(),
        };
        let Json(response) = logout_all(Auth(identity), State(state.clone())).await;
        assert_eq!(response.revoked, 2);

        for spent in [session_one.refresh_token, session_two.refresh_token] {
            let err = refresh(
                State(state.clone()),
                Json(RefreshRequest {
                    refresh_token: spent,
                }),
            )
            .await
            .unwrap_err();
            assert_eq!(err.code, "INVALID_REFRESH_TOKEN");
        }

        // Bob's session is untouched.
        refresh(
            State(state),
            Json(RefreshRequest {
                refresh_token: bob_session.refresh_token,
            }),
        )
        .await
        .expect("other users' tokens stay valid");
    }

    #[tokio::test]
    async fn verify_returns_the_current_user() {
        let state = AppState::default();
        let user = register_alice(&state).await;

        let identity = AuthenticatedUser {
            user_id: user.id.clone(),
            email: user.email.clone(),
        };
        let Json(response) = verify(Auth(identity), State(state)).await.unwrap();
        assert!(response.valid);
        assert_eq!(response.user, user);
    }
}
