// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contact-scoped notes and the activity timeline.
//!
//! Both are owned transitively: access is granted through the parent
//! contact's owner, never through the note or activity itself.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{Activity, CreateNoteRequest, Note},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/contacts/{contact_id}/notes",
    params(("contact_id" = String, Path, description = "Parent contact identifier")),
    tag = "Notes",
    responses((status = 200, body = [Note]), (status = 403), (status = 404))
)]
pub async fn list_notes(
    Auth(user): Auth,
    Path(contact_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.list_notes(&user, &contact_id)?))
}

#[utoipa::path(
    post,
    path = "/contacts/{contact_id}/notes",
    params(("contact_id" = String, Path, description = "Parent contact identifier")),
    request_body = CreateNoteRequest,
    tag = "Notes",
    responses((status = 201, body = Note), (status = 403), (status = 404))
)]
pub async fn create_note(
    Auth(user): Auth,
    Path(contact_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    if request.body.trim().is_empty() {
        return Err(ApiError::bad_request("Note body is required"));
    }
    let mut store = state.store.write().await;
    let note = store.add_note(&user, &contact_id, request)?;
    Ok((StatusCode::CREATED, Json(note)))
}

#[utoipa::path(
    delete,
    path = "/notes/{note_id}",
    params(("note_id" = String, Path, description = "Note identifier")),
    tag = "Notes",
    responses((status = 204), (status = 403), (status = 404))
)]
pub async fn delete_note(
    Auth(user): Auth,
    Path(note_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    store.delete_note(&user, &note_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/contacts/{contact_id}/activities",
    params(("contact_id" = String, Path, description = "Parent contact identifier")),
    tag = "Notes",
    responses((status = 200, body = [Activity]), (status = 403), (status = 404))
)]
pub async fn list_activities(
    Auth(user): Auth,
    Path(contact_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Activity>>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.list_activities(&user, &contact_id)?))
}
