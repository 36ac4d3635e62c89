// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{Contact, CreateContactRequest, UpdateContactRequest},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/contacts",
    tag = "Contacts",
    responses((status = 200, body = [Contact]))
)]
pub async fn list_contacts(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.list_contacts(&user)))
}

#[utoipa::path(
    post,
    path = "/contacts",
    request_body = CreateContactRequest,
    tag = "Contacts",
    responses((status = 201, body = Contact))
)]
pub async fn create_contact(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Contact name is required"));
    }
    let mut store = state.store.write().await;
    let contact = store.create_contact(&user, request);
    Ok((StatusCode::CREATED, Json(contact)))
}

#[utoipa::path(
    get,
    path = "/contacts/{contact_id}",
    params(("contact_id" = String, Path, description = "Contact identifier")),
    tag = "Contacts",
    responses((status = 200, body = Contact), (status = 403), (status = 404))
)]
pub async fn get_contact(
    Auth(user): Auth,
    Path(contact_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Contact>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.contact_for_user(&user, &contact_id)?))
}

#[utoipa::path(
    put,
    path = "/contacts/{contact_id}",
    params(("contact_id" = String, Path, description = "Contact identifier")),
    request_body = UpdateContactRequest,
    tag = "Contacts",
    responses((status = 200, body = Contact), (status = 403), (status = 404))
)]
pub async fn update_contact(
    Auth(user): Auth,
    Path(contact_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UpdateContactRequest>,
) -> Result<Json<Contact>, ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Contact name is required"));
    }
    let mut store = state.store.write().await;
    Ok(Json(store.update_contact(&user, &contact_id, request)?))
}

#[utoipa::path(
    delete,
    path = "/contacts/{contact_id}",
    params(("contact_id" = String, Path, description = "Contact identifier")),
    tag = "Contacts",
    responses((status = 204), (status = 403), (status = 404))
)]
pub async fn delete_contact(
    Auth(user): Auth,
    Path(contact_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    store.delete_contact(&user, &contact_id)?;
    Ok(StatusCode::NO_CONTENT)
}
