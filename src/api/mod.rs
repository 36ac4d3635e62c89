// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        Activity, Contact, CreateContactRequest, CreateNoteRequest, CreateTaskRequest,
        LoginRequest, LogoutAllResponse, LogoutRequest, MessageResponse, Note, PublicUser,
        RefreshRequest, RegisterRequest, RegisterResponse, SessionResponse, Task,
        UpdateContactRequest, UpdateTaskRequest, VerifyResponse,
    },
    state::AppState,
};

pub mod auth;
pub mod contacts;
pub mod health;
pub mod notes;
pub mod tasks;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/verify", get(auth::verify))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/logout-all", post(auth::logout_all))
        .route(
            "/contacts",
            get(contacts::list_contacts).post(contacts::create_contact),
        )
        .route(
            "/contacts/{contact_id}",
            get(contacts::get_contact)
                .put(contacts::update_contact)
                .delete(contacts::delete_contact),
        )
        .route(
            "/contacts/{contact_id}/notes",
            get(notes::list_notes).post(notes::create_note),
        )
        .route(
            "/contacts/{contact_id}/activities",
            get(notes::list_activities),
        )
        .route("/notes/{note_id}", delete(notes::delete_note))
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/{task_id}",
            put(tasks::update_task).delete(tasks::delete_task),
        )
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::register,
        auth::login,
        auth::verify,
        auth::refresh,
        auth::logout,
        auth::logout_all,
        contacts::list_contacts,
        contacts::create_contact,
        contacts::get_contact,
        contacts::update_contact,
        contacts::delete_contact,
        notes::list_notes,
        notes::create_note,
        notes::delete_note,
        notes::list_activities,
        tasks::list_tasks,
        tasks::create_task,
        tasks::update_task,
        tasks::delete_task
    ),
    components(
        schemas(
            PublicUser,
            RegisterRequest,
            RegisterResponse,
            LoginRequest,
            SessionResponse,
            VerifyResponse,
            RefreshRequest,
            LogoutRequest,
            MessageResponse,
            LogoutAllResponse,
            Contact,
            CreateContactRequest,
            UpdateContactRequest,
            Task,
            CreateTaskRequest,
            UpdateTaskRequest,
            Note,
            CreateNoteRequest,
            Activity
        )
    ),
    tags(
        (name = "Health", description = "Liveness probes"),
        (name = "Auth", description = "Registration, login, and session lifecycle"),
        (name = "Contacts", description = "Contact management"),
        (name = "Tasks", description = "Follow-up tasks"),
        (name = "Notes", description = "Contact notes and activity timeline")
    )
)]
struct ApiDoc;
