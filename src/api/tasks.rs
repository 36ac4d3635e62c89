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
    models::{CreateTaskRequest, Task, UpdateTaskRequest},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/tasks",
    tag = "Tasks",
    responses((status = 200, body = [Task]))
)]
pub async fn list_tasks(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.list_tasks(&user)))
}

#[utoipa::path(
    post,
    path = "/tasks",
    request_body = CreateTaskRequest,
    tag = "Tasks",
    responses((status = 201, body = Task), (status = 403))
)]
pub async fn create_task(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    if request.title.trim().is_empty() {
        return Err(ApiError::bad_request("Task title is required"));
    }
    let mut store = state.store.write().await;
    let task = store.create_task(&user, request)?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    put,
    path = "/tasks/{task_id}",
    params(("task_id" = String, Path, description = "Task identifier")),
    request_body = UpdateTaskRequest,
    tag = "Tasks",
    responses((status = 200, body = Task), (status = 403), (status = 404))
)]
pub async fn update_task(
    Auth(user): Auth,
    Path(task_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let mut store = state.store.write().await;
    Ok(Json(store.update_task(&user, &task_id, request)?))
}

#[utoipa::path(
    delete,
    path = "/tasks/{task_id}",
    params(("task_id" = String, Path, description = "Task identifier")),
    tag = "Tasks",
    responses((status = 204), (status = 403), (status = 404))
)]
pub async fn delete_task(
    Auth(user): Auth,
    Path(task_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    store.delete_task(&user, &task_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::models::{ContactCategory, CreateContactRequest};

    fn alice() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "1000000001".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    fn bob() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "2000000002".to_string(),
            email: "bob@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn create_update_and_complete_a_task() {
        let state = AppState::default();

        let (status, Json(task)) = create_task(
            Auth(alice()),
            State(state.clone()),
            Json(CreateTaskRequest {
                title: "Call Carol".to_string(),
                contact_id: None,
                due_date: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(!task.completed);

        let Json(updated) = update_task(
            Auth(alice()),
            Path(task.id),
            State(state.clone()),
            Json(UpdateTaskRequest {
                title: "Call Carol".to_string(),
                due_date: None,
                completed: true,
            }),
        )
        .await
        .unwrap();
        assert!(updated.completed);

        let Json(tasks) = list_tasks(Auth(alice()), State(state)).await.unwrap();
        assert_eq!(tasks, vec![updated]);
    }

    #[tokio::test]
    async fn task_linked_to_foreign_contact_is_denied() {
        let state = AppState::default();
        let contact = {
            let mut store = state.store.write().await;
            store.create_contact(
                &alice(),
                CreateContactRequest {
                    name: "Carol".to_string(),
                    email: None,
                    phone: None,
                    category: ContactCategory::Seller,
                },
            )
        };

        let err = create_task(
            Auth(bob()),
            State(state),
            Json(CreateTaskRequest {
                title: "Poach Carol".to_string(),
                contact_id: Some(contact.id),
                due_date: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn cross_user_task_mutation_is_denied() {
        let state = AppState::default();
        let (_, Json(task)) = create_task(
            Auth(alice()),
            State(state.clone()),
            Json(CreateTaskRequest {
                title: "Call Carol".to_string(),
                contact_id: None,
                due_date: None,
            }),
        )
        .await
        .unwrap();

        let err = delete_task(Auth(bob()), Path(task.id), State(state))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.code, "ACCESS_DENIED");
    }
}
