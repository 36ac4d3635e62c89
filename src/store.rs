// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory record store.
//!
//! Holds users, contacts, tasks, notes, and activity entries behind the
//! `AppState` lock. Every resource accessor takes the authenticated user and
//! enforces ownership before touching the record; handlers never see another
//! account's data.
//!
//! The store stands in for the SQL layer of the deployed system; it is
//! consumed strictly as a record store, so swapping in a database-backed
//! implementation changes nothing above this module.

use std::collections::HashMap;

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::models::{
    Activity, ActivityKind, Contact, CreateContactRequest, CreateNoteRequest, CreateTaskRequest,
    Note, Task, UpdateContactRequest, UpdateTaskRequest, User,
};
use crate::ownership::{OwnershipCheck, OwnershipEnforcer, ResourceKind};

/// Length of generated user identifiers.
const USER_ID_DIGITS: u32 = 10;

#[derive(Default)]
pub struct InMemoryStore {
    users: HashMap<String, User>,
    contacts: HashMap<String, Contact>,
    tasks: HashMap<String, Task>,
    notes: HashMap<String, Note>,
    activities: Vec<Activity>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Create a user account.
    ///
    /// Emails are unique case-insensitively; a duplicate is a 409 with code
    /// `EMAIL_TAKEN`. The generated ID is a fixed-length numeric string,
    /// retried on the (unlikely) collision.
    pub fn insert_user(
        &mut self,
        email: &str,
        display_name: Option<String>,
        password_hash: String,
    ) -> Result<User, ApiError> {
        if self.user_by_email(email).is_some() {
            return Err(ApiError::conflict(
                "EMAIL_TAKEN",
                "An account with this email already exists",
            ));
        }

        let id = self.generate_user_id();
        let user = User {
            id: id.clone(),
            email: email.to_string(),
            password_hash,
            display_name,
            created_at: Utc::now(),
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    pub fn user_by_id(&self, user_id: &str) -> Option<&User> {
        self.users.get(user_id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
    }

    /// Remove an account. Callers are responsible for revoking the user's
    /// refresh tokens in the registry.
    pub fn remove_user(&mut self, user_id: &str) -> Option<User> {
        self.users.remove(user_id)
    }

    fn generate_user_id(&self) -> String {
        let ceiling = 10u64.pow(USER_ID_DIGITS);
        loop {
            let candidate = format!(
                "{:0width$}",
                rand::thread_rng().gen_range(0..ceiling),
                width = USER_ID_DIGITS as usize
            );
            if !self.users.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    // =========================================================================
    // Ownership guard
    // =========================================================================

    /// Check that `user` may act on the identified resource.
    ///
    /// - `Contact`: allowed iff the contact exists and the user owns it
    /// - `Task`: allowed iff the task's own `user_id` matches, or its parent
    ///   contact's does
    /// - `Note`: allowed iff the parent contact's owner matches
    ///
    /// A missing resource is a 404 `NOT_FOUND`; an ownership mismatch is a
    /// 403 `ACCESS_DENIED`.
    pub fn authorize(
        &self,
        user: &AuthenticatedUser,
        kind: ResourceKind,
        resource_id: &str,
    ) -> Result<(), ApiError> {
        match kind {
            ResourceKind::Contact => {
                let contact = self
                    .contacts
                    .get(resource_id)
                    .ok_or_else(|| ApiError::not_found("Contact not found"))?;
                contact.verify_ownership(user)
            }
            ResourceKind::Task => {
                let task = self
                    .tasks
                    .get(resource_id)
                    .ok_or_else(|| ApiError::not_found("Task not found"))?;
                if task.user_id == user.user_id {
                    return Ok(());
                }
                // Contact-scoped tasks are also reachable by the contact's owner.
                if let Some(contact) = task
                    .contact_id
                    .as_deref()
                    .and_then(|id| self.contacts.get(id))
                {
                    return contact.verify_ownership(user);
                }
                Err(ApiError::access_denied())
            }
            ResourceKind::Note => {
                let note = self
                    .notes
                    .get(resource_id)
                    .ok_or_else(|| ApiError::not_found("Note not found"))?;
                let contact = self
                    .contacts
                    .get(&note.contact_id)
                    .ok_or_else(|| ApiError::not_found("Note not found"))?;
                contact.verify_ownership(user)
            }
        }
    }

    // =========================================================================
    // Contacts
    // =========================================================================

    pub fn list_contacts(&self, user: &AuthenticatedUser) -> Vec<Contact> {
        self.contacts
            .values()
            .filter(|contact| contact.user_id == user.user_id)
            .cloned()
            .collect()
    }

    pub fn create_contact(
        &mut self,
        user: &AuthenticatedUser,
        request: CreateContactRequest,
    ) -> Contact {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let contact = Contact {
            id: id.clone(),
            user_id: user.user_id.clone(),
            name: request.name,
            email: request.email,
            phone: request.phone,
            category: request.category,
            created_at: now,
            updated_at: now,
        };
        self.record_activity(&id, ActivityKind::ContactCreated, &contact.name);
        self.contacts.insert(id, contact.clone());
        contact
    }

    pub fn contact_for_user(
        &self,
        user: &AuthenticatedUser,
        contact_id: &str,
    ) -> Result<Contact, ApiError> {
        self.contacts
            .get(contact_id)
            .cloned()
            .verify_owner(user)
            .map_err(contact_not_found)
    }

    pub fn update_contact(
        &mut self,
        user: &AuthenticatedUser,
        contact_id: &str,
        request: UpdateContactRequest,
    ) -> Result<Contact, ApiError> {
        self.authorize(user, ResourceKind::Contact, contact_id)?;
        self.record_activity(contact_id, ActivityKind::ContactUpdated, &request.name);

        // Authorized above; the record is present.
        let contact = self
            .contacts
            .get_mut(contact_id)
            .ok_or_else(|| ApiError::not_found("Contact not found"))?;
        contact.name = request.name;
        contact.email = request.email;
        contact.phone = request.phone;
        contact.category = request.category;
        contact.updated_at = Utc::now();
        Ok(contact.clone())
    }

    /// Delete a contact, cascading to its notes and activity entries and
    /// unlinking any tasks that referenced it.
    pub fn delete_contact(
        &mut self,
        user: &AuthenticatedUser,
        contact_id: &str,
    ) -> Result<(), ApiError> {
        self.authorize(user, ResourceKind::Contact, contact_id)?;
        self.contacts.remove(contact_id);
        self.notes.retain(|_, note| note.contact_id != contact_id);
        self.activities
            .retain(|activity| activity.contact_id != contact_id);
        for task in self.tasks.values_mut() {
            if task.contact_id.as_deref() == Some(contact_id) {
                task.contact_id = None;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    pub fn list_tasks(&self, user: &AuthenticatedUser) -> Vec<Task> {
        self.tasks
            .values()
            .filter(|task| task.user_id == user.user_id)
            .cloned()
            .collect()
    }

    pub fn create_task(
        &mut self,
        user: &AuthenticatedUser,
        request: CreateTaskRequest,
    ) -> Result<Task, ApiError> {
        if let Some(contact_id) = request.contact_id.as_deref() {
            self.authorize(user, ResourceKind::Contact, contact_id)?;
            self.record_activity(contact_id, ActivityKind::TaskLinked, &request.title);
        }

        let id = Uuid::new_v4().to_string();
        let task = Task {
            id: id.clone(),
            user_id: user.user_id.clone(),
            contact_id: request.contact_id,
            title: request.title,
            due_date: request.due_date,
            completed: false,
            created_at: Utc::now(),
        };
        self.tasks.insert(id, task.clone());
        Ok(task)
    }

    pub fn update_task(
        &mut self,
        user: &AuthenticatedUser,
        task_id: &str,
        request: UpdateTaskRequest,
    ) -> Result<Task, ApiError> {
        self.authorize(user, ResourceKind::Task, task_id)?;

        let task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| ApiError::not_found("Task not found"))?;
        task.title = request.title;
        task.due_date = request.due_date;
        task.completed = request.completed;
        Ok(task.clone())
    }

    pub fn delete_task(
        &mut self,
        user: &AuthenticatedUser,
        task_id: &str,
    ) -> Result<(), ApiError> {
        self.authorize(user, ResourceKind::Task, task_id)?;
        self.tasks.remove(task_id);
        Ok(())
    }

    // =========================================================================
    // Notes & Activities
    // =========================================================================

    pub fn add_note(
        &mut self,
        user: &AuthenticatedUser,
        contact_id: &str,
        request: CreateNoteRequest,
    ) -> Result<Note, ApiError> {
        self.authorize(user, ResourceKind::Contact, contact_id)?;
        self.record_activity(contact_id, ActivityKind::NoteAdded, &request.body);

        let id = Uuid::new_v4().to_string();
        let note = Note {
            id: id.clone(),
            contact_id: contact_id.to_string(),
            body: request.body,
            created_at: Utc::now(),
        };
        self.notes.insert(id, note.clone());
        Ok(note)
    }

    pub fn list_notes(
        &self,
        user: &AuthenticatedUser,
        contact_id: &str,
    ) -> Result<Vec<Note>, ApiError> {
        self.authorize(user, ResourceKind::Contact, contact_id)?;
        Ok(self
            .notes
            .values()
            .filter(|note| note.contact_id == contact_id)
            .cloned()
            .collect())
    }

    pub fn delete_note(
        &mut self,
        user: &AuthenticatedUser,
        note_id: &str,
    ) -> Result<(), ApiError> {
        self.authorize(user, ResourceKind::Note, note_id)?;
        self.notes.remove(note_id);
        Ok(())
    }

    pub fn list_activities(
        &self,
        user: &AuthenticatedUser,
        contact_id: &str,
    ) -> Result<Vec<Activity>, ApiError> {
        self.authorize(user, ResourceKind::Contact, contact_id)?;
        Ok(self
            .activities
            .iter()
            .filter(|activity| activity.contact_id == contact_id)
            .cloned()
            .collect())
    }

    fn record_activity(&mut self, contact_id: &str, kind: ActivityKind, detail: &str) {
        self.activities.push(Activity {
            id: Uuid::new_v4().to_string(),
            contact_id: contact_id.to_string(),
            kind,
            detail: detail.to_string(),
            occurred_at: Utc::now(),
        });
    }
}

/// Ownership lookups on contacts report a missing record as a contact-level
/// 404; rewrite the generic message from the ownership helper.
fn contact_not_found(err: ApiError) -> ApiError {
    if err.status == axum::http::StatusCode::NOT_FOUND {
        ApiError::not_found("Contact not found")
    } else {
        err
    }
}
