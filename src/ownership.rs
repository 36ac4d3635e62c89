// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for all resource access.
//!
//! Every mutating operation on a contact, task, or note must verify that the
//! authenticated account owns the resource, directly or through its parent
//! contact. A missing resource is a 404; an ownership mismatch is a 403 with
//! code `ACCESS_DENIED` - the two are never conflated.

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;

/// The closed set of ownership-checked resource kinds.
///
/// Keeping this an enum (rather than matching on a free-form type string)
/// means an unknown resource kind cannot silently bypass the guard: there is
/// no permissive fallthrough arm to forget about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Contact,
    Task,
    Note,
}

/// Trait for resources that carry their owner directly.
pub trait OwnedResource {
    /// Get the owner's user ID.
    fn owner_user_id(&self) -> &str;
}

/// Trait for enforcing ownership on resource access.
pub trait OwnershipEnforcer {
    /// Verify that the user owns this resource.
    ///
    /// # Errors
    /// Returns a 403 `ACCESS_DENIED` error if the user doesn't own the resource.
    fn verify_ownership(&self, user: &AuthenticatedUser) -> Result<(), ApiError>;
}

impl<T: OwnedResource> OwnershipEnforcer for T {
    fn verify_ownership(&self, user: &AuthenticatedUser) -> Result<(), ApiError> {
        if self.owner_user_id() == user.user_id {
            Ok(())
        } else {
            Err(ApiError::access_denied())
        }
    }
}

/// Extension trait for verifying ownership on lookup results.
pub trait OwnershipCheck<T> {
    /// Verify ownership and return the resource if authorized.
    fn verify_owner(self, user: &AuthenticatedUser) -> Result<T, ApiError>;
}

impl<T: OwnedResource> OwnershipCheck<T> for Option<T> {
    fn verify_owner(self, user: &AuthenticatedUser) -> Result<T, ApiError> {
        match self {
            Some(resource) => {
                resource.verify_ownership(user)?;
                Ok(resource)
            }
            None => Err(ApiError::not_found("Resource not found")),
        }
    }
}
