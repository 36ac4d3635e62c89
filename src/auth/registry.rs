// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Server-side refresh token registry.
//!
//! Tracks one [`RefreshTokenRecord`] per outstanding refresh token, keyed by
//! the token's `jti`. The registry is the revocation authority: a record,
//! once revoked, never authorizes a refresh again.
//!
//! ## Record lifecycle
//!
//! ```text
//! ACTIVE -> ROTATED   (consumed by a successful refresh)
//!        -> REVOKED   (explicit logout or logout-everywhere)
//!        -> EXPIRED   (time-based, detected at consume time)
//! EXPIRED -> PURGED   (removed by the periodic sweep)
//! ```
//!
//! Transitions are one-directional; no state re-activates. Rotated, revoked,
//! and expired records all fail [`consume`](RefreshTokenRegistry::consume),
//! differing only in the returned error kind.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::error::AuthError;

/// Server-side state for one refresh token.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    /// The refresh token's `jti`.
    pub token_id: String,
    pub user_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

/// Process-wide table of refresh token records.
///
/// All operations take `&self` and run under a single mutex, so the
/// check-then-revoke sequence in [`consume`](Self::consume) is atomic: two
/// concurrent refresh attempts with the same token cannot both succeed.
#[derive(Debug, Default)]
pub struct RefreshTokenRegistry {
    records: Mutex<HashMap<String, RefreshTokenRecord>>,
}

impl RefreshTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly issued refresh token.
    pub fn insert(&self, record: RefreshTokenRecord) {
        self.lock().insert(record.token_id.clone(), record);
    }

    /// Atomically verify and retire a refresh token record.
    ///
    /// On success the record is marked revoked before being returned, so the
    /// same `token_id` can never be consumed twice - even by concurrent
    /// requests racing on the same token.
    ///
    /// # Errors
    /// - [`AuthError::TokenRevoked`] if the record is missing or already
    ///   revoked (a missing record is indistinguishable from a revoked one
    ///   by design: both mean "this token no longer authorizes anything")
    /// - [`AuthError::TokenExpired`] if the record's expiry has passed
    pub fn consume(&self, token_id: &str) -> Result<RefreshTokenRecord, AuthError> {
        let mut records = self.lock();
        let record = records.get_mut(token_id).ok_or(AuthError::TokenRevoked)?;

        if record.revoked {
            return Err(AuthError::TokenRevoked);
        }
        if record.expires_at < Utc::now() {
            return Err(AuthError::TokenExpired);
        }

        record.revoked = true;
        Ok(record.clone())
    }

    /// Revoke a single record. Idempotent; a missing record is a no-op.
    ///
    /// Returns whether a previously active record was revoked.
    pub fn revoke(&self, token_id: &str) -> bool {
        match self.lock().get_mut(token_id) {
            Some(record) if !record.revoked => {
                record.revoked = true;
                true
            }
            _ => false,
        }
    }

    /// Revoke every record belonging to a user. Returns the number of
    /// previously active records revoked.
    pub fn revoke_all(&self, user_id: &str) -> usize {
        let mut records = self.lock();
        let mut revoked = 0;
        for record in records.values_mut() {
            if record.user_id == user_id && !record.revoked {
                record.revoked = true;
                revoked += 1;
            }
        }
        revoked
    }

    /// Remove all records whose expiry has passed. Returns the count removed.
    ///
    /// This bounds memory only; expiry is enforced at consume time whether
    /// or not the sweep has run.
    pub fn sweep(&self) -> usize {
        let mut records = self.lock();
        let now = Utc::now();
        let before = records.len();
        records.retain(|_, record| record.expires_at >= now);
        before - records.len()
    }

    /// Number of tracked records, revoked ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, RefreshTokenRecord>> {
        // Poisoning only happens if a holder panicked; the map itself is
        // never left mid-update, so recover the guard either way.
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(token_id: &str, user_id: &str, expires_in: Duration) -> RefreshTokenRecord {
        let now = Utc::now();
        RefreshTokenRecord {
            token_id: token_id.to_string(),
            user_id: user_id.to_string(),
            issued_at: now,
            expires_at: now + expires_in,
            revoked: false,
        }
    }

    #[test]
    fn consume_succeeds_exactly_once() {
        let registry = RefreshTokenRegistry::new();
        registry.insert(record("t1", "1000000001", Duration::days(7)));

        let consumed = registry.consume("t1").unwrap();
        assert_eq!(consumed.user_id, "1000000001");

        // Rotation invariant: the same token never authorizes twice.
        assert_eq!(registry.consume("t1").unwrap_err(), AuthError::TokenRevoked);
    }

    #[test]
    fn consume_unknown_token_reports_revoked() {
        let registry = RefreshTokenRegistry::new();
        assert_eq!(
            registry.consume("never-issued").unwrap_err(),
            AuthError::TokenRevoked
        );
    }

    #[test]
    fn consume_expired_record_reports_expired() {
        let registry = RefreshTokenRegistry::new();
        registry.insert(record("t1", "1000000001", Duration::minutes(-1)));

        assert_eq!(registry.consume("t1").unwrap_err(), AuthError::TokenExpired);
    }

    #[test]
    fn revoke_is_idempotent() {
        let registry = RefreshTokenRegistry::new();
        registry.insert(record("t1", "1000000001", Duration::days(7)));

        assert!(registry.revoke("t1"));
        assert!(!registry.revoke("t1"));
        assert!(!registry.revoke("missing"));
    }

    #[test]
    fn revoke_all_spares_other_users() {
        let registry = RefreshTokenRegistry::new();
        registry.insert(record("a1", "1000000001", Duration::days(7)));
        registry.insert(record("a2", "1000000001", Duration::days(7)));
        registry.insert(record("b1", "2000000002", Duration::days(7)));

        assert_eq!(registry.revoke_all("1000000001"), 2);

        assert_eq!(registry.consume("a1").unwrap_err(), AuthError::TokenRevoked);
        assert_eq!(registry.consume("a2").unwrap_err(), AuthError::TokenRevoked);
        assert!(registry.consume("b1").is_ok());
    }

    #[test]
    fn sweep_removes_only_expired_records() {
        let registry = RefreshTokenRegistry::new();
        registry.insert(record("old", "1000000001", Duration::hours(-1)));
        registry.insert(record("live", "1000000001", Duration::days(7)));

        assert_eq!(registry.sweep(), 1);
        assert_eq!(registry.len(), 1);

        // The surviving record is still consumable.
        assert!(registry.consume("live").is_ok());
    }

    #[test]
    fn sweep_timing_does_not_affect_expiry_enforcement() {
        let registry = RefreshTokenRegistry::new();
        registry.insert(record("old", "1000000001", Duration::hours(-1)));

        // Expired but not yet swept: consume still rejects it.
        assert_eq!(
            registry.consume("old").unwrap_err(),
            AuthError::TokenExpired
        );
    }

    #[test]
    fn concurrent_consume_admits_exactly_one_winner() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(RefreshTokenRegistry::new());
        registry.insert(record("shared", "1000000001", Duration::days(7)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.consume("shared").is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(successes, 1);
    }
}
