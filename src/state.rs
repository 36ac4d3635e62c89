// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{RefreshTokenRegistry, TokenIssuer};
use crate::config::AuthSettings;
use crate::store::InMemoryStore;

/// Shared application state.
///
/// The store and the refresh token registry are the only cross-request
/// mutable state; everything else is per-request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<InMemoryStore>>,
    pub tokens: Arc<TokenIssuer>,
    pub registry: Arc<RefreshTokenRegistry>,
}

impl AppState {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            store: Arc::new(RwLock::new(InMemoryStore::new())),
            tokens: Arc::new(TokenIssuer::new(settings)),
            registry: Arc::new(RefreshTokenRegistry::new()),
        }
    }
}

impl Default for AppState {
    /// State with test settings; used by handler tests.
    fn default() -> Self {
        Self::new(&AuthSettings::for_tests())
    }
}
