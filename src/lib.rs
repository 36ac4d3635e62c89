// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational CRM - Multi-Tenant Contact Management Service
//!
//! This crate provides the backend for the Relational CRM: account
//! registration and login, access/refresh token sessions with rotation and
//! revocation, and contact/task/note resources scoped to the owning account.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token issuance, refresh token registry, request authentication
//! - `ownership` - Resource ownership enforcement
//! - `store` - In-memory record store

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod ownership;
pub mod state;
pub mod store;
