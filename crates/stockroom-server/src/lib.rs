// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stockroom workspace membership guard server.
//!
//! Wires the access-control core to an axum HTTP surface: bearer-token
//! authentication, the membership verification endpoint, and the owner-only
//! admin tooling.

pub mod api;
pub mod auth;
pub mod error;
pub mod routes;

pub use api::{create_app_state, create_router, AppState};
