// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Polls: a small voting site.
//!
//! Visitors browse published questions, vote on a choice and look at the
//! tallies. Administrators manage questions and their choices through a
//! server-rendered admin console.

pub mod admin;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod templates;
pub mod time_utils;

use config::Config;
use db::Db;
use templates::Templates;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub templates: Templates,
}
