// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod choice;
pub mod question;

pub use choice::Choice;
pub use question::Question;
