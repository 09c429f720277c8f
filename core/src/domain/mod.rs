// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! Domain models: context file, remote state blob, console API resources.

pub mod context;
pub mod models;
pub mod state;

pub use context::*;
pub use models::*;
pub use state::*;
