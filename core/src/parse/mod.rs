// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! Parsers for remote command output: job logs, progress markers, and
//! file-browser listings.

pub mod listing;
pub mod log;
pub mod progress;
