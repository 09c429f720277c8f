// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! # Rackdeck core
//!
//! Domain layer shared by the `rdc` CLI and the API client:
//!
//! - **Context store** — named environments (cloud / local / s3) in a
//!   local JSON file
//! - **State vault** — S3-hosted state blob with optional master-password
//!   encryption
//! - **Crypto provider** — AES-256-GCM sealing with HKDF key derivation
//! - **Parsers** — remote log, progress, and file-listing output

pub mod crypto;
pub mod domain;
pub mod error;
pub mod parse;
pub mod store;
pub mod vault;

pub use error::Error;

/// Convenience alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, Error>;
