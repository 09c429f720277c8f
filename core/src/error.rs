// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! Error taxonomy for the core crate.
//!
//! Commands catch these at the CLI boundary and render short user-facing
//! messages; `Validation` in particular is printed without the error
//! chain.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad user input (flag values, context names, missing secrets).
    #[error("{0}")]
    Validation(String),

    #[error("context '{0}' not found")]
    ContextNotFound(String),

    #[error("context '{0}' already exists")]
    ContextExists(String),

    /// AEAD auth failure while opening the vault verifier. Distinct from
    /// `Crypto` so a mistyped master password is never reported as
    /// corrupt data.
    #[error("wrong master password")]
    WrongPassword,

    /// Sealing failed, or auth failure on data other than the verifier.
    #[error("encryption failure: {0}")]
    Crypto(String),

    #[error("context file version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Remote state storage (S3 or test double) failure.
    #[error("state storage: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
