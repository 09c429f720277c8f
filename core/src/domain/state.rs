// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! Remote state blob schema.
//!
//! Two S3 objects, optionally under a key prefix:
//!
//! - `_meta.json` — always plaintext; says whether `state.json` is
//!   sealed and carries the KDF salt and master-password verifier
//! - `state.json` — the inventory document, plaintext or an
//!   [`EncryptedBox`](crate::crypto::EncryptedBox) envelope

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::crypto::EncryptedBox;
use crate::domain::context::{MachineEntry, RepositoryEntry, StorageEntry};

/// Current remote state schema version.
pub const STATE_VERSION: u32 = 1;

/// Plaintext the verifier seals; opening it proves the master password.
pub const VERIFIER_PLAINTEXT: &[u8] = b"rdc-vault-verifier-v1";

/// `_meta.json` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateMeta {
    pub version: u32,
    pub encrypted: bool,

    /// KDF salt for the master-password key; present iff `encrypted`.
    #[serde(skip_serializing_if = "Option::is_none", with = "super::context::opt_b64", default)]
    pub kdf_salt: Option<Vec<u8>>,

    /// [`VERIFIER_PLAINTEXT`] sealed under the derived key; present iff
    /// `encrypted`. Auth failure here means a wrong master password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifier: Option<EncryptedBox>,
}

impl StateMeta {
    pub fn plaintext() -> Self {
        Self {
            version: STATE_VERSION,
            encrypted: false,
            kdf_salt: None,
            verifier: None,
        }
    }
}

/// `state.json` — machine/storage/repository maps plus SSH key material.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub machines: BTreeMap<String, MachineEntry>,

    #[serde(default)]
    pub storages: BTreeMap<String, StorageEntry>,

    #[serde(default)]
    pub repositories: BTreeMap<String, RepositoryEntry>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ssh_keys: BTreeMap<String, SshKeyMaterial>,
}

impl StateDocument {
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
            && self.storages.is_empty()
            && self.repositories.is_empty()
            && self.ssh_keys.is_empty()
    }
}

/// SSH private key carried inside the state blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshKeyMaterial {
    pub private_key_pem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}
