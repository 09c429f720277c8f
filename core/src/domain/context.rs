// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! Context file schema.
//!
//! A context is a named environment the CLI operates against: the remote
//! cloud API (`cloud`), direct SSH management with locally-kept inventory
//! maps (`local`), or SSH management with the inventory held in an
//! S3-hosted state blob (`s3`). The whole file is one JSON document with
//! last-write-wins semantics; there is no locking or merge protocol.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::crypto::{self, EncryptedBox, SecretKey};
use crate::error::Error;

/// Current context file schema version.
pub const CONTEXT_FILE_VERSION: u32 = 1;

/// Top-level document stored at `<config-dir>/contexts.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextFile {
    pub version: u32,

    /// Name of the selected context, if any. Must reference an entry in
    /// `contexts`; the store enforces this on save.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,

    #[serde(default)]
    pub contexts: BTreeMap<String, Context>,
}

impl Default for ContextFile {
    fn default() -> Self {
        Self {
            version: CONTEXT_FILE_VERSION,
            current: None,
            contexts: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    Cloud,
    Local,
    S3,
}

impl std::fmt::Display for ContextMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cloud => write!(f, "cloud"),
            Self::Local => write!(f, "local"),
            Self::S3 => write!(f, "s3"),
        }
    }
}

/// One named environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub mode: ContextMode,

    /// Cloud API settings (`cloud` mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<CloudApiSettings>,

    /// S3 settings for the remote state blob (`s3` mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Settings>,

    /// Context-wide SSH private key path (`local`/`s3` modes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key_path: Option<String>,

    /// Inventory maps. Held locally in `local` mode; empty in `s3` mode,
    /// where the state vault owns them.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub machines: BTreeMap<String, MachineEntry>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub storages: BTreeMap<String, StorageEntry>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub repositories: BTreeMap<String, RepositoryEntry>,
}

impl Context {
    pub fn cloud(api: CloudApiSettings) -> Self {
        Self {
            mode: ContextMode::Cloud,
            api: Some(api),
            s3: None,
            ssh_key_path: None,
            machines: BTreeMap::new(),
            storages: BTreeMap::new(),
            repositories: BTreeMap::new(),
        }
    }

    pub fn local(ssh_key_path: Option<String>) -> Self {
        Self {
            mode: ContextMode::Local,
            api: None,
            s3: None,
            ssh_key_path,
            machines: BTreeMap::new(),
            storages: BTreeMap::new(),
            repositories: BTreeMap::new(),
        }
    }

    pub fn s3(settings: S3Settings) -> Self {
        Self {
            mode: ContextMode::S3,
            api: None,
            s3: Some(settings),
            ssh_key_path: None,
            machines: BTreeMap::new(),
            storages: BTreeMap::new(),
            repositories: BTreeMap::new(),
        }
    }

    /// Mode/settings consistency checks, run by the store on create.
    pub fn validate(&self) -> Result<(), Error> {
        match self.mode {
            ContextMode::Cloud => {
                let api = self
                    .api
                    .as_ref()
                    .ok_or_else(|| Error::validation("cloud context requires api settings"))?;
                if api.url.is_empty() {
                    return Err(Error::validation("api url cannot be empty"));
                }
            }
            ContextMode::S3 => {
                let s3 = self
                    .s3
                    .as_ref()
                    .ok_or_else(|| Error::validation("s3 context requires s3 settings"))?;
                s3.validate()?;
            }
            ContextMode::Local => {
                if self.s3.is_some() {
                    return Err(Error::validation(
                        "local context must not carry s3 settings",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Cloud API endpoint plus bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudApiSettings {
    pub url: String,
    pub token: Secret,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

/// S3 settings for the state vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Settings {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: Secret,

    /// Key prefix inside the bucket (no trailing slash).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Whether the remote `state.json` is sealed with a master password.
    #[serde(default)]
    pub encrypted: bool,

    /// Salt for deriving the local at-rest key when `secret_key` is
    /// sealed. The remote `_meta.json` carries its own salt.
    #[serde(skip_serializing_if = "Option::is_none", with = "opt_b64", default)]
    pub kdf_salt: Option<Vec<u8>>,
}

impl S3Settings {
    pub fn validate(&self) -> Result<(), Error> {
        if self.endpoint.is_empty() {
            return Err(Error::validation("s3 endpoint cannot be empty"));
        }
        if self.bucket.is_empty() {
            return Err(Error::validation("s3 bucket cannot be empty"));
        }
        if self.region.is_empty() {
            return Err(Error::validation("s3 region cannot be empty"));
        }
        if self.secret_key.is_sealed() && self.kdf_salt.is_none() {
            return Err(Error::validation(
                "sealed s3 secret key requires a kdf salt",
            ));
        }
        Ok(())
    }
}

/// A secret at rest: plaintext, or sealed under a master-password key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Secret {
    Sealed(EncryptedBox),
    Plain(String),
}

impl Secret {
    pub fn is_sealed(&self) -> bool {
        matches!(self, Self::Sealed(_))
    }

    /// Recover the plaintext, unsealing with `key` when needed.
    pub fn reveal(&self, key: Option<&SecretKey>) -> Result<String, Error> {
        match self {
            Self::Plain(s) => Ok(s.clone()),
            Self::Sealed(sealed) => {
                let key = key.ok_or(Error::WrongPassword)?;
                crypto::open_str(sealed, key).map_err(|e| match e {
                    Error::Crypto(_) => Error::WrongPassword,
                    other => other,
                })
            }
        }
    }
}

/// Managed machine entry in a local/S3 context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineEntry {
    pub host: String,
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_ssh_port() -> u16 {
    22
}

/// Storage volume entry: a path on a managed machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEntry {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Distributed-storage repository entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryEntry {
    #[serde(default)]
    pub machines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Optional-bytes-as-base64 for salts in JSON.
pub(crate) mod opt_b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, ser: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => ser.serialize_some(&STANDARD.encode(b)),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Vec<u8>>, D::Error> {
        let s: Option<String> = Option::deserialize(de)?;
        match s {
            Some(s) => STANDARD
                .decode(s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto;

    #[test]
    fn secret_untagged_roundtrip() {
        let key = SecretKey([3u8; 32]);
        let plain = Secret::Plain("tok-123".to_string());
        let sealed = Secret::Sealed(crypto::seal_str("tok-456", &key).unwrap());

        let plain_json = serde_json::to_string(&plain).unwrap();
        let sealed_json = serde_json::to_string(&sealed).unwrap();
        assert_eq!(plain_json, "\"tok-123\"");

        let plain_back: Secret = serde_json::from_str(&plain_json).unwrap();
        let sealed_back: Secret = serde_json::from_str(&sealed_json).unwrap();
        assert_eq!(plain_back.reveal(None).unwrap(), "tok-123");
        assert_eq!(sealed_back.reveal(Some(&key)).unwrap(), "tok-456");
    }

    #[test]
    fn sealed_secret_without_key_is_wrong_password() {
        let key = SecretKey([3u8; 32]);
        let sealed = Secret::Sealed(crypto::seal_str("s", &key).unwrap());
        assert!(matches!(sealed.reveal(None), Err(Error::WrongPassword)));
    }

    #[test]
    fn cloud_context_requires_api() {
        let mut ctx = Context::local(None);
        ctx.mode = ContextMode::Cloud;
        assert!(ctx.validate().is_err());

        let ctx = Context::cloud(CloudApiSettings {
            url: "https://api.rackdeck.io".to_string(),
            token: Secret::Plain("t".to_string()),
            team: None,
        });
        assert!(ctx.validate().is_ok());
    }

    #[test]
    fn s3_settings_validation() {
        let mut s3 = S3Settings {
            endpoint: "https://s3.eu-central-1.amazonaws.com".to_string(),
            region: "eu-central-1".to_string(),
            bucket: "rdc-state".to_string(),
            access_key: "AK".to_string(),
            secret_key: Secret::Plain("sk".to_string()),
            prefix: None,
            encrypted: false,
            kdf_salt: None,
        };
        assert!(s3.validate().is_ok());

        s3.bucket.clear();
        assert!(s3.validate().is_err());
    }

    #[test]
    fn context_file_json_roundtrip_preserves_current() {
        let mut file = ContextFile::default();
        file.contexts.insert(
            "dev".to_string(),
            Context::local(Some("/home/op/.ssh/id_ed25519".to_string())),
        );
        file.current = Some("dev".to_string());

        let json = serde_json::to_string_pretty(&file).unwrap();
        let back: ContextFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.version, CONTEXT_FILE_VERSION);
        assert_eq!(back.current.as_deref(), Some("dev"));
        assert_eq!(back.contexts["dev"].mode, ContextMode::Local);
    }
}
