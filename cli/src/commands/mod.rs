// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Rackdeck CLI

pub mod cluster;
pub mod context;
pub mod machine;
pub mod queue;
pub mod storage;
pub mod team;

pub use self::cluster::ClusterCommand;
pub use self::context::ContextCommand;
pub use self::machine::MachineCommand;
pub use self::queue::QueueCommand;
pub use self::storage::StorageCommand;
pub use self::team::TeamCommand;

use anyhow::Result;
use std::io::IsTerminal;
use std::path::PathBuf;

use rdc_client::{ConsoleClient, S3Client, S3Credentials};
use rdc_core::crypto;
use rdc_core::domain::{ContextMode, S3Settings};
use rdc_core::store::ContextStore;
use rdc_core::Error;

/// Global flags shared by every subcommand.
pub struct Scope {
    pub config_dir: Option<PathBuf>,
    pub context: Option<String>,
}

impl Scope {
    /// Directory holding `contexts.json`.
    pub fn config_dir(&self) -> Result<PathBuf> {
        match &self.config_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(ContextStore::default_dir()?),
        }
    }

    pub fn open_store(&self) -> Result<ContextStore> {
        Ok(ContextStore::open(&self.config_dir()?)?)
    }
}

/// Build a console API client from the scope's target context, which
/// must be in `cloud` mode.
pub fn console_client(store: &ContextStore, scope: &Scope) -> Result<ConsoleClient> {
    let (name, ctx) = store.resolve(scope.context.as_deref())?;
    if ctx.mode != ContextMode::Cloud {
        return Err(Error::validation(format!(
            "context '{}' is in '{}' mode; this command needs a cloud context",
            name, ctx.mode
        ))
        .into());
    }
    let api = ctx
        .api
        .as_ref()
        .ok_or_else(|| Error::validation(format!("context '{}' has no api settings", name)))?;
    let token = api.token.reveal(None).map_err(|_| {
        Error::validation(format!(
            "context '{}' holds a sealed api token; recreate it with a plaintext token",
            name
        ))
    })?;
    Ok(ConsoleClient::new(&api.url, token)?)
}

/// Build an S3 client from vault settings, unsealing the secret key
/// with the master password when needed.
pub fn s3_client(settings: &S3Settings, master_password: Option<&str>) -> Result<S3Client> {
    let key = if settings.secret_key.is_sealed() {
        let pw = master_password.ok_or_else(|| {
            Error::validation("s3 secret key is sealed; master password required")
        })?;
        let salt = settings
            .kdf_salt
            .as_deref()
            .ok_or_else(|| Error::validation("sealed s3 secret key is missing its kdf salt"))?;
        Some(crypto::derive_key(pw, salt))
    } else {
        None
    };
    let credentials = S3Credentials {
        access_key: settings.access_key.clone(),
        secret_key: settings.secret_key.reveal(key.as_ref())?,
    };
    Ok(S3Client::new(
        &settings.endpoint,
        settings.region.clone(),
        settings.bucket.clone(),
        credentials,
    )?)
}

/// Resolve a secret from its flag, or prompt for it on a TTY. Off a
/// TTY the flag is mandatory.
pub fn require_secret(value: Option<String>, prompt: &str, flag: &str) -> Result<String> {
    if let Some(v) = value {
        return Ok(v);
    }
    if !std::io::stdin().is_terminal() {
        return Err(Error::validation(format!(
            "{} is required when stdin is not a terminal",
            flag
        ))
        .into());
    }
    Ok(dialoguer::Password::new().with_prompt(prompt).interact()?)
}

/// Gate a destructive action behind `--yes` or an interactive confirm.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(Error::validation(format!(
            "refusing without confirmation; pass --yes to {}",
            prompt
        ))
        .into());
    }
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_prefers_explicit_config_dir() {
        let scope = Scope {
            config_dir: Some(PathBuf::from("/tmp/rdc-test")),
            context: None,
        };
        assert_eq!(scope.config_dir().unwrap(), PathBuf::from("/tmp/rdc-test"));
    }

    #[test]
    fn s3_client_unseals_only_with_password() {
        let salt = crypto::random_salt();
        let key = crypto::derive_key("hunter2", &salt);
        let sealed = crypto::seal_str("minio-secret", &key).unwrap();
        let settings = S3Settings {
            endpoint: "http://127.0.0.1:9000".to_string(),
            region: "us-east-1".to_string(),
            bucket: "rdc-state".to_string(),
            access_key: "minio".to_string(),
            secret_key: rdc_core::domain::Secret::Sealed(sealed),
            prefix: None,
            encrypted: true,
            kdf_salt: Some(salt.to_vec()),
        };

        assert!(s3_client(&settings, None).is_err());
        assert!(s3_client(&settings, Some("hunter2")).is_ok());
    }
}
