// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! Local context store.
//!
//! Loads and saves `contexts.json` under the config directory
//! (`~/.rdc` by default). Writes go through a temp file and rename so a
//! crash mid-write never truncates the store. No locking: the document
//! is last-write-wins by design.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::context::{
    Context, ContextFile, ContextMode, MachineEntry, RepositoryEntry, StorageEntry,
    CONTEXT_FILE_VERSION,
};
use crate::error::Error;
use crate::Result;

const FILE_NAME: &str = "contexts.json";

pub struct ContextStore {
    path: PathBuf,
    file: ContextFile,
}

impl ContextStore {
    /// Default config directory: `~/.rdc`.
    pub fn default_dir() -> Result<PathBuf> {
        dirs_next::home_dir()
            .map(|h| h.join(".rdc"))
            .ok_or_else(|| Error::validation("cannot determine home directory; pass --config-dir"))
    }

    /// Open the store in `dir`, starting empty when the file is missing.
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(FILE_NAME);
        let file = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let file: ContextFile = serde_json::from_str(&raw)?;
            if file.version > CONTEXT_FILE_VERSION {
                return Err(Error::UnsupportedVersion {
                    found: file.version,
                    supported: CONTEXT_FILE_VERSION,
                });
            }
            file
        } else {
            debug!(path = %path.display(), "context file missing, starting empty");
            ContextFile::default()
        };
        Ok(Self { path, file })
    }

    /// Persist the store atomically (temp file + rename).
    pub fn save(&self) -> Result<()> {
        if let Some(current) = &self.file.current {
            if !self.file.contexts.contains_key(current) {
                return Err(Error::validation(format!(
                    "current context '{}' does not exist",
                    current
                )));
            }
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(&self.file)?;
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "context file saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a new context. Fails on a duplicate name or invalid settings.
    pub fn create(&mut self, name: &str, context: Context) -> Result<()> {
        validate_name(name)?;
        context.validate()?;
        if self.file.contexts.contains_key(name) {
            return Err(Error::ContextExists(name.to_string()));
        }
        self.file.contexts.insert(name.to_string(), context);
        // First context becomes the selection.
        if self.file.current.is_none() {
            self.file.current = Some(name.to_string());
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Context> {
        self.file
            .contexts
            .get(name)
            .ok_or_else(|| Error::ContextNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Context> {
        self.file
            .contexts
            .get_mut(name)
            .ok_or_else(|| Error::ContextNotFound(name.to_string()))
    }

    /// Select `name` as the current context.
    pub fn select(&mut self, name: &str) -> Result<()> {
        if !self.file.contexts.contains_key(name) {
            return Err(Error::ContextNotFound(name.to_string()));
        }
        self.file.current = Some(name.to_string());
        Ok(())
    }

    /// Remove a context, clearing the selection if it pointed there.
    pub fn delete(&mut self, name: &str) -> Result<Context> {
        let removed = self
            .file
            .contexts
            .remove(name)
            .ok_or_else(|| Error::ContextNotFound(name.to_string()))?;
        if self.file.current.as_deref() == Some(name) {
            self.file.current = None;
        }
        Ok(removed)
    }

    pub fn list(&self) -> impl Iterator<Item = (&String, &Context)> {
        self.file.contexts.iter()
    }

    pub fn current_name(&self) -> Option<&str> {
        self.file.current.as_deref()
    }

    pub fn current(&self) -> Option<(&str, &Context)> {
        let name = self.file.current.as_deref()?;
        self.file.contexts.get(name).map(|c| (name, c))
    }

    /// Insert or replace a machine entry on a local-mode context.
    pub fn upsert_machine(&mut self, context: &str, name: &str, entry: MachineEntry) -> Result<()> {
        validate_name(name)?;
        self.local_mut(context)?.machines.insert(name.to_string(), entry);
        Ok(())
    }

    /// Insert or replace a storage entry on a local-mode context.
    pub fn upsert_storage(&mut self, context: &str, name: &str, entry: StorageEntry) -> Result<()> {
        validate_name(name)?;
        self.local_mut(context)?.storages.insert(name.to_string(), entry);
        Ok(())
    }

    /// Insert or replace a repository entry on a local-mode context.
    pub fn upsert_repository(
        &mut self,
        context: &str,
        name: &str,
        entry: RepositoryEntry,
    ) -> Result<()> {
        validate_name(name)?;
        self.local_mut(context)?.repositories.insert(name.to_string(), entry);
        Ok(())
    }

    /// Inventory lives in the context file only in `local` mode; cloud
    /// contexts have no inventory and s3 contexts keep it in the vault.
    fn local_mut(&mut self, name: &str) -> Result<&mut Context> {
        let ctx = self.get_mut(name)?;
        if ctx.mode != ContextMode::Local {
            return Err(Error::validation(format!(
                "context '{}' is {} mode; inventory edits need a local context",
                name, ctx.mode
            )));
        }
        Ok(ctx)
    }

    /// Resolve a context by explicit name, falling back to the selection.
    pub fn resolve(&self, name: Option<&str>) -> Result<(&str, &Context)> {
        match name {
            Some(n) => Ok((
                self.file
                    .contexts
                    .get_key_value(n)
                    .ok_or_else(|| Error::ContextNotFound(n.to_string()))?
                    .0,
                self.get(n)?,
            )),
            None => self.current().ok_or_else(|| {
                Error::validation("no context selected; pass --context or run 'rdc context use'")
            }),
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation("context name cannot be empty"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::validation(format!(
            "invalid context name '{}': use letters, digits, '-' and '_'",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::{CloudApiSettings, ContextMode, Secret};

    fn cloud_ctx() -> Context {
        Context::cloud(CloudApiSettings {
            url: "https://api.rackdeck.io".to_string(),
            token: Secret::Plain("tok".to_string()),
            team: None,
        })
    }

    #[test]
    fn create_save_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ContextStore::open(dir.path()).unwrap();
        store.create("prod", cloud_ctx()).unwrap();
        store.save().unwrap();

        let store = ContextStore::open(dir.path()).unwrap();
        assert_eq!(store.current_name(), Some("prod"));
        assert_eq!(store.get("prod").unwrap().mode, ContextMode::Cloud);
    }

    fn machine_entry(host: &str) -> MachineEntry {
        MachineEntry {
            host: host.to_string(),
            port: 22,
            user: "root".to_string(),
            description: None,
        }
    }

    #[test]
    fn upsert_inserts_and_replaces_on_local_context() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ContextStore::open(dir.path()).unwrap();
        store.create("lab", Context::local(None)).unwrap();

        store.upsert_machine("lab", "web1", machine_entry("10.0.0.1")).unwrap();
        store.upsert_machine("lab", "web1", machine_entry("10.0.0.2")).unwrap();
        store
            .upsert_storage(
                "lab",
                "scratch",
                StorageEntry {
                    path: "/srv/scratch".to_string(),
                    machine: Some("web1".to_string()),
                    description: None,
                },
            )
            .unwrap();
        store
            .upsert_repository(
                "lab",
                "models",
                RepositoryEntry {
                    machines: vec!["web1".to_string()],
                    url: None,
                },
            )
            .unwrap();
        store.save().unwrap();

        let store = ContextStore::open(dir.path()).unwrap();
        let ctx = store.get("lab").unwrap();
        assert_eq!(ctx.machines["web1"].host, "10.0.0.2");
        assert_eq!(ctx.storages["scratch"].path, "/srv/scratch");
        assert_eq!(ctx.repositories["models"].machines, vec!["web1"]);
    }

    #[test]
    fn upsert_rejects_non_local_contexts() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ContextStore::open(dir.path()).unwrap();
        store.create("prod", cloud_ctx()).unwrap();
        assert!(matches!(
            store.upsert_machine("prod", "web1", machine_entry("10.0.0.1")),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn upsert_rejects_invalid_entry_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ContextStore::open(dir.path()).unwrap();
        store.create("lab", Context::local(None)).unwrap();
        assert!(store.upsert_machine("lab", "web 1", machine_entry("10.0.0.1")).is_err());
        assert!(store.upsert_machine("lab", "", machine_entry("10.0.0.1")).is_err());
    }

    #[test]
    fn duplicate_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ContextStore::open(dir.path()).unwrap();
        store.create("prod", cloud_ctx()).unwrap();
        assert!(matches!(
            store.create("prod", cloud_ctx()),
            Err(Error::ContextExists(_))
        ));
    }

    #[test]
    fn invalid_names_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ContextStore::open(dir.path()).unwrap();
        assert!(store.create("", cloud_ctx()).is_err());
        assert!(store.create("pr od", cloud_ctx()).is_err());
        assert!(store.create("prod/1", cloud_ctx()).is_err());
        assert!(store.create("prod-1_a", cloud_ctx()).is_ok());
    }

    #[test]
    fn delete_clears_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ContextStore::open(dir.path()).unwrap();
        store.create("a", cloud_ctx()).unwrap();
        store.create("b", cloud_ctx()).unwrap();
        store.select("b").unwrap();
        store.delete("b").unwrap();
        assert_eq!(store.current_name(), None);
        assert!(store.get("a").is_ok());
    }

    #[test]
    fn resolve_prefers_explicit_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ContextStore::open(dir.path()).unwrap();
        store.create("a", cloud_ctx()).unwrap();
        store.create("b", cloud_ctx()).unwrap();
        store.select("a").unwrap();

        assert_eq!(store.resolve(Some("b")).unwrap().0, "b");
        assert_eq!(store.resolve(None).unwrap().0, "a");
        assert!(store.resolve(Some("missing")).is_err());
    }

    #[test]
    fn resolve_without_selection_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContextStore::open(dir.path()).unwrap();
        assert!(matches!(store.resolve(None), Err(Error::Validation(_))));
    }

    #[test]
    fn newer_file_version_refused() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("contexts.json"),
            r#"{"version": 99, "contexts": {}}"#,
        )
        .unwrap();
        assert!(matches!(
            ContextStore::open(dir.path()),
            Err(Error::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ContextStore::open(dir.path()).unwrap();
        store.create("a", cloud_ctx()).unwrap();
        store.save().unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["contexts.json".to_string()]);
    }
}
