use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs,
    path::PathBuf,
    sync::Mutex,
};

/// Storage for the single OpenWeather API key.
///
/// The credential is an opaque string held under one fixed slot: created
/// by user action, read on every refresh, deleted by user action. It is
/// injected into the app context so nothing reaches for ambient global
/// storage.
pub trait CredentialStore: Send + Sync + Debug {
    /// Returns the stored key, or `None` if no (non-empty) key is stored.
    fn get(&self) -> Result<Option<String>>;

    /// Stores the key, replacing any previous value.
    fn set(&self, api_key: &str) -> Result<()>;

    /// Removes the stored key. Removing an absent key is not an error.
    fn delete(&self) -> Result<()>;
}

/// On-disk shape of the credential file.
///
/// Example TOML:
/// api_key = "..."
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialFile {
    api_key: String,
}

/// Credential store backed by a TOML file under the platform config
/// directory.
#[derive(Debug)]
pub struct TomlCredentialStore {
    path: PathBuf,
}

impl TomlCredentialStore {
    /// Store at the default platform location.
    pub fn new() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "daily-lures", "lures")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(Self {
            path: dirs.config_dir().join("credentials.toml"),
        })
    }

    /// Store at an explicit path.
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl CredentialStore for TomlCredentialStore {
    fn get(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read credential file: {}", self.path.display()))?;

        let file: CredentialFile = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse credential file: {}", self.path.display()))?;

        if file.api_key.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(file.api_key))
    }

    fn set(&self, api_key: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let file = CredentialFile {
            api_key: api_key.to_string(),
        };
        let toml = toml::to_string_pretty(&file).context("Failed to serialize credential")?;

        fs::write(&self.path, toml)
            .with_context(|| format!("Failed to write credential file: {}", self.path.display()))?;

        Ok(())
    }

    fn delete(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).with_context(|| {
                format!("Failed to remove credential file: {}", self.path.display())
            })?;
        }
        Ok(())
    }
}

/// In-memory credential store for tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    key: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn with_key(api_key: &str) -> Self {
        Self {
            key: Mutex::new(Some(api_key.to_string())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<String>> {
        let key = self.key.lock().map_err(|_| anyhow!("credential lock poisoned"))?;
        Ok(key.clone().filter(|k| !k.trim().is_empty()))
    }

    fn set(&self, api_key: &str) -> Result<()> {
        let mut key = self.key.lock().map_err(|_| anyhow!("credential lock poisoned"))?;
        *key = Some(api_key.to_string());
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        let mut key = self.key.lock().map_err(|_| anyhow!("credential lock poisoned"))?;
        *key = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn toml_store_roundtrips_set_get_delete() {
        let dir = TempDir::new().expect("temp dir");
        let store = TomlCredentialStore::at_path(dir.path().join("sub").join("credentials.toml"));

        assert_eq!(store.get().expect("get on empty store"), None);

        store.set("SECRET").expect("set");
        assert_eq!(store.get().expect("get after set"), Some("SECRET".to_string()));

        store.delete().expect("delete");
        assert_eq!(store.get().expect("get after delete"), None);

        // Deleting again is a no-op.
        store.delete().expect("delete absent key");
    }

    #[test]
    fn empty_key_reads_as_absent() {
        let dir = TempDir::new().expect("temp dir");
        let store = TomlCredentialStore::at_path(dir.path().join("credentials.toml"));

        store.set("   ").expect("set blank");
        assert_eq!(store.get().expect("get"), None);
    }

    #[test]
    fn memory_store_roundtrips() {
        let store = MemoryCredentialStore::default();
        assert_eq!(store.get().expect("get"), None);

        store.set("KEY").expect("set");
        assert_eq!(store.get().expect("get"), Some("KEY".to_string()));

        store.delete().expect("delete");
        assert_eq!(store.get().expect("get"), None);
    }
}
