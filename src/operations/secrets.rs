// Secret Lookup
// Named credentials fetched by exact, case-sensitive name

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::constants::SECRET_PREVIEW_CHARS;

/// A source of named secrets
pub trait SecretStore {
    /// Look up a secret; empty values count as absent
    fn get(&self, name: &str) -> Option<String>;

    /// Human-readable name for status output
    fn describe(&self) -> String;
}

/// Secrets from the process environment
pub struct EnvSecretStore;

impl SecretStore for EnvSecretStore {
    fn get(&self, name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.is_empty())
    }

    fn describe(&self) -> String {
        "environment".to_string()
    }
}

/// Secrets from a flat YAML map of name -> value
pub struct FileSecretStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileSecretStore {
    /// Load a secrets file; a missing file is an empty store
    pub fn load(path: &Path) -> Result<Self> {
        let values = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read secrets file: {}", path.display()))?;
            serde_yaml::from_str::<Option<HashMap<String, String>>>(&content)
                .with_context(|| format!("Failed to parse secrets file: {}", path.display()))?
                .unwrap_or_default()
        } else {
            HashMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).filter(|v| !v.is_empty()).cloned()
    }

    fn describe(&self) -> String {
        format!("secrets file {}", self.path.display())
    }
}

/// Tries each store in order; first hit wins
pub struct ChainedSecretStore {
    stores: Vec<Box<dyn SecretStore>>,
}

impl ChainedSecretStore {
    pub fn new(stores: Vec<Box<dyn SecretStore>>) -> Self {
        Self { stores }
    }

    /// The secrets file first, then the environment
    pub fn standard(secrets_file: &Path) -> Self {
        let mut stores: Vec<Box<dyn SecretStore>> = Vec::new();
        match FileSecretStore::load(secrets_file) {
            Ok(store) => stores.push(Box::new(store)),
            Err(e) => warn!(error = %e, "ignoring unreadable secrets file"),
        }
        stores.push(Box::new(EnvSecretStore));
        Self::new(stores)
    }
}

impl SecretStore for ChainedSecretStore {
    fn get(&self, name: &str) -> Option<String> {
        self.stores.iter().find_map(|store| {
            let value = store.get(name);
            if value.is_some() {
                debug!(name, source = %store.describe(), "secret found");
            }
            value
        })
    }

    fn describe(&self) -> String {
        self.stores
            .iter()
            .map(|s| s.describe())
            .collect::<Vec<_>>()
            .join(", then ")
    }
}

/// Show only the first few characters of a secret
pub fn mask(value: &str) -> String {
    let preview: String = value.chars().take(SECRET_PREVIEW_CHARS).collect();
    if value.chars().count() <= SECRET_PREVIEW_CHARS {
        "*".repeat(value.chars().count().max(1))
    } else {
        format!("{}…", preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MapStore(HashMap<String, String>);

    impl SecretStore for MapStore {
        fn get(&self, name: &str) -> Option<String> {
            self.0.get(name).cloned()
        }

        fn describe(&self) -> String {
            "map".to_string()
        }
    }

    #[test]
    fn test_file_store_is_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.yaml");
        fs::write(&path, "GEMINI_API_KEY: abc123\nEMPTY: \"\"\n").unwrap();

        let store = FileSecretStore::load(&path).unwrap();
        assert_eq!(store.get("GEMINI_API_KEY").as_deref(), Some("abc123"));
        assert!(store.get("gemini_api_key").is_none());
        assert!(store.get("EMPTY").is_none());
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSecretStore::load(&dir.path().join("absent.yaml")).unwrap();
        assert!(store.get("ANY").is_none());
    }

    #[test]
    fn test_chain_prefers_first_store() {
        let first = MapStore(HashMap::from([("KEY".to_string(), "one".to_string())]));
        let second = MapStore(HashMap::from([
            ("KEY".to_string(), "two".to_string()),
            ("OTHER".to_string(), "x".to_string()),
        ]));
        let chain = ChainedSecretStore::new(vec![Box::new(first), Box::new(second)]);

        assert_eq!(chain.get("KEY").as_deref(), Some("one"));
        assert_eq!(chain.get("OTHER").as_deref(), Some("x"));
        assert!(chain.get("NONE").is_none());
        assert_eq!(chain.describe(), "map, then map");
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("sk-abcdef"), "sk-a…");
        assert_eq!(mask("ab"), "**");
    }
}
