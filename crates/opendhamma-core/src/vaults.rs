//! Vault registry: the declarative list of browsable repositories.
//!
//! Vaults are declared in a YAML file (one mapping per vault) and loaded once
//! per process. The registry is an explicitly constructed object owned by the
//! application's composition point — there is no module-level singleton. The
//! first `load()` reads and validates the file and caches the outcome; later
//! calls return the cached list (or re-raise the cached error) without
//! touching the filesystem again. `clear_cache()` exists for test isolation.

use log::warn;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex};
use thiserror::Error;

/// Default registry location, relative to the working directory.
pub const DEFAULT_REGISTRY_PATH: &str = "data/vaults.yaml";

/// Environment variable overriding the registry location.
pub const REGISTRY_PATH_ENV: &str = "VAULT_REGISTRY_PATH";

/// Expected shape of the `repo` field.
static REPO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+/[A-Za-z0-9_.-]+$").expect("static repo pattern")
});

/// One validated vault entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VaultConfig {
    /// Unique identifier, used in routes.
    pub id: String,
    /// Display name.
    pub name: String,
    /// GitHub repository in `owner/repo` form.
    pub repo: String,
    /// Optional path prefix inside the repository. Normalized at load time:
    /// no leading/trailing slashes, `None` when empty.
    pub base_path: Option<String>,
    /// Whether this is the default vault (canonical sutta cross-references
    /// resolve against it).
    pub is_default: bool,
    pub topics: Vec<String>,
    pub languages: Vec<String>,
    /// Read-only vaults never accept proposed edits.
    pub readonly: bool,
}

impl VaultConfig {
    /// Human-viewable GitHub URL for a directory in this vault.
    ///
    /// Approximates the branch as `main`, as the upstream web UI does.
    pub fn tree_url(&self, path: &str) -> String {
        if path.is_empty() {
            format!("https://github.com/{}", self.repo)
        } else {
            format!("https://github.com/{}/tree/main/{}", self.repo, path)
        }
    }
}

/// Registry load failures. `Clone` because the failed outcome is cached and
/// re-raised on every subsequent `load()`.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("vault registry not found at {}", .path.display())]
    NotFound { path: PathBuf },
    #[error("could not read vault registry at {}: {message}", .path.display())]
    Unreadable { path: PathBuf, message: String },
    #[error("vault registry is not valid YAML: {0}")]
    Parse(String),
    #[error("vault registry failed validation:\n  {}", .issues.join("\n  "))]
    Validation { issues: Vec<String> },
}

/// Load outcome cached for the process lifetime.
type LoadOutcome = Result<Arc<[VaultConfig]>, RegistryError>;

/// The vault registry.
///
/// Read-mostly after the first load: the cached slice is never mutated in
/// place, so concurrent readers only ever contend on the short-lived lock
/// around the `Option` slot.
pub struct VaultRegistry {
    path: PathBuf,
    cache: Mutex<Option<LoadOutcome>>,
}

impl VaultRegistry {
    /// Registry backed by an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    /// Registry at the conventional location, honoring `VAULT_REGISTRY_PATH`.
    pub fn from_env() -> Self {
        let path = std::env::var(REGISTRY_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_REGISTRY_PATH));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load, validate, and cache the registry.
    ///
    /// Both success and failure are cached: once a load has failed, every
    /// subsequent call re-raises the same error until `clear_cache()`.
    pub fn load(&self) -> LoadOutcome {
        let mut cache = self.cache.lock().expect("vault registry cache poisoned");
        if let Some(outcome) = cache.as_ref() {
            return outcome.clone();
        }
        let outcome = load_registry(&self.path);
        *cache = Some(outcome.clone());
        outcome
    }

    /// The vault marked as default, or `None` if none is marked or the
    /// registry failed to load. Never raises.
    pub fn find_default(&self) -> Option<VaultConfig> {
        self.load().ok()?.iter().find(|v| v.is_default).cloned()
    }

    /// The vault with the given id, or `None` if absent or the registry
    /// failed to load. Never raises.
    pub fn find_by_id(&self, id: &str) -> Option<VaultConfig> {
        self.load().ok()?.iter().find(|v| v.id == id).cloned()
    }

    /// Discard the cached outcome (including a cached error) so the next
    /// `load()` re-reads the file. For tests; there is no file-watch
    /// invalidation in production.
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock().expect("vault registry cache poisoned");
        *cache = None;
    }
}

fn load_registry(path: &Path) -> LoadOutcome {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RegistryError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(RegistryError::Unreadable {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
        }
    };

    let document: serde_yaml::Value =
        serde_yaml::from_str(&text).map_err(|e| RegistryError::Parse(e.to_string()))?;

    let mut vaults = validate_registry(&document)?;

    for vault in &mut vaults {
        if let Some(base_path) = vault.base_path.take() {
            let trimmed = base_path.trim_matches('/');
            if !trimmed.is_empty() {
                vault.base_path = Some(trimmed.to_string());
            }
        }
    }

    let defaults: Vec<&str> = vaults
        .iter()
        .filter(|v| v.is_default)
        .map(|v| v.id.as_str())
        .collect();
    if defaults.len() != 1 {
        // Tolerated, not fatal: a miscounted default degrades canonical
        // cross-references but must not take down every vault route.
        warn!(
            "expected exactly one default vault, found {}: [{}]",
            defaults.len(),
            defaults.join(", ")
        );
    }

    Ok(vaults.into())
}

/// Validate the parsed document against the vault schema.
///
/// Collects every violation (as `vaults[i].field: message`) rather than
/// stopping at the first, so a broken registry can be fixed in one pass.
fn validate_registry(document: &serde_yaml::Value) -> Result<Vec<VaultConfig>, RegistryError> {
    let mut issues = Vec::new();

    let Some(entries) = document.as_sequence() else {
        return Err(RegistryError::Validation {
            issues: vec!["vaults: expected a list of vault entries".to_string()],
        });
    };

    let mut vaults = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        if entry.as_mapping().is_none() {
            issues.push(format!("vaults[{idx}]: expected a mapping"));
            continue;
        }

        let id = required_string(entry, idx, "id", &mut issues);
        let name = required_string(entry, idx, "name", &mut issues);
        let repo = required_string(entry, idx, "repo", &mut issues);
        if let Some(repo) = &repo
            && !REPO_PATTERN.is_match(repo)
        {
            issues.push(format!(
                "vaults[{idx}].repo: invalid format {repo:?}, expected \"owner/repo\""
            ));
        }
        let base_path = optional_string(entry, idx, "basePath", &mut issues);
        let is_default = required_bool(entry, idx, "default", &mut issues);
        let readonly = required_bool(entry, idx, "readonly", &mut issues);
        let topics = optional_string_list(entry, idx, "topics", &mut issues);
        let languages = optional_string_list(entry, idx, "languages", &mut issues);

        if let (Some(id), Some(name), Some(repo), Some(is_default), Some(readonly)) =
            (id, name, repo, is_default, readonly)
        {
            vaults.push(VaultConfig {
                id,
                name,
                repo,
                base_path,
                is_default,
                topics,
                languages,
                readonly,
            });
        }
    }

    if issues.is_empty() {
        Ok(vaults)
    } else {
        Err(RegistryError::Validation { issues })
    }
}

fn required_string(
    entry: &serde_yaml::Value,
    idx: usize,
    key: &str,
    issues: &mut Vec<String>,
) -> Option<String> {
    match entry.get(key) {
        Some(serde_yaml::Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(serde_yaml::Value::String(_)) => {
            issues.push(format!("vaults[{idx}].{key}: must not be empty"));
            None
        }
        Some(_) => {
            issues.push(format!("vaults[{idx}].{key}: expected a string"));
            None
        }
        None => {
            issues.push(format!("vaults[{idx}].{key}: missing required field"));
            None
        }
    }
}

fn required_bool(
    entry: &serde_yaml::Value,
    idx: usize,
    key: &str,
    issues: &mut Vec<String>,
) -> Option<bool> {
    match entry.get(key) {
        Some(serde_yaml::Value::Bool(b)) => Some(*b),
        Some(_) => {
            issues.push(format!("vaults[{idx}].{key}: expected a boolean"));
            None
        }
        None => {
            issues.push(format!("vaults[{idx}].{key}: missing required field"));
            None
        }
    }
}

fn optional_string(
    entry: &serde_yaml::Value,
    idx: usize,
    key: &str,
    issues: &mut Vec<String>,
) -> Option<String> {
    match entry.get(key) {
        Some(serde_yaml::Value::String(s)) => Some(s.clone()),
        Some(serde_yaml::Value::Null) | None => None,
        Some(_) => {
            issues.push(format!("vaults[{idx}].{key}: expected a string"));
            None
        }
    }
}

fn optional_string_list(
    entry: &serde_yaml::Value,
    idx: usize,
    key: &str,
    issues: &mut Vec<String>,
) -> Vec<String> {
    match entry.get(key) {
        Some(serde_yaml::Value::Sequence(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (item_idx, item) in items.iter().enumerate() {
                match item {
                    serde_yaml::Value::String(s) => out.push(s.clone()),
                    _ => issues.push(format!("vaults[{idx}].{key}[{item_idx}]: expected a string")),
                }
            }
            out
        }
        Some(serde_yaml::Value::Null) | None => Vec::new(),
        Some(_) => {
            issues.push(format!("vaults[{idx}].{key}: expected a list of strings"));
            Vec::new()
        }
    }
}
