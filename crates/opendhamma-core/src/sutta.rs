//! Canonical sutta resolution against the default vault.
//!
//! A sutta is addressed as `/tipitaka/{nikaya}/{sutta}` and lives in the
//! default vault under `tipitaka/sutta/{nikaya}/{sutta}/`, which holds one
//! file per translation. Resolution lists that directory, then tries the
//! preferred translations in order before falling back to whatever other
//! Markdown files are available. Suttas stored in the older single-file
//! layout (`{sutta}.md` beside the directories) resolve through a direct
//! file fetch when no directory exists.

use crate::github::{
    FetchError, GitHubClient, RemoteDirectoryEntry, RemoteEntryKind, RemoteFile, join_paths,
};
use crate::vaults::VaultConfig;

/// Translation files tried first, in order of preference.
pub const PREFERRED_TRANSLATIONS: [&str; 3] = ["en/curated.md", "en/ai.md", "pali.md"];

/// Vault-relative directory of a sutta's translation files.
pub fn sutta_base_path(nikaya: &str, sutta: &str) -> String {
    format!(
        "tipitaka/sutta/{}/{}",
        nikaya.to_lowercase(),
        sutta.to_lowercase()
    )
}

/// A resolved sutta document.
#[derive(Debug, Clone)]
pub struct SuttaDocument {
    pub file: RemoteFile,
    /// Repository-relative path that actually loaded.
    pub loaded_path: String,
    /// Full directory listing, for offering alternative translations.
    pub available: Vec<RemoteDirectoryEntry>,
}

/// Candidate file paths for a sutta directory: the preferred translations
/// first, then every other Markdown file the listing reports.
pub fn candidate_paths(base: &str, available: &[RemoteDirectoryEntry]) -> Vec<String> {
    let mut paths: Vec<String> = PREFERRED_TRANSLATIONS
        .iter()
        .map(|name| format!("{base}/{name}"))
        .collect();
    for entry in available {
        if entry.kind == RemoteEntryKind::File
            && entry.name.ends_with(".md")
            && !PREFERRED_TRANSLATIONS
                .iter()
                .any(|preferred| entry.path.ends_with(preferred))
        {
            paths.push(entry.path.clone());
        }
    }
    paths
}

/// Resolve a sutta to its best available translation file.
///
/// When no translation directory exists (or it is empty), falls back to the
/// single-file layout `{base}.md`. Returns `Ok(None)` only when that direct
/// file is also absent or none of the directory candidates load.
pub async fn resolve_sutta(
    client: &GitHubClient,
    vault: &VaultConfig,
    nikaya: &str,
    sutta: &str,
) -> Result<Option<SuttaDocument>, FetchError> {
    // Listing entries come back repository-root-relative, so resolve the
    // vault prefix once and fetch without re-joining it.
    let base = join_paths(&[
        vault.base_path.as_deref().unwrap_or(""),
        &sutta_base_path(nikaya, sutta),
    ]);

    let listing = client.get_directory(&vault.repo, &base, None, None).await?;
    let available = match listing {
        Some(entries) if !entries.is_empty() => entries,
        _ => {
            let direct = format!("{base}.md");
            let file = client.get_file(&vault.repo, &direct, None, None).await?;
            return Ok(file.map(|file| SuttaDocument {
                file,
                loaded_path: direct,
                available: Vec::new(),
            }));
        }
    };

    for path in candidate_paths(&base, &available) {
        if let Some(file) = client.get_file(&vault.repo, &path, None, None).await? {
            return Ok(Some(SuttaDocument {
                file,
                loaded_path: path,
                available,
            }));
        }
    }

    Ok(None)
}
