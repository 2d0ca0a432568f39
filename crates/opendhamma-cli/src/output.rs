//! Plain-text rendering of vaults, listings, and documents.
//!
//! Pure string builders so the command layer stays thin and the formatting
//! is testable without capturing stdout.

use opendhamma_core::{RemoteDirectoryEntry, RemoteEntryKind, RemoteFile, VaultConfig};
use serde_json::Value;
use std::collections::BTreeMap;

/// One registry entry, multi-line, in listing order.
pub fn format_vault(vault: &VaultConfig) -> String {
    let mut out = String::new();
    out.push_str(&vault.name);
    out.push_str(&format!(" ({})", vault.id));
    if vault.is_default {
        out.push_str(" [default]");
    }
    out.push_str(if vault.readonly {
        " [read-only]"
    } else {
        " [writable]"
    });
    out.push('\n');
    out.push_str(&format!("    repo: {}", vault.repo));
    if let Some(base_path) = &vault.base_path {
        out.push_str(&format!(" (base: {base_path})"));
    }
    out.push('\n');
    if !vault.topics.is_empty() {
        out.push_str(&format!("    topics: {}\n", vault.topics.join(", ")));
    }
    if !vault.languages.is_empty() {
        out.push_str(&format!("    languages: {}\n", vault.languages.join(", ")));
    }
    out
}

/// A directory listing, already-sorted entries rendered one per line with a
/// `d`/`f` kind marker, preceded by a parent-directory hint when not at the
/// vault root.
pub fn format_listing(entries: &[RemoteDirectoryEntry], current_path: &str) -> String {
    let mut out = String::new();
    if !current_path.is_empty() {
        let parent = current_path
            .rsplit_once('/')
            .map(|(parent, _)| parent)
            .unwrap_or("");
        out.push_str(&format!("..  (up to /{parent})\n"));
    }
    for entry in entries {
        let marker = match entry.kind {
            RemoteEntryKind::Dir => 'd',
            RemoteEntryKind::File => 'f',
        };
        out.push_str(&format!("{marker}  {}\n", entry.name));
    }
    out
}

/// The frontmatter panel: pretty-printed key/value block, or `None` when
/// the document had no metadata.
pub fn format_frontmatter(metadata: &BTreeMap<String, Value>) -> Option<String> {
    if metadata.is_empty() {
        return None;
    }
    let object: serde_json::Map<String, Value> =
        metadata.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    let rendered = serde_json::to_string_pretty(&Value::Object(object))
        .unwrap_or_else(|_| "{}".to_string());
    Some(format!("--- frontmatter ---\n{rendered}\n-------------------\n"))
}

/// Header line for a fetched file: name, size, and the GitHub view URL.
pub fn format_file_header(file: &RemoteFile) -> String {
    let mut out = format!("# {} ({} bytes)", file.name, file.size);
    if !file.html_url.is_empty() {
        out.push_str(&format!("\n# {}", file.html_url));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vault() -> VaultConfig {
        VaultConfig {
            id: "tipitaka".into(),
            name: "Tipitaka".into(),
            repo: "opendhamma/tipitaka".into(),
            base_path: Some("content".into()),
            is_default: true,
            topics: vec!["sutta".into()],
            languages: vec!["pli".into(), "en".into()],
            readonly: true,
        }
    }

    #[test]
    fn vault_rendering() {
        let out = format_vault(&vault());
        assert!(out.starts_with("Tipitaka (tipitaka) [default] [read-only]\n"));
        assert!(out.contains("repo: opendhamma/tipitaka (base: content)"));
        assert!(out.contains("topics: sutta"));
        assert!(out.contains("languages: pli, en"));
    }

    #[test]
    fn listing_includes_parent_hint() {
        let entries = vec![RemoteDirectoryEntry {
            kind: RemoteEntryKind::Dir,
            name: "mn".into(),
            path: "sutta/mn".into(),
            sha: String::new(),
            size: 0,
            html_url: String::new(),
            download_url: None,
        }];
        let out = format_listing(&entries, "sutta/mn");
        assert!(out.starts_with("..  (up to /sutta)\n"));
        assert!(out.contains("d  mn\n"));

        let root = format_listing(&entries, "");
        assert!(!root.contains(".."));
    }

    #[test]
    fn frontmatter_panel() {
        let mut metadata = BTreeMap::new();
        metadata.insert("title".to_string(), json!("MN 10"));
        let out = format_frontmatter(&metadata).unwrap();
        assert!(out.contains("\"title\": \"MN 10\""));
        assert!(format_frontmatter(&BTreeMap::new()).is_none());
    }
}
