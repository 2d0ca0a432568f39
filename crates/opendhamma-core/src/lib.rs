//! opendhamma-core: vault registry and content resolution for the
//! Opendhamma knowledge-base browser.
//!
//! A *vault* is a GitHub repository (plus optional path prefix) registered
//! in a YAML file and treated as one logical collection of Markdown
//! documents. This crate maps logical `(vault, path)` addresses to remote
//! content and rewrites the embedded wiki-link syntax into navigable routes:
//!
//! - [`vaults`] — registry loading, validation, and lookup
//! - [`github`] — file/directory fetching over the GitHub contents API
//! - [`frontmatter`] — structured-metadata block splitting
//! - [`links`] — `[[wiki-link]]` extraction and route rewriting
//! - [`sutta`] — canonical sutta resolution against the default vault
//!
//! The presentation layer (CLI, web) composes these: resolve the vault,
//! fetch the content, rewrite its links, render.

pub mod frontmatter;
pub mod github;
pub mod links;
pub mod sutta;
pub mod vaults;

pub use frontmatter::split_frontmatter;
pub use github::{
    FetchError, GitHubClient, RemoteDirectoryEntry, RemoteEntryKind, RemoteFile, join_paths,
    parse_repo, sort_listing,
};
pub use links::{WikiLink, extract_wiki_links, rewrite_wiki_links};
pub use sutta::{PREFERRED_TRANSLATIONS, SuttaDocument, resolve_sutta, sutta_base_path};
pub use vaults::{RegistryError, VaultConfig, VaultRegistry};
