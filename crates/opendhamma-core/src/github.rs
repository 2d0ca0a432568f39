//! GitHub content fetcher.
//!
//! Thin client over the GitHub contents API. A `(repo, path)` lookup yields
//! exactly one of: a decoded file, a directory listing, or `None` — never
//! both. "Not found" is modeled as `Ok(None)` so callers can fall through
//! (file, then directory) without error plumbing; every other failure status
//! surfaces as `FetchError::Status` with the numeric code attached.
//!
//! There is deliberately no caching, retry, or timeout layer here: one
//! invocation is one remote call, and latency policy belongs to the
//! surrounding request handling.

use crate::frontmatter::split_frontmatter;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;

/// Base URL of the GitHub REST API.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Environment variable carrying the bearer token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

const APP_USER_AGENT: &str = "opendhamma/0.1";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid repository string {0:?}: expected \"owner/repo\"")]
    InvalidRepo(String),
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GitHub returned {status} for {path}: {message}")]
    Status {
        status: u16,
        path: String,
        message: String,
    },
    #[error("could not decode content at {path}: {reason}")]
    Decode { path: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteEntryKind {
    File,
    Dir,
}

/// A fetched file, frontmatter already split off.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteFile {
    /// Document body without the leading metadata block.
    pub content: String,
    /// Frontmatter key/value pairs; empty when the file had none.
    pub metadata: BTreeMap<String, Value>,
    /// Blob hash of the exact bytes fetched.
    pub sha: String,
    /// Path relative to the repository root, as reported by the API.
    pub path: String,
    pub name: String,
    /// Human-viewable URL.
    pub html_url: String,
    pub size: u64,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteDirectoryEntry {
    pub kind: RemoteEntryKind,
    pub name: String,
    pub path: String,
    pub sha: String,
    pub size: u64,
    pub html_url: String,
    /// Raw download URL; present for files only.
    pub download_url: Option<String>,
}

/// Split an `owner/repo` string into its parts.
pub fn parse_repo(repo: &str) -> Result<(&str, &str), FetchError> {
    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(FetchError::InvalidRepo(repo.to_string())),
    }
}

/// Join path segments with single slashes, dropping empty segments.
///
/// Idempotent under redundant slashes: `join_paths(&["a/", "/b"])` and
/// `join_paths(&["a", "b"])` both yield `"a/b"`.
pub fn join_paths(segments: &[&str]) -> String {
    let mut parts = Vec::new();
    for segment in segments {
        for piece in segment.split('/') {
            if !piece.is_empty() {
                parts.push(piece);
            }
        }
    }
    parts.join("/")
}

/// Sort a listing in place: directories first, then name ascending,
/// case-sensitive. The fetcher itself preserves remote order; callers that
/// want sorted output opt in here.
pub fn sort_listing(entries: &mut [RemoteDirectoryEntry]) {
    entries.sort_by(|a, b| match (a.kind, b.kind) {
        (RemoteEntryKind::Dir, RemoteEntryKind::File) => Ordering::Less,
        (RemoteEntryKind::File, RemoteEntryKind::Dir) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    });
}

/// Client for the GitHub contents API.
///
/// Constructed once at the composition point and shared; holds the reqwest
/// connection pool and the optional bearer token.
pub struct GitHubClient {
    http: Client,
    token: Option<String>,
    api_base: String,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            token,
            api_base: GITHUB_API_BASE.to_string(),
        }
    }

    /// Client authenticated from `GITHUB_TOKEN` (anonymous when unset).
    pub fn from_env() -> Self {
        let token = std::env::var(GITHUB_TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty());
        Self::new(token)
    }

    /// Point the client at a different API base (test servers).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Fetch a single file.
    ///
    /// `base_path` is the vault's path prefix; the effective lookup path is
    /// the slash-normalized join of prefix and `path`. Returns `Ok(None)`
    /// when the path does not exist or names a directory.
    pub async fn get_file(
        &self,
        repo: &str,
        path: &str,
        base_path: Option<&str>,
        reference: Option<&str>,
    ) -> Result<Option<RemoteFile>, FetchError> {
        let full_path = join_paths(&[base_path.unwrap_or(""), path]);
        match self.get_contents(repo, &full_path, reference).await? {
            Some(payload) => file_from_payload(&full_path, &payload),
            None => Ok(None),
        }
    }

    /// Fetch a directory listing, in the order the remote reports it.
    ///
    /// Returns `Ok(None)` when the path does not exist or names a single
    /// file.
    pub async fn get_directory(
        &self,
        repo: &str,
        path: &str,
        base_path: Option<&str>,
        reference: Option<&str>,
    ) -> Result<Option<Vec<RemoteDirectoryEntry>>, FetchError> {
        let full_path = join_paths(&[base_path.unwrap_or(""), path]);
        match self.get_contents(repo, &full_path, reference).await? {
            Some(payload) => Ok(listing_from_payload(&payload)),
            None => Ok(None),
        }
    }

    /// One call against `GET /repos/{owner}/{repo}/contents/{path}`.
    ///
    /// 404 maps to `Ok(None)`; any other non-success status is an error
    /// carrying the code and response body.
    async fn get_contents(
        &self,
        repo: &str,
        full_path: &str,
        reference: Option<&str>,
    ) -> Result<Option<Value>, FetchError> {
        let (owner, name) = parse_repo(repo)?;
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, owner, name, full_path
        );
        debug!("fetching {url} (ref: {})", reference.unwrap_or("default"));

        let mut request = self
            .http
            .get(&url)
            .header(USER_AGENT, APP_USER_AGENT)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(reference) = reference {
            request = request.query(&[("ref", reference)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(FetchError::Status {
                status: status.as_u16(),
                path: full_path.to_string(),
                message,
            });
        }

        Ok(Some(response.json().await?))
    }
}

/// Map a contents payload to a `RemoteFile`.
///
/// Directory payloads (arrays) and non-file objects (symlinks, submodules)
/// map to `None`, signalling the caller to try a directory listing instead.
fn file_from_payload(full_path: &str, payload: &Value) -> Result<Option<RemoteFile>, FetchError> {
    if payload.is_array() || payload["type"] != "file" {
        return Ok(None);
    }
    let Some(encoded) = payload["content"].as_str() else {
        return Ok(None);
    };

    // GitHub wraps base64 blobs at 60 columns; strip all whitespace first.
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| FetchError::Decode {
            path: full_path.to_string(),
            reason: e.to_string(),
        })?;
    let text = String::from_utf8(bytes).map_err(|_| FetchError::Decode {
        path: full_path.to_string(),
        reason: "content is not valid UTF-8".to_string(),
    })?;

    let (metadata, content) = split_frontmatter(&text);
    Ok(Some(RemoteFile {
        content,
        metadata,
        sha: payload["sha"].as_str().unwrap_or_default().to_string(),
        path: payload["path"].as_str().unwrap_or(full_path).to_string(),
        name: payload["name"].as_str().unwrap_or_default().to_string(),
        html_url: payload["html_url"].as_str().unwrap_or_default().to_string(),
        size: payload["size"].as_u64().unwrap_or(0),
    }))
}

/// Map a contents payload to a directory listing; `None` for single files.
fn listing_from_payload(payload: &Value) -> Option<Vec<RemoteDirectoryEntry>> {
    let items = payload.as_array()?;
    Some(
        items
            .iter()
            .map(|item| RemoteDirectoryEntry {
                kind: if item["type"] == "dir" {
                    RemoteEntryKind::Dir
                } else {
                    RemoteEntryKind::File
                },
                name: item["name"].as_str().unwrap_or_default().to_string(),
                path: item["path"].as_str().unwrap_or_default().to_string(),
                sha: item["sha"].as_str().unwrap_or_default().to_string(),
                size: item["size"].as_u64().unwrap_or(0),
                html_url: item["html_url"].as_str().unwrap_or_default().to_string(),
                download_url: item["download_url"].as_str().map(str::to_string),
            })
            .collect(),
    )
}

/// Minimal one-shot contents-API stand-in for tests: answers each request
/// on a fresh connection with whatever `routes` returns for the request
/// path, then closes. Point a client at the returned base URL via
/// `with_api_base`.
#[cfg(test)]
pub(crate) fn spawn_contents_server(
    routes: impl Fn(&str) -> (u16, String) + Send + 'static,
) -> String {
    use std::io::{Read, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("test listener address");
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut buf = [0u8; 4096];
            let mut read = 0;
            while read < buf.len() {
                match stream.read(&mut buf[read..]) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        read += n;
                        if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                }
            }
            let request = String::from_utf8_lossy(&buf[..read]);
            let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
            let (status, body) = routes(&path);
            let reason = match status {
                200 => "OK",
                403 => "Forbidden",
                404 => "Not Found",
                _ => "Error",
            };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}")
}
