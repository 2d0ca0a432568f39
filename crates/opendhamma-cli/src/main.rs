// opendhamma: CLI browser for GitHub-hosted Markdown vaults.

mod cli;
mod output;

use cli::{Cli, Command};
use opendhamma_core::{
    GitHubClient, RemoteEntryKind, RemoteFile, VaultConfig, VaultRegistry, extract_wiki_links,
    resolve_sutta, rewrite_wiki_links, sort_listing,
};
use std::io;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> io::Result<()> {
    let registry = match cli.registry {
        Some(path) => VaultRegistry::new(path),
        None => VaultRegistry::from_env(),
    };
    let client = GitHubClient::from_env();

    match cli.command {
        Command::Vaults => cmd_vaults(&registry),
        Command::Show {
            vault_id,
            path,
            reference,
        } => cmd_show(&registry, &client, &vault_id, &path, reference.as_deref()).await,
        Command::Sutta { nikaya, sutta } => cmd_sutta(&registry, &client, &nikaya, &sutta).await,
        Command::Links { vault_id, path } => cmd_links(&registry, &client, &vault_id, &path).await,
    }
}

/// Look up a vault, surfacing registry load errors before the lookup so a
/// broken registry is not reported as a missing vault.
fn require_vault(registry: &VaultRegistry, vault_id: &str) -> io::Result<VaultConfig> {
    registry.load().map_err(io::Error::other)?;
    registry
        .find_by_id(vault_id)
        .ok_or_else(|| io::Error::other(format!("vault not found in registry: {vault_id}")))
}

fn cmd_vaults(registry: &VaultRegistry) -> io::Result<()> {
    let vaults = registry.load().map_err(io::Error::other)?;
    if vaults.is_empty() {
        println!("no vaults registered in {}", registry.path().display());
        return Ok(());
    }
    for vault in vaults.iter() {
        print!("{}", output::format_vault(vault));
    }
    Ok(())
}

async fn cmd_show(
    registry: &VaultRegistry,
    client: &GitHubClient,
    vault_id: &str,
    path: &str,
    reference: Option<&str>,
) -> io::Result<()> {
    let vault = require_vault(registry, vault_id)?;
    let base_path = vault.base_path.as_deref();

    // File first (more specific), then fall back to a directory listing.
    let file = client
        .get_file(&vault.repo, path, base_path, reference)
        .await
        .map_err(io::Error::other)?;
    if let Some(file) = file {
        print_file(&file, &vault, path);
        return Ok(());
    }

    let listing = client
        .get_directory(&vault.repo, path, base_path, reference)
        .await
        .map_err(io::Error::other)?;
    match listing {
        Some(mut entries) => {
            sort_listing(&mut entries);
            println!("{}", vault.tree_url(path));
            print!("{}", output::format_listing(&entries, path));
            Ok(())
        }
        None => Err(io::Error::other(format!(
            "not found in vault {vault_id}: /{path}"
        ))),
    }
}

fn print_file(file: &RemoteFile, vault: &VaultConfig, path: &str) {
    print!("{}", output::format_file_header(file));
    if let Some(panel) = output::format_frontmatter(&file.metadata) {
        print!("{panel}");
    }
    if path.ends_with(".md") {
        print!(
            "{}",
            rewrite_wiki_links(&file.content, &vault.id, vault.is_default)
        );
    } else {
        print!("{}", file.content);
    }
}

async fn cmd_sutta(
    registry: &VaultRegistry,
    client: &GitHubClient,
    nikaya: &str,
    sutta: &str,
) -> io::Result<()> {
    registry.load().map_err(io::Error::other)?;
    let vault = registry
        .find_default()
        .ok_or_else(|| io::Error::other("no default vault configured"))?;

    let document = resolve_sutta(client, &vault, nikaya, sutta)
        .await
        .map_err(io::Error::other)?
        .ok_or_else(|| io::Error::other(format!("sutta not found: {nikaya}/{sutta}")))?;

    println!("# {} ({})", sutta.to_lowercase(), document.loaded_path);
    if let Some(panel) = output::format_frontmatter(&document.file.metadata) {
        print!("{panel}");
    }
    print!(
        "{}",
        rewrite_wiki_links(&document.file.content, &vault.id, true)
    );

    let alternatives: Vec<&str> = document
        .available
        .iter()
        .filter(|entry| {
            entry.kind == RemoteEntryKind::File && entry.path != document.loaded_path
        })
        .map(|entry| entry.name.as_str())
        .collect();
    if !alternatives.is_empty() {
        println!("\n# also available: {}", alternatives.join(", "));
    }
    Ok(())
}

async fn cmd_links(
    registry: &VaultRegistry,
    client: &GitHubClient,
    vault_id: &str,
    path: &str,
) -> io::Result<()> {
    let vault = require_vault(registry, vault_id)?;
    let file = client
        .get_file(&vault.repo, path, vault.base_path.as_deref(), None)
        .await
        .map_err(io::Error::other)?
        .ok_or_else(|| io::Error::other(format!("not a file in vault {vault_id}: /{path}")))?;

    let links = extract_wiki_links(&file.content);
    if links.is_empty() {
        println!("no wiki links in /{path}");
        return Ok(());
    }
    for link in links {
        if link.display == link.target {
            println!("{}", link.target);
        } else {
            println!("{} ({})", link.target, link.display);
        }
    }
    Ok(())
}
