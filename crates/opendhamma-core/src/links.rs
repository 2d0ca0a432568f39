//! Wiki-link extraction and route rewriting.
//!
//! Documents embed `[[target]]` / `[[target|display]]` links. Rendering
//! rewrites these into standard Markdown links pointing at app routes. The
//! rewrite is purely syntactic: it never checks that the target exists, so a
//! rewritten link can 404 on follow. That trade keeps rendering at zero
//! additional remote calls per document.

use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;

/// `[[target]]` or `[[target|display]]`.
static WIKI_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\]|]+)(?:\|([^\]]+))?\]\]").expect("static wiki-link pattern")
});

/// Canonical sutta reference shape: a letter prefix (the nikaya) followed by
/// a number with at most one decimal segment, e.g. `mn10` or `sn56.11`.
/// Anchored to the whole target so prose like `About Page2` is not treated
/// as a reference.
static SUTTA_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+)\d+(?:\.\d+)?$").expect("static sutta reference pattern")
});

/// One wiki link occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WikiLink {
    pub target: String,
    /// Display text; equals `target` when the `|display` part is absent.
    pub display: String,
}

/// Extract all wiki links from a document, in order of occurrence.
pub fn extract_wiki_links(markdown: &str) -> Vec<WikiLink> {
    WIKI_LINK
        .captures_iter(markdown)
        .map(|caps| {
            let target = caps[1].trim().to_string();
            let display = caps
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_else(|| target.clone());
            WikiLink { target, display }
        })
        .collect()
}

/// Rewrite every wiki link in `markdown` into a Markdown link.
///
/// In the default vault, targets shaped like sutta references become
/// canonical `/tipitaka/{nikaya}/{sutta}` cross-references. Everything else
/// becomes a best-effort same-vault link: lowercase the target, hyphenate
/// spaces, append `.md` unless present, root at `/vaults/{vault_id}/`.
/// All surrounding text passes through unchanged; this function cannot fail.
pub fn rewrite_wiki_links(markdown: &str, vault_id: &str, is_default_vault: bool) -> String {
    WIKI_LINK
        .replace_all(markdown, |caps: &Captures| {
            let target = caps[1].trim();
            let display = caps.get(2).map(|m| m.as_str().trim()).unwrap_or(target);

            if is_default_vault
                && let Some(reference) = SUTTA_REF.captures(target)
            {
                let nikaya = reference[1].to_lowercase();
                let sutta = target.to_lowercase();
                return format!("[{display}](/tipitaka/{nikaya}/{sutta})");
            }

            let slug = target.to_lowercase().replace(' ', "-");
            let slug = if slug.ends_with(".md") {
                slug
            } else {
                format!("{slug}.md")
            };
            format!("[{display}](/vaults/{vault_id}/{slug})")
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_plain_and_piped() {
        let text = "See [[Some Page]] and [[Another Page|Click Here]].";
        let links = extract_wiki_links(text);
        assert_eq!(
            links,
            vec![
                WikiLink {
                    target: "Some Page".into(),
                    display: "Some Page".into(),
                },
                WikiLink {
                    target: "Another Page".into(),
                    display: "Click Here".into(),
                },
            ]
        );
    }

    #[test]
    fn extract_trims_whitespace() {
        let links = extract_wiki_links("[[ padded | spaced out ]]");
        assert_eq!(links[0].target, "padded");
        assert_eq!(links[0].display, "spaced out");
    }

    #[test]
    fn extract_none_from_plain_text() {
        assert!(extract_wiki_links("no links [here] or [there](x)").is_empty());
    }

    #[test]
    fn rewrite_same_vault_slug() {
        let out = rewrite_wiki_links("go to [[Some Page]]", "notes", false);
        assert_eq!(out, "go to [Some Page](/vaults/notes/some-page.md)");
    }

    #[test]
    fn rewrite_keeps_display_text() {
        let out = rewrite_wiki_links("[[Another Page|Click Here]]", "notes", false);
        assert_eq!(out, "[Click Here](/vaults/notes/another-page.md)");
    }

    #[test]
    fn rewrite_keeps_md_extension() {
        let out = rewrite_wiki_links("[[Notes.md]]", "notes", false);
        assert_eq!(out, "[Notes.md](/vaults/notes/notes.md)");
    }

    #[test]
    fn sutta_reference_in_default_vault() {
        let out = rewrite_wiki_links("compare [[mn10]]", "tipitaka", true);
        assert_eq!(out, "compare [mn10](/tipitaka/mn/mn10)");
    }

    #[test]
    fn sutta_reference_with_decimal_segment() {
        let out = rewrite_wiki_links("[[SN56.11|Dhammacakka]]", "tipitaka", true);
        assert_eq!(out, "[Dhammacakka](/tipitaka/sn/sn56.11)");
    }

    #[test]
    fn sutta_shape_outside_default_vault_is_a_slug() {
        let out = rewrite_wiki_links("[[mn10]]", "notes", false);
        assert_eq!(out, "[mn10](/vaults/notes/mn10.md)");
    }

    #[test]
    fn prose_ending_in_digits_is_not_a_reference() {
        let out = rewrite_wiki_links("[[About Page2]]", "tipitaka", true);
        assert_eq!(out, "[About Page2](/vaults/tipitaka/about-page2.md)");
    }

    #[test]
    fn surrounding_text_is_untouched() {
        let text = "before [[a]] middle [[b|B]] after";
        let out = rewrite_wiki_links(text, "v", false);
        assert_eq!(out, "before [a](/vaults/v/a.md) middle [B](/vaults/v/b.md) after");
    }

    #[test]
    fn no_links_is_identity() {
        let text = "plain **markdown**, [regular](link)";
        assert_eq!(rewrite_wiki_links(text, "v", false), text);
    }
}
