//! Slug derivation and URL assembly.
//!
//! A slug is a document id with its namespace prefix and markdown
//! extension removed. Nothing else is rewritten: the filename is the
//! public name of the post.

// ============================================================================
// Slug derivation
// ============================================================================

/// Derive the slug for a document id inside a namespace.
///
/// Returns `None` when the id does not live under the namespace.
///
/// # Examples
///
/// | id | namespace | slug |
/// |----|-----------|------|
/// | `blog/hello-world.md` | `blog` | `hello-world` |
/// | `blog/2025/deep.mdx` | `blog` | `2025/deep` |
/// | `legal/privacy.md` | `blog` | (none) |
pub fn slug_from_id<'a>(id: &'a str, namespace: &str) -> Option<&'a str> {
    let rest = id.strip_prefix(namespace)?.strip_prefix('/')?;
    if rest.is_empty() {
        return None;
    }
    Some(strip_markdown_extension(rest))
}

/// Remove a trailing `.md`/`.mdx`, leaving any interior dots alone.
///
/// Only the final extension is stripped, so `my.mdx.post.mdx` keeps its
/// inner `.mdx` and becomes `my.mdx.post`.
pub fn strip_markdown_extension(name: &str) -> &str {
    name.strip_suffix(".mdx")
        .or_else(|| name.strip_suffix(".md"))
        .unwrap_or(name)
}

// ============================================================================
// URL assembly
// ============================================================================

/// Absolute URL of a post's canonical page.
///
/// Joins base URL, namespace and slug with exactly one `/` between each
/// part and a trailing `/`, regardless of whether the configured base
/// carries a trailing slash.
pub fn post_url(base_url: &str, namespace: &str, slug: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{base}/{namespace}/{slug}/")
}
