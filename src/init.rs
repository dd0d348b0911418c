//! Site initialization module.
//!
//! Creates new site structure with default configuration and sample
//! posts, one of them carrying a complete signature block.

use crate::{config::SiteConfig, log};
use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Files to write ignore patterns to
const IGNORE_FILES: &[&str] = &[".gitignore", ".ignore"];

/// Default config filename
const CONFIG_FILE: &str = "signpost.toml";

/// Default site directory structure
const SITE_DIRS: &[&str] = &["content/blog", "content/legal"];

/// Scaffolded unsigned post.
const HELLO_SAMPLE: &str = r#"---
title: "Hello World"
description: "The first post on this blog"
date: "2024-01-02"
---

## Hello

This post is published three ways: as `/blog/hello-world.json`, as
`/blog/hello-world.md`, and as an entry in `/api/posts.json`.

Edit it, add your own posts next to it, and run `signpost build`.
"#;

/// Scaffolded signed post demonstrating the signature block shape.
///
/// The values are placeholders. Replace them with a real pair of
/// signatures over the post body to publish a verifiable post.
const SIGNED_SAMPLE: &str = r#"---
title: "Proof of Keys"
description: "A post carrying bitcoin and stacks signatures"
date: "2024-01-15"
signatures:
  btc:
    signer: "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"
    signature: "H9l3N6cQf8yJ1wW0UvO5rT2eXaZ7sKdPmB4hYxVg3LcRn0="
    signatureHex: "1f2d4b8e0a6c9f13d7b5e2a8c4f0619d3e7b5a2c8f41"
    messageHash: "9c1185a5c5e9fc54612808977ee8f548b2258d31"
    format: "legacy"
  stx:
    signer: "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7"
    signature: "8b5f1c3d7e9a2468ace02468ace02468ace02468ace02468ace02468ace024"
    messageHash: "9c1185a5c5e9fc54612808977ee8f548b2258d31"
    format: "rsv"
---

## Why sign posts?

A signature binds the post body to a key its author controls, so a
mirror of this file can be checked against the listed signer.
"#;

/// Scaffolded page outside the blog namespace.
///
/// Documents under other namespaces are stored and validated but never
/// published through the blog routes or the listing.
const ABOUT_SAMPLE: &str = r#"---
title: "About"
---

Pages outside `content/blog/` stay out of the published API.
"#;

/// Scaffolded legal page, also outside the blog namespace.
const LEGAL_SAMPLE: &str = r#"---
title: "Terms"
---

Not a post either.
"#;

/// Create a new site with default structure
pub fn new_site(config: &'static SiteConfig, has_name: bool) -> Result<()> {
    let root = config.get_root();

    // Safety check: if no name was provided (init in current dir),
    // the directory must be completely empty
    if !has_name && !is_dir_empty(root)? {
        bail!(
            "Current directory is not empty. Use `signpost init <SITE_NAME>` to create in a subdirectory."
        );
    }

    init_site_structure(root)?;
    init_default_config(root)?;
    init_sample_posts(root)?;

    let output = config
        .build
        .output
        .strip_prefix(root)
        .unwrap_or(&config.build.output);
    init_ignored_files(root, &[output])?;

    log!("init"; "site scaffolded at {}", root.display());
    log!("init"; "next: set [base.url] in {CONFIG_FILE}, then run `signpost build`");

    Ok(())
}

/// Check if a directory is completely empty
fn is_dir_empty(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Write default configuration file
fn init_default_config(root: &Path) -> Result<()> {
    let mut config = SiteConfig::default();
    config.base.title = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "My Signed Blog".into());
    config.base.description = "A blog of cryptographically signed posts".into();
    config.base.url = Some("https://example.com".into());

    let content = toml::to_string_pretty(&config)?;
    fs::write(root.join(CONFIG_FILE), content)?;
    Ok(())
}

/// Create site directory structure
fn init_site_structure(root: &Path) -> Result<()> {
    for dir in SITE_DIRS {
        let path = root.join(dir);
        if path.exists() {
            bail!(
                "Path `{}` already exists. Try `signpost init <SITE_NAME>` instead.",
                path.display()
            );
        }
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
    }
    Ok(())
}

/// Write the sample posts so the first build has something to publish
fn init_sample_posts(root: &Path) -> Result<()> {
    let content = root.join("content");

    fs::write(content.join("blog").join("hello-world.md"), HELLO_SAMPLE)?;
    fs::write(content.join("blog").join("proof-of-keys.md"), SIGNED_SAMPLE)?;
    fs::write(content.join("about.md"), ABOUT_SAMPLE)?;
    fs::write(content.join("legal").join("terms.md"), LEGAL_SAMPLE)?;
    Ok(())
}

/// Initialize .gitignore and .ignore files with specified paths
pub fn init_ignored_files(root: &Path, paths: &[&Path]) -> Result<()> {
    let content = paths
        .iter()
        .filter_map(|p| p.to_str())
        .collect::<Vec<_>>()
        .join("\n");

    for filename in IGNORE_FILES {
        let path = root.join(filename);
        if !path.exists() {
            fs::write(&path, &content)?;
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{negotiate::post, store::DocStore};
    use tempfile::TempDir;

    fn scaffolded_site() -> (TempDir, &'static SiteConfig) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("myblog");

        let mut config = SiteConfig::default();
        config.set_root(&root);
        config.build.output = root.join("public");
        let config: &'static SiteConfig = Box::leak(Box::new(config));

        new_site(config, true).unwrap();
        (tmp, config)
    }

    #[test]
    fn test_new_site_layout() {
        let (tmp, _) = scaffolded_site();
        let root = tmp.path().join("myblog");

        assert!(root.join("signpost.toml").is_file());
        assert!(root.join("content/blog/hello-world.md").is_file());
        assert!(root.join("content/blog/proof-of-keys.md").is_file());
        assert!(root.join("content/about.md").is_file());
        assert!(root.join("content/legal/terms.md").is_file());
        assert!(root.join(".gitignore").is_file());
    }

    #[test]
    fn test_scaffolded_config_parses() {
        let (tmp, _) = scaffolded_site();
        let root = tmp.path().join("myblog");

        let config = SiteConfig::from_path(&root.join("signpost.toml")).unwrap();
        assert_eq!(config.base.title, "myblog");
        assert_eq!(config.base.url, Some("https://example.com".to_string()));
    }

    #[test]
    fn test_scaffolded_posts_assemble() {
        let (tmp, _) = scaffolded_site();
        let content = tmp.path().join("myblog/content");

        let store = DocStore::open(&content).unwrap();
        assert_eq!(store.len(), 4);

        let signed = post::assemble(&store, "https://example.com", "proof-of-keys").unwrap();
        assert!(signed.signature.is_some());
        assert_eq!(signed.metadata.title, "Proof of Keys");

        let unsigned = post::assemble(&store, "https://example.com", "hello-world").unwrap();
        assert!(unsigned.signature.is_none());
    }

    #[test]
    fn test_scaffolded_pages_stay_out_of_the_listing() {
        let (tmp, _) = scaffolded_site();
        let content = tmp.path().join("myblog/content");

        let store = DocStore::open(&content).unwrap();
        let mut slugs = crate::negotiate::paths::enumerate(&store);
        slugs.sort();

        assert_eq!(slugs, vec!["hello-world", "proof-of-keys"]);
    }

    #[test]
    fn test_new_site_in_nonempty_dir_without_name() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("occupied.txt"), "x").unwrap();

        let mut config = SiteConfig::default();
        config.set_root(tmp.path());
        config.build.output = tmp.path().join("public");
        let config: &'static SiteConfig = Box::leak(Box::new(config));

        assert!(new_site(config, false).is_err());
    }

    #[test]
    fn test_gitignore_covers_output() {
        let (tmp, _) = scaffolded_site();
        let root = tmp.path().join("myblog");

        let ignore = fs::read_to_string(root.join(".gitignore")).unwrap();
        assert!(ignore.contains("public"));
    }
}
