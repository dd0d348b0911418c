//! Site building orchestration.
//!
//! Publishes every negotiated representation as static files.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── DocStore::open() ──► discover + validate every document
//!     │
//!     ├── render phase (in memory, rayon)
//!     │       ├── listing            api/posts.json
//!     │       ├── per-post JSON      blog/<slug>.json
//!     │       └── per-post markdown  blog/<slug>.md
//!     │
//!     └── write phase ──► nothing touches disk until every
//!                         representation rendered cleanly
//! ```

use crate::{
    config::SiteConfig,
    log,
    negotiate::{BLOG_NAMESPACE, listing, paths, post},
    store::DocStore,
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{fs, path::Path};

/// One post's rendered output files, held in memory until the write phase.
struct PostRender {
    slug: String,
    json: String,
    markdown: String,
}

/// Build the site: render every representation, then write them out.
///
/// A single broken post aborts the whole build before the write phase,
/// leaving any previous output intact. If `config.build.clear` is true,
/// the output directory is removed first.
pub fn build_site(config: &'static SiteConfig) -> Result<()> {
    let output = &config.build.output;
    let base_url = config.base_url()?;

    let store = DocStore::open(&config.build.content)?;
    if store.is_empty() {
        log!("warn"; "no markdown files under {}", config.build.content.display());
    } else {
        log!("store"; "loaded {} documents", store.len());
    }

    let slugs = paths::enumerate(&store);
    if slugs.is_empty() {
        log!("warn"; "no posts under `{BLOG_NAMESPACE}/`, the listing will be empty");
    }

    // ========================================================================
    // Render phase
    // ========================================================================

    let posts = listing::list_posts(&store, base_url);
    let listing_json = listing::to_json(&posts)?;

    let renders = slugs
        .par_iter()
        .map(|slug| {
            let data = post::assemble(&store, base_url, slug)
                .with_context(|| format!("Failed to assemble `{BLOG_NAMESPACE}/{slug}`"))?;
            let json = post::to_json(&data)?;
            Ok(PostRender {
                slug: slug.clone(),
                json,
                markdown: data.markdown,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // ========================================================================
    // Write phase
    // ========================================================================

    prepare_output(output, config.build.clear)?;
    let file_count = write_representations(output, &listing_json, &renders)?;

    log!("build"; "published {} posts ({} files)", renders.len(), file_count);

    Ok(())
}

/// Ensure the output directory exists, clearing it first when asked.
fn prepare_output(output: &Path, clear: bool) -> Result<()> {
    if clear && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clear output directory: {}", output.display()))?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

    Ok(())
}

/// Write the listing plus both representations of every post.
///
/// Returns the number of files written.
fn write_representations(
    output: &Path,
    listing_json: &str,
    renders: &[PostRender],
) -> Result<usize> {
    let listing_path = output.join("api").join("posts.json");
    write_file(&listing_path, listing_json)?;

    for render in renders {
        let json_path = output.join(BLOG_NAMESPACE).join(format!("{}.json", render.slug));
        write_file(&json_path, &render.json)?;

        let md_path = output.join(BLOG_NAMESPACE).join(format!("{}.md", render.slug));
        write_file(&md_path, &render.markdown)?;
    }

    Ok(renders.len() * 2 + 1)
}

/// Write one file, creating parent directories as needed.
///
/// Slugs may contain `/` for nested posts, so the parent is derived per
/// file rather than once per namespace.
fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write: {}", path.display()))?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
