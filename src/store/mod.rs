//! Read-only document store over the content directory.
//!
//! The store is a snapshot of every markdown document under the content
//! root, keyed by id. An id is the path relative to the root with
//! forward slashes and the extension kept, so `content/blog/hello.md`
//! becomes `blog/hello.md`.
//!
//! # Access paths
//!
//! | operation | reads | validates |
//! |-----------|-------|-----------|
//! | [`DocStore::open`] | every file once | frontmatter schema, slug uniqueness |
//! | [`DocStore::get_all`] / [`DocStore::get_one`] | nothing | nothing (already validated) |
//! | [`DocStore::read_raw`] | the file again, byte-exact | nothing |
//!
//! `read_raw` deliberately goes back to disk instead of caching file
//! contents at open: the raw markdown representation is the file, and
//! the file is the only authority on its own bytes.

pub mod frontmatter;

use crate::negotiate::NegotiationError;
use crate::utils::slug::strip_markdown_extension;
use frontmatter::FrontMatter;
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Extensions the store admits
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "mdx"];

/// A single document: stable id, source path, typed frontmatter.
#[derive(Debug, Clone)]
pub struct Document {
    /// Root-relative id with forward slashes, e.g. `blog/hello.md`
    pub id: String,
    /// Source file path, for raw reads
    pub path: PathBuf,
    /// Validated frontmatter schema
    pub meta: FrontMatter,
}

/// Snapshot of the content directory.
///
/// Documents are kept in a `BTreeMap` keyed by id, so every iteration
/// order downstream is the id order and therefore deterministic.
#[derive(Debug, Default)]
pub struct DocStore {
    docs: BTreeMap<String, Document>,
}

impl DocStore {
    /// Scan a content root and parse every document's frontmatter.
    ///
    /// Fails on the first unreadable file, undecodable frontmatter,
    /// invalid date, or pair of documents whose ids differ only by
    /// markdown extension. A store that opens is fully valid.
    pub fn open(root: &Path) -> Result<Self, NegotiationError> {
        if !root.is_dir() {
            return Err(NegotiationError::Io(
                root.to_path_buf(),
                io::Error::new(io::ErrorKind::NotFound, "content directory does not exist"),
            ));
        }

        let mut docs = BTreeMap::new();
        for path in collect_markdown_files(root) {
            let id = doc_id(root, &path)?;
            let raw =
                fs::read_to_string(&path).map_err(|e| NegotiationError::Io(path.clone(), e))?;
            let meta = frontmatter::parse_typed(&raw)
                .map_err(|e| NegotiationError::Frontmatter(id.clone(), e))?;
            docs.insert(id.clone(), Document { id, path, meta });
        }

        let store = Self { docs };
        store.check_name_collisions()?;
        Ok(store)
    }

    /// All documents under a namespace, in id order.
    pub fn get_all(&self, namespace: &str) -> Vec<&Document> {
        let prefix = format!("{namespace}/");
        self.docs
            .values()
            .filter(|doc| doc.id.starts_with(&prefix))
            .collect()
    }

    /// Look up a single document by id.
    pub fn get_one(&self, id: &str) -> Result<&Document, NegotiationError> {
        self.docs
            .get(id)
            .ok_or_else(|| NegotiationError::NotFound(id.to_owned()))
    }

    /// Byte-exact contents of a document's source file, frontmatter
    /// included.
    ///
    /// Reads from disk at call time, so the raw representation is the
    /// file as it exists now rather than as it was at [`DocStore::open`].
    pub fn read_raw(&self, id: &str) -> Result<String, NegotiationError> {
        let doc = self.get_one(id)?;
        fs::read_to_string(&doc.path).map_err(|e| NegotiationError::Io(doc.path.clone(), e))
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Two ids that differ only by markdown extension would publish
    /// under the same name; refuse to open such a store.
    fn check_name_collisions(&self) -> Result<(), NegotiationError> {
        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
        for doc in self.docs.values() {
            let name = strip_markdown_extension(&doc.id);
            if let Some(first) = seen.insert(name, &doc.id) {
                return Err(NegotiationError::DuplicateName {
                    name: name.to_owned(),
                    first: first.to_owned(),
                    second: doc.id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Collect every markdown file under a directory recursively.
///
/// Hidden files and [`IGNORED_FILES`] are skipped; so is anything
/// without a markdown extension.
fn collect_markdown_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !name.starts_with('.') && !IGNORED_FILES.contains(&name)
        })
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext))
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Root-relative id with forward slashes.
fn doc_id(root: &Path, path: &Path) -> Result<String, NegotiationError> {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let id = rel
        .to_str()
        .ok_or_else(|| {
            NegotiationError::Io(
                path.to_path_buf(),
                io::Error::new(io::ErrorKind::InvalidData, "path is not valid UTF-8"),
            )
        })?
        .replace('\\', "/");
    Ok(id)
}
