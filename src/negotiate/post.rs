//! Post assembly: the full per-post representations.
//!
//! The JSON representation is built from two reads of the same file.
//! The typed read (done when the store opened) supplies the metadata;
//! a raw re-read supplies the byte-exact `markdown` field and the
//! untyped frontmatter the signature block is lifted from. Keeping the
//! two reads separate means the schema never has to model signature
//! internals and the markdown field can never drift from the file.

use super::BLOG_NAMESPACE;
use super::error::NegotiationError;
use super::meta::{self, PostMetadata};
use crate::store::{DocStore, Document, frontmatter};
use crate::utils::slug::slug_from_id;
use serde::{Deserialize, Serialize};

/// Full structured representation of a post.
#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    #[serde(flatten)]
    pub metadata: PostMetadata,

    /// The source file, byte-exact, frontmatter included
    pub markdown: String,

    /// Signature metadata, passed through from frontmatter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureBlock>,
}

/// Cryptographic signature metadata attached to a post.
///
/// All-or-nothing: a `signatures` frontmatter key must carry both
/// chains with every field, or the post is malformed. The fields are
/// opaque pass-through; nothing here verifies a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBlock {
    pub btc: BtcSignature,
    pub stx: StxSignature,
}

/// Bitcoin message signature fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BtcSignature {
    pub signer: String,
    pub signature: String,
    pub signature_hex: String,
    pub message_hash: String,
    pub format: String,
}

/// Stacks message signature fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StxSignature {
    pub signer: String,
    pub signature: String,
    pub message_hash: String,
    pub format: String,
}

/// Resolve a requested slug to its document.
///
/// The inverse of the enumeration's derivation rule: a slug matches the
/// document whose id derives to it, so resolution and enumeration can
/// never disagree about which posts exist.
pub fn resolve<'a>(store: &'a DocStore, slug: &str) -> Result<&'a Document, NegotiationError> {
    store
        .get_all(BLOG_NAMESPACE)
        .into_iter()
        .find(|doc| slug_from_id(&doc.id, BLOG_NAMESPACE) == Some(slug))
        .ok_or_else(|| NegotiationError::NotFound(format!("{BLOG_NAMESPACE}/{slug}")))
}

/// Assemble the structured JSON representation of one post.
pub fn assemble(
    store: &DocStore,
    base_url: &str,
    slug: &str,
) -> Result<PostData, NegotiationError> {
    let doc = resolve(store, slug)?;
    let metadata = meta::project(doc, BLOG_NAMESPACE, base_url)
        .ok_or_else(|| NegotiationError::NotFound(slug.to_owned()))?;

    let markdown = store.read_raw(&doc.id)?;
    let signature = extract_signature(&doc.id, &markdown)?;

    Ok(PostData {
        metadata,
        markdown,
        signature,
    })
}

/// The raw markdown representation of one post: its file, byte-exact.
pub fn raw_post(store: &DocStore, slug: &str) -> Result<String, NegotiationError> {
    let doc = resolve(store, slug)?;
    store.read_raw(&doc.id)
}

/// Pretty-printed JSON for a single post.
pub fn to_json(post: &PostData) -> Result<String, NegotiationError> {
    serde_json::to_string_pretty(post)
        .map_err(|e| NegotiationError::Json(post.metadata.slug.clone(), e))
}

/// Lift the signature block out of the raw frontmatter.
///
/// Absent or explicitly null `signatures` means an unsigned post. A
/// block that is present but does not carry the full shape is an error,
/// not a partially signed post.
fn extract_signature(
    id: &str,
    raw_file: &str,
) -> Result<Option<SignatureBlock>, NegotiationError> {
    let Some(mapping) = frontmatter::parse_raw(raw_file)
        .map_err(|e| NegotiationError::Frontmatter(id.to_owned(), e))?
    else {
        return Ok(None);
    };
    let Some(value) = mapping.get("signatures") else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    let block = serde_yaml::from_value(value.clone())
        .map_err(|e| NegotiationError::Signature(id.to_owned(), e))?;
    Ok(Some(block))
}
