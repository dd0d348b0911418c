//! Content negotiation: one document store, three representations.
//!
//! ```text
//! DocStore
//!     │
//!     ├── listing::list_posts() ──► api/posts.json   (sorted PostMetadata[])
//!     │
//!     ├── post::assemble() ───────► blog/<slug>.json (PostData + signature)
//!     │
//!     ├── post::raw_post() ───────► blog/<slug>.md   (source file, byte-exact)
//!     │
//!     └── paths::enumerate() ─────► the set of slugs the above serve
//! ```
//!
//! Every representation is derived fresh from the store on each pass;
//! nothing here caches or mutates. The services agree with each other
//! by construction because they share one slug derivation and one
//! projection.

pub mod error;
pub mod listing;
pub mod meta;
pub mod paths;
pub mod post;

pub use error::NegotiationError;

/// Namespace of documents that are listed and enumerated as posts.
///
/// Fixed rather than configured: the `/blog/<slug>` routes and the id
/// prefix must agree, and other namespaces (`legal/`, `about.md`) are
/// stored but never published through these services.
pub const BLOG_NAMESPACE: &str = "blog";
