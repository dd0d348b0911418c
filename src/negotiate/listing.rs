//! The post listing: every post's metadata, newest first.

use super::BLOG_NAMESPACE;
use super::error::NegotiationError;
use super::meta::{self, PostMetadata};
use crate::store::DocStore;
use std::cmp::Ordering;

/// Project every post in the blog namespace and sort by recency.
///
/// The sort is explicit and stable: newest date first, undated posts
/// after all dated ones, and posts sharing a date (or sharing the lack
/// of one) stay in the store's id order.
pub fn list_posts(store: &DocStore, base_url: &str) -> Vec<PostMetadata> {
    let mut posts: Vec<PostMetadata> = store
        .get_all(BLOG_NAMESPACE)
        .into_iter()
        .filter_map(|doc| meta::project(doc, BLOG_NAMESPACE, base_url))
        .collect();
    posts.sort_by(compare_by_date);
    posts
}

/// Pretty-printed JSON array for the listing endpoint.
pub fn to_json(posts: &[PostMetadata]) -> Result<String, NegotiationError> {
    serde_json::to_string_pretty(posts)
        .map_err(|e| NegotiationError::Json("posts listing".to_owned(), e))
}

/// Newest first; no date sorts as the minimum possible date.
fn compare_by_date(a: &PostMetadata, b: &PostMetadata) -> Ordering {
    match (&a.date, &b.date) {
        (Some(date_a), Some(date_b)) => date_b.cmp(date_a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
