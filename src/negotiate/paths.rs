//! Path enumeration: the set of slugs the per-post services answer.
//!
//! A build pre-generates one `.json` and one `.md` file per enumerated
//! slug, so this set IS the servable surface. It uses the same slug
//! derivation as resolution, which keeps "what exists" and "what
//! resolves" identical by construction.

use super::BLOG_NAMESPACE;
use crate::store::DocStore;
use crate::utils::slug::slug_from_id;

/// Every publishable slug, in store (id) order.
pub fn enumerate(store: &DocStore) -> Vec<String> {
    store
        .get_all(BLOG_NAMESPACE)
        .into_iter()
        .filter_map(|doc| slug_from_id(&doc.id, BLOG_NAMESPACE))
        .map(str::to_owned)
        .collect()
}
