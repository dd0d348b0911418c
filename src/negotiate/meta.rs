//! Metadata projection: one document in, one `PostMetadata` out.

use crate::store::Document;
use crate::utils::date::PostDate;
use crate::utils::slug::{post_url, slug_from_id};
use serde::Serialize;

/// Public metadata of a post, as it appears in the listing and at the
/// top of the per-post JSON.
///
/// Serialized field order is the published order. `description` and
/// `date` disappear from the output entirely when absent instead of
/// serializing as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct PostMetadata {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Calendar date, rendered as `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<PostDate>,

    pub slug: String,

    /// Absolute URL of the post's canonical page
    pub url: String,
}

/// Project a document into its public metadata.
///
/// Pure pass-through: whatever the frontmatter holds is what the
/// metadata shows, including an empty title. Validation happened when
/// the store opened. Returns `None` for documents outside the
/// namespace, which simply have no post metadata.
pub fn project(doc: &Document, namespace: &str, base_url: &str) -> Option<PostMetadata> {
    let slug = slug_from_id(&doc.id, namespace)?;
    Some(PostMetadata {
        title: doc.meta.title.clone(),
        description: doc.meta.description.clone(),
        date: doc.meta.date,
        slug: slug.to_owned(),
        url: post_url(base_url, namespace, slug),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::frontmatter::FrontMatter;
    use std::path::PathBuf;

    fn doc(id: &str, meta: FrontMatter) -> Document {
        Document {
            id: id.to_string(),
            path: PathBuf::from(format!("content/{id}")),
            meta,
        }
    }

    #[test]
    fn test_project_full_document() {
        let d = doc(
            "blog/hello-world.md",
            FrontMatter {
                title: "Hello World".to_string(),
                description: Some("My first post".to_string()),
                date: Some(PostDate::from_ymd(2025, 1, 20)),
            },
        );

        let meta = project(&d, "blog", "https://arc0.me").unwrap();
        assert_eq!(meta.title, "Hello World");
        assert_eq!(meta.description.as_deref(), Some("My first post"));
        assert_eq!(meta.date, Some(PostDate::from_ymd(2025, 1, 20)));
        assert_eq!(meta.slug, "hello-world");
        assert_eq!(meta.url, "https://arc0.me/blog/hello-world/");
    }

    #[test]
    fn test_project_outside_namespace() {
        let d = doc("legal/privacy.md", FrontMatter::default());
        assert!(project(&d, "blog", "https://arc0.me").is_none());
    }

    #[test]
    fn test_project_passes_empty_title_through() {
        let d = doc("blog/untitled.md", FrontMatter::default());
        let meta = project(&d, "blog", "https://arc0.me").unwrap();
        assert_eq!(meta.title, "");
        assert_eq!(meta.slug, "untitled");
    }

    #[test]
    fn test_serialized_shape_omits_absent_fields() {
        let d = doc(
            "blog/min.md",
            FrontMatter {
                title: "Min".to_string(),
                description: None,
                date: None,
            },
        );

        let json = serde_json::to_value(project(&d, "blog", "https://arc0.me").unwrap()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("description"));
        assert!(!obj.contains_key("date"));
        assert_eq!(obj["title"], "Min");
        assert_eq!(obj["slug"], "min");
        assert_eq!(obj["url"], "https://arc0.me/blog/min/");
    }

    #[test]
    fn test_serialized_date_is_iso_string() {
        let d = doc(
            "blog/dated.md",
            FrontMatter {
                title: "Dated".to_string(),
                description: None,
                date: Some(PostDate::from_ymd(2024, 1, 5)),
            },
        );

        let json = serde_json::to_value(project(&d, "blog", "https://arc0.me").unwrap()).unwrap();
        assert_eq!(json["date"], "2024-01-05");
    }

    #[test]
    fn test_serialized_field_order() {
        let d = doc(
            "blog/ordered.md",
            FrontMatter {
                title: "Ordered".to_string(),
                description: Some("d".to_string()),
                date: Some(PostDate::from_ymd(2024, 6, 1)),
            },
        );

        let json =
            serde_json::to_string(&project(&d, "blog", "https://arc0.me").unwrap()).unwrap();
        let title_pos = json.find("\"title\"").unwrap();
        let desc_pos = json.find("\"description\"").unwrap();
        let date_pos = json.find("\"date\"").unwrap();
        let slug_pos = json.find("\"slug\"").unwrap();
        let url_pos = json.find("\"url\"").unwrap();
        assert!(title_pos < desc_pos);
        assert!(desc_pos < date_pos);
        assert!(date_pos < slug_pos);
        assert!(slug_pos < url_pos);
    }
}
