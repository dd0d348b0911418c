//! Error taxonomy for the store and the negotiation services.

use std::path::PathBuf;
use thiserror::Error;

/// Failures a negotiated representation can run into.
///
/// Exactly one variant means "the post does not exist"; everything else
/// is an internal failure. The dev server maps that split onto 404/500,
/// and a build treats every variant as fatal.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("No such post: `{0}`")]
    NotFound(String),

    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Invalid frontmatter in `{0}`")]
    Frontmatter(String, #[source] serde_yaml::Error),

    #[error("Invalid signature block in `{0}`")]
    Signature(String, #[source] serde_yaml::Error),

    #[error("Document name `{name}` is claimed by both `{first}` and `{second}`")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },

    #[error("JSON encoding failed for `{0}`")]
    Json(String, #[source] serde_json::Error),
}

impl NegotiationError {
    /// HTTP status code this error answers with.
    pub const fn status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            _ => 500,
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_not_found_maps_to_404() {
        let err = NegotiationError::NotFound("blog/missing.md".to_string());
        assert_eq!(err.status(), 404);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_everything_else_maps_to_500() {
        let io_err = NegotiationError::Io(
            PathBuf::from("content/blog/post.md"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(io_err.status(), 500);
        assert!(!io_err.is_not_found());

        let dup = NegotiationError::DuplicateName {
            name: "blog/hello".to_string(),
            first: "blog/hello.md".to_string(),
            second: "blog/hello.mdx".to_string(),
        };
        assert_eq!(dup.status(), 500);
    }

    #[test]
    fn test_error_display_names_the_subject() {
        let err = NegotiationError::NotFound("blog/missing.md".to_string());
        assert!(format!("{err}").contains("blog/missing.md"));

        let dup = NegotiationError::DuplicateName {
            name: "blog/hello".to_string(),
            first: "blog/hello.md".to_string(),
            second: "blog/hello.mdx".to_string(),
        };
        let display = format!("{dup}");
        assert!(display.contains("blog/hello"));
        assert!(display.contains("blog/hello.md"));
        assert!(display.contains("blog/hello.mdx"));
    }
}
