//! YAML frontmatter splitting and parsing.
//!
//! Every document is read through two deliberately separate paths:
//!
//! - [`parse_typed`] gives the schema-bound [`FrontMatter`] used for
//!   metadata projection. Unknown keys are ignored, the date is
//!   validated, a missing title becomes `""`.
//! - [`parse_raw`] gives the untyped frontmatter mapping, so fields the
//!   schema does not model (signature blocks) can be passed through
//!   without the typed layer having to know their shape.
//!
//! The split itself never rewrites anything. The body keeps its exact
//! bytes, and callers that want the whole file keep the whole file.

use crate::utils::date::PostDate;
use serde::Deserialize;

/// Typed frontmatter schema for a document.
///
/// Only the fields the metadata projection needs. Everything else in
/// the frontmatter is preserved in the file and visible through
/// [`parse_raw`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_date")]
    pub date: Option<PostDate>,
}

/// Parse a document into its typed frontmatter.
///
/// A document without a frontmatter block (or with an empty one) gets
/// the default schema. A block that exists but does not deserialize is
/// an error; the caller decides how fatal that is.
pub fn parse_typed(input: &str) -> Result<FrontMatter, serde_yaml::Error> {
    match split(input) {
        (Some(yaml), _) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml),
        _ => Ok(FrontMatter::default()),
    }
}

/// Parse a document's frontmatter as an untyped YAML mapping.
///
/// Returns `Ok(None)` when the document has no frontmatter block.
pub fn parse_raw(input: &str) -> Result<Option<serde_yaml::Mapping>, serde_yaml::Error> {
    match split(input) {
        (Some(yaml), _) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml).map(Some),
        _ => Ok(None),
    }
}

/// Split a document into `(frontmatter yaml, body)`.
///
/// A frontmatter block is an opening `---` on the very first line and a
/// closing `---` on a line of its own. An opening fence with no closing
/// fence is not a block: the whole input is body, like a horizontal
/// rule at the top of a plain markdown file.
pub fn split(input: &str) -> (Option<&str>, &str) {
    let yaml_start = if input.starts_with("---\r\n") {
        5
    } else if input.starts_with("---\n") {
        4
    } else {
        return (None, input);
    };

    let mut line_start = yaml_start;
    loop {
        let line_end = input[line_start..]
            .find('\n')
            .map_or(input.len(), |i| line_start + i);
        let line = input[line_start..line_end].trim_end_matches('\r');

        if line == "---" {
            let yaml = &input[yaml_start..line_start];
            let body = if line_end < input.len() {
                &input[line_end + 1..]
            } else {
                ""
            };
            return (Some(yaml), body);
        }

        if line_end == input.len() {
            return (None, input);
        }
        line_start = line_end + 1;
    }
}

/// Deserialize a date field: accept a plain date or a full timestamp,
/// keep the calendar date, reject anything unparseable.
fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<PostDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value {
        Some(raw) => {
            let date = PostDate::parse(raw.trim())
                .ok_or_else(|| D::Error::custom(format!("invalid date: {raw:?}")))?;
            Ok(Some(date))
        }
        None => Ok(None),
    }
}
