//! `[build]` section configuration.
//!
//! Contains the content and output paths plus build behavior flags.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in signpost.toml - build paths and flags.
///
/// All paths are relative to the project root until `update_with_cli`
/// normalizes them to absolute paths.
///
/// # Example
/// ```toml
/// [build]
/// content = "content"
/// output = "public"
/// clear = false
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory. `None` means the current directory.
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Content directory holding markdown sources, grouped by
    /// namespace subdirectory (`content/blog`, `content/legal`, ...).
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Output directory for the published JSON and markdown files.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Remove the output directory completely before each build.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub clear: bool,
}
