//! Documentation run configuration

use std::path::{Path, PathBuf};

/// Version stamped on documents when none is configured
pub const DEFAULT_DOC_VERSION: &str = "2011";

/// Settings passed explicitly through the mapper, store and batch runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocConfig {
    /// Value of every `version` attribute written to stage-2 documents
    pub version: String,
    /// Directory that receives one subdirectory per source group
    pub output_root: PathBuf,
    /// File extension (without the dot) of MIDL sources when scanning directories
    pub extension: String,
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_DOC_VERSION.to_string(),
            output_root: PathBuf::from("out"),
            extension: "idl".to_string(),
        }
    }
}

impl DocConfig {
    /// Set the documentation version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the output root directory
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    /// Set the source extension; a leading dot is ignored
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Path of the persisted document for `name` within `group`
    pub fn document_path(&self, group: &Path, name: &str) -> PathBuf {
        self.output_root.join(group).join(format!("{}.xml", name))
    }
}
