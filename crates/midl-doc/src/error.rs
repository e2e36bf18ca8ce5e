//! Documentation pipeline errors

use std::path::PathBuf;

use thiserror::Error;

use crate::store::EntityKey;

/// Errors raised while building, combining or persisting documents
#[derive(Debug, Error)]
pub enum DocError {
    /// The MIDL source did not parse
    #[error(transparent)]
    Midl(#[from] midl::MidlError),

    /// Filesystem access failed
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted document is not well-formed XML
    #[error("invalid XML: {0}")]
    XmlRead(#[from] roxmltree::Error),

    /// Serializing a document failed
    #[error("XML write failed: {0}")]
    XmlWrite(#[from] quick_xml::Error),

    /// Two documents for one key have different root elements
    #[error("root tag is not the same: {left} / {right}")]
    RootMismatch { left: String, right: String },

    /// Two entities of different kinds were contributed under one key
    #[error("{key} is already documented as {existing}, cannot merge {incoming}")]
    KindMismatch {
        key: EntityKey,
        existing: &'static str,
        incoming: &'static str,
    },

    /// An input pattern could not be expanded
    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Result type for documentation operations
pub type Result<T> = std::result::Result<T, DocError>;

impl DocError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
