//! MIDL documentation pipeline
//!
//! Two stages on top of the [`midl`] parser:
//!
//! 1. [`parse_files`] writes each source's syntax tree as XML
//! 2. [`document_sources`] maps interfaces and enum typedefs to documentation
//!    entities, merges contributions that share a name, and persists one XML
//!    document per entity, combining with documents left by earlier runs
//!
//! # Example
//!
//! ```ignore
//! use midl_doc::{document_sources, DocConfig, Source};
//!
//! let config = DocConfig::default().with_output_root("docs");
//! let report = document_sources(&[Source::new("idl", "CWCom/Interfaces")], &config);
//! assert!(report.is_clean());
//! ```

pub mod batch;
pub mod combine;
pub mod config;
pub mod discover;
pub mod mapper;
pub mod model;
pub mod parse_tree;
pub mod store;
pub mod xml;
mod error;

pub use batch::{document_sources, parse_files, BatchReport, Source};
pub use combine::combine;
pub use config::{DocConfig, DEFAULT_DOC_VERSION};
pub use error::{DocError, Result};
pub use model::{Constant, Entity, Interface, Member, MemberKind, Parameter, Typedef};
pub use store::{DocumentSet, EntityKey, PersistReport};
pub use xml::Element;
