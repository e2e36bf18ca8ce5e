//! MIDL (Microsoft Interface Definition Language) parser
//!
//! This crate turns MIDL source text into a typed syntax tree covering the
//! constructs found in COM type libraries: libraries, enum typedefs,
//! coclasses, interfaces and dispinterfaces.
//!
//! # Architecture
//!
//! 1. Filter: drops comments, imports and preprocessor noise between tokens
//! 2. Lexer: tokenizes what is left
//! 3. Parser: recursive descent into the [`ast`] types
//!
//! Pointer markers on types are accepted but not recorded, and enum value
//! modifiers such as `= cwFirst + 1` are kept as text, never evaluated.
//!
//! # Example
//!
//! ```ignore
//! let file = midl::parse(r#"
//!     [uuid(12345678-1234-1234-1234-123456789012), dual]
//!     interface ICalculator : IDispatch {
//!         HRESULT Add([in] long a, [in] long b, [out, retval] long* sum);
//!     }
//! "#)?;
//! assert_eq!(file.interfaces()[0].name, "ICalculator");
//! ```

pub mod ast;
pub mod filter;
pub mod lexer;
pub mod parser;
mod error;

pub use ast::*;
pub use error::{line_col, MidlError, Result, Span};

/// Parse an IDL string into a syntax tree
pub fn parse(idl: &str) -> Result<ast::File> {
    parser::parse(idl)
}
