//! Readers and writers for Stimulus specification files.
//!
//! Function and type specifications come in two formats that produce the same
//! [`AttrMap`] tree:
//!
//! - an indentation-sensitive format, read by the [`Scanner`] and the
//!   structural [`Parser`] and written by [`to_legacy_string`];
//! - YAML, read by [`from_yaml_str`] and written by [`to_yaml_string`].
//!
//! [`load_file`] picks the format from the file extension.
//!
//! # Examples
//!
//! ```
//! use stimulus_parser::{SourceFormat, AttrValue};
//!
//! let tree = SourceFormat::Legacy
//!     .parse("igraph_ecount:\n    PARAMS: GRAPH graph\n    RETURN: INTEGER\n", "functions.def")
//!     .unwrap();
//!
//! let f = tree["igraph_ecount"].as_map().unwrap();
//! assert_eq!(f["RETURN"], AttrValue::text("INTEGER"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod lexer;
mod parser;
mod source;
mod token;
mod tree;
mod writer;
mod yaml;

pub use lexer::{CONTINUATION_JOINER, Scanner, tokenize};
pub use parser::{Parser, parse_reader, parse_str, parse_tokens};
pub use source::{SourceFormat, load_file};
pub use token::Token;
pub use tree::{AttrMap, AttrValue, deep_merge};
pub use writer::to_legacy_string;
pub use yaml::{from_yaml_str, to_yaml_string};
