//! Content-stream parsing: the page-description language subset needed
//! for text extraction.

pub mod operators;
pub mod parser;

pub use operators::{Operator, TextItem};
pub use parser::parse_content_stream;
