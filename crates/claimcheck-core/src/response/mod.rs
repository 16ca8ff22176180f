//! Parsing of semi-structured model replies.
//!
//! The verification prompt asks for a reply of the form:
//!
//! ```text
//! VERDICT: TRUE | FALSE | NO_INFO
//! EXPLANATION: free text, possibly over several lines
//! EVIDENCE:
//! - "verbatim quote" || [SOURCE: Title (URL)]
//! ```
//!
//! Models drift from that format, translate the labels, or wrap the reply
//! in reasoning markup. The parser tolerates all of it and degrades to a
//! `NO_INFO` default instead of failing.

mod headers;
mod parser;

pub use headers::{FieldKind, HeaderTable, DEFAULT_HEADERS};
pub use parser::{ResponseParser, EVIDENCE_SEPARATOR};
