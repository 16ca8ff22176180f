//! Removal of reasoning traces from model output.
//!
//! Reasoning models emit their chain of thought between `<think>` and
//! `</think>` before the answer. That text is not part of the answer and must
//! not reach the parser or the user.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A `<think>` block up to the nearest closing tag, across line breaks.
    static ref REASONING_BLOCK: Regex = Regex::new(r"(?s)<think>.*?</think>").unwrap();
}

/// Strip every matched reasoning block and trim the remainder.
///
/// Blocks are removed left to right: each `<think>` pairs with the nearest
/// following `</think>`. A lone opening or closing tag is left in place.
pub fn strip_reasoning(text: &str) -> String {
    REASONING_BLOCK.replace_all(text, "").trim().to_string()
}

/// Whether the text contains at least one matched reasoning block.
pub fn contains_reasoning(text: &str) -> bool {
    REASONING_BLOCK.is_match(text)
}
