/*!
 * Data Structures
 * Small-string storage shared by identifiers and error payloads
 */

mod inline_string;

pub use inline_string::InlineString;
