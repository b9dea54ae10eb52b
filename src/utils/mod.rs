//! Shared utility functions.
//!
//! - `escape`: string literal escaping for generated source code

mod escape;

pub use escape::kotlin_string_escape;
