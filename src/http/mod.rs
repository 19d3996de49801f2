//! HTTP protocol layer module
//!
//! Protocol-level building blocks decoupled from the share domain: range
//! parsing, content types, download headers, and response builders.

pub mod headers;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::{decide_range, ByteRange, RangeDecision};
pub use response::{
    build_403_response, build_404_response, build_405_response, build_413_response,
    build_416_response, build_500_response, build_html_response, build_json_response,
    build_options_response, build_redirect_response, error_response_for, ResponseBody,
};
