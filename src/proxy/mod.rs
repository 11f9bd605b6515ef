//! Proxy module
//!
//! Handles request forwarding to the TuneHub upstream API.

pub mod headers;
pub mod logging;
pub mod source;
pub mod upstream;

pub use logging::RequestContext;
pub use source::RequestKind;
pub use upstream::UpstreamClient;
