//! Publisher API outbound adapter.
//!
//! A thin HTTP implementation of the `PublisherSource` port.

mod http_source;

pub use http_source::{DEFAULT_REQUEST_TIMEOUT, PublisherEndpoints, PublisherHttpSource};
