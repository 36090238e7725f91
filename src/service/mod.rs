//! Network services used by the sequencer.

pub mod http;

pub use self::http::HttpTransport;
