//! Core abstractions for enroute-ctl
//!
//! Error taxonomy and the traits that decouple the sequencer from payload
//! shapes and from the network.

pub mod error;
pub mod traits;

pub use error::{ConfigError, ConfigResult, FatalDiagnosticError, RequestBuildError, TransportError};
pub use traits::{Argument, Transport, TransportResponse};
