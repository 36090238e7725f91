//! Request construction and operator-facing reporting.

pub mod request;
pub mod response;
