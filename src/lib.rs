//! Control-plane client for the Enroute standalone gateway.
//!
//! Creates, deletes or shows a proxy together with its service, route,
//! upstream, filters and global config by replaying a fixed, ordered script of
//! HTTP calls against the gateway's REST API.

#![allow(clippy::upper_case_acronyms)]

pub mod config;
pub mod core;
pub mod logging;
pub mod orchestration;
pub mod service;
pub mod utils;

pub use orchestration::{command_table, CommandTable, Operation, Sequencer, Step, Verb};
