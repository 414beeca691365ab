//! # nodegroups-core
//!
//! Core types and utilities for talking to a nodegroups API.
//!
//! This crate provides error handling, configuration resolution, request
//! parameter helpers and response decoding shared by nodegroups clients.
//!
//! ## Modules
//!
//! - [`error`] - Error type and HTTP status mapping
//! - [`config`] - Parameter defaults, config file loading and option precedence
//! - [`ini`] - Minimal INI reader for the client config file
//! - [`client`] - Opt-in HTTP transport settings
//! - [`query`] - Query parameter builder
//! - [`response`] - Decoding of the `{status, message, records}` envelope
//! - [`types`] - Endpoint selection

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod ini;
pub mod query;
pub mod response;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
