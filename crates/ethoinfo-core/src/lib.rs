//! Core types and trait definitions for the ethoinfo schema registrar.
//!
//! This crate is deliberately free of I/O dependencies: it models domains,
//! their form-field schemas, typed records, and derived accessors, and hands
//! a sealed schema off to a host [`runtime::Runtime`]. Persistence, HTTP, and
//! form rendering all belong to the host.

pub mod domain;
pub mod error;
pub mod field;
pub mod record;
pub mod registry;
pub mod runtime;

pub use error::{Error, Result};
