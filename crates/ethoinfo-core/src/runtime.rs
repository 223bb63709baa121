//! The host-runtime seam.
//!
//! Everything past schema declaration — persistence, request handling, form
//! rendering — lives behind this trait. Handing a sealed bundle to a runtime
//! is one-shot and consuming; no declaration can follow it.

use crate::registry::SchemaBundle;

/// A host runtime that takes over once the schema is sealed.
///
/// Implementations decide whether `run` blocks for the life of the process
/// (a real form-serving host) or returns (a reporting or test runtime). The
/// declaration sequence itself is synchronous and single-threaded either way.
pub trait Runtime {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Take ownership of the sealed schema and run the host.
  fn run(self, bundle: SchemaBundle) -> Result<(), Self::Error>;
}
