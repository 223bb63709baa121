//! A reporting runtime: logs the sealed schema and returns.
//!
//! Stands in for a real form-serving host, which is out of scope here. The
//! handoff contract is the same; only the lifetime differs, since this
//! runtime returns instead of blocking for the life of the process.

use std::convert::Infallible;

use ethoinfo_core::{registry::SchemaBundle, runtime::Runtime};
use tracing::info;

pub struct ReportRuntime;

impl Runtime for ReportRuntime {
  type Error = Infallible;

  fn run(self, bundle: SchemaBundle) -> Result<(), Self::Error> {
    for domain in bundle.domains() {
      info!(
        domain = %domain.name,
        fields = domain.fields.len(),
        collections = domain.collections.len(),
        display = domain.display_field.as_deref().unwrap_or("-"),
        "domain registered"
      );
    }
    info!("runtime handoff complete");
    Ok(())
  }
}
