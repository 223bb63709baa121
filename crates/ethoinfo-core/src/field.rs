//! Form-field descriptors — the per-field half of a domain schema.
//!
//! A field is declared once, with a name and a [`FieldKind`]. Validation is
//! fail-fast: a malformed declaration (empty name, empty option list,
//! repeated option value) is rejected the moment it is made, never deferred
//! to the host.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Options ─────────────────────────────────────────────────────────────────

/// One allowed value of a select field, with an optional human-readable
/// label. The value is what a record stores; the label is what a form shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
  pub value: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
}

impl SelectOption {
  /// An option whose label is its value.
  pub fn new(value: impl Into<String>) -> Self {
    Self { value: value.into(), label: None }
  }

  pub fn labeled(value: impl Into<String>, label: impl Into<String>) -> Self {
    Self { value: value.into(), label: Some(label.into()) }
  }
}

// ─── Field kinds ─────────────────────────────────────────────────────────────

/// The input kind of a form field. The set is closed: a schema either takes
/// free text or a value drawn from an explicit, ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
  /// Unconstrained string input.
  Text,
  /// Enumerated value; `options` is the full, ordered set of allowed values.
  Select { options: Vec<SelectOption> },
}

impl FieldKind {
  /// The discriminant string used in error messages and serialised schemas.
  pub fn name(&self) -> &'static str {
    match self {
      Self::Text => "text",
      Self::Select { .. } => "select",
    }
  }
}

// ─── Field specs ─────────────────────────────────────────────────────────────

/// A named field with its declared kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
  pub name: String,
  #[serde(flatten)]
  pub kind: FieldKind,
}

impl FieldSpec {
  /// Validate this declaration within `domain`. Select fields must carry at
  /// least one option, and option values must be distinct.
  pub(crate) fn validate(&self, domain: &str) -> Result<()> {
    if self.name.is_empty() {
      return Err(Error::EmptyFieldName { domain: domain.to_owned() });
    }

    if let FieldKind::Select { options } = &self.kind {
      if options.is_empty() {
        return Err(Error::EmptySelect {
          domain: domain.to_owned(),
          field:  self.name.clone(),
        });
      }
      for (i, opt) in options.iter().enumerate() {
        if options[..i].iter().any(|o| o.value == opt.value) {
          return Err(Error::DuplicateOption {
            domain: domain.to_owned(),
            field:  self.name.clone(),
            value:  opt.value.clone(),
          });
        }
      }
    }

    Ok(())
  }

  /// Whether `value` is allowed for this field. Text fields accept anything;
  /// select fields accept only their declared option values.
  pub fn allows(&self, value: &str) -> bool {
    match &self.kind {
      FieldKind::Text => true,
      FieldKind::Select { options } => {
        options.iter().any(|o| o.value == value)
      }
    }
  }
}
