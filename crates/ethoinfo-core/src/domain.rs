//! Domain schemas and the typed declaration builder.
//!
//! A [`DomainSchema`] describes one kind of record: its form fields, the
//! nested collections it owns, its interval derivations, and the field used
//! as its short human-readable label. Each declaration kind has its own
//! builder method, so a relation cannot be registered where a field spec is
//! expected and vice versa.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  Error, Result,
  field::{FieldKind, FieldSpec, SelectOption},
  record::{BEGIN_TIME, END_TIME, FieldValue, Record},
};

// ─── Derivations ─────────────────────────────────────────────────────────────

/// A derived accessor: evaluated on demand against a record, never stored.
pub type DeriveFn = Arc<dyn Fn(&Record) -> Result<DateTime<Utc>> + Send + Sync>;

/// The interval derivations a domain may register. Evaluated fresh on every
/// call; an open interval's end derivation typically reads the wall clock.
#[derive(Clone, Default)]
pub struct Derivations {
  pub(crate) begin: Option<DeriveFn>,
  pub(crate) end:   Option<DeriveFn>,
}

impl fmt::Debug for Derivations {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Derivations")
      .field("begin", &self.begin.is_some())
      .field("end", &self.end.is_some())
      .finish()
  }
}

// ─── Nested collections ──────────────────────────────────────────────────────

/// A parent-owned, ordered collection of child records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedCollection {
  /// Accessor name on the parent (e.g. `encounters`).
  pub relation: String,
  /// Name of the child domain.
  pub child:    String,
}

// ─── Schema ──────────────────────────────────────────────────────────────────

/// The full declared shape of one domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainSchema {
  pub name:          String,
  /// Form fields in declaration order.
  pub fields:        Vec<FieldSpec>,
  /// Nested collections owned by records of this domain.
  #[serde(default)]
  pub collections:   Vec<NestedCollection>,
  /// The field whose value labels a record of this domain.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub display_field: Option<String>,
  #[serde(skip)]
  pub(crate) derivations: Derivations,
}

impl DomainSchema {
  pub fn builder(name: impl Into<String>) -> DomainBuilder {
    DomainBuilder {
      schema: DomainSchema {
        name:          name.into(),
        fields:        Vec::new(),
        collections:   Vec::new(),
        display_field: None,
        derivations:   Derivations::default(),
      },
    }
  }

  pub fn field(&self, name: &str) -> Option<&FieldSpec> {
    self.fields.iter().find(|f| f.name == name)
  }

  pub fn collection(&self, relation: &str) -> Option<&NestedCollection> {
    self.collections.iter().find(|c| c.relation == relation)
  }

  /// Whether `name` is already taken by a field or a relation.
  pub(crate) fn name_taken(&self, name: &str) -> bool {
    self.field(name).is_some() || self.collection(name).is_some()
  }

  // ── Derived accessors ─────────────────────────────────────────────────

  /// Evaluate the begin-time derivation against `record`.
  pub fn begin_time_of(&self, record: &Record) -> Result<DateTime<Utc>> {
    let f = self.derivations.begin.as_ref().ok_or(Error::NoDerivation {
      domain:     self.name.clone(),
      derivation: "begin-time",
    })?;
    f(record)
  }

  /// Evaluate the end-time derivation against `record`. Never cached: an
  /// open interval yields a fresh wall-clock read per call.
  pub fn end_time_of(&self, record: &Record) -> Result<DateTime<Utc>> {
    let f = self.derivations.end.as_ref().ok_or(Error::NoDerivation {
      domain:     self.name.clone(),
      derivation: "end-time",
    })?;
    f(record)
  }

  /// Resolve the display field's value on `record` as the record's short
  /// human-readable label.
  pub fn short_description(&self, record: &Record) -> Result<String> {
    let field = self.display_field.as_deref().ok_or(Error::NoDisplayField {
      domain: self.name.clone(),
    })?;
    let value = record.value(field).ok_or_else(|| Error::MissingField {
      domain: self.name.clone(),
      field:  field.to_owned(),
    })?;
    Ok(value.display())
  }

  // ── Record validation ─────────────────────────────────────────────────

  /// Check one record against this schema (shallow: child records are
  /// checked for domain membership only; deep validation is the registry's
  /// concern, which holds the child schemas).
  ///
  /// The framework-managed interval timestamps ([`BEGIN_TIME`],
  /// [`END_TIME`]) are accepted on any record but must hold timestamps.
  pub fn validate_record(&self, record: &Record) -> Result<()> {
    if record.domain != self.name {
      return Err(Error::DomainMismatch {
        expected: self.name.clone(),
        found:    record.domain.clone(),
      });
    }

    for (name, value) in record.fields() {
      if name == BEGIN_TIME || name == END_TIME {
        if !matches!(value, FieldValue::Timestamp(_)) {
          return Err(Error::FieldKindMismatch {
            domain:   self.name.clone(),
            field:    name.to_owned(),
            expected: "timestamp",
            found:    value.kind_name(),
          });
        }
        continue;
      }

      let spec = self.field(name).ok_or_else(|| Error::UnknownField {
        domain: self.name.clone(),
        field:  name.to_owned(),
      })?;

      match (&spec.kind, value) {
        (FieldKind::Text, FieldValue::Text(_)) => {}
        (FieldKind::Select { .. }, FieldValue::Choice(v)) => {
          if !spec.allows(v) {
            return Err(Error::InvalidChoice {
              domain: self.name.clone(),
              field:  name.to_owned(),
              value:  v.clone(),
            });
          }
        }
        (kind, value) => {
          return Err(Error::FieldKindMismatch {
            domain:   self.name.clone(),
            field:    name.to_owned(),
            expected: kind.name(),
            found:    value.kind_name(),
          });
        }
      }
    }

    for (relation, children) in record.relations() {
      let coll =
        self.collection(relation).ok_or_else(|| Error::UnknownRelation {
          domain:   self.name.clone(),
          relation: relation.to_owned(),
        })?;
      for child in children {
        if child.domain != coll.child {
          return Err(Error::DomainMismatch {
            expected: coll.child.clone(),
            found:    child.domain.clone(),
          });
        }
      }
    }

    Ok(())
  }
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Fail-fast declaration builder for a [`DomainSchema`]. Each method rejects
/// a malformed declaration immediately, naming the domain and field.
#[derive(Debug)]
pub struct DomainBuilder {
  schema: DomainSchema,
}

impl DomainBuilder {
  /// Declare an unconstrained text field.
  pub fn text_field(self, name: impl Into<String>) -> Result<Self> {
    self.add_field(FieldSpec { name: name.into(), kind: FieldKind::Text })
  }

  /// Declare an enumerated field with its full, ordered option list.
  pub fn select_field(
    self,
    name: impl Into<String>,
    options: Vec<SelectOption>,
  ) -> Result<Self> {
    self.add_field(FieldSpec {
      name: name.into(),
      kind: FieldKind::Select { options },
    })
  }

  fn add_field(mut self, spec: FieldSpec) -> Result<Self> {
    spec.validate(&self.schema.name)?;
    if self.schema.name_taken(&spec.name) {
      return Err(Error::DuplicateField {
        domain: self.schema.name.clone(),
        field:  spec.name,
      });
    }
    debug!(
      domain = %self.schema.name,
      field = %spec.name,
      kind = spec.kind.name(),
      "declared field"
    );
    self.schema.fields.push(spec);
    Ok(self)
  }

  /// Register the begin-time derivation.
  pub fn begin_time<F>(mut self, f: F) -> Self
  where
    F: Fn(&Record) -> Result<DateTime<Utc>> + Send + Sync + 'static,
  {
    self.schema.derivations.begin = Some(Arc::new(f));
    self
  }

  /// Register the end-time derivation.
  pub fn end_time<F>(mut self, f: F) -> Self
  where
    F: Fn(&Record) -> Result<DateTime<Utc>> + Send + Sync + 'static,
  {
    self.schema.derivations.end = Some(Arc::new(f));
    self
  }

  /// Designate the field whose value labels records of this domain.
  /// Checked against the declared fields at [`Self::build`].
  pub fn display_field(mut self, name: impl Into<String>) -> Self {
    self.schema.display_field = Some(name.into());
    self
  }

  pub fn build(self) -> Result<DomainSchema> {
    if let Some(display) = &self.schema.display_field {
      if self.schema.field(display).is_none() {
        return Err(Error::UnknownField {
          domain: self.schema.name.clone(),
          field:  display.clone(),
        });
      }
    }
    Ok(self.schema)
  }
}
