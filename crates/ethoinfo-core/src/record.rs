//! Typed record instances.
//!
//! A [`Record`] is the in-memory shape of one entity: a field map plus owned
//! child collections. Persistence and CRUD belong to the host runtime; this
//! type exists so derivations, display resolution, and schema validation
//! have something concrete to evaluate against.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field name under which the host stores an interval's opening timestamp.
/// Managed by the framework, not declared in `form-fields`.
pub const BEGIN_TIME: &str = "begin_time";

/// Field name for an interval's closing timestamp. Absent while the interval
/// is still open.
pub const END_TIME: &str = "end_time";

// ─── Values ──────────────────────────────────────────────────────────────────

/// A stored field value. `Choice` is a value drawn from a select field's
/// option list; the distinction from `Text` lets validation catch a choice
/// written into a text field and vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
  Text(String),
  Choice(String),
  Timestamp(DateTime<Utc>),
}

impl FieldValue {
  /// The discriminant string used in kind-mismatch errors.
  pub fn kind_name(&self) -> &'static str {
    match self {
      Self::Text(_) => "text",
      Self::Choice(_) => "choice",
      Self::Timestamp(_) => "timestamp",
    }
  }

  /// The value rendered as a display string (timestamps in RFC 3339).
  pub fn display(&self) -> String {
    match self {
      Self::Text(s) | Self::Choice(s) => s.clone(),
      Self::Timestamp(t) => t.to_rfc3339(),
    }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One entity instance belonging to a domain.
///
/// Child records are held by value: an owned collection, not a set of shared
/// references. Every child is reachable through exactly one parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
  pub record_id: Uuid,
  /// Name of the domain this record belongs to.
  pub domain:    String,
  #[serde(default)]
  fields:        BTreeMap<String, FieldValue>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  children:      BTreeMap<String, Vec<Record>>,
}

impl Record {
  /// An empty record in `domain` with a fresh UUID.
  pub fn new(domain: impl Into<String>) -> Self {
    Self {
      record_id: Uuid::new_v4(),
      domain:    domain.into(),
      fields:    BTreeMap::new(),
      children:  BTreeMap::new(),
    }
  }

  // ── Setters (chainable) ───────────────────────────────────────────────

  pub fn set_text(
    &mut self,
    field: impl Into<String>,
    value: impl Into<String>,
  ) -> &mut Self {
    self.fields.insert(field.into(), FieldValue::Text(value.into()));
    self
  }

  pub fn set_choice(
    &mut self,
    field: impl Into<String>,
    value: impl Into<String>,
  ) -> &mut Self {
    self.fields.insert(field.into(), FieldValue::Choice(value.into()));
    self
  }

  pub fn set_timestamp(
    &mut self,
    field: impl Into<String>,
    value: DateTime<Utc>,
  ) -> &mut Self {
    self.fields.insert(field.into(), FieldValue::Timestamp(value));
    self
  }

  /// Append `child` to the owned collection under `relation`.
  pub fn push_child(
    &mut self,
    relation: impl Into<String>,
    child: Record,
  ) -> &mut Self {
    self.children.entry(relation.into()).or_default().push(child);
    self
  }

  // ── Accessors ─────────────────────────────────────────────────────────

  pub fn value(&self, field: &str) -> Option<&FieldValue> {
    self.fields.get(field)
  }

  pub fn text(&self, field: &str) -> Option<&str> {
    match self.fields.get(field)? {
      FieldValue::Text(s) => Some(s),
      _ => None,
    }
  }

  pub fn choice(&self, field: &str) -> Option<&str> {
    match self.fields.get(field)? {
      FieldValue::Choice(s) => Some(s),
      _ => None,
    }
  }

  pub fn timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
    match self.fields.get(field)? {
      FieldValue::Timestamp(t) => Some(*t),
      _ => None,
    }
  }

  /// The owned child records under `relation`, in insertion order.
  pub fn children(&self, relation: &str) -> &[Record] {
    self.children.get(relation).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Iterate over `(field name, value)` pairs.
  pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
    self.fields.iter().map(|(k, v)| (k.as_str(), v))
  }

  /// Iterate over `(relation name, child records)` pairs.
  pub fn relations(&self) -> impl Iterator<Item = (&str, &[Record])> {
    self.children.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
  }
}
