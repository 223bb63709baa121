//! Error types for `ethoinfo-core`.
//!
//! Every declaration-time failure names the domain (and field or relation)
//! concerned, so a corrupt schema aborts startup with a message that points
//! at the offending declaration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("domain {0:?} is already declared")]
  DuplicateDomain(String),

  #[error("domain {0:?} is not declared")]
  UnknownDomain(String),

  #[error("domain {domain:?}: field {field:?} is already declared")]
  DuplicateField { domain: String, field: String },

  #[error("domain {domain:?}: field name must not be empty")]
  EmptyFieldName { domain: String },

  #[error("domain {domain:?}: select field {field:?} has no options")]
  EmptySelect { domain: String, field: String },

  #[error(
    "domain {domain:?}: select field {field:?} repeats option value {value:?}"
  )]
  DuplicateOption {
    domain: String,
    field:  String,
    value:  String,
  },

  #[error("domain {domain:?} has no field named {field:?}")]
  UnknownField { domain: String, field: String },

  #[error("domain {domain:?} declares no nested collection {relation:?}")]
  UnknownRelation { domain: String, relation: String },

  #[error(
    "domain {parent:?}: relation {relation:?} nests undeclared domain \
     {child:?}"
  )]
  UndeclaredChild {
    parent:   String,
    relation: String,
    child:    String,
  },

  #[error(
    "domain {domain:?}: name {name:?} is already taken by a field or relation"
  )]
  NameCollision { domain: String, name: String },

  #[error("domain {domain:?} registers no {derivation} derivation")]
  NoDerivation {
    domain:     String,
    derivation: &'static str,
  },

  #[error("domain {domain:?} designates no display field")]
  NoDisplayField { domain: String },

  #[error("record in domain {domain:?} is missing field {field:?}")]
  MissingField { domain: String, field: String },

  #[error(
    "record in domain {domain:?}: field {field:?} holds a {found} value but \
     the schema declares {expected}"
  )]
  FieldKindMismatch {
    domain:   String,
    field:    String,
    expected: &'static str,
    found:    &'static str,
  },

  #[error(
    "record in domain {domain:?}: {value:?} is not an allowed value for \
     select field {field:?}"
  )]
  InvalidChoice {
    domain: String,
    field:  String,
    value:  String,
  },

  #[error("record declares domain {found:?} but was validated as {expected:?}")]
  DomainMismatch { expected: String, found: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
