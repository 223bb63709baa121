//! The schema registry — the explicit context object every declaration goes
//! through, and the sealed bundle handed to the host runtime.
//!
//! Declarations execute in program order during startup. The only ordering
//! constraint is that a child domain must be declared before it is nested
//! into a parent. A registry that fails to seal must never reach `run`; a
//! corrupt schema renders the rest of the application undefined.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
  Error, Result,
  domain::{DomainSchema, NestedCollection},
  record::Record,
  runtime::Runtime,
};

// ─── Registry ────────────────────────────────────────────────────────────────

/// Accumulates domain declarations, then seals into a [`SchemaBundle`].
#[derive(Debug, Default)]
pub struct SchemaRegistry {
  /// Domains in declaration order.
  domains: Vec<DomainSchema>,
}

impl SchemaRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Declare a domain. The name must be unique within the registry.
  pub fn declare(&mut self, schema: DomainSchema) -> Result<()> {
    if self.domain(&schema.name).is_some() {
      return Err(Error::DuplicateDomain(schema.name));
    }
    debug!(domain = %schema.name, fields = schema.fields.len(), "declared domain");
    self.domains.push(schema);
    Ok(())
  }

  /// Declare that each `parent` record owns an ordered collection of `child`
  /// records, accessible under `relation`. The child domain must already be
  /// declared, and `relation` must not collide with a field or relation on
  /// the parent.
  pub fn nest(
    &mut self,
    parent: &str,
    relation: impl Into<String>,
    child: &str,
  ) -> Result<()> {
    let relation = relation.into();

    if self.domain(child).is_none() {
      return Err(Error::UndeclaredChild {
        parent: parent.to_owned(),
        relation,
        child: child.to_owned(),
      });
    }

    let parent_schema = self
      .domains
      .iter_mut()
      .find(|d| d.name == parent)
      .ok_or_else(|| Error::UnknownDomain(parent.to_owned()))?;

    if parent_schema.name_taken(&relation) {
      return Err(Error::NameCollision {
        domain: parent.to_owned(),
        name:   relation,
      });
    }

    debug!(parent, child, relation = %relation, "nested collection");
    parent_schema.collections.push(NestedCollection {
      relation,
      child: child.to_owned(),
    });
    Ok(())
  }

  pub fn domain(&self, name: &str) -> Option<&DomainSchema> {
    self.domains.iter().find(|d| d.name == name)
  }

  /// Declared domains, in declaration order.
  pub fn domains(&self) -> impl Iterator<Item = &DomainSchema> {
    self.domains.iter()
  }

  /// Final cross-domain validation, then an immutable bundle. Declarations
  /// end here; either this succeeds once or startup must abort.
  pub fn seal(self) -> Result<SchemaBundle> {
    for domain in &self.domains {
      for coll in &domain.collections {
        if !self.domains.iter().any(|d| d.name == coll.child) {
          return Err(Error::UndeclaredChild {
            parent:   domain.name.clone(),
            relation: coll.relation.clone(),
            child:    coll.child.clone(),
          });
        }
      }
      if let Some(display) = &domain.display_field {
        if domain.field(display).is_none() {
          return Err(Error::UnknownField {
            domain: domain.name.clone(),
            field:  display.clone(),
          });
        }
      }
    }
    info!(domains = self.domains.len(), "schema sealed");
    Ok(SchemaBundle { domains: self.domains })
  }
}

// ─── Bundle ──────────────────────────────────────────────────────────────────

/// A sealed, validated schema: the read-only view the host runtime receives.
/// Serialises to JSON (derivations are code, not data, and are skipped).
#[derive(Debug, Serialize, Deserialize)]
pub struct SchemaBundle {
  domains: Vec<DomainSchema>,
}

impl SchemaBundle {
  pub fn domain(&self, name: &str) -> Option<&DomainSchema> {
    self.domains.iter().find(|d| d.name == name)
  }

  pub fn domains(&self) -> impl Iterator<Item = &DomainSchema> {
    self.domains.iter()
  }

  /// Validate a record and, recursively, every child record nested under it
  /// against the child's own domain schema.
  pub fn validate_record(&self, record: &Record) -> Result<()> {
    let schema = self
      .domain(&record.domain)
      .ok_or_else(|| Error::UnknownDomain(record.domain.clone()))?;
    schema.validate_record(record)?;
    for (_, children) in record.relations() {
      for child in children {
        self.validate_record(child)?;
      }
    }
    Ok(())
  }

  /// Serialise the bundle for the host or for inspection tooling.
  pub fn to_json(&self) -> Result<String> {
    Ok(serde_json::to_string(self)?)
  }

  pub fn to_json_pretty(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// One-shot, irreversible handoff to the host runtime.
  pub fn run<R: Runtime>(self, runtime: R) -> Result<(), R::Error> {
    runtime.run(self)
  }
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;
  use crate::{field::SelectOption, record::BEGIN_TIME};

  fn options(values: &[&str]) -> Vec<SelectOption> {
    values.iter().map(|v| SelectOption::new(*v)).collect()
  }

  fn registry() -> SchemaRegistry {
    let mut reg = SchemaRegistry::new();
    reg
      .declare(
        DomainSchema::builder("primate")
          .text_field("name")
          .unwrap()
          .select_field("sex", options(&["Male", "Female"]))
          .unwrap()
          .build()
          .unwrap(),
      )
      .unwrap();
    reg
      .declare(
        DomainSchema::builder("encounter")
          .select_field("mood", options(&["Happy", "Sad"]))
          .unwrap()
          .display_field("mood")
          .build()
          .unwrap(),
      )
      .unwrap();
    reg
  }

  #[test]
  fn duplicate_domain_is_rejected() {
    let mut reg = registry();
    let dup = DomainSchema::builder("primate").build().unwrap();
    let err = reg.declare(dup).unwrap_err();
    assert!(matches!(err, Error::DuplicateDomain(name) if name == "primate"));
  }

  #[test]
  fn nesting_requires_child_declared_first() {
    let mut reg = SchemaRegistry::new();
    reg
      .declare(DomainSchema::builder("primate").build().unwrap())
      .unwrap();
    let err = reg.nest("primate", "encounters", "encounter").unwrap_err();
    assert!(matches!(err, Error::UndeclaredChild { child, .. } if child == "encounter"));
  }

  #[test]
  fn nesting_requires_parent_declared() {
    let mut reg = SchemaRegistry::new();
    reg
      .declare(DomainSchema::builder("encounter").build().unwrap())
      .unwrap();
    let err = reg.nest("primate", "encounters", "encounter").unwrap_err();
    assert!(matches!(err, Error::UnknownDomain(name) if name == "primate"));
  }

  #[test]
  fn relation_must_not_shadow_a_field() {
    let mut reg = registry();
    let err = reg.nest("primate", "name", "encounter").unwrap_err();
    assert!(matches!(err, Error::NameCollision { name, .. } if name == "name"));
  }

  #[test]
  fn seal_preserves_declaration_order() {
    let mut reg = registry();
    reg.nest("primate", "encounters", "encounter").unwrap();
    let bundle = reg.seal().unwrap();
    let names: Vec<_> = bundle.domains().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["primate", "encounter"]);
  }

  #[test]
  fn bundle_round_trips_through_json() {
    let mut reg = registry();
    reg.nest("primate", "encounters", "encounter").unwrap();
    let bundle = reg.seal().unwrap();

    let json = serde_json::to_string(&bundle).unwrap();
    let back: SchemaBundle = serde_json::from_str(&json).unwrap();

    let primate = back.domain("primate").unwrap();
    assert_eq!(primate.fields.len(), 2);
    assert_eq!(primate.collections[0].relation, "encounters");
    assert_eq!(primate.collections[0].child, "encounter");
    assert_eq!(back.domain("encounter").unwrap().display_field.as_deref(), Some("mood"));
  }

  #[test]
  fn deep_validation_reaches_nested_children() {
    let mut reg = registry();
    reg.nest("primate", "encounters", "encounter").unwrap();
    let bundle = reg.seal().unwrap();

    let mut enc = Record::new("encounter");
    enc
      .set_choice("mood", "Grumpy")
      .set_timestamp(BEGIN_TIME, Utc.timestamp_opt(1000, 0).unwrap());
    let mut primate = Record::new("primate");
    primate
      .set_text("name", "Koko")
      .set_choice("sex", "Female")
      .push_child("encounters", enc);

    let err = bundle.validate_record(&primate).unwrap_err();
    assert!(matches!(err, Error::InvalidChoice { value, .. } if value == "Grumpy"));
  }

  #[test]
  fn deep_validation_accepts_a_well_formed_tree() {
    let mut reg = registry();
    reg.nest("primate", "encounters", "encounter").unwrap();
    let bundle = reg.seal().unwrap();

    let mut enc = Record::new("encounter");
    enc
      .set_choice("mood", "Happy")
      .set_timestamp(BEGIN_TIME, Utc.timestamp_opt(1000, 0).unwrap());
    let mut primate = Record::new("primate");
    primate
      .set_text("name", "Koko")
      .set_choice("sex", "Female")
      .push_child("encounters", enc);

    bundle.validate_record(&primate).unwrap();
  }

  #[test]
  fn record_in_undeclared_relation_is_rejected() {
    let bundle = registry().seal().unwrap();
    let mut primate = Record::new("primate");
    primate.push_child("encounters", Record::new("encounter"));
    let err = bundle.validate_record(&primate).unwrap_err();
    assert!(matches!(err, Error::UnknownRelation { relation, .. } if relation == "encounters"));
  }
}
