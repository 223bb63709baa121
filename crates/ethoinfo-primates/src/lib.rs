//! Primate-observation domain pack for ethoinfo.
//!
//! Declares two domains to the schema registry: `primate` (name, sex, age)
//! and `encounter` (mood), with encounters nested as a collection owned by
//! each primate. Encounters carry interval derivations: begin time is the
//! stored timestamp, end time falls back to the current wall clock while the
//! encounter is still open. Pure synchronous; no I/O dependencies.
//!
//! # Quick start
//!
//! ```
//! use ethoinfo_core::registry::SchemaRegistry;
//!
//! let mut registry = SchemaRegistry::new();
//! ethoinfo_primates::install(&mut registry).unwrap();
//! let bundle = registry.seal().unwrap();
//! assert!(bundle.domain("primate").is_some());
//! ```

mod vocab;

use chrono::{DateTime, Utc};
use ethoinfo_core::{
  Error, Result,
  domain::DomainSchema,
  record::{BEGIN_TIME, END_TIME, Record},
  registry::SchemaRegistry,
};
pub use vocab::{AgeClass, Mood, Sex};

/// Domain name for primate records.
pub const PRIMATE: &str = "primate";
/// Domain name for encounter records.
pub const ENCOUNTER: &str = "encounter";
/// Relation name under which a primate owns its encounters.
pub const ENCOUNTERS: &str = "encounters";

// ─── Domain schemas ──────────────────────────────────────────────────────────

/// The `primate` domain: free-text name plus two enumerated fields.
pub fn primate_domain() -> Result<DomainSchema> {
  DomainSchema::builder(PRIMATE)
    .text_field("name")?
    .select_field("sex", Sex::options())?
    .select_field("age", AgeClass::options())?
    .build()
}

/// The `encounter` domain: mood select, interval derivations, and `mood` as
/// the display field.
pub fn encounter_domain() -> Result<DomainSchema> {
  DomainSchema::builder(ENCOUNTER)
    .select_field("mood", Mood::options())?
    .begin_time(|rec| {
      // Every valid encounter has a begin timestamp; its absence is a
      // broken record, not an open interval.
      rec.timestamp(BEGIN_TIME).ok_or_else(|| Error::MissingField {
        domain: ENCOUNTER.to_owned(),
        field:  BEGIN_TIME.to_owned(),
      })
    })
    .end_time(|rec| {
      // Open encounter: duration is measured up to now, read fresh on
      // every evaluation.
      Ok(rec.timestamp(END_TIME).unwrap_or_else(Utc::now))
    })
    .display_field("mood")
    .build()
}

/// Declare both domains and nest `encounters` under `primate`.
pub fn install(registry: &mut SchemaRegistry) -> Result<()> {
  registry.declare(primate_domain()?)?;
  registry.declare(encounter_domain()?)?;
  registry.nest(PRIMATE, ENCOUNTERS, ENCOUNTER)
}

// ─── Record constructors ─────────────────────────────────────────────────────

/// A well-formed primate record with no encounters yet.
pub fn new_primate(name: &str, sex: Sex, age: AgeClass) -> Record {
  let mut rec = Record::new(PRIMATE);
  rec
    .set_text("name", name)
    .set_choice("sex", sex.as_ref())
    .set_choice("age", age.as_ref());
  rec
}

/// A well-formed encounter record. `end` is `None` while the encounter is
/// still open.
pub fn new_encounter(
  mood: Mood,
  begin: DateTime<Utc>,
  end: Option<DateTime<Utc>>,
) -> Record {
  let mut rec = Record::new(ENCOUNTER);
  rec.set_choice("mood", mood.as_ref()).set_timestamp(BEGIN_TIME, begin);
  if let Some(end) = end {
    rec.set_timestamp(END_TIME, end);
  }
  rec
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
  }

  #[test]
  fn closed_encounter_derives_stored_interval() {
    let schema = encounter_domain().unwrap();
    let enc = new_encounter(Mood::Happy, ts(1000), Some(ts(2000)));

    assert_eq!(schema.begin_time_of(&enc).unwrap(), ts(1000));
    assert_eq!(schema.end_time_of(&enc).unwrap(), ts(2000));
  }

  #[test]
  fn open_encounter_end_time_reads_the_clock() {
    let schema = encounter_domain().unwrap();
    let enc = new_encounter(Mood::Happy, ts(1000), None);

    let before = Utc::now();
    let derived = schema.end_time_of(&enc).unwrap();
    let after = Utc::now();

    assert_eq!(schema.begin_time_of(&enc).unwrap(), ts(1000));
    assert!(derived >= ts(1000));
    assert!(derived >= before && derived <= after);
  }

  #[test]
  fn open_encounter_end_time_is_nondecreasing_across_calls() {
    let schema = encounter_domain().unwrap();
    let enc = new_encounter(Mood::Sad, ts(1000), None);

    let first = schema.end_time_of(&enc).unwrap();
    let second = schema.end_time_of(&enc).unwrap();
    assert!(second >= first);
  }

  #[test]
  fn encounter_without_begin_time_is_a_broken_record() {
    let schema = encounter_domain().unwrap();
    let mut enc = Record::new(ENCOUNTER);
    enc.set_choice("mood", "Happy");

    let err = schema.begin_time_of(&enc).unwrap_err();
    assert!(matches!(err, Error::MissingField { field, .. } if field == BEGIN_TIME));
  }

  #[test]
  fn sad_encounter_is_described_as_sad() {
    let schema = encounter_domain().unwrap();
    let enc = new_encounter(Mood::Sad, ts(1000), None);
    assert_eq!(schema.short_description(&enc).unwrap(), "Sad");
  }

  #[test]
  fn install_seals_cleanly() {
    let mut registry = SchemaRegistry::new();
    install(&mut registry).unwrap();
    let bundle = registry.seal().unwrap();

    let primate = bundle.domain(PRIMATE).unwrap();
    assert_eq!(primate.collections.len(), 1);
    assert_eq!(primate.collections[0].relation, ENCOUNTERS);
    assert_eq!(primate.collections[0].child, ENCOUNTER);
  }

  #[test]
  fn a_primate_with_encounters_validates_deeply() {
    let mut registry = SchemaRegistry::new();
    install(&mut registry).unwrap();
    let bundle = registry.seal().unwrap();

    let mut koko = new_primate("Koko", Sex::Female, AgeClass::Old);
    koko.push_child(
      ENCOUNTERS,
      new_encounter(Mood::Happy, ts(1000), Some(ts(2000))),
    );
    koko.push_child(ENCOUNTERS, new_encounter(Mood::Sad, ts(3000), None));

    bundle.validate_record(&koko).unwrap();
    assert_eq!(koko.children(ENCOUNTERS).len(), 2);
  }

  #[test]
  fn a_value_outside_the_vocabulary_is_rejected() {
    let mut registry = SchemaRegistry::new();
    install(&mut registry).unwrap();
    let bundle = registry.seal().unwrap();

    let mut rec = Record::new(PRIMATE);
    rec.set_choice("sex", "Unknown");
    let err = bundle.validate_record(&rec).unwrap_err();
    assert!(matches!(err, Error::InvalidChoice { value, .. } if value == "Unknown"));
  }

  #[test]
  fn schema_bundle_serialises_the_vocabularies() {
    let mut registry = SchemaRegistry::new();
    install(&mut registry).unwrap();
    let bundle = registry.seal().unwrap();

    let json = serde_json::to_value(&bundle).unwrap();
    let domains = json["domains"].as_array().unwrap();
    assert_eq!(domains.len(), 2);
    assert_eq!(domains[1]["fields"][0]["name"], "mood");
    assert_eq!(domains[1]["fields"][0]["options"][0]["value"], "Happy");
    assert_eq!(domains[1]["display_field"], "mood");
  }
}
