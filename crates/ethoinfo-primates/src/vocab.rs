//! Closed vocabularies for the primate-observation domains.
//!
//! Each enum is the single source of truth for its select field: the option
//! list shown on a form is generated from the variants, so a value outside
//! the enumeration cannot be declared, only rejected.

use ethoinfo_core::field::SelectOption;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator};

/// Sex of an observed primate.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumIter,
)]
pub enum Sex {
  Male,
  Female,
}

/// Coarse age class of an observed primate.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumIter,
)]
pub enum AgeClass {
  Young,
  Old,
}

/// Apparent mood during an encounter. Doubles as the encounter's display
/// label.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumIter,
)]
pub enum Mood {
  Happy,
  Sad,
}

/// One option per variant, in declaration order.
fn options_of<T: IntoEnumIterator + AsRef<str>>() -> Vec<SelectOption> {
  T::iter().map(|v| SelectOption::new(v.as_ref())).collect()
}

impl Sex {
  pub fn options() -> Vec<SelectOption> {
    options_of::<Self>()
  }
}

impl AgeClass {
  pub fn options() -> Vec<SelectOption> {
    options_of::<Self>()
  }
}

impl Mood {
  pub fn options() -> Vec<SelectOption> {
    options_of::<Self>()
  }
}
