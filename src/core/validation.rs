//! Client-side field validation.
//!
//! Validation here is advisory: it never blocks a submission, and the backend
//! re-validates everything. Errors are recomputed on every change but a field's
//! error is only shown once the field has been blurred at least once; from then on
//! it follows the value live.

use crate::core::derived::parse_number;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, BTreeSet};

/// Maximum length of ordinary text fields
pub const MAX_TEXT_LENGTH: usize = 255;

/// A single validation rule
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Must contain something other than whitespace
    Required,
    /// At most this many characters
    MaxLength(usize),
    /// Empty, or a finite number that is not negative
    NonNegativeNumber,
    /// Empty, or an ISO date within the inclusive range
    DateInRange { from: NaiveDate, to: NaiveDate },
}

impl Rule {
    /// Plausible range for approval dates.
    #[must_use]
    pub fn approval_date() -> Self {
        Self::DateInRange {
            from: NaiveDate::from_ymd_opt(2005, 1, 1).unwrap_or(NaiveDate::MIN),
            to: NaiveDate::from_ymd_opt(2099, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }

    fn check(self, value: &str) -> Option<String> {
        match self {
            Self::Required if value.trim().is_empty() => Some("This field is required.".to_string()),
            Self::MaxLength(max) if value.chars().count() > max => {
                Some(format!("This field may not be longer than {max} characters."))
            }
            Self::NonNegativeNumber if !value.trim().is_empty() => match parse_number(value) {
                None => Some("This field must be a number.".to_string()),
                Some(n) if n < 0.0 => Some("This field may not be negative.".to_string()),
                Some(_) => None,
            },
            Self::DateInRange { from, to } if !value.trim().is_empty() => {
                match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
                    Err(_) => Some("This field must be a valid date.".to_string()),
                    Ok(date) if date < from || date > to => Some(format!(
                        "The date must be between {} and {}.",
                        from.format("%d/%m/%Y"),
                        to.format("%d/%m/%Y")
                    )),
                    Ok(_) => None,
                }
            }
            _ => None,
        }
    }
}

/// Runs `rules` in order and returns the first failure.
#[must_use]
pub fn validate(value: &str, rules: &[Rule]) -> Option<String> {
    rules.iter().find_map(|rule| rule.check(value))
}

/// Field name -> message. Field names are the wire names the backend uses, so the
/// client and server maps share one key space.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorMap(BTreeMap<String, String>);

impl ErrorMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keeps only the entries whose field passes `keep`.
    #[must_use]
    pub fn filtered(&self, keep: impl Fn(&str) -> bool) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(field, _)| keep(field))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Unions client and server errors. When both report the same field the
    /// client message is the one displayed.
    #[must_use]
    pub fn merge(client: &Self, server: &Self) -> Self {
        let mut merged = server.clone();
        for (field, message) in &client.0 {
            merged.0.insert(field.clone(), message.clone());
        }
        merged
    }
}

impl FromIterator<(String, String)> for ErrorMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for ErrorMap {
    /// Accepts `{"field": ["message", ...]}` or `{"field": "message"}` and keeps the
    /// first message of each field.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Messages {
            Many(Vec<String>),
            One(String),
        }

        let raw = BTreeMap::<String, Messages>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(field, messages)| match messages {
                Messages::One(message) => Some((field, message)),
                Messages::Many(list) => list.into_iter().next().map(|m| (field, m)),
            })
            .collect())
    }
}

/// Fields that have lost focus at least once
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Touched {
    fields: BTreeSet<String>,
    all: bool,
}

impl Touched {
    pub fn blur(&mut self, field: impl Into<String>) {
        self.fields.insert(field.into());
    }

    /// Marks every field as touched, used when the form is submitted.
    pub fn touch_all(&mut self) {
        self.all = true;
    }

    #[must_use]
    pub fn is_touched(&self, field: &str) -> bool {
        self.all || self.fields.contains(field)
    }

    /// The subset of `errors` the user should currently see.
    #[must_use]
    pub fn visible(&self, errors: &ErrorMap) -> ErrorMap {
        errors.filtered(|field| self.is_touched(field))
    }
}
