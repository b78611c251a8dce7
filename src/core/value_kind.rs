//! Machinery value kinds.
//!
//! The backend declares the input shape of each machinery parameter as a plain
//! string: `"testo"` for free text, `"numero"` for a number, or a comma-delimited
//! list of options. Anything else leaves the value read-only. The string is decoded
//! once, when the page configuration is assembled, and never re-parsed afterwards.

use crate::core::derived::parse_number;

/// Reserved kind string for free-text values
pub const FREE_TEXT: &str = "testo";
/// Reserved kind string for numeric values
pub const NUMERIC: &str = "numero";

/// One choice of an enumerated machinery parameter, keyed by its 0-based position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumOption {
    pub key: usize,
    pub label: String,
}

/// Declared input shape of a machinery parameter
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ValueKind {
    FreeText,
    Numeric,
    Enumerated(Vec<EnumOption>),
    /// No usable declaration: the value input is disabled.
    #[default]
    ReadOnly,
}

impl ValueKind {
    /// Decodes the backend's declared value type.
    #[must_use]
    pub fn decode(declared: &str) -> Self {
        match declared {
            FREE_TEXT => Self::FreeText,
            NUMERIC => Self::Numeric,
            list if list.contains(',') => Self::Enumerated(
                list.split(',')
                    .map(str::trim)
                    .enumerate()
                    .map(|(key, label)| EnumOption {
                        key,
                        label: label.to_string(),
                    })
                    .collect(),
            ),
            _ => Self::ReadOnly,
        }
    }

    /// Same as `decode`, treating a missing declaration as read-only.
    #[must_use]
    pub fn decode_opt(declared: Option<&str>) -> Self {
        declared.map_or(Self::ReadOnly, Self::decode)
    }

    #[must_use]
    pub const fn is_editable(&self) -> bool {
        !matches!(self, Self::ReadOnly)
    }

    /// Whether a non-empty value fits this kind. Enumerated values are option keys.
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::FreeText => true,
            Self::Numeric => parse_number(value).is_some(),
            Self::Enumerated(options) => value
                .parse::<usize>()
                .is_ok_and(|key| options.iter().any(|o| o.key == key)),
            Self::ReadOnly => false,
        }
    }

    /// Label to display for a stored value.
    #[must_use]
    pub fn display<'a>(&'a self, value: &'a str) -> &'a str {
        if let Self::Enumerated(options) = self {
            if let Some(option) = value
                .parse::<usize>()
                .ok()
                .and_then(|key| options.iter().find(|o| o.key == key))
            {
                return &option.label;
            }
        }
        value
    }
}
