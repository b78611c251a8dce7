//! List rows - The compact article shape returned by the paginated index endpoint.

use serde::{Deserialize, Serialize};

/// One row of the article list
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleSummary {
    pub uuid: String,
    pub code: String,
    pub description: String,
    /// Parent offer, when the article is tied to one
    pub offer: Option<OfferRef>,
    pub category: Option<String>,
    pub visible: bool,
    pub has_attachment: bool,
}

/// Minimal offer reference used in list rows
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferRef {
    pub uuid: String,
    pub code: String,
}

/// Paginated response envelope
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            current_page: 1,
            last_page: 1,
            per_page: 0,
            total: 0,
        }
    }
}
