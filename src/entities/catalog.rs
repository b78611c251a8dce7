//! Reference catalogs - Read-only lookup data supplied with every page load.
//!
//! Offers, categories, pallet types, machinery, materials, critical issues, the three
//! instruction families, quality-control models, pallet sheets, and the keyed option
//! lists behind the enumerated article fields.

use serde::{Deserialize, Serialize};

/// Commercial offer an article belongs to
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Offer {
    pub uuid: String,
    pub code: String,
    pub description: Option<String>,
    /// Default unit of measure for articles and check-materials of this offer
    pub unit_of_measure: Option<String>,
    pub pieces_per_package: Option<f64>,
}

/// Machinery parameter with its declared value type (`"testo"`, `"numero"`, or a
/// comma-delimited option list). Decoded into a `ValueKind` when the page loads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Machinery {
    pub uuid: String,
    pub name: String,
    pub value_type: Option<String>,
}

/// Generic catalog entry: categories, pallet types, materials, critical issues,
/// instructions, CQ models, pallet sheets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupEntry {
    pub uuid: String,
    pub code: Option<String>,
    #[serde(alias = "description")]
    pub name: String,
}

/// Keyed option of an enumerated field
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOption {
    pub key: String,
    pub label: String,
}

/// Every catalog a create or edit page needs
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalogs {
    pub offers: Vec<Offer>,
    pub categories: Vec<LookupEntry>,
    pub pallet_types: Vec<LookupEntry>,
    pub machinery: Vec<Machinery>,
    pub materials: Vec<LookupEntry>,
    pub critical_issues: Vec<LookupEntry>,
    pub packaging_instructions: Vec<LookupEntry>,
    pub operating_instructions: Vec<LookupEntry>,
    pub palletizing_instructions: Vec<LookupEntry>,
    pub cq_models: Vec<LookupEntry>,
    pub pallet_sheets: Vec<LookupEntry>,
    pub lot_attributions: Vec<ListOption>,
    pub expiration_attributions: Vec<ListOption>,
    pub dbs: Vec<ListOption>,
    pub label_options: Vec<ListOption>,
    pub weight_controls: Vec<ListOption>,
}

impl Catalogs {
    /// Looks up an offer by uuid.
    #[must_use]
    pub fn offer(&self, uuid: &str) -> Option<&Offer> {
        self.offers.iter().find(|o| o.uuid == uuid)
    }

    #[must_use]
    pub fn machinery(&self, uuid: &str) -> Option<&Machinery> {
        self.machinery.iter().find(|m| m.uuid == uuid)
    }
}
