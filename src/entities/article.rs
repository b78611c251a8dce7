//! Article entity - The product/packaging data sheet being authored.
//!
//! An article belongs to an offer, carries packaging quantities, a handful of flags,
//! four approval stages, and several many-valued relations (machinery parameters,
//! instructions, materials, critical issues, check-materials).

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Article as returned by the backend for editing or duplication
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    /// Backend identifier
    pub uuid: String,
    /// Internal article code
    pub code: String,
    /// Main description
    pub description: String,
    pub additional_descriptions: Option<String>,
    pub customer_code: Option<String>,
    /// Offer this article belongs to
    pub offer_uuid: Option<String>,
    pub article_category_uuid: Option<String>,
    pub pallet_type_uuid: Option<String>,
    pub cq_model_uuid: Option<String>,
    pub pallet_sheet_uuid: Option<String>,
    pub unit_of_measure: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    pub pieces_per_package: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    pub plan_packaging: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    pub pallet_plan: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    pub actual_boxes_per_hour_piece: Option<String>,
    pub visible: bool,
    pub stock_managed: bool,
    pub allergens: bool,
    /// Keys into the corresponding `ListOption` catalogs
    pub lot_attribution: Option<String>,
    pub expiration_attribution: Option<String>,
    pub db: Option<String>,
    pub labels_external: Option<String>,
    pub labels_pvp: Option<String>,
    pub labels_ingredients: Option<String>,
    pub weight_control: Option<String>,
    pub notes: Option<String>,
    pub production_approval: Approval,
    pub quality_approval: Approval,
    pub commercial_approval: Approval,
    pub client_approval: Approval,
    /// Stored attachment reference, if any
    pub attachment: Option<String>,
    pub machinery: Vec<MachineryRef>,
    pub materials: Vec<RelationRef>,
    pub critical_issues: Vec<RelationRef>,
    pub packaging_instructions: Vec<RelationRef>,
    pub operating_instructions: Vec<RelationRef>,
    pub palletizing_instructions: Vec<RelationRef>,
    pub check_materials: Vec<CheckMaterialRef>,
}

/// The article a new one is duplicated from. Same shape as any article.
pub type SourceArticle = Article;

/// One approval stage. No cross-field rule ties `approved` to the other fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Approval {
    pub approved: bool,
    pub employee: Option<String>,
    #[serde(deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Reference to a related entity by uuid
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRef {
    pub uuid: String,
}

/// Machinery parameter assigned to an article
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineryRef {
    pub machinery_uuid: String,
    #[serde(deserialize_with = "number_or_string")]
    pub value: Option<String>,
}

/// Check-material verification entry
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckMaterialRef {
    pub material_uuid: String,
    pub unit_of_measure: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    pub quantity_expected: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    pub quantity_effective: Option<String>,
}

/// Accepts a JSON number, string, or null and keeps it as text, which is how
/// the form edits it.
fn number_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(serde_json::Number),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n.to_string()),
        Some(Raw::Text(s)) => Some(s),
        None => None,
    })
}

/// Reads the calendar date of a `YYYY-MM-DD` value or of a timestamp starting
/// with one. A date that does not parse is read as unset so the page still loads.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|raw| {
        let day = raw.trim().split(['T', ' ']).next().unwrap_or_default();
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }))
}
