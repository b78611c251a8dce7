//! Page props - What the backend hands the create and edit pages on load.

use super::{Article, Catalogs, Offer};
use serde::{Deserialize, Serialize};

/// Productivity baselines computed upstream from offer data. Read-only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaValues {
    pub expected_boxes_per_hour_piece: Option<f64>,
    pub expected_pieces_per_hour_station: Option<f64>,
}

/// Props of the create page
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatePageProps {
    #[serde(flatten)]
    pub catalogs: Catalogs,
    /// Offer the new article is created for, when opened from an offer
    pub offer: Option<Offer>,
    /// Article being duplicated, when opened from a duplicate action
    pub source_article: Option<Article>,
    pub media_values: MediaValues,
}

/// Props of the edit page
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditPageProps {
    pub article: Article,
    #[serde(flatten)]
    pub catalogs: Catalogs,
    pub media_values: MediaValues,
    /// Precomputed actual pieces/hour/station shown while the input is not numeric
    pub actual_pieces_per_hour_station: Option<f64>,
}
