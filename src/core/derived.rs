//! Derived productivity figures.
//!
//! Expected figures come from the backend (upstream offer data) and are only
//! formatted. The actual pieces/hour/station figure is recomputed from the draft on
//! every read: actual boxes/hour/piece times pieces per package.

use crate::entities::MediaValues;

/// Decimal digits used for every productivity figure
pub const METRIC_DECIMALS: usize = 5;

/// Parses a user-entered number. Surrounding whitespace is ignored; anything that
/// is not a finite number yields `None`.
#[must_use]
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Formats a productivity figure with five decimals.
#[must_use]
pub fn format_metric(value: f64) -> String {
    format!("{value:.prec$}", prec = METRIC_DECIMALS)
}

/// Formats an optional figure, rendering absence as zero.
#[must_use]
pub fn format_optional_metric(value: Option<f64>) -> String {
    format_metric(value.unwrap_or(0.0))
}

/// Computes actual pieces/hour/station.
///
/// When either input is missing or not numeric the `fallback` is shown instead:
/// the edit page passes the server's precomputed figure, the create page passes
/// `None`, which renders as `0.00000`.
#[must_use]
pub fn actual_pieces_per_hour_station(
    actual_boxes_per_hour_piece: &str,
    pieces_per_package: &str,
    fallback: Option<f64>,
) -> String {
    match (
        parse_number(actual_boxes_per_hour_piece),
        parse_number(pieces_per_package),
    ) {
        (Some(boxes), Some(pieces)) => format_metric(boxes * pieces),
        _ => format_optional_metric(fallback),
    }
}

/// Productivity block displayed next to the packaging fields. All read-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Productivity {
    pub expected_boxes_per_hour_piece: String,
    pub expected_pieces_per_hour_station: String,
    pub actual_pieces_per_hour_station: String,
}

impl Productivity {
    #[must_use]
    pub fn resolve(
        media: &MediaValues,
        actual_boxes_per_hour_piece: &str,
        pieces_per_package: &str,
        fallback: Option<f64>,
    ) -> Self {
        Self {
            expected_boxes_per_hour_piece: format_optional_metric(
                media.expected_boxes_per_hour_piece,
            ),
            expected_pieces_per_hour_station: format_optional_metric(
                media.expected_pieces_per_hour_station,
            ),
            actual_pieces_per_hour_station: actual_pieces_per_hour_station(
                actual_boxes_per_hour_piece,
                pieces_per_package,
                fallback,
            ),
        }
    }
}
