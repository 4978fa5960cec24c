use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::units::round2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonVerdict {
    RidepoolingBetter,
    RidepoolingWorse,
    Equal,
    /// Reference intensity is zero, no relative difference exists
    NotComparable,
}

/// Ridepooling against the reference mobility over the observation period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ComparisonResult {
    pub verdict: ComparisonVerdict,
    /// Relative difference of the intensities [%], `None` when not comparable
    pub percent_difference: Option<f64>,
    /// Ridepooling total minus reference total [kg CO2e]. Negative values are savings.
    pub absolute_difference_kg: f64,
    /// German summary sentence
    pub message: String,
}

/// "Im Betrachtungszeitraum", with the dates when both bounds are known
fn period_phrase(period: Option<(NaiveDate, NaiveDate)>) -> String {
    match period {
        Some((start, end)) => format!("Im Betrachtungszeitraum ({} bis {})", start.format("%d.%m.%Y"), end.format("%d.%m.%Y")),
        None => "Im Betrachtungszeitraum".to_string(),
    }
}

/// Compares the per-person-km intensities [kg CO2e/pkm] and the totals [kg CO2e].
/// `period` holds the observation period bounds used in the message.
pub fn compare(
    ridepooling_per_pkm: f64,
    reference_per_pkm: f64,
    ridepooling_total_kg: f64,
    reference_total_kg: f64,
    period: Option<(NaiveDate, NaiveDate)>,
) -> ComparisonResult {
    let absolute_difference_kg = ridepooling_total_kg - reference_total_kg;
    if reference_per_pkm == 0.0 {
        return ComparisonResult {
            verdict: ComparisonVerdict::NotComparable,
            percent_difference: None,
            absolute_difference_kg,
            message: "Die Emissionen der alternativen Verkehrsmittel betragen 0 g CO2eq/pkm. Ein prozentualer Vergleich ist nicht möglich.".to_string(),
        };
    }
    let (verdict, percent_difference) = if ridepooling_per_pkm < reference_per_pkm {
        (ComparisonVerdict::RidepoolingBetter, (reference_per_pkm - ridepooling_per_pkm) / reference_per_pkm * 100.0)
    } else if ridepooling_per_pkm > reference_per_pkm {
        (ComparisonVerdict::RidepoolingWorse, (ridepooling_per_pkm - reference_per_pkm) / reference_per_pkm * 100.0)
    } else {
        (ComparisonVerdict::Equal, 0.0)
    };
    let message = match verdict {
        ComparisonVerdict::RidepoolingBetter => format!(
            "Das Ridepooling-System ist um {:.2}% klimafreundlicher als die alternativen Verkehrsmittel. {} wurden {:.2} kg CO2eq eingespart.",
            percent_difference,
            period_phrase(period),
            -absolute_difference_kg
        ),
        ComparisonVerdict::RidepoolingWorse => format!(
            "Das Ridepooling-System ist um {:.2}% klimaschädlicher als die alternativen Verkehrsmittel. {} wurden {:.2} kg CO2eq zusätzlich ausgestoßen.",
            percent_difference,
            period_phrase(period),
            absolute_difference_kg
        ),
        _ => "Das Ridepooling-System ist genauso klimafreundlich wie die alternativen Verkehrsmittel.".to_string(),
    };
    ComparisonResult {
        verdict,
        percent_difference: Some(percent_difference),
        absolute_difference_kg,
        message,
    }
}

impl ComparisonResult {
    /// Percent difference rounded for display
    pub fn percent_display(&self) -> Option<f64> {
        self.percent_difference.map(round2)
    }
}
