use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Rejections at the input boundary. Values outside declared bounds never
/// reach the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("'{field}' must be a finite non-negative number, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("'{field}' must be within [{min}; {max}], got {value}")]
    OutOfRange { field: &'static str, value: f64, min: f64, max: f64 },
    #[error("observation period start {start} is after its end {end}")]
    PeriodInverted { start: NaiveDate, end: NaiveDate },
    #[error("observation period end {end} lies in the future (today is {today})")]
    PeriodInFuture { end: NaiveDate, today: NaiveDate },
    #[error("no vehicle at position {0}")]
    NoSuchVehicle(usize),
    #[error("fleet is empty")]
    EmptyFleet,
    #[error("unknown vehicle type '{0}'")]
    UnknownVehicleType(String),
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
    #[error("no methodology selected")]
    NoMethodology,
    #[error("methodology '{selected}' is already selected; reset the reference mobility before switching to '{requested}'")]
    MethodologyLocked { selected: String, requested: String },
    #[error("transport mode '{mode}' is not part of methodology '{methodology}'")]
    ModeNotInMethodology { mode: String, methodology: String },
    #[error("distances do not apply to methodology '{0}'")]
    DistancesNotApplicable(String),
}

impl InputError {
    pub fn check_non_negative(field: &'static str, value: f64) -> Result<(), InputError> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(InputError::Negative { field, value })
        }
    }
    pub fn check_percent(field: &'static str, value: f64) -> Result<(), InputError> {
        if value.is_finite() && (0.0..=100.0).contains(&value) {
            Ok(())
        } else {
            Err(InputError::OutOfRange { field, value, min: 0.0, max: 100.0 })
        }
    }
}

/// Pipeline stages in the order data flows through them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Performance,
    RidepoolingEmissions,
    ReferenceMobility,
    Comparison,
}

/// A stage could not run because upstream inputs are not provided yet.
/// The stage output stays empty; nothing is raised.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MissingPrerequisite {
    pub stage: Stage,
    pub missing_fields: Vec<String>,
}

impl MissingPrerequisite {
    pub fn new(stage: Stage, missing_fields: &[&str]) -> Self {
        MissingPrerequisite {
            stage,
            missing_fields: missing_fields.iter().map(|field| field.to_string()).collect(),
        }
    }
    /// User-facing message naming the missing fields
    pub fn message(&self) -> String {
        format!("Die folgenden Angaben fehlen: {}", self.missing_fields.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_checks() {
        assert!(InputError::check_non_negative("x", 0.0).is_ok());
        assert!(InputError::check_non_negative("x", -0.1).is_err());
        assert!(InputError::check_non_negative("x", f64::INFINITY).is_err());
        assert!(InputError::check_percent("share", 100.0).is_ok());
        assert_eq!(
            InputError::check_percent("share", 100.5),
            Err(InputError::OutOfRange { field: "share", value: 100.5, min: 0.0, max: 100.0 })
        );
    }
    #[test]
    fn test_missing_message() {
        let missing = MissingPrerequisite::new(Stage::Performance, &["completed_bookings", "passengers_transported"]);
        assert_eq!(missing.message(), "Die folgenden Angaben fehlen: completed_bookings, passengers_transported");
    }
}
