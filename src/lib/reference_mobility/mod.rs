//! Reference mobility: the trips ridepooling passengers would have made
//! with other transport modes, and their emissions.
//!
//! One contract ([`ReferenceMobilityCalculator`]) with four strategies,
//! selected through [`Methodology`].

mod calculators;
pub mod modes;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::{EPSILON, GRAMS_PER_KG};
use crate::errors::InputError;
use crate::performance::{PerformanceMetrics, ServiceVolume};
use crate::units::ratio;

pub use self::calculators::{ModalSplitPkm, ModalSplitTrips, SurveyPkm, SurveyTrips};
pub use self::modes::{TransportMode, MODAL_SPLIT_MODES, SURVEY_MODES};

/// Input methodology for the reference mobility. Chosen once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Methodology {
    /// Share of passengers per mode × trip distance
    ModalSplitTrips,
    /// Share of ridepooling person-km per mode
    ModalSplitPkm,
    /// Survey share of passengers per mode (incl. induced traffic) × trip distance
    SurveyTrips,
    /// Survey share of ridepooling person-km per mode (incl. induced traffic)
    SurveyPkm,
}

impl Methodology {
    pub const ALL: [Methodology; 4] = [
        Methodology::ModalSplitTrips,
        Methodology::ModalSplitPkm,
        Methodology::SurveyTrips,
        Methodology::SurveyPkm,
    ];
    pub fn label(&self) -> &'static str {
        match self {
            Methodology::ModalSplitTrips => "Modal Split (Wege)",
            Methodology::ModalSplitPkm => "Modal Split (Pkm)",
            Methodology::SurveyTrips => "Umfrage (Wege)",
            Methodology::SurveyPkm => "Umfrage (Pkm)",
        }
    }
    pub fn from_label(label: &str) -> Option<Self> {
        Methodology::ALL.iter().copied().find(|methodology| methodology.label() == label)
    }
    pub fn modes(&self) -> &'static [TransportMode] {
        match self {
            Methodology::ModalSplitTrips | Methodology::ModalSplitPkm => &MODAL_SPLIT_MODES,
            Methodology::SurveyTrips | Methodology::SurveyPkm => &SURVEY_MODES,
        }
    }
    /// Trip-based variants multiply passengers by a per-mode distance
    pub fn is_trip_based(&self) -> bool {
        matches!(self, Methodology::ModalSplitTrips | Methodology::SurveyTrips)
    }
    pub fn calculator(&self) -> &'static dyn ReferenceMobilityCalculator {
        match self {
            Methodology::ModalSplitTrips => &ModalSplitTrips,
            Methodology::ModalSplitPkm => &ModalSplitPkm,
            Methodology::SurveyTrips => &SurveyTrips,
            Methodology::SurveyPkm => &SurveyPkm,
        }
    }
}

impl fmt::Display for Methodology {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Where trip distances per mode come from (trip-based methodologies)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DistanceBasis {
    /// Ridepooling distance per booking with passengers on board, for every mode
    #[default]
    LoadedTripDistance,
    /// Ridepooling distance per booking including empty runs, for every mode
    TripDistanceInclEmpty,
    /// Average trip lengths per mode after MiD 2017
    Mid2017,
    /// User-supplied distance per mode
    Custom,
}

impl DistanceBasis {
    pub const ALL: [DistanceBasis; 4] = [
        DistanceBasis::LoadedTripDistance,
        DistanceBasis::TripDistanceInclEmpty,
        DistanceBasis::Mid2017,
        DistanceBasis::Custom,
    ];
    pub fn label(&self) -> &'static str {
        match self {
            DistanceBasis::LoadedTripDistance => "Durchschnittliche Fahrtdistanz je Buchung (mit Fahrgast)",
            DistanceBasis::TripDistanceInclEmpty => "Durchschnittliche Fahrtdistanz je Buchung (einschließlich Leerkilometern)",
            DistanceBasis::Mid2017 => "Durchschnittliche Reiseweiten nach MID 2017",
            DistanceBasis::Custom => "Eigene Angaben",
        }
    }
    pub fn from_label(label: &str) -> Option<Self> {
        DistanceBasis::ALL.iter().copied().find(|basis| basis.label() == label)
    }
}

/// User inputs of the reference mobility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReferenceInputs {
    pub methodology: Methodology,
    /// Share per mode [%]. Missing modes count as 0.
    pub shares: BTreeMap<TransportMode, f64>,
    pub distance_basis: DistanceBasis,
    /// Distance per mode [km], used with `DistanceBasis::Custom`
    pub custom_distances: BTreeMap<TransportMode, f64>,
    /// Emission factor per mode [g CO2e/pkm]
    pub emission_factors: BTreeMap<TransportMode, f64>,
}

impl ReferenceInputs {
    /// Empty shares, ridepooling trip distance and the UBA 2022 factors
    pub fn new(methodology: Methodology) -> Self {
        ReferenceInputs {
            methodology,
            shares: methodology.modes().iter().map(|mode| (*mode, 0.0)).collect(),
            distance_basis: DistanceBasis::default(),
            custom_distances: BTreeMap::new(),
            emission_factors: methodology.modes().iter().map(|mode| (*mode, mode.default_emission_factor())).collect(),
        }
    }
    pub fn share(&self, mode: TransportMode) -> f64 {
        self.shares.get(&mode).copied().unwrap_or(0.0)
    }
    pub fn emission_factor(&self, mode: TransportMode) -> f64 {
        self.emission_factors.get(&mode).copied().unwrap_or(0.0)
    }
    pub fn distance(&self, mode: TransportMode, context: &RidepoolingContext) -> f64 {
        match self.distance_basis {
            DistanceBasis::LoadedTripDistance => context.avg_distance_per_booking_loaded,
            DistanceBasis::TripDistanceInclEmpty => context.avg_distance_per_booking_incl_empty,
            DistanceBasis::Mid2017 => mode.mid_2017_distance(),
            DistanceBasis::Custom => self.custom_distances.get(&mode).copied().unwrap_or(0.0),
        }
    }
    pub fn share_sum(&self) -> f64 {
        self.methodology.modes().iter().map(|mode| self.share(*mode)).sum()
    }
    fn check_mode(&self, mode: TransportMode) -> Result<(), InputError> {
        if self.methodology.modes().contains(&mode) {
            Ok(())
        } else {
            Err(InputError::ModeNotInMethodology {
                mode: mode.label().to_string(),
                methodology: self.methodology.label().to_string(),
            })
        }
    }
    /// Checks every entry against the declared bounds and the mode set
    pub fn validate(&self) -> Result<(), InputError> {
        for (mode, share) in self.shares.iter() {
            self.check_mode(*mode)?;
            InputError::check_percent("share_percent", *share)?;
        }
        if !self.custom_distances.is_empty() && !self.methodology.is_trip_based() {
            return Err(InputError::DistancesNotApplicable(self.methodology.label().to_string()));
        }
        for (mode, distance) in self.custom_distances.iter() {
            self.check_mode(*mode)?;
            InputError::check_non_negative("distance_km", *distance)?;
        }
        for (mode, factor) in self.emission_factors.iter() {
            self.check_mode(*mode)?;
            InputError::check_non_negative("emission_factor_g_per_pkm", *factor)?;
        }
        Ok(())
    }
}

/// Ridepooling figures the reference mobility is scaled by
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RidepoolingContext {
    pub passengers_transported: f64,
    pub person_km_driven: f64,
    pub avg_distance_per_booking_loaded: f64,
    pub avg_distance_per_booking_incl_empty: f64,
}

impl RidepoolingContext {
    pub fn new(volume: &ServiceVolume, metrics: &PerformanceMetrics) -> Self {
        RidepoolingContext {
            passengers_transported: volume.passengers_transported as f64,
            person_km_driven: metrics.person_km_driven,
            avg_distance_per_booking_loaded: metrics.avg_distance_per_booking_loaded,
            avg_distance_per_booking_incl_empty: metrics.avg_distance_per_booking_incl_empty,
        }
    }
}

/// Outcome of the share-sum plausibility check. Never blocks computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShareSumCheck {
    Balanced,
    Below,
    Above,
}

impl ShareSumCheck {
    pub fn from_sum(sum: f64) -> Self {
        if (sum - 100.0).abs() <= EPSILON {
            ShareSumCheck::Balanced
        } else if sum < 100.0 {
            ShareSumCheck::Below
        } else {
            ShareSumCheck::Above
        }
    }
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            ShareSumCheck::Balanced => None,
            ShareSumCheck::Below => Some("Die Summe der Modal-Split-Anteile liegt unter 100%."),
            ShareSumCheck::Above => Some("Die Summe der Modal-Split-Anteile überschreitet 100%."),
        }
    }
}

/// Person-km of one mode and how it was obtained
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeVolume {
    /// Passengers assigned to the mode (trip-based only)
    pub passengers: Option<f64>,
    /// Trip distance used (trip-based only) [km]
    pub distance_km: Option<f64>,
    pub person_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModeResult {
    pub mode: TransportMode,
    pub share_percent: f64,
    pub passengers: Option<f64>,
    pub distance_km: Option<f64>,
    pub person_km: f64,
    /// [g CO2e/pkm]
    pub emission_factor_g_per_pkm: f64,
    /// [kg CO2e]
    pub emissions_kg: f64,
    /// False for induced traffic
    pub counted_in_totals: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReferenceMobilityResult {
    pub methodology: Methodology,
    pub modes: Vec<ModeResult>,
    pub total_person_km: f64,
    /// [kg CO2e]
    pub total_emissions_kg: f64,
    /// [kg CO2e/pkm]
    pub per_person_km: f64,
    pub share_sum_percent: f64,
    pub share_sum_check: ShareSumCheck,
}

impl ReferenceMobilityResult {
    pub fn grams_per_person_km(&self) -> f64 {
        self.per_person_km * GRAMS_PER_KG
    }
    pub fn mode(&self, mode: TransportMode) -> Option<&ModeResult> {
        self.modes.iter().find(|result| result.mode == mode)
    }
}

/// Shared contract of the four reference mobility strategies
pub trait ReferenceMobilityCalculator: Sync {
    fn methodology(&self) -> Methodology;

    /// Person-km attributed to a single mode
    fn mode_volume(&self, mode: TransportMode, inputs: &ReferenceInputs, context: &RidepoolingContext) -> ModeVolume;

    /// Per-mode and aggregate person-km and emissions.
    ///
    /// Shares are used as given even if they do not sum to 100; the
    /// share-sum check only flags it.
    fn compute_reference_mobility(&self, inputs: &ReferenceInputs, context: &RidepoolingContext) -> ReferenceMobilityResult {
        let methodology = self.methodology();
        let mut modes = Vec::with_capacity(methodology.modes().len());
        let mut total_person_km = 0.0;
        let mut total_emissions_kg = 0.0;
        for mode in methodology.modes().iter().copied() {
            let volume = self.mode_volume(mode, inputs, context);
            let emission_factor = inputs.emission_factor(mode);
            let emissions_kg = volume.person_km * emission_factor / GRAMS_PER_KG;
            let counted = !mode.is_induced();
            if counted {
                total_person_km += volume.person_km;
                total_emissions_kg += emissions_kg;
            }
            modes.push(ModeResult {
                mode,
                share_percent: inputs.share(mode),
                passengers: volume.passengers,
                distance_km: volume.distance_km,
                person_km: volume.person_km,
                emission_factor_g_per_pkm: emission_factor,
                emissions_kg,
                counted_in_totals: counted,
            });
        }
        let share_sum_percent = inputs.share_sum();
        ReferenceMobilityResult {
            methodology,
            modes,
            total_person_km,
            total_emissions_kg,
            per_person_km: ratio(total_emissions_kg, total_person_km),
            share_sum_percent,
            share_sum_check: ShareSumCheck::from_sum(share_sum_percent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_new_inputs() {
        let inputs = ReferenceInputs::new(Methodology::SurveyTrips);
        assert_eq!(inputs.shares.len(), 11);
        assert_eq!(inputs.share_sum(), 0.0);
        assert_eq!(inputs.emission_factor(TransportMode::CarDriver), 152.86);
        assert_eq!(inputs.emission_factor(TransportMode::InducedTraffic), 0.0);
        let inputs = ReferenceInputs::new(Methodology::ModalSplitPkm);
        assert_eq!(inputs.shares.len(), 10);
    }
    #[test]
    fn test_share_sum_check() {
        assert_eq!(ShareSumCheck::from_sum(100.0), ShareSumCheck::Balanced);
        assert_eq!(ShareSumCheck::from_sum(42.0 + 16.0 + 3.0 + 3.0 + 2.0 + 1.0 + 1.0 + 10.0 + 22.0), ShareSumCheck::Balanced);
        assert_eq!(ShareSumCheck::from_sum(99.9), ShareSumCheck::Below);
        assert_eq!(ShareSumCheck::from_sum(100.5), ShareSumCheck::Above);
        assert!(ShareSumCheck::Balanced.warning().is_none());
    }
    #[test]
    fn test_validate() {
        let mut inputs = ReferenceInputs::new(Methodology::ModalSplitTrips);
        inputs.shares.insert(TransportMode::InducedTraffic, 10.0);
        assert!(matches!(inputs.validate(), Err(InputError::ModeNotInMethodology { .. })));

        let mut inputs = ReferenceInputs::new(Methodology::ModalSplitPkm);
        inputs.custom_distances.insert(TransportMode::Bus, 5.0);
        assert!(matches!(inputs.validate(), Err(InputError::DistancesNotApplicable(_))));

        let mut inputs = ReferenceInputs::new(Methodology::SurveyTrips);
        inputs.shares.insert(TransportMode::Bus, 120.0);
        assert!(inputs.validate().is_err());

        let mut inputs = ReferenceInputs::new(Methodology::SurveyTrips);
        inputs.shares.insert(TransportMode::InducedTraffic, 10.0);
        inputs.custom_distances.insert(TransportMode::Walking, 1.5);
        assert!(inputs.validate().is_ok());
    }
    #[test]
    fn test_distance_basis() {
        let context = RidepoolingContext {
            passengers_transported: 10.0,
            person_km_driven: 100.0,
            avg_distance_per_booking_loaded: 7.5,
            avg_distance_per_booking_incl_empty: 9.0,
        };
        let mut inputs = ReferenceInputs::new(Methodology::ModalSplitTrips);
        assert_eq!(inputs.distance(TransportMode::Bus, &context), 7.5);
        inputs.distance_basis = DistanceBasis::TripDistanceInclEmpty;
        assert_eq!(inputs.distance(TransportMode::Bus, &context), 9.0);
        inputs.distance_basis = DistanceBasis::Mid2017;
        assert_eq!(inputs.distance(TransportMode::Walking, &context), 2.0);
        inputs.distance_basis = DistanceBasis::Custom;
        inputs.custom_distances.insert(TransportMode::Bus, 3.0);
        assert_eq!(inputs.distance(TransportMode::Bus, &context), 3.0);
        assert_eq!(inputs.distance(TransportMode::Rail, &context), 0.0);
    }
    #[test]
    fn test_labels_roundtrip() {
        for methodology in Methodology::ALL {
            assert_eq!(Methodology::from_label(methodology.label()), Some(methodology));
        }
        for basis in DistanceBasis::ALL {
            assert_eq!(DistanceBasis::from_label(basis.label()), Some(basis));
        }
    }
}
