use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::*;

/// Transport modes passengers would have used without the ridepooling service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// Trips that would not have happened at all. Survey methodologies only,
    /// never counted in reference totals.
    InducedTraffic,
    CarDriver,
    CarPassenger,
    Bus,
    TramMetro,
    Rail,
    Motorcycle,
    EBike,
    Bicycle,
    Walking,
    Other,
}

/// Modes of the modal-split methodologies
pub const MODAL_SPLIT_MODES: [TransportMode; 10] = [
    TransportMode::CarDriver,
    TransportMode::CarPassenger,
    TransportMode::Bus,
    TransportMode::TramMetro,
    TransportMode::Rail,
    TransportMode::Motorcycle,
    TransportMode::EBike,
    TransportMode::Bicycle,
    TransportMode::Walking,
    TransportMode::Other,
];

/// Modes of the survey methodologies, induced traffic first
pub const SURVEY_MODES: [TransportMode; 11] = [
    TransportMode::InducedTraffic,
    TransportMode::CarDriver,
    TransportMode::CarPassenger,
    TransportMode::Bus,
    TransportMode::TramMetro,
    TransportMode::Rail,
    TransportMode::Motorcycle,
    TransportMode::EBike,
    TransportMode::Bicycle,
    TransportMode::Walking,
    TransportMode::Other,
];

impl TransportMode {
    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::InducedTraffic => "Verkehrsinduktion",
            TransportMode::CarDriver => "MIV (Fahrer)",
            TransportMode::CarPassenger => "MIV (Mitfahrer)",
            TransportMode::Bus => "(Nahlinien-)Bus",
            TransportMode::TramMetro => "Straßen-/Stadt-/U-Bahn",
            TransportMode::Rail => "Schienen(nah)verkehr/Bahn/Zug",
            TransportMode::Motorcycle => "Motorrad",
            TransportMode::EBike => "E-Bike/Pedelec/E-Lastenrad",
            TransportMode::Bicycle => "Fahrrad/Lastenrad",
            TransportMode::Walking => "zu Fuß",
            TransportMode::Other => "Sonstiges",
        }
    }
    pub fn from_label(label: &str) -> Option<Self> {
        SURVEY_MODES.iter().copied().find(|mode| mode.label().eq_ignore_ascii_case(label))
    }
    pub fn is_induced(&self) -> bool {
        *self == TransportMode::InducedTraffic
    }
    /// Editable default factor, Umweltbundesamt "Umweltfreundlich mobil!" (2022) [g CO2e/pkm]
    pub fn default_emission_factor(&self) -> f64 {
        match self {
            TransportMode::InducedTraffic => 0.0,
            TransportMode::CarDriver | TransportMode::CarPassenger => CAR_G_PER_PKM,
            TransportMode::Bus => BUS_G_PER_PKM,
            TransportMode::TramMetro => TRAM_METRO_DEFAULT_G_PER_PKM,
            TransportMode::Rail => RAIL_G_PER_PKM,
            TransportMode::Motorcycle => MOTORCYCLE_DEFAULT_G_PER_PKM,
            TransportMode::EBike => E_BIKE_G_PER_PKM,
            TransportMode::Bicycle => BICYCLE_G_PER_PKM,
            TransportMode::Walking => WALKING_G_PER_PKM,
            TransportMode::Other => 0.0,
        }
    }
    /// Average trip length by mode, MiD 2017 [km]
    pub fn mid_2017_distance(&self) -> f64 {
        match self {
            TransportMode::InducedTraffic => 0.0,
            TransportMode::CarDriver => 16.0,
            TransportMode::CarPassenger => 18.0,
            TransportMode::Bus | TransportMode::TramMetro | TransportMode::Rail => 23.0,
            TransportMode::Motorcycle => 16.0,
            TransportMode::EBike | TransportMode::Bicycle => 4.0,
            TransportMode::Walking => 2.0,
            TransportMode::Other => 0.0,
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_mode_sets() {
        assert!(!MODAL_SPLIT_MODES.contains(&TransportMode::InducedTraffic));
        assert_eq!(SURVEY_MODES[0], TransportMode::InducedTraffic);
        assert_eq!(&SURVEY_MODES[1..], &MODAL_SPLIT_MODES[..]);
    }
    #[test]
    fn test_labels() {
        for mode in SURVEY_MODES {
            assert_eq!(TransportMode::from_label(mode.label()), Some(mode));
        }
        assert_eq!(TransportMode::from_label("Zu Fuß"), Some(TransportMode::Walking));
        assert_eq!(TransportMode::from_label("Fähre"), None);
    }
    #[test]
    fn test_divergent_default_factors() {
        assert_eq!(TransportMode::TramMetro.default_emission_factor(), 58.79);
        assert_eq!(TransportMode::Motorcycle.default_emission_factor(), 90.0);
    }
}
