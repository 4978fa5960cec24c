//! Predefined vehicle types, ridepooling systems and modal-split presets
//! offered to pre-fill a session.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::fleet::VehicleEntry;
use crate::performance::ServiceVolume;
use crate::reference_mobility::{Methodology, TransportMode, SURVEY_MODES};

/// Vehicle type with WLTP consumption figures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleType {
    pub label: &'static str,
    pub gasoline_l_per_100km: f64,
    pub diesel_l_per_100km: f64,
    pub electric_kwh_per_100km: f64,
}

pub const CUSTOM_VEHICLE_TYPE: &str = "Anderer Fahrzeugtyp";

pub const VEHICLE_TYPES: [VehicleType; 6] = [
    VehicleType { label: "LEVC TX (Volvo XC 90 Recharge T8 AWD)", gasoline_l_per_100km: 1.35, diesel_l_per_100km: 0.0, electric_kwh_per_100km: 21.55 },
    VehicleType { label: "Mercedes Vito lang 114 CDI", gasoline_l_per_100km: 0.0, diesel_l_per_100km: 8.4, electric_kwh_per_100km: 0.0 },
    VehicleType { label: "Mercedes eVito Tourer PRO lang (90 kWh)", gasoline_l_per_100km: 0.0, diesel_l_per_100km: 0.0, electric_kwh_per_100km: 29.8 },
    VehicleType { label: "Mercedes EQV 300 extra lang", gasoline_l_per_100km: 0.0, diesel_l_per_100km: 0.0, electric_kwh_per_100km: 30.2 },
    VehicleType { label: "Nissan e NV 200", gasoline_l_per_100km: 0.0, diesel_l_per_100km: 0.0, electric_kwh_per_100km: 20.6 },
    VehicleType { label: CUSTOM_VEHICLE_TYPE, gasoline_l_per_100km: 0.0, diesel_l_per_100km: 0.0, electric_kwh_per_100km: 0.0 },
];

impl VehicleType {
    pub fn find(label: &str) -> Option<&'static VehicleType> {
        VEHICLE_TYPES.iter().find(|vehicle_type| vehicle_type.label == label)
    }
    /// Entry with the catalog consumption and no kilometers yet
    pub fn to_entry(&self) -> VehicleEntry {
        VehicleEntry::new(self.label).with_consumption(
            self.gasoline_l_per_100km,
            self.diesel_l_per_100km,
            self.electric_kwh_per_100km,
        )
    }
}

/// Known ridepooling system with its service volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemPreset {
    pub label: &'static str,
    pub volume: ServiceVolume,
    /// Fleet data published together with the volume, if any
    pub sample_vehicle: Option<SampleVehicle>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleVehicle {
    pub vehicle_type: VehicleType,
    pub empty_km: f64,
    pub loaded_km: f64,
}

impl SampleVehicle {
    pub fn to_entry(&self) -> VehicleEntry {
        self.vehicle_type.to_entry().with_distances(self.empty_km, self.loaded_km)
    }
}

pub const SYSTEM_PRESETS: [SystemPreset; 4] = [
    SystemPreset {
        label: "bussi",
        volume: ServiceVolume { completed_bookings: 8475, passengers_transported: 13876 },
        sample_vehicle: Some(SampleVehicle {
            vehicle_type: VehicleType { label: "LEVC TX (Volvo XC 90 Recharge T8 AWD)", gasoline_l_per_100km: 1.2, diesel_l_per_100km: 0.0, electric_kwh_per_100km: 20.5 },
            empty_km: 50422.31,
            loaded_km: 40063.44,
        }),
    },
    SystemPreset { label: "G-Mobil", volume: ServiceVolume { completed_bookings: 60043, passengers_transported: 74561 }, sample_vehicle: None },
    SystemPreset { label: "kommit-Shuttle", volume: ServiceVolume { completed_bookings: 21908, passengers_transported: 26280 }, sample_vehicle: None },
    SystemPreset { label: "LOOPmünster", volume: ServiceVolume { completed_bookings: 151415, passengers_transported: 187309 }, sample_vehicle: None },
];

impl SystemPreset {
    pub fn find(label: &str) -> Option<&'static SystemPreset> {
        SYSTEM_PRESETS.iter().find(|preset| preset.label == label)
    }
}

/// Shares per mode [%] in the mode order of the methodology
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharePreset {
    pub label: &'static str,
    pub methodology: Methodology,
    pub shares: &'static [f64],
}

pub const SHARE_PRESETS: [SharePreset; 9] = [
    SharePreset { label: "Modal Split (Wege) MiD 2017", methodology: Methodology::ModalSplitTrips, shares: &[42.0, 16.0, 3.0, 3.0, 2.0, 1.0, 1.0, 10.0, 22.0, 0.0] },
    SharePreset { label: "Modal Split (Wege) Essen (2019)", methodology: Methodology::ModalSplitTrips, shares: &[46.0, 8.0, 6.0, 8.0, 5.0, 1.0, 1.0, 6.0, 19.0, 0.0] },
    SharePreset { label: "Modal Split (Wege) Senden (2000)", methodology: Methodology::ModalSplitTrips, shares: &[48.0, 10.0, 4.5, 0.0, 1.5, 0.0, 0.0, 21.0, 14.0, 1.0] },
    SharePreset { label: "Modal Split (Wege) Gronau (2020)", methodology: Methodology::ModalSplitTrips, shares: &[47.0, 8.0, 1.0, 0.0, 1.0, 0.0, 0.0, 30.0, 13.0, 0.0] },
    SharePreset { label: "Modal Split (Wege) Münster, Hiltrup (2022)", methodology: Methodology::ModalSplitTrips, shares: &[31.0, 9.0, 7.0, 0.0, 2.0, 0.0, 10.0, 24.0, 17.0, 0.0] },
    SharePreset { label: "Modal Split (Personenkilometer) MiD 2017", methodology: Methodology::ModalSplitPkm, shares: &[77.0, 0.0, 2.0, 4.0, 10.0, 0.0, 1.0, 3.0, 3.0, 0.0] },
    SharePreset { label: "Modal Split (Personenkilometer) Essen (2019)", methodology: Methodology::ModalSplitPkm, shares: &[61.0, 7.0, 7.3, 9.7, 6.0, 0.0, 0.0, 4.0, 5.0, 0.0] },
    SharePreset { label: "Modal Split (Personenkilometer) Münster (2022)", methodology: Methodology::ModalSplitPkm, shares: &[43.0, 5.0, 19.0, 0.0, 6.0, 0.0, 6.0, 17.0, 3.0, 1.0] },
    // The LOOPmünster survey was asked for both trip and person-km shares
    SharePreset { label: "Umfrage LOOPmünster (2021, 2022, 2022)", methodology: Methodology::SurveyTrips, shares: &[0.0, 31.0, 9.0, 7.0, 0.0, 2.0, 0.0, 10.0, 24.0, 17.0, 0.0] },
];

impl SharePreset {
    /// Looks a preset up by label. Survey presets serve both survey methodologies.
    pub fn find(label: &str, methodology: Methodology) -> Option<&'static SharePreset> {
        SHARE_PRESETS
            .iter()
            .find(|preset| preset.label == label && preset.applies_to(methodology))
    }
    pub fn applies_to(&self, methodology: Methodology) -> bool {
        match self.methodology {
            Methodology::SurveyTrips | Methodology::SurveyPkm => {
                matches!(methodology, Methodology::SurveyTrips | Methodology::SurveyPkm)
            }
            _ => self.methodology == methodology,
        }
    }
    pub fn shares_map(&self) -> BTreeMap<TransportMode, f64> {
        self.methodology
            .modes()
            .iter()
            .copied()
            .zip(self.shares.iter().copied())
            .collect()
    }
}

/// Owned catalog view served to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogView {
    pub vehicle_types: Vec<VehicleEntry>,
    pub systems: Vec<SystemPresetView>,
    pub share_presets: Vec<SharePresetView>,
    /// Average trip length per mode after MiD 2017 [km]
    pub mid_2017_distances: BTreeMap<TransportMode, f64>,
    /// Editable default factors per mode [g CO2e/pkm]
    pub default_emission_factors: BTreeMap<TransportMode, f64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SystemPresetView {
    pub label: String,
    pub volume: ServiceVolume,
    pub sample_vehicle: Option<VehicleEntry>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SharePresetView {
    pub label: String,
    pub methodology: Methodology,
    pub shares: BTreeMap<TransportMode, f64>,
}

pub fn catalog_view() -> CatalogView {
    let modes = SURVEY_MODES.iter().copied().filter(|mode| !mode.is_induced());
    CatalogView {
        vehicle_types: VEHICLE_TYPES.iter().map(|vehicle_type| vehicle_type.to_entry()).collect(),
        systems: SYSTEM_PRESETS
            .iter()
            .map(|preset| SystemPresetView {
                label: preset.label.to_string(),
                volume: preset.volume,
                sample_vehicle: preset.sample_vehicle.map(|sample| sample.to_entry()),
            })
            .collect(),
        share_presets: SHARE_PRESETS
            .iter()
            .map(|preset| SharePresetView {
                label: preset.label.to_string(),
                methodology: preset.methodology,
                shares: preset.shares_map(),
            })
            .collect(),
        mid_2017_distances: modes.clone().map(|mode| (mode, mode.mid_2017_distance())).collect(),
        default_emission_factors: modes.map(|mode| (mode, mode.default_emission_factor())).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_share_presets_match_mode_sets() {
        for preset in SHARE_PRESETS.iter() {
            assert_eq!(preset.shares.len(), preset.methodology.modes().len(), "{}", preset.label);
            let sum: f64 = preset.shares.iter().sum();
            assert!((sum - 100.0).abs() < 1e-9, "{} sums to {}", preset.label, sum);
        }
    }
    #[test]
    fn test_share_preset_lookup() {
        let survey = "Umfrage LOOPmünster (2021, 2022, 2022)";
        assert!(SharePreset::find(survey, Methodology::SurveyTrips).is_some());
        assert!(SharePreset::find(survey, Methodology::SurveyPkm).is_some());
        assert!(SharePreset::find(survey, Methodology::ModalSplitTrips).is_none());
        assert!(SharePreset::find("Modal Split (Wege) MiD 2017", Methodology::ModalSplitPkm).is_none());
        let preset = SharePreset::find("Modal Split (Personenkilometer) Essen (2019)", Methodology::ModalSplitPkm).unwrap();
        assert_eq!(preset.shares_map()[&TransportMode::TramMetro], 9.7);
    }
    #[test]
    fn test_vehicle_types() {
        let vito = VehicleType::find("Mercedes Vito lang 114 CDI").unwrap().to_entry();
        assert_eq!(vito.diesel_l_per_100km, 8.4);
        assert_eq!(vito.total_km(), 0.0);
        assert!(VehicleType::find(CUSTOM_VEHICLE_TYPE).is_some());
        assert!(VehicleType::find("Tesla").is_none());
    }
    #[test]
    fn test_system_presets() {
        let bussi = SystemPreset::find("bussi").unwrap();
        assert_eq!(bussi.volume.completed_bookings, 8475);
        assert_eq!(bussi.sample_vehicle.unwrap().to_entry().loaded_km, 40063.44);
        assert_eq!(SystemPreset::find("LOOPmünster").unwrap().volume.passengers_transported, 187309);
    }
    #[test]
    fn test_catalog_view() {
        let view = catalog_view();
        assert_eq!(view.vehicle_types.len(), 6);
        assert_eq!(view.share_presets.len(), 9);
        assert!(!view.mid_2017_distances.contains_key(&TransportMode::InducedTraffic));
        assert_eq!(view.default_emission_factors[&TransportMode::Bus], 80.54);
    }
}
