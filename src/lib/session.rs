use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::catalog::{SharePreset, SystemPreset, VehicleType};
use crate::comparison::compare;
use crate::emission_factors::{resolve, EmissionFactorSelection};
use crate::errors::{InputError, MissingPrerequisite, Stage};
use crate::fleet::{aggregate_fleet, VehicleEntry};
use crate::performance::{compute_performance, ServiceVolume};
use crate::reference_mobility::{Methodology, ReferenceInputs, RidepoolingContext};
use crate::report::{ChartSeries, GeneralInfo, Report};
use crate::ridepooling_emissions::{compute_ridepooling_emissions, ElectricityBlendPolicy};

/// All user inputs of one evaluation. Derived values are never stored here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionState {
    pub general: GeneralInfo,
    pub service_volume: Option<ServiceVolume>,
    pub vehicles: Vec<VehicleEntry>,
    pub emission_factors: Option<EmissionFactorSelection>,
    /// Present once a methodology has been selected
    pub reference: Option<ReferenceInputs>,
}

/// Checks `start ≤ end ≤ today`
pub fn validate_period(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Result<(), InputError> {
    if start > end {
        return Err(InputError::PeriodInverted { start, end });
    }
    if end > today {
        return Err(InputError::PeriodInFuture { end, today });
    }
    Ok(())
}

impl SessionState {
    pub fn new() -> Self {
        SessionState::default()
    }

    /// Blank system names are stored as `None`
    pub fn set_general(&mut self, mut general: GeneralInfo, today: NaiveDate) -> Result<(), InputError> {
        if let (Some(start), Some(end)) = (general.period_start, general.period_end) {
            validate_period(start, end, today)?;
        }
        if let Some(end) = general.period_end {
            if end > today {
                return Err(InputError::PeriodInFuture { end, today });
            }
        }
        general.system_name = general.system_name.filter(|name| !name.trim().is_empty());
        self.general = general;
        Ok(())
    }

    pub fn set_service_volume(&mut self, volume: ServiceVolume) {
        self.service_volume = Some(volume);
    }

    /// Takes the service volume of a known system. Its published fleet data
    /// is added as well when the fleet is still empty.
    pub fn apply_system_preset(&mut self, label: &str) -> Result<(), InputError> {
        let preset = match SystemPreset::find(label) {
            Some(preset) => preset,
            None => {
                return Err(InputError::UnknownPreset(label.to_string()));
            }
        };
        self.service_volume = Some(preset.volume);
        if self.general.system_name.is_none() {
            self.general.system_name = Some(preset.label.to_string());
        }
        if let Some(sample) = preset.sample_vehicle {
            if self.vehicles.is_empty() {
                self.vehicles.push(sample.to_entry());
            }
        }
        Ok(())
    }

    pub fn add_vehicle(&mut self, vehicle: VehicleEntry) -> Result<usize, InputError> {
        vehicle.validate()?;
        self.vehicles.push(vehicle);
        Ok(self.vehicles.len() - 1)
    }

    /// Appends a catalog vehicle type with the given kilometers
    pub fn add_catalog_vehicle(&mut self, type_label: &str, empty_km: f64, loaded_km: f64) -> Result<usize, InputError> {
        let vehicle_type = match VehicleType::find(type_label) {
            Some(vehicle_type) => vehicle_type,
            None => {
                return Err(InputError::UnknownVehicleType(type_label.to_string()));
            }
        };
        self.add_vehicle(vehicle_type.to_entry().with_distances(empty_km, loaded_km))
    }

    pub fn update_vehicle(&mut self, index: usize, vehicle: VehicleEntry) -> Result<(), InputError> {
        vehicle.validate()?;
        match self.vehicles.get_mut(index) {
            Some(slot) => {
                *slot = vehicle;
                Ok(())
            }
            None => Err(InputError::NoSuchVehicle(index)),
        }
    }

    pub fn remove_last_vehicle(&mut self) -> Result<VehicleEntry, InputError> {
        self.vehicles.pop().ok_or(InputError::EmptyFleet)
    }

    pub fn set_emission_factors(&mut self, selection: EmissionFactorSelection) -> Result<(), InputError> {
        selection.validate()?;
        self.emission_factors = Some(selection);
        Ok(())
    }

    pub fn methodology(&self) -> Option<Methodology> {
        self.reference.as_ref().map(|inputs| inputs.methodology)
    }

    /// Locks the session to a methodology. Selecting the current one again is a no-op.
    pub fn select_methodology(&mut self, methodology: Methodology) -> Result<(), InputError> {
        match self.methodology() {
            Some(selected) if selected == methodology => Ok(()),
            Some(selected) => Err(InputError::MethodologyLocked {
                selected: selected.label().to_string(),
                requested: methodology.label().to_string(),
            }),
            None => {
                debug!("Methodology selected: {}", methodology);
                self.reference = Some(ReferenceInputs::new(methodology));
                Ok(())
            }
        }
    }

    /// Selects a methodology and fills its shares from a catalog preset.
    /// An unknown or mismatching preset leaves the session untouched.
    pub fn select_methodology_with_preset(&mut self, methodology: Methodology, preset: Option<&str>) -> Result<(), InputError> {
        if let Some(label) = preset {
            if SharePreset::find(label, methodology).is_none() {
                return Err(InputError::UnknownPreset(label.to_string()));
            }
        }
        self.select_methodology(methodology)?;
        match preset {
            Some(label) => self.apply_share_preset(label),
            None => Ok(()),
        }
    }

    /// Drops all reference-mobility inputs together with the methodology
    pub fn reset_methodology(&mut self) {
        self.reference = None;
    }

    /// Replaces the reference-mobility inputs of the selected methodology
    pub fn set_reference(&mut self, inputs: ReferenceInputs) -> Result<(), InputError> {
        let selected = self.methodology().ok_or(InputError::NoMethodology)?;
        if selected != inputs.methodology {
            return Err(InputError::MethodologyLocked {
                selected: selected.label().to_string(),
                requested: inputs.methodology.label().to_string(),
            });
        }
        inputs.validate()?;
        self.reference = Some(inputs);
        Ok(())
    }

    /// Overwrites the shares with a catalog preset of the selected methodology
    pub fn apply_share_preset(&mut self, label: &str) -> Result<(), InputError> {
        let reference = self.reference.as_mut().ok_or(InputError::NoMethodology)?;
        let preset = match SharePreset::find(label, reference.methodology) {
            Some(preset) => preset,
            None => {
                return Err(InputError::UnknownPreset(label.to_string()));
            }
        };
        let methodology = reference.methodology;
        reference.shares = methodology
            .modes()
            .iter()
            .copied()
            .zip(preset.shares.iter().copied())
            .collect();
        Ok(())
    }

    /// Runs the whole pipeline on the current inputs.
    ///
    /// Stages whose inputs are incomplete stay `None` and are listed in
    /// `missing_prerequisites`. Nothing is cached between calls.
    pub fn recompute(&self, policy: ElectricityBlendPolicy, today: NaiveDate) -> Report {
        let mut missing_prerequisites = vec![];
        let mut warnings = vec![];

        if let Some(end) = self.general.period_end {
            if end > today {
                warnings.push(format!("Das Ende des Betrachtungszeitraums ({}) liegt in der Zukunft.", end.format("%d.%m.%Y")));
            }
        }

        let fleet = aggregate_fleet(&self.vehicles);

        let mut missing_performance = vec![];
        if self.service_volume.is_none() {
            missing_performance.extend(["completed_bookings", "passengers_transported"]);
        }
        if self.vehicles.is_empty() {
            missing_performance.push("vehicles");
        }
        let performance = match (&self.service_volume, missing_performance.is_empty()) {
            (Some(volume), true) => Some(compute_performance(volume, &fleet)),
            _ => {
                missing_prerequisites.push(MissingPrerequisite::new(Stage::Performance, &missing_performance));
                None
            }
        };

        let emission_factors = self.emission_factors.as_ref().map(resolve);
        let ridepooling_emissions = match (&performance, &emission_factors) {
            (Some(metrics), Some(factors)) => Some(compute_ridepooling_emissions(&fleet, factors, metrics.person_km_driven, policy)),
            _ => {
                let mut missing = vec![];
                if performance.is_none() {
                    missing.push("performance");
                }
                if emission_factors.is_none() {
                    missing.push("emission_factors");
                }
                missing_prerequisites.push(MissingPrerequisite::new(Stage::RidepoolingEmissions, &missing));
                None
            }
        };

        let reference_mobility = match (&self.service_volume, &performance, &self.reference) {
            (Some(volume), Some(metrics), Some(inputs)) => {
                let context = RidepoolingContext::new(volume, metrics);
                let result = inputs.methodology.calculator().compute_reference_mobility(inputs, &context);
                if let Some(warning) = result.share_sum_check.warning() {
                    warnings.push(format!("{} (Summe: {:.2}%)", warning, result.share_sum_percent));
                }
                Some(result)
            }
            _ => {
                let mut missing = vec![];
                if performance.is_none() {
                    missing.push("performance");
                }
                if self.reference.is_none() {
                    missing.push("methodology");
                }
                missing_prerequisites.push(MissingPrerequisite::new(Stage::ReferenceMobility, &missing));
                None
            }
        };

        let comparison = match (&ridepooling_emissions, &reference_mobility) {
            (Some(rp), Some(reference)) => Some(compare(
                rp.per_person_km,
                reference.per_person_km,
                rp.total_kg,
                reference.total_emissions_kg,
                self.general.period(),
            )),
            _ => {
                let mut missing = vec![];
                if ridepooling_emissions.is_none() {
                    missing.push("ridepooling_emissions");
                }
                if reference_mobility.is_none() {
                    missing.push("reference_mobility");
                }
                missing_prerequisites.push(MissingPrerequisite::new(Stage::Comparison, &missing));
                None
            }
        };

        let charts = ChartSeries::build(self.general.display_name(), ridepooling_emissions.as_ref(), reference_mobility.as_ref());

        Report {
            general: self.general.clone(),
            service_volume: self.service_volume,
            vehicles: self.vehicles.clone(),
            fleet,
            performance,
            emission_factors,
            electricity_blend_policy: policy,
            ridepooling_emissions,
            reference_inputs: self.reference.clone(),
            reference_mobility,
            comparison,
            charts,
            missing_prerequisites,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::ComparisonVerdict;
    use crate::reference_mobility::TransportMode;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn filled_session() -> SessionState {
        let mut session = SessionState::new();
        session.set_service_volume(ServiceVolume { completed_bookings: 100, passengers_transported: 150 });
        session
            .add_vehicle(VehicleEntry::new("Van").with_consumption(5.0, 0.0, 0.0).with_distances(200.0, 800.0))
            .unwrap();
        session.set_emission_factors(EmissionFactorSelection::default()).unwrap();
        session
    }

    #[test]
    fn test_period_validation() {
        let mut session = SessionState::new();
        let general = GeneralInfo {
            system_name: Some("bussi".to_string()),
            period_start: NaiveDate::from_ymd_opt(2024, 2, 1),
            period_end: NaiveDate::from_ymd_opt(2024, 1, 1),
        };
        assert!(matches!(session.set_general(general, today()), Err(InputError::PeriodInverted { .. })));
        let general = GeneralInfo {
            system_name: None,
            period_start: NaiveDate::from_ymd_opt(2024, 1, 1),
            period_end: NaiveDate::from_ymd_opt(2024, 7, 1),
        };
        assert!(matches!(session.set_general(general, today()), Err(InputError::PeriodInFuture { .. })));
        let general = GeneralInfo {
            system_name: None,
            period_start: NaiveDate::from_ymd_opt(2024, 1, 1),
            period_end: NaiveDate::from_ymd_opt(2024, 6, 30),
        };
        assert!(session.set_general(general, today()).is_ok());
    }
    #[test]
    fn test_vehicle_editing() {
        let mut session = SessionState::new();
        assert_eq!(session.remove_last_vehicle(), Err(InputError::EmptyFleet));
        let index = session.add_catalog_vehicle("Nissan e NV 200", 10.0, 90.0).unwrap();
        assert_eq!(index, 0);
        assert_eq!(session.vehicles[0].electric_kwh_per_100km, 20.6);
        assert!(session.add_catalog_vehicle("Tesla", 0.0, 0.0).is_err());
        assert_eq!(session.update_vehicle(3, VehicleEntry::new("X")), Err(InputError::NoSuchVehicle(3)));
        session.update_vehicle(0, VehicleEntry::new("X").with_distances(1.0, 2.0)).unwrap();
        assert_eq!(session.vehicles[0].type_label, "X");
        assert!(session.add_vehicle(VehicleEntry::new("Y").with_distances(-5.0, 0.0)).is_err());
        assert_eq!(session.remove_last_vehicle().unwrap().type_label, "X");
        assert!(session.vehicles.is_empty());
    }
    #[test]
    fn test_methodology_lock() {
        let mut session = SessionState::new();
        assert_eq!(session.set_reference(ReferenceInputs::new(Methodology::SurveyPkm)), Err(InputError::NoMethodology));
        session.select_methodology(Methodology::SurveyPkm).unwrap();
        session.select_methodology(Methodology::SurveyPkm).unwrap();
        assert!(matches!(session.select_methodology(Methodology::ModalSplitTrips), Err(InputError::MethodologyLocked { .. })));
        assert!(matches!(
            session.set_reference(ReferenceInputs::new(Methodology::ModalSplitTrips)),
            Err(InputError::MethodologyLocked { .. })
        ));
        session.reset_methodology();
        session.select_methodology(Methodology::ModalSplitTrips).unwrap();
        assert_eq!(session.methodology(), Some(Methodology::ModalSplitTrips));
    }
    #[test]
    fn test_share_preset() {
        let mut session = SessionState::new();
        assert_eq!(session.apply_share_preset("Modal Split (Wege) MiD 2017"), Err(InputError::NoMethodology));
        session.select_methodology(Methodology::ModalSplitTrips).unwrap();
        session.apply_share_preset("Modal Split (Wege) MiD 2017").unwrap();
        let reference = session.reference.as_ref().unwrap();
        assert_eq!(reference.share(TransportMode::Walking), 22.0);
        assert_eq!(reference.share_sum(), 100.0);
        assert!(session.apply_share_preset("Umfrage LOOPmünster (2021, 2022, 2022)").is_err());
    }
    #[test]
    fn test_rejected_preset_keeps_methodology_open() {
        let mut session = SessionState::new();
        let result = session.select_methodology_with_preset(Methodology::ModalSplitTrips, Some("Modal Split (Personenkilometer) MiD 2017"));
        assert_eq!(result, Err(InputError::UnknownPreset("Modal Split (Personenkilometer) MiD 2017".to_string())));
        assert_eq!(session.methodology(), None);
        session
            .select_methodology_with_preset(Methodology::ModalSplitPkm, Some("Modal Split (Personenkilometer) MiD 2017"))
            .unwrap();
        assert_eq!(session.methodology(), Some(Methodology::ModalSplitPkm));
        assert_eq!(session.reference.as_ref().unwrap().share_sum(), 100.0);
    }
    #[test]
    fn test_system_preset() {
        let mut session = SessionState::new();
        session.apply_system_preset("bussi").unwrap();
        assert_eq!(session.service_volume.unwrap().passengers_transported, 13876);
        assert_eq!(session.vehicles.len(), 1);
        assert_eq!(session.general.system_name.as_deref(), Some("bussi"));
        session.apply_system_preset("bussi").unwrap();
        assert_eq!(session.vehicles.len(), 1);
        assert!(session.apply_system_preset("unknown").is_err());
    }
    #[test]
    fn test_empty_session_report() {
        let report = SessionState::new().recompute(ElectricityBlendPolicy::default(), today());
        assert!(report.performance.is_none());
        assert!(report.ridepooling_emissions.is_none());
        assert!(report.reference_mobility.is_none());
        assert!(report.comparison.is_none());
        let missing = report.missing_for(Stage::Performance).unwrap();
        assert_eq!(missing.missing_fields, vec!["completed_bookings", "passengers_transported", "vehicles"]);
        assert!(report.charts.ridepooling_vs_modes.is_empty());
        assert!(!report.is_complete());
    }
    #[test]
    fn test_full_pipeline() {
        let mut session = filled_session();
        session.select_methodology(Methodology::ModalSplitPkm).unwrap();
        let mut inputs = ReferenceInputs::new(Methodology::ModalSplitPkm);
        inputs.shares.insert(TransportMode::CarDriver, 100.0);
        session.set_reference(inputs).unwrap();

        let report = session.recompute(ElectricityBlendPolicy::SingleBlend, today());
        assert!(report.missing_prerequisites.is_empty());
        assert!(report.is_complete());
        let performance = report.performance.unwrap();
        assert_eq!(performance.person_km_driven, 1200.0);
        // 5 l/100km over 1000 km = 50 l gasoline at 2880 g/l
        let rp = report.ridepooling_emissions.unwrap();
        assert_eq!(rp.total_kg, 144.0);
        assert!((rp.per_person_km - 0.12).abs() < 1e-12);
        let reference = report.reference_mobility.as_ref().unwrap();
        assert_eq!(reference.total_person_km, 1200.0);
        assert!((reference.per_person_km - 0.15286).abs() < 1e-12);
        let comparison = report.comparison.as_ref().unwrap();
        assert_eq!(comparison.verdict, ComparisonVerdict::RidepoolingBetter);
        assert_eq!(report.charts.ridepooling_vs_reference.len(), 2);
        assert!(report.warnings.is_empty());
    }
    #[test]
    fn test_share_sum_warning() {
        let mut session = filled_session();
        session.select_methodology(Methodology::ModalSplitPkm).unwrap();
        let mut inputs = ReferenceInputs::new(Methodology::ModalSplitPkm);
        inputs.shares.insert(TransportMode::Bus, 50.0);
        session.set_reference(inputs).unwrap();
        let report = session.recompute(ElectricityBlendPolicy::default(), today());
        assert!(report.reference_mobility.is_some());
        assert_eq!(report.warnings.len(), 1);
    }
    #[test]
    fn test_recompute_is_pure() {
        let mut session = filled_session();
        session.select_methodology(Methodology::SurveyTrips).unwrap();
        let first = session.recompute(ElectricityBlendPolicy::default(), today());
        let second = session.recompute(ElectricityBlendPolicy::default(), today());
        assert_eq!(first, second);
    }
}
