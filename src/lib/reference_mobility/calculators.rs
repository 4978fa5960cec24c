use super::{
    Methodology,
    ModeVolume,
    ReferenceInputs,
    ReferenceMobilityCalculator,
    RidepoolingContext,
    TransportMode,
};
use crate::units::percent;

/// passengers × share% × distance
fn trip_volume(mode: TransportMode, inputs: &ReferenceInputs, context: &RidepoolingContext) -> ModeVolume {
    let passengers = context.passengers_transported * percent(inputs.share(mode));
    let distance_km = inputs.distance(mode, context);
    ModeVolume {
        passengers: Some(passengers),
        distance_km: Some(distance_km),
        person_km: passengers * distance_km,
    }
}

/// ridepooling pkm × share%. No truncation of the person-km.
fn person_km_volume(mode: TransportMode, inputs: &ReferenceInputs, context: &RidepoolingContext) -> ModeVolume {
    ModeVolume {
        passengers: None,
        distance_km: None,
        person_km: context.person_km_driven * percent(inputs.share(mode)),
    }
}

/// Variant A: modal split by trips
#[derive(Debug, Clone, Copy, Default)]
pub struct ModalSplitTrips;

impl ReferenceMobilityCalculator for ModalSplitTrips {
    fn methodology(&self) -> Methodology {
        Methodology::ModalSplitTrips
    }
    fn mode_volume(&self, mode: TransportMode, inputs: &ReferenceInputs, context: &RidepoolingContext) -> ModeVolume {
        trip_volume(mode, inputs, context)
    }
}

/// Variant B: modal split by person-km
#[derive(Debug, Clone, Copy, Default)]
pub struct ModalSplitPkm;

impl ReferenceMobilityCalculator for ModalSplitPkm {
    fn methodology(&self) -> Methodology {
        Methodology::ModalSplitPkm
    }
    fn mode_volume(&self, mode: TransportMode, inputs: &ReferenceInputs, context: &RidepoolingContext) -> ModeVolume {
        person_km_volume(mode, inputs, context)
    }
}

/// Variant C: passenger survey by trips, induced traffic included
#[derive(Debug, Clone, Copy, Default)]
pub struct SurveyTrips;

impl ReferenceMobilityCalculator for SurveyTrips {
    fn methodology(&self) -> Methodology {
        Methodology::SurveyTrips
    }
    fn mode_volume(&self, mode: TransportMode, inputs: &ReferenceInputs, context: &RidepoolingContext) -> ModeVolume {
        trip_volume(mode, inputs, context)
    }
}

/// Variant D: passenger survey by person-km, induced traffic included
#[derive(Debug, Clone, Copy, Default)]
pub struct SurveyPkm;

impl ReferenceMobilityCalculator for SurveyPkm {
    fn methodology(&self) -> Methodology {
        Methodology::SurveyPkm
    }
    fn mode_volume(&self, mode: TransportMode, inputs: &ReferenceInputs, context: &RidepoolingContext) -> ModeVolume {
        person_km_volume(mode, inputs, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_mobility::{DistanceBasis, ShareSumCheck, MODAL_SPLIT_MODES};

    fn context() -> RidepoolingContext {
        RidepoolingContext {
            passengers_transported: 150.0,
            person_km_driven: 1500.0,
            avg_distance_per_booking_loaded: 10.0,
            avg_distance_per_booking_incl_empty: 12.0,
        }
    }

    fn inputs_with(methodology: Methodology, shares: &[(TransportMode, f64)]) -> ReferenceInputs {
        let mut inputs = ReferenceInputs::new(methodology);
        for (mode, share) in shares.iter() {
            inputs.shares.insert(*mode, *share);
        }
        inputs
    }

    #[test]
    fn test_modal_split_trips() {
        let inputs = inputs_with(Methodology::ModalSplitTrips, &[(TransportMode::CarDriver, 60.0), (TransportMode::Bus, 40.0)]);
        let result = Methodology::ModalSplitTrips.calculator().compute_reference_mobility(&inputs, &context());
        let car = result.mode(TransportMode::CarDriver).unwrap();
        assert_eq!(car.passengers, Some(90.0));
        assert_eq!(car.distance_km, Some(10.0));
        assert_eq!(car.person_km, 900.0);
        assert!((car.emissions_kg - 900.0 * 152.86 / 1000.0).abs() < 1e-9);
        let bus = result.mode(TransportMode::Bus).unwrap();
        assert_eq!(bus.person_km, 600.0);
        assert_eq!(result.total_person_km, 1500.0);
        let expected_kg = (900.0 * 152.86 + 600.0 * 80.54) / 1000.0;
        assert!((result.total_emissions_kg - expected_kg).abs() < 1e-9);
        assert!((result.per_person_km - expected_kg / 1500.0).abs() < 1e-12);
        assert_eq!(result.share_sum_check, ShareSumCheck::Balanced);
        assert_eq!(result.modes.len(), MODAL_SPLIT_MODES.len());
    }
    #[test]
    fn test_aggregate_is_sum_over_modes() {
        let shares = [
            (TransportMode::CarDriver, 42.0),
            (TransportMode::CarPassenger, 16.0),
            (TransportMode::Bus, 3.0),
            (TransportMode::TramMetro, 3.0),
            (TransportMode::Rail, 2.0),
            (TransportMode::Motorcycle, 1.0),
            (TransportMode::EBike, 1.0),
            (TransportMode::Bicycle, 10.0),
            (TransportMode::Walking, 22.0),
        ];
        let mut inputs = inputs_with(Methodology::ModalSplitTrips, &shares);
        inputs.distance_basis = DistanceBasis::Mid2017;
        let ctx = context();
        let result = ModalSplitTrips.compute_reference_mobility(&inputs, &ctx);
        let expected: f64 = shares
            .iter()
            .map(|(mode, share)| ctx.passengers_transported * share / 100.0 * mode.mid_2017_distance())
            .sum();
        assert!((result.total_person_km - expected).abs() < 1e-9);
    }
    #[test]
    fn test_share_sum_does_not_block() {
        let inputs = inputs_with(Methodology::ModalSplitPkm, &[(TransportMode::CarDriver, 30.0)]);
        let result = ModalSplitPkm.compute_reference_mobility(&inputs, &context());
        assert_eq!(result.share_sum_check, ShareSumCheck::Below);
        assert_eq!(result.total_person_km, 450.0);
        assert!(result.total_emissions_kg > 0.0);

        let inputs = inputs_with(Methodology::ModalSplitPkm, &[(TransportMode::CarDriver, 80.0), (TransportMode::Bus, 40.0)]);
        let result = ModalSplitPkm.compute_reference_mobility(&inputs, &context());
        assert_eq!(result.share_sum_check, ShareSumCheck::Above);
        assert_eq!(result.total_person_km, 1800.0);
    }
    #[test]
    fn test_pkm_variant_keeps_fractions() {
        let inputs = inputs_with(Methodology::ModalSplitPkm, &[(TransportMode::Rail, 33.3)]);
        let ctx = RidepoolingContext { person_km_driven: 10.0, ..context() };
        let result = ModalSplitPkm.compute_reference_mobility(&inputs, &ctx);
        let rail = result.mode(TransportMode::Rail).unwrap();
        assert!((rail.person_km - 3.33).abs() < 1e-12);
        assert_eq!(rail.passengers, None);
        assert_eq!(rail.distance_km, None);
    }
    #[test]
    fn test_induced_traffic_excluded() {
        let shares = [(TransportMode::InducedTraffic, 20.0), (TransportMode::CarDriver, 80.0)];
        let ctx = context();
        for methodology in [Methodology::SurveyTrips, Methodology::SurveyPkm] {
            let mut inputs = inputs_with(methodology, &shares);
            inputs.emission_factors.insert(TransportMode::InducedTraffic, 100.0);
            let result = methodology.calculator().compute_reference_mobility(&inputs, &ctx);
            let induced = result.mode(TransportMode::InducedTraffic).unwrap();
            assert!(!induced.counted_in_totals);
            assert!(induced.person_km > 0.0);
            let car = result.mode(TransportMode::CarDriver).unwrap();
            assert_eq!(result.total_person_km, car.person_km);
            assert_eq!(result.total_emissions_kg, car.emissions_kg);
            assert_eq!(result.share_sum_check, ShareSumCheck::Balanced);
        }
    }
    #[test]
    fn test_survey_trips_with_empty_runs() {
        let mut inputs = inputs_with(Methodology::SurveyTrips, &[(TransportMode::Bus, 100.0)]);
        inputs.distance_basis = DistanceBasis::TripDistanceInclEmpty;
        let result = SurveyTrips.compute_reference_mobility(&inputs, &context());
        assert_eq!(result.total_person_km, 150.0 * 12.0);
    }
    #[test]
    fn test_zero_person_km() {
        let inputs = inputs_with(Methodology::SurveyPkm, &[(TransportMode::Bus, 100.0)]);
        let ctx = RidepoolingContext::default();
        let result = SurveyPkm.compute_reference_mobility(&inputs, &ctx);
        assert_eq!(result.total_person_km, 0.0);
        assert_eq!(result.per_person_km, 0.0);
    }
    #[test]
    fn test_calculator_dispatch() {
        for methodology in Methodology::ALL {
            assert_eq!(methodology.calculator().methodology(), methodology);
        }
    }
}
