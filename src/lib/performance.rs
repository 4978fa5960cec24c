use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::fleet::FleetTotals;
use crate::units::ratio;

/// Transport volume of the service during the observation period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ServiceVolume {
    #[schema(example = 8475)]
    pub completed_bookings: u64,
    #[schema(example = 13876)]
    pub passengers_transported: u64,
}

/// Distance and efficiency figures of the ridepooling service.
///
/// Every ratio with a zero denominator is 0. Partially filled inputs
/// therefore give stable output, at the price of hiding missing data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PerformanceMetrics {
    pub empty_km_total: f64,
    pub loaded_km_total: f64,
    pub total_km: f64,
    /// Vehicle-km per booking, empty runs included
    pub avg_distance_per_booking_incl_empty: f64,
    /// Loaded vehicle-km per booking
    pub avg_distance_per_booking_loaded: f64,
    /// Person-kilometers: (loaded km / bookings) × passengers
    pub person_km_driven: f64,
    /// Empty km over total km [%]
    pub empty_km_share_percent: f64,
    /// Person-km over total vehicle-km (§ 50 Abs. 3 PBefG)
    pub bundling_ratio: f64,
    /// Person-km over loaded vehicle-km
    pub occupancy_ratio: f64,
}

pub fn compute_performance(volume: &ServiceVolume, fleet: &FleetTotals) -> PerformanceMetrics {
    let bookings = volume.completed_bookings as f64;
    let passengers = volume.passengers_transported as f64;
    let avg_loaded = ratio(fleet.loaded_km_total, bookings);
    let person_km_driven = avg_loaded * passengers;
    PerformanceMetrics {
        empty_km_total: fleet.empty_km_total,
        loaded_km_total: fleet.loaded_km_total,
        total_km: fleet.total_km,
        avg_distance_per_booking_incl_empty: ratio(fleet.total_km, bookings),
        avg_distance_per_booking_loaded: avg_loaded,
        person_km_driven,
        empty_km_share_percent: ratio(fleet.empty_km_total, fleet.total_km) * 100.0,
        bundling_ratio: ratio(person_km_driven, fleet.total_km),
        occupancy_ratio: ratio(person_km_driven, fleet.loaded_km_total),
    }
}
