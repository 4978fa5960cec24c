use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::KM_PER_RATE_UNIT;
use crate::errors::InputError;

/// Single vehicle type of the ridepooling fleet together with the
/// fleet-wide kilometers driven by vehicles of this type during the
/// observation period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VehicleEntry {
    #[schema(example = "Mercedes Vito lang 114 CDI")]
    pub type_label: String,
    /// Gasoline consumption [l/100km]
    pub gasoline_l_per_100km: f64,
    /// Diesel consumption [l/100km]
    pub diesel_l_per_100km: f64,
    /// Electricity consumption [kWh/100km]
    pub electric_kwh_per_100km: f64,
    /// Kilometers driven without passengers
    pub empty_km: f64,
    /// Kilometers driven with at least one passenger on board
    pub loaded_km: f64,
}

impl VehicleEntry {
    pub fn new(type_label: &str) -> Self {
        VehicleEntry {
            type_label: type_label.to_string(),
            gasoline_l_per_100km: 0.0,
            diesel_l_per_100km: 0.0,
            electric_kwh_per_100km: 0.0,
            empty_km: 0.0,
            loaded_km: 0.0,
        }
    }
    pub fn with_consumption(mut self, gasoline: f64, diesel: f64, electric: f64) -> Self {
        self.gasoline_l_per_100km = gasoline;
        self.diesel_l_per_100km = diesel;
        self.electric_kwh_per_100km = electric;
        self
    }
    pub fn with_distances(mut self, empty_km: f64, loaded_km: f64) -> Self {
        self.empty_km = empty_km;
        self.loaded_km = loaded_km;
        self
    }
    pub fn total_km(&self) -> f64 {
        self.empty_km + self.loaded_km
    }
    /// Checks that every rate and distance is a finite non-negative number.
    pub fn validate(&self) -> Result<(), InputError> {
        let fields = [
            ("gasoline_l_per_100km", self.gasoline_l_per_100km),
            ("diesel_l_per_100km", self.diesel_l_per_100km),
            ("electric_kwh_per_100km", self.electric_kwh_per_100km),
            ("empty_km", self.empty_km),
            ("loaded_km", self.loaded_km),
        ];
        for (field, value) in fields {
            InputError::check_non_negative(field, value)?;
        }
        Ok(())
    }
}

/// Fleet-wide totals derived from the vehicle list
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FleetTotals {
    pub empty_km_total: f64,
    pub loaded_km_total: f64,
    pub total_km: f64,
    /// Total gasoline consumption [l]
    pub gasoline_l: f64,
    /// Total diesel consumption [l]
    pub diesel_l: f64,
    /// Total electricity consumption [kWh]
    pub electricity_kwh: f64,
}

/// Sums distances and per-carrier consumption over all vehicles.
///
/// Consumption of a vehicle type is `rate × (empty_km + loaded_km) / 100`.
/// An empty fleet yields all zeros.
pub fn aggregate_fleet(vehicles: &[VehicleEntry]) -> FleetTotals {
    let mut totals = FleetTotals::default();
    for vehicle in vehicles.iter() {
        let driven = vehicle.total_km() / KM_PER_RATE_UNIT;
        totals.empty_km_total += vehicle.empty_km;
        totals.loaded_km_total += vehicle.loaded_km;
        totals.gasoline_l += vehicle.gasoline_l_per_100km * driven;
        totals.diesel_l += vehicle.diesel_l_per_100km * driven;
        totals.electricity_kwh += vehicle.electric_kwh_per_100km * driven;
    }
    // Summed once from the totals, so the invariant holds exactly
    totals.total_km = totals.empty_km_total + totals.loaded_km_total;
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_empty_fleet() {
        let totals = aggregate_fleet(&[]);
        assert_eq!(totals, FleetTotals::default());
    }
    #[test]
    fn test_total_km_is_exact_sum() {
        let vehicles = vec![
            VehicleEntry::new("A").with_distances(0.1, 0.2),
            VehicleEntry::new("B").with_distances(50422.31, 40063.44),
            VehicleEntry::new("C").with_distances(0.3, 1e7),
        ];
        let totals = aggregate_fleet(&vehicles);
        assert_eq!(totals.total_km, totals.empty_km_total + totals.loaded_km_total);
        for _ in 0..100 {
            let again = aggregate_fleet(&vehicles);
            assert_eq!(again.total_km, totals.total_km);
        }
    }
    #[test]
    fn test_consumption() {
        let vehicles = vec![
            VehicleEntry::new("LEVC TX")
                .with_consumption(1.35, 0.0, 21.55)
                .with_distances(200.0, 800.0),
            VehicleEntry::new("Mercedes Vito")
                .with_consumption(0.0, 8.4, 0.0)
                .with_distances(100.0, 400.0),
        ];
        let totals = aggregate_fleet(&vehicles);
        assert_eq!(totals.empty_km_total, 300.0);
        assert_eq!(totals.loaded_km_total, 1200.0);
        assert_eq!(totals.total_km, 1500.0);
        assert!((totals.gasoline_l - 13.5).abs() < 1e-9);
        assert!((totals.diesel_l - 42.0).abs() < 1e-9);
        assert!((totals.electricity_kwh - 215.5).abs() < 1e-9);
    }
    #[test]
    fn test_validate() {
        let vehicle = VehicleEntry::new("X").with_distances(-1.0, 10.0);
        assert!(vehicle.validate().is_err());
        let vehicle = VehicleEntry::new("X").with_consumption(f64::NAN, 0.0, 0.0);
        assert!(vehicle.validate().is_err());
        let vehicle = VehicleEntry::new("X").with_distances(1.0, 10.0);
        assert!(vehicle.validate().is_ok());
    }
}
