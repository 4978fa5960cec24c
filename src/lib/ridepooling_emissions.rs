use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::GRAMS_PER_KG;
use crate::emission_factors::ResolvedEmissionFactors;
use crate::fleet::FleetTotals;
use crate::units::{percent, ratio};

/// How the secondary electricity share enters the emission calculation.
///
/// `LegacyDoubleScaling` blends the electricity factor by the secondary
/// share and then scales the electricity emissions by `(1 − share)` once
/// more, which reproduces already published balances. `SingleBlend`
/// applies the blended factor only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ElectricityBlendPolicy {
    #[default]
    LegacyDoubleScaling,
    SingleBlend,
}

impl fmt::Display for ElectricityBlendPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ElectricityBlendPolicy::LegacyDoubleScaling => write!(f, "legacy_double_scaling"),
            ElectricityBlendPolicy::SingleBlend => write!(f, "single_blend"),
        }
    }
}

impl FromStr for ElectricityBlendPolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy_double_scaling" => Ok(ElectricityBlendPolicy::LegacyDoubleScaling),
            "single_blend" => Ok(ElectricityBlendPolicy::SingleBlend),
            _ => Err(format!("Invalid electricity blend policy: '{}'. Supported policies are 'legacy_double_scaling' and 'single_blend'.", s)),
        }
    }
}

/// Well-to-Wheel emissions of the ridepooling service
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RidepoolingEmissions {
    /// [kg CO2e]
    pub gasoline_kg: f64,
    /// [kg CO2e]
    pub diesel_kg: f64,
    /// [kg CO2e]
    pub electricity_kg: f64,
    /// [kg CO2e]
    pub total_kg: f64,
    /// [kg CO2e/pkm]
    pub per_person_km: f64,
}

impl RidepoolingEmissions {
    /// Intensity in g CO2e/pkm, as plotted in the charts
    pub fn grams_per_person_km(&self) -> f64 {
        self.per_person_km * GRAMS_PER_KG
    }
}

pub fn compute_ridepooling_emissions(
    consumption: &FleetTotals,
    factors: &ResolvedEmissionFactors,
    person_km_driven: f64,
    policy: ElectricityBlendPolicy,
) -> RidepoolingEmissions {
    let gasoline_kg = consumption.gasoline_l * factors.gasoline_g_per_l / GRAMS_PER_KG;
    let diesel_kg = consumption.diesel_l * factors.diesel_g_per_l / GRAMS_PER_KG;
    let mut electricity_kg = consumption.electricity_kwh * factors.electricity_g_per_kwh / GRAMS_PER_KG;
    if policy == ElectricityBlendPolicy::LegacyDoubleScaling {
        electricity_kg *= 1.0 - percent(factors.secondary_share_percent);
    }
    let total_kg = gasoline_kg + diesel_kg + electricity_kg;
    RidepoolingEmissions {
        gasoline_kg,
        diesel_kg,
        electricity_kg,
        total_kg,
        per_person_km: ratio(total_kg, person_km_driven),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emission_factors::{resolve, EmissionFactorSelection};

    fn consumption(gasoline_l: f64, diesel_l: f64, electricity_kwh: f64) -> FleetTotals {
        FleetTotals { gasoline_l, diesel_l, electricity_kwh, ..Default::default() }
    }

    #[test]
    fn test_gasoline_scenario() {
        let factors = resolve(&EmissionFactorSelection::default());
        let emissions = compute_ridepooling_emissions(&consumption(50.0, 0.0, 0.0), &factors, 1000.0, ElectricityBlendPolicy::SingleBlend);
        assert_eq!(emissions.gasoline_kg, 144.0);
        assert_eq!(emissions.total_kg, 144.0);
        assert!((emissions.per_person_km - 0.144).abs() < 1e-12);
    }
    #[test]
    fn test_zero_person_km() {
        let factors = resolve(&EmissionFactorSelection::default());
        let emissions = compute_ridepooling_emissions(&consumption(50.0, 10.0, 0.0), &factors, 0.0, ElectricityBlendPolicy::SingleBlend);
        assert_eq!(emissions.per_person_km, 0.0);
        assert!(emissions.total_kg > 0.0);
    }
    #[test]
    fn test_electricity_single_blend() {
        // 50 % of 1000 kWh from a 50 g source: (498 + 50) / 2 = 274 g/kWh
        let selection = EmissionFactorSelection { secondary_share_percent: 50.0, ..Default::default() };
        let factors = resolve(&selection);
        let emissions = compute_ridepooling_emissions(&consumption(0.0, 0.0, 1000.0), &factors, 100.0, ElectricityBlendPolicy::SingleBlend);
        assert!((emissions.electricity_kg - 274.0).abs() < 1e-9);
    }
    #[test]
    fn test_electricity_legacy_double_scaling() {
        // Same inputs, scaled once more by (1 - 0.5): the known double counting
        let selection = EmissionFactorSelection { secondary_share_percent: 50.0, ..Default::default() };
        let factors = resolve(&selection);
        let emissions = compute_ridepooling_emissions(&consumption(0.0, 0.0, 1000.0), &factors, 100.0, ElectricityBlendPolicy::LegacyDoubleScaling);
        assert!((emissions.electricity_kg - 137.0).abs() < 1e-9);
    }
    #[test]
    fn test_policies_agree_without_secondary_share() {
        let factors = resolve(&EmissionFactorSelection::default());
        let fleet = consumption(3.0, 4.0, 500.0);
        let legacy = compute_ridepooling_emissions(&fleet, &factors, 10.0, ElectricityBlendPolicy::LegacyDoubleScaling);
        let single = compute_ridepooling_emissions(&fleet, &factors, 10.0, ElectricityBlendPolicy::SingleBlend);
        assert_eq!(legacy, single);
    }
    #[test]
    fn test_policy_from_str() {
        assert_eq!("single_blend".parse::<ElectricityBlendPolicy>(), Ok(ElectricityBlendPolicy::SingleBlend));
        assert_eq!("LEGACY_DOUBLE_SCALING".parse::<ElectricityBlendPolicy>(), Ok(ElectricityBlendPolicy::LegacyDoubleScaling));
        assert!("both".parse::<ElectricityBlendPolicy>().is_err());
        assert_eq!(ElectricityBlendPolicy::SingleBlend.to_string(), "single_blend");
    }
}
