use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::comparison::ComparisonResult;
use crate::constants::*;
use crate::emission_factors::ResolvedEmissionFactors;
use crate::errors::{MissingPrerequisite, Stage};
use crate::fleet::{FleetTotals, VehicleEntry};
use crate::performance::{PerformanceMetrics, ServiceVolume};
use crate::reference_mobility::{ReferenceInputs, ReferenceMobilityResult};
use crate::ridepooling_emissions::{ElectricityBlendPolicy, RidepoolingEmissions};

pub const DEFAULT_SYSTEM_LABEL: &str = "Ridepooling-System";
pub const REFERENCE_LABEL: &str = "Alternative Verkehrsmittel";

/// Fixed comparison modes plotted next to the computed intensities [g CO2e/pkm]
pub const CHART_MODES: [(&str, f64); 8] = [
    ("Pkw - MIV (Fahrer) & MIV (Mitfahrer)", CAR_G_PER_PKM),
    ("(Nahlinien-)Bus", BUS_G_PER_PKM),
    ("Straßen-/Stadt-/U-Bahn", TRAM_METRO_CHART_G_PER_PKM),
    ("Schienen(nah)verkehr/Bahn/Zug", RAIL_G_PER_PKM),
    ("Motorrad", MOTORCYCLE_CHART_G_PER_PKM),
    ("E-Bike/Pedelec/E-Lastenrad", E_BIKE_G_PER_PKM),
    ("Fahrrad/Lastenrad", BICYCLE_G_PER_PKM),
    ("Zu Fuß", WALKING_G_PER_PKM),
];

/// General information about the evaluated service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeneralInfo {
    #[schema(example = "LOOPmünster")]
    pub system_name: Option<String>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}

impl GeneralInfo {
    pub fn display_name(&self) -> &str {
        match &self.system_name {
            Some(name) if !name.trim().is_empty() => name.as_str(),
            _ => DEFAULT_SYSTEM_LABEL,
        }
    }

    /// Both bounds of the observation period, if given
    pub fn period(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.period_start.zip(self.period_end)
    }
}

/// Single bar of a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChartPoint {
    pub label: String,
    /// [g CO2e/pkm]
    pub g_per_pkm: f64,
}

impl ChartPoint {
    fn new(label: &str, g_per_pkm: f64) -> Self {
        ChartPoint { label: label.to_string(), g_per_pkm }
    }
}

/// Series of the three comparison charts. A series is empty while its inputs are missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChartSeries {
    /// Ridepooling against the fixed comparison modes
    pub ridepooling_vs_modes: Vec<ChartPoint>,
    /// Reference mobility against the fixed comparison modes
    pub reference_vs_modes: Vec<ChartPoint>,
    /// Ridepooling against the reference mobility
    pub ridepooling_vs_reference: Vec<ChartPoint>,
}

fn with_chart_modes(first: ChartPoint) -> Vec<ChartPoint> {
    let mut series = Vec::with_capacity(CHART_MODES.len() + 1);
    series.push(first);
    series.extend(CHART_MODES.iter().map(|(label, value)| ChartPoint::new(label, *value)));
    series
}

impl ChartSeries {
    pub fn build(system_label: &str, ridepooling: Option<&RidepoolingEmissions>, reference: Option<&ReferenceMobilityResult>) -> Self {
        let mut charts = ChartSeries::default();
        if let Some(rp) = ridepooling {
            charts.ridepooling_vs_modes = with_chart_modes(ChartPoint::new(system_label, rp.grams_per_person_km()));
        }
        if let Some(reference) = reference {
            charts.reference_vs_modes = with_chart_modes(ChartPoint::new(REFERENCE_LABEL, reference.grams_per_person_km()));
        }
        if let (Some(rp), Some(reference)) = (ridepooling, reference) {
            charts.ridepooling_vs_reference = vec![
                ChartPoint::new(system_label, rp.grams_per_person_km()),
                ChartPoint::new(REFERENCE_LABEL, reference.grams_per_person_km()),
            ];
        }
        charts
    }
}

/// Everything derived from a session's inputs. Rebuilt on every request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Report {
    pub general: GeneralInfo,
    pub service_volume: Option<ServiceVolume>,
    pub vehicles: Vec<VehicleEntry>,
    pub fleet: FleetTotals,
    pub performance: Option<PerformanceMetrics>,
    pub emission_factors: Option<ResolvedEmissionFactors>,
    pub electricity_blend_policy: ElectricityBlendPolicy,
    pub ridepooling_emissions: Option<RidepoolingEmissions>,
    pub reference_inputs: Option<ReferenceInputs>,
    pub reference_mobility: Option<ReferenceMobilityResult>,
    pub comparison: Option<ComparisonResult>,
    pub charts: ChartSeries,
    pub missing_prerequisites: Vec<MissingPrerequisite>,
    pub warnings: Vec<String>,
}

impl Report {
    pub fn missing_for(&self, stage: Stage) -> Option<&MissingPrerequisite> {
        self.missing_prerequisites.iter().find(|missing| missing.stage == stage)
    }
    /// Both balances are available
    pub fn is_complete(&self) -> bool {
        self.performance.is_some() && self.ridepooling_emissions.is_some() && self.reference_mobility.is_some()
    }
    /// Human-readable German summary of the evaluation
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Ridepooling-System: {}", self.general.display_name())];
        if let (Some(start), Some(end)) = (self.general.period_start, self.general.period_end) {
            lines.push(format!("Betrachtungszeitraum: {} bis {}", start.format("%d.%m.%Y"), end.format("%d.%m.%Y")));
        }
        if let Some(performance) = &self.performance {
            lines.push(format!("Personenkilometer (gefahren): {:.2} km", performance.person_km_driven));
            lines.push(format!("Bündelungsquote: {:.2}", performance.bundling_ratio));
            lines.push(format!("Besetzungsgrad: {:.2}", performance.occupancy_ratio));
        }
        if let Some(rp) = &self.ridepooling_emissions {
            lines.push(format!("CO2-Emissionen (gesamt): {:.2} kg CO2eq", rp.total_kg));
            lines.push(format!("CO2-Emissionen pro Personenkilometer: {:.2} g CO2eq/pkm", rp.grams_per_person_km()));
        }
        if let Some(reference) = &self.reference_mobility {
            lines.push(format!("Gesamtemissionen alternative Verkehrsmittel: {:.2} kg CO2eq", reference.total_emissions_kg));
            lines.push(format!("CO2-Emissionen pro Personenkilometer alternative Verkehrsmittel: {:.2} g CO2eq/pkm", reference.grams_per_person_km()));
        }
        if let Some(comparison) = &self.comparison {
            lines.push(comparison.message.clone());
        }
        for missing in self.missing_prerequisites.iter() {
            lines.push(missing.message());
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_chart_series() {
        let rp = RidepoolingEmissions { per_person_km: 0.1, ..Default::default() };
        let charts = ChartSeries::build("bussi", Some(&rp), None);
        assert_eq!(charts.ridepooling_vs_modes.len(), 9);
        assert_eq!(charts.ridepooling_vs_modes[0], ChartPoint::new("bussi", 100.0));
        assert_eq!(charts.ridepooling_vs_modes[3].g_per_pkm, 59.30);
        assert_eq!(charts.ridepooling_vs_modes[5].g_per_pkm, 173.3);
        assert!(charts.reference_vs_modes.is_empty());
        assert!(charts.ridepooling_vs_reference.is_empty());
    }
    #[test]
    fn test_display_name() {
        let mut general = GeneralInfo::default();
        assert_eq!(general.display_name(), DEFAULT_SYSTEM_LABEL);
        general.system_name = Some("  ".to_string());
        assert_eq!(general.display_name(), DEFAULT_SYSTEM_LABEL);
        general.system_name = Some("G-Mobil".to_string());
        assert_eq!(general.display_name(), "G-Mobil");
    }
}
