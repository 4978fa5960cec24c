use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::*;
use crate::errors::InputError;

/// Named reference source of an emission factor.
pub trait FactorSource: Copy + Sized + 'static {
    /// Every selectable source, custom entry last
    const ALL: &'static [Self];
    /// Fixed literal of the source; `None` for user-supplied values
    fn literal(&self) -> Option<f64>;
    fn label(&self) -> &'static str;
    /// Resolves the factor, falling back to the user literal for custom sources
    fn value(&self, custom: f64) -> f64 {
        self.literal().unwrap_or(custom)
    }
    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|source| source.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GasolineSource {
    #[default]
    DinEn16258,
    Helmholtz,
    Custom,
}

impl FactorSource for GasolineSource {
    const ALL: &'static [Self] = &[GasolineSource::DinEn16258, GasolineSource::Helmholtz, GasolineSource::Custom];
    fn literal(&self) -> Option<f64> {
        match self {
            GasolineSource::DinEn16258 => Some(GASOLINE_DIN_EN_16258),
            GasolineSource::Helmholtz => Some(GASOLINE_HELMHOLTZ),
            GasolineSource::Custom => None,
        }
    }
    fn label(&self) -> &'static str {
        match self {
            GasolineSource::DinEn16258 => "DIN EN 16258:2013, Tabelle A.2 [CO2eq]",
            GasolineSource::Helmholtz => "Helmholtz-Gemeinschaft Deutscher Forschungszentren [CO2eq]",
            GasolineSource::Custom => "Eigene Angaben",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DieselSource {
    #[default]
    DinEn16258,
    Helmholtz,
    Custom,
}

impl FactorSource for DieselSource {
    const ALL: &'static [Self] = &[DieselSource::DinEn16258, DieselSource::Helmholtz, DieselSource::Custom];
    fn literal(&self) -> Option<f64> {
        match self {
            DieselSource::DinEn16258 => Some(DIESEL_DIN_EN_16258),
            DieselSource::Helmholtz => Some(DIESEL_HELMHOLTZ),
            DieselSource::Custom => None,
        }
    }
    fn label(&self) -> &'static str {
        match self {
            DieselSource::DinEn16258 => "DIN EN 16258:2013, Tabelle A.4 [CO2eq]",
            DieselSource::Helmholtz => "Helmholtz-Gemeinschaft Deutscher Forschungszentren [CO2eq]",
            DieselSource::Custom => "Eigene Angaben",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ElectricitySource {
    #[default]
    LanukGridMix2022,
    LanukGreenPower2022,
    UbaGridMix2024,
    Custom,
}

impl FactorSource for ElectricitySource {
    const ALL: &'static [Self] = &[
        ElectricitySource::LanukGridMix2022,
        ElectricitySource::LanukGreenPower2022,
        ElectricitySource::UbaGridMix2024,
        ElectricitySource::Custom,
    ];
    fn literal(&self) -> Option<f64> {
        match self {
            ElectricitySource::LanukGridMix2022 => Some(ELECTRICITY_LANUK_GRID_MIX_2022),
            ElectricitySource::LanukGreenPower2022 => Some(ELECTRICITY_LANUK_GREEN_POWER_2022),
            ElectricitySource::UbaGridMix2024 => Some(ELECTRICITY_UBA_GRID_MIX_2024),
            ElectricitySource::Custom => None,
        }
    }
    fn label(&self) -> &'static str {
        match self {
            ElectricitySource::LanukGridMix2022 => "LANUK Emissionsfaktoren der Klimaneutralen Landesverwaltung: Strommix DE, 2022 [CO2eq]",
            ElectricitySource::LanukGreenPower2022 => "LANUK Emissionsfaktoren der Klimaneutralen Landesverwaltung: Ökostrom DE, 2022 [CO2eq]",
            ElectricitySource::UbaGridMix2024 => "Umweltbundesamt: CO2-Emissionsfaktor Strommix (2024) [CO2eq]",
            ElectricitySource::Custom => "Eigene Angaben",
        }
    }
}

/// User selection of emission factors for the three energy carriers.
/// `*_custom` values are only used when the matching source is `custom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmissionFactorSelection {
    pub gasoline: GasolineSource,
    /// [g CO2e/l]
    #[serde(default)]
    pub gasoline_custom: f64,
    pub diesel: DieselSource,
    /// [g CO2e/l]
    #[serde(default)]
    pub diesel_custom: f64,
    pub electricity: ElectricitySource,
    /// [g CO2e/kWh]
    #[serde(default)]
    pub electricity_custom: f64,
    /// Share of electricity drawn from the secondary source [%]
    #[serde(default)]
    pub secondary_share_percent: f64,
    /// [g CO2e/kWh]
    #[serde(default = "default_secondary_factor")]
    pub secondary_factor: f64,
}

fn default_secondary_factor() -> f64 { DEFAULT_SECONDARY_ELECTRICITY_FACTOR }

impl Default for EmissionFactorSelection {
    fn default() -> Self {
        EmissionFactorSelection {
            gasoline: GasolineSource::default(),
            gasoline_custom: 0.0,
            diesel: DieselSource::default(),
            diesel_custom: 0.0,
            electricity: ElectricitySource::default(),
            electricity_custom: 0.0,
            secondary_share_percent: 0.0,
            secondary_factor: DEFAULT_SECONDARY_ELECTRICITY_FACTOR,
        }
    }
}

impl EmissionFactorSelection {
    pub fn validate(&self) -> Result<(), InputError> {
        InputError::check_non_negative("gasoline_custom", self.gasoline_custom)?;
        InputError::check_non_negative("diesel_custom", self.diesel_custom)?;
        InputError::check_non_negative("electricity_custom", self.electricity_custom)?;
        InputError::check_non_negative("secondary_factor", self.secondary_factor)?;
        InputError::check_percent("secondary_share_percent", self.secondary_share_percent)?;
        Ok(())
    }
}

/// Factors ready for the emission calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResolvedEmissionFactors {
    /// [g CO2e/l]
    pub gasoline_g_per_l: f64,
    /// [g CO2e/l]
    pub diesel_g_per_l: f64,
    /// Grid factor before blending [g CO2e/kWh]
    pub electricity_primary_g_per_kwh: f64,
    /// Blended factor [g CO2e/kWh]
    pub electricity_g_per_kwh: f64,
    /// Clamped secondary share used for the blend [%]
    pub secondary_share_percent: f64,
}

/// Weighted electricity factor `primary × (1 − s/100) + secondary × s/100`.
///
/// The share is clamped into [0; 100] here as well, since callers other than
/// the session input boundary may hand in raw values.
pub fn blend_electricity(primary: f64, secondary: f64, secondary_share_percent: f64) -> f64 {
    let share = clamp_share(secondary_share_percent) / 100.0;
    primary * (1.0 - share) + secondary * share
}

fn clamp_share(share: f64) -> f64 {
    if share.is_nan() {
        return 0.0;
    }
    share.clamp(0.0, 100.0)
}

pub fn resolve(selection: &EmissionFactorSelection) -> ResolvedEmissionFactors {
    let primary = selection.electricity.value(selection.electricity_custom);
    ResolvedEmissionFactors {
        gasoline_g_per_l: selection.gasoline.value(selection.gasoline_custom),
        diesel_g_per_l: selection.diesel.value(selection.diesel_custom),
        electricity_primary_g_per_kwh: primary,
        electricity_g_per_kwh: blend_electricity(primary, selection.secondary_factor, selection.secondary_share_percent),
        secondary_share_percent: clamp_share(selection.secondary_share_percent),
    }
}
