//! Literal reference values used across the calculator.
//!
//! All emission factors are Well-to-Wheel (WTW) CO2-equivalents.

/// Epsilon for floating-point comparisons of shares and intensities.
pub const EPSILON: f64 = 1e-9;

/// Grams per kilogram. Every g -> kg conversion in the pipeline divides by this.
pub const GRAMS_PER_KG: f64 = 1000.0;

/// Consumption rates are given per 100 km.
pub const KM_PER_RATE_UNIT: f64 = 100.0;

/// Gasoline, DIN EN 16258:2013 table A.2 [g CO2e/l]
pub const GASOLINE_DIN_EN_16258: f64 = 2880.0;
/// Gasoline, Helmholtz-Gemeinschaft Deutscher Forschungszentren [g CO2e/l]
pub const GASOLINE_HELMHOLTZ: f64 = 3030.0;

/// Diesel, DIN EN 16258:2013 table A.4 [g CO2e/l]
pub const DIESEL_DIN_EN_16258: f64 = 3170.0;
/// Diesel, Helmholtz-Gemeinschaft Deutscher Forschungszentren [g CO2e/l]
pub const DIESEL_HELMHOLTZ: f64 = 3410.0;

/// Electricity, LANUK grid mix DE 2022 [g CO2e/kWh]
pub const ELECTRICITY_LANUK_GRID_MIX_2022: f64 = 498.0;
/// Electricity, LANUK green power DE 2022 [g CO2e/kWh]
pub const ELECTRICITY_LANUK_GREEN_POWER_2022: f64 = 56.0;
/// Electricity, Umweltbundesamt grid mix 2024 [g CO2e/kWh]
pub const ELECTRICITY_UBA_GRID_MIX_2024: f64 = 363.0;

/// Default factor of the secondary electricity source (PV, PPA, certified green power) [g CO2e/kWh]
pub const DEFAULT_SECONDARY_ELECTRICITY_FACTOR: f64 = 50.0;

// Umweltbundesamt, "Umweltfreundlich mobil!" (2022) [g CO2e/pkm].
pub const CAR_G_PER_PKM: f64 = 152.86;
pub const BUS_G_PER_PKM: f64 = 80.54;
pub const RAIL_G_PER_PKM: f64 = 58.79;
pub const E_BIKE_G_PER_PKM: f64 = 3.9;
pub const BICYCLE_G_PER_PKM: f64 = 0.0;
pub const WALKING_G_PER_PKM: f64 = 0.0;

// Tram/metro and motorcycle carry two different literals in the comparison
// charts and in the editable per-mode defaults. Both are kept until the
// product owner picks one.

/// Tram/metro value plotted in the comparison charts.
pub const TRAM_METRO_CHART_G_PER_PKM: f64 = 59.30;
/// Tram/metro value pre-filled into the reference-mobility factor table.
pub const TRAM_METRO_DEFAULT_G_PER_PKM: f64 = 58.79;
/// Motorcycle value plotted in the comparison charts.
pub const MOTORCYCLE_CHART_G_PER_PKM: f64 = 173.3;
/// Motorcycle value pre-filled into the reference-mobility factor table.
pub const MOTORCYCLE_DEFAULT_G_PER_PKM: f64 = 90.0;
