//! Flat CSV table of a finished evaluation (schema version 1).
//!
//! Scalar values go to `Merkmal`/`Wert`, vehicles to the remaining columns.
//! Inputs are written with full precision so that [`import_csv`] can rebuild
//! the session; derived values are rounded for reading.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::emission_factors::{DieselSource, ElectricitySource, EmissionFactorSelection, FactorSource, GasolineSource};
use crate::errors::InputError;
use crate::fleet::VehicleEntry;
use crate::performance::ServiceVolume;
use crate::reference_mobility::{DistanceBasis, Methodology, ReferenceInputs};
use crate::report::{GeneralInfo, Report};
use crate::session::SessionState;
use crate::units::{round2, round_to};

pub const SCHEMA_VERSION: u32 = 1;

const DATE_FORMAT: &str = "%Y-%m-%d";
const INTENSITY_DECIMALS: u32 = 4;

const KEY_SCHEMA: &str = "Schema-Version";
const KEY_METHODOLOGY: &str = "Methodik";
const KEY_SYSTEM: &str = "Ridepooling-System";
const KEY_PERIOD_START: &str = "Betrachtungszeitraum (Start)";
const KEY_PERIOD_END: &str = "Betrachtungszeitraum (Ende)";
const KEY_BOOKINGS: &str = "Anzahl abgeschlossener Buchungen";
const KEY_PASSENGERS: &str = "Transportierte Fahrgäste";
const KEY_GASOLINE_SOURCE: &str = "Quelle Emissionsfaktor (Benzin)";
const KEY_GASOLINE_FACTOR: &str = "CO2-Emissionsdaten (Benzin)";
const KEY_DIESEL_SOURCE: &str = "Quelle Emissionsfaktor (Diesel)";
const KEY_DIESEL_FACTOR: &str = "CO2-Emissionsdaten (Diesel)";
const KEY_ELECTRICITY_SOURCE: &str = "Quelle Emissionsfaktor (Strom)";
const KEY_ELECTRICITY_FACTOR: &str = "CO2-Emissionsdaten (Strom)";
const KEY_SECONDARY_SHARE: &str = "Ökostromanteil (%)";
const KEY_SECONDARY_FACTOR: &str = "CO2-Emissionsdaten (Ökostrom)";
const KEY_DISTANCE_BASIS: &str = "Grundlage Wegeentfernung";

fn key_share(mode: &str) -> String {
    format!("Modal Split Anteil für {} (%)", mode)
}
fn key_distance(mode: &str) -> String {
    format!("Durchschnittliche Fahrtdistanz für {} (km)", mode)
}
fn key_factor(mode: &str) -> String {
    format!("Emissionsdaten für {} (g CO2eq/pkm)", mode)
}
fn key_person_km(mode: &str) -> String {
    format!("Wegehäufigkeit für {} (Personenkilometer)", mode)
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("evaluation is incomplete. {0}")]
    Incomplete(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("exported table is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("unsupported schema version '{0}'")]
    UnsupportedSchema(String),
    #[error("missing row '{0}'")]
    MissingField(String),
    #[error("invalid value '{value}' in row '{field}'")]
    InvalidValue { field: String, value: String },
    #[error(transparent)]
    Input(#[from] InputError),
}

/// One line of the table. Scalar rows fill the first two columns, vehicle rows the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ExportRow {
    #[serde(rename = "Merkmal")]
    key: Option<String>,
    #[serde(rename = "Wert")]
    value: Option<String>,
    #[serde(rename = "Fahrzeugtyp")]
    vehicle_type: Option<String>,
    #[serde(rename = "Benzinverbrauch (l/100km)")]
    gasoline_l_per_100km: Option<f64>,
    #[serde(rename = "Dieselverbrauch (l/100km)")]
    diesel_l_per_100km: Option<f64>,
    #[serde(rename = "Stromverbrauch (kWh/100km)")]
    electric_kwh_per_100km: Option<f64>,
    #[serde(rename = "Kilometer leer")]
    empty_km: Option<f64>,
    #[serde(rename = "Kilometer besetzt")]
    loaded_km: Option<f64>,
}

impl ExportRow {
    fn scalar<T: ToString>(key: &str, value: T) -> Self {
        ExportRow {
            key: Some(key.to_string()),
            value: Some(value.to_string()),
            ..Default::default()
        }
    }
    fn optional<T: ToString>(key: &str, value: Option<T>) -> Self {
        ExportRow {
            key: Some(key.to_string()),
            value: value.map(|v| v.to_string()),
            ..Default::default()
        }
    }
    fn vehicle(vehicle: &VehicleEntry) -> Self {
        ExportRow {
            vehicle_type: Some(vehicle.type_label.clone()),
            gasoline_l_per_100km: Some(vehicle.gasoline_l_per_100km),
            diesel_l_per_100km: Some(vehicle.diesel_l_per_100km),
            electric_kwh_per_100km: Some(vehicle.electric_kwh_per_100km),
            empty_km: Some(vehicle.empty_km),
            loaded_km: Some(vehicle.loaded_km),
            ..Default::default()
        }
    }
}

fn build_rows(state: &SessionState, report: &Report) -> Result<Vec<ExportRow>, ExportError> {
    let (performance, rp, reference_inputs, reference, selection, volume) = match (
        &report.performance,
        &report.ridepooling_emissions,
        &state.reference,
        &report.reference_mobility,
        &state.emission_factors,
        &state.service_volume,
    ) {
        (Some(p), Some(e), Some(ri), Some(r), Some(s), Some(v)) => (p, e, ri, r, s, v),
        _ => {
            let messages: Vec<String> = report.missing_prerequisites.iter().map(|missing| missing.message()).collect();
            return Err(ExportError::Incomplete(messages.join(" ")));
        }
    };
    let methodology = reference_inputs.methodology;
    let mut rows = vec![
        ExportRow::scalar(KEY_SCHEMA, SCHEMA_VERSION),
        ExportRow::scalar(KEY_METHODOLOGY, methodology.label()),
        ExportRow::optional(KEY_SYSTEM, state.general.system_name.as_ref()),
        ExportRow::optional(KEY_PERIOD_START, state.general.period_start.map(|d| d.format(DATE_FORMAT))),
        ExportRow::optional(KEY_PERIOD_END, state.general.period_end.map(|d| d.format(DATE_FORMAT))),
        ExportRow::scalar(KEY_BOOKINGS, volume.completed_bookings),
        ExportRow::scalar(KEY_PASSENGERS, volume.passengers_transported),
        ExportRow::scalar("Flotte - Fahrzeugkilometer (leer)", round2(performance.empty_km_total)),
        ExportRow::scalar("Flotte - Fahrzeugkilometer (besetzt)", round2(performance.loaded_km_total)),
        ExportRow::scalar("Flotte - Fahrzeugkilometer (gesamt)", round2(performance.total_km)),
        ExportRow::scalar("Flotte - Personenkilometer (gefahren)", round2(performance.person_km_driven)),
        ExportRow::scalar("Durchschnittliche Fahrtdistanz (mit Fahrgast)", round2(performance.avg_distance_per_booking_loaded)),
        ExportRow::scalar("Durchschnittliche Fahrtdistanz (einschließlich Leerkilometern)", round2(performance.avg_distance_per_booking_incl_empty)),
        ExportRow::scalar("Leerkilometeranteil (%)", round2(performance.empty_km_share_percent)),
        ExportRow::scalar("Bündelungsquote", round2(performance.bundling_ratio)),
        ExportRow::scalar("Besetzungsgrad", round2(performance.occupancy_ratio)),
        ExportRow::scalar("Flotte - Benzinverbrauch (gesamt)", round2(report.fleet.gasoline_l)),
        ExportRow::scalar("Flotte - Dieselverbrauch (gesamt)", round2(report.fleet.diesel_l)),
        ExportRow::scalar("Flotte - Stromverbrauch (gesamt)", round2(report.fleet.electricity_kwh)),
        ExportRow::scalar(KEY_GASOLINE_SOURCE, selection.gasoline.label()),
        ExportRow::scalar(KEY_GASOLINE_FACTOR, selection.gasoline.value(selection.gasoline_custom)),
        ExportRow::scalar(KEY_DIESEL_SOURCE, selection.diesel.label()),
        ExportRow::scalar(KEY_DIESEL_FACTOR, selection.diesel.value(selection.diesel_custom)),
        ExportRow::scalar(KEY_ELECTRICITY_SOURCE, selection.electricity.label()),
        ExportRow::scalar(KEY_ELECTRICITY_FACTOR, selection.electricity.value(selection.electricity_custom)),
        ExportRow::scalar(KEY_SECONDARY_SHARE, selection.secondary_share_percent),
        ExportRow::scalar(KEY_SECONDARY_FACTOR, selection.secondary_factor),
        ExportRow::scalar("CO2-Emissionen Benzin (kg CO2eq)", round2(rp.gasoline_kg)),
        ExportRow::scalar("CO2-Emissionen Diesel (kg CO2eq)", round2(rp.diesel_kg)),
        ExportRow::scalar("CO2-Emissionen Strom (kg CO2eq)", round2(rp.electricity_kg)),
        ExportRow::scalar("CO2-Emissionen (gesamt)", round2(rp.total_kg)),
        ExportRow::scalar("CO2-Emissionen pro Personenkilometer", round_to(rp.per_person_km, INTENSITY_DECIMALS)),
    ];
    rows.extend(state.vehicles.iter().map(ExportRow::vehicle));
    if methodology.is_trip_based() {
        rows.push(ExportRow::scalar(KEY_DISTANCE_BASIS, reference_inputs.distance_basis.label()));
    }
    rows.push(ExportRow::scalar("Gesamtemissionen alternative Verkehrsmittel (kg CO2eq)", round2(reference.total_emissions_kg)));
    rows.push(ExportRow::scalar("Personenkilometer alternative Verkehrsmittel (km)", round2(reference.total_person_km)));
    rows.push(ExportRow::scalar(
        "CO2-Emissionen pro Personenkilometer alternative Verkehrsmittel (g CO2eq/pkm)",
        round_to(reference.grams_per_person_km(), INTENSITY_DECIMALS),
    ));
    if let Some(comparison) = &report.comparison {
        rows.push(ExportRow::optional("Prozentuale Differenz (%)", comparison.percent_display()));
        rows.push(ExportRow::scalar("Absolute Differenz (kg CO2eq)", round2(comparison.absolute_difference_kg)));
        rows.push(ExportRow::scalar("Ergebnis", &comparison.message));
    }
    for mode_result in reference.modes.iter() {
        let label = mode_result.mode.label();
        rows.push(ExportRow::scalar(&key_share(label), reference_inputs.share(mode_result.mode)));
        if methodology.is_trip_based() {
            // Custom distances are inputs; the other bases are derived
            let distance = match reference_inputs.distance_basis {
                DistanceBasis::Custom => reference_inputs.custom_distances.get(&mode_result.mode).copied(),
                _ => mode_result.distance_km.map(round2),
            };
            rows.push(ExportRow::optional(&key_distance(label), distance));
        }
        rows.push(ExportRow::scalar(&key_factor(label), reference_inputs.emission_factor(mode_result.mode)));
        rows.push(ExportRow::scalar(&key_person_km(label), round2(mode_result.person_km)));
    }
    Ok(rows)
}

/// Writes the evaluation as CSV. Needs both balances to be available.
pub fn export_csv(state: &SessionState, report: &Report) -> Result<String, ExportError> {
    let rows = build_rows(state, report)?;
    let mut writer = csv::Writer::from_writer(vec![]);
    for row in rows.iter() {
        writer.serialize(row)?;
    }
    let data = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8(data)?)
}

struct Scalars(HashMap<String, Option<String>>);

impl Scalars {
    fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.as_deref()).filter(|value| !value.is_empty())
    }
    fn required_text(&self, key: &str) -> Result<&str, ExportError> {
        self.text(key).ok_or_else(|| ExportError::MissingField(key.to_string()))
    }
    fn parse<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, ExportError> {
        match self.text(key) {
            Some(text) => text
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| ExportError::InvalidValue { field: key.to_string(), value: text.to_string() }),
            None => Ok(None),
        }
    }
    fn required<T: std::str::FromStr>(&self, key: &str) -> Result<T, ExportError> {
        self.parse(key)?.ok_or_else(|| ExportError::MissingField(key.to_string()))
    }
    fn date(&self, key: &str) -> Result<Option<NaiveDate>, ExportError> {
        match self.text(key) {
            Some(text) => NaiveDate::parse_from_str(text, DATE_FORMAT)
                .map(Some)
                .map_err(|_| ExportError::InvalidValue { field: key.to_string(), value: text.to_string() }),
            None => Ok(None),
        }
    }
    fn source<S: FactorSource>(&self, key: &str) -> Result<S, ExportError> {
        let label = self.required_text(key)?;
        S::from_label(label).ok_or_else(|| ExportError::InvalidValue { field: key.to_string(), value: label.to_string() })
    }
}

/// Custom literal of a factor row; named sources carry their fixed value
fn custom_value<S: FactorSource>(source: S, value: f64) -> f64 {
    match source.literal() {
        Some(_) => 0.0,
        None => value,
    }
}

/// Rebuilds a session from an exported table. Derived rows are ignored;
/// every input passes the same validation as the interactive setters.
pub fn import_csv(data: &str, today: NaiveDate) -> Result<SessionState, ExportError> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let mut scalars = HashMap::new();
    let mut vehicles = vec![];
    for record in reader.deserialize::<ExportRow>() {
        let row = record?;
        // The type label may be blank, the numeric columns are always written
        let is_vehicle = row.gasoline_l_per_100km.is_some()
            || row.diesel_l_per_100km.is_some()
            || row.electric_kwh_per_100km.is_some()
            || row.empty_km.is_some()
            || row.loaded_km.is_some();
        if is_vehicle {
            let type_label = row.vehicle_type.unwrap_or_default();
            let field = |value: Option<f64>, name: &str| value.ok_or_else(|| ExportError::MissingField(format!("{} ({})", name, type_label)));
            let vehicle = VehicleEntry::new(&type_label)
                .with_consumption(
                    field(row.gasoline_l_per_100km, "Benzinverbrauch (l/100km)")?,
                    field(row.diesel_l_per_100km, "Dieselverbrauch (l/100km)")?,
                    field(row.electric_kwh_per_100km, "Stromverbrauch (kWh/100km)")?,
                )
                .with_distances(field(row.empty_km, "Kilometer leer")?, field(row.loaded_km, "Kilometer besetzt")?);
            vehicles.push(vehicle);
            continue;
        }
        if let Some(key) = row.key {
            scalars.entry(key).or_insert(row.value);
        }
    }
    let scalars = Scalars(scalars);

    let version = scalars.required_text(KEY_SCHEMA)?;
    if version != SCHEMA_VERSION.to_string() {
        return Err(ExportError::UnsupportedSchema(version.to_string()));
    }

    let mut state = SessionState::new();
    state.set_general(
        GeneralInfo {
            system_name: scalars.text(KEY_SYSTEM).map(|name| name.to_string()),
            period_start: scalars.date(KEY_PERIOD_START)?,
            period_end: scalars.date(KEY_PERIOD_END)?,
        },
        today,
    )?;
    state.set_service_volume(ServiceVolume {
        completed_bookings: scalars.required(KEY_BOOKINGS)?,
        passengers_transported: scalars.required(KEY_PASSENGERS)?,
    });
    for vehicle in vehicles {
        state.add_vehicle(vehicle)?;
    }

    let gasoline: GasolineSource = scalars.source(KEY_GASOLINE_SOURCE)?;
    let diesel: DieselSource = scalars.source(KEY_DIESEL_SOURCE)?;
    let electricity: ElectricitySource = scalars.source(KEY_ELECTRICITY_SOURCE)?;
    state.set_emission_factors(EmissionFactorSelection {
        gasoline,
        gasoline_custom: custom_value(gasoline, scalars.required(KEY_GASOLINE_FACTOR)?),
        diesel,
        diesel_custom: custom_value(diesel, scalars.required(KEY_DIESEL_FACTOR)?),
        electricity,
        electricity_custom: custom_value(electricity, scalars.required(KEY_ELECTRICITY_FACTOR)?),
        secondary_share_percent: scalars.required(KEY_SECONDARY_SHARE)?,
        secondary_factor: scalars.required(KEY_SECONDARY_FACTOR)?,
    })?;

    let methodology_label = scalars.required_text(KEY_METHODOLOGY)?;
    let methodology = Methodology::from_label(methodology_label).ok_or_else(|| ExportError::InvalidValue {
        field: KEY_METHODOLOGY.to_string(),
        value: methodology_label.to_string(),
    })?;
    let mut inputs = ReferenceInputs::new(methodology);
    if methodology.is_trip_based() {
        let basis_label = scalars.required_text(KEY_DISTANCE_BASIS)?;
        inputs.distance_basis = DistanceBasis::from_label(basis_label).ok_or_else(|| ExportError::InvalidValue {
            field: KEY_DISTANCE_BASIS.to_string(),
            value: basis_label.to_string(),
        })?;
    }
    for mode in methodology.modes().iter().copied() {
        let label = mode.label();
        inputs.shares.insert(mode, scalars.required(&key_share(label))?);
        inputs.emission_factors.insert(mode, scalars.required(&key_factor(label))?);
        if inputs.distance_basis == DistanceBasis::Custom && methodology.is_trip_based() {
            if let Some(distance) = scalars.parse::<f64>(&key_distance(label))? {
                inputs.custom_distances.insert(mode, distance);
            }
        }
    }
    state.select_methodology(methodology)?;
    state.set_reference(inputs)?;
    Ok(state)
}
