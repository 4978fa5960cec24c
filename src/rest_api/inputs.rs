use actix_web::{HttpResponse, web, Error};
use serde::Deserialize;
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use oekorps::emission_factors::EmissionFactorSelection;
use oekorps::errors::InputError;
use oekorps::fleet::VehicleEntry;
use oekorps::reference_mobility::{Methodology, ReferenceInputs};
use oekorps::report::GeneralInfo;
use oekorps::session::SessionState;

use crate::rest_api::{
    APIStorage,
    ErrorResponse,
    input_error_response,
    storage_error_response,
};
use crate::rest_api::sessions::{SessionResponse, session_response};

/// Applies a mutation to the session and answers with its new state
fn mutate<F>(data: &APIStorage, session_id: Uuid, mutation: F) -> HttpResponse
where
    F: FnOnce(&mut SessionState) -> Result<(), InputError>,
{
    match data.sessions.with_session(&session_id, mutation) {
        Ok(Ok(_)) => session_response(data, session_id),
        Ok(Err(err)) => {
            debug!("Input rejected for session {}: {}", session_id, err);
            input_error_response(err)
        },
        Err(err) => storage_error_response(err),
    }
}

/// Service volume. A known system may be given to pre-fill the numbers;
/// explicit numbers override the preset.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ServiceVolumeRequest {
    /// Label of a ridepooling system from the catalog
    #[schema(example = "bussi")]
    pub preset: Option<String>,
    #[schema(example = 8475)]
    pub completed_bookings: Option<u64>,
    #[schema(example = 13876)]
    pub passengers_transported: Option<u64>,
}

/// New fleet entry. Without consumption figures the catalog values of `type_label` are used.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VehicleAddRequest {
    #[schema(example = "Mercedes EQV 300 extra lang")]
    pub type_label: String,
    pub gasoline_l_per_100km: Option<f64>,
    pub diesel_l_per_100km: Option<f64>,
    pub electric_kwh_per_100km: Option<f64>,
    #[schema(example = 50422.31)]
    pub empty_km: f64,
    #[schema(example = 40063.44)]
    pub loaded_km: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VehicleUpdateRequest {
    /// Position in the fleet list, starting at 0
    #[schema(example = 0)]
    pub index: usize,
    pub vehicle: VehicleEntry,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MethodologyRequest {
    pub methodology: Methodology,
    /// Label of a share preset matching the methodology
    #[schema(example = "Modal Split (Wege) MiD 2017")]
    pub preset: Option<String>,
}

#[utoipa::path(
    post,
    tag = "Inputs",
    path = "/api/sessions/{session_id}/general",
    params(("session_id" = Uuid, Path, description = "Session identifier")),
    request_body = GeneralInfo,
    responses(
        (status = 200, description = "General information has been updated", body = SessionResponse),
        (status = 404, description = "No such session", body = ErrorResponse),
        (status = 422, description = "Invalid observation period", body = ErrorResponse)
    )
)]
pub async fn set_general(data: web::Data<APIStorage>, path: web::Path<Uuid>, body: web::Json<GeneralInfo>) -> Result<HttpResponse, Error> {
    let today = data.today();
    let general = body.into_inner();
    Ok(mutate(&data, path.into_inner(), |state| state.set_general(general, today)))
}

#[utoipa::path(
    post,
    tag = "Inputs",
    path = "/api/sessions/{session_id}/service_volume",
    params(("session_id" = Uuid, Path, description = "Session identifier")),
    request_body = ServiceVolumeRequest,
    responses(
        (status = 200, description = "Service volume has been updated", body = SessionResponse),
        (status = 404, description = "No such session", body = ErrorResponse),
        (status = 422, description = "Unknown preset", body = ErrorResponse)
    )
)]
pub async fn set_service_volume(data: web::Data<APIStorage>, path: web::Path<Uuid>, body: web::Json<ServiceVolumeRequest>) -> Result<HttpResponse, Error> {
    let request = body.into_inner();
    Ok(mutate(&data, path.into_inner(), |state| {
        if let Some(preset) = &request.preset {
            state.apply_system_preset(preset)?;
        }
        let mut volume = state.service_volume.unwrap_or_default();
        if let Some(bookings) = request.completed_bookings {
            volume.completed_bookings = bookings;
        }
        if let Some(passengers) = request.passengers_transported {
            volume.passengers_transported = passengers;
        }
        state.set_service_volume(volume);
        Ok(())
    }))
}

#[utoipa::path(
    post,
    tag = "Inputs",
    path = "/api/sessions/{session_id}/vehicles/add",
    params(("session_id" = Uuid, Path, description = "Session identifier")),
    request_body = VehicleAddRequest,
    responses(
        (status = 200, description = "Vehicle has been appended to the fleet", body = SessionResponse),
        (status = 404, description = "No such session", body = ErrorResponse),
        (status = 422, description = "Unknown vehicle type or invalid figures", body = ErrorResponse)
    )
)]
pub async fn add_vehicle(data: web::Data<APIStorage>, path: web::Path<Uuid>, body: web::Json<VehicleAddRequest>) -> Result<HttpResponse, Error> {
    let request = body.into_inner();
    Ok(mutate(&data, path.into_inner(), |state| {
        let custom_consumption = request.gasoline_l_per_100km.is_some()
            || request.diesel_l_per_100km.is_some()
            || request.electric_kwh_per_100km.is_some();
        if custom_consumption {
            let vehicle = VehicleEntry::new(&request.type_label)
                .with_consumption(
                    request.gasoline_l_per_100km.unwrap_or(0.0),
                    request.diesel_l_per_100km.unwrap_or(0.0),
                    request.electric_kwh_per_100km.unwrap_or(0.0),
                )
                .with_distances(request.empty_km, request.loaded_km);
            state.add_vehicle(vehicle)?;
        } else {
            state.add_catalog_vehicle(&request.type_label, request.empty_km, request.loaded_km)?;
        }
        Ok(())
    }))
}

#[utoipa::path(
    post,
    tag = "Inputs",
    path = "/api/sessions/{session_id}/vehicles/update",
    params(("session_id" = Uuid, Path, description = "Session identifier")),
    request_body = VehicleUpdateRequest,
    responses(
        (status = 200, description = "Vehicle has been replaced", body = SessionResponse),
        (status = 404, description = "No such session", body = ErrorResponse),
        (status = 422, description = "No vehicle at the index or invalid figures", body = ErrorResponse)
    )
)]
pub async fn update_vehicle(data: web::Data<APIStorage>, path: web::Path<Uuid>, body: web::Json<VehicleUpdateRequest>) -> Result<HttpResponse, Error> {
    let request = body.into_inner();
    Ok(mutate(&data, path.into_inner(), |state| state.update_vehicle(request.index, request.vehicle)))
}

#[utoipa::path(
    post,
    tag = "Inputs",
    path = "/api/sessions/{session_id}/vehicles/remove_last",
    params(("session_id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Last vehicle has been removed", body = SessionResponse),
        (status = 404, description = "No such session", body = ErrorResponse),
        (status = 422, description = "Fleet is empty", body = ErrorResponse)
    )
)]
pub async fn remove_last_vehicle(data: web::Data<APIStorage>, path: web::Path<Uuid>) -> Result<HttpResponse, Error> {
    Ok(mutate(&data, path.into_inner(), |state| state.remove_last_vehicle().map(|_| ())))
}

#[utoipa::path(
    post,
    tag = "Inputs",
    path = "/api/sessions/{session_id}/emission_factors",
    params(("session_id" = Uuid, Path, description = "Session identifier")),
    request_body = EmissionFactorSelection,
    responses(
        (status = 200, description = "Emission factors have been selected", body = SessionResponse),
        (status = 404, description = "No such session", body = ErrorResponse),
        (status = 422, description = "Negative factor or share outside [0; 100]", body = ErrorResponse)
    )
)]
pub async fn set_emission_factors(data: web::Data<APIStorage>, path: web::Path<Uuid>, body: web::Json<EmissionFactorSelection>) -> Result<HttpResponse, Error> {
    let selection = body.into_inner();
    Ok(mutate(&data, path.into_inner(), |state| state.set_emission_factors(selection)))
}

#[utoipa::path(
    post,
    tag = "Inputs",
    path = "/api/sessions/{session_id}/methodology",
    params(("session_id" = Uuid, Path, description = "Session identifier")),
    request_body = MethodologyRequest,
    responses(
        (status = 200, description = "Methodology has been selected", body = SessionResponse),
        (status = 404, description = "No such session", body = ErrorResponse),
        (status = 422, description = "Another methodology is selected already or the preset doesn't match", body = ErrorResponse)
    )
)]
pub async fn select_methodology(data: web::Data<APIStorage>, path: web::Path<Uuid>, body: web::Json<MethodologyRequest>) -> Result<HttpResponse, Error> {
    let request = body.into_inner();
    let session_id = path.into_inner();
    info!("Session {}: methodology '{}' requested", session_id, request.methodology);
    Ok(mutate(&data, session_id, |state| state.select_methodology_with_preset(request.methodology, request.preset.as_deref())))
}

#[utoipa::path(
    post,
    tag = "Inputs",
    path = "/api/sessions/{session_id}/methodology/reset",
    params(("session_id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Reference mobility inputs have been dropped", body = SessionResponse),
        (status = 404, description = "No such session", body = ErrorResponse)
    )
)]
pub async fn reset_methodology(data: web::Data<APIStorage>, path: web::Path<Uuid>) -> Result<HttpResponse, Error> {
    let session_id = path.into_inner();
    info!("Session {}: methodology reset", session_id);
    Ok(mutate(&data, session_id, |state| {
        state.reset_methodology();
        Ok(())
    }))
}

#[utoipa::path(
    post,
    tag = "Inputs",
    path = "/api/sessions/{session_id}/reference",
    params(("session_id" = Uuid, Path, description = "Session identifier")),
    request_body = ReferenceInputs,
    responses(
        (status = 200, description = "Reference mobility inputs have been updated", body = SessionResponse),
        (status = 404, description = "No such session", body = ErrorResponse),
        (status = 422, description = "No or another methodology selected, or values out of bounds", body = ErrorResponse)
    )
)]
pub async fn set_reference(data: web::Data<APIStorage>, path: web::Path<Uuid>, body: web::Json<ReferenceInputs>) -> Result<HttpResponse, Error> {
    let inputs = body.into_inner();
    Ok(mutate(&data, path.into_inner(), |state| state.set_reference(inputs)))
}
