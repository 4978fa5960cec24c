use actix_web::{HttpResponse, web, Error};
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use oekorps::export::import_csv;
use oekorps::session::SessionState;

use crate::rest_api::{
    APIStorage,
    ErrorResponse,
    export_error_response,
    storage_error_response,
};

/// Session identifier together with all inputs entered so far
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    #[schema(example = "67e55044-10b1-426f-9247-bb680e5fe0c8")]
    pub session_id: Uuid,
    pub state: SessionState,
}

/// Response on session deletion
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    #[schema(example = "ok")]
    pub message: String,
}

/// Answers with the current state of the session
pub fn session_response(data: &APIStorage, session_id: Uuid) -> HttpResponse {
    match data.sessions.with_session(&session_id, |state| state.clone()) {
        Ok(state) => HttpResponse::Ok().json(SessionResponse { session_id, state }),
        Err(err) => storage_error_response(err),
    }
}

#[utoipa::path(
    post,
    tag = "Sessions",
    path = "/api/sessions",
    responses(
        (status = 201, description = "New empty session", body = SessionResponse),
        (status = 503, description = "Session limit reached", body = ErrorResponse)
    )
)]
pub async fn create_session(data: web::Data<APIStorage>) -> Result<HttpResponse, Error> {
    match data.sessions.create() {
        Ok(session_id) => Ok(HttpResponse::Created().json(SessionResponse { session_id, state: SessionState::new() })),
        Err(err) => {
            warn!("Can't create session: {}", err);
            Ok(storage_error_response(err))
        }
    }
}

#[utoipa::path(
    post,
    tag = "Sessions",
    path = "/api/sessions/import",
    request_body(content = String, description = "CSV table produced by the export", content_type = "text/csv"),
    responses(
        (status = 201, description = "Session rebuilt from the table", body = SessionResponse),
        (status = 422, description = "Table can't be read or holds invalid values", body = ErrorResponse),
        (status = 503, description = "Session limit reached", body = ErrorResponse)
    )
)]
pub async fn import_session(data: web::Data<APIStorage>, body: String) -> Result<HttpResponse, Error> {
    let state = match import_csv(&body, data.today()) {
        Ok(state) => state,
        Err(err) => {
            warn!("Can't import session: {}", err);
            return Ok(export_error_response(err));
        }
    };
    match data.sessions.insert(state.clone()) {
        Ok(session_id) => {
            info!("Session {} imported with {} vehicle(s)", session_id, state.vehicles.len());
            Ok(HttpResponse::Created().json(SessionResponse { session_id, state }))
        },
        Err(err) => Ok(storage_error_response(err)),
    }
}

#[utoipa::path(
    get,
    tag = "Sessions",
    path = "/api/sessions/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "Session identifier")
    ),
    responses(
        (status = 200, description = "Inputs of the session", body = SessionResponse),
        (status = 404, description = "No such session", body = ErrorResponse)
    )
)]
pub async fn get_session(data: web::Data<APIStorage>, path: web::Path<Uuid>) -> Result<HttpResponse, Error> {
    Ok(session_response(&data, path.into_inner()))
}

#[utoipa::path(
    delete,
    tag = "Sessions",
    path = "/api/sessions/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "Session identifier")
    ),
    responses(
        (status = 200, description = "Session has been deleted", body = DeleteResponse),
        (status = 404, description = "No such session", body = ErrorResponse)
    )
)]
pub async fn delete_session(data: web::Data<APIStorage>, path: web::Path<Uuid>) -> Result<HttpResponse, Error> {
    match data.sessions.remove(&path.into_inner()) {
        Ok(_) => Ok(HttpResponse::Ok().json(DeleteResponse { message: "ok".to_string() })),
        Err(err) => Ok(storage_error_response(err)),
    }
}
