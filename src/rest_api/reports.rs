use actix_web::{HttpResponse, web, Error, http::header};
use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use oekorps::catalog::{CatalogView, catalog_view};
use oekorps::export::export_csv;
use oekorps::report::Report;

use crate::rest_api::{
    APIStorage,
    ErrorResponse,
    export_error_response,
    storage_error_response,
};

/// Derived figures of a session
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse {
    #[schema(example = "67e55044-10b1-426f-9247-bb680e5fe0c8")]
    pub session_id: Uuid,
    pub report: Report,
    /// Short German summary, one line per figure
    pub summary: Vec<String>,
}

#[utoipa::path(
    get,
    tag = "Results",
    path = "/api/catalog",
    responses(
        (status = 200, description = "Vehicle types, known systems and share presets", body = CatalogView)
    )
)]
pub async fn catalog() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(catalog_view()))
}

#[utoipa::path(
    get,
    tag = "Results",
    path = "/api/sessions/{session_id}/report",
    params(("session_id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Balances computed from the current inputs", body = ReportResponse),
        (status = 404, description = "No such session", body = ErrorResponse)
    )
)]
pub async fn session_report(data: web::Data<APIStorage>, path: web::Path<Uuid>) -> Result<HttpResponse, Error> {
    let session_id = path.into_inner();
    let policy = data.blend_policy;
    let today = data.today();
    match data.sessions.with_session(&session_id, |state| state.recompute(policy, today)) {
        Ok(report) => {
            debug!("Session {}: report with {} missing stage(s)", session_id, report.missing_prerequisites.len());
            let summary = report.summary_lines();
            Ok(HttpResponse::Ok().json(ReportResponse { session_id, report, summary }))
        },
        Err(err) => Ok(storage_error_response(err)),
    }
}

#[utoipa::path(
    get,
    tag = "Results",
    path = "/api/sessions/{session_id}/export",
    params(("session_id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "CSV table with all inputs and results", content_type = "text/csv", body = String),
        (status = 404, description = "No such session", body = ErrorResponse),
        (status = 424, description = "Balances are incomplete", body = ErrorResponse)
    )
)]
pub async fn export_session(data: web::Data<APIStorage>, path: web::Path<Uuid>) -> Result<HttpResponse, Error> {
    let session_id = path.into_inner();
    let policy = data.blend_policy;
    let today = data.today();
    let exported = match data.sessions.with_session(&session_id, |state| {
        let report = state.recompute(policy, today);
        export_csv(state, &report)
    }) {
        Ok(exported) => exported,
        Err(err) => {
            return Ok(storage_error_response(err));
        }
    };
    match exported {
        Ok(table) => {
            info!("Session {} exported ({} bytes)", session_id, table.len());
            Ok(HttpResponse::Ok()
                .content_type("text/csv; charset=utf-8")
                .insert_header((header::CONTENT_DISPOSITION, format!("attachment; filename=\"oekorps_{}.csv\"", today.format("%Y-%m-%d"))))
                .body(table))
        },
        Err(err) => {
            debug!("Session {}: export refused: {}", session_id, err);
            Ok(export_error_response(err))
        }
    }
}
