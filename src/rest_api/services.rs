use actix_web::{HttpResponse, web, Responder};

use crate::rest_api::{
    sessions,
    inputs,
    reports,
};

async fn say_ping() -> impl Responder {
    HttpResponse::Ok().body("pong")
}

pub fn init_routes(api_scope: String) -> impl Fn(&mut web::ServiceConfig) {
    move |cfg| {
        let docs_json = format!("{}/docs.json", api_scope);
        cfg
            .service(
                web::scope(&api_scope)
                .service(RapiDoc::with_openapi("/docs.json", ApiDoc::openapi()))
                .service(RapiDoc::new(Box::leak(docs_json.clone().into_boxed_str())).path("/docs"))
                .route("/ping", web::get().to(say_ping))
                .route("/catalog", web::get().to(reports::catalog))
                .service(
                    web::scope("/sessions")
                    .route("", web::post().to(sessions::create_session))
                    .route("/import", web::post().to(sessions::import_session))
                    .route("/{session_id}", web::get().to(sessions::get_session))
                    .route("/{session_id}", web::delete().to(sessions::delete_session))
                    .route("/{session_id}/general", web::post().to(inputs::set_general))
                    .route("/{session_id}/service_volume", web::post().to(inputs::set_service_volume))
                    .route("/{session_id}/vehicles/add", web::post().to(inputs::add_vehicle))
                    .route("/{session_id}/vehicles/update", web::post().to(inputs::update_vehicle))
                    .route("/{session_id}/vehicles/remove_last", web::post().to(inputs::remove_last_vehicle))
                    .route("/{session_id}/emission_factors", web::post().to(inputs::set_emission_factors))
                    .route("/{session_id}/methodology", web::post().to(inputs::select_methodology))
                    .route("/{session_id}/methodology/reset", web::post().to(inputs::reset_methodology))
                    .route("/{session_id}/reference", web::post().to(inputs::set_reference))
                    .route("/{session_id}/report", web::get().to(reports::session_report))
                    .route("/{session_id}/export", web::get().to(reports::export_session))
                )
            );
    }
}

/* Swagger section */
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        reports::catalog,
        sessions::create_session,
        sessions::import_session,
        sessions::get_session,
        sessions::delete_session,
        inputs::set_general,
        inputs::set_service_volume,
        inputs::add_vehicle,
        inputs::update_vehicle,
        inputs::remove_last_vehicle,
        inputs::set_emission_factors,
        inputs::select_methodology,
        inputs::reset_methodology,
        inputs::set_reference,
        reports::session_report,
        reports::export_session,
    ),
    tags(
        (name = "Sessions", description = "Creating, restoring and deleting evaluation sessions"),
        (name = "Inputs", description = "Form sections of an evaluation"),
        (name = "Results", description = "Greenhouse-gas balance, charts and CSV export"),
    ),
    components(
        // We need to import all possible schemas since `utopia` can't discover recursive schemas (yet?)
        schemas(
            crate::rest_api::ErrorResponse,
            crate::rest_api::sessions::SessionResponse,
            crate::rest_api::sessions::DeleteResponse,
            crate::rest_api::reports::ReportResponse,
            crate::rest_api::inputs::ServiceVolumeRequest,
            crate::rest_api::inputs::VehicleAddRequest,
            crate::rest_api::inputs::VehicleUpdateRequest,
            crate::rest_api::inputs::MethodologyRequest,
            oekorps::session::SessionState,
            oekorps::report::GeneralInfo,
            oekorps::report::Report,
            oekorps::report::ChartSeries,
            oekorps::report::ChartPoint,
            oekorps::catalog::CatalogView,
            oekorps::catalog::SystemPresetView,
            oekorps::catalog::SharePresetView,
            oekorps::fleet::VehicleEntry,
            oekorps::fleet::FleetTotals,
            oekorps::performance::ServiceVolume,
            oekorps::performance::PerformanceMetrics,
            oekorps::emission_factors::EmissionFactorSelection,
            oekorps::emission_factors::ResolvedEmissionFactors,
            oekorps::emission_factors::GasolineSource,
            oekorps::emission_factors::DieselSource,
            oekorps::emission_factors::ElectricitySource,
            oekorps::ridepooling_emissions::RidepoolingEmissions,
            oekorps::ridepooling_emissions::ElectricityBlendPolicy,
            oekorps::reference_mobility::Methodology,
            oekorps::reference_mobility::DistanceBasis,
            oekorps::reference_mobility::TransportMode,
            oekorps::reference_mobility::ReferenceInputs,
            oekorps::reference_mobility::ModeResult,
            oekorps::reference_mobility::ReferenceMobilityResult,
            oekorps::reference_mobility::ShareSumCheck,
            oekorps::comparison::ComparisonResult,
            oekorps::comparison::ComparisonVerdict,
            oekorps::errors::MissingPrerequisite,
            oekorps::errors::Stage,
        ),
    )
)]
pub struct ApiDoc;
