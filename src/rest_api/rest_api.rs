use actix_web::{web, http, App, HttpResponse, HttpServer, http::StatusCode};
use actix_cors::Cors;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use oekorps::errors::InputError;
use oekorps::export::ExportError;
use oekorps::ridepooling_emissions::ElectricityBlendPolicy;
use oekorps::session_storage::{SessionStorage, StorageError};

use crate::settings::AppSettings;
use crate::rest_api::services;

pub struct APIStorage {
    pub sessions: SessionStorage,
    pub app_settings: AppSettings,
    pub blend_policy: ElectricityBlendPolicy,
}

impl APIStorage {
    /// Date the observation period is checked against
    pub fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    #[schema(example = "no such session. Requested ID: 67e55044-10b1-426f-9247-bb680e5fe0c8")]
    pub error_text: String,
}

pub fn error_response(status: StatusCode, error_text: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse { error_text })
}

pub fn storage_error_response(err: StorageError) -> HttpResponse {
    let status = match err {
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        StorageError::SessionLimit(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    error_response(status, err.to_string())
}

pub fn input_error_response(err: InputError) -> HttpResponse {
    error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
}

pub fn export_error_response(err: ExportError) -> HttpResponse {
    let status = match err {
        ExportError::Incomplete(_) => StatusCode::FAILED_DEPENDENCY,
        ExportError::Io(_) | ExportError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    error_response(status, err.to_string())
}

#[actix_web::main]
pub async fn start_rest_api(storage: APIStorage) -> std::io::Result<()> {
    let server_host = storage.app_settings.rest_api.host.clone();
    let server_port = storage.app_settings.rest_api.back_end_port;
    let api_scope = storage.app_settings.rest_api.api_scope.clone();
    let bind_address = format!("{}:{}", server_host, server_port);
    info!("REST API is starting on host:port {}:{}", server_host, server_port);
    let data = web::Data::new(storage);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_headers(vec![http::header::ORIGIN, http::header::AUTHORIZATION, http::header::CONTENT_TYPE, http::header::CONTENT_LENGTH, http::header::ACCEPT, http::header::ACCEPT_ENCODING])
            .allowed_methods(vec!["GET", "POST", "DELETE"])
            .expose_headers(vec![http::header::CONTENT_LENGTH, http::header::CONTENT_DISPOSITION])
            .supports_credentials()
            .max_age(5600);
        App::new()
            .wrap(cors)
            .app_data(data.clone())
            .configure(services::init_routes(api_scope.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
