// rest_api/src/lib.rs

use std::future::Future;

use anyhow::Context;
use axum::{
    Json, Router,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info, warn};
use models::SchedulingError;
use scheduler::Clinic;
use scheduler::config::ServerConfig;
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub mod config;
mod handlers;

#[derive(Debug, Error)]
pub enum RestApiError {
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl RestApiError {
    fn status(&self) -> StatusCode {
        match self {
            RestApiError::Scheduling(e) => match e {
                SchedulingError::NotFound { .. } => StatusCode::NOT_FOUND,
                SchedulingError::AlreadyExists(_)
                | SchedulingError::DoctorUnavailable { .. }
                | SchedulingError::ResourceUnavailable { .. }
                | SchedulingError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
                SchedulingError::Validation(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            RestApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            RestApiError::Scheduling(e) => e.code(),
            RestApiError::InvalidInput(_) => "validation",
        }
    }
}

impl IntoResponse for RestApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if matches!(&self, RestApiError::Scheduling(e) if e.is_transient()) {
            error!("Request failed, retryable: {}", self);
        } else if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }
        let body = Json(json!({
            "status": "error",
            "code": self.code(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, RestApiError>;

/// Every `/api/v1` route, sharing one clinic.
pub fn router(clinic: Clinic) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any);

    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/patients", post(handlers::create_patient))
        .route("/patients/:id", get(handlers::patient))
        .route("/patients/:id/calendar", get(handlers::patients_calendar))
        .route("/patients/:id/appointments/:appointment_id", get(handlers::patient_appointment))
        .route("/doctors", post(handlers::create_doctor).get(handlers::doctors))
        .route("/doctors/available", get(handlers::available_doctors))
        .route("/doctors/:id", get(handlers::doctor))
        .route("/doctors/:id/calendar", get(handlers::doctors_calendar))
        .route("/doctors/:id/timeslots", get(handlers::time_slots))
        .route("/doctors/:id/appointments/:appointment_id", get(handlers::doctor_appointment))
        .route("/appointments", post(handlers::create_appointment))
        .route("/appointments/:id/cancel", post(handlers::cancel_appointment))
        .route("/appointments/:id/reschedule", post(handlers::reschedule_appointment))
        .route("/appointments/:id/decision", post(handlers::decide_appointment))
        .route("/appointments/:id/resources", post(handlers::assign_resources))
        .route("/resources", post(handlers::create_resource).get(handlers::resources))
        .route("/resources/available", get(handlers::available_resources))
        .route("/resources/:id/reservations", post(handlers::reserve_resource))
        .route("/conditions", post(handlers::create_condition))
        .route("/conditions/:id", get(handlers::condition_detail).patch(handlers::update_condition))
        .route("/prescriptions", post(handlers::create_prescription))
        .route(
            "/prescriptions/:id",
            get(handlers::prescription)
                .patch(handlers::update_prescription)
                .delete(handlers::delete_prescription),
        )
        .with_state(clinic);

    Router::new().nest("/api/v1", api).layer(cors)
}

/// Serves the API until `shutdown` resolves.
pub async fn start_server(
    server: &ServerConfig,
    clinic: Clinic,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = format!("{}:{}", server.host, server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;
    info!("REST API server listening on {}", addr);

    axum::serve(listener, router(clinic.clone()).into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("REST API server failed to start or run")?;

    clinic.flush().await.context("Failed to flush storage on shutdown")?;
    info!("REST API server stopped.");
    Ok(())
}
