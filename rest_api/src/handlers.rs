// rest_api/src/handlers.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, Utc};
use models::medical::{
    ActorRole, Appointment, Calendar, Condition, ConditionDetail, ConditionPatch, DecisionAction, Doctor,
    DoctorAppointment, NewAppointment, NewCondition, NewDoctor, NewPatient, NewPrescription, NewResource, Patient,
    PatientAppointment, Prescription, PrescriptionPatch, Reservation, ReservationRequest, Resource,
    ResourceAssignment, ResourceSelection, ResourceSet, TimeSlot,
};
use scheduler::Clinic;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{ApiResult, RestApiError};

type Created<T> = Result<(StatusCode, Json<T>), RestApiError>;

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub from: DateTime<Utc>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantQuery {
    pub date_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub by: ActorRole,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    pub appointment_date_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub action: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub resources: ResourceSelection,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Clinic scheduler is healthy" }))
}

pub async fn create_patient(State(clinic): State<Clinic>, Json(body): Json<NewPatient>) -> Created<Patient> {
    let patient = clinic.records().create_patient(body).await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn patient(State(clinic): State<Clinic>, Path(id): Path<Uuid>) -> ApiResult<Patient> {
    Ok(Json(clinic.records().patient(id).await?))
}

pub async fn patients_calendar(
    State(clinic): State<Clinic>,
    Path(id): Path<Uuid>,
    Query(window): Query<WindowQuery>,
) -> ApiResult<Calendar> {
    Ok(Json(clinic.availability().patients_calendar(id, window.from, window.to).await?))
}

pub async fn patient_appointment(
    State(clinic): State<Clinic>,
    Path((id, appointment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<PatientAppointment> {
    Ok(Json(clinic.appointments().patient_appointment(id, appointment_id).await?))
}

pub async fn create_doctor(State(clinic): State<Clinic>, Json(body): Json<NewDoctor>) -> Created<Doctor> {
    let doctor = clinic.records().create_doctor(body).await?;
    Ok((StatusCode::CREATED, Json(doctor)))
}

pub async fn doctors(State(clinic): State<Clinic>) -> ApiResult<Vec<Doctor>> {
    Ok(Json(clinic.records().doctors().await?))
}

pub async fn available_doctors(
    State(clinic): State<Clinic>,
    Query(query): Query<InstantQuery>,
) -> ApiResult<Vec<Doctor>> {
    Ok(Json(clinic.availability().available_doctors(query.date_time).await?))
}

pub async fn doctor(State(clinic): State<Clinic>, Path(id): Path<Uuid>) -> ApiResult<Doctor> {
    Ok(Json(clinic.records().doctor(id).await?))
}

pub async fn doctors_calendar(
    State(clinic): State<Clinic>,
    Path(id): Path<Uuid>,
    Query(window): Query<WindowQuery>,
) -> ApiResult<Calendar> {
    Ok(Json(clinic.availability().doctors_calendar(id, window.from, window.to).await?))
}

pub async fn time_slots(
    State(clinic): State<Clinic>,
    Path(id): Path<Uuid>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Vec<TimeSlot>> {
    Ok(Json(clinic.appointments().time_slots(id, query.date).await?))
}

pub async fn doctor_appointment(
    State(clinic): State<Clinic>,
    Path((id, appointment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<DoctorAppointment> {
    Ok(Json(clinic.appointments().doctor_appointment(id, appointment_id).await?))
}

pub async fn create_appointment(
    State(clinic): State<Clinic>,
    Json(body): Json<NewAppointment>,
) -> Created<PatientAppointment> {
    let view = clinic.appointments().create(body).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn cancel_appointment(
    State(clinic): State<Clinic>,
    Path(id): Path<Uuid>,
    Json(body): Json<CancelRequest>,
) -> ApiResult<Appointment> {
    Ok(Json(clinic.appointments().cancel(id, body.by, body.reason).await?))
}

pub async fn reschedule_appointment(
    State(clinic): State<Clinic>,
    Path(id): Path<Uuid>,
    Json(body): Json<RescheduleRequest>,
) -> ApiResult<PatientAppointment> {
    Ok(Json(clinic.appointments().reschedule(id, body.appointment_date_time).await?))
}

pub async fn decide_appointment(
    State(clinic): State<Clinic>,
    Path(id): Path<Uuid>,
    Json(body): Json<DecisionRequest>,
) -> ApiResult<DoctorAppointment> {
    let action: DecisionAction = body.action.parse().map_err(models::SchedulingError::from)?;
    Ok(Json(clinic.decisions().decide(id, action, body.reason, &body.resources).await?))
}

pub async fn assign_resources(
    State(clinic): State<Clinic>,
    Path(id): Path<Uuid>,
    Json(body): Json<ResourceAssignment>,
) -> ApiResult<DoctorAppointment> {
    Ok(Json(clinic.decisions().assign_resources(id, &body).await?))
}

pub async fn create_resource(State(clinic): State<Clinic>, Json(body): Json<NewResource>) -> Created<Resource> {
    let resource = clinic.records().create_resource(body).await?;
    Ok((StatusCode::CREATED, Json(resource)))
}

pub async fn resources(State(clinic): State<Clinic>) -> ApiResult<ResourceSet> {
    Ok(Json(clinic.records().resources().await?))
}

pub async fn available_resources(
    State(clinic): State<Clinic>,
    Query(query): Query<InstantQuery>,
) -> ApiResult<ResourceSet> {
    Ok(Json(clinic.reservations().available_resources_at(query.date_time).await?))
}

pub async fn reserve_resource(
    State(clinic): State<Clinic>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReservationRequest>,
) -> Created<Reservation> {
    let reservation = clinic.reservations().reserve_resource(id, body).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

pub async fn create_condition(State(clinic): State<Clinic>, Json(body): Json<NewCondition>) -> Created<Condition> {
    let condition = clinic.records().create_condition(body).await?;
    Ok((StatusCode::CREATED, Json(condition)))
}

pub async fn condition_detail(State(clinic): State<Clinic>, Path(id): Path<Uuid>) -> ApiResult<ConditionDetail> {
    Ok(Json(clinic.records().condition_detail(id).await?))
}

pub async fn update_condition(
    State(clinic): State<Clinic>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ConditionPatch>,
) -> ApiResult<Condition> {
    Ok(Json(clinic.records().update_condition(id, &patch).await?))
}

pub async fn create_prescription(
    State(clinic): State<Clinic>,
    Json(body): Json<NewPrescription>,
) -> Created<Prescription> {
    let prescription = clinic.records().create_prescription(body).await?;
    Ok((StatusCode::CREATED, Json(prescription)))
}

pub async fn prescription(State(clinic): State<Clinic>, Path(id): Path<Uuid>) -> ApiResult<Prescription> {
    Ok(Json(clinic.records().prescription(id).await?))
}

pub async fn update_prescription(
    State(clinic): State<Clinic>,
    Path(id): Path<Uuid>,
    Json(patch): Json<PrescriptionPatch>,
) -> ApiResult<Prescription> {
    Ok(Json(clinic.records().update_prescription(id, &patch).await?))
}

pub async fn delete_prescription(
    State(clinic): State<Clinic>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, RestApiError> {
    clinic.records().delete_prescription(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
