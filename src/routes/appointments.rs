use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::appointments::{AppointmentRequest, AppointmentWithServices, BookedTimeList},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::BookedTimesQuery,
    services::appointment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_booked_times).post(create_appointment))
        .route(
            "/{id}",
            get(get_appointment)
                .put(update_appointment)
                .delete(cancel_appointment),
        )
}

#[utoipa::path(
    get,
    path = "/api/appointments",
    params(
        ("date" = String, Query, description = "Day to inspect, dd/MM/yyyy")
    ),
    responses(
        (status = 200, description = "Times already booked that day", body = ApiResponse<BookedTimeList>),
        (status = 400, description = "Unparsable date"),
    ),
    security(("bearer_auth" = [])),
    tag = "Appointments"
)]
pub async fn list_booked_times(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<BookedTimesQuery>,
) -> AppResult<Json<ApiResponse<BookedTimeList>>> {
    let resp = appointment_service::list_booked_times(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = AppointmentRequest,
    responses(
        (status = 200, description = "Appointment booked", body = ApiResponse<AppointmentWithServices>),
        (status = 400, description = "Unknown service or slot already booked"),
    ),
    security(("bearer_auth" = [])),
    tag = "Appointments"
)]
pub async fn create_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AppointmentRequest>,
) -> AppResult<Json<ApiResponse<AppointmentWithServices>>> {
    let resp = appointment_service::create_appointment(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    params(
        ("id" = Uuid, Path, description = "Appointment ID")
    ),
    responses(
        (status = 200, description = "Appointment with its services", body = ApiResponse<AppointmentWithServices>),
        (status = 403, description = "Caller is neither owner nor admin"),
        (status = 404, description = "Appointment not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Appointments"
)]
pub async fn get_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<AppointmentWithServices>>> {
    let resp = appointment_service::get_appointment(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/appointments/{id}",
    params(
        ("id" = Uuid, Path, description = "Appointment ID")
    ),
    request_body = AppointmentRequest,
    responses(
        (status = 200, description = "Appointment updated", body = ApiResponse<AppointmentWithServices>),
        (status = 403, description = "Caller does not own the appointment"),
        (status = 404, description = "Appointment not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Appointments"
)]
pub async fn update_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AppointmentRequest>,
) -> AppResult<Json<ApiResponse<AppointmentWithServices>>> {
    let resp = appointment_service::update_appointment(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    params(
        ("id" = Uuid, Path, description = "Appointment ID")
    ),
    responses(
        (status = 200, description = "Appointment cancelled"),
        (status = 403, description = "Caller does not own the appointment"),
        (status = 404, description = "Appointment not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Appointments"
)]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = appointment_service::cancel_appointment(&state, &user, id).await?;
    Ok(Json(resp))
}
