use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::appointments::AppointmentList,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::appointment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{user}/appointments", get(list_user_appointments))
}

#[utoipa::path(
    get,
    path = "/api/users/{user}/appointments",
    params(
        ("user" = Uuid, Path, description = "User whose upcoming appointments to list")
    ),
    responses(
        (status = 200, description = "Future appointments, ascending by date; admins get every user's", body = ApiResponse<AppointmentList>),
        (status = 403, description = "Caller is neither the user nor an admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_user_appointments(
    State(state): State<AppState>,
    user: AuthUser,
    Path(target): Path<Uuid>,
) -> AppResult<Json<ApiResponse<AppointmentList>>> {
    let resp = appointment_service::list_user_appointments(&state, &user, target).await?;
    Ok(Json(resp))
}
