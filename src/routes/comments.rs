use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::comments::{CommentList, CreateCommentRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Comment,
    response::ApiResponse,
    services::comment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_comment).get(list_comments))
        .route("/{id}", get(list_comments_for_service))
}

#[utoipa::path(
    post,
    path = "/api/comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 200, description = "Comment created", body = ApiResponse<Comment>),
        (status = 400, description = "Empty body or unknown service"),
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
pub async fn create_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCommentRequest>,
) -> AppResult<Json<ApiResponse<Comment>>> {
    let resp = comment_service::create_comment(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/comments",
    responses(
        (status = 200, description = "All comments with author and service", body = ApiResponse<CommentList>),
    ),
    tag = "Comments"
)]
pub async fn list_comments(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CommentList>>> {
    let resp = comment_service::list_comments(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/comments/{id}",
    params(
        ("id" = Uuid, Path, description = "Service ID")
    ),
    responses(
        (status = 200, description = "Comments for one service, empty list included", body = ApiResponse<CommentList>),
        (status = 404, description = "Service not found"),
    ),
    tag = "Comments"
)]
pub async fn list_comments_for_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CommentList>>> {
    let resp = comment_service::list_comments_for_service(&state, id).await?;
    Ok(Json(resp))
}
