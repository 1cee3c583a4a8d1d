use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::dto::comments::{CommentAuthor, CommentDetail, CommentList, CreateCommentRequest};
use crate::{
    audit::log_audit,
    entity::{
        comments::{
            ActiveModel as CommentActive, Column as CommentCol, Entity as Comments,
            Model as CommentModel,
        },
        services::{Column as ServiceCol, Entity as Services, Model as ServiceModel},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Comment, Service},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn create_comment(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCommentRequest,
) -> AppResult<ApiResponse<Comment>> {
    if payload.body.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Comment body is required".to_string(),
        ));
    }

    // The target must exist when the comment is written; it may still be
    // deleted later, at which point resolution yields null.
    let service = Services::find_by_id(payload.service_id)
        .one(&state.orm)
        .await?;
    if service.is_none() {
        return Err(AppError::BadRequest("Service does not exist".to_string()));
    }

    let comment = CommentActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        service_id: Set(payload.service_id),
        body: Set(payload.body.trim().to_string()),
        rating: Set(payload.rating),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "comment_create",
        Some("comments"),
        Some(serde_json::json!({ "comment_id": comment.id, "service_id": comment.service_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Comment created",
        comment_from_entity(comment),
        Some(Meta::empty()),
    ))
}

pub async fn list_comments(state: &AppState) -> AppResult<ApiResponse<CommentList>> {
    let comments = Comments::find()
        .order_by_desc(CommentCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let items = resolve_details(state, comments).await?;
    let total = items.len() as i64;

    Ok(ApiResponse::success(
        "Comments",
        CommentList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn list_comments_for_service(
    state: &AppState,
    service_id: Uuid,
) -> AppResult<ApiResponse<CommentList>> {
    // An unknown service is 404; a known one with no comments is an empty
    // list, not an error.
    let service = Services::find_by_id(service_id).one(&state.orm).await?;
    if service.is_none() {
        return Err(AppError::NotFound);
    }

    let comments = Comments::find()
        .filter(CommentCol::ServiceId.eq(service_id))
        .order_by_desc(CommentCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let items = resolve_details(state, comments).await?;
    let total = items.len() as i64;

    Ok(ApiResponse::success(
        "Comments",
        CommentList { items },
        Some(Meta::new(1, total, total)),
    ))
}

async fn resolve_details(
    state: &AppState,
    comments: Vec<CommentModel>,
) -> AppResult<Vec<CommentDetail>> {
    let user_ids: Vec<Uuid> = comments.iter().map(|c| c.user_id).collect();
    let service_ids: Vec<Uuid> = comments.iter().map(|c| c.service_id).collect();

    let authors: HashMap<Uuid, CommentAuthor> = Users::find()
        .filter(UserCol::Id.is_in(user_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| {
            (
                u.id,
                CommentAuthor {
                    name: u.name,
                    email: u.email,
                },
            )
        })
        .collect();

    let services: HashMap<Uuid, Service> = Services::find()
        .filter(ServiceCol::Id.is_in(service_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|s| (s.id, service_from_entity(s)))
        .collect();

    let mut details = Vec::with_capacity(comments.len());
    for model in comments {
        let Some(author) = authors.get(&model.user_id).cloned() else {
            tracing::warn!(comment_id = %model.id, "comment author missing, skipping");
            continue;
        };
        let service = services.get(&model.service_id).cloned();
        details.push(CommentDetail {
            comment: comment_from_entity(model),
            author,
            service,
        });
    }

    Ok(details)
}

fn comment_from_entity(model: CommentModel) -> Comment {
    Comment {
        id: model.id,
        user_id: model.user_id,
        service_id: model.service_id,
        body: model.body,
        rating: model.rating,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn service_from_entity(model: ServiceModel) -> Service {
    Service {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
