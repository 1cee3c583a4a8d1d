use bytes::Bytes;
use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::dto::services::{
    CreateServiceRequest, ImageList, ServiceList, ServiceWithImages, UpdateServiceRequest,
};
use crate::{
    audit::log_audit,
    entity::{
        service_images::{
            ActiveModel as ImageActive, Column as ImageCol, Entity as ServiceImages,
            Model as ImageModel,
        },
        services::{
            ActiveModel, Column as ServiceCol, Entity as Services, Model as ServiceModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Service, ServiceImage},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_services(state: &AppState) -> AppResult<ApiResponse<ServiceList>> {
    let finder = Services::find().order_by_asc(ServiceCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(service_from_entity)
        .collect();

    let meta = Meta::new(1, total, total);
    Ok(ApiResponse::success(
        "Services",
        ServiceList { items },
        Some(meta),
    ))
}

pub async fn get_service(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ServiceWithImages>> {
    let service = Services::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(service_from_entity);
    let service = match service {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };

    let images = fetch_images(state, id).await?;

    Ok(ApiResponse::success(
        "Service",
        ServiceWithImages { service, images },
        None,
    ))
}

pub async fn create_service(
    state: &AppState,
    user: &AuthUser,
    payload: CreateServiceRequest,
) -> AppResult<ApiResponse<Service>> {
    ensure_admin(user)?;
    validate_fields(
        Some(payload.name.as_str()),
        Some(payload.description.as_str()),
        Some(payload.price),
    )?;

    let id = Uuid::new_v4();
    let active = ActiveModel {
        id: Set(id),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description.trim().to_string()),
        price: Set(payload.price),
        created_at: NotSet,
    };
    let service = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "service_create",
        Some("services"),
        Some(serde_json::json!({ "service_id": service.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Service created",
        service_from_entity(service),
        Some(Meta::empty()),
    ))
}

pub async fn update_service(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateServiceRequest,
) -> AppResult<ApiResponse<Service>> {
    ensure_admin(user)?;
    validate_fields(
        payload.name.as_deref(),
        payload.description.as_deref(),
        payload.price,
    )?;

    let existing = Services::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };

    // Absent fields stay untouched; present fields apply as supplied.
    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description.trim().to_string());
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }

    let service = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "service_update",
        Some("services"),
        Some(serde_json::json!({ "service_id": service.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Service updated",
        service_from_entity(service),
        Some(Meta::empty()),
    ))
}

pub async fn delete_service(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    // Image rows cascade with the service; remote objects are left behind,
    // callers delete images first if storage reclamation matters.
    let result = Services::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "service_delete",
        Some("services"),
        Some(serde_json::json!({ "service_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Service deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn upload_image(
    state: &AppState,
    user: &AuthUser,
    service_id: Uuid,
    payload: Option<(Bytes, String)>,
) -> AppResult<ApiResponse<ServiceImage>> {
    ensure_admin(user)?;

    let exists = Services::find_by_id(service_id).one(&state.orm).await?;
    if exists.is_none() {
        return Err(AppError::NotFound);
    }

    let (body, content_type) = match payload {
        Some(p) => p,
        None => return Err(AppError::BadRequest("No image provided".to_string())),
    };

    let image_id = Uuid::new_v4();
    let ext = ext_from_mime(&content_type).unwrap_or("bin");
    let key = format!("services/{service_id}/{image_id}.{ext}");

    state
        .storage
        .put_object(&key, body, &content_type)
        .await
        .map_err(AppError::Internal)?;
    let url = state.storage.object_url(&key);

    let next_position = ServiceImages::find()
        .filter(ImageCol::ServiceId.eq(service_id))
        .order_by_desc(ImageCol::Position)
        .one(&state.orm)
        .await?
        .map(|img| img.position + 1)
        .unwrap_or(0);

    let image = ImageActive {
        id: Set(image_id),
        service_id: Set(service_id),
        url: Set(url),
        storage_key: Set(key),
        position: Set(next_position),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "image_upload",
        Some("service_images"),
        Some(serde_json::json!({ "service_id": service_id, "image_id": image.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Image uploaded",
        image_from_entity(image),
        Some(Meta::empty()),
    ))
}

pub async fn list_images(state: &AppState, service_id: Uuid) -> AppResult<ApiResponse<ImageList>> {
    let exists = Services::find_by_id(service_id).one(&state.orm).await?;
    if exists.is_none() {
        return Err(AppError::NotFound);
    }

    let items = fetch_images(state, service_id).await?;
    Ok(ApiResponse::success("Images", ImageList { items }, None))
}

pub async fn delete_image(
    state: &AppState,
    user: &AuthUser,
    service_id: Uuid,
    image_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    // Exact match on the image row, never a pattern over URLs.
    let image = ServiceImages::find_by_id(image_id)
        .filter(ImageCol::ServiceId.eq(service_id))
        .one(&state.orm)
        .await?;
    let image = match image {
        Some(img) => img,
        None => return Err(AppError::NotFound),
    };

    state
        .storage
        .delete_object(&image.storage_key)
        .await
        .map_err(AppError::Internal)?;

    ServiceImages::delete_by_id(image.id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "image_delete",
        Some("service_images"),
        Some(serde_json::json!({ "service_id": service_id, "image_id": image_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Image deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn fetch_images(state: &AppState, service_id: Uuid) -> AppResult<Vec<ServiceImage>> {
    let images = ServiceImages::find()
        .filter(ImageCol::ServiceId.eq(service_id))
        .order_by_asc(ImageCol::Position)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(image_from_entity)
        .collect();
    Ok(images)
}

fn validate_fields(
    name: Option<&str>,
    description: Option<&str>,
    price: Option<i64>,
) -> Result<(), AppError> {
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("Name is required".to_string()));
        }
    }
    if let Some(description) = description {
        if description.trim().is_empty() {
            return Err(AppError::BadRequest("Description is required".to_string()));
        }
    }
    if let Some(price) = price {
        if price <= 0 {
            return Err(AppError::BadRequest("Price must be positive".to_string()));
        }
    }
    Ok(())
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
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

fn image_from_entity(model: ImageModel) -> ServiceImage {
    ServiceImage {
        id: model.id,
        service_id: model.service_id,
        url: model.url,
        storage_key: model.storage_key,
        position: model.position,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ext_covers_common_image_types() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("application/pdf"), None);
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert!(validate_fields(Some("  "), None, None).is_err());
        assert!(validate_fields(None, Some(""), None).is_err());
        assert!(validate_fields(None, None, Some(0)).is_err());
        assert!(validate_fields(None, None, Some(-5)).is_err());
        assert!(validate_fields(Some("Cut"), Some("A trim"), Some(1500)).is_ok());
        assert!(validate_fields(None, None, None).is_ok());
    }
}
