use axum_booking_api::{
    dto::{
        comments::CreateCommentRequest,
        services::{CreateServiceRequest, UpdateServiceRequest},
    },
    error::AppError,
    middleware::auth::AuthUser,
    services::{catalog_service, comment_service},
};
use bytes::Bytes;
use uuid::Uuid;

mod common;

// Catalog management: round-trip, partial updates, image lifecycle and
// comments.
#[tokio::test]
async fn catalog_images_and_comments_flow() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let admin_id = common::create_user(&state, "Admin", "admin@example.com", "admin").await?;
    let user_id = common::create_user(&state, "Ann", "ann@example.com", "user").await?;

    let admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };
    let user = AuthUser {
        user_id,
        role: "user".into(),
    };

    // Catalog mutations are admin-only.
    let err = catalog_service::create_service(
        &state,
        &user,
        CreateServiceRequest {
            name: "Classic Cut".into(),
            description: "Scissor cut".into(),
            price: 1000,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Create-then-fetch round trip.
    let svc = catalog_service::create_service(
        &state,
        &admin,
        CreateServiceRequest {
            name: "Classic Cut".into(),
            description: "Scissor cut, wash and style".into(),
            price: 1000,
        },
    )
    .await?
    .data
    .unwrap();
    let fetched = catalog_service::get_service(&state, svc.id).await?.data.unwrap();
    assert_eq!(fetched.service.name, "Classic Cut");
    assert_eq!(fetched.service.description, "Scissor cut, wash and style");
    assert_eq!(fetched.service.price, 1000);
    assert!(fetched.images.is_empty());

    let listed = catalog_service::list_services(&state).await?.data.unwrap();
    assert!(listed.items.iter().any(|item| item.id == svc.id));

    // Partial update touches only the supplied fields.
    catalog_service::update_service(
        &state,
        &admin,
        svc.id,
        UpdateServiceRequest {
            name: None,
            description: None,
            price: Some(1200),
        },
    )
    .await?;
    let fetched = catalog_service::get_service(&state, svc.id).await?.data.unwrap();
    assert_eq!(fetched.service.name, "Classic Cut");
    assert_eq!(fetched.service.price, 1200);

    // Supplied-but-blank values are rejected, not skipped.
    let err = catalog_service::update_service(
        &state,
        &admin,
        svc.id,
        UpdateServiceRequest {
            name: Some("  ".into()),
            description: None,
            price: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    let err = catalog_service::update_service(
        &state,
        &admin,
        svc.id,
        UpdateServiceRequest {
            name: None,
            description: None,
            price: Some(0),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Image upload appends in order and the returned URL is listed back.
    let first = catalog_service::upload_image(
        &state,
        &admin,
        svc.id,
        Some((Bytes::from_static(b"png bytes"), "image/png".into())),
    )
    .await?
    .data
    .unwrap();
    assert!(first.url.ends_with(".png"));
    assert!(first.url.contains(&svc.id.to_string()));
    assert_eq!(first.position, 0);

    let second = catalog_service::upload_image(
        &state,
        &admin,
        svc.id,
        Some((Bytes::from_static(b"jpg bytes"), "image/jpeg".into())),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(second.position, 1);

    let images = catalog_service::list_images(&state, svc.id).await?.data.unwrap();
    assert_eq!(images.items.len(), 2);
    assert_eq!(images.items[0].id, first.id);
    assert!(images.items.iter().any(|img| img.url == first.url));

    // Upload guards: unknown service, missing payload.
    let err = catalog_service::upload_image(
        &state,
        &admin,
        Uuid::new_v4(),
        Some((Bytes::from_static(b"x"), "image/png".into())),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    let err = catalog_service::upload_image(&state, &admin, svc.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Deletion is exact-match by image id.
    catalog_service::delete_image(&state, &admin, svc.id, first.id).await?;
    let images = catalog_service::list_images(&state, svc.id).await?.data.unwrap();
    assert_eq!(images.items.len(), 1);
    assert_eq!(images.items[0].id, second.id);
    let err = catalog_service::delete_image(&state, &admin, svc.id, first.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Comments: the target service must exist and the body must not be blank.
    let err = comment_service::create_comment(
        &state,
        &user,
        CreateCommentRequest {
            service_id: Uuid::new_v4(),
            body: "Great cut".into(),
            rating: Some(5),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    let err = comment_service::create_comment(
        &state,
        &user,
        CreateCommentRequest {
            service_id: svc.id,
            body: "   ".into(),
            rating: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let comment = comment_service::create_comment(
        &state,
        &user,
        CreateCommentRequest {
            service_id: svc.id,
            body: "Great cut".into(),
            rating: Some(5),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(comment.body, "Great cut");

    let all = comment_service::list_comments(&state).await?.data.unwrap();
    assert_eq!(all.items.len(), 1);
    assert_eq!(all.items[0].author.email, "ann@example.com");
    assert_eq!(
        all.items[0].service.as_ref().map(|svc_ref| svc_ref.id),
        Some(svc.id)
    );

    // Unknown service is a 404; a known one with no comments is an empty 200.
    let err = comment_service::list_comments_for_service(&state, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let quiet = catalog_service::create_service(
        &state,
        &admin,
        CreateServiceRequest {
            name: "Color Treatment".into(),
            description: "Single-process color".into(),
            price: 4500,
        },
    )
    .await?
    .data
    .unwrap();
    let none = comment_service::list_comments_for_service(&state, quiet.id)
        .await?
        .data
        .unwrap();
    assert!(none.items.is_empty());

    let for_svc = comment_service::list_comments_for_service(&state, svc.id)
        .await?
        .data
        .unwrap();
    assert_eq!(for_svc.items.len(), 1);

    // Service deletion cascades its image rows and 404s afterwards.
    catalog_service::delete_service(&state, &admin, quiet.id).await?;
    let err = catalog_service::get_service(&state, quiet.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    let err = catalog_service::delete_service(&state, &admin, quiet.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Comments survive the deletion of their service; resolution goes null.
    catalog_service::delete_service(&state, &admin, svc.id).await?;
    let image_rows: (i64,) =
        sqlx::query_as("SELECT count(*) FROM service_images WHERE service_id = $1")
            .bind(svc.id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(image_rows.0, 0);
    let all = comment_service::list_comments(&state).await?.data.unwrap();
    assert_eq!(all.items.len(), 1);
    assert!(all.items[0].service.is_none());

    Ok(())
}
