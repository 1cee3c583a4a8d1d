use axum_booking_api::{
    dto::{
        appointments::AppointmentRequest,
        services::{CreateServiceRequest, UpdateServiceRequest},
    },
    error::AppError,
    middleware::auth::AuthUser,
    routes::params::BookedTimesQuery,
    services::{appointment_service, catalog_service},
};
use chrono::{Days, Utc};
use uuid::Uuid;

mod common;

// Booking flow: snapshot capture, verbatim totals, slot uniqueness, ownership
// checks, admin-wide listing and cancellation.
#[tokio::test]
async fn booking_snapshot_ownership_and_cancel_flow() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let admin_id = common::create_user(&state, "Admin", "admin@example.com", "admin").await?;
    let owner_id = common::create_user(&state, "Ann", "ann@example.com", "user").await?;
    let other_id = common::create_user(&state, "Bob", "bob@example.com", "user").await?;

    let admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };
    let owner = AuthUser {
        user_id: owner_id,
        role: "user".into(),
    };
    let other = AuthUser {
        user_id: other_id,
        role: "user".into(),
    };

    let cut = catalog_service::create_service(
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
    let beard = catalog_service::create_service(
        &state,
        &admin,
        CreateServiceRequest {
            name: "Beard Trim".into(),
            description: "Shape and line up".into(),
            price: 1500,
        },
    )
    .await?
    .data
    .unwrap();

    let date = Utc::now().date_naive() + Days::new(7);

    // An unresolvable service id fails the booking.
    let err = appointment_service::create_appointment(
        &state,
        &owner,
        AppointmentRequest {
            services: vec![Uuid::new_v4()],
            date,
            time: "10:30".into(),
            total_amount: 1000,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // The client-supplied total is persisted verbatim, not recomputed.
    let booked = appointment_service::create_appointment(
        &state,
        &owner,
        AppointmentRequest {
            services: vec![cut.id, beard.id],
            date,
            time: "10:30".into(),
            total_amount: 999,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(booked.appointment.total_amount, 999);
    assert_eq!(booked.items.len(), 2);
    let mut prices: Vec<i64> = booked.items.iter().map(|item| item.price).collect();
    prices.sort();
    assert_eq!(prices, vec![1000, 1500]);

    // The slot shows up as booked for that day.
    let times = appointment_service::list_booked_times(
        &state,
        BookedTimesQuery {
            date: date.format("%d/%m/%Y").to_string(),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(times.items.iter().any(|slot| slot.time == "10:30"));

    // An unparsable day selector is rejected.
    let err = appointment_service::list_booked_times(
        &state,
        BookedTimesQuery {
            date: date.format("%Y-%m-%d").to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Nobody else can take the same slot.
    let err = appointment_service::create_appointment(
        &state,
        &other,
        AppointmentRequest {
            services: vec![cut.id],
            date,
            time: "10:30".into(),
            total_amount: 1000,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Catalog edits after booking do not drift the snapshot.
    catalog_service::update_service(
        &state,
        &admin,
        cut.id,
        UpdateServiceRequest {
            name: None,
            description: None,
            price: Some(9999),
        },
    )
    .await?;
    let fetched = appointment_service::get_appointment(&state, &owner, booked.appointment.id)
        .await?
        .data
        .unwrap();
    let snapshot_cut = fetched
        .items
        .iter()
        .find(|item| item.service_id == cut.id)
        .expect("snapshot row for the cut");
    assert_eq!(snapshot_cut.price, 1000);
    // The resolved catalog record carries the new price.
    let current_cut = fetched
        .services
        .iter()
        .find(|svc| svc.id == cut.id)
        .expect("catalog record for the cut");
    assert_eq!(current_cut.price, 9999);

    // Ownership: strangers are rejected, admins may read.
    let err = appointment_service::get_appointment(&state, &other, booked.appointment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    appointment_service::get_appointment(&state, &admin, booked.appointment.id).await?;
    let err = appointment_service::update_appointment(
        &state,
        &other,
        booked.appointment.id,
        AppointmentRequest {
            services: vec![cut.id],
            date,
            time: "16:00".into(),
            total_amount: 1000,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    let err = appointment_service::cancel_appointment(&state, &other, booked.appointment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Owner reschedule rebuilds the snapshot from the catalog as it stands.
    let updated = appointment_service::update_appointment(
        &state,
        &owner,
        booked.appointment.id,
        AppointmentRequest {
            services: vec![cut.id],
            date,
            time: "11:30".into(),
            total_amount: 9999,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.appointment.time, "11:30");
    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.items[0].price, 9999);

    // Listing: strangers are rejected, owners see their own, admins see all.
    let err = appointment_service::list_user_appointments(&state, &other, owner_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    appointment_service::create_appointment(
        &state,
        &other,
        AppointmentRequest {
            services: vec![beard.id],
            date,
            time: "12:30".into(),
            total_amount: 1500,
        },
    )
    .await?;

    let own = appointment_service::list_user_appointments(&state, &owner, owner_id)
        .await?
        .data
        .unwrap();
    assert_eq!(own.items.len(), 1);
    assert_eq!(own.items[0].appointment.user_id, owner_id);

    // The admin branch ignores the path filter and returns everyone's.
    let all = appointment_service::list_user_appointments(&state, &admin, owner_id)
        .await?
        .data
        .unwrap();
    assert_eq!(all.items.len(), 2);

    // Cancellation removes the appointment and its snapshot rows.
    appointment_service::cancel_appointment(&state, &owner, booked.appointment.id).await?;
    let err = appointment_service::get_appointment(&state, &owner, booked.appointment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    let orphans: (i64,) =
        sqlx::query_as("SELECT count(*) FROM appointment_services WHERE appointment_id = $1")
            .bind(booked.appointment.id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(orphans.0, 0);

    Ok(())
}
