use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};
use uuid::Uuid;

use crate::dto::appointments::{
    AppointmentEntry, AppointmentList, AppointmentRequest, AppointmentWithServices, BookedTime,
    BookedTimeList,
};
use crate::{
    audit::log_audit,
    entity::{
        appointment_services::{
            ActiveModel as SnapshotActive, Column as SnapshotCol, Entity as AppointmentServices,
            Model as SnapshotModel,
        },
        appointments::{
            ActiveModel as AppointmentActive, Column as AppointmentCol, Entity as Appointments,
            Model as AppointmentModel,
        },
        services::{Column as ServiceCol, Entity as Services, Model as ServiceModel},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    mailer,
    middleware::auth::AuthUser,
    models::{Appointment, AppointmentService, Service},
    response::{ApiResponse, Meta},
    routes::params::BookedTimesQuery,
    state::AppState,
};

pub async fn list_booked_times(
    state: &AppState,
    query: BookedTimesQuery,
) -> AppResult<ApiResponse<BookedTimeList>> {
    let date = parse_booking_date(&query.date)?;

    let items = Appointments::find()
        .filter(AppointmentCol::Date.eq(date))
        .order_by_asc(AppointmentCol::Time)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|model| BookedTime {
            id: model.id,
            time: model.time,
        })
        .collect();

    Ok(ApiResponse::success(
        "Booked times",
        BookedTimeList { items },
        None,
    ))
}

pub async fn create_appointment(
    state: &AppState,
    user: &AuthUser,
    payload: AppointmentRequest,
) -> AppResult<ApiResponse<AppointmentWithServices>> {
    let services = resolve_services(state, &payload.services).await?;
    let time = normalize_time(&payload.time)?;

    ensure_slot_free(state, payload.date, &time, None).await?;

    let txn = state.orm.begin().await?;

    let appointment_id = Uuid::new_v4();
    let insert = AppointmentActive {
        id: Set(appointment_id),
        user_id: Set(user.user_id),
        date: Set(payload.date),
        time: Set(time.clone()),
        total_amount: Set(payload.total_amount),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await;
    let appointment = match insert {
        Ok(model) => model,
        // Concurrent booking of the same slot loses to the unique constraint.
        Err(err) => return Err(map_slot_conflict(err)),
    };

    let mut items: Vec<AppointmentService> = Vec::with_capacity(services.len());
    for service in &services {
        let item = SnapshotActive {
            id: Set(Uuid::new_v4()),
            appointment_id: Set(appointment.id),
            service_id: Set(service.id),
            name: Set(service.name.clone()),
            price: Set(service.price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(snapshot_from_entity(item));
    }

    txn.commit().await?;

    notify_owner(state, user.user_id, appointment.date, &appointment.time, Lifecycle::Created)
        .await;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "appointment_create",
        Some("appointments"),
        Some(serde_json::json!({ "appointment_id": appointment.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Appointment booked",
        AppointmentWithServices {
            appointment: appointment_from_entity(appointment),
            items,
            services: services.into_iter().map(service_from_entity).collect(),
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_appointment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<AppointmentWithServices>> {
    let appointment = Appointments::find_by_id(id).one(&state.orm).await?;
    let appointment = match appointment {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    // Owners see their own appointments; admins may read any.
    if appointment.user_id != user.user_id && user.role != "admin" {
        return Err(AppError::Forbidden);
    }

    let items: Vec<AppointmentService> = AppointmentServices::find()
        .filter(SnapshotCol::AppointmentId.eq(appointment.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(snapshot_from_entity)
        .collect();

    let service_ids: Vec<Uuid> = items.iter().map(|item| item.service_id).collect();
    let services = Services::find()
        .filter(ServiceCol::Id.is_in(service_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(service_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Appointment",
        AppointmentWithServices {
            appointment: appointment_from_entity(appointment),
            items,
            services,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_appointment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AppointmentRequest,
) -> AppResult<ApiResponse<AppointmentWithServices>> {
    let existing = Appointments::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    // Mutation is owner-only; the admin exemption covers reads.
    if existing.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let services = resolve_services(state, &payload.services).await?;
    let time = normalize_time(&payload.time)?;

    ensure_slot_free(state, payload.date, &time, Some(existing.id)).await?;

    let txn = state.orm.begin().await?;

    let mut active: AppointmentActive = existing.into();
    active.date = Set(payload.date);
    active.time = Set(time);
    active.total_amount = Set(payload.total_amount);
    active.updated_at = Set(Utc::now().into());
    let update = active.update(&txn).await;
    let appointment = match update {
        Ok(model) => model,
        Err(err) => return Err(map_slot_conflict(err)),
    };

    // The snapshot is rebuilt from the catalog as it stands right now.
    AppointmentServices::delete_many()
        .filter(SnapshotCol::AppointmentId.eq(appointment.id))
        .exec(&txn)
        .await?;

    let mut items: Vec<AppointmentService> = Vec::with_capacity(services.len());
    for service in &services {
        let item = SnapshotActive {
            id: Set(Uuid::new_v4()),
            appointment_id: Set(appointment.id),
            service_id: Set(service.id),
            name: Set(service.name.clone()),
            price: Set(service.price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(snapshot_from_entity(item));
    }

    txn.commit().await?;

    notify_owner(state, user.user_id, appointment.date, &appointment.time, Lifecycle::Updated)
        .await;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "appointment_update",
        Some("appointments"),
        Some(serde_json::json!({ "appointment_id": appointment.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Appointment updated",
        AppointmentWithServices {
            appointment: appointment_from_entity(appointment),
            items,
            services: services.into_iter().map(service_from_entity).collect(),
        },
        Some(Meta::empty()),
    ))
}

pub async fn cancel_appointment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let appointment = Appointments::find_by_id(id).one(&state.orm).await?;
    let appointment = match appointment {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    if appointment.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let (date, time) = (appointment.date, appointment.time.clone());

    // Delete first; the cancellation email only goes out for a committed
    // removal. Snapshot rows cascade with the appointment.
    Appointments::delete_by_id(appointment.id)
        .exec(&state.orm)
        .await?;

    notify_owner(state, user.user_id, date, &time, Lifecycle::Cancelled).await;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "appointment_cancel",
        Some("appointments"),
        Some(serde_json::json!({ "appointment_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Appointment cancelled",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_user_appointments(
    state: &AppState,
    user: &AuthUser,
    target: Uuid,
) -> AppResult<ApiResponse<AppointmentList>> {
    let is_admin = user.role == "admin";
    if user.user_id != target && !is_admin {
        return Err(AppError::Forbidden);
    }

    let today = Utc::now().date_naive();
    let mut condition = Condition::all().add(AppointmentCol::Date.gte(today));
    // Admins see every upcoming appointment, whatever the path says.
    if !is_admin {
        condition = condition.add(AppointmentCol::UserId.eq(target));
    }

    let appointments = Appointments::find()
        .filter(condition)
        .order_by_asc(AppointmentCol::Date)
        .order_by_asc(AppointmentCol::Time)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = appointments.iter().map(|a| a.id).collect();
    let mut grouped: HashMap<Uuid, Vec<AppointmentService>> = HashMap::new();
    for item in AppointmentServices::find()
        .filter(SnapshotCol::AppointmentId.is_in(ids))
        .all(&state.orm)
        .await?
    {
        grouped
            .entry(item.appointment_id)
            .or_default()
            .push(snapshot_from_entity(item));
    }

    let total = appointments.len() as i64;
    let items = appointments
        .into_iter()
        .map(|model| {
            let items = grouped.remove(&model.id).unwrap_or_default();
            AppointmentEntry {
                appointment: appointment_from_entity(model),
                items,
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "Appointments",
        AppointmentList { items },
        Some(Meta::new(1, total, total)),
    ))
}

enum Lifecycle {
    Created,
    Updated,
    Cancelled,
}

/// Lifecycle emails are best-effort: the booking is committed either way.
async fn notify_owner(
    state: &AppState,
    user_id: Uuid,
    date: NaiveDate,
    time: &str,
    event: Lifecycle,
) {
    let owner = match Users::find_by_id(user_id).one(&state.orm).await {
        Ok(Some(owner)) => owner,
        Ok(None) => {
            tracing::warn!(%user_id, "appointment owner not found for email");
            return;
        }
        Err(err) => {
            tracing::warn!(error = %err, "owner lookup for email failed");
            return;
        }
    };

    let date = format_booking_date(date);
    let mail = match event {
        Lifecycle::Created => mailer::appointment_created(&owner.name, &owner.email, &date, time),
        Lifecycle::Updated => mailer::appointment_updated(&owner.name, &owner.email, &date, time),
        Lifecycle::Cancelled => {
            mailer::appointment_cancelled(&owner.name, &owner.email, &date, time)
        }
    };

    if let Err(err) = state.mailer.send(mail).await {
        tracing::warn!(error = %err, "appointment email failed");
    }
}

async fn resolve_services(state: &AppState, ids: &[Uuid]) -> AppResult<Vec<ServiceModel>> {
    if ids.is_empty() {
        return Err(AppError::BadRequest(
            "At least one service is required".to_string(),
        ));
    }

    let mut unique = ids.to_vec();
    unique.sort();
    unique.dedup();

    let services = Services::find()
        .filter(ServiceCol::Id.is_in(unique.clone()))
        .all(&state.orm)
        .await?;

    if services.len() != unique.len() {
        return Err(AppError::BadRequest(
            "One or more services do not exist".to_string(),
        ));
    }

    Ok(services)
}

async fn ensure_slot_free(
    state: &AppState,
    date: NaiveDate,
    time: &str,
    exclude: Option<Uuid>,
) -> AppResult<()> {
    let mut condition = Condition::all()
        .add(AppointmentCol::Date.eq(date))
        .add(AppointmentCol::Time.eq(time));
    if let Some(id) = exclude {
        condition = condition.add(AppointmentCol::Id.ne(id));
    }

    let taken = Appointments::find().filter(condition).one(&state.orm).await?;
    if taken.is_some() {
        return Err(slot_taken());
    }
    Ok(())
}

fn map_slot_conflict(err: sea_orm::DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => slot_taken(),
        _ => AppError::OrmError(err),
    }
}

fn slot_taken() -> AppError {
    AppError::BadRequest("Time slot is already booked".to_string())
}

fn normalize_time(time: &str) -> AppResult<String> {
    let time = time.trim();
    if time.is_empty() {
        return Err(AppError::BadRequest("Time is required".to_string()));
    }
    Ok(time.to_string())
}

fn parse_booking_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y")
        .map_err(|_| AppError::BadRequest("Invalid date".to_string()))
}

fn format_booking_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn appointment_from_entity(model: AppointmentModel) -> Appointment {
    Appointment {
        id: model.id,
        user_id: model.user_id,
        date: model.date,
        time: model.time,
        total_amount: model.total_amount,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn snapshot_from_entity(model: SnapshotModel) -> AppointmentService {
    AppointmentService {
        id: model.id,
        appointment_id: model.appointment_id,
        service_id: model.service_id,
        name: model.name,
        price: model.price,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_dates_use_day_month_year() {
        let date = parse_booking_date("01/03/2026").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(format_booking_date(date), "01/03/2026");
    }

    #[test]
    fn malformed_dates_are_rejected() {
        assert!(parse_booking_date("2026-03-01").is_err());
        assert!(parse_booking_date("31/02/2026").is_err());
        assert!(parse_booking_date("next tuesday").is_err());
    }

    #[test]
    fn time_is_trimmed_and_required() {
        assert_eq!(normalize_time(" 10:30 ").unwrap(), "10:30");
        assert!(normalize_time("   ").is_err());
    }
}
