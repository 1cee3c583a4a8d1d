use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentService, Service};

/// Booking payload, shared by create and update: the client always sends the
/// full slot plus the selected service ids.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AppointmentRequest {
    pub services: Vec<Uuid>,
    pub date: NaiveDate,
    pub time: String,
    pub total_amount: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentWithServices {
    pub appointment: Appointment,
    /// Snapshot rows captured at booking time.
    pub items: Vec<AppointmentService>,
    /// Catalog records still resolvable today; may be shorter than `items`
    /// if a booked service was deleted since.
    pub services: Vec<Service>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentEntry {
    pub appointment: Appointment,
    pub items: Vec<AppointmentService>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentList {
    pub items: Vec<AppointmentEntry>,
}

/// A taken slot on a given day; clients infer availability by exclusion.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookedTime {
    pub id: Uuid,
    pub time: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookedTimeList {
    pub items: Vec<BookedTime>,
}
