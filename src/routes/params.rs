use serde::Deserialize;
use utoipa::ToSchema;

/// Day selector for the booked-times listing; the client sends `dd/MM/yyyy`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BookedTimesQuery {
    pub date: String,
}
