use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Service, ServiceImage};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: String,
    pub price: i64,
}

/// Partial update: absent fields are left untouched, present fields are
/// applied as supplied (an explicit empty value is rejected by validation,
/// not silently skipped).
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceList {
    pub items: Vec<Service>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceWithImages {
    pub service: Service,
    pub images: Vec<ServiceImage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageList {
    pub items: Vec<ServiceImage>,
}
