use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Comment, Service};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub service_id: Uuid,
    pub body: String,
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentAuthor {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentDetail {
    pub comment: Comment,
    pub author: CommentAuthor,
    /// `None` when the commented service was deleted after the fact.
    pub service: Option<Service>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentList {
    pub items: Vec<CommentDetail>,
}
