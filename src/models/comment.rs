use crate::entities::Comment;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: String,
    pub video_id: String,
    pub owner_id: String,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        CommentResponse {
            id: comment.id.to_hex(),
            video_id: comment.video.to_hex(),
            owner_id: comment.owner.to_hex(),
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}
