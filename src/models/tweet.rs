use crate::entities::Tweet;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TweetRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TweetResponse {
    pub id: String,
    pub owner_id: String,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Tweet> for TweetResponse {
    fn from(tweet: Tweet) -> Self {
        TweetResponse {
            id: tweet.id.to_hex(),
            owner_id: tweet.owner.to_hex(),
            content: tweet.content,
            created_at: tweet.created_at,
        }
    }
}
