use crate::entities::Video;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PublishVideoRequest {
    pub title: String,
    pub description: String,
    /// URL of the uploaded video in the media service.
    pub video_file: String,
    pub thumbnail: String,
    /// Duration in seconds, as reported by the media service.
    pub duration: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVideoRequest {
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub id: String,
    pub owner_id: String,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Video> for VideoResponse {
    fn from(video: Video) -> Self {
        VideoResponse {
            id: video.id.to_hex(),
            owner_id: video.owner.to_hex(),
            video_file: video.video_file,
            thumbnail: video.thumbnail,
            title: video.title,
            description: video.description,
            duration: video.duration,
            views: video.views,
            is_published: video.is_published,
            created_at: video.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OwnerSummary {
    pub id: String,
    pub username: String,
    pub avatar: String,
}

/// Row of the public video listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoListItem {
    pub id: String,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub owner: OwnerSummary,
}

/// Video owner as shown on the detail page, with channel-derived fields.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoOwnerResponse {
    pub id: String,
    pub username: String,
    pub avatar: String,
    pub subscribers_count: u64,
    pub is_subscribed: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoDetailResponse {
    pub id: String,
    pub video_file: String,
    pub title: String,
    pub description: String,
    /// Value read before this fetch's own view increment.
    pub views: i64,
    pub duration: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub owner: VideoOwnerResponse,
    pub likes_count: u64,
    pub is_liked: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TogglePublishResponse {
    pub is_published: bool,
}

/// Fixed projection of a channel's most recent video.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoSummary {
    pub id: String,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Video> for VideoSummary {
    fn from(video: Video) -> Self {
        VideoSummary {
            id: video.id.to_hex(),
            video_file: video.video_file,
            thumbnail: video.thumbnail,
            title: video.title,
            description: video.description,
            duration: video.duration,
            views: video.views,
            created_at: video.created_at,
        }
    }
}
