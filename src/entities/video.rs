use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Video document. Media files live in the external media service; only
/// their URLs are stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub owner: ObjectId,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVideo {
    pub owner: ObjectId,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
}

/// Editable metadata; the video file itself is immutable once registered.
#[derive(Debug, Clone)]
pub struct VideoUpdate {
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
}

/// Like document: one per (video, liked_by) pair, unique-indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub video: ObjectId,
    pub liked_by: ObjectId,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSortKey {
    Views,
    CreatedAt,
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Filter for the published-video listing.
#[derive(Debug, Clone)]
pub struct VideoListFilter {
    pub owner: Option<ObjectId>,
    /// Case-insensitive match against title or description.
    pub search: Option<String>,
    pub sort_key: VideoSortKey,
    pub direction: SortDirection,
    pub page: u64,
    pub limit: u64,
}
