use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// User document. `watch_history` is append-only and duplicate-free; the
/// store enforces set semantics on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub watch_history: Vec<ObjectId>,
    pub password_hash: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub password_hash: String,
}

/// The only profile fields editable as a unit.
#[derive(Debug, Clone)]
pub struct AccountUpdate {
    pub full_name: String,
    pub email: String,
}
