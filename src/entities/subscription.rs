use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Directed subscriber -> channel edge. At most one edge per pair; the
/// storage layer carries a unique compound index on (subscriber, channel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub subscriber: ObjectId,
    pub channel: ObjectId,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}
