use crate::models::VideoSummary;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToggleSubscriptionResponse {
    pub subscribed: bool,
}

/// One flattened row per subscriber of a channel.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriberRow {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
    /// Whether the channel has subscribed back to this subscriber.
    pub subscribed_to_subscriber: bool,
    /// Subscribers this subscriber has on its own channel.
    pub subscriber_count: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChannelSubscribersResponse {
    pub subscribers: Vec<SubscriberRow>,
    pub subscribers_count_of_channel: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscribedChannelRow {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_video: Option<VideoSummary>,
}
