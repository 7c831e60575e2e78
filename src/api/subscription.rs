use crate::api::parse_object_id;
use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::models::{
    ChannelSubscribersResponse, SubscribedChannelRow, ToggleSubscriptionResponse,
};
use crate::services::social_graph;
use crate::stores::Stores;
use actix_web::{web, HttpResponse};

#[utoipa::path(
    post,
    path = "/api/v1/subscriptions/c/{channel_id}",
    params(
        ("channel_id" = String, Path, description = "Channel (user) ID")
    ),
    responses(
        (status = 200, description = "Edge created or removed", body = ToggleSubscriptionResponse),
        (status = 400, description = "Malformed id or self-subscription"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Channel not found")
    ),
    security(("bearer_auth" = [])),
    tag = "subscriptions"
)]
pub async fn toggle_subscription(
    path: web::Path<String>,
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let channel_id = parse_object_id(&path.into_inner(), "channel id")?;
    let result = social_graph::toggle_subscription(&stores, user.user_id, channel_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/c/{channel_id}/subscribers",
    params(
        ("channel_id" = String, Path, description = "Channel (user) ID")
    ),
    responses(
        (status = 200, description = "Subscribers with back-follow flags", body = ChannelSubscribersResponse),
        (status = 400, description = "Malformed id")
    ),
    tag = "subscriptions"
)]
pub async fn get_channel_subscribers(
    path: web::Path<String>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let channel_id = parse_object_id(&path.into_inner(), "channel id")?;
    let result = social_graph::channel_subscribers(&stores, channel_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/u/{subscriber_id}/channels",
    params(
        ("subscriber_id" = String, Path, description = "Subscriber (user) ID")
    ),
    responses(
        (status = 200, description = "Followed channels with their latest video", body = Vec<SubscribedChannelRow>),
        (status = 400, description = "Malformed id")
    ),
    tag = "subscriptions"
)]
pub async fn get_subscribed_channels(
    path: web::Path<String>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let subscriber_id = parse_object_id(&path.into_inner(), "subscriber id")?;
    let result = social_graph::subscribed_channels(&stores, subscriber_id).await?;
    Ok(HttpResponse::Ok().json(result))
}
