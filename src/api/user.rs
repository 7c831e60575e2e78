use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::models::{ChannelProfileResponse, VideoListItem};
use crate::services::social_graph;
use crate::stores::Stores;
use actix_web::{web, HttpResponse};

#[utoipa::path(
    get,
    path = "/api/v1/users/c/{username}",
    params(
        ("username" = String, Path, description = "Channel username")
    ),
    responses(
        (status = 200, description = "Channel profile with derived counts", body = ChannelProfileResponse),
        (status = 404, description = "Channel does not exist")
    ),
    tag = "users"
)]
pub async fn channel_profile(
    path: web::Path<String>,
    viewer: Option<AuthenticatedUser>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let username = path.into_inner().to_lowercase();
    let profile =
        social_graph::channel_profile(&stores, &username, viewer.map(|v| v.user_id)).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/history",
    responses(
        (status = 200, description = "Watched videos in watch order", body = Vec<VideoListItem>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn watch_history(
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let history = social_graph::watch_history(&stores, user.user_id).await?;
    Ok(HttpResponse::Ok().json(history))
}
