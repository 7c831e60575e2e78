use crate::api::parse_object_id;
use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::models::{ToggleLikeResponse, VideoResponse};
use crate::stores::Stores;
use actix_web::{web, HttpResponse};

#[utoipa::path(
    post,
    path = "/api/v1/likes/toggle/v/{video_id}",
    params(
        ("video_id" = String, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Like created or removed", body = ToggleLikeResponse),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Video not found")
    ),
    security(("bearer_auth" = [])),
    tag = "likes"
)]
pub async fn toggle_video_like(
    path: web::Path<String>,
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let video_id = parse_object_id(&path.into_inner(), "video id")?;

    if stores.content.find_video(video_id).await?.is_none() {
        return Err(ApiError::not_found("video not found"));
    }

    if stores
        .content
        .find_like(video_id, user.user_id)
        .await?
        .is_some()
    {
        stores.content.delete_like(video_id, user.user_id).await?;
        return Ok(HttpResponse::Ok().json(ToggleLikeResponse { liked: false }));
    }

    // A concurrent duplicate like loses the unique-index race; the like
    // exists either way.
    match stores.content.create_like(video_id, user.user_id).await {
        Ok(_) | Err(ApiError::Conflict(_)) => {
            Ok(HttpResponse::Ok().json(ToggleLikeResponse { liked: true }))
        }
        Err(e) => Err(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/likes/videos",
    responses(
        (status = 200, description = "Videos the caller liked", body = Vec<VideoResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "likes"
)]
pub async fn get_liked_videos(
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let videos = stores.content.list_liked_videos(user.user_id).await?;
    let responses: Vec<VideoResponse> = videos.into_iter().map(VideoResponse::from).collect();
    Ok(HttpResponse::Ok().json(responses))
}
