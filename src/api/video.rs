use crate::api::parse_object_id;
use crate::auth::AuthenticatedUser;
use crate::entities::{NewVideo, SortDirection, VideoListFilter, VideoSortKey, VideoUpdate};
use crate::error::ApiError;
use crate::models::{
    OwnerSummary, PublishVideoRequest, TogglePublishResponse, UpdateVideoRequest,
    VideoDetailResponse, VideoListItem, VideoResponse,
};
use crate::services::social_graph;
use crate::stores::Stores;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct VideoListQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 10)]
    pub limit: Option<u64>,
    /// Case-insensitive search over title and description.
    pub query: Option<String>,
    /// One of `views`, `created_at`, `duration`.
    pub sort_by: Option<String>,
    /// `asc` or `desc`.
    pub sort_type: Option<String>,
    /// Restrict to a single owner.
    pub user_id: Option<String>,
}

fn parse_sort(query: &VideoListQuery) -> Result<(VideoSortKey, SortDirection), ApiError> {
    let key = match query.sort_by.as_deref() {
        None => VideoSortKey::CreatedAt,
        Some("views") => VideoSortKey::Views,
        Some("created_at") => VideoSortKey::CreatedAt,
        Some("duration") => VideoSortKey::Duration,
        Some(other) => {
            return Err(ApiError::validation(format!("unknown sort key: {other}")));
        }
    };
    let direction = match query.sort_type.as_deref() {
        None | Some("desc") => SortDirection::Desc,
        Some("asc") => SortDirection::Asc,
        Some(other) => {
            return Err(ApiError::validation(format!("unknown sort order: {other}")));
        }
    };
    Ok((key, direction))
}

#[utoipa::path(
    get,
    path = "/api/v1/videos",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 10)"),
        ("query" = Option<String>, Query, description = "Search in title/description"),
        ("sort_by" = Option<String>, Query, description = "views | created_at | duration"),
        ("sort_type" = Option<String>, Query, description = "asc | desc (default: desc)"),
        ("user_id" = Option<String>, Query, description = "Filter by owner id")
    ),
    responses(
        (status = 200, description = "Published videos", body = Vec<VideoListItem>),
        (status = 400, description = "Malformed query")
    ),
    tag = "videos"
)]
pub async fn list_videos(
    query: web::Query<VideoListQuery>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let (sort_key, direction) = parse_sort(&query)?;
    let owner = match &query.user_id {
        Some(raw) => Some(parse_object_id(raw, "user id")?),
        None => None,
    };
    let filter = VideoListFilter {
        owner,
        search: query.query.clone(),
        sort_key,
        direction,
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(10),
    };

    let videos = stores.content.list_videos(filter).await?;

    let mut items = Vec::with_capacity(videos.len());
    for video in videos {
        // Skip rows whose owner record has vanished.
        let Some(owner) = stores.identity.find_by_id(video.owner).await? else {
            continue;
        };
        items.push(VideoListItem {
            id: video.id.to_hex(),
            video_file: video.video_file,
            thumbnail: video.thumbnail,
            title: video.title,
            description: video.description,
            duration: video.duration,
            views: video.views,
            created_at: video.created_at,
            owner: OwnerSummary {
                id: owner.id.to_hex(),
                username: owner.username,
                avatar: owner.avatar,
            },
        });
    }

    Ok(HttpResponse::Ok().json(items))
}

#[utoipa::path(
    post,
    path = "/api/v1/videos",
    request_body = PublishVideoRequest,
    responses(
        (status = 201, description = "Video registered (unpublished)", body = VideoResponse),
        (status = 400, description = "Missing field"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "videos"
)]
pub async fn publish_video(
    req: web::Json<PublishVideoRequest>,
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    if req.title.trim().is_empty() || req.description.trim().is_empty() {
        return Err(ApiError::validation("title and description are required"));
    }
    if req.video_file.trim().is_empty() || req.thumbnail.trim().is_empty() {
        return Err(ApiError::validation("video file and thumbnail are required"));
    }
    if req.duration <= 0.0 {
        return Err(ApiError::validation("duration must be positive"));
    }

    let video = stores
        .content
        .create_video(NewVideo {
            owner: user.user_id,
            video_file: req.video_file,
            thumbnail: req.thumbnail,
            title: req.title,
            description: req.description,
            duration: req.duration,
        })
        .await?;

    Ok(HttpResponse::Created().json(VideoResponse::from(video)))
}

#[utoipa::path(
    get,
    path = "/api/v1/videos/{video_id}",
    params(
        ("video_id" = String, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video detail; counts the view and records watch history", body = VideoDetailResponse),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Video not found")
    ),
    security(("bearer_auth" = [])),
    tag = "videos"
)]
pub async fn get_video(
    path: web::Path<String>,
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let video_id = parse_object_id(&path.into_inner(), "video id")?;
    let detail = social_graph::video_detail(&stores, video_id, user.user_id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[utoipa::path(
    patch,
    path = "/api/v1/videos/{video_id}",
    request_body = UpdateVideoRequest,
    params(
        ("video_id" = String, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video updated", body = VideoResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Video not found")
    ),
    security(("bearer_auth" = [])),
    tag = "videos"
)]
pub async fn update_video(
    path: web::Path<String>,
    req: web::Json<UpdateVideoRequest>,
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let video_id = parse_object_id(&path.into_inner(), "video id")?;
    let req = req.into_inner();
    if req.title.trim().is_empty() || req.description.trim().is_empty() {
        return Err(ApiError::validation("title and description are required"));
    }

    let video = stores
        .content
        .find_video(video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("video not found"))?;
    if video.owner != user.user_id {
        return Err(ApiError::forbidden("only the owner can edit this video"));
    }

    let updated = stores
        .content
        .update_video(
            video_id,
            VideoUpdate {
                title: req.title,
                description: req.description,
                thumbnail: req.thumbnail,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(VideoResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/videos/{video_id}",
    params(
        ("video_id" = String, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video and its likes/comments deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Video not found")
    ),
    security(("bearer_auth" = [])),
    tag = "videos"
)]
pub async fn delete_video(
    path: web::Path<String>,
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let video_id = parse_object_id(&path.into_inner(), "video id")?;

    let video = stores
        .content
        .find_video(video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("video not found"))?;
    if video.owner != user.user_id {
        return Err(ApiError::forbidden("only the owner can delete this video"));
    }

    stores.content.delete_video(video_id).await?;
    Ok(HttpResponse::Ok().json(json!({"message": "video deleted"})))
}

#[utoipa::path(
    patch,
    path = "/api/v1/videos/toggle/publish/{video_id}",
    params(
        ("video_id" = String, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Publish flag flipped", body = TogglePublishResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Video not found")
    ),
    security(("bearer_auth" = [])),
    tag = "videos"
)]
pub async fn toggle_publish(
    path: web::Path<String>,
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let video_id = parse_object_id(&path.into_inner(), "video id")?;

    let video = stores
        .content
        .find_video(video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("video not found"))?;
    if video.owner != user.user_id {
        return Err(ApiError::forbidden(
            "only the owner can toggle the publish status",
        ));
    }

    let updated = stores
        .content
        .set_published(video_id, !video.is_published)
        .await?;

    Ok(HttpResponse::Ok().json(TogglePublishResponse {
        is_published: updated.is_published,
    }))
}
