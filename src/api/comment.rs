use crate::api::parse_object_id;
use crate::auth::AuthenticatedUser;
use crate::entities::NewComment;
use crate::error::ApiError;
use crate::models::{CommentRequest, CommentResponse};
use crate::stores::Stores;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CommentQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 20)]
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/comments/{video_id}",
    params(
        ("video_id" = String, Path, description = "Video ID"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "Comments, newest first", body = Vec<CommentResponse>),
        (status = 404, description = "Video not found")
    ),
    tag = "comments"
)]
pub async fn get_comments(
    path: web::Path<String>,
    query: web::Query<CommentQuery>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let video_id = parse_object_id(&path.into_inner(), "video id")?;
    if stores.content.find_video(video_id).await?.is_none() {
        return Err(ApiError::not_found("video not found"));
    }

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);
    let comments = stores.content.list_comments(video_id, page, limit).await?;
    let responses: Vec<CommentResponse> =
        comments.into_iter().map(CommentResponse::from).collect();
    Ok(HttpResponse::Ok().json(responses))
}

#[utoipa::path(
    post,
    path = "/api/v1/comments/{video_id}",
    request_body = CommentRequest,
    params(
        ("video_id" = String, Path, description = "Video ID")
    ),
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Empty content"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Video not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn add_comment(
    path: web::Path<String>,
    req: web::Json<CommentRequest>,
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let video_id = parse_object_id(&path.into_inner(), "video id")?;
    let content = req.into_inner().content;
    if content.trim().is_empty() {
        return Err(ApiError::validation("comment content is required"));
    }
    if stores.content.find_video(video_id).await?.is_none() {
        return Err(ApiError::not_found("video not found"));
    }

    let comment = stores
        .content
        .create_comment(NewComment {
            video: video_id,
            owner: user.user_id,
            content,
        })
        .await?;

    Ok(HttpResponse::Created().json(CommentResponse::from(comment)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/comments/c/{comment_id}",
    request_body = CommentRequest,
    params(
        ("comment_id" = String, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Comment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn update_comment(
    path: web::Path<String>,
    req: web::Json<CommentRequest>,
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let comment_id = parse_object_id(&path.into_inner(), "comment id")?;
    let content = req.into_inner().content;
    if content.trim().is_empty() {
        return Err(ApiError::validation("comment content is required"));
    }

    let comment = stores
        .content
        .find_comment(comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("comment not found"))?;
    if comment.owner != user.user_id {
        return Err(ApiError::forbidden("only the owner can edit this comment"));
    }

    let updated = stores.content.update_comment(comment_id, content).await?;
    Ok(HttpResponse::Ok().json(CommentResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/c/{comment_id}",
    params(
        ("comment_id" = String, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Comment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn delete_comment(
    path: web::Path<String>,
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let comment_id = parse_object_id(&path.into_inner(), "comment id")?;

    let comment = stores
        .content
        .find_comment(comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("comment not found"))?;
    if comment.owner != user.user_id {
        return Err(ApiError::forbidden("only the owner can delete this comment"));
    }

    stores.content.delete_comment(comment_id).await?;
    Ok(HttpResponse::Ok().json(json!({"message": "comment deleted"})))
}
