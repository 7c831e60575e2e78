pub mod auth;
pub mod comment;
pub mod like;
pub mod subscription;
pub mod tweet;
pub mod user;
pub mod video;

use crate::error::ApiError;
use crate::models::{
    AuthResponse, ChangePasswordRequest, ChannelProfileResponse, ChannelSubscribersResponse,
    CommentRequest, CommentResponse, LoginRequest, OwnerSummary, PublishVideoRequest,
    RefreshTokenRequest, RegisterRequest, SubscribedChannelRow, SubscriberRow, ToggleLikeResponse,
    TogglePublishResponse, ToggleSubscriptionResponse, TokenResponse, TweetRequest, TweetResponse,
    UpdateAccountRequest, UpdateAvatarRequest, UpdateCoverImageRequest, UpdateVideoRequest,
    UserResponse, VideoDetailResponse, VideoListItem, VideoOwnerResponse, VideoResponse,
    VideoSummary,
};
use actix_web::{web, HttpResponse};
use mongodb::bson::oid::ObjectId;
use serde_json::json;
use utoipa::OpenApi;

pub fn parse_object_id(value: &str, what: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(value).map_err(|_| ApiError::validation(format!("{what} is not valid")))
}

#[utoipa::path(
    get,
    path = "/api/v1/healthcheck",
    responses(
        (status = 200, description = "Service is up")
    ),
    tag = "healthcheck"
)]
pub async fn healthcheck() -> HttpResponse {
    HttpResponse::Ok().json(json!({"status": "ok"}))
}

/// Route table shared by the server binary and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/healthcheck", web::get().to(healthcheck))
            .service(
                web::scope("/users")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/logout", web::post().to(auth::logout))
                    .route("/refresh-token", web::post().to(auth::refresh_token))
                    .route("/change-password", web::post().to(auth::change_password))
                    .route("/current-user", web::get().to(auth::current_user))
                    .route("/update-account", web::patch().to(auth::update_account))
                    .route("/avatar", web::patch().to(auth::update_avatar))
                    .route("/cover-image", web::patch().to(auth::update_cover_image))
                    .route("/c/{username}", web::get().to(user::channel_profile))
                    .route("/history", web::get().to(user::watch_history)),
            )
            .service(
                web::scope("/videos")
                    .route("", web::get().to(video::list_videos))
                    .route("", web::post().to(video::publish_video))
                    .route(
                        "/toggle/publish/{video_id}",
                        web::patch().to(video::toggle_publish),
                    )
                    .route("/{video_id}", web::get().to(video::get_video))
                    .route("/{video_id}", web::patch().to(video::update_video))
                    .route("/{video_id}", web::delete().to(video::delete_video)),
            )
            .service(
                web::scope("/subscriptions")
                    .route(
                        "/c/{channel_id}",
                        web::post().to(subscription::toggle_subscription),
                    )
                    .route(
                        "/c/{channel_id}/subscribers",
                        web::get().to(subscription::get_channel_subscribers),
                    )
                    .route(
                        "/u/{subscriber_id}/channels",
                        web::get().to(subscription::get_subscribed_channels),
                    ),
            )
            .service(
                web::scope("/likes")
                    .route(
                        "/toggle/v/{video_id}",
                        web::post().to(like::toggle_video_like),
                    )
                    .route("/videos", web::get().to(like::get_liked_videos)),
            )
            .service(
                web::scope("/comments")
                    .route("/c/{comment_id}", web::patch().to(comment::update_comment))
                    .route("/c/{comment_id}", web::delete().to(comment::delete_comment))
                    .route("/{video_id}", web::get().to(comment::get_comments))
                    .route("/{video_id}", web::post().to(comment::add_comment)),
            )
            .service(
                web::scope("/tweets")
                    .route("", web::post().to(tweet::create_tweet))
                    .route("/user/{user_id}", web::get().to(tweet::get_user_tweets))
                    .route("/{tweet_id}", web::patch().to(tweet::update_tweet))
                    .route("/{tweet_id}", web::delete().to(tweet::delete_tweet)),
            ),
    );
}

#[derive(OpenApi)]
#[openapi(
    paths(
        healthcheck,
        // Auth endpoints
        auth::register,
        auth::login,
        auth::logout,
        auth::refresh_token,
        auth::change_password,
        auth::current_user,
        auth::update_account,
        auth::update_avatar,
        auth::update_cover_image,
        // User views
        user::channel_profile,
        user::watch_history,
        // Video endpoints
        video::list_videos,
        video::publish_video,
        video::get_video,
        video::update_video,
        video::delete_video,
        video::toggle_publish,
        // Subscription endpoints
        subscription::toggle_subscription,
        subscription::get_channel_subscribers,
        subscription::get_subscribed_channels,
        // Like endpoints
        like::toggle_video_like,
        like::get_liked_videos,
        // Comment endpoints
        comment::get_comments,
        comment::add_comment,
        comment::update_comment,
        comment::delete_comment,
        // Tweet endpoints
        tweet::create_tweet,
        tweet::get_user_tweets,
        tweet::update_tweet,
        tweet::delete_tweet,
    ),
    components(schemas(
        // Auth schemas
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        RefreshTokenRequest,
        TokenResponse,
        ChangePasswordRequest,
        UpdateAccountRequest,
        UpdateAvatarRequest,
        UpdateCoverImageRequest,
        UserResponse,
        ChannelProfileResponse,
        // Video schemas
        PublishVideoRequest,
        UpdateVideoRequest,
        VideoResponse,
        VideoListItem,
        VideoDetailResponse,
        VideoOwnerResponse,
        VideoSummary,
        OwnerSummary,
        TogglePublishResponse,
        // Subscription schemas
        ToggleSubscriptionResponse,
        SubscriberRow,
        ChannelSubscribersResponse,
        SubscribedChannelRow,
        // Like schemas
        ToggleLikeResponse,
        // Comment schemas
        CommentRequest,
        CommentResponse,
        // Tweet schemas
        TweetRequest,
        TweetResponse,
        // Query schemas
        video::VideoListQuery,
        comment::CommentQuery,
    )),
    tags(
        (name = "healthcheck", description = "Liveness endpoint"),
        (name = "users", description = "Accounts, sessions and channel views"),
        (name = "videos", description = "Video management endpoints"),
        (name = "subscriptions", description = "Subscription graph endpoints"),
        (name = "likes", description = "Like endpoints"),
        (name = "comments", description = "Comment endpoints"),
        (name = "tweets", description = "Tweet endpoints"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

use utoipa::Modify;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_object_id_accepts_hex() {
        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex(), "id").unwrap(), id);
    }

    #[test]
    fn parse_object_id_rejects_garbage() {
        let err = parse_object_id("not-an-id", "channel id").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.to_string(), "channel id is not valid");
    }
}
