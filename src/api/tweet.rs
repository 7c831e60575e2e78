use crate::api::parse_object_id;
use crate::auth::AuthenticatedUser;
use crate::entities::NewTweet;
use crate::error::ApiError;
use crate::models::{TweetRequest, TweetResponse};
use crate::stores::Stores;
use actix_web::{web, HttpResponse};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/v1/tweets",
    request_body = TweetRequest,
    responses(
        (status = 201, description = "Tweet created", body = TweetResponse),
        (status = 400, description = "Empty content"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "tweets"
)]
pub async fn create_tweet(
    req: web::Json<TweetRequest>,
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let content = req.into_inner().content;
    if content.trim().is_empty() {
        return Err(ApiError::validation("tweet content is required"));
    }

    let tweet = stores
        .content
        .create_tweet(NewTweet {
            owner: user.user_id,
            content,
        })
        .await?;

    Ok(HttpResponse::Created().json(TweetResponse::from(tweet)))
}

#[utoipa::path(
    get,
    path = "/api/v1/tweets/user/{user_id}",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's tweets, newest first", body = Vec<TweetResponse>),
        (status = 404, description = "User not found")
    ),
    tag = "tweets"
)]
pub async fn get_user_tweets(
    path: web::Path<String>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let user_id = parse_object_id(&path.into_inner(), "user id")?;
    if stores.identity.find_by_id(user_id).await?.is_none() {
        return Err(ApiError::not_found("user not found"));
    }

    let tweets = stores.content.list_tweets_by_owner(user_id).await?;
    let responses: Vec<TweetResponse> = tweets.into_iter().map(TweetResponse::from).collect();
    Ok(HttpResponse::Ok().json(responses))
}

#[utoipa::path(
    patch,
    path = "/api/v1/tweets/{tweet_id}",
    request_body = TweetRequest,
    params(
        ("tweet_id" = String, Path, description = "Tweet ID")
    ),
    responses(
        (status = 200, description = "Tweet updated", body = TweetResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Tweet not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tweets"
)]
pub async fn update_tweet(
    path: web::Path<String>,
    req: web::Json<TweetRequest>,
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let tweet_id = parse_object_id(&path.into_inner(), "tweet id")?;
    let content = req.into_inner().content;
    if content.trim().is_empty() {
        return Err(ApiError::validation("tweet content is required"));
    }

    let tweet = stores
        .content
        .find_tweet(tweet_id)
        .await?
        .ok_or_else(|| ApiError::not_found("tweet not found"))?;
    if tweet.owner != user.user_id {
        return Err(ApiError::forbidden("only the owner can edit this tweet"));
    }

    let updated = stores.content.update_tweet(tweet_id, content).await?;
    Ok(HttpResponse::Ok().json(TweetResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tweets/{tweet_id}",
    params(
        ("tweet_id" = String, Path, description = "Tweet ID")
    ),
    responses(
        (status = 200, description = "Tweet deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Tweet not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tweets"
)]
pub async fn delete_tweet(
    path: web::Path<String>,
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let tweet_id = parse_object_id(&path.into_inner(), "tweet id")?;

    let tweet = stores
        .content
        .find_tweet(tweet_id)
        .await?
        .ok_or_else(|| ApiError::not_found("tweet not found"))?;
    if tweet.owner != user.user_id {
        return Err(ApiError::forbidden("only the owner can delete this tweet"));
    }

    stores.content.delete_tweet(tweet_id).await?;
    Ok(HttpResponse::Ok().json(json!({"message": "tweet deleted"})))
}
