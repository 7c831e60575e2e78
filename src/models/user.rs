use crate::entities::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    /// URL of an avatar already uploaded to the media service.
    pub avatar: String,
    pub cover_image: Option<String>,
}

/// Either `username` or `email` identifies the account.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAccountRequest {
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAvatarRequest {
    pub avatar: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCoverImageRequest {
    pub cover_image: String,
}

/// Public view of a user; never carries credential or session fields.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id.to_hex(),
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar: user.avatar,
            cover_image: user.cover_image,
            created_at: user.created_at,
        }
    }
}

/// Channel page: profile plus derived counts, recomputed on every read.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChannelProfileResponse {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub subscriber_count: u64,
    pub channels_subscribed_to_count: u64,
    pub is_subscribed: bool,
}
