use crate::auth::{
    create_access_token, create_refresh_token, hash_password, verify_password,
    verify_refresh_token, AccessClaims, AuthenticatedUser, RefreshClaims,
};
use crate::config::Config;
use crate::entities::{AccountUpdate, NewUser, User};
use crate::error::ApiError;
use crate::models::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RefreshTokenRequest, RegisterRequest,
    TokenResponse, UpdateAccountRequest, UpdateAvatarRequest, UpdateCoverImageRequest,
    UserResponse,
};
use crate::stores::Stores;
use actix_web::{web, HttpResponse};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

fn issue_token_pair(user: &User, config: &Config) -> Result<(String, String), ApiError> {
    let access_claims = AccessClaims::new(
        user.id,
        user.username.clone(),
        user.email.clone(),
        config.jwt.access_expiry_hours,
    );
    let access = create_access_token(&access_claims, &config.jwt.access_secret)?;
    let refresh_claims = RefreshClaims::new(user.id, config.jwt.refresh_expiry_days);
    let refresh = create_refresh_token(&refresh_claims, &config.jwt.refresh_secret)?;
    Ok((access, refresh))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Missing required field"),
        (status = 409, description = "Username or email already taken")
    ),
    tag = "users"
)]
pub async fn register(
    req: web::Json<RegisterRequest>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    let required = [
        &req.full_name,
        &req.email,
        &req.username,
        &req.password,
        &req.avatar,
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(ApiError::validation("all fields are required"));
    }

    let username = req.username.trim().to_lowercase();
    let email = req.email.trim().to_lowercase();

    if stores
        .identity
        .find_by_username_or_email(&username, &email)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict(
            "user with email or username already exists",
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let user = stores
        .identity
        .create_user(NewUser {
            username,
            email,
            full_name: req.full_name.trim().to_string(),
            avatar: req.avatar,
            cover_image: req.cover_image,
            password_hash,
        })
        .await?;

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn login(
    req: web::Json<LoginRequest>,
    stores: web::Data<Stores>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    if req.username.is_none() && req.email.is_none() {
        return Err(ApiError::validation("username or email is required"));
    }
    let username = req.username.unwrap_or_default().to_lowercase();
    let email = req.email.unwrap_or_default().to_lowercase();

    let user = stores
        .identity
        .find_by_username_or_email(&username, &email)
        .await?
        .ok_or_else(|| ApiError::not_found("user does not exist"))?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    let (access_token, refresh_token) = issue_token_pair(&user, &config)?;
    stores
        .identity
        .set_refresh_token(user.id, Some(refresh_token.clone()))
        .await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        user: UserResponse::from(user),
        access_token,
        refresh_token,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn logout(
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    stores
        .identity
        .set_refresh_token(user.user_id, None)
        .await?;
    Ok(HttpResponse::Ok().json(json!({"message": "logged out"})))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/refresh-token",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenResponse),
        (status = 401, description = "Refresh token invalid, expired or already used")
    ),
    tag = "users"
)]
pub async fn refresh_token(
    req: web::Json<RefreshTokenRequest>,
    stores: web::Data<Stores>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let incoming = req.into_inner().refresh_token;

    let claims = verify_refresh_token(&incoming, &config.jwt.refresh_secret)
        .map_err(|_| ApiError::unauthorized("invalid refresh token"))?;
    let user_id = ObjectId::parse_str(&claims.sub)
        .map_err(|_| ApiError::unauthorized("invalid refresh token"))?;

    let user = stores
        .identity
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("invalid refresh token"))?;

    // Rotation: only the most recently issued refresh token is accepted.
    if user.refresh_token.as_deref() != Some(incoming.as_str()) {
        return Err(ApiError::unauthorized(
            "refresh token is expired or already used",
        ));
    }

    let (access_token, refresh_token) = issue_token_pair(&user, &config)?;
    stores
        .identity
        .set_refresh_token(user.id, Some(refresh_token.clone()))
        .await?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token,
        refresh_token,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Old password incorrect")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn change_password(
    req: web::Json<ChangePasswordRequest>,
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    if req.new_password.trim().is_empty() {
        return Err(ApiError::validation("new password must not be empty"));
    }

    let record = stores
        .identity
        .find_by_id(user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    if !verify_password(&req.old_password, &record.password_hash)? {
        return Err(ApiError::unauthorized("old password is incorrect"));
    }

    let password_hash = hash_password(&req.new_password)?;
    stores
        .identity
        .set_password_hash(record.id, password_hash)
        .await?;

    Ok(HttpResponse::Ok().json(json!({"message": "password changed"})))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/current-user",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn current_user(
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let record = stores
        .identity
        .find_by_id(user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;
    Ok(HttpResponse::Ok().json(UserResponse::from(record)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/update-account",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Email already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_account(
    req: web::Json<UpdateAccountRequest>,
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    if req.full_name.trim().is_empty() || req.email.trim().is_empty() {
        return Err(ApiError::validation("full name and email are required"));
    }
    let email = req.email.trim().to_lowercase();

    if let Some(existing) = stores.identity.find_by_username_or_email("", &email).await? {
        if existing.id != user.user_id {
            return Err(ApiError::conflict("email already taken"));
        }
    }

    let updated = stores
        .identity
        .update_account(
            user.user_id,
            AccountUpdate {
                full_name: req.full_name.trim().to_string(),
                email,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/avatar",
    request_body = UpdateAvatarRequest,
    responses(
        (status = 200, description = "Avatar updated", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_avatar(
    req: web::Json<UpdateAvatarRequest>,
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let avatar = req.into_inner().avatar;
    if avatar.trim().is_empty() {
        return Err(ApiError::validation("avatar is required"));
    }
    let updated = stores.identity.set_avatar(user.user_id, avatar).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/cover-image",
    request_body = UpdateCoverImageRequest,
    responses(
        (status = 200, description = "Cover image updated", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_cover_image(
    req: web::Json<UpdateCoverImageRequest>,
    user: AuthenticatedUser,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, ApiError> {
    let cover_image = req.into_inner().cover_image;
    if cover_image.trim().is_empty() {
        return Err(ApiError::validation("cover image is required"));
    }
    let updated = stores
        .identity
        .set_cover_image(user.user_id, cover_image)
        .await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}
