use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Short-lived token sent with every authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String, // user id (hex)
    pub username: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl AccessClaims {
    pub fn new(user_id: ObjectId, username: String, email: String, expiry_hours: i64) -> Self {
        let now = Utc::now();
        AccessClaims {
            sub: user_id.to_hex(),
            username,
            email,
            exp: (now + Duration::hours(expiry_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Long-lived token used only to mint a fresh pair; a copy is persisted on
/// the user record so it can be revoked by logout.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String, // user id (hex)
    pub exp: i64,
    pub iat: i64,
}

impl RefreshClaims {
    pub fn new(user_id: ObjectId, expiry_days: i64) -> Self {
        let now = Utc::now();
        RefreshClaims {
            sub: user_id.to_hex(),
            exp: (now + Duration::days(expiry_days)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

pub fn create_access_token(claims: &AccessClaims, secret: &str) -> Result<String, anyhow::Error> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

pub fn verify_access_token(token: &str, secret: &str) -> Result<AccessClaims, anyhow::Error> {
    let validation = Validation::default();
    let token_data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;
    Ok(token_data.claims)
}

pub fn create_refresh_token(claims: &RefreshClaims, secret: &str) -> Result<String, anyhow::Error> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

pub fn verify_refresh_token(token: &str, secret: &str) -> Result<RefreshClaims, anyhow::Error> {
    let validation = Validation::default();
    let token_data = decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;
    Ok(token_data.claims)
}
