use crate::auth::verify_access_token;
use crate::config::Config;
use actix_web::{web, Error, FromRequest, HttpRequest};
use mongodb::bson::oid::ObjectId;
use std::future::{ready, Ready};

/// Identity of the caller, decoded from the `Authorization: Bearer` header.
/// Use `Option<AuthenticatedUser>` on endpoints where auth is optional.
pub struct AuthenticatedUser {
    pub user_id: ObjectId,
    pub username: String,
    #[allow(dead_code)]
    pub email: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let auth_header = req.headers().get("Authorization");

        if let Some(header_value) = auth_header {
            if let Ok(header_str) = header_value.to_str() {
                if let Some(token) = header_str.strip_prefix("Bearer ") {
                    let config = req.app_data::<web::Data<Config>>();
                    if let Some(config) = config {
                        match verify_access_token(token, &config.jwt.access_secret) {
                            Ok(claims) => {
                                if let Ok(user_id) = ObjectId::parse_str(&claims.sub) {
                                    return ready(Ok(AuthenticatedUser {
                                        user_id,
                                        username: claims.username,
                                        email: claims.email,
                                    }));
                                }
                            }
                            Err(_) => {
                                return ready(Err(actix_web::error::ErrorUnauthorized(
                                    "Invalid access token",
                                )));
                            }
                        }
                    }
                }
            }
        }

        ready(Err(actix_web::error::ErrorUnauthorized(
            "Missing or invalid authorization header",
        )))
    }
}
