use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub mongodb: MongodbConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_expiry_hours: i64,
    pub refresh_expiry_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongodbConfig {
    pub uri: String,
    pub database: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .unwrap_or(8000),
                cors_origin: env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            },
            jwt: JwtConfig {
                access_secret: env::var("ACCESS_TOKEN_SECRET")
                    .unwrap_or_else(|_| "access-secret-change-this".to_string()),
                refresh_secret: env::var("REFRESH_TOKEN_SECRET")
                    .unwrap_or_else(|_| "refresh-secret-change-this".to_string()),
                access_expiry_hours: env::var("ACCESS_TOKEN_EXPIRY_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()
                    .unwrap_or(24),
                refresh_expiry_days: env::var("REFRESH_TOKEN_EXPIRY_DAYS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            },
            mongodb: MongodbConfig {
                uri: env::var("MONGODB_URI")
                    .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
                database: env::var("MONGODB_DATABASE").unwrap_or_else(|_| "videotube".to_string()),
            },
        })
    }
}
