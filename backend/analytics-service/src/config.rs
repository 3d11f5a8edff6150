use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// RS256 public key for verifying access tokens issued by the identity
    /// service. Absent key means all tracked traffic is treated as anonymous.
    pub jwt_public_key_pem: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    /// S3-compatible endpoint override (MinIO in development)
    pub endpoint: Option<String>,
    pub region: String,
    pub presign_expiry_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Config {
            app: AppConfig {
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                port: std::env::var("APP_PORT")
                    .unwrap_or_else(|_| "8086".to_string())
                    .parse()?,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")?,
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
            },
            redis: RedisConfig {
                url: std::env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            },
            auth: AuthConfig {
                jwt_public_key_pem: std::env::var("JWT_PUBLIC_KEY_PEM").ok(),
            },
            storage: StorageConfig {
                bucket: std::env::var("STORAGE_BUCKET")
                    .unwrap_or_else(|_| "mangakai-media".to_string()),
                endpoint: std::env::var("STORAGE_ENDPOINT").ok(),
                region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                presign_expiry_secs: std::env::var("STORAGE_PRESIGN_EXPIRY_SECS")
                    .unwrap_or_else(|_| "900".to_string())
                    .parse()?,
            },
        })
    }
}
