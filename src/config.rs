use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub local_database_url: String,
    pub remote_database_url: String,
    pub jwt_secret: String,
    pub blob_dir: String,
    pub public_base_url: String,
    pub host: String,
    pub port: u16,
    pub default_low_stock_threshold: i32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let local_database_url = env::var("LOCAL_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://smartshop.db?mode=rwc".to_string());
        let remote_database_url = env::var("REMOTE_DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;
        let blob_dir = env::var("BLOB_DIR").unwrap_or_else(|_| "media".to_string());
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}"));
        let default_low_stock_threshold = env::var("DEFAULT_LOW_STOCK_THRESHOLD")
            .ok()
            .and_then(|t| t.parse::<i32>().ok())
            .filter(|t| *t >= 0)
            .unwrap_or(5);
        Ok(Self {
            local_database_url,
            remote_database_url,
            jwt_secret,
            blob_dir,
            public_base_url,
            host,
            port,
            default_low_stock_threshold,
        })
    }
}
