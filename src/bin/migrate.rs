use smartshop::{config::AppConfig, db::connect_stores};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    connect_stores(&config.local_database_url, &config.remote_database_url).await?;
    println!("Migrations applied (local cache and remote store)");
    Ok(())
}
