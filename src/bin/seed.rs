use std::sync::Arc;

use rust_decimal::Decimal;
use smartshop::{
    blob::FsBlobStore,
    config::AppConfig,
    db::connect_stores,
    local::{LocalStore, ProductFilter},
    models::Product,
    remote::DocumentStore,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let (local, remote) =
        connect_stores(&config.local_database_url, &config.remote_database_url).await?;

    let state = AppState::from_config(
        &config,
        LocalStore::new(local),
        Arc::new(DocumentStore::new(remote)),
        Arc::new(FsBlobStore::new(&config.blob_dir, &config.public_base_url)),
    );

    let seeded = state.categories.initialize_defaults().await?;
    println!("Seeded {seeded} default categories");

    seed_products(&state).await?;
    Ok(())
}

async fn seed_products(state: &AppState) -> anyhow::Result<()> {
    let products = vec![
        ("Solitaire Ring", "18k gold, 0.5ct", "cat-rings", 4, 129_900),
        ("Pearl Necklace", "Freshwater pearls", "cat-necklaces", 12, 45_000),
        ("Hoop Earrings", "Sterling silver", "cat-earrings", 25, 8_500),
        ("Tennis Bracelet", "White gold", "cat-bracelets", 2, 210_000),
    ];

    let existing = state
        .products
        .repository()
        .list_products(&ProductFilter::default())
        .await?;

    for (name, description, category_id, quantity, cents) in products {
        if existing.iter().any(|p| p.name == name) {
            println!("Skipped {name} (already present)");
            continue;
        }
        let product = Product {
            id: String::new(),
            name: name.to_string(),
            description: Some(description.to_string()),
            category_id: category_id.to_string(),
            quantity,
            price: Decimal::new(cents, 2),
            image_path: None,
            is_available: true,
            low_stock_threshold: state.default_low_stock_threshold,
        };
        let product = state.products.add(product).await?;
        println!("Seeded {} ({})", product.name, product.id);
    }
    Ok(())
}
