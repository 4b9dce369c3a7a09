use std::sync::Arc;

use crate::{
    blob::BlobStore,
    config::AppConfig,
    local::LocalStore,
    remote::RemoteStore,
    repositories::{CategoryRepository, ProductRepository, ProfileRepository},
    viewmodels::{CategoriesViewModel, ProductsViewModel},
};

#[derive(Clone)]
pub struct AppState {
    pub local: LocalStore,
    pub remote: Arc<dyn RemoteStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub products: Arc<ProductsViewModel>,
    pub categories: Arc<CategoriesViewModel>,
    pub profiles: ProfileRepository,
    pub jwt_secret: Arc<str>,
    pub default_low_stock_threshold: i32,
}

impl AppState {
    pub fn new(
        local: LocalStore,
        remote: Arc<dyn RemoteStore>,
        blobs: Arc<dyn BlobStore>,
        jwt_secret: &str,
        default_low_stock_threshold: i32,
    ) -> Self {
        let products = ProductRepository::new(local.clone(), remote.clone());
        let categories = CategoryRepository::new(local.clone(), remote.clone());
        let profiles = ProfileRepository::new(local.clone(), remote.clone());
        Self {
            local,
            remote,
            blobs,
            products: Arc::new(ProductsViewModel::new(products)),
            categories: Arc::new(CategoriesViewModel::new(categories)),
            profiles,
            jwt_secret: Arc::from(jwt_secret),
            default_low_stock_threshold,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        local: LocalStore,
        remote: Arc<dyn RemoteStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self::new(
            local,
            remote,
            blobs,
            &config.jwt_secret,
            config.default_low_stock_threshold,
        )
    }
}
