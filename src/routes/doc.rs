use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        categories::{CategoryList, CategoryRequest, SeedResult},
        products::{ProductList, ProductRequest, ProductView, StockAdjustRequest},
        profile::{ProfileImageRequest, UpdateProfileRequest},
        stats::{CategoryCount, Dashboard},
        sync::SyncReport,
    },
    error::FieldError,
    models::{Category, Product, StockStatus, UserProfile},
    response::{ApiResponse, Meta},
    routes::{auth, categories, health, products, profile, stats, sync},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        profile::get_profile,
        profile::update_profile,
        profile::set_profile_image,
        products::list_products,
        products::list_low_stock,
        products::get_product,
        products::create_product,
        products::update_product,
        products::adjust_stock,
        products::delete_product,
        products::upload_image,
        categories::list_categories,
        categories::create_category,
        categories::initialize_defaults,
        categories::update_category,
        categories::delete_category,
        sync::sync_from_cloud,
        stats::dashboard
    ),
    components(
        schemas(
            Product,
            Category,
            UserProfile,
            StockStatus,
            FieldError,
            ProductView,
            ProductList,
            ProductRequest,
            StockAdjustRequest,
            CategoryList,
            CategoryRequest,
            SeedResult,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            ProfileImageRequest,
            Dashboard,
            CategoryCount,
            SyncReport,
            health::HealthData,
            Meta,
            ApiResponse<ProductView>,
            ApiResponse<ProductList>,
            ApiResponse<Category>,
            ApiResponse<CategoryList>,
            ApiResponse<UserProfile>,
            ApiResponse<Dashboard>,
            ApiResponse<SyncReport>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Profile", description = "Signed-in user's profile"),
        (name = "Products", description = "Product inventory"),
        (name = "Categories", description = "Product categories"),
        (name = "Sync", description = "Cloud to cache synchronization"),
        (name = "Stats", description = "Inventory dashboard"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/scalar", ApiDoc::openapi())
}
