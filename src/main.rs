use axum::http::{HeaderName, Request, Response};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::{net::SocketAddr, sync::Arc, time::Duration};

use smartshop::{
    blob::FsBlobStore,
    build_app,
    config::AppConfig,
    db::connect_stores,
    local::LocalStore,
    remote::DocumentStore,
    routes::products::MAX_IMAGE_BYTES,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,smartshop=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let (local_conn, remote_conn) =
        connect_stores(&config.local_database_url, &config.remote_database_url).await?;

    tokio::fs::create_dir_all(&config.blob_dir).await?;
    let blobs = FsBlobStore::new(&config.blob_dir, &config.public_base_url);
    let state = AppState::from_config(
        &config,
        LocalStore::new(local_conn),
        Arc::new(DocumentStore::new(remote_conn)),
        Arc::new(blobs),
    );

    // Startup mirrors opening the app: pull the cloud copy, seed an empty
    // category table, then keep following remote category changes.
    match state.categories.sync_from_cloud().await {
        Ok(count) => tracing::info!(count, "categories pulled from cloud"),
        Err(err) => tracing::warn!(error = %err, "initial category sync failed"),
    }
    match state.products.sync_from_cloud().await {
        Ok(count) => tracing::info!(count, "products pulled from cloud"),
        Err(err) => tracing::warn!(error = %err, "initial product sync failed"),
    }
    if let Err(err) = state.categories.initialize_defaults().await {
        tracing::warn!(error = %err, "default category seeding failed");
    }
    let _category_listener = state.categories.repository().watch_remote();
    let _product_refresher = state.products.clone().spawn_auto_refresh();

    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_request(|request: &Request<_>, _span: &tracing::Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "request started"
            );
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = %response.status(),
                ms = %latency.as_millis(),
                "request finished"
            );
        });

    let app = build_app(state, &config.blob_dir)
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(MAX_IMAGE_BYTES))
        .layer(ConcurrencyLimitLayer::new(100));

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    tracing::info!("listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
