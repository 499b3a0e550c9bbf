use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;
use crate::core::{Location, NewLocation};
use crate::index::Catalog;
use crate::query::error::ApiError;
use crate::query::params::{CityParams, CountParams, LocationParams};
use crate::stats::CatalogStats;

#[derive(Serialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub struct QueryServer {
    pub catalog: Arc<Catalog>,
    pub config: Config,
}

impl QueryServer {
    pub fn new(catalog: Arc<Catalog>, config: Config) -> Self {
        Self { catalog, config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let app = router(self.catalog, &self.config.cors_origins);

        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("HTTP API listening on http://{}/api", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}

/// 完整路由：`/api/*` 目录接口 + 根/健康/状态
pub fn router(catalog: Arc<Catalog>, cors_origins: &[String]) -> Router {
    let api = Router::new()
        .route("/locations", get(list_locations).post(create_location))
        .route("/locations/count", get(count_locations))
        .route("/locations/:id", get(get_location))
        .route("/cities", get(list_cities))
        .route("/categories", get(list_categories))
        .route("/countries", get(list_countries));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .nest("/api", api)
        .layer(cors_layer(cors_origins))
        .with_state(catalog)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let list: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(list)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn list_locations(
    State(catalog): State<Arc<Catalog>>,
    params: Result<Query<LocationParams>, QueryRejection>,
) -> Result<Json<Arc<Vec<Location>>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::Unprocessable(e.body_text()))?;
    params.validate()?;
    Ok(Json(catalog.query(&params.filter(), params.page())))
}

async fn count_locations(
    State(catalog): State<Arc<Catalog>>,
    params: Result<Query<CountParams>, QueryRejection>,
) -> Result<Json<CountResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::Unprocessable(e.body_text()))?;
    Ok(Json(CountResponse {
        count: catalog.count(&params.filter()),
    }))
}

async fn get_location(
    State(catalog): State<Arc<Catalog>>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Location>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::Unprocessable(e.body_text()))?;
    catalog
        .get(id)
        .map(Json)
        .ok_or(ApiError::NotFound("Location not found"))
}

async fn create_location(
    State(catalog): State<Arc<Catalog>>,
    payload: Result<Json<NewLocation>, JsonRejection>,
) -> Result<(StatusCode, Json<Location>), ApiError> {
    let Json(new) = payload.map_err(|e| ApiError::Unprocessable(e.body_text()))?;
    let created = catalog.insert(new)?;
    tracing::info!("Created location {} ({})", created.id, created.name);
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_cities(
    State(catalog): State<Arc<Catalog>>,
    params: Result<Query<CityParams>, QueryRejection>,
) -> Result<Json<Vec<String>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::Unprocessable(e.body_text()))?;
    Ok(Json(catalog.cities(params.country.as_deref())))
}

async fn list_categories(State(catalog): State<Arc<Catalog>>) -> Json<Vec<String>> {
    Json(catalog.categories())
}

async fn list_countries(State(catalog): State<Arc<Catalog>>) -> Json<Vec<String>> {
    Json(catalog.countries())
}

async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to Roamy Travel API",
    })
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

async fn status_handler(State(catalog): State<Arc<Catalog>>) -> Json<CatalogStats> {
    Json(catalog.stats())
}
