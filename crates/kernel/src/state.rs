//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::listing::{DEFAULT_LIMIT, MenuListingService, MenuStore, PgMenuStore};
use crate::metrics::Metrics;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Catalog store.
    store: Arc<dyn MenuStore>,

    /// Listing service over `store`.
    listing: Arc<MenuListingService>,

    /// Prometheus metrics.
    metrics: Arc<Metrics>,

    /// Whether `/api/debug/menus` is served.
    debug_endpoints: bool,

    /// Page size when a request omits `limit`.
    default_limit: u32,
}

impl AppState {
    /// Connect to PostgreSQL, apply migrations and build the state.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(&config.database_url, config.database_max_connections)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&pool).await?;

        info!(
            max_connections = config.database_max_connections,
            "database pool ready"
        );

        let store: Arc<dyn MenuStore> = Arc::new(PgMenuStore::new(pool));

        Ok(Self::build(
            store,
            config.debug_endpoints,
            config.listing_default_limit,
        ))
    }

    /// Build state over an arbitrary store with default settings.
    pub fn with_store(store: Arc<dyn MenuStore>) -> Self {
        Self::build(store, false, DEFAULT_LIMIT)
    }

    /// Build state over an arbitrary store.
    pub fn build(store: Arc<dyn MenuStore>, debug_endpoints: bool, default_limit: u32) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                listing: MenuListingService::new(store.clone()),
                store,
                metrics: Arc::new(Metrics::new()),
                debug_endpoints,
                default_limit,
            }),
        }
    }

    /// Get the catalog store.
    pub fn store(&self) -> &Arc<dyn MenuStore> {
        &self.inner.store
    }

    /// Get the listing service.
    pub fn listing(&self) -> &Arc<MenuListingService> {
        &self.inner.listing
    }

    /// Get the metrics registry.
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.inner.metrics
    }

    /// Whether debug endpoints are served.
    pub fn debug_endpoints_enabled(&self) -> bool {
        self.inner.debug_endpoints
    }

    /// Page size used when a request omits `limit`.
    pub fn listing_default_limit(&self) -> u32 {
        self.inner.default_limit
    }

    /// Check if the catalog store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.inner.store.ping().await
    }
}
