#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Drives the REAL kernel router and listing service over an in-process
//! store, so HTTP and pagination tests run without PostgreSQL.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use carte_kernel::AppState;
use carte_kernel::listing::{
    CuisineFacet, DEFAULT_LIMIT, MemoryMenuStore, MenuCursor, MenuFilter, MenuListingService,
    MenuStore, MenuSummary,
};
use carte_kernel::models::{Cuisine, MenuDetail, NewMenuGroup, NewSetMenu};
use carte_test_utils::{TestCuisine, TestMenu};

/// Convert a fixture into the kernel's creation input.
pub fn new_set_menu(menu: &TestMenu) -> NewSetMenu {
    NewSetMenu {
        name: menu.name.clone(),
        description: menu.description.clone(),
        status: menu.status,
        price_per_person: menu.price_per_person,
        min_spend: menu.min_spend,
        number_of_orders: menu.number_of_orders,
        image: menu.image.clone(),
        thumbnail: menu.thumbnail.clone(),
        is_vegan: menu.is_vegan,
        is_vegetarian: menu.is_vegetarian,
        is_seated: true,
        is_standing: false,
        is_canape: false,
        is_mixed_dietary: false,
        is_meal_prep: false,
        is_halal: menu.is_halal,
        is_kosher: menu.is_kosher,
        display_text: false,
        price_includes: None,
        highlight: None,
        available: menu.available,
        created_at: menu.created_at,
        cuisine_ids: menu.cuisine_ids.clone(),
        groups: menu
            .groups
            .iter()
            .map(|name| NewMenuGroup {
                name: name.clone(),
                dishes_count: 4,
                selectable_dishes_count: 2,
            })
            .collect(),
    }
}

/// Convert a cuisine fixture.
pub fn cuisine(fixture: &TestCuisine) -> Cuisine {
    Cuisine::from_name(fixture.id, fixture.name.as_str())
}

/// Build a memory store holding `cuisines` and `menus`.
///
/// Returns the store and the assigned menu ids in insertion order.
pub fn seeded_store(cuisines: &[TestCuisine], menus: &[TestMenu]) -> (Arc<MemoryMenuStore>, Vec<i32>) {
    let store = Arc::new(MemoryMenuStore::new());
    for c in cuisines {
        store.insert_cuisine(cuisine(c));
    }
    let ids = menus
        .iter()
        .map(|m| store.insert_menu(new_set_menu(m)).expect("seed menu"))
        .collect();
    (store, ids)
}

/// Listing service over a seeded memory store.
pub fn listing(store: &Arc<MemoryMenuStore>) -> Arc<MenuListingService> {
    MenuListingService::new(store.clone())
}

/// Store call made to fail by [`FailingStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Page,
    Count,
    Facets,
}

/// Memory store whose `fail_on` method returns an error.
pub struct FailingStore {
    inner: Arc<MemoryMenuStore>,
    fail_on: FailOn,
}

impl FailingStore {
    pub fn new(inner: Arc<MemoryMenuStore>, fail_on: FailOn) -> Arc<Self> {
        Arc::new(Self { inner, fail_on })
    }

    fn check(&self, call: FailOn) -> Result<()> {
        if self.fail_on == call {
            bail!("connection reset while reading {call:?}");
        }
        Ok(())
    }
}

#[async_trait]
impl MenuStore for FailingStore {
    async fn find_cursor(&self, id: i32, filter: &MenuFilter) -> Result<Option<MenuCursor>> {
        self.inner.find_cursor(id, filter).await
    }

    async fn find_page(
        &self,
        filter: &MenuFilter,
        start: Option<&MenuCursor>,
        take: u64,
    ) -> Result<Vec<MenuSummary>> {
        self.check(FailOn::Page)?;
        self.inner.find_page(filter, start, take).await
    }

    async fn count(&self, filter: &MenuFilter) -> Result<u64> {
        self.check(FailOn::Count)?;
        self.inner.count(filter).await
    }

    async fn cuisine_facets(&self) -> Result<Vec<CuisineFacet>> {
        self.check(FailOn::Facets)?;
        self.inner.cuisine_facets().await
    }

    async fn dump(&self) -> Result<Vec<MenuDetail>> {
        self.inner.dump().await
    }

    async fn ping(&self) -> bool {
        self.inner.ping().await
    }
}

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryMenuStore>,
    pub state: AppState,
}

impl TestApp {
    /// App with debug endpoints disabled.
    pub fn new(store: Arc<MemoryMenuStore>) -> Self {
        Self::build(store, false)
    }

    /// App with debug endpoints enabled.
    pub fn with_debug(store: Arc<MemoryMenuStore>) -> Self {
        Self::build(store, true)
    }

    /// App whose store fails on `fail_on`.
    pub fn failing(store: Arc<MemoryMenuStore>, fail_on: FailOn) -> Self {
        let state = AppState::build(
            FailingStore::new(store.clone(), fail_on),
            false,
            DEFAULT_LIMIT,
        );
        let router = carte_kernel::routes::app(state.clone());
        Self {
            router,
            store,
            state,
        }
    }

    fn build(store: Arc<MemoryMenuStore>, debug_endpoints: bool) -> Self {
        let state = AppState::build(store.clone(), debug_endpoints, DEFAULT_LIMIT);
        let router = carte_kernel::routes::app(state.clone());
        Self {
            router,
            store,
            state,
        }
    }

    /// Send a request through the router.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// GET `uri` and return status and body text.
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let response = self
            .request(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await;
        let status = response.status();
        (status, body_string(response).await)
    }

    /// GET `uri`, expect 200 and parse the JSON body.
    pub async fn get_json(&self, uri: &str) -> Value {
        let (status, body) = self.get(uri).await;
        assert_eq!(status, StatusCode::OK, "GET {uri} failed: {body}");
        serde_json::from_str(&body).expect("response is JSON")
    }
}

/// Read a response body as a string.
pub async fn body_string(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body is UTF-8")
}
