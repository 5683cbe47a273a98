//! Prometheus metrics collection.
//!
//! Provides application metrics in Prometheus format.

use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

/// HTTP request labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabels {
    pub method: String,
    pub path: String,
    pub status: u16,
}

/// Listing labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ListingLabels {
    /// "true" when a cuisine filter was applied.
    pub filtered: String,
}

/// Application metrics.
pub struct Metrics {
    registry: Registry,

    /// HTTP request counter by method/path/status.
    pub http_requests: Family<HttpLabels, Counter>,

    /// HTTP request duration histogram.
    pub http_duration_seconds: Family<HttpLabels, Histogram>,

    /// Menu listing duration, split by whether a cuisine filter was applied.
    pub listing_duration_seconds: Family<ListingLabels, Histogram>,

    /// Menus returned by the listing.
    pub listing_menus_returned: Counter,

    /// Active HTTP connections gauge.
    pub active_connections: Gauge,
}

impl Metrics {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let http_requests = Family::<HttpLabels, Counter>::default();
        // The encoder appends `_total` to counters.
        registry.register(
            "http_requests",
            "Total HTTP requests",
            http_requests.clone(),
        );

        let http_duration_seconds = Family::<HttpLabels, Histogram>::new_with_constructor(|| {
            Histogram::new(exponential_buckets(0.001, 2.0, 12))
        });
        registry.register(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
            http_duration_seconds.clone(),
        );

        let listing_duration_seconds =
            Family::<ListingLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.0005, 2.0, 14))
            });
        registry.register(
            "menu_listing_duration_seconds",
            "Menu listing duration in seconds",
            listing_duration_seconds.clone(),
        );

        let listing_menus_returned = Counter::default();
        registry.register(
            "menu_listing_returned",
            "Menus returned by the listing",
            listing_menus_returned.clone(),
        );

        let active_connections = Gauge::default();
        registry.register(
            "http_active_connections",
            "Active HTTP connections",
            active_connections.clone(),
        );

        Self {
            registry,
            http_requests,
            http_duration_seconds,
            listing_duration_seconds,
            listing_menus_returned,
            active_connections,
        }
    }

    /// Record an HTTP request.
    ///
    /// `route` must be a route template, never a raw request path.
    pub fn record_request(&self, method: &str, route: &str, status: u16, duration_secs: f64) {
        let labels = HttpLabels {
            method: method.to_string(),
            path: route.to_string(),
            status,
        };

        self.http_requests.get_or_create(&labels).inc();
        self.http_duration_seconds
            .get_or_create(&labels)
            .observe(duration_secs);
    }

    /// Record a completed menu listing.
    pub fn record_listing(&self, filtered: bool, returned: usize, duration_secs: f64) {
        let labels = ListingLabels {
            filtered: filtered.to_string(),
        };

        self.listing_duration_seconds
            .get_or_create(&labels)
            .observe(duration_secs);
        self.listing_menus_returned.inc_by(returned as u64);
    }

    /// Increment active connections.
    pub fn connection_start(&self) {
        self.active_connections.inc();
    }

    /// Decrement active connections.
    pub fn connection_end(&self) {
        self.active_connections.dec();
    }

    /// Encode metrics in Prometheus text format.
    ///
    /// # Panics
    ///
    /// Panics if Prometheus metric encoding to a `String` buffer fails.
    /// The `fmt::Write` impl for `String` is infallible.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        // Prometheus encoding to String buffer is infallible
        #[allow(clippy::expect_used)]
        encode(&mut buffer, &self.registry).expect("encoding metrics");
        buffer
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish()
    }
}
