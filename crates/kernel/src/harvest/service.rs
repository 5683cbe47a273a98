//! Harvest job: fetch the upstream catalog and write it through a
//! [`CatalogWriter`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::payload::{HarvestRecord, parse_payload};
use super::writer::CatalogWriter;

/// Upstream endpoint serving the set menu catalog.
pub const DEFAULT_SOURCE_URL: &str = "https://staging.yhangry.com/booking/test/set-menus";

/// Request timeout for the upstream fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Harvest settings.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub source_url: String,
    /// Pause between consecutive menu writes.
    pub delay: Duration,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            delay: Duration::from_millis(1000),
        }
    }
}

/// Harvest failures.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("failed to fetch upstream catalog: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("upstream responded with status {0}")]
    UpstreamStatus(u16),

    #[error("invalid upstream payload: {0}")]
    InvalidPayload(String),

    #[error("failed to store harvested menu: {0:#}")]
    Store(#[from] anyhow::Error),
}

/// Outcome of one harvest run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestReport {
    pub menus_created: usize,
    /// Distinct cuisine ids written.
    pub cuisines_upserted: usize,
}

/// Fetches the upstream catalog and writes it menu by menu.
pub struct Harvester {
    client: reqwest::Client,
    writer: Arc<dyn CatalogWriter>,
    config: HarvestConfig,
}

impl Harvester {
    /// Create a harvester writing to `writer`.
    pub fn new(writer: Arc<dyn CatalogWriter>, config: HarvestConfig) -> Result<Self, HarvestError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            writer,
            config,
        })
    }

    /// Fetch, validate and ingest the upstream catalog.
    ///
    /// Nothing is written unless the whole document validates.
    pub async fn run(&self) -> Result<HarvestReport, HarvestError> {
        let body = self.fetch().await?;
        let records = parse_payload(&body)?;
        info!(menus = records.len(), "validated upstream catalog");
        self.ingest(records).await
    }

    /// Download the raw upstream document.
    pub async fn fetch(&self) -> Result<Vec<u8>, HarvestError> {
        debug!(url = %self.config.source_url, "fetching upstream catalog");

        let response = self.client.get(&self.config.source_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "upstream fetch rejected");
            return Err(HarvestError::UpstreamStatus(status.as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Write validated records in order.
    ///
    /// Each menu is created in its own transaction after its cuisines are
    /// upserted. A failure stops the run; menus already written stay.
    pub async fn ingest(&self, records: Vec<HarvestRecord>) -> Result<HarvestReport, HarvestError> {
        let mut report = HarvestReport::default();
        let mut seen_cuisines = HashSet::new();
        let total = records.len();

        for (index, record) in records.into_iter().enumerate() {
            if index > 0 && !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }

            for cuisine in &record.cuisines {
                self.writer.upsert_cuisine(cuisine).await?;
                seen_cuisines.insert(cuisine.id);
            }

            let id = self.writer.create_set_menu(&record.menu).await?;
            report.menus_created += 1;

            info!(
                id,
                name = %record.menu.name,
                progress = %format_args!("{}/{}", index + 1, total),
                "created set menu"
            );
        }

        report.cuisines_upserted = seen_cuisines.len();
        Ok(report)
    }
}
