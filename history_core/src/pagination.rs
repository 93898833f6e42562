use crate::error::{HistoryError, Result};
use async_trait::async_trait;
use config_manager::PaginationConfig;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use tronscan_client::{ExplorerApi, PageResult};

/// Per-item hook run on every record of a page as it is downloaded
#[async_trait]
pub trait RecordProcessor<T>: Send {
    type Output: Send;

    async fn process(&mut self, item: T) -> Result<Self::Output>;
}

/// Keeps items exactly as decoded
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

#[async_trait]
impl<T: Send + 'static> RecordProcessor<T> for Passthrough {
    type Output = T;

    async fn process(&mut self, item: T) -> Result<T> {
        Ok(item)
    }
}

/// Bounds on consistency retries. `None` retries until the dataset stabilizes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RetryLimits {
    pub max_page_retries: Option<u32>,
    pub max_pass_restarts: Option<u32>,
}

impl From<&PaginationConfig> for RetryLimits {
    fn from(config: &PaginationConfig) -> Self {
        Self {
            max_page_retries: config.max_page_retries,
            max_pass_restarts: config.max_pass_restarts,
        }
    }
}

/// Downloads complete offset-paginated result sets from the explorer.
///
/// A pass is only accepted when every page reported the grand total seen on the
/// first page and the accumulated record count equals that total. Anything else
/// means the dataset moved underneath us and the pass is started over.
pub struct Paginator<'a, A: ?Sized> {
    api: &'a A,
    page_size: u32,
    limits: RetryLimits,
}

impl<'a, A: ExplorerApi + ?Sized> Paginator<'a, A> {
    pub fn new(api: &'a A, page_size: u32, limits: RetryLimits) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
            limits,
        }
    }

    pub fn from_config(api: &'a A, config: &PaginationConfig) -> Self {
        Self::new(api, config.page_size, RetryLimits::from(config))
    }

    /// Fetch every item at `endpoint`, running `processor` over each one in server order
    pub async fn fetch_all<T, P>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        processor: &mut P,
    ) -> Result<Vec<P::Output>>
    where
        T: DeserializeOwned + Send + 'static,
        P: RecordProcessor<T>,
    {
        let limit = u64::from(self.page_size);
        let mut restarts = 0u32;

        'pass: loop {
            let mut records = Vec::new();
            let mut offset = 0u64;

            let mut page: PageResult<T> = self.fetch_page(endpoint, params, offset).await?;
            let total = page.grand_total();

            loop {
                if page.grand_total() != total {
                    info!(
                        "Total number of records at {} has changed ({} -> {}), starting again",
                        endpoint,
                        total,
                        page.grand_total()
                    );
                    restarts = self.register_restart(endpoint, restarts)?;
                    continue 'pass;
                }

                let page_len = page.data.len() as u64;
                for item in page.data {
                    records.push(processor.process(item).await?);
                }
                info!("Downloaded {}/{}", records.len(), total);

                offset += limit;
                if page_len < limit {
                    break;
                }
                page = self.fetch_page(endpoint, params, offset).await?;
            }

            // Unreachable while fetch_page enforces per-page lengths; kept as a guard
            if records.len() as u64 != total {
                info!(
                    "Downloaded {} records from {} but the total is {}, starting again",
                    records.len(),
                    endpoint,
                    total
                );
                restarts = self.register_restart(endpoint, restarts)?;
                continue 'pass;
            }

            return Ok(records);
        }
    }

    /// Request one page, re-issuing the identical call until the page agrees with its own totals
    async fn fetch_page<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        offset: u64,
    ) -> Result<PageResult<T>> {
        let limit = u64::from(self.page_size);
        let mut query: Vec<(&str, String)> = params.to_vec();
        query.push(("limit", limit.to_string()));
        query.push(("start", offset.to_string()));

        let mut retries = 0u32;
        loop {
            let body = self.api.get_json(endpoint, &query).await?;
            let page: PageResult<T> =
                serde_json::from_value(body).map_err(|source| HistoryError::Decode {
                    endpoint: endpoint.to_string(),
                    source,
                })?;

            let expected = page.expected_len(offset, limit);
            if page.data.len() as u64 == expected {
                return Ok(page);
            }

            debug!(
                "Page at {} offset {} returned {} items, expected {}",
                endpoint,
                offset,
                page.data.len(),
                expected
            );

            retries += 1;
            if let Some(max) = self.limits.max_page_retries {
                if retries > max {
                    return Err(HistoryError::DatasetUnstable {
                        endpoint: endpoint.to_string(),
                        attempts: retries,
                    });
                }
            }
            warn!(
                "⚠️ Inconsistent page at {} offset {}, retrying (attempt {})",
                endpoint,
                offset,
                retries + 1
            );
        }
    }

    fn register_restart(&self, endpoint: &str, restarts: u32) -> Result<u32> {
        let restarts = restarts + 1;
        match self.limits.max_pass_restarts {
            Some(max) if restarts > max => Err(HistoryError::DatasetUnstable {
                endpoint: endpoint.to_string(),
                attempts: restarts,
            }),
            _ => Ok(restarts),
        }
    }
}
