use crate::error::{HistoryError, Result};
use crate::merger::ChronologicalMerge;
use crate::metadata::{TokenEndpoints, TokenMetadataResolver};
use crate::normalizer::{EnrichedRecord, Trc10Normalizer, Trc20Normalizer};
use crate::pagination::Paginator;
use config_manager::{ExplorerConfig, SystemConfig};
use std::io;
use tracing::info;
use tronscan_client::{ExplorerApi, Trc10Transfer, Trc20Event};

/// Wire shape of a transfer stream, which decides how its records are normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// `api/transfer`: TRX and TRC10 transfers
    TrxAndTrc10,
    /// `api/contract/events`: TRC20 transfers
    Trc20,
}

/// One transfer stream to download and merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferClass {
    pub label: String,
    pub endpoint: String,
    pub kind: TransferKind,
}

impl TransferClass {
    pub fn new(label: impl Into<String>, endpoint: impl Into<String>, kind: TransferKind) -> Self {
        Self {
            label: label.into(),
            endpoint: endpoint.into(),
            kind,
        }
    }

    /// TRX/TRC10 transfers followed by TRC20 transfers
    pub fn defaults(explorer: &ExplorerConfig) -> Vec<TransferClass> {
        vec![
            Self::new("TRX/TRC10", &explorer.transfers_path, TransferKind::TrxAndTrc10),
            Self::new("TRC20", &explorer.contract_events_path, TransferKind::Trc20),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Records downloaded per transfer class, in class order
    pub downloaded: Vec<(String, usize)>,
    pub rows_written: usize,
}

/// Reject obviously malformed account addresses before any request is made
pub fn validate_address(address: &str) -> Result<()> {
    if address.is_empty() || address.chars().any(char::is_whitespace) {
        return Err(HistoryError::InvalidAddress(address.to_string()));
    }
    Ok(())
}

/// Downloads, enriches, merges and writes the transfer history of one account
pub struct HistoryExporter<'a, A: ?Sized> {
    api: &'a A,
    config: &'a SystemConfig,
    classes: Vec<TransferClass>,
}

impl<'a, A: ExplorerApi + ?Sized> HistoryExporter<'a, A> {
    pub fn new(api: &'a A, config: &'a SystemConfig) -> Self {
        Self {
            api,
            config,
            classes: TransferClass::defaults(&config.explorer),
        }
    }

    pub fn with_classes(mut self, classes: Vec<TransferClass>) -> Self {
        self.classes = classes;
        self
    }

    fn paginator(&self) -> Paginator<'a, A> {
        Paginator::from_config(self.api, &self.config.pagination)
    }

    /// Download and normalize every class; each returned list is newest-first
    pub async fn download(&self, address: &str) -> Result<Vec<(String, Vec<EnrichedRecord>)>> {
        validate_address(address)?;

        let mut resolver = TokenMetadataResolver::new(
            self.api,
            self.paginator(),
            TokenEndpoints {
                trc10_token_path: self.config.explorer.trc10_token_path.clone(),
                trc20_tokens_path: self.config.explorer.trc20_tokens_path.clone(),
            },
        );
        let paginator = self.paginator();
        let params = [("address", address.to_string())];

        let mut record_sets = Vec::with_capacity(self.classes.len());
        for class in &self.classes {
            info!("Downloading {} transfers...", class.label);
            let records = match class.kind {
                TransferKind::TrxAndTrc10 => {
                    let mut normalizer = Trc10Normalizer::new(&mut resolver);
                    paginator
                        .fetch_all::<Trc10Transfer, _>(&class.endpoint, &params, &mut normalizer)
                        .await?
                }
                TransferKind::Trc20 => {
                    resolver.prefetch_trc20().await?;
                    let mut normalizer = Trc20Normalizer::new(&resolver);
                    paginator
                        .fetch_all::<Trc20Event, _>(&class.endpoint, &params, &mut normalizer)
                        .await?
                }
            };
            info!("📊 {} {} transfers downloaded", records.len(), class.label);
            record_sets.push((class.label.clone(), records));
        }

        Ok(record_sets)
    }

    /// Download everything, then stream the merged history into `writer` row by row
    pub async fn export<W: io::Write>(
        &self,
        address: &str,
        writer: &mut csv::Writer<W>,
    ) -> Result<ExportSummary> {
        let record_sets = self.download(address).await?;

        let mut summary = ExportSummary {
            downloaded: record_sets
                .iter()
                .map(|(label, records)| (label.clone(), records.len()))
                .collect(),
            rows_written: 0,
        };

        let merged = ChronologicalMerge::new(record_sets.into_iter().map(|(_, records)| records));
        info!("Writing {} records...", merged.len());
        for record in merged {
            writer.serialize(&record)?;
            summary.rows_written += 1;
        }
        writer.flush()?;

        Ok(summary)
    }
}
