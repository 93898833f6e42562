//! Reconstructs the transfer history of a TRON account from Tronscan.
//!
//! Each transfer stream is downloaded with [`Paginator`], enriched with token
//! metadata by the normalizers, and the newest-first streams are combined by
//! [`ChronologicalMerge`] before being written out as CSV.

pub mod amount;
pub mod error;
pub mod merger;
pub mod metadata;
pub mod normalizer;
pub mod pagination;
pub mod pipeline;

pub use amount::{canonical_amount, insert_decimal_point};
pub use error::{HistoryError, Result};
pub use merger::{ChronologicalMerge, Timestamped};
pub use metadata::{TokenEndpoints, TokenMetadata, TokenMetadataResolver};
pub use normalizer::{normalize_trc10, normalize_trc20, EnrichedRecord, Trc10Normalizer, Trc20Normalizer};
pub use pagination::{Paginator, Passthrough, RecordProcessor, RetryLimits};
pub use pipeline::{validate_address, ExportSummary, HistoryExporter, TransferClass, TransferKind};
