use crate::amount::{canonical_amount, insert_decimal_point};
use crate::error::{HistoryError, Result};
use crate::metadata::{TokenMetadata, TokenMetadataResolver};
use crate::pagination::RecordProcessor;
use async_trait::async_trait;
use serde::Serialize;
use tronscan_client::{ExplorerApi, Trc10Transfer, Trc20Event};

/// One output row: a transfer with resolved token labels and a human-readable amount.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedRecord {
    pub transaction_hash: String,
    pub timestamp: u64,
    pub block: u64,
    pub from: String,
    pub to: String,
    pub amount: String,
    pub token_id: String,
    pub token_symbol: String,
    pub token_name: String,
    #[serde(skip)]
    pub decimals: u32,
}

struct TransferFields {
    transaction_hash: String,
    timestamp: u64,
    block: u64,
    from: String,
    to: String,
    raw_amount: String,
}

impl TransferFields {
    fn enrich(self, token_id: String, symbol: String, name: String, decimals: u32) -> Result<EnrichedRecord> {
        if canonical_amount(&self.raw_amount).is_none() {
            return Err(HistoryError::InvalidAmount {
                amount: self.raw_amount,
                transaction_hash: self.transaction_hash,
            });
        }

        Ok(EnrichedRecord {
            transaction_hash: self.transaction_hash,
            timestamp: self.timestamp,
            block: self.block,
            from: self.from,
            to: self.to,
            amount: insert_decimal_point(&self.raw_amount, decimals),
            token_id,
            token_symbol: symbol,
            token_name: name,
            decimals,
        })
    }
}

/// Attach TRX or TRC10 metadata to a transfer from the transfer endpoint
pub fn normalize_trc10(transfer: Trc10Transfer, metadata: &TokenMetadata) -> Result<EnrichedRecord> {
    let fields = TransferFields {
        transaction_hash: transfer.transaction_hash,
        timestamp: transfer.timestamp,
        block: transfer.block,
        from: transfer.transfer_from_address,
        to: transfer.transfer_to_address,
        raw_amount: transfer.amount,
    };
    fields.enrich(
        transfer.token_name,
        metadata.symbol.clone(),
        metadata.name.clone(),
        metadata.precision,
    )
}

/// Attach TRC20 metadata to a contract event.
///
/// TRC20 rows use the contract address as the full name. Unknown contracts get an
/// empty symbol and fall back to the event's own `decimals`, then to zero.
pub fn normalize_trc20(event: Trc20Event, metadata: Option<&TokenMetadata>) -> Result<EnrichedRecord> {
    let symbol = metadata.map(|m| m.symbol.clone()).unwrap_or_default();
    let decimals = metadata
        .map(|m| m.precision)
        .or(event.decimals)
        .unwrap_or(0);

    let fields = TransferFields {
        transaction_hash: event.transaction_hash,
        timestamp: event.timestamp,
        block: event.block,
        from: event.transfer_from_address,
        to: event.transfer_to_address,
        raw_amount: event.amount,
    };
    let token_id = event.contract_address;
    fields.enrich(token_id.clone(), symbol, token_id, decimals)
}

/// Normalizes the TRX/TRC10 stream, resolving TRC10 metadata on demand
pub struct Trc10Normalizer<'r, 'a, A: ?Sized> {
    resolver: &'r mut TokenMetadataResolver<'a, A>,
}

impl<'r, 'a, A: ?Sized> Trc10Normalizer<'r, 'a, A> {
    pub fn new(resolver: &'r mut TokenMetadataResolver<'a, A>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl<'r, 'a, A: ExplorerApi + ?Sized> RecordProcessor<Trc10Transfer> for Trc10Normalizer<'r, 'a, A> {
    type Output = EnrichedRecord;

    async fn process(&mut self, transfer: Trc10Transfer) -> Result<EnrichedRecord> {
        let metadata = if transfer.is_native() {
            TokenMetadata::native()
        } else {
            self.resolver.resolve_trc10(&transfer.token_name).await?
        };
        normalize_trc10(transfer, &metadata)
    }
}

/// Normalizes the TRC20 stream against the prefetched token listing
pub struct Trc20Normalizer<'r, 'a, A: ?Sized> {
    resolver: &'r TokenMetadataResolver<'a, A>,
}

impl<'r, 'a, A: ?Sized> Trc20Normalizer<'r, 'a, A> {
    pub fn new(resolver: &'r TokenMetadataResolver<'a, A>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl<'r, 'a, A: ExplorerApi + ?Sized> RecordProcessor<Trc20Event> for Trc20Normalizer<'r, 'a, A> {
    type Output = EnrichedRecord;

    async fn process(&mut self, event: Trc20Event) -> Result<EnrichedRecord> {
        let metadata = self.resolver.trc20(&event.contract_address);
        normalize_trc20(event, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trc10(token: &str, amount: &str) -> Trc10Transfer {
        Trc10Transfer {
            transaction_hash: "tx10".to_string(),
            timestamp: 250,
            block: 12,
            transfer_from_address: "TFrom".to_string(),
            transfer_to_address: "TTo".to_string(),
            amount: amount.to_string(),
            token_name: token.to_string(),
        }
    }

    fn trc20(contract: &str, amount: &str, decimals: Option<u32>) -> Trc20Event {
        Trc20Event {
            transaction_hash: "tx20".to_string(),
            timestamp: 280,
            block: 13,
            transfer_from_address: "TFrom".to_string(),
            transfer_to_address: "TTo".to_string(),
            amount: amount.to_string(),
            contract_address: contract.to_string(),
            decimals,
        }
    }

    #[test]
    fn test_native_transfer() {
        let record = normalize_trc10(trc10("_", "1500000"), &TokenMetadata::native()).unwrap();
        assert_eq!(record.amount, "1.500000");
        assert_eq!(record.token_id, "_");
        assert_eq!(record.token_symbol, "TRX");
        assert_eq!(record.token_name, "Tronix");
    }

    #[test]
    fn test_trc10_transfer() {
        let metadata = TokenMetadata {
            id: "1000001".to_string(),
            symbol: "ABC".to_string(),
            name: "TokenA".to_string(),
            precision: 6,
        };
        let record = normalize_trc10(trc10("1000001", "5000000"), &metadata).unwrap();
        assert_eq!(record.amount, "5.000000");
        assert_eq!(record.token_symbol, "ABC");
        assert_eq!(record.token_name, "TokenA");
        assert_eq!(record.decimals, 6);
    }

    #[test]
    fn test_trc20_known_contract() {
        let metadata = TokenMetadata {
            id: "Contract1".to_string(),
            symbol: "XYZ".to_string(),
            name: "Xyz Token".to_string(),
            precision: 2,
        };
        let record = normalize_trc20(trc20("Contract1", "100", Some(18)), Some(&metadata)).unwrap();
        assert_eq!(record.amount, "1.00");
        assert_eq!(record.token_symbol, "XYZ");
        assert_eq!(record.token_name, "Contract1");
    }

    #[test]
    fn test_trc20_unknown_contract() {
        let record = normalize_trc20(trc20("ContractX", "100", None), None).unwrap();
        assert_eq!(record.amount, "100");
        assert_eq!(record.token_symbol, "");
        assert_eq!(record.token_name, "ContractX");

        let record = normalize_trc20(trc20("ContractX", "100", Some(3)), None).unwrap();
        assert_eq!(record.amount, "0.100");
    }

    #[test]
    fn test_raw_digits_kept_verbatim() {
        let record = normalize_trc20(trc20("ContractX", "0100", None), None).unwrap();
        assert_eq!(record.amount, "0100");

        let record = normalize_trc20(trc20("ContractX", "0100", Some(2)), None).unwrap();
        assert_eq!(record.amount, "01.00");
    }

    #[test]
    fn test_invalid_amount_is_rejected() {
        let err = normalize_trc10(trc10("_", "12.5"), &TokenMetadata::native()).unwrap_err();
        assert!(matches!(err, HistoryError::InvalidAmount { ref transaction_hash, .. } if transaction_hash == "tx10"));
    }
}
