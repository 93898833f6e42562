use crate::error::{HistoryError, Result};
use crate::pagination::{Paginator, Passthrough};
use std::collections::HashMap;
use tracing::{debug, info};
use tronscan_client::{
    ExplorerApi, PageResult, Trc10TokenInfo, Trc20TokenInfo, NATIVE_TOKEN_ID,
};

/// Display metadata for a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub id: String,
    pub symbol: String,
    pub name: String,
    /// Number of implied fractional digits in raw amounts
    pub precision: u32,
}

impl TokenMetadata {
    /// TRX, the network's native unit (1 TRX = 1_000_000 sun)
    pub fn native() -> Self {
        Self {
            id: NATIVE_TOKEN_ID.to_string(),
            symbol: "TRX".to_string(),
            name: "Tronix".to_string(),
            precision: 6,
        }
    }

    fn from_trc10(id: &str, info: Trc10TokenInfo) -> Self {
        Self {
            id: id.to_string(),
            symbol: info.abbr,
            name: info.name,
            precision: info.precision,
        }
    }

    fn from_trc20(info: Trc20TokenInfo) -> Self {
        Self {
            id: info.contract_address,
            symbol: info.symbol,
            name: info.name,
            precision: info.decimals,
        }
    }
}

/// Endpoint paths the resolver queries
#[derive(Debug, Clone)]
pub struct TokenEndpoints {
    pub trc10_token_path: String,
    pub trc20_tokens_path: String,
}

/// Resolves token metadata for one export run.
///
/// TRC10 tokens are looked up one id at a time and memoized; TRC20 tokens are
/// listed in bulk once. Entries are never replaced once stored.
pub struct TokenMetadataResolver<'a, A: ?Sized> {
    api: &'a A,
    paginator: Paginator<'a, A>,
    endpoints: TokenEndpoints,
    trc10: HashMap<String, TokenMetadata>,
    trc20: Option<HashMap<String, TokenMetadata>>,
}

impl<'a, A: ExplorerApi + ?Sized> TokenMetadataResolver<'a, A> {
    pub fn new(api: &'a A, paginator: Paginator<'a, A>, endpoints: TokenEndpoints) -> Self {
        Self {
            api,
            paginator,
            endpoints,
            trc10: HashMap::new(),
            trc20: None,
        }
    }

    /// Metadata for a TRC10 token id, querying the explorer only on the first request per id
    pub async fn resolve_trc10(&mut self, token_id: &str) -> Result<TokenMetadata> {
        if let Some(metadata) = self.trc10.get(token_id) {
            return Ok(metadata.clone());
        }

        debug!("Fetching TRC10 token metadata for: {}", token_id);
        let path = self.endpoints.trc10_token_path.as_str();
        let body = self
            .api
            .get_json(
                path,
                &[("id", token_id.to_string()), ("showAll", "1".to_string())],
            )
            .await?;
        let page: PageResult<Trc10TokenInfo> =
            serde_json::from_value(body).map_err(|source| HistoryError::Decode {
                endpoint: path.to_string(),
                source,
            })?;

        let info = page
            .data
            .into_iter()
            .next()
            .ok_or_else(|| HistoryError::MetadataNotFound {
                token_id: token_id.to_string(),
            })?;

        let metadata = TokenMetadata::from_trc10(token_id, info);
        self.trc10.insert(token_id.to_string(), metadata.clone());
        Ok(metadata)
    }

    /// Download the full TRC20 token listing; later calls reuse the first result
    pub async fn prefetch_trc20(&mut self) -> Result<usize> {
        if let Some(tokens) = &self.trc20 {
            return Ok(tokens.len());
        }

        info!("Downloading TRC20 token list...");
        let listing = self
            .paginator
            .fetch_all::<Trc20TokenInfo, _>(
                &self.endpoints.trc20_tokens_path,
                &[("showAll", "1".to_string())],
                &mut Passthrough,
            )
            .await?;

        let mut tokens = HashMap::with_capacity(listing.len());
        for info in listing {
            tokens
                .entry(info.contract_address.clone())
                .or_insert_with(|| TokenMetadata::from_trc20(info));
        }
        info!("Loaded metadata for {} TRC20 tokens", tokens.len());

        let count = tokens.len();
        self.trc20 = Some(tokens);
        Ok(count)
    }

    /// Prefetched TRC20 metadata; `None` when the contract is unknown or nothing was prefetched
    pub fn trc20(&self, contract_address: &str) -> Option<&TokenMetadata> {
        self.trc20.as_ref()?.get(contract_address)
    }

    pub fn cached_trc10_count(&self) -> usize {
        self.trc10.len()
    }
}
