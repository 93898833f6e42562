use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Token identifier Tronscan uses for native TRX on the transfer endpoint
pub const NATIVE_TOKEN_ID: &str = "_";

/// One page of a paginated Tronscan listing
#[derive(Debug, Clone, Deserialize)]
pub struct PageResult<T> {
    /// `data` on transfer/event/token endpoints, `trc20_tokens` on the bulk TRC20 listing
    #[serde(alias = "trc20_tokens")]
    pub data: Vec<T>,
    /// Number of items the server reports for the page's underlying query
    pub total: u64,
    /// Grand total of the result set at call time
    #[serde(rename = "rangeTotal", default)]
    pub range_total: Option<u64>,
}

impl<T> PageResult<T> {
    /// Grand total used for consistency checks; older endpoints only send `total`
    pub fn grand_total(&self) -> u64 {
        self.range_total.unwrap_or(self.total)
    }

    /// Number of items this page must contain when requested at `offset` with `limit`
    pub fn expected_len(&self, offset: u64, limit: u64) -> u64 {
        self.grand_total().saturating_sub(offset).min(limit)
    }
}

/// TRX or TRC10 transfer from `api/transfer`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trc10Transfer {
    pub transaction_hash: String,
    pub timestamp: u64,
    pub block: u64,
    pub transfer_from_address: String,
    pub transfer_to_address: String,
    #[serde(deserialize_with = "amount_string")]
    pub amount: String,
    /// `"_"` for TRX, otherwise the TRC10 token id
    pub token_name: String,
}

impl Trc10Transfer {
    pub fn is_native(&self) -> bool {
        self.token_name == NATIVE_TOKEN_ID
    }
}

/// TRC20 transfer event from `api/contract/events`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trc20Event {
    pub transaction_hash: String,
    pub timestamp: u64,
    pub block: u64,
    pub transfer_from_address: String,
    pub transfer_to_address: String,
    #[serde(deserialize_with = "amount_string")]
    pub amount: String,
    pub contract_address: String,
    #[serde(default)]
    pub decimals: Option<u32>,
}

/// TRC10 token entry from `api/token?id=..`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trc10TokenInfo {
    #[serde(default)]
    pub abbr: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub precision: u32,
}

/// TRC20 token entry from the bulk `api/token_trc20` listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trc20TokenInfo {
    pub contract_address: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub decimals: u32,
}

/// Tronscan sends amounts either as strings or as plain JSON numbers
fn amount_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) if n.is_u64() => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected an unsigned integer amount, got {}",
            other
        ))),
    }
}
