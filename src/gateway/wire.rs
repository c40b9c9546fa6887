//! JSON bodies of the light-wallet HTTP API.
//!
//! Amounts travel as decimal strings of piconero. Some gateways send
//! integers where others send strings, so numeric fields accept both.
use serde::de;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use super::AmountOutputs;
use super::GatewayError;
use super::GatewayOutput;
use super::UnspentOutputs;
use crate::models::decoy_set::RingMember;
use crate::models::unspent_output::UnspentOutput;
use crate::protocol::amount::Amount;
use crate::protocol::keys::KeyImage;
use crate::protocol::keys::PublicKey;
use crate::protocol::keys::TxHash;

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrU64 {
    String(String),
    Number(u64),
}

fn u64_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrU64::deserialize(deserializer)? {
        StringOrU64::Number(n) => Ok(n),
        StringOrU64::String(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

fn amount_from_string_or_number<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    u64_from_string_or_number(deserializer).map(Amount::from_piconero)
}

/// identifies the calling application to the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct UserAgent<'a> {
    pub app_name: &'a str,
    pub app_version: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub address: &'a str,
    pub view_key: &'a str,
    pub create_account: bool,
    #[serde(flatten)]
    pub user_agent: UserAgent<'a>,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub new_address: bool,
}

#[derive(Debug, Serialize)]
pub struct UnspentOutsRequest<'a> {
    pub address: &'a str,
    pub view_key: &'a str,
    pub amount: &'a str,
    pub mixin: u32,
    pub use_dust: bool,
    pub dust_threshold: String,
    #[serde(flatten)]
    pub user_agent: UserAgent<'a>,
}

#[derive(Debug, Deserialize)]
pub struct WireOutput {
    #[serde(deserialize_with = "amount_from_string_or_number")]
    pub amount: Amount,
    pub public_key: PublicKey,
    pub index: u64,
    #[serde(deserialize_with = "u64_from_string_or_number")]
    pub global_index: u64,
    #[serde(default)]
    pub rct: Option<String>,
    pub tx_hash: TxHash,
    pub tx_pub_key: PublicKey,
    #[serde(default)]
    pub height: u64,
    #[serde(default)]
    pub spend_key_images: Vec<KeyImage>,
}

#[derive(Debug, Deserialize)]
pub struct UnspentOutsResponse {
    #[serde(deserialize_with = "amount_from_string_or_number")]
    pub per_kb_fee: Amount,
    #[serde(default)]
    pub outputs: Vec<WireOutput>,
}

impl From<UnspentOutsResponse> for UnspentOutputs {
    fn from(response: UnspentOutsResponse) -> Self {
        Self {
            per_kb_fee: response.per_kb_fee,
            outputs: response
                .outputs
                .into_iter()
                .map(|o| GatewayOutput {
                    output: UnspentOutput {
                        tx_hash: o.tx_hash,
                        tx_pub_key: o.tx_pub_key,
                        index: o.index,
                        global_index: o.global_index,
                        amount: o.amount,
                        public_key: o.public_key,
                        // some gateways send an empty string for pre-RingCT outputs
                        rct: o.rct.filter(|r| !r.is_empty()),
                        height: o.height,
                    },
                    spend_key_images: o.spend_key_images,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RandomOutsRequest<'a> {
    pub amounts: &'a [String],
    pub count: u32,
    #[serde(flatten)]
    pub user_agent: UserAgent<'a>,
}

#[derive(Debug, Deserialize)]
pub struct WireRingMember {
    #[serde(deserialize_with = "u64_from_string_or_number")]
    pub global_index: u64,
    pub public_key: PublicKey,
    #[serde(default)]
    pub rct: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireAmountOutputs {
    pub amount: StringOrNumberAmount,
    #[serde(default)]
    pub outputs: Vec<WireRingMember>,
}

/// amount key echoed back by `get_random_outs`, kept in its string form.
#[derive(Debug)]
pub struct StringOrNumberAmount(pub String);

impl<'de> Deserialize<'de> for StringOrNumberAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Self(match StringOrU64::deserialize(deserializer)? {
            StringOrU64::String(s) => s,
            StringOrU64::Number(n) => n.to_string(),
        }))
    }
}

#[derive(Debug, Deserialize)]
pub struct RandomOutsResponse {
    #[serde(default)]
    pub amount_outs: Vec<WireAmountOutputs>,
}

impl From<RandomOutsResponse> for Vec<AmountOutputs> {
    fn from(response: RandomOutsResponse) -> Self {
        response
            .amount_outs
            .into_iter()
            .map(|entry| AmountOutputs {
                amount: entry.amount.0,
                outputs: entry
                    .outputs
                    .into_iter()
                    .map(|m| RingMember {
                        global_index: m.global_index,
                        public_key: m.public_key,
                        rct: m.rct.filter(|r| !r.is_empty()),
                    })
                    .collect(),
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitRawTxRequest<'a> {
    pub address: &'a str,
    pub view_key: &'a str,
    pub tx: &'a str,
    #[serde(flatten)]
    pub user_agent: UserAgent<'a>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRawTxResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "Error", alias = "reason")]
    pub error: Option<String>,
}

/// error body returned alongside a non-success HTTP status.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default, alias = "Error", alias = "reason", alias = "message")]
    pub error: Option<String>,
}

/// decode `body` as `T`, mapping failures to [GatewayError::Decode].
pub fn decode<T: for<'de> Deserialize<'de>>(endpoint: &str, body: &str) -> Result<T, GatewayError> {
    serde_json::from_str(body).map_err(|e| GatewayError::Decode(format!("{endpoint}: {e}")))
}
