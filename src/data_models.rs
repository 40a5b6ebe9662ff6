// File: src/data_models.rs
// Dataset records and the result shapes shared by the handler and the server

use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub dataset_path: PathBuf,
    pub bind: IpAddr,
    pub port: u16,
    pub enable_cors: bool,
    pub watch_dataset: bool,
}

/// Rejected hash text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hash {0:?}: expected 64 hexadecimal characters")]
pub struct HashParseError(pub String);

/// A 32-byte digest in the node's display hex form.
///
/// The original text is kept as-is so records round-trip unchanged; only
/// `index_key` normalizes case for lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexHash(String);

impl HexHash {
    pub fn parse(text: &str) -> Result<Self, HashParseError> {
        let mut buf = [0u8; 32];
        if text.len() != 64 || hex::decode_to_slice(text, &mut buf).is_err() {
            return Err(HashParseError(text.to_string()));
        }
        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase form used as the key in every hash index
    pub fn index_key(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// Bytes in display order (most significant first)
    pub fn to_bytes(&self) -> Result<[u8; 32], hex::FromHexError> {
        let mut buf = [0u8; 32];
        hex::decode_to_slice(&self.0, &mut buf)?;
        Ok(buf)
    }
}

impl TryFrom<String> for HexHash {
    type Error = HashParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexHash> for String {
    fn from(hash: HexHash) -> Self {
        hash.0
    }
}

impl fmt::Display for HexHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One block's metadata as captured from a real node's `getblockheader`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub hash: HexHash,
    pub confirmations: u32,
    pub height: i64,
    pub version: i32,
    #[serde(rename = "versionHex")]
    pub version_hex: String,
    pub merkleroot: HexHash,
    pub time: u32,
    pub mediantime: u32,
    pub nonce: u32,
    pub bits: String,
    pub difficulty: f64,
    pub chainwork: HexHash,
    #[serde(rename = "nTx")]
    pub n_tx: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previousblockhash: Option<HexHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nextblockhash: Option<HexHash>,
}

/// Locking script of an output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptPubKeyResult {
    pub asm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    pub hex: String,
    #[serde(rename = "type")]
    pub script_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<String>>,
}

/// Transaction input. Only the coinbase shape exists in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vin {
    pub coinbase: String,
    pub sequence: u32,
}

/// Transaction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vout {
    pub value: f64,
    pub n: u32,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKeyResult,
}

/// One transaction as captured from a real node's verbose `getrawtransaction`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub txid: HexHash,
    pub hash: HexHash,
    pub version: i32,
    pub size: u32,
    pub vsize: u32,
    pub weight: u32,
    pub locktime: u32,
    pub vin: Vec<Vin>,
    pub vout: Vec<Vout>,
    pub hex: String,
    pub blockhash: HexHash,
    pub confirmations: u32,
    pub time: u64,
    pub blocktime: u64,
}

/// Reachability of one network type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworksResult {
    pub name: String,
    pub limited: bool,
    pub reachable: bool,
    pub proxy: String,
    pub proxy_randomize_credentials: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalAddressesResult {
    pub address: String,
    pub port: u16,
    pub score: i32,
}

/// Static descriptor of the simulated node, returned verbatim by `getnetworkinfo`.
///
/// Optional fields are only written back when the dataset had them, and keys
/// this struct does not name are carried in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub version: i32,
    pub subversion: String,
    pub protocolversion: i32,
    pub localservices: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localservicesnames: Option<Vec<String>>,
    pub localrelay: bool,
    pub timeoffset: i64,
    pub connections: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections_in: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections_out: Option<i32>,
    pub networkactive: bool,
    pub networks: Vec<NetworksResult>,
    pub relayfee: f64,
    pub incrementalfee: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localaddresses: Option<Vec<LocalAddressesResult>>,
    /// A string before Bitcoin Core 28, a list of strings since
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub warnings: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Top-level shape of a dataset file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataContent {
    pub block_headers: Vec<BlockHeader>,
    pub transactions: Vec<Transaction>,
    pub networkinfo: NetworkInfo,
}

/// `getblock` result. Header fields are borrowed from the store.
#[derive(Debug, Serialize)]
pub struct BlockVerboseResult<'a> {
    pub hash: &'a HexHash,
    pub confirmations: u32,
    pub strippedsize: u32,
    pub size: u32,
    pub weight: u32,
    pub height: i64,
    pub version: i32,
    #[serde(rename = "versionHex")]
    pub version_hex: &'a str,
    pub merkleroot: &'a HexHash,
    pub tx: Vec<&'a str>,
    pub time: u32,
    pub mediantime: u32,
    pub nonce: u32,
    pub bits: &'a str,
    pub difficulty: f64,
    pub chainwork: &'a HexHash,
    #[serde(rename = "nTx")]
    pub n_tx: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previousblockhash: Option<&'a HexHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nextblockhash: Option<&'a HexHash>,
}

/// `gettxout` result
#[derive(Debug, Serialize)]
pub struct TxOutResult<'a> {
    pub bestblock: &'static str,
    pub confirmations: u32,
    pub value: f64,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: &'a ScriptPubKeyResult,
    pub coinbase: bool,
}

/// `getblockheader` result for either verbosity
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HeaderResult<'a> {
    Verbose(&'a BlockHeader),
    Serialized(String),
}

/// `getrawtransaction` result for either verbosity
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RawTransactionResult<'a> {
    Verbose(&'a Transaction),
    Hex(&'a str),
}
