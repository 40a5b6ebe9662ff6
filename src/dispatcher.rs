// File: src/dispatcher.rs
// Method registry and positional parameter decoding for the RPC surface

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::data_models::HexHash;
use crate::data_store::DataStore;
use crate::error::{QueryError, RpcError, codes};
use crate::rpc_handler::RequestHandler;

/// Namespace prefix of the internal method names, e.g. `MockServerHandler.GetBlockCount`
pub const NAMESPACE: &str = "MockServerHandler";

/// Recognized for compatibility but answered with "Command unimplemented"
const UNIMPLEMENTED_METHODS: &[&str] = &[
    "getheaders",
    "getblockchaininfo",
    "getblockfilter",
    "getblockstats",
];

/// Every operation the node can answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Ping,
    GetBestBlockHash,
    GetBlock,
    GetBlockCount,
    GetBlockHash,
    GetBlockHeader,
    GetTxOut,
    GetRawTransaction,
    GetNetworkInfo,
    GetInfo,
    Unimplemented(&'static str),
}

impl Method {
    pub const ALL: [Method; 10] = [
        Method::Ping,
        Method::GetBestBlockHash,
        Method::GetBlock,
        Method::GetBlockCount,
        Method::GetBlockHash,
        Method::GetBlockHeader,
        Method::GetTxOut,
        Method::GetRawTransaction,
        Method::GetNetworkInfo,
        Method::GetInfo,
    ];

    /// Lowercase command name used by Bitcoin clients
    pub fn wire_name(self) -> &'static str {
        match self {
            Method::Ping => "ping",
            Method::GetBestBlockHash => "getbestblockhash",
            Method::GetBlock => "getblock",
            Method::GetBlockCount => "getblockcount",
            Method::GetBlockHash => "getblockhash",
            Method::GetBlockHeader => "getblockheader",
            Method::GetTxOut => "gettxout",
            Method::GetRawTransaction => "getrawtransaction",
            Method::GetNetworkInfo => "getnetworkinfo",
            Method::GetInfo => "getinfo",
            Method::Unimplemented(name) => name,
        }
    }

    /// Capitalized name registered under `NAMESPACE`
    pub fn internal_name(self) -> &'static str {
        match self {
            Method::Ping => "Ping",
            Method::GetBestBlockHash => "GetBestBlockHash",
            Method::GetBlock => "GetBlock",
            Method::GetBlockCount => "GetBlockCount",
            Method::GetBlockHash => "GetBlockHash",
            Method::GetBlockHeader => "GetBlockHeader",
            Method::GetTxOut => "GetTxOut",
            Method::GetRawTransaction => "GetRawTransaction",
            Method::GetNetworkInfo => "GetNetworkInfo",
            Method::GetInfo => "GetInfo",
            Method::Unimplemented(name) => name,
        }
    }
}

/// Name to method map, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct MethodRegistry {
    methods: HashMap<String, Method>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        let mut methods = HashMap::new();
        for method in Method::ALL {
            methods.insert(method.wire_name().to_string(), method);
            methods.insert(format!("{NAMESPACE}.{}", method.internal_name()), method);
        }
        for &name in UNIMPLEMENTED_METHODS {
            methods.insert(name.to_string(), Method::Unimplemented(name));
        }
        Self { methods }
    }

    pub fn resolve(&self, name: &str) -> Option<Method> {
        self.methods.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Look up `name` and run it against `store`
    pub fn dispatch(&self, store: &DataStore, name: &str, params: &[Value]) -> Result<Value, RpcError> {
        let method = self.resolve(name).ok_or_else(RpcError::method_not_found)?;
        trace!(method = method.wire_name(), params = params.len(), "dispatching");
        call(method, RequestHandler::new(store), params)
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn call(method: Method, handler: RequestHandler<'_>, params: &[Value]) -> Result<Value, RpcError> {
    let name = method.wire_name();
    match method {
        Method::Ping => {
            expect_params(name, params, 0, 1)?;
            Ok(handler.ping(optional(params, 0).cloned()))
        }
        Method::GetBestBlockHash => {
            expect_params(name, params, 0, 0)?;
            to_value(handler.get_best_block_hash()?)
        }
        Method::GetBlock => {
            expect_params(name, params, 1, 2)?;
            let hash = parse_hash(&params[0])?;
            let verbosity = optional(params, 1).map(parse_verbosity).transpose()?.unwrap_or(1);
            to_value(handler.get_block(&hash, verbosity)?)
        }
        Method::GetBlockCount => {
            expect_params(name, params, 0, 0)?;
            to_value(handler.get_block_count()?)
        }
        Method::GetBlockHash => {
            expect_params(name, params, 1, 1)?;
            let height = parse_height(&params[0])?;
            to_value(handler.get_block_hash(height)?)
        }
        Method::GetBlockHeader => {
            expect_params(name, params, 1, 2)?;
            let hash = parse_hash(&params[0])?;
            let verbose = optional(params, 1).map(parse_bool).transpose()?.unwrap_or(true);
            to_value(handler.get_block_header(&hash, verbose)?)
        }
        Method::GetTxOut => {
            expect_params(name, params, 2, 3)?;
            let txid = parse_hash(&params[0])?;
            let index = parse_u32(&params[1], "vout")?;
            let include_mempool = optional(params, 2).map(parse_bool).transpose()?.unwrap_or(true);
            to_value(handler.get_tx_out(&txid, index, include_mempool)?)
        }
        Method::GetRawTransaction => {
            expect_params(name, params, 1, 3)?;
            let txid = parse_hash(&params[0])?;
            let verbose = optional(params, 1)
                .map(parse_verbose_flag)
                .transpose()?
                .unwrap_or(false);
            let block_hash = optional(params, 2).map(parse_hash).transpose()?;
            to_value(handler.get_raw_transaction(&txid, verbose, block_hash.as_ref())?)
        }
        Method::GetNetworkInfo => {
            expect_params(name, params, 0, 0)?;
            to_value(handler.get_network_info())
        }
        Method::GetInfo => {
            handler.get_info();
            Ok(Value::Null)
        }
        Method::Unimplemented(name) => Err(QueryError::Unsupported(name).into()),
    }
}

fn to_value<T: Serialize>(result: T) -> Result<Value, RpcError> {
    serde_json::to_value(result).map_err(|err| RpcError::new(codes::INTERNAL_ERROR, err.to_string()))
}

/// Positional parameter, treating an explicit null as absent
fn optional(params: &[Value], index: usize) -> Option<&Value> {
    params.get(index).filter(|value| !value.is_null())
}

fn expect_params(method: &str, params: &[Value], min: usize, max: usize) -> Result<(), RpcError> {
    if (min..=max).contains(&params.len()) {
        return Ok(());
    }
    let expected = if min == max {
        format!("{min}")
    } else {
        format!("{min} to {max}")
    };
    Err(RpcError::invalid_params(format!(
        "wrong number of params for {method} (expected {expected}, received {})",
        params.len()
    )))
}

fn parse_hash(value: &Value) -> Result<HexHash, RpcError> {
    let text = value
        .as_str()
        .ok_or_else(|| RpcError::invalid_params("hash must be a string"))?;
    HexHash::parse(text).map_err(|_| QueryError::DecodeHex(text.to_string()).into())
}

fn parse_height(value: &Value) -> Result<i64, RpcError> {
    if let Some(height) = value.as_i64() {
        return Ok(height);
    }
    if let Some(text) = value.as_str() {
        if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
            return text
                .parse::<i64>()
                .map_err(|_| RpcError::invalid_params("invalid height"));
        }
    }
    Err(RpcError::invalid_params("height must be numeric"))
}

fn parse_u32(value: &Value, label: &str) -> Result<u32, RpcError> {
    if let Some(num) = value.as_u64() {
        return u32::try_from(num)
            .map_err(|_| RpcError::invalid_params(format!("{label} out of range")));
    }
    Err(RpcError::invalid_params(format!("{label} must be a non-negative integer")))
}

fn parse_bool(value: &Value) -> Result<bool, RpcError> {
    value
        .as_bool()
        .ok_or_else(|| RpcError::invalid_params("boolean expected"))
}

fn parse_verbose_flag(value: &Value) -> Result<bool, RpcError> {
    if let Some(flag) = value.as_bool() {
        return Ok(flag);
    }
    if let Some(flag) = value.as_i64() {
        return Ok(flag != 0);
    }
    Err(RpcError::invalid_params("verbose flag must be boolean or numeric"))
}

fn parse_verbosity(value: &Value) -> Result<u8, RpcError> {
    if let Some(flag) = value.as_bool() {
        return Ok(u8::from(flag));
    }
    match value.as_i64() {
        Some(verbosity @ 0..=2) => Ok(verbosity as u8),
        Some(_) => Err(RpcError::new(
            codes::INVALID_PARAMETER,
            "verbosity must be 0, 1, or 2",
        )),
        None => Err(RpcError::invalid_params("verbosity must be numeric")),
    }
}
