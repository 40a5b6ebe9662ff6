// File: src/rpc_handler.rs
// RPC method implementations over an injected, borrowed data store

use serde_json::Value;

use crate::data_models::{
    BlockVerboseResult, HeaderResult, HexHash, NetworkInfo, RawTransactionResult, TxOutResult,
};
use crate::data_store::DataStore;
use crate::error::QueryError;
use crate::header_codec::encode_block_header_hex;

/// Answers chain queries from a loaded dataset.
///
/// Holds only a borrow of the store; results borrow from it too and are
/// serialized by the caller.
#[derive(Debug, Clone, Copy)]
pub struct RequestHandler<'a> {
    store: &'a DataStore,
}

impl<'a> RequestHandler<'a> {
    pub fn new(store: &'a DataStore) -> Self {
        Self { store }
    }

    /// Echo the optional argument back; a bare ping yields null
    pub fn ping(&self, echo: Option<Value>) -> Value {
        echo.unwrap_or(Value::Null)
    }

    pub fn get_best_block_hash(&self) -> Result<&'a HexHash, QueryError> {
        self.store.best_block_hash()
    }

    /// Always the verbose shape. Size fields cannot be derived from the
    /// dataset and stay zero.
    pub fn get_block(&self, hash: &HexHash, verbosity: u8) -> Result<BlockVerboseResult<'a>, QueryError> {
        let block = self.store.block_by_hash(hash, verbosity)?;
        let header = block.header;
        Ok(BlockVerboseResult {
            hash: &header.hash,
            confirmations: header.confirmations,
            strippedsize: 0,
            size: 0,
            weight: 0,
            height: header.height,
            version: header.version,
            version_hex: &header.version_hex,
            merkleroot: &header.merkleroot,
            tx: block.transactions.into_iter().map(|tx| tx.hex.as_str()).collect(),
            time: header.time,
            mediantime: header.mediantime,
            nonce: header.nonce,
            bits: &header.bits,
            difficulty: header.difficulty,
            chainwork: &header.chainwork,
            n_tx: header.n_tx,
            previousblockhash: header.previousblockhash.as_ref(),
            nextblockhash: header.nextblockhash.as_ref(),
        })
    }

    pub fn get_block_count(&self) -> Result<i64, QueryError> {
        self.store.block_count()
    }

    pub fn get_block_hash(&self, height: i64) -> Result<&'a HexHash, QueryError> {
        self.store.header_by_height(height).map(|header| &header.hash)
    }

    pub fn get_block_header(&self, hash: &HexHash, verbose: bool) -> Result<HeaderResult<'a>, QueryError> {
        let header = self.store.header_by_hash(hash)?;
        if verbose {
            Ok(HeaderResult::Verbose(header))
        } else {
            encode_block_header_hex(header).map(HeaderResult::Serialized)
        }
    }

    /// `bestblock` is empty and `coinbase` is always true: the dataset has
    /// no live tip and its inputs cannot tell coinbase from spends.
    pub fn get_tx_out(
        &self,
        txid: &HexHash,
        index: u32,
        include_mempool: bool,
    ) -> Result<TxOutResult<'a>, QueryError> {
        let (tx, vout) = self.store.transaction_output(txid, index, include_mempool)?;
        Ok(TxOutResult {
            bestblock: "",
            confirmations: tx.confirmations,
            value: vout.value,
            script_pub_key: &vout.script_pub_key,
            coinbase: true,
        })
    }

    pub fn get_raw_transaction(
        &self,
        txid: &HexHash,
        verbose: bool,
        block_hash: Option<&HexHash>,
    ) -> Result<RawTransactionResult<'a>, QueryError> {
        let tx = self.store.raw_transaction(txid, block_hash)?;
        if verbose {
            Ok(RawTransactionResult::Verbose(tx))
        } else {
            Ok(RawTransactionResult::Hex(&tx.hex))
        }
    }

    pub fn get_network_info(&self) -> &'a NetworkInfo {
        self.store.network_info()
    }

    /// Present only so client protocol detection succeeds
    pub fn get_info(&self) {}
}
