// File: src/data_store.rs
// Dataset loader and the indexed, read-only query surface over it

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::data_models::{BlockHeader, DataContent, HexHash, NetworkInfo, Transaction, Vout};
use crate::error::QueryError;

/// A header together with the transactions the dataset assigns to it
#[derive(Debug)]
pub struct BlockRecord<'a> {
    pub header: &'a BlockHeader,
    pub transactions: Vec<&'a Transaction>,
}

/// Owns every loaded record plus the lookup indices built over them.
///
/// Indices hold positions into `content`, so nothing is duplicated and the
/// store is never mutated once built.
#[derive(Debug)]
pub struct DataStore {
    content: DataContent,
    by_height: HashMap<i64, usize>,
    by_hash: HashMap<String, usize>,
    by_txid: HashMap<String, usize>,
    txs_by_block: HashMap<String, Vec<usize>>,
}

impl DataStore {
    /// Read and index a dataset file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset {}", path.display()))?;
        let store = Self::from_json(&text)
            .with_context(|| format!("failed to load dataset {}", path.display()))?;

        info!(
            path = %path.display(),
            headers = store.header_count(),
            transactions = store.transaction_count(),
            "dataset loaded"
        );
        Ok(store)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let content: DataContent =
            serde_json::from_str(text).context("dataset does not match the expected shape")?;
        Self::from_content(content)
    }

    /// Build indices, rejecting duplicate heights, block hashes and txids
    pub fn from_content(content: DataContent) -> Result<Self> {
        let mut by_height = HashMap::with_capacity(content.block_headers.len());
        let mut by_hash = HashMap::with_capacity(content.block_headers.len());
        for (position, header) in content.block_headers.iter().enumerate() {
            if by_height.insert(header.height, position).is_some() {
                bail!("duplicate block height {}", header.height);
            }
            if by_hash.insert(header.hash.index_key(), position).is_some() {
                bail!("duplicate block hash {}", header.hash);
            }
        }

        let mut by_txid = HashMap::with_capacity(content.transactions.len());
        let mut txs_by_block: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, tx) in content.transactions.iter().enumerate() {
            match by_txid.entry(tx.txid.index_key()) {
                Entry::Occupied(_) => bail!("duplicate transaction id {}", tx.txid),
                Entry::Vacant(slot) => {
                    slot.insert(position);
                }
            }
            let block_key = tx.blockhash.index_key();
            if !by_hash.contains_key(&block_key) {
                debug!(txid = %tx.txid, blockhash = %tx.blockhash, "transaction references a block outside the dataset");
            }
            txs_by_block.entry(block_key).or_default().push(position);
        }

        Ok(Self {
            content,
            by_height,
            by_hash,
            by_txid,
            txs_by_block,
        })
    }

    pub fn header_count(&self) -> usize {
        self.content.block_headers.len()
    }

    pub fn transaction_count(&self) -> usize {
        self.content.transactions.len()
    }

    pub fn headers(&self) -> &[BlockHeader] {
        &self.content.block_headers
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.content.transactions
    }

    /// Header with the greatest height. The first one in dataset order wins
    /// a tie, although `from_content` already rules ties out.
    fn tip(&self) -> Result<&BlockHeader, QueryError> {
        let mut headers = self.content.block_headers.iter();
        let mut best = headers.next().ok_or(QueryError::EmptyDataset)?;
        for header in headers {
            if header.height > best.height {
                best = header;
            }
        }
        Ok(best)
    }

    pub fn best_block_hash(&self) -> Result<&HexHash, QueryError> {
        self.tip().map(|header| &header.hash)
    }

    pub fn block_count(&self) -> Result<i64, QueryError> {
        self.tip().map(|header| header.height)
    }

    pub fn header_by_height(&self, height: i64) -> Result<&BlockHeader, QueryError> {
        self.by_height
            .get(&height)
            .map(|&position| &self.content.block_headers[position])
            .ok_or(QueryError::HeightOutOfRange(height))
    }

    pub fn header_by_hash(&self, hash: &HexHash) -> Result<&BlockHeader, QueryError> {
        self.by_hash
            .get(&hash.index_key())
            .map(|&position| &self.content.block_headers[position])
            .ok_or_else(|| QueryError::BlockNotFound(hash.to_string()))
    }

    /// Transactions whose owning block is `hash`, in dataset order
    pub fn transactions_in_block(&self, hash: &HexHash) -> Vec<&Transaction> {
        self.txs_by_block
            .get(&hash.index_key())
            .map(|positions| {
                positions
                    .iter()
                    .map(|&position| &self.content.transactions[position])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Header plus its transactions. Verbosity only exists for protocol
    /// compatibility; the full record is always returned.
    pub fn block_by_hash(&self, hash: &HexHash, _verbosity: u8) -> Result<BlockRecord<'_>, QueryError> {
        let header = self.header_by_hash(hash)?;
        Ok(BlockRecord {
            header,
            transactions: self.transactions_in_block(&header.hash),
        })
    }

    fn transaction(&self, txid: &HexHash) -> Option<&Transaction> {
        self.by_txid
            .get(&txid.index_key())
            .map(|&position| &self.content.transactions[position])
    }

    /// Output `index` of `txid`. There is no mempool, so `_include_mempool`
    /// changes nothing.
    pub fn transaction_output(
        &self,
        txid: &HexHash,
        index: u32,
        _include_mempool: bool,
    ) -> Result<(&Transaction, &Vout), QueryError> {
        let tx = self
            .transaction(txid)
            .ok_or_else(|| QueryError::NoTxInfo(txid.to_string()))?;
        let vout = tx
            .vout
            .get(index as usize)
            .ok_or_else(|| QueryError::InvalidVout {
                txid: txid.to_string(),
                index,
            })?;
        Ok((tx, vout))
    }

    /// Transaction by id; the block hash hint is accepted but not needed
    /// since every transaction is indexed.
    pub fn raw_transaction(
        &self,
        txid: &HexHash,
        _block_hash_hint: Option<&HexHash>,
    ) -> Result<&Transaction, QueryError> {
        self.transaction(txid)
            .ok_or_else(|| QueryError::TxNotFound(txid.to_string()))
    }

    pub fn network_info(&self) -> &NetworkInfo {
        &self.content.networkinfo
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{Value, json};

    pub fn block_hash(height: i64) -> String {
        format!("{:064x}", 0xb10c_0000_u64 + height as u64)
    }

    pub fn coinbase_txid(height: i64) -> String {
        format!("{:064x}", 0x7a00_0000_u64 + height as u64)
    }

    pub fn coinbase_hex(height: i64) -> String {
        format!("01000000010000{height:02x}ffffffff0100f2052a01000000434104ac00000000")
    }

    pub fn header_json(height: i64, tip: i64) -> Value {
        let mut header = json!({
            "hash": block_hash(height),
            "confirmations": tip - height + 1,
            "height": height,
            "version": 1,
            "versionHex": "00000001",
            "merkleroot": coinbase_txid(height),
            "time": 1231469665 + height * 600,
            "mediantime": 1231469665 + height * 600,
            "nonce": 2258412857_u32 - height as u32,
            "bits": "1d00ffff",
            "difficulty": 1,
            "chainwork": format!("{:064x}", (height + 1) * 0x100010001),
            "nTx": 1
        });
        if height > 1 {
            header["previousblockhash"] = json!(block_hash(height - 1));
        }
        if height < tip {
            header["nextblockhash"] = json!(block_hash(height + 1));
        }
        header
    }

    pub fn coinbase_json(height: i64) -> Value {
        json!({
            "txid": coinbase_txid(height),
            "hash": coinbase_txid(height),
            "version": 1,
            "size": 134,
            "vsize": 134,
            "weight": 536,
            "locktime": 0,
            "vin": [{ "coinbase": "04ffff001d0104", "sequence": 4294967295_u32 }],
            "vout": [{
                "value": 50.0,
                "n": 0,
                "scriptPubKey": {
                    "asm": "0496b538e853519c726a2c91e61ec11600ae1390813a627c66fb8be7947be63c52 OP_CHECKSIG",
                    "desc": "pk(0496b538e853519c726a2c91e61ec11600ae1390813a627c66fb8be7947be63c52)#abcd1234",
                    "hex": "410496b538e853519c726a2c91e61ec11600ae1390813a627c66fb8be7947be63c52ac",
                    "type": "pubkey"
                }
            }],
            "hex": coinbase_hex(height),
            "blockhash": block_hash(height),
            "confirmations": 11 - height,
            "time": 1231469665 + height * 600,
            "blocktime": 1231469665 + height * 600
        })
    }

    pub fn network_info_json() -> Value {
        json!({
            "version": 260000,
            "subversion": "/Satoshi:26.0.0/",
            "protocolversion": 70016,
            "localservices": "0000000000000409",
            "localrelay": true,
            "timeoffset": 0,
            "connections": 10,
            "connections_in": 0,
            "connections_out": 10,
            "networkactive": true,
            "networks": [
                { "name": "ipv4", "limited": false, "reachable": true, "proxy": "", "proxy_randomize_credentials": false },
                { "name": "onion", "limited": true, "reachable": false, "proxy": "", "proxy_randomize_credentials": false }
            ],
            "relayfee": 0.00001,
            "incrementalfee": 0.00001,
            "localaddresses": [],
            "warnings": ""
        })
    }

    /// Headers at heights 1..=10; coinbase transactions for blocks 3 and 7
    pub fn dataset_json() -> Value {
        json!({
            "block_headers": (1..=10).map(|h| header_json(h, 10)).collect::<Vec<_>>(),
            "transactions": [coinbase_json(3), coinbase_json(7)],
            "networkinfo": network_info_json()
        })
    }
}
