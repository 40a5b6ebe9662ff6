// File: src/header_codec.rs
// Serializes stored headers back into the 80-byte wire format

use byteorder::{LittleEndian, WriteBytesExt};

use crate::data_models::{BlockHeader, HexHash};
use crate::error::QueryError;

pub const HEADER_LEN: usize = 80;

/// Wire encoding of `header`:
/// version | prev hash | merkle root | time | bits | nonce, all little-endian.
pub fn encode_block_header(header: &BlockHeader) -> Result<[u8; HEADER_LEN], QueryError> {
    let bits = u32::from_str_radix(&header.bits, 16).map_err(|_| {
        QueryError::Corrupt(format!(
            "bits {:?} of block {} is not a compact target",
            header.bits, header.hash
        ))
    })?;
    let prev_hash = match &header.previousblockhash {
        Some(hash) => internal_order(hash)?,
        None => [0u8; 32],
    };
    let merkle_root = internal_order(&header.merkleroot)?;

    let mut buf = Vec::with_capacity(HEADER_LEN);
    let io = |err: std::io::Error| QueryError::Corrupt(err.to_string());
    buf.write_i32::<LittleEndian>(header.version).map_err(io)?;
    buf.extend_from_slice(&prev_hash);
    buf.extend_from_slice(&merkle_root);
    buf.write_u32::<LittleEndian>(header.time).map_err(io)?;
    buf.write_u32::<LittleEndian>(bits).map_err(io)?;
    buf.write_u32::<LittleEndian>(header.nonce).map_err(io)?;

    buf.try_into()
        .map_err(|_| QueryError::Corrupt(format!("header of block {} has wrong length", header.hash)))
}

pub fn encode_block_header_hex(header: &BlockHeader) -> Result<String, QueryError> {
    Ok(hex::encode(encode_block_header(header)?))
}

/// Display hashes are byte-reversed relative to the wire
fn internal_order(hash: &HexHash) -> Result<[u8; 32], QueryError> {
    let mut bytes = hash
        .to_bytes()
        .map_err(|err| QueryError::Corrupt(format!("hash {hash}: {err}")))?;
    bytes.reverse();
    Ok(bytes)
}
