#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

/// Mainnet block hashes for heights 0..=10
pub const MAINNET_HASHES: [&str; 11] = [
    "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f",
    "00000000839a8e6886ab5951d76f411475428afc90947ee320161bbf18eb6048",
    "000000006a625f06636b8bb6ac7b960a8d03705d1ace08b1a19da3fdcc99ddbd",
    "0000000082b5015589a3fdf2d4baff403e6f0be035a5d9742c1cae6295464449",
    "000000004ebadb55ee9096c9a2f8880e09da59c0d68b1c228da88e48844a1485",
    "000000009b7262315dbf071787ad3656097b892abffd1f95a1a022f896f533fc",
    "000000003031a0e73735690c5a1ff2a4be82553b2a12b776fbd3a215dc8f778d",
    "0000000071966c2b1d065fd446b1e485b2c9d9594acd2007ccbd5441cfc89444",
    "00000000408c48f847aa786c2268fc3e6ec2af68e8468a34a28c61b7f1de0dc6",
    "000000008d9dc510f23c2657fc4f67bea30078cc05a90eb89e84cc475c080805",
    "000000002c05cc2e78923c34df87fd108b22221ac6076c18f3ade378a4d915e9",
];

pub const BLOCK1_COINBASE: &str = "0e3e2357e806b6cdb1f70b54c3a3a17b6714ee1f0e68bebb44a74b1efd512098";
pub const BLOCK7_COINBASE: &str = "8aa673bc752f2851fd645d6a0a92917e967083007d9c1684f9423b100540673f";
pub const BLOCK7_COINBASE_HEX: &str = "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff0704ffff001d012bffffffff0100f2052a01000000434104a59e64c774923d003fae7491b2a7f75d6b7aa3f35606a8ff1cf06cd3317d16a41aa16928b1df1f631f31f28c7da35d4edad3603adb2338c4d4dd268f31530555ac00000000";

fn synthetic_merkle_root(height: usize) -> String {
    format!("{:064x}", 0x3e00_0000_u64 + height as u64)
}

/// Header in the dataset's shape; heights start at 1 like the captured file
pub fn header(height: usize, tip: usize) -> Value {
    let mut header = json!({
        "hash": MAINNET_HASHES[height],
        "confirmations": 867304 - height,
        "height": height,
        "version": 1,
        "versionHex": "00000001",
        "merkleroot": synthetic_merkle_root(height),
        "time": 1231469665 + 600 * height as u64,
        "mediantime": 1231469665 + 600 * height as u64,
        "nonce": 2573394689_u32,
        "bits": "1d00ffff",
        "difficulty": 1,
        "chainwork": format!("{:064x}", (height as u64 + 1) * 0x100010001),
        "nTx": 1,
        "previousblockhash": MAINNET_HASHES[height - 1]
    });
    if height < tip {
        header["nextblockhash"] = json!(MAINNET_HASHES[height + 1]);
    }
    if height == 7 {
        header["merkleroot"] = json!(BLOCK7_COINBASE);
        header["confirmations"] = json!(867297);
        header["time"] = json!(1231472369);
        header["mediantime"] = json!(1231470988);
        header["nonce"] = json!(2258412857_u32);
    }
    header
}

pub fn block1_coinbase() -> Value {
    json!({
        "txid": BLOCK1_COINBASE,
        "hash": BLOCK1_COINBASE,
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
                "asm": "0496b538e853519c726a2c91e61ec11600ae1390813a627c66fb8be7947be63c52da7589379515d4e0a604f8141781e62294721166bf621e73a82cbf2342c858ee OP_CHECKSIG",
                "hex": "410496b538e853519c726a2c91e61ec11600ae1390813a627c66fb8be7947be63c52da7589379515d4e0a604f8141781e62294721166bf621e73a82cbf2342c858eeac",
                "type": "pubkey"
            }
        }],
        "hex": "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff0704ffff001d0104ffffffff0100f2052a0100000043410496b538e853519c726a2c91e61ec11600ae1390813a627c66fb8be7947be63c52da7589379515d4e0a604f8141781e62294721166bf621e73a82cbf2342c858eeac00000000",
        "blockhash": MAINNET_HASHES[1],
        "confirmations": 867743,
        "time": 1231469665,
        "blocktime": 1231469665
    })
}

pub fn block7_coinbase() -> Value {
    json!({
        "txid": BLOCK7_COINBASE,
        "hash": BLOCK7_COINBASE,
        "version": 1,
        "size": 134,
        "vsize": 134,
        "weight": 536,
        "locktime": 0,
        "vin": [{ "coinbase": "04ffff001d012b", "sequence": 4294967295_u32 }],
        "vout": [{
            "value": 50.0,
            "n": 0,
            "scriptPubKey": {
                "asm": "04a59e64c774923d003fae7491b2a7f75d6b7aa3f35606a8ff1cf06cd3317d16a41aa16928b1df1f631f31f28c7da35d4edad3603adb2338c4d4dd268f31530555 OP_CHECKSIG",
                "desc": "pk(04a59e64c774923d003fae7491b2a7f75d6b7aa3f35606a8ff1cf06cd3317d16a41aa16928b1df1f631f31f28c7da35d4edad3603adb2338c4d4dd268f31530555)#6zy7s9ds",
                "hex": "4104a59e64c774923d003fae7491b2a7f75d6b7aa3f35606a8ff1cf06cd3317d16a41aa16928b1df1f631f31f28c7da35d4edad3603adb2338c4d4dd268f31530555ac",
                "type": "pubkey"
            }
        }],
        "hex": BLOCK7_COINBASE_HEX,
        "blockhash": MAINNET_HASHES[7],
        "confirmations": 867297,
        "time": 1231472369,
        "blocktime": 1231472369
    })
}

pub fn network_info() -> Value {
    let network = |name: &str, reachable: bool| {
        json!({
            "name": name,
            "limited": !reachable,
            "reachable": reachable,
            "proxy": "",
            "proxy_randomize_credentials": false
        })
    };
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
            network("ipv4", true),
            network("ipv6", true),
            network("onion", false),
            network("i2p", false),
            network("cjdns", false)
        ],
        "relayfee": 0.00001,
        "incrementalfee": 0.00001,
        "localaddresses": [],
        "warnings": ""
    })
}

/// Headers 1..=`tip` plus the coinbases of blocks 1 and 7
pub fn dataset(tip: usize) -> Value {
    json!({
        "block_headers": (1..=tip).map(|h| header(h, tip)).collect::<Vec<_>>(),
        "transactions": [block1_coinbase(), block7_coinbase()],
        "networkinfo": network_info()
    })
}

pub fn write_dataset(dir: &Path, dataset: &Value) -> PathBuf {
    let path = dir.join("mainnet_oldest_blocks.json");
    std::fs::write(&path, serde_json::to_vec_pretty(dataset).unwrap()).unwrap();
    path
}
