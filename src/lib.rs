// File: src/lib.rs
// Stand-in Bitcoin node answering chain queries from a pre-captured dataset

pub mod data_models;
pub mod data_store;
pub mod dispatcher;
pub mod error;
pub mod header_codec;
pub mod rpc_handler;
pub mod web_server;

pub use data_models::{AppConfig, DataContent, HexHash};
pub use data_store::DataStore;
pub use dispatcher::{Method, MethodRegistry};
pub use error::{ErrorKind, QueryError, RpcError};
pub use rpc_handler::RequestHandler;
