use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(#[from] kyc_store_lmdb::LmdbError),

    #[error("RPC server error: {0}")]
    Rpc(#[from] kyc_rpc::RpcError),

    #[error("node is already serving")]
    AlreadyServing,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
