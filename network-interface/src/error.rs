use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("no connected peers")]
    NoConnectedPeers,

    #[error("peer {0} did not respond")]
    NoResponse(crate::peer::PeerId),

    #[error("peer RPC failed: {0}")]
    Rpc(String),
}
