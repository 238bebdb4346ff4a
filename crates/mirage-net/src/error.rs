use thiserror::Error;

/// Errors surfaced by a transport when sending requests.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("no server connection")]
    NotConnected,

    #[error("send failed: {0}")]
    SendFailed(String),
}
