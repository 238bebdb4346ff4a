//! Mirage Net - Networking boundary for the Mirage client
//!
//! Defines the transport capability consumed by the asset layer and the
//! decoded message types it receives. Wire encoding and socket handling live
//! behind the [`Transport`] trait; everything above it deals only in already
//! decoded events.

mod error;
mod event;
mod transport;

pub use error::NetError;
pub use event::{TransferChunk, TransferEvent, TransferHeader};
pub use transport::Transport;
