//! PairBet server - HTTP endpoints for two-party wager rooms
//!
//! Wraps [`pairbet_core::RoomService`] with JSON endpoints, plus the two outside
//! collaborators the wallets rely on: a Bitcoin node for broadcasting the joint
//! transaction and an IPFS node for message persistence.

pub mod api;
pub mod config;
pub mod error;
pub mod ipfs;
pub mod rpc;

pub use api::{router, AppState};
pub use config::ServerConfig;
pub use error::{ApiError, ConfigError};
pub use ipfs::{IpfsClient, MessageStore};
pub use rpc::{BitcoinRpc, TransactionBroadcaster};
