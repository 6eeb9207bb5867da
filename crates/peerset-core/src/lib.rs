//! peerset-core — peer identity and configuration shared by the registry
//! and its tooling.

pub mod config;
pub mod identity;

pub use config::{ConfigError, PeerSetConfig, RegistryConfig, SamplingConfig};
pub use identity::{default_peer_to_id, Identified, PeerId, PeerIdError};
