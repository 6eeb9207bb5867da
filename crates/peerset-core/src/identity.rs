//! Peer identity — the 32-byte id a peer is known by, and its base58 form.
//!
//! Registries key peers on the base58 rendering of this id unless the host
//! supplies its own key derivation.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use thiserror::Error;

/// Length of a peer id in bytes.
pub const PEER_ID_LEN: usize = 32;

/// A peer's network identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId([u8; PEER_ID_LEN]);

impl PeerId {
    pub const fn from_bytes(bytes: [u8; PEER_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Generate a random id. Not tied to any keypair.
    pub fn random() -> Self {
        let mut bytes = [0u8; PEER_ID_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PEER_ID_LEN] {
        &self.0
    }

    /// Render as a base58 string (Bitcoin alphabet).
    pub fn to_base58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }

    /// Parse a base58 string produced by [`PeerId::to_base58`].
    pub fn from_base58(s: &str) -> Result<Self, PeerIdError> {
        let decoded = bs58::decode(s).into_vec()?;
        let bytes: [u8; PEER_ID_LEN] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| PeerIdError::InvalidLength(decoded.len()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl FromStr for PeerId {
    type Err = PeerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl From<[u8; PEER_ID_LEN]> for PeerId {
    fn from(bytes: [u8; PEER_ID_LEN]) -> Self {
        Self(bytes)
    }
}

#[derive(Debug, Error)]
pub enum PeerIdError {
    #[error("invalid base58 peer id: {0}")]
    InvalidBase58(#[from] bs58::decode::Error),
    #[error("peer id must be {} bytes, got {0}", PEER_ID_LEN)]
    InvalidLength(usize),
}

// ── Identified ────────────────────────────────────────────────────────────────

/// A record that carries a [`PeerId`].
///
/// Implement this for host peer types to get the default base58 keying.
pub trait Identified {
    fn peer_id(&self) -> &PeerId;
}

impl Identified for PeerId {
    fn peer_id(&self) -> &PeerId {
        self
    }
}

impl<T: Identified + ?Sized> Identified for &T {
    fn peer_id(&self) -> &PeerId {
        (**self).peer_id()
    }
}

/// Default key derivation: the record's peer id as base58.
pub fn default_peer_to_id<P: Identified + ?Sized>(peer: &P) -> String {
    peer.peer_id().to_base58()
}
