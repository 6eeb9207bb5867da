//! peerset — a bounded registry of known peers with random sampling and
//! membership change notifications.
//!
//! ```
//! use peerset::{EventKind, PeerEvent, PeerSet};
//! use peerset_core::PeerId;
//!
//! let alice = PeerId::random();
//! let bob = PeerId::random();
//! let mut set = PeerSet::new(vec![alice], Some(1));
//!
//! set.on(EventKind::Remove, |event: &PeerEvent<'_, PeerId>| {
//!     if let PeerEvent::Remove(key) = event {
//!         println!("evicted {key}");
//!     }
//! });
//! set.add_replacing(vec![bob], [alice]);
//!
//! assert_eq!(set.len(), 1);
//! assert!(set.contains(&bob));
//! ```

pub mod events;
mod registry;

pub use events::{EventKind, ListenerId, PeerEvent};
pub use registry::{PeerSet, PeerToId};
