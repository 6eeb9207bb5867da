//! peerset integration tests.
//!
//! Exercise the registry through its public API the way a networking host
//! would: host-defined peer records, listeners wired to a shared log, and
//! config-driven limits.
//!
//!   cargo test --test integration

use std::cell::RefCell;
use std::rc::Rc;

use peerset::{EventKind, PeerEvent, PeerSet};
use peerset_core::{Identified, PeerId};

mod config;
mod membership;

// ── Harness ───────────────────────────────────────────────────────────────────

/// A host peer record: identity plus some connection state the registry
/// never looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPeer {
    pub id: PeerId,
    pub addr: String,
    pub connected: bool,
}

impl HostPeer {
    pub fn new(addr: &str) -> Self {
        Self {
            id: PeerId::random(),
            addr: addr.to_string(),
            connected: false,
        }
    }
}

impl Identified for HostPeer {
    fn peer_id(&self) -> &PeerId {
        &self.id
    }
}

/// Test double keyed by a plain name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Named {
    pub id: String,
}

pub fn named(id: &str) -> Named {
    Named { id: id.to_string() }
}

pub fn named_many(prefix: &str, n: usize) -> Vec<Named> {
    (0..n).map(|i| named(&format!("{prefix}{i}"))).collect()
}

pub fn named_set(peers: Vec<Named>, limit: Option<usize>) -> PeerSet<Named> {
    PeerSet::with_key_fn(peers, limit, |p: &Named| p.id.clone())
}

/// Shared log of events as `kind:key` strings, in emission order.
pub type EventLog = Rc<RefCell<Vec<String>>>;

pub fn watch<P: 'static>(set: &mut PeerSet<P>, key_of: fn(&P) -> String) -> EventLog {
    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    for kind in [EventKind::Add, EventKind::Update, EventKind::Remove] {
        let log = log.clone();
        set.on(kind, move |event: &PeerEvent<'_, P>| {
            let entry = match event {
                PeerEvent::Add(p) => format!("add:{}", key_of(p)),
                PeerEvent::Update(p) => format!("update:{}", key_of(p)),
                PeerEvent::Remove(key) => format!("remove:{key}"),
            };
            log.borrow_mut().push(entry);
        });
    }
    log
}
