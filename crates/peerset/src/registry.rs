//! Peer registry — a bounded, keyed set of peer records.
//!
//! Records are stored under a key derived by the `peer_to_id` function.
//! When a limit is set the set never grows past it: incoming peers either
//! evict a nominated replacement candidate or are dropped.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;

use peerset_core::{default_peer_to_id, Identified, RegistryConfig};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::events::{EventEmitter, EventKind, ListenerId, PeerEvent};

/// Key derivation: record → registry key.
pub type PeerToId<P> = Box<dyn Fn(&P) -> String>;

/// Bounded set of peers keyed by derived id.
///
/// Single-threaded. Listeners run inside the mutating call and only see the
/// event, so they cannot reach back into the set. Re-entering through a
/// `RefCell` from a listener panics on the second borrow.
pub struct PeerSet<P> {
    peers: HashMap<String, P>,
    limit: Option<usize>,
    peer_to_id: PeerToId<P>,
    events: EventEmitter<P>,
}

impl<P: Identified + 'static> PeerSet<P> {
    /// Create a set keyed on the base58 peer id.
    pub fn new(peers: impl IntoIterator<Item = P>, limit: Option<usize>) -> Self {
        Self::with_key_fn(peers, limit, default_peer_to_id::<P>)
    }

    pub fn from_config(peers: impl IntoIterator<Item = P>, config: &RegistryConfig) -> Self {
        Self::new(peers, config.effective_limit())
    }
}

impl<P: Identified + 'static> Default for PeerSet<P> {
    fn default() -> Self {
        Self::new(Vec::new(), None)
    }
}

impl<P> PeerSet<P> {
    /// Create a set with a caller-supplied key derivation.
    ///
    /// `limit` of `Some(0)` is treated as unbounded. Initial peers past the
    /// limit are dropped.
    pub fn with_key_fn<F>(
        peers: impl IntoIterator<Item = P>,
        limit: Option<usize>,
        peer_to_id: F,
    ) -> Self
    where
        F: Fn(&P) -> String + 'static,
    {
        let mut set = Self {
            peers: HashMap::new(),
            limit: limit.filter(|&n| n > 0),
            peer_to_id: Box::new(peer_to_id),
            events: EventEmitter::new(),
        };
        set.add(peers);
        tracing::trace!(size = set.len(), limit = ?set.limit, "peer set created");
        set
    }

    // ── Mutation ─────────────────────────────────────────────────────────────

    /// Add peers with no replacement candidates.
    pub fn add(&mut self, peers: impl IntoIterator<Item = P>) {
        self.add_replacing(peers, std::iter::empty::<P>());
    }

    /// Add peers, evicting candidates from `replaceable` (front first) while
    /// the set is full.
    ///
    /// Each evicted candidate emits `Remove` with its key, whether or not it
    /// was stored. Each admitted peer then emits `Add` or `Update`. Once the
    /// candidates run out, further peers are dropped silently. A peer with a
    /// new key is also dropped when its candidate was not stored, since
    /// nothing was freed. Older peer-set implementations inserted it anyway
    /// and let the set grow past its limit; this one keeps the limit.
    pub fn add_replacing<I, R>(&mut self, peers: I, replaceable: R)
    where
        I: IntoIterator<Item = P>,
        R: IntoIterator,
        R::Item: std::borrow::Borrow<P>,
    {
        let mut replaceable = replaceable.into_iter();
        for peer in peers {
            let key = (self.peer_to_id)(&peer);

            if self.is_full() {
                let Some(candidate) = replaceable.next() else {
                    tracing::debug!(peer = %key, limit = ?self.limit, "peer set full, dropping peer");
                    continue;
                };
                let candidate = <R::Item as std::borrow::Borrow<P>>::borrow(&candidate);
                let evicted = (self.peer_to_id)(candidate);
                let freed = self.peers.remove(&evicted).is_some();
                tracing::debug!(peer = %key, evicted = %evicted, freed, "replacing peer");
                self.events.emit(&PeerEvent::Remove(&evicted));

                if !freed && !self.peers.contains_key(&key) {
                    tracing::debug!(peer = %key, "replacement candidate not stored, dropping peer");
                    continue;
                }
            }

            self.insert(key, peer);
        }
    }

    /// Remove the record stored under `peer`'s key.
    ///
    /// `Remove` is emitted even if nothing was stored under the key.
    pub fn remove(&mut self, peer: &P) -> Option<P> {
        let key = (self.peer_to_id)(peer);
        let removed = self.peers.remove(&key);
        if removed.is_some() {
            tracing::trace!(peer = %key, "peer removed");
        }
        self.events.emit(&PeerEvent::Remove(&key));
        removed
    }

    fn insert(&mut self, key: String, peer: P) {
        match self.peers.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.insert(peer);
                tracing::trace!(peer = %slot.key(), "peer updated");
                self.events.emit(&PeerEvent::Update(slot.get()));
            }
            Entry::Vacant(slot) => {
                tracing::trace!(peer = %slot.key(), "peer added");
                let stored: &P = slot.insert(peer);
                self.events.emit(&PeerEvent::Add(stored));
            }
        }
    }

    fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.peers.len() >= limit)
    }

    // ── Lookup ───────────────────────────────────────────────────────────────

    pub fn get(&self, peer: &P) -> Option<&P> {
        self.peers.get(&(self.peer_to_id)(peer))
    }

    pub fn get_by_key(&self, key: &str) -> Option<&P> {
        self.peers.get(key)
    }

    pub fn contains(&self, peer: &P) -> bool {
        self.peers.contains_key(&(self.peer_to_id)(peer))
    }

    /// All stored records, in no particular order.
    pub fn get_all(&self) -> Vec<&P> {
        self.peers.values().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &P> + '_ {
        self.peers.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.peers.keys().map(String::as_str)
    }

    pub fn for_each(&self, visit: impl FnMut(&P)) {
        self.peers.values().for_each(visit);
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// The key this set derives for `peer`.
    pub fn peer_to_id(&self, peer: &P) -> String {
        (self.peer_to_id)(peer)
    }

    // ── Sampling ─────────────────────────────────────────────────────────────

    /// Up to `limit` distinct peers chosen uniformly at random.
    pub fn sample(&self, limit: usize) -> Vec<&P> {
        self.sample_with(&mut rand::thread_rng(), limit, &[])
    }

    /// Like [`PeerSet::sample`], never returning a peer whose key matches
    /// one in `exclude`.
    pub fn sample_excluding(&self, limit: usize, exclude: &[P]) -> Vec<&P> {
        self.sample_with(&mut rand::thread_rng(), limit, exclude)
    }

    /// Sample with a caller-supplied RNG.
    ///
    /// Candidates are ordered by key before drawing, so a seeded RNG gives
    /// a reproducible result for the same contents.
    pub fn sample_with<R>(&self, rng: &mut R, limit: usize, exclude: &[P]) -> Vec<&P>
    where
        R: Rng + ?Sized,
    {
        if limit == 0 {
            return Vec::new();
        }
        let excluded: HashSet<String> = exclude.iter().map(|p| (self.peer_to_id)(p)).collect();
        let mut candidates: Vec<(&String, &P)> = self
            .peers
            .iter()
            .filter(|(key, _)| !excluded.contains(key.as_str()))
            .collect();
        if candidates.is_empty() {
            return Vec::new();
        }
        candidates.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let count = limit.min(candidates.len());
        candidates
            .choose_multiple(rng, count)
            .map(|(_, peer)| *peer)
            .collect()
    }

    // ── Events ───────────────────────────────────────────────────────────────

    /// Register a listener for every event of `kind`.
    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&PeerEvent<'_, P>) + 'static,
    {
        self.events.subscribe(kind, false, Box::new(listener))
    }

    /// Register a listener for the next event of `kind` only.
    pub fn once<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&PeerEvent<'_, P>) + 'static,
    {
        self.events.subscribe(kind, true, Box::new(listener))
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.events.listener_count(kind)
    }
}

impl<P: fmt::Debug> fmt::Debug for PeerSet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerSet")
            .field("peers", &self.peers)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}
