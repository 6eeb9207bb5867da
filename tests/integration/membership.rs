use crate::*;

fn key(p: &Named) -> String {
    p.id.clone()
}

/// Bootstrap with Alice and Bob, look one up, remove it.
#[test]
fn test_bootstrap_get_remove() {
    let alice = named("Alice");
    let bob = named("Bob");
    let mut set = named_set(vec![alice.clone(), bob.clone()], None);
    assert_eq!(set.len(), 2);
    assert_eq!(set.get(&alice), Some(&alice));
    assert_eq!(set.get(&bob), Some(&bob));

    let log = watch(&mut set, key);
    set.remove(&alice);

    assert_eq!(*log.borrow(), vec!["remove:Alice"]);
    assert_eq!(set.len(), 1);
    assert_eq!(set.get(&alice), None);
}

/// Limit 1 holding Alice; adding Bob with Alice as candidate swaps them.
#[test]
fn test_replace_single_slot() {
    let mut set = named_set(vec![named("Alice")], Some(1));
    let log = watch(&mut set, key);

    set.add_replacing(vec![named("Bob")], vec![named("Alice")]);

    assert_eq!(*log.borrow(), vec!["remove:Alice", "add:Bob"]);
    assert_eq!(set.get_all(), vec![&named("Bob")]);
}

/// A full set of ten, half replaced by sampled candidates.
#[test]
fn test_replace_sampled_half() {
    let mut set = named_set(named_many("id_a_", 10), Some(10));
    assert_eq!(set.len(), 10);

    let sampled: Vec<Named> = set.sample(5).into_iter().cloned().collect();
    assert_eq!(sampled.len(), 5);

    set.add_replacing(named_many("id_b_", 5), sampled);
    assert_eq!(set.len(), 10);

    let mut old = 0;
    let mut fresh = 0;
    set.for_each(|p| {
        if set.peer_to_id(p).starts_with("id_a_") {
            old += 1;
        } else {
            fresh += 1;
        }
    });
    assert_eq!(old, 5);
    assert_eq!(fresh, 5);
}

/// Over-limit adds with no candidates change nothing and say nothing.
#[test]
fn test_exhausted_replacement_is_silent() {
    let mut set = named_set(named_many("keep_", 4), Some(4));
    let log = watch(&mut set, key);

    set.add(named_many("extra_", 4));
    set.add_replacing(named_many("more_", 2), Vec::<Named>::new());

    assert_eq!(set.len(), 4);
    assert!(log.borrow().is_empty());
}

/// The limit holds no matter how adds and replacements interleave.
#[test]
fn test_limit_invariant_under_churn() {
    let mut set = named_set(Vec::new(), Some(6));
    for round in 0..25 {
        let batch = named_many(&format!("r{round}_"), round % 5 + 1);
        let candidates: Vec<Named> = set.sample(round % 4).into_iter().cloned().collect();
        set.add_replacing(batch, candidates);
        assert!(set.len() <= 6, "round {round}: size {}", set.len());

        if round % 7 == 0 {
            let victim = set.sample(1).first().map(|p| (*p).clone());
            if let Some(victim) = victim {
                set.remove(&victim);
            }
        }
    }
}

/// Re-adding a known key updates in place with the new record.
#[test]
fn test_update_replaces_record() {
    let mut peer = HostPeer::new("10.0.0.1:4001");
    let mut set = PeerSet::new(vec![peer.clone()], None);
    let log = watch(&mut set, |p: &HostPeer| p.id.to_base58());

    peer.connected = true;
    set.add(vec![peer.clone()]);

    assert_eq!(*log.borrow(), vec![format!("update:{}", peer.id)]);
    assert_eq!(set.len(), 1);
    assert!(set.get(&peer).is_some_and(|p| p.connected));
}

/// Default keying: every stored record sits under its base58 id.
#[test]
fn test_default_keys_are_base58() {
    let peers: Vec<HostPeer> = (0..10)
        .map(|i| HostPeer::new(&format!("10.0.0.{i}:4001")))
        .collect();
    let set = PeerSet::new(peers.clone(), None);

    for peer in &peers {
        let key = peer.id.to_base58();
        assert_eq!(set.get_by_key(&key), Some(peer));
        assert_eq!(set.peer_to_id(peer), key);
    }
    for key in set.keys() {
        assert_eq!(set.get_by_key(key).map(|p| p.id.to_base58()).as_deref(), Some(key));
    }
}

/// A one-shot listener sees only the first matching event.
#[test]
fn test_once_remove_listener() {
    let alice = named("Alice");
    let mut set = named_set(vec![alice.clone(), named("Bob")], Some(2));
    let removed: EventLog = Rc::new(RefCell::new(Vec::new()));
    let sink = removed.clone();
    set.once(EventKind::Remove, move |event: &PeerEvent<'_, Named>| {
        if let PeerEvent::Remove(key) = event {
            sink.borrow_mut().push(key.to_string());
        }
    });

    set.add_replacing(vec![named("Carol")], vec![alice]);
    set.remove(&named("Bob"));

    assert_eq!(*removed.borrow(), vec!["Alice"]);
    assert_eq!(set.listener_count(EventKind::Remove), 0);
}
