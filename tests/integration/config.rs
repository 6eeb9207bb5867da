use anyhow::Result;
use peerset_core::PeerSetConfig;

use crate::*;

/// A config file limit bounds a set built from it.
#[test]
fn test_config_limit_bounds_set() -> Result<()> {
    let config = PeerSetConfig::parse("[registry]\nlimit = 3\n\n[sampling]\nfanout = 2\n")?;
    let peers: Vec<HostPeer> = (0..8)
        .map(|i| HostPeer::new(&format!("10.2.0.{i}:4001")))
        .collect();

    let set = PeerSet::from_config(peers, &config.registry);

    assert_eq!(set.limit(), Some(3));
    assert_eq!(set.len(), 3);
    assert_eq!(set.sample(config.sampling.fanout).len(), 2);
    Ok(())
}

/// `limit = 0` in config means unlimited.
#[test]
fn test_config_zero_limit_is_unbounded() -> Result<()> {
    let config = PeerSetConfig::parse("[registry]\nlimit = 0\n")?;
    let set = PeerSet::from_config((0..20).map(|_| PeerId::random()), &config.registry);

    assert_eq!(set.limit(), None);
    assert_eq!(set.len(), 20);
    Ok(())
}
