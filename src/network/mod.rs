pub mod behavior;
pub mod channel;
pub mod client;
pub mod transport;

pub use channel::{ChannelAdapter, ChannelEmitter, ChannelSession};
pub use client::P2PClient;

use libp2p::multiaddr::Protocol;
use libp2p::{Multiaddr, PeerId};

/// Keeps the entries that are valid multiaddrs ending in `/p2p/<PeerId>`.
pub fn parse_bootstrap_peers(entries: &[String]) -> Vec<(PeerId, Multiaddr)> {
    entries
        .iter()
        .filter_map(|entry| {
            let mut addr: Multiaddr = match entry.parse() {
                Ok(addr) => addr,
                Err(err) => {
                    log::warn!("Invalid multiaddr `{entry}`: {err}");
                    return None;
                }
            };

            let peer_id = match addr.pop() {
                Some(Protocol::P2p(peer)) => peer,
                _ => {
                    log::warn!("Multiaddr `{entry}` missing /p2p/PeerId suffix");
                    return None;
                }
            };

            Some((peer_id, addr))
        })
        .collect()
}
