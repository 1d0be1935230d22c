use std::error::Error;

use libp2p::core::muxing::StreamMuxerBox;
use libp2p::core::transport::Boxed;
use libp2p::core::upgrade::Version;
use libp2p::swarm::Config as SwarmConfig;
use libp2p::{PeerId, Swarm, Transport, dns, identity, noise, tcp, yamux};

use super::behavior::{ChatBehavior, build_behavior};

/// TCP with system DNS resolution, secured by noise and multiplexed by yamux.
pub fn build_transport(
    local_key: &identity::Keypair,
) -> Result<Boxed<(PeerId, StreamMuxerBox)>, Box<dyn Error>> {
    let tcp_transport = tcp::tokio::Transport::new(tcp::Config::default().nodelay(true));
    let transport = dns::tokio::Transport::system(tcp_transport)?
        .upgrade(Version::V1)
        .authenticate(noise::Config::new(local_key)?)
        .multiplex(yamux::Config::default())
        .boxed();

    Ok(transport)
}

/// Fresh identity, transport and behaviour, listening on an ephemeral TCP port.
pub fn build_swarm() -> Result<(Swarm<ChatBehavior>, PeerId), Box<dyn Error>> {
    let local_key = identity::Keypair::generate_ed25519();
    let local_peer_id = PeerId::from(local_key.public());
    log::info!("Local PeerID: {local_peer_id:?}");

    let transport = build_transport(&local_key)?;
    let behavior = build_behavior(&local_key, local_peer_id)?;

    let mut swarm = Swarm::new(
        transport,
        behavior,
        local_peer_id,
        SwarmConfig::with_tokio_executor(),
    );
    swarm.listen_on("/ip4/0.0.0.0/tcp/0".parse()?)?;

    Ok((swarm, local_peer_id))
}
