use std::collections::hash_map::DefaultHasher;
use std::error::Error;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use libp2p::gossipsub::{self, IdentTopic};
use libp2p::mdns;
use libp2p::swarm::NetworkBehaviour;
use libp2p::{PeerId, identity};

#[derive(NetworkBehaviour)]
pub struct ChatBehavior {
    pub gossipsub: gossipsub::Behaviour,
    pub mdns: mdns::tokio::Behaviour,
}

/// Topic carrying every event of one room.
pub fn room_topic(topic_prefix: &str, room_id: &str) -> IdentTopic {
    IdentTopic::new(format!("{topic_prefix}/{room_id}"))
}

pub fn build_behavior(
    local_key: &identity::Keypair,
    local_peer_id: PeerId,
) -> Result<ChatBehavior, Box<dyn Error>> {
    // Typing events repeat byte-for-byte, so the publisher and its sequence
    // number are part of the id; otherwise gossipsub would swallow them as
    // duplicates.
    let message_id_fn = |message: &gossipsub::Message| {
        let mut hasher = DefaultHasher::new();
        message.data.hash(&mut hasher);
        message.source.hash(&mut hasher);
        message.sequence_number.hash(&mut hasher);
        gossipsub::MessageId::from(hasher.finish().to_string())
    };

    let gossipsub_config = gossipsub::ConfigBuilder::default()
        .heartbeat_interval(Duration::from_secs(5))
        .validation_mode(gossipsub::ValidationMode::Strict)
        .message_id_fn(message_id_fn)
        .build()?;

    let gossipsub = gossipsub::Behaviour::new(
        gossipsub::MessageAuthenticity::Signed(local_key.clone()),
        gossipsub_config,
    )?;

    let mdns_behaviour = mdns::tokio::Behaviour::new(mdns::Config::default(), local_peer_id)?;

    Ok(ChatBehavior {
        gossipsub,
        mdns: mdns_behaviour,
    })
}
