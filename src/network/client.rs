use std::collections::HashMap;
use std::error::Error;

use futures::StreamExt;
use libp2p::gossipsub::{self, TopicHash};
use libp2p::mdns;
use libp2p::swarm::SwarmEvent;
use libp2p::{Multiaddr, PeerId, Swarm};
use tokio::sync::mpsc;

use crate::common::{ChannelCommand, ChannelEvent, Envelope};

use super::behavior::{ChatBehavior, ChatBehaviorEvent, room_topic};
use super::transport::build_swarm;

/// Network task: turns channel commands into gossipsub traffic on per-room
/// topics and relays what arrives on joined topics back as channel events.
pub struct P2PClient {
    event_sender: mpsc::Sender<ChannelEvent>,
    command_receiver: mpsc::Receiver<ChannelCommand>,
    bootstrap_peers: Vec<(PeerId, Multiaddr)>,
    topic_prefix: String,
    rooms: HashMap<TopicHash, String>,
}

impl P2PClient {
    pub fn new(
        event_sender: mpsc::Sender<ChannelEvent>,
        command_receiver: mpsc::Receiver<ChannelCommand>,
        bootstrap_peers: Vec<(PeerId, Multiaddr)>,
        topic_prefix: String,
    ) -> Self {
        Self {
            event_sender,
            command_receiver,
            bootstrap_peers,
            topic_prefix,
            rooms: HashMap::new(),
        }
    }

    pub async fn run(mut self) -> Result<(), Box<dyn Error>> {
        let (mut swarm, _local_peer_id) = build_swarm()?;

        if self.bootstrap_peers.is_empty() {
            log::info!("No bootstrap peers configured; relying on mDNS discovery");
        }
        for (peer_id, addr) in std::mem::take(&mut self.bootstrap_peers) {
            log::info!("Dialing bootstrap peer {peer_id} at {addr}");
            swarm.behaviour_mut().gossipsub.add_explicit_peer(&peer_id);
            if let Err(err) = swarm.dial(addr) {
                log::warn!("Failed to dial bootstrap peer {peer_id}: {err}");
            }
        }

        log::info!("Network event loop started");

        loop {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    match command {
                        Some(command) => self.handle_command(command, &mut swarm).await,
                        None => break,
                    }
                }
                event = swarm.select_next_some() => {
                    self.handle_swarm_event(event, &mut swarm).await;
                }
            }
        }

        log::info!("Command channel closed; network event loop stopped");
        Ok(())
    }

    async fn handle_command(&mut self, command: ChannelCommand, swarm: &mut Swarm<ChatBehavior>) {
        match command {
            ChannelCommand::JoinRoom(room_id) => {
                let topic = room_topic(&self.topic_prefix, &room_id);
                match swarm.behaviour_mut().gossipsub.subscribe(&topic) {
                    Ok(_) => {
                        log::info!("Subscribed to {topic}");
                        self.rooms.insert(topic.hash(), room_id);
                    }
                    Err(err) => log::warn!("Failed to join room {room_id}: {err:?}"),
                }
            }
            ChannelCommand::LeaveRoom(room_id) => {
                let topic = room_topic(&self.topic_prefix, &room_id);
                let _ = swarm.behaviour_mut().gossipsub.unsubscribe(&topic);
                self.rooms.remove(&topic.hash());
                log::info!("Unsubscribed from {topic}");
            }
            command => self.publish(command, swarm).await,
        }
    }

    async fn publish(&mut self, command: ChannelCommand, swarm: &mut Swarm<ChatBehavior>) {
        let event_name = command.event_name();
        let Some((room_id, envelope)) = Envelope::from_command(command) else {
            return;
        };

        let payload = match serde_json::to_vec(&envelope) {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("Failed to serialize `{event_name}`: {err:?}");
                return;
            }
        };

        let topic = room_topic(&self.topic_prefix, &room_id);
        match swarm.behaviour_mut().gossipsub.publish(topic, payload) {
            Ok(_) => {
                // Peers never see their own gossip; echo sent messages back so
                // the local copy goes through the same dedup path as remote ones.
                if let Envelope::Message(message) = envelope {
                    if let Err(err) = self
                        .event_sender
                        .send(ChannelEvent::MessageReceived(message))
                        .await
                    {
                        log::warn!("Failed to echo sent message: {err:?}");
                    }
                }
            }
            Err(err) => log::warn!("Publish error for `{event_name}` in {room_id}: {err:?}"),
        }
    }

    async fn handle_swarm_event(
        &mut self,
        event: SwarmEvent<ChatBehaviorEvent>,
        swarm: &mut Swarm<ChatBehavior>,
    ) {
        match event {
            SwarmEvent::Behaviour(ChatBehaviorEvent::Gossipsub(gossipsub::Event::Message {
                message,
                ..
            })) => {
                let Some(room_id) = self.rooms.get(&message.topic) else {
                    log::debug!("Ignoring gossip on unjoined topic {}", message.topic);
                    return;
                };
                match serde_json::from_slice::<Envelope>(&message.data) {
                    Ok(envelope) => {
                        let event = envelope.into_event(room_id);
                        let _ = self.event_sender.send(event).await;
                    }
                    Err(err) => {
                        log::warn!("Dropping malformed event in {room_id}: {err}");
                    }
                }
            }
            SwarmEvent::Behaviour(ChatBehaviorEvent::Mdns(mdns::Event::Discovered(list))) => {
                for (peer_id, _) in list {
                    swarm.behaviour_mut().gossipsub.add_explicit_peer(&peer_id);
                }
            }
            SwarmEvent::Behaviour(ChatBehaviorEvent::Mdns(mdns::Event::Expired(list))) => {
                for (peer_id, _) in list {
                    swarm
                        .behaviour_mut()
                        .gossipsub
                        .remove_explicit_peer(&peer_id);
                }
            }
            SwarmEvent::NewListenAddr { address, .. } => {
                log::info!("Listening on {address:?}");
            }
            SwarmEvent::ConnectionEstablished {
                peer_id,
                num_established,
                ..
            } => {
                if num_established.get() == 1 {
                    let _ = self
                        .event_sender
                        .send(ChannelEvent::PeerConnected(peer_id.to_string()))
                        .await;
                }
            }
            SwarmEvent::ConnectionClosed {
                peer_id,
                num_established,
                ..
            } => {
                if num_established == 0 {
                    let _ = self
                        .event_sender
                        .send(ChannelEvent::PeerDisconnected(peer_id.to_string()))
                        .await;
                }
            }
            _ => {}
        }
    }
}
