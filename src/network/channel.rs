use libp2p::{Multiaddr, PeerId};
use tokio::sync::mpsc;

use crate::common::{ChannelCommand, ChannelEvent, ChatMessage, PeerStatus};
use crate::sync::listeners::{Listeners, Subscription};

use super::client::P2PClient;

/// Bounded depth of the command and event queues.
pub const QUEUE_DEPTH: usize = 100;

/// The connection the chat core talks through: commands go down, events come up.
pub struct ChannelSession {
    command_sender: mpsc::Sender<ChannelCommand>,
    event_receiver: mpsc::Receiver<ChannelEvent>,
}

impl ChannelSession {
    pub fn from_parts(
        command_sender: mpsc::Sender<ChannelCommand>,
        event_receiver: mpsc::Receiver<ChannelEvent>,
    ) -> Self {
        Self {
            command_sender,
            event_receiver,
        }
    }

    /// Spawns the libp2p network task. Must be called inside a tokio runtime.
    pub fn connect(topic_prefix: &str, bootstrap_peers: Vec<(PeerId, Multiaddr)>) -> Self {
        // UI -> Network
        let (command_sender, command_receiver) = mpsc::channel(QUEUE_DEPTH);
        // Network -> UI
        let (event_sender, event_receiver) = mpsc::channel(QUEUE_DEPTH);

        let client = P2PClient::new(
            event_sender,
            command_receiver,
            bootstrap_peers,
            topic_prefix.to_string(),
        );
        tokio::spawn(async move {
            if let Err(err) = client.run().await {
                log::error!("Network client terminated: {err}");
            }
        });

        Self::from_parts(command_sender, event_receiver)
    }
}

/// Fire-and-forget side of the channel. Never blocks: a full or closed queue
/// drops the emission.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    command_sender: mpsc::Sender<ChannelCommand>,
}

impl ChannelEmitter {
    pub fn new(command_sender: mpsc::Sender<ChannelCommand>) -> Self {
        Self { command_sender }
    }

    pub fn join(&self, room_id: &str) {
        self.emit(ChannelCommand::JoinRoom(room_id.to_string()));
    }

    pub fn leave(&self, room_id: &str) {
        self.emit(ChannelCommand::LeaveRoom(room_id.to_string()));
    }

    pub fn send(&self, message: &ChatMessage) {
        self.emit(ChannelCommand::SendMessage(message.clone()));
    }

    pub fn send_typing(&self, room_id: &str, username: &str) {
        self.emit(ChannelCommand::Typing {
            room_id: room_id.to_string(),
            username: username.to_string(),
        });
    }

    pub fn send_stop_typing(&self, room_id: &str) {
        self.emit(ChannelCommand::StopTyping(room_id.to_string()));
    }

    fn emit(&self, command: ChannelCommand) {
        let event_name = command.event_name();
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Dropping `{event_name}` emission: {err}");
        }
    }
}

/// Typed view over a [`ChannelSession`]: emissions through [`ChannelEmitter`],
/// inbound events fanned out to registered handlers by [`ChannelAdapter::pump`].
pub struct ChannelAdapter {
    emitter: ChannelEmitter,
    event_receiver: mpsc::Receiver<ChannelEvent>,
    message_handlers: Listeners<ChatMessage>,
    typing_handlers: Listeners<str>,
    stop_typing_handlers: Listeners<()>,
    peer_handlers: Listeners<PeerStatus>,
}

impl ChannelAdapter {
    pub fn new(session: ChannelSession) -> Self {
        Self {
            emitter: ChannelEmitter::new(session.command_sender),
            event_receiver: session.event_receiver,
            message_handlers: Listeners::new(),
            typing_handlers: Listeners::new(),
            stop_typing_handlers: Listeners::new(),
            peer_handlers: Listeners::new(),
        }
    }

    pub fn emitter(&self) -> &ChannelEmitter {
        &self.emitter
    }

    pub fn on_message(&self, handler: impl FnMut(&ChatMessage) + 'static) -> Subscription {
        self.message_handlers.subscribe(handler)
    }

    pub fn on_typing(&self, handler: impl FnMut(&str) + 'static) -> Subscription {
        self.typing_handlers.subscribe(handler)
    }

    pub fn on_stop_typing(&self, mut handler: impl FnMut() + 'static) -> Subscription {
        self.stop_typing_handlers.subscribe(move |_| handler())
    }

    pub fn on_peer(&self, handler: impl FnMut(&PeerStatus) + 'static) -> Subscription {
        self.peer_handlers.subscribe(handler)
    }

    /// Drains every event the transport has queued, in delivery order.
    /// Events that arrive with no handler registered are dropped.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.event_receiver.try_recv() {
            self.dispatch(event);
            handled += 1;
        }
        handled
    }

    pub fn dispatch(&self, event: ChannelEvent) {
        match event {
            ChannelEvent::MessageReceived(message) => self.message_handlers.notify(&message),
            ChannelEvent::Typing(username) => self.typing_handlers.notify(username.as_str()),
            ChannelEvent::StopTyping => self.stop_typing_handlers.notify(&()),
            ChannelEvent::PeerConnected(peer_id) => self.peer_handlers.notify(&PeerStatus {
                peer_id,
                online: true,
            }),
            ChannelEvent::PeerDisconnected(peer_id) => self.peer_handlers.notify(&PeerStatus {
                peer_id,
                online: false,
            }),
        }
    }
}
