use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::common::{ChatMessage, MessageId, PeerStatus};
use crate::config::AppConfig;
use crate::network::ChannelAdapter;
use crate::storage::MessageStore;
use crate::sync::composer::Composer;
use crate::sync::listeners::Subscription;
use crate::sync::presence::{PresenceTracker, TypingDebouncer};

#[derive(Debug, Clone)]
pub struct RoomSettings {
    pub room_id: String,
    pub username: String,
    pub typing_idle: Duration,
    pub remote_typing_expiry: Duration,
}

impl From<&AppConfig> for RoomSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            room_id: config.room_id.clone(),
            username: config.username.clone(),
            typing_idle: config.typing_idle(),
            remote_typing_expiry: config.remote_typing_expiry(),
        }
    }
}

/// One joined room: the channel handlers, the message sequence, typing
/// presence in both directions and the composer.
///
/// All state changes go through this type's handlers on the owning thread.
/// [`RoomSession::leave`] (also run on drop) unregisters every handler and
/// disarms the typing timer.
pub struct RoomSession {
    settings: RoomSettings,
    channel: ChannelAdapter,
    store: Rc<RefCell<MessageStore>>,
    presence: Rc<RefCell<PresenceTracker>>,
    peers: Rc<RefCell<Vec<String>>>,
    typing: TypingDebouncer,
    composer: Composer,
    subscriptions: Vec<Subscription>,
    joined: bool,
}

impl RoomSession {
    pub fn join(channel: ChannelAdapter, settings: RoomSettings) -> Self {
        let store = Rc::new(RefCell::new(MessageStore::new()));
        let presence = Rc::new(RefCell::new(PresenceTracker::new(
            settings.remote_typing_expiry,
        )));
        let peers = Rc::new(RefCell::new(Vec::new()));

        let inbound_store = Rc::clone(&store);
        let typing_presence = Rc::clone(&presence);
        let stop_presence = Rc::clone(&presence);
        let roster = Rc::clone(&peers);
        let subscriptions = vec![
            channel.on_message(move |message| {
                inbound_store.borrow_mut().insert(message.clone());
            }),
            channel.on_typing(move |username| {
                typing_presence
                    .borrow_mut()
                    .typing_started(username, Instant::now());
            }),
            channel.on_stop_typing(move || stop_presence.borrow_mut().typing_stopped()),
            channel.on_peer(move |status| update_roster(&mut roster.borrow_mut(), status)),
        ];

        let typing = TypingDebouncer::new(
            channel.emitter().clone(),
            settings.room_id.clone(),
            settings.username.clone(),
            settings.typing_idle,
        );

        channel.emitter().join(&settings.room_id);
        log::info!("Joined room {} as {}", settings.room_id, settings.username);

        Self {
            settings,
            channel,
            store,
            presence,
            peers,
            typing,
            composer: Composer::new(),
            subscriptions,
            joined: true,
        }
    }

    /// Drains inbound events and fires any timer that is due.
    pub fn tick(&mut self, now: Instant) {
        self.channel.pump();
        if !self.joined {
            return;
        }
        self.typing.tick(now);
        self.presence.borrow_mut().tick(now);
    }

    /// The user edited the input text.
    pub fn input_changed(&mut self, now: Instant) {
        if !self.joined {
            return;
        }
        self.composer.refresh_rows();
        self.typing.keystroke(now);
    }

    pub fn pick_emoji(&mut self, emoji: &str) {
        self.composer.pick_emoji(emoji);
    }

    /// Sends what the composer holds. Returns the id of the sent message, or
    /// `None` when there was nothing to send.
    pub fn compose(&mut self) -> Option<MessageId> {
        if !self.joined {
            return None;
        }
        let message = match self
            .composer
            .compose(&self.settings.username, &self.settings.room_id)
        {
            Ok(message) => message,
            Err(err) => {
                log::debug!("{err}");
                return None;
            }
        };

        let id = message.id.clone();
        self.channel.emitter().send(&message);
        self.store.borrow_mut().insert(message);
        self.typing.finish();
        Some(id)
    }

    pub fn leave(&mut self) {
        if !self.joined {
            return;
        }
        self.joined = false;
        self.subscriptions.clear();

        let emitter = self.channel.emitter();
        if self.typing.cancel() {
            emitter.send_stop_typing(&self.settings.room_id);
        }
        self.presence.borrow_mut().typing_stopped();
        emitter.leave(&self.settings.room_id);
        log::info!("Left room {}", self.settings.room_id);
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    pub fn store(&self) -> Ref<'_, MessageStore> {
        self.store.borrow()
    }

    pub fn messages(&self) -> Ref<'_, [ChatMessage]> {
        Ref::map(self.store.borrow(), |store| store.messages())
    }

    pub fn presence_text(&self) -> Option<String> {
        self.presence.borrow().display_text()
    }

    pub fn peers(&self) -> Ref<'_, Vec<String>> {
        self.peers.borrow()
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut Composer {
        &mut self.composer
    }

    pub fn is_typing(&self) -> bool {
        self.typing.is_typing()
    }

    /// Earliest pending timer, for scheduling the next wake-up.
    pub fn next_deadline(&self) -> Option<Instant> {
        let presence = self.presence.borrow().next_deadline();
        match (self.typing.next_deadline(), presence) {
            (Some(typing), Some(presence)) => Some(typing.min(presence)),
            (typing, presence) => typing.or(presence),
        }
    }

    pub fn observe_messages(
        &self,
        callback: impl FnMut(&[ChatMessage]) + 'static,
    ) -> Subscription {
        self.store.borrow().observe(callback)
    }

    pub fn observe_presence(
        &self,
        callback: impl FnMut(&Option<String>) + 'static,
    ) -> Subscription {
        self.presence.borrow().observe(callback)
    }
}

impl Drop for RoomSession {
    fn drop(&mut self) {
        self.leave();
    }
}

fn update_roster(peers: &mut Vec<String>, status: &PeerStatus) {
    if status.online {
        if !peers.iter().any(|peer| peer == &status.peer_id) {
            peers.push(status.peer_id.clone());
        }
    } else {
        peers.retain(|peer| peer != &status.peer_id);
    }
}
