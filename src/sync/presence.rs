use std::time::{Duration, Instant};

use crate::network::ChannelEmitter;
use crate::sync::listeners::{Listeners, Subscription};

/// Ephemeral "someone is composing" signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceSignal {
    pub username: String,
    pub active: bool,
}

impl PresenceSignal {
    pub fn display_text(&self) -> String {
        format!("{} is typing...", self.username)
    }
}

/// Who-is-typing state derived from remote typing events.
///
/// Only the latest typer is shown: a second typer replaces the first one's
/// indicator. A signal that never sees its stop event clears itself after
/// `expiry`.
pub struct PresenceTracker {
    current: Option<PresenceSignal>,
    expires_at: Option<Instant>,
    expiry: Duration,
    listeners: Listeners<Option<String>>,
}

impl PresenceTracker {
    pub fn new(expiry: Duration) -> Self {
        Self {
            current: None,
            expires_at: None,
            expiry,
            listeners: Listeners::new(),
        }
    }

    pub fn typing_started(&mut self, username: &str, now: Instant) {
        self.expires_at = Some(now + self.expiry);
        let unchanged = self
            .current
            .as_ref()
            .is_some_and(|signal| signal.username == username);
        if unchanged {
            return;
        }

        log::debug!("{username} started typing");
        self.current = Some(PresenceSignal {
            username: username.to_string(),
            active: true,
        });
        self.notify();
    }

    pub fn typing_stopped(&mut self) {
        self.expires_at = None;
        if self.current.take().is_some() {
            self.notify();
        }
    }

    /// Clears a signal whose stop event never arrived. Returns whether it did.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) if now >= deadline => {
                if let Some(signal) = &self.current {
                    log::debug!("Typing signal from {} expired", signal.username);
                }
                self.typing_stopped();
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&PresenceSignal> {
        self.current.as_ref()
    }

    pub fn display_text(&self) -> Option<String> {
        self.current.as_ref().map(PresenceSignal::display_text)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.expires_at
    }

    pub fn observe(&self, callback: impl FnMut(&Option<String>) + 'static) -> Subscription {
        self.listeners.subscribe(callback)
    }

    fn notify(&self) {
        self.listeners.notify(&self.display_text());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingState {
    Idle,
    Armed { deadline: Instant },
}

/// Local half of typing presence: Idle -> Armed on the first keystroke
/// (emits start), back to Idle after `idle_window` of silence (emits stop).
/// Keystrokes while Armed only push the deadline out.
pub struct TypingDebouncer {
    state: TypingState,
    idle_window: Duration,
    room_id: String,
    username: String,
    emitter: ChannelEmitter,
}

impl TypingDebouncer {
    pub fn new(
        emitter: ChannelEmitter,
        room_id: impl Into<String>,
        username: impl Into<String>,
        idle_window: Duration,
    ) -> Self {
        Self {
            state: TypingState::Idle,
            idle_window,
            room_id: room_id.into(),
            username: username.into(),
            emitter,
        }
    }

    pub fn keystroke(&mut self, now: Instant) {
        if self.state == TypingState::Idle {
            log::debug!("Local typing started in {}", self.room_id);
            self.emitter.send_typing(&self.room_id, &self.username);
        }
        self.state = TypingState::Armed {
            deadline: now + self.idle_window,
        };
    }

    /// Fires the stop emission once the idle window has elapsed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.state {
            TypingState::Armed { deadline } if now >= deadline => {
                log::debug!("Local typing went idle in {}", self.room_id);
                self.state = TypingState::Idle;
                self.emitter.send_stop_typing(&self.room_id);
                true
            }
            _ => false,
        }
    }

    /// A message went out: drop to Idle and emit stop, whatever the state was.
    pub fn finish(&mut self) {
        self.state = TypingState::Idle;
        self.emitter.send_stop_typing(&self.room_id);
    }

    /// Disarms without emitting. Returns whether a stop was still pending.
    pub fn cancel(&mut self) -> bool {
        let was_armed = self.is_typing();
        self.state = TypingState::Idle;
        was_armed
    }

    pub fn state(&self) -> TypingState {
        self.state
    }

    pub fn is_typing(&self) -> bool {
        matches!(self.state, TypingState::Armed { .. })
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            TypingState::Armed { deadline } => Some(deadline),
            TypingState::Idle => None,
        }
    }
}
