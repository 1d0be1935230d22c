pub mod composer;
pub mod grouping;
pub mod listeners;
pub mod presence;
pub mod session;

pub use composer::{Composer, compose_message};
pub use listeners::{Listeners, Subscription};
pub use presence::{PresenceSignal, PresenceTracker, TypingDebouncer, TypingState};
pub use session::{RoomSession, RoomSettings};
