use std::collections::HashSet;

use crate::common::{ChatMessage, MessageId};
use crate::sync::listeners::{Listeners, Subscription};

/// Ordered, deduplicated message sequence of the active room.
///
/// Messages stay in arrival order. A remote message stamped earlier than a
/// local one that is already displayed is still appended after it; the
/// timestamps are only used for labels and date separators.
pub struct MessageStore {
    messages: Vec<ChatMessage>,
    seen: HashSet<MessageId>,
    listeners: Listeners<[ChatMessage]>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            seen: HashSet::new(),
            listeners: Listeners::new(),
        }
    }

    /// Appends `message` unless its id is already stored.
    ///
    /// Returns `false` for duplicates and for messages without a usable id or
    /// sender; neither case notifies observers.
    pub fn insert(&mut self, message: ChatMessage) -> bool {
        if !message.is_well_formed() {
            log::warn!(
                "Rejecting message without usable id/sender (id={:?}, sender={:?})",
                message.id.as_str(),
                message.sender
            );
            return false;
        }
        if !self.seen.insert(message.id.clone()) {
            log::debug!("Ignoring duplicate delivery of message {}", message.id);
            return false;
        }

        self.messages.push(message);
        self.listeners.notify(self.messages.as_slice());
        true
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.seen.contains(id)
    }

    pub fn get(&self, id: &MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|message| &message.id == id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Observers receive the whole sequence after every successful insert.
    pub fn observe(&self, callback: impl FnMut(&[ChatMessage]) + 'static) -> Subscription {
        self.listeners.subscribe(callback)
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::common::types::parse_timestamp;

    fn message(id: &str, sender: &str, timestamp: &str) -> ChatMessage {
        ChatMessage {
            id: MessageId::new(id),
            text: Some(format!("body of {id}")),
            sender: sender.to_string(),
            attachment: None,
            room_id: "test-room-id".to_string(),
            timestamp: parse_timestamp(timestamp).unwrap(),
        }
    }

    #[test]
    fn second_insert_of_same_id_is_a_no_op() {
        let mut store = MessageStore::new();
        let first = message("m1", "user", "2024-08-30T10:00:00Z");

        assert!(store.insert(first.clone()));
        assert!(!store.insert(first.clone()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0], first);
    }

    #[test]
    fn dedup_is_by_id_not_content() {
        let mut store = MessageStore::new();
        let original = message("m1", "user", "2024-08-30T10:00:00Z");
        let mut redelivery = original.clone();
        redelivery.text = Some("edited in transit".to_string());
        let mut same_body = original.clone();
        same_body.id = MessageId::new("m2");

        assert!(store.insert(original));
        assert!(!store.insert(redelivery));
        assert!(store.insert(same_body));
        assert_eq!(
            store.get(&MessageId::new("m1")).unwrap().text.as_deref(),
            Some("body of m1")
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn keeps_arrival_order_over_timestamp_order() {
        let mut store = MessageStore::new();
        store.insert(message("local", "user", "2024-08-30T10:05:00Z"));
        store.insert(message("remote", "salesmember", "2024-08-30T10:00:00Z"));

        let ids: Vec<&str> = store.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["local", "remote"]);
    }

    #[test]
    fn rejects_messages_without_usable_id_or_sender() {
        let mut store = MessageStore::new();

        assert!(!store.insert(message(" ", "user", "2024-08-30T10:00:00Z")));
        assert!(!store.insert(message("m1", "", "2024-08-30T10:00:00Z")));
        assert!(store.is_empty());
        assert!(!store.contains(&MessageId::new(" ")));
    }

    #[test]
    fn observers_see_only_real_inserts() {
        let mut store = MessageStore::new();
        let lengths = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&lengths);
        let subscription = store.observe(move |messages| sink.borrow_mut().push(messages.len()));

        store.insert(message("m1", "user", "2024-08-30T10:00:00Z"));
        store.insert(message("m1", "user", "2024-08-30T10:00:00Z"));
        store.insert(message("m2", "user", "2024-08-30T10:01:00Z"));
        subscription.unsubscribe();
        store.insert(message("m3", "user", "2024-08-30T10:02:00Z"));

        assert_eq!(*lengths.borrow(), vec![1, 2]);
        assert_eq!(store.len(), 3);
    }
}
