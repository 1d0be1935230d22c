use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::DateTime;
use room_chat::common::{Attachment, ChannelCommand, ChannelEvent, ChatMessage, MessageId};
use room_chat::network::{ChannelAdapter, ChannelSession};
use room_chat::sync::{RoomSession, RoomSettings};
use tokio::sync::mpsc;

const ROOM: &str = "test-room-id";
const ME: &str = "user";

struct Harness {
    session: RoomSession,
    commands: mpsc::Receiver<ChannelCommand>,
    events: mpsc::Sender<ChannelEvent>,
}

impl Harness {
    fn join() -> Self {
        let (command_tx, commands) = mpsc::channel(64);
        let (events, event_rx) = mpsc::channel(64);
        let settings = RoomSettings {
            room_id: ROOM.to_string(),
            username: ME.to_string(),
            typing_idle: Duration::from_secs(2),
            remote_typing_expiry: Duration::from_secs(5),
        };
        let channel = ChannelAdapter::new(ChannelSession::from_parts(command_tx, event_rx));
        Self {
            session: RoomSession::join(channel, settings),
            commands,
            events,
        }
    }

    fn drain(&mut self) -> Vec<ChannelCommand> {
        let mut drained = Vec::new();
        while let Ok(command) = self.commands.try_recv() {
            drained.push(command);
        }
        drained
    }

    fn inject(&self, event: ChannelEvent) {
        self.events.try_send(event).unwrap();
    }
}

fn remote(id: &str, text: &str) -> ChatMessage {
    ChatMessage {
        id: MessageId::new(id),
        text: Some(text.to_string()),
        sender: "alice".to_string(),
        attachment: None,
        room_id: ROOM.to_string(),
        timestamp: DateTime::parse_from_rfc3339("2024-08-30T15:45:00+00:00").unwrap(),
    }
}

fn count(commands: &[ChannelCommand], wanted: fn(&ChannelCommand) -> bool) -> usize {
    commands.iter().filter(|command| wanted(command)).count()
}

#[test]
fn joining_emits_join_for_the_room() {
    let mut harness = Harness::join();
    assert_eq!(
        harness.drain(),
        vec![ChannelCommand::JoinRoom(ROOM.to_string())]
    );
    assert!(harness.session.is_joined());
}

#[test]
fn sent_message_appears_once_even_after_echo() {
    let mut harness = Harness::join();
    harness.drain();

    harness.session.composer_mut().set_input("hello");
    let id = harness.session.compose().unwrap();
    assert_eq!(harness.session.messages().len(), 1);

    let sent = harness
        .drain()
        .into_iter()
        .find_map(|command| match command {
            ChannelCommand::SendMessage(message) => Some(message),
            _ => None,
        })
        .unwrap();
    assert_eq!(sent.id, id);
    assert_eq!(sent.text.as_deref(), Some("hello"));

    harness.inject(ChannelEvent::MessageReceived(sent));
    harness.session.tick(Instant::now());

    assert_eq!(harness.session.messages().len(), 1);
    assert_eq!(harness.session.messages()[0].id, id);
}

#[test]
fn empty_send_changes_nothing() {
    let mut harness = Harness::join();
    harness.drain();

    harness.session.composer_mut().set_input("   \n ");
    assert!(harness.session.compose().is_none());

    assert!(harness.session.messages().is_empty());
    assert!(harness.drain().is_empty());
    assert_eq!(harness.session.composer().input(), "   \n ");
}

#[test]
fn attachment_only_send_goes_out() {
    let mut harness = Harness::join();
    harness.drain();

    harness
        .session
        .composer_mut()
        .attach(Attachment::new("file:///tmp/report.pdf", "report.pdf"));
    assert!(harness.session.compose().is_some());

    let messages = harness.session.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, None);
    assert_eq!(
        messages[0].attachment.as_ref().map(|a| a.file_name.as_str()),
        Some("report.pdf")
    );
}

#[test]
fn remote_messages_keep_arrival_order_and_dedupe() {
    let mut harness = Harness::join();
    harness.inject(ChannelEvent::MessageReceived(remote("b", "second")));
    harness.inject(ChannelEvent::MessageReceived(remote("a", "first")));
    harness.inject(ChannelEvent::MessageReceived(remote("b", "edited")));
    harness.session.tick(Instant::now());

    let messages = harness.session.messages();
    let ids: Vec<_> = messages.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
    assert_eq!(messages[0].text.as_deref(), Some("second"));
}

#[test]
fn burst_of_keystrokes_yields_one_start_and_one_stop() {
    let mut harness = Harness::join();
    harness.drain();
    let start = Instant::now();

    for offset in [0, 400, 900] {
        harness
            .session
            .input_changed(start + Duration::from_millis(offset));
    }
    harness.session.tick(start + Duration::from_millis(2500));
    assert!(harness.session.is_typing());

    harness.session.tick(start + Duration::from_millis(2900));
    assert!(!harness.session.is_typing());

    let commands = harness.drain();
    assert_eq!(
        commands,
        vec![
            ChannelCommand::Typing {
                room_id: ROOM.to_string(),
                username: ME.to_string(),
            },
            ChannelCommand::StopTyping(ROOM.to_string()),
        ]
    );
}

#[test]
fn sending_while_typing_stops_exactly_once() {
    let mut harness = Harness::join();
    harness.drain();
    let start = Instant::now();

    harness.session.input_changed(start);
    harness.session.composer_mut().set_input("hi");
    harness.session.compose().unwrap();
    harness.session.tick(start + Duration::from_secs(10));

    let commands = harness.drain();
    assert_eq!(
        count(&commands, |c| matches!(c, ChannelCommand::StopTyping(_))),
        1
    );
    assert!(matches!(commands.last(), Some(ChannelCommand::StopTyping(_))));
}

#[test]
fn sending_without_typing_still_emits_stop() {
    let mut harness = Harness::join();
    harness.drain();

    harness.session.composer_mut().set_input("hi");
    harness.session.compose().unwrap();

    let commands = harness.drain();
    assert!(matches!(commands[0], ChannelCommand::SendMessage(_)));
    assert_eq!(commands[1], ChannelCommand::StopTyping(ROOM.to_string()));
}

#[test]
fn remote_typing_shows_until_stop_or_expiry() {
    let mut harness = Harness::join();
    harness.inject(ChannelEvent::Typing("alice".to_string()));
    harness.session.tick(Instant::now());
    assert_eq!(
        harness.session.presence_text().as_deref(),
        Some("alice is typing...")
    );

    harness.inject(ChannelEvent::StopTyping);
    harness.session.tick(Instant::now());
    assert_eq!(harness.session.presence_text(), None);

    harness.inject(ChannelEvent::Typing("bob".to_string()));
    harness.session.tick(Instant::now());
    assert!(harness.session.presence_text().is_some());
    harness
        .session
        .tick(Instant::now() + Duration::from_secs(6));
    assert_eq!(harness.session.presence_text(), None);
}

#[test]
fn observers_see_each_new_sequence() {
    let mut harness = Harness::join();
    let lengths = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&lengths);
    let _subscription = harness
        .session
        .observe_messages(move |messages| seen.borrow_mut().push(messages.len()));

    harness.inject(ChannelEvent::MessageReceived(remote("1", "one")));
    harness.inject(ChannelEvent::MessageReceived(remote("1", "one")));
    harness.inject(ChannelEvent::MessageReceived(remote("2", "two")));
    harness.session.tick(Instant::now());

    assert_eq!(*lengths.borrow(), vec![1, 2]);
}

#[test]
fn peers_come_and_go() {
    let mut harness = Harness::join();
    harness.inject(ChannelEvent::PeerConnected("peer-a".to_string()));
    harness.inject(ChannelEvent::PeerConnected("peer-b".to_string()));
    harness.inject(ChannelEvent::PeerDisconnected("peer-a".to_string()));
    harness.session.tick(Instant::now());

    assert_eq!(*harness.session.peers(), vec!["peer-b".to_string()]);
}

#[test]
fn leaving_ignores_later_events_and_emits_leave() {
    let mut harness = Harness::join();
    harness.drain();
    harness.session.leave();

    harness.inject(ChannelEvent::MessageReceived(remote("late", "too late")));
    harness.inject(ChannelEvent::Typing("alice".to_string()));
    harness.session.tick(Instant::now());

    assert!(harness.session.messages().is_empty());
    assert_eq!(harness.session.presence_text(), None);
    assert!(!harness.session.is_joined());
    assert_eq!(
        harness.drain(),
        vec![ChannelCommand::LeaveRoom(ROOM.to_string())]
    );
}

#[test]
fn leaving_while_typing_stops_before_leave() {
    let mut harness = Harness::join();
    harness.drain();
    harness.session.input_changed(Instant::now());
    harness.drain();

    harness.session.leave();
    harness.session.leave();

    assert_eq!(
        harness.drain(),
        vec![
            ChannelCommand::StopTyping(ROOM.to_string()),
            ChannelCommand::LeaveRoom(ROOM.to_string()),
        ]
    );
}

#[test]
fn dropping_the_session_leaves_the_room() {
    let Harness {
        session,
        mut commands,
        events: _events,
    } = Harness::join();
    assert_eq!(
        commands.try_recv().unwrap(),
        ChannelCommand::JoinRoom(ROOM.to_string())
    );

    drop(session);

    assert_eq!(
        commands.try_recv().unwrap(),
        ChannelCommand::LeaveRoom(ROOM.to_string())
    );
}
