//! Chat: sending with anti-spam, team filtering, and the message history.

use std::collections::VecDeque;

use bevy::prelude::*;
use thiserror::Error;

use super::components::{LocalPlayer, Team};
use crate::core::{ChatMessageEvent, ChatTuning, GameConfig, SystemMessageEvent};
use crate::player::PlayerName;

/// Why a message was not sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("Message is empty")]
    Empty,
    #[error("Message sent too soon after the previous one")]
    TooSoon,
}

/// Request from the chat line to say something.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SayEvent {
    pub controller: Entity,
    pub message: String,
    pub team_only: bool,
}

/// The line being typed.
#[derive(Resource, Debug, Default)]
pub struct ChatDraft {
    pub controller: Option<Entity>,
    pub text: String,
    pub team_only: bool,
}

impl ChatDraft {
    pub fn open(&mut self, controller: Entity, team_only: bool) {
        self.controller = Some(controller);
        self.team_only = team_only;
        self.text.clear();
    }

    /// Close the line, returning what should be said.
    pub fn submit(&mut self) -> Option<SayEvent> {
        let controller = self.controller.take()?;
        Some(SayEvent {
            controller,
            message: std::mem::take(&mut self.text),
            team_only: self.team_only,
        })
    }

    pub fn cancel(&mut self) {
        self.controller = None;
        self.text.clear();
    }
}

/// Per-controller chat state.
#[derive(Component, Debug, Clone)]
pub struct ChatComponent {
    pub fallback_owner_name: String,
    pub anti_spam_delay: f32,
    pub max_message_length: usize,
    last_sent: Option<f32>,
}

impl ChatComponent {
    pub fn from_tuning(tuning: &ChatTuning) -> Self {
        Self {
            fallback_owner_name: tuning.fallback_owner_name.clone(),
            anti_spam_delay: tuning.anti_spam_delay,
            max_message_length: tuning.max_message_length,
            last_sent: None,
        }
    }

    /// Name shown in front of this controller's messages.
    pub fn owner_name(&self, name: Option<&PlayerName>) -> String {
        match name {
            Some(name) if !name.0.trim().is_empty() => name.0.clone(),
            _ => self.fallback_owner_name.clone(),
        }
    }

    /// Check a message before sending it and remember when it went out.
    pub fn prepare(&mut self, message: &str, now: f32) -> Result<String, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::Empty);
        }
        if let Some(last) = self.last_sent {
            if now - last < self.anti_spam_delay {
                return Err(ChatError::TooSoon);
            }
        }

        self.last_sent = Some(now);
        Ok(message.chars().take(self.max_message_length).collect())
    }
}

/// Team messages only reach the sender's team.
pub fn should_deliver(team_only: bool, sender_team: Option<Team>, receiver_team: Option<Team>) -> bool {
    !team_only || (sender_team.is_some() && sender_team == receiver_team)
}

/// Where a history line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Chat,
    Team,
    System,
}

/// One line of the message history.
#[derive(Debug, Clone)]
pub struct HistoryLine {
    pub kind: MessageKind,
    pub text: String,
    /// Elapsed time when received
    pub received_at: f32,
}

/// Chat and system messages received by the local player.
#[derive(Resource, Debug)]
pub struct MessageHistory {
    pub lines: VecDeque<HistoryLine>,
    pub capacity: usize,
}

impl Default for MessageHistory {
    fn default() -> Self {
        Self::with_capacity(ChatTuning::default().history_size)
    }
}

impl MessageHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, kind: MessageKind, text: String, now: f32) {
        if self.capacity == 0 {
            return;
        }
        while self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(HistoryLine {
            kind,
            text,
            received_at: now,
        });
    }

    /// The last `count` lines still younger than `display_time`.
    pub fn recent(&self, count: usize, now: f32, display_time: f32) -> Vec<&HistoryLine> {
        let mut recent: Vec<_> = self
            .lines
            .iter()
            .rev()
            .filter(|line| now - line.received_at <= display_time)
            .take(count)
            .collect();
        recent.reverse();
        recent
    }
}

/// Validate typed messages and broadcast them.
pub fn send_chat(
    time: Res<Time>,
    mut say_events: EventReader<SayEvent>,
    mut senders: Query<(&mut ChatComponent, Option<&PlayerName>)>,
    mut chat_events: EventWriter<ChatMessageEvent>,
) {
    for event in say_events.read() {
        let Ok((mut chat, name)) = senders.get_mut(event.controller) else {
            continue;
        };

        match chat.prepare(&event.message, time.elapsed_secs()) {
            Ok(message) => {
                chat_events.send(ChatMessageEvent {
                    sender: event.controller,
                    sender_name: chat.owner_name(name),
                    message,
                    team_only: event.team_only,
                });
            }
            Err(e) => debug!("Chat message dropped: {}", e),
        }
    }
}

/// Put chat and system messages into the local history.
pub fn receive_messages(
    time: Res<Time>,
    mut chat_events: EventReader<ChatMessageEvent>,
    mut system_events: EventReader<SystemMessageEvent>,
    teams: Query<&Team>,
    local: Query<Entity, With<LocalPlayer>>,
    mut history: ResMut<MessageHistory>,
) {
    let now = time.elapsed_secs();
    let receiver_team = local.get_single().ok().and_then(|e| teams.get(e).ok().copied());

    for event in chat_events.read() {
        let sender_team = teams.get(event.sender).ok().copied();
        if !should_deliver(event.team_only, sender_team, receiver_team) {
            continue;
        }

        let (kind, text) = if event.team_only {
            (MessageKind::Team, format!("[TEAM] {}: {}", event.sender_name, event.message))
        } else {
            (MessageKind::Chat, format!("{}: {}", event.sender_name, event.message))
        };
        info!("{}", text);
        history.push(kind, text, now);
    }

    for event in system_events.read() {
        history.push(MessageKind::System, event.message.clone(), now);
    }
}

/// Size the history from the config.
pub fn setup_message_history(mut commands: Commands, config: Res<GameConfig>) {
    commands.insert_resource(MessageHistory::with_capacity(config.chat.history_size));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat() -> ChatComponent {
        ChatComponent::from_tuning(&ChatTuning::default())
    }

    #[test]
    fn empty_messages_are_rejected() {
        let mut chat = chat();
        assert_eq!(chat.prepare("   ", 0.0), Err(ChatError::Empty));
        // A rejected message does not start the anti-spam delay
        assert_eq!(chat.prepare("gg", 0.1), Ok("gg".to_string()));
    }

    #[test]
    fn messages_inside_the_delay_are_rejected() {
        let mut chat = chat();
        assert!(chat.prepare("hello", 5.0).is_ok());
        assert_eq!(chat.prepare("again", 5.5), Err(ChatError::TooSoon));
        assert!(chat.prepare("again", 6.0).is_ok());
    }

    #[test]
    fn unnamed_senders_use_the_fallback() {
        let chat = chat();
        assert_eq!(chat.owner_name(None), "SOMEBODY");
        assert_eq!(chat.owner_name(Some(&PlayerName(" ".to_string()))), "SOMEBODY");
        assert_eq!(chat.owner_name(Some(&PlayerName("Xan".to_string()))), "Xan");
    }

    #[test]
    fn team_messages_stay_in_the_team() {
        assert!(should_deliver(false, Some(Team(0)), Some(Team(1))));
        assert!(should_deliver(true, Some(Team(1)), Some(Team(1))));
        assert!(!should_deliver(true, Some(Team(0)), Some(Team(1))));
        assert!(!should_deliver(true, None, None));
    }

    #[test]
    fn history_is_bounded() {
        let mut history = MessageHistory::with_capacity(2);
        history.push(MessageKind::Chat, "a".into(), 0.0);
        history.push(MessageKind::Chat, "b".into(), 1.0);
        history.push(MessageKind::System, "c".into(), 2.0);

        let texts: Vec<_> = history.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["b", "c"]);

        let recent = history.recent(5, 9.5, 8.0);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].text, "c");
    }
}
