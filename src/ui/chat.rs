//! Chat box: recent messages and the line being typed.

use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::input::ButtonState;
use bevy::prelude::*;

use crate::controller::{ChatDraft, MessageHistory, MessageKind, SayEvent};
use crate::core::{GameConfig, PlayState};

/// Lines shown at once.
const VISIBLE_LINES: usize = 6;

/// Marker for chat box root entities.
#[derive(Component)]
pub struct ChatBoxUi;

#[derive(Component)]
pub struct ChatLines;

#[derive(Component)]
pub struct ChatInputLine;

pub fn spawn_chat_box(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(20.0),
                left: Val::Px(20.0),
                max_width: Val::Px(600.0),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            ChatBoxUi,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.9, 0.9)),
                ChatLines,
            ));
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.85, 0.4)),
                Visibility::Hidden,
                ChatInputLine,
            ));
        });
}

/// Prompt shown in front of the typed text.
pub fn input_prompt(draft: &ChatDraft) -> String {
    let channel = if draft.team_only { "Team" } else { "Say" };
    format!("{}: {}_", channel, draft.text)
}

/// Result of a key press on the chat line.
#[derive(Debug, PartialEq)]
pub enum DraftEdit {
    Typing,
    /// The line was closed, with the message to send unless cancelled
    Closed(Option<SayEvent>),
}

/// Apply one key press to the draft.
pub fn edit_draft(draft: &mut ChatDraft, key: &Key, max_length: usize) -> DraftEdit {
    match key {
        Key::Enter => DraftEdit::Closed(draft.submit()),
        Key::Escape => {
            draft.cancel();
            DraftEdit::Closed(None)
        }
        Key::Backspace => {
            draft.text.pop();
            DraftEdit::Typing
        }
        Key::Space => {
            if draft.text.chars().count() < max_length {
                draft.text.push(' ');
            }
            DraftEdit::Typing
        }
        Key::Character(characters) => {
            for c in characters.chars().filter(|c| !c.is_control()) {
                if draft.text.chars().count() >= max_length {
                    break;
                }
                draft.text.push(c);
            }
            DraftEdit::Typing
        }
        _ => DraftEdit::Typing,
    }
}

/// Type into the chat line while chatting.
///
/// Runs during the whole match so the key that opened the line is consumed
/// before chatting starts.
pub fn type_chat(
    config: Res<GameConfig>,
    play_state: Res<State<PlayState>>,
    mut keyboard: EventReader<KeyboardInput>,
    mut draft: ResMut<ChatDraft>,
    mut say_events: EventWriter<SayEvent>,
    mut next_play_state: ResMut<NextState<PlayState>>,
) {
    let chatting = *play_state.get() == PlayState::Chatting;

    for event in keyboard.read() {
        if !chatting || event.state != ButtonState::Pressed {
            continue;
        }

        if let DraftEdit::Closed(said) = edit_draft(&mut draft, &event.logical_key, config.chat.max_message_length) {
            if let Some(say) = said {
                say_events.send(say);
            }
            next_play_state.set(PlayState::Playing);
            break;
        }
    }
}

/// Show recent messages and the typed line.
pub fn update_chat_box(
    time: Res<Time>,
    config: Res<GameConfig>,
    history: Res<MessageHistory>,
    draft: Res<ChatDraft>,
    play_state: Res<State<PlayState>>,
    mut lines: Query<&mut Text, (With<ChatLines>, Without<ChatInputLine>)>,
    mut input: Query<(&mut Text, &mut Visibility), With<ChatInputLine>>,
) {
    if let Ok(mut text) = lines.get_single_mut() {
        let recent = history.recent(VISIBLE_LINES, time.elapsed_secs(), config.chat.display_time);
        text.0 = recent
            .iter()
            .map(|line| match line.kind {
                MessageKind::System => format!("* {}", line.text),
                MessageKind::Chat | MessageKind::Team => line.text.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n");
    }

    if let Ok((mut text, mut visibility)) = input.get_single_mut() {
        if *play_state.get() == PlayState::Chatting {
            text.0 = input_prompt(&draft);
            *visibility = Visibility::Inherited;
        } else {
            *visibility = Visibility::Hidden;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_draft() -> ChatDraft {
        let mut draft = ChatDraft::default();
        draft.open(Entity::from_raw(1), false);
        draft
    }

    #[test]
    fn typing_builds_the_line() {
        let mut draft = open_draft();
        assert_eq!(edit_draft(&mut draft, &Key::Character("g".into()), 200), DraftEdit::Typing);
        edit_draft(&mut draft, &Key::Character("g".into()), 200);
        edit_draft(&mut draft, &Key::Space, 200);
        edit_draft(&mut draft, &Key::Character("x".into()), 200);
        edit_draft(&mut draft, &Key::Backspace, 200);
        assert_eq!(draft.text, "gg ");
        assert_eq!(input_prompt(&draft), "Say: gg _");

        let DraftEdit::Closed(Some(say)) = edit_draft(&mut draft, &Key::Enter, 200) else {
            panic!("line was not sent");
        };
        assert_eq!(say.message, "gg ");
        assert!(!say.team_only);
    }

    #[test]
    fn escape_drops_the_line() {
        let mut draft = open_draft();
        edit_draft(&mut draft, &Key::Character("hi".into()), 200);
        assert_eq!(edit_draft(&mut draft, &Key::Escape, 200), DraftEdit::Closed(None));
        assert!(draft.text.is_empty());
        assert!(draft.controller.is_none());
    }

    #[test]
    fn typed_text_is_capped() {
        let mut draft = open_draft();
        edit_draft(&mut draft, &Key::Character("abcdef".into()), 4);
        assert_eq!(draft.text, "abcd");
    }
}
