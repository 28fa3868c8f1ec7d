//! Controller module - the local player's will: input, view, chat, music.

mod bindings;
mod chat;
mod components;
mod input;
mod music;
mod plugin;
mod respawn;
mod view;

pub use bindings::{ActionInput, InputAction, InputBinding, KeyBindings, KEY_BINDINGS_PATH};
pub use chat::{
    should_deliver, ChatComponent, ChatDraft, ChatError, HistoryLine, MessageHistory,
    MessageKind, SayEvent,
};
pub use components::*;
pub use input::apply_turn_rates;
pub use music::{MusicEvent, MusicPlayer};
pub use plugin::ControllerPlugin;
pub use view::third_person_position;
