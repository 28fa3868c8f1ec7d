//! UI module - menus, HUD, chat box and key binding menu.

mod chat;
mod hud;
mod keybinding;
mod menus;
mod plugin;
mod widgets;

pub use chat::{edit_draft, input_prompt, DraftEdit};
pub use hud::Pool;
pub use keybinding::{binding_text, AwaitingRebind};
pub use menus::{score_line, MenuButton};
pub use plugin::UiPlugin;
