//! Player module - the character pawn: movement, dodging, camera, footsteps.

mod camera;
mod components;
mod dodge;
mod footsteps;
mod movement;
mod plugin;
mod spawn;

pub use camera::{pick_camera, CameraView, CharacterCameras};
pub use components::*;
pub use dodge::{dodge_permitted, dodge_velocity};
pub use footsteps::{footstep_interval, footstep_volume, CharacterSounds};
pub use movement::wish_direction;
pub use plugin::{PlayerPlugin, PlayerSet};
pub use spawn::{spawn_character, CharacterAssets, CharacterSpawn};
