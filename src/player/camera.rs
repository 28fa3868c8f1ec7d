//! First/third person view selection for characters.

use bevy::prelude::*;

use super::components::*;
use crate::combat::{is_alive, Attributes};
use crate::core::{GameState, LifeSpan, TornOff};

/// How a character is viewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraView {
    FirstPerson,
    ThirdPerson,
}

/// Views a character offers, and the one currently in use.
#[derive(Component, Debug, Clone)]
pub struct CharacterCameras {
    pub first_person_enabled: bool,
    pub third_person_enabled: bool,
    pub active: Option<CameraView>,
}

impl Default for CharacterCameras {
    fn default() -> Self {
        Self {
            first_person_enabled: true,
            third_person_enabled: true,
            active: None,
        }
    }
}

/// Choose the view for a character.
///
/// Once the match is over everybody is seen from outside. A living, locally
/// viewed character uses its eyes; anything else falls back to the third
/// person camera, or nothing when neither view is enabled.
pub fn pick_camera(
    match_ended: bool,
    alive: bool,
    locally_viewed: bool,
    cameras: &CharacterCameras,
) -> Option<CameraView> {
    if match_ended && cameras.third_person_enabled {
        return Some(CameraView::ThirdPerson);
    }
    if alive && locally_viewed && cameras.first_person_enabled {
        return Some(CameraView::FirstPerson);
    }
    if cameras.third_person_enabled {
        return Some(CameraView::ThirdPerson);
    }
    None
}

/// Pick the camera of every character, and hide the body of whoever is
/// seen through their own eyes.
pub fn update_camera_views(
    game_state: Res<State<GameState>>,
    mut characters: Query<
        (
            &Attributes,
            &mut CharacterCameras,
            Has<TornOff>,
            Has<LifeSpan>,
            Has<LocallyControlled>,
            Option<&Children>,
        ),
        With<Character>,
    >,
    mut bodies: Query<&mut Visibility, With<CharacterBody>>,
) {
    let match_ended = *game_state.get() == GameState::MatchEnded;

    for (attributes, mut cameras, torn_off, pending_destroy, local, children) in characters.iter_mut() {
        let alive = is_alive(attributes, torn_off, pending_destroy);
        let view = pick_camera(match_ended, alive, local, &cameras);
        if view == cameras.active {
            continue;
        }
        debug!("Camera view changed to {:?}", view);
        cameras.active = view;

        let visibility = if view == Some(CameraView::FirstPerson) {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };
        let Some(children) = children else {
            continue;
        };
        for child in children.iter() {
            if let Ok(mut body) = bodies.get_mut(*child) {
                *body = visibility;
            }
        }
    }
}
