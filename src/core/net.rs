//! Network role of the running process.
//!
//! Transport is out of scope; the role still decides who may apply damage
//! and how a dead character is torn down.

use bevy::prelude::*;

/// How this process participates in a match.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NetMode {
    /// Single player, owns everything.
    #[default]
    Standalone,
    /// Hosts the match and also has a local player.
    ListenServer,
    /// Connected to a remote server, no authority over gameplay state.
    Client,
    /// Hosts the match without any local player or presentation.
    DedicatedServer,
}

impl NetMode {
    /// Whether this process is allowed to change gameplay state.
    pub fn has_authority(self) -> bool {
        !matches!(self, NetMode::Client)
    }

    pub fn is_dedicated(self) -> bool {
        matches!(self, NetMode::DedicatedServer)
    }

    /// Whether anything is drawn or played locally.
    pub fn has_presentation(self) -> bool {
        !self.is_dedicated()
    }
}

/// The entity no longer receives replicated updates; its state is frozen as
/// it was at the time it was cut off (used for corpses).
#[derive(Component, Debug)]
pub struct TornOff;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_clients_lack_authority() {
        assert!(NetMode::Standalone.has_authority());
        assert!(NetMode::ListenServer.has_authority());
        assert!(NetMode::DedicatedServer.has_authority());
        assert!(!NetMode::Client.has_authority());
    }

    #[test]
    fn dedicated_server_has_no_presentation() {
        assert!(!NetMode::DedicatedServer.has_presentation());
        assert!(NetMode::ListenServer.has_presentation());
        assert!(NetMode::Client.has_presentation());
    }
}
