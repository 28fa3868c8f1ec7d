//! Frag Arena - Entry Point
//!
//! A first-person arena shooter built on Bevy.
//!
//! Controls (defaults, see assets/data/key_bindings.ron):
//! - WASD: Move, double-tap to dodge
//! - Mouse: Look around
//! - Space: Jump, C: Crouch
//! - Left click: Fire, 0-5 / mouse wheel: Weapons
//! - T / Y: Say / Team say
//! - Escape: Pause/Unpause

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy_kira_audio::AudioPlugin;
use bevy_rapier3d::prelude::*;
use clap::{Parser, ValueEnum};

use frag_arena::core::NetMode;
use frag_arena::{FragArenaPlugin, LaunchOptions};

const SERVER_LOG_FILTER: &str = "wgpu=error,naga=warn,frag_arena=info";

#[derive(Clone, Copy, Debug, ValueEnum)]
enum NetModeArg {
    Standalone,
    ListenServer,
    Client,
    DedicatedServer,
}

impl From<NetModeArg> for NetMode {
    fn from(arg: NetModeArg) -> Self {
        match arg {
            NetModeArg::Standalone => NetMode::Standalone,
            NetModeArg::ListenServer => NetMode::ListenServer,
            NetModeArg::Client => NetMode::Client,
            NetModeArg::DedicatedServer => NetMode::DedicatedServer,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Frag Arena", long_about = None)]
struct Args {
    /// Network role of this process
    #[arg(long, value_enum, default_value_t = NetModeArg::Standalone)]
    net_mode: NetModeArg,

    /// Arena to load (file stem under assets/data/arenas)
    #[arg(long, default_value = "courtyard")]
    arena: String,

    /// Player name shown in chat and on the scoreboard
    #[arg(long, default_value = "Player")]
    name: String,
}

fn main() {
    let args = Args::parse();
    let net_mode = NetMode::from(args.net_mode);
    let options = LaunchOptions {
        net_mode,
        arena: args.arena,
        player_name: args.name,
    };

    let mut app = App::new();

    if net_mode.is_dedicated() {
        // Headless: no window, renderer or audio device
        app.add_plugins(MinimalPlugins)
            .add_plugins(bevy::log::LogPlugin {
                level: bevy::log::Level::INFO,
                filter: SERVER_LOG_FILTER.to_string(),
                ..default()
            })
            .add_plugins((
                TransformPlugin,
                HierarchyPlugin,
                StatesPlugin,
                AssetPlugin::default(),
                bevy::scene::ScenePlugin,
            ))
            // Physics collider setup still looks meshes up
            .init_asset::<Mesh>();
    } else {
        app.add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Frag Arena".to_string(),
                        resolution: (1280.0, 720.0).into(),
                        ..default()
                    }),
                    ..default()
                })
                // Audio goes through kira
                .disable::<bevy::audio::AudioPlugin>(),
        )
        .add_plugins(AudioPlugin);
    }

    app
        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())

        // Our game plugin
        .add_plugins(FragArenaPlugin::new(options))

        .run();
}
