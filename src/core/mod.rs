//! Core game module - states, network role, events, configuration.
//!
//! This module provides the foundation that all other game systems build upon.

mod config;
mod data;
mod error;
mod events;
mod lifespan;
mod net;
mod plugin;
mod states;
mod tween;

pub use config::*;
pub use data::{read_ron_dir, read_ron_file, write_ron_file};
pub use error::DataLoadError;
pub use events::*;
pub use lifespan::{tick_life_spans, LifeSpan};
pub use net::*;
pub use plugin::CorePlugin;
pub use states::*;
pub use tween::*;

/// Tuning values inherited from the arena rules are expressed in centimeters;
/// the world itself is in meters.
pub const UNITS_PER_METER: f32 = 100.0;
