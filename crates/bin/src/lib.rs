//! Native front-ends for native-bomber: shared configuration, the terminal
//! board view and the spectator session loop.

pub mod config;
pub mod spectator;
pub mod terminal;

pub use config::{Config, GameConfig, WebConfig};
