// src/config/mod.rs

pub mod consts;
pub mod options;
pub mod targets;

pub use options::RunOptions;
pub use targets::{SteamSpec, TargetKind, TargetSpec, TrackerConfig};
