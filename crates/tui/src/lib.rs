pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod tui;

pub use taskdeck_core as core;
pub use taskdeck_core::model;
pub use taskdeck_core::services;
pub use taskdeck_core::view;

pub use taskdeck_core::AppConfig;
