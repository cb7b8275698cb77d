pub use taskdeck_tui::cli;
pub use taskdeck_tui::commands;
pub use taskdeck_tui::config;
pub use taskdeck_tui::logging;
pub use taskdeck_tui::tui;
pub use taskdeck_tui::AppConfig;

pub use taskdeck_core as core;
pub use taskdeck_core::model;
pub use taskdeck_core::services;
pub use taskdeck_core::view;
