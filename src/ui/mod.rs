//! UI components for Notiq

pub mod command_palette;
pub mod editor;
pub mod images;
pub mod preview;
pub mod sidebar;
pub mod status_bar;
